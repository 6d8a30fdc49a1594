mod cli;
mod config;
mod import;
mod model;
mod resolve;
mod sync;
mod target;
mod transform;

use anyhow::{Context, Result};

use import::RunOutcome;
use model::board::Board;
use model::mapping::MappingConfig;
use target::github::GitHubTarget;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        cli::print_help();
        return;
    }
    if let Err(err) = run(&args).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    let cli = cli::parse_args(args)?;

    let bytes = std::fs::read(&cli.board_path)
        .with_context(|| format!("Failed to read {}", cli.board_path.display()))?;
    let board = Board::from_json(&bytes)?;

    let text = std::fs::read_to_string(&cli.mapping_path)
        .with_context(|| format!("Failed to read {}", cli.mapping_path.display()))?;
    let mapping = MappingConfig::from_toml(&text)?;

    let token = config::github_token()?;
    let client = GitHubTarget::new(token, mapping.repo.owner.clone(), mapping.repo.name.clone());

    match import::plan_and_run(board, &mapping, &client, &cli.options).await? {
        RunOutcome::Invalid(report) => {
            eprint!("{report}");
            anyhow::bail!("fix the mapping configuration and re-run");
        }
        RunOutcome::Valid(report) => {
            print!("{report}");
        }
        RunOutcome::Completed(summary) => {
            for warning in &summary.warnings {
                println!("warning: {warning}");
            }
            println!("Migration complete:");
            println!("  labels created:  {}", summary.labels_created);
            if summary.labels_existing > 0 {
                println!("  labels already present: {}", summary.labels_existing);
            }
            println!("  issues created:  {}", summary.issues_created);
            println!("  comments posted: {}", summary.comments_posted);
            println!("  status updates:  {}", summary.status_updates);
            if summary.cards_filtered > 0 {
                println!("  cards filtered out: {}", summary.cards_filtered);
            }
            if summary.items_skipped > 0 {
                println!("  existing items left as-is: {}", summary.items_skipped);
            }
        }
    }
    Ok(())
}
