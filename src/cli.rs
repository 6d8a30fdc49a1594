use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::import::ImportOptions;

#[derive(Debug)]
pub struct CliArgs {
    pub board_path: PathBuf,
    pub mapping_path: PathBuf,
    pub options: ImportOptions,
}

/// Parse positional paths and flags. Flags may appear anywhere.
///
/// Supported forms:
///   boardport board.json mapping.toml
///   boardport board.json mapping.toml --check
///   boardport --keep-closed board.json mapping.toml
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut options = ImportOptions::default();

    for arg in args {
        match arg.as_str() {
            "--check" => options.check_only = true,
            "--keep-closed" => options.keep_closed = true,
            "--keep-closed-lists" => options.keep_closed_lists = true,
            flag if flag.starts_with('-') => bail!("Unknown flag: {flag}"),
            path => paths.push(PathBuf::from(path)),
        }
    }

    if paths.len() != 2 {
        bail!(
            "Usage: boardport <board.json> <mapping.toml> [--check] [--keep-closed] [--keep-closed-lists]"
        );
    }
    let mapping_path = paths.pop().unwrap();
    let board_path = paths.pop().unwrap();
    Ok(CliArgs {
        board_path,
        mapping_path,
        options,
    })
}

pub fn print_help() {
    println!("boardport — migrate a Trello board into GitHub issues\n");
    println!("USAGE:");
    println!("  boardport <board.json> <mapping.toml> [flags]");
    println!();
    println!("FLAGS:");
    println!("  --check              Validate the migration plan and stop");
    println!("  --keep-closed        Migrate archived cards too");
    println!("  --keep-closed-lists  Migrate cards on archived lists too");
    println!();
    println!("The GitHub token is read from GITHUB_TOKEN or ~/.boardport/config.toml.");
}
