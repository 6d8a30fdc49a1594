use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    github: Option<GitHubSection>,
}

#[derive(Debug, Deserialize)]
struct GitHubSection {
    token: String,
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".boardport")
        .join("config.toml")
}

/// Token from `GITHUB_TOKEN`, falling back to `~/.boardport/config.toml`.
pub fn github_token() -> Result<String> {
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        if !token.is_empty() {
            return Ok(token);
        }
    }
    if let Some(token) = token_from_file(&config_path())? {
        return Ok(token);
    }
    bail!(
        "No GitHub token found. Set GITHUB_TOKEN or add a [github] token to {}",
        config_path().display()
    );
}

fn token_from_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: FileConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config.github.map(|g| g.token))
}
