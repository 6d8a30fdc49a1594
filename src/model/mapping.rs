use std::fmt;

use anyhow::{Context, Result};
use serde::Deserialize;

/// A user-declared reference to an entity: either an exact name or a numeric
/// id. TOML integers become `Id`, strings become `Name`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RefValue {
    Id(u64),
    Name(String),
}

impl fmt::Display for RefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefValue::Id(id) => write!(f, "#{id}"),
            RefValue::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

/// User intent for one migration run.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    pub repo: RepoTarget,
    #[serde(default)]
    pub project: Option<u64>,
    #[serde(default)]
    pub labels: Vec<LabelRule>,
    #[serde(default)]
    pub users: Vec<UserRule>,
    #[serde(default)]
    pub lists: Vec<ListRule>,
    #[serde(default)]
    pub skip: SkipRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoTarget {
    pub owner: String,
    pub name: String,
}

/// Either a lookup rule (`create = false`, match an existing GitHub label by
/// name or id) or a create rule (`create = true`, name plus optional color).
#[derive(Debug, Clone, Deserialize)]
pub struct LabelRule {
    pub trello: String,
    pub github: RefValue,
    #[serde(default)]
    pub create: bool,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRule {
    pub trello: String,
    pub github: String,
}

/// Per-list rules. The `create` flag is scoped to the status rule only.
#[derive(Debug, Clone, Deserialize)]
pub struct ListRule {
    pub list: RefValue,
    #[serde(default)]
    pub status: Option<RefValue>,
    #[serde(default)]
    pub label: Option<RefValue>,
    #[serde(default)]
    pub milestone: Option<RefValue>,
    #[serde(default)]
    pub create: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkipRules {
    #[serde(default)]
    pub lists: Vec<RefValue>,
}

impl MappingConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse mapping config")
    }
}
