pub mod github;

use async_trait::async_trait;
use thiserror::Error;

/// Failure at the target-client boundary. `AlreadyExists` and `NotFound` are
/// the two tolerated cases; everything else is fatal to the run.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct TargetLabel {
    pub id: u64,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Milestone {
    pub id: u64,
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct TargetUser {
    pub id: u64,
    pub login: String,
}

/// One selectable value of a project's single-select status field.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub id: String,
    pub title: String,
    pub status_field_id: String,
    pub status_options: Vec<StatusOption>,
}

/// An item already on the project board, read before any creation occurs.
#[derive(Debug, Clone)]
pub struct ExistingProjectItem {
    pub id: String,
    pub issue_number: u64,
    pub title: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ItemPage {
    pub items: Vec<ExistingProjectItem>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub milestone: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CreatedIssue {
    pub number: u64,
    pub node_id: String,
}

/// The destination issue tracker plus its optional project board. All calls
/// are synchronous round-trips issued one at a time by the orchestrator.
#[async_trait]
pub trait TargetClient: Send + Sync {
    async fn list_labels(&self) -> Result<Vec<TargetLabel>, TargetError>;
    async fn list_milestones(&self) -> Result<Vec<Milestone>, TargetError>;
    /// Fails with `TargetError::AlreadyExists` when the name is taken.
    async fn create_label(&self, name: &str, color: Option<&str>) -> Result<(), TargetError>;
    /// Fails with `TargetError::NotFound` for unknown logins.
    async fn lookup_user(&self, login: &str) -> Result<TargetUser, TargetError>;
    async fn fetch_project(&self, number: u64) -> Result<ProjectInfo, TargetError>;
    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, TargetError>;
    async fn add_comment(&self, issue_number: u64, body: &str) -> Result<(), TargetError>;
    /// Returns the new project item id.
    async fn add_to_project(
        &self,
        project_id: &str,
        issue_node_id: &str,
    ) -> Result<String, TargetError>;
    async fn set_item_status(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        option_id: &str,
    ) -> Result<(), TargetError>;
    async fn project_items(
        &self,
        project_id: &str,
        cursor: Option<&str>,
    ) -> Result<ItemPage, TargetError>;
}
