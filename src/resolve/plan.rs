use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::model::board::Board;
use crate::model::mapping::{MappingConfig, RefValue};
use crate::resolve::labels::{normalize_color, resolve_labels, resolve_list_labels, ResolvedLabel};
use crate::resolve::matcher::find_match;
use crate::resolve::members::{resolve_members, ResolvedMember};
use crate::resolve::milestones::resolve_milestones;
use crate::resolve::status::resolve_statuses;
use crate::target::{Milestone, ProjectInfo, StatusOption, TargetClient, TargetError, TargetLabel};

/// Target-side state fetched once per run. Resolution never re-fetches;
/// every decision is made against this one snapshot.
pub struct TargetSnapshot {
    pub labels: Vec<TargetLabel>,
    pub milestones: Vec<Milestone>,
    pub project: Option<ProjectInfo>,
}

pub async fn fetch_snapshot(
    client: &dyn TargetClient,
    mapping: &MappingConfig,
) -> Result<TargetSnapshot, TargetError> {
    let labels = client.list_labels().await?;
    let milestones = client.list_milestones().await?;
    let project = match mapping.project {
        Some(number) => Some(client.fetch_project(number).await?),
        None => None,
    };
    Ok(TargetSnapshot {
        labels,
        milestones,
        project,
    })
}

/// One unresolvable reference or configuration fault. All problems found in
/// a pass are reported together; the run never halts at the first one.
#[derive(Debug, Clone, Error)]
pub enum PlanProblem {
    #[error("label rule for \"{trello}\" matches no GitHub label ({reference})")]
    MissingLabel { trello: String, reference: RefValue },
    #[error("label {reference} for list \"{list}\" matches no GitHub label")]
    MissingListLabel { list: String, reference: RefValue },
    #[error("list {reference} does not exist on the board")]
    InvalidList { reference: RefValue },
    #[error("milestone {reference} for list \"{list}\" does not exist in the repository")]
    MissingMilestone { list: String, reference: RefValue },
    #[error("status {reference} for list \"{list}\" is not an option of the project's Status field")]
    MissingStatus { list: String, reference: RefValue },
    #[error("status \"{name}\" for list \"{list}\" must be created on the project manually; re-run afterwards")]
    StatusNeedsCreation { list: String, name: String },
    #[error("user rule for \"{trello}\": GitHub user \"{github}\" was not found")]
    UnknownUser { trello: String, github: String },
    #[error("list \"{list}\" has a status rule but no project is configured")]
    StatusWithoutProject { list: String },
}

/// Non-fatal findings surfaced alongside the verdict.
#[derive(Debug, Clone)]
pub enum PlanWarning {
    SkippedLabel { name: String },
    LabelExists { name: String },
    BadColor { name: String, color: String },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::SkippedLabel { name } => {
                write!(f, "label \"{name}\" has no rule; cards will lose it")
            }
            PlanWarning::LabelExists { name } => {
                write!(f, "label \"{name}\" already exists on the target")
            }
            PlanWarning::BadColor { name, color } => {
                write!(
                    f,
                    "color \"{color}\" for label \"{name}\" is not 3- or 6-digit hex; using the GitHub default"
                )
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub problems: Vec<PlanProblem>,
    pub warnings: Vec<PlanWarning>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.problems.is_empty() {
            writeln!(f, "migration plan is valid")?;
        } else {
            writeln!(f, "migration plan is invalid:")?;
            for problem in &self.problems {
                writeln!(f, "  - {problem}")?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f, "warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  - {warning}")?;
            }
        }
        Ok(())
    }
}

/// The aggregate, validated set of resolved mappings. Built once; read-only
/// for the transformer and the synchronizer.
pub struct MigrationPlan {
    pub labels: Vec<ResolvedLabel>,
    /// Source list id → milestone.
    pub milestones: HashMap<String, Milestone>,
    /// Source list id → status option.
    pub statuses: HashMap<String, StatusOption>,
    pub members: Vec<ResolvedMember>,
    pub skip_list_ids: HashSet<String>,
    /// Carried from the snapshot for the synchronizer and per-issue
    /// project-association calls.
    pub project: Option<ProjectInfo>,
    pub problems: Vec<PlanProblem>,
    pub warnings: Vec<PlanWarning>,
}

impl MigrationPlan {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            problems: self.problems.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Resolves `skip.lists` references so cards can be filtered before anything
/// else happens. Unresolvable references are invalid-list problems.
pub fn resolve_skip_lists(
    board: &Board,
    mapping: &MappingConfig,
) -> (HashSet<String>, Vec<PlanProblem>) {
    let mut ids = HashSet::new();
    let mut problems = Vec::new();
    for reference in &mapping.skip.lists {
        match find_match(reference, &board.lists) {
            Some(list) => {
                ids.insert(list.id.clone());
            }
            None => problems.push(PlanProblem::InvalidList {
                reference: reference.clone(),
            }),
        }
    }
    (ids, problems)
}

pub async fn build_plan(
    board: &Board,
    mapping: &MappingConfig,
    client: &dyn TargetClient,
    skip_list_ids: HashSet<String>,
    mut problems: Vec<PlanProblem>,
) -> Result<MigrationPlan, TargetError> {
    let snapshot = fetch_snapshot(client, mapping).await?;
    let members = resolve_members(&mapping.users, client).await?;
    Ok(assemble_plan(
        board,
        mapping,
        &snapshot,
        members,
        skip_list_ids,
        &mut problems,
    ))
}

/// Pure aggregation of every resolver over one snapshot. Exhaustive by
/// construction: each resolver contributes its full set of failures.
pub fn assemble_plan(
    board: &Board,
    mapping: &MappingConfig,
    snapshot: &TargetSnapshot,
    members: Vec<ResolvedMember>,
    skip_list_ids: HashSet<String>,
    problems: &mut Vec<PlanProblem>,
) -> MigrationPlan {
    let mut warnings = Vec::new();

    // List rules are anchored to source lists once; a bad reference is one
    // problem no matter how many sub-rules the entry carries.
    let mut list_rules = Vec::new();
    for rule in &mapping.lists {
        match find_match(&rule.list, &board.lists) {
            Some(list) => list_rules.push((list, rule)),
            None => problems.push(PlanProblem::InvalidList {
                reference: rule.list.clone(),
            }),
        }
    }

    let mut labels = resolve_labels(&board.labels, &mapping.labels, &snapshot.labels);
    labels.extend(resolve_list_labels(&list_rules, &snapshot.labels));
    for label in &labels {
        match label {
            ResolvedLabel::Skipped { trello_name } => warnings.push(PlanWarning::SkippedLabel {
                name: trello_name.clone(),
            }),
            ResolvedLabel::ToCreate { name, .. } => {
                if snapshot.labels.iter().any(|l| &l.name == name) {
                    warnings.push(PlanWarning::LabelExists { name: name.clone() });
                }
            }
            ResolvedLabel::Missing {
                trello_name,
                reference,
            } => problems.push(PlanProblem::MissingLabel {
                trello: trello_name.clone(),
                reference: reference.clone(),
            }),
            ResolvedLabel::MissingList {
                list_name,
                reference,
            } => problems.push(PlanProblem::MissingListLabel {
                list: list_name.clone(),
                reference: reference.clone(),
            }),
            ResolvedLabel::Mapped { .. } | ResolvedLabel::ListMapped { .. } => {}
        }
    }
    for rule in &mapping.labels {
        if let (true, Some(color)) = (rule.create, rule.color.as_deref()) {
            if normalize_color(color).is_none() {
                warnings.push(PlanWarning::BadColor {
                    name: rule.trello.clone(),
                    color: color.to_string(),
                });
            }
        }
    }

    let milestones = resolve_milestones(&list_rules, &snapshot.milestones);
    for (list, reference) in milestones.missing {
        problems.push(PlanProblem::MissingMilestone { list, reference });
    }

    let statuses = resolve_statuses(&list_rules, snapshot.project.as_ref());
    for (list, reference) in statuses.missing {
        problems.push(PlanProblem::MissingStatus { list, reference });
    }
    for pending in statuses.to_create {
        problems.push(PlanProblem::StatusNeedsCreation {
            list: pending.list_name,
            name: pending.name,
        });
    }
    for list in statuses.without_project {
        problems.push(PlanProblem::StatusWithoutProject { list });
    }

    for member in &members {
        if let ResolvedMember::Unverified { trello, github } = member {
            problems.push(PlanProblem::UnknownUser {
                trello: trello.clone(),
                github: github.clone(),
            });
        }
    }

    MigrationPlan {
        labels,
        milestones: milestones.by_list,
        statuses: statuses.by_list,
        members,
        skip_list_ids,
        project: snapshot.project.clone(),
        problems: std::mem::take(problems),
        warnings,
    }
}
