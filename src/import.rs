use crate::model::board::Board;
use crate::model::mapping::MappingConfig;
use crate::resolve::labels::ResolvedLabel;
use crate::resolve::plan::{build_plan, resolve_skip_lists, PlanWarning, ValidationReport};
use crate::sync::sync_statuses;
use crate::target::{TargetClient, TargetError};
use crate::transform::transform_card;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImportOptions {
    /// Keep archived cards.
    pub keep_closed: bool,
    /// Keep cards whose list is archived.
    pub keep_closed_lists: bool,
    /// Stop after validation; perform no mutation.
    pub check_only: bool,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub labels_created: u64,
    pub labels_existing: u64,
    pub issues_created: u64,
    pub comments_posted: u64,
    pub status_updates: u64,
    pub cards_filtered: usize,
    pub items_skipped: u64,
    pub warnings: Vec<PlanWarning>,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Validation failed; nothing was mutated.
    Invalid(ValidationReport),
    /// Check mode: the plan is valid and mutation was intentionally skipped.
    Valid(ValidationReport),
    Completed(RunSummary),
}

/// End-to-end sequence: resolve, validate (halt on failure), create missing
/// labels, synchronize existing project items, then create issues one card
/// at a time. An execution-phase failure aborts immediately and leaves
/// whatever was already created in place.
pub async fn plan_and_run(
    mut board: Board,
    mapping: &MappingConfig,
    client: &dyn TargetClient,
    options: &ImportOptions,
) -> Result<RunOutcome, TargetError> {
    let (skip_ids, skip_problems) = resolve_skip_lists(&board, mapping);
    let cards_filtered = board.filter_cards(options.keep_closed, options.keep_closed_lists, &skip_ids);

    let plan = build_plan(&board, mapping, client, skip_ids, skip_problems).await?;
    if !plan.is_valid() {
        return Ok(RunOutcome::Invalid(plan.report()));
    }
    if options.check_only {
        return Ok(RunOutcome::Valid(plan.report()));
    }

    let mut summary = RunSummary {
        cards_filtered,
        warnings: plan.warnings.clone(),
        ..RunSummary::default()
    };

    for label in &plan.labels {
        if let ResolvedLabel::ToCreate { name, color, .. } = label {
            match client.create_label(name, color.as_deref()).await {
                Ok(()) => summary.labels_created += 1,
                // Another run or process may have created it meanwhile.
                Err(TargetError::AlreadyExists(_)) => summary.labels_existing += 1,
                Err(err) => return Err(err),
            }
        }
    }

    if let Some(project) = &plan.project {
        if !plan.statuses.is_empty() {
            let outcome = sync_statuses(&board, &plan, project, client).await?;
            summary.status_updates += outcome.updates;
            summary.items_skipped = outcome.skipped;
        }
    }

    for card in &board.cards {
        let draft = transform_card(card, &board, &plan);
        let created = client.create_issue(&draft.issue).await?;
        summary.issues_created += 1;
        for comment in &draft.comments {
            client.add_comment(created.number, comment).await?;
            summary.comments_posted += 1;
        }
        if let Some(project) = &plan.project {
            let item_id = client.add_to_project(&project.id, &created.node_id).await?;
            if let Some(status) = plan.statuses.get(&card.id_list) {
                client
                    .set_item_status(&project.id, &item_id, &project.status_field_id, &status.id)
                    .await?;
                summary.status_updates += 1;
            }
        }
    }

    Ok(RunOutcome::Completed(summary))
}
