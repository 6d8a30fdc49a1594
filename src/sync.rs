use crate::model::board::Board;
use crate::resolve::plan::MigrationPlan;
use crate::target::{ProjectInfo, TargetClient, TargetError};

#[derive(Debug, Default, Clone, Copy)]
pub struct SyncOutcome {
    pub updates: u64,
    pub skipped: u64,
}

/// Reconciles the status of items already on the project board. Items are
/// re-identified by exact issue title; an unmatched item or a list without a
/// status mapping is skipped, not an error. No call is issued when the
/// current status already matches, so a second run against an unchanged
/// board is free of mutations.
pub async fn sync_statuses(
    board: &Board,
    plan: &MigrationPlan,
    project: &ProjectInfo,
    client: &dyn TargetClient,
) -> Result<SyncOutcome, TargetError> {
    let mut outcome = SyncOutcome::default();
    let mut cursor: Option<String> = None;
    loop {
        let page = client.project_items(&project.id, cursor.as_deref()).await?;
        for item in &page.items {
            let Some(card) = board.cards.iter().find(|c| c.name == item.title) else {
                outcome.skipped += 1;
                continue;
            };
            let Some(expected) = plan.statuses.get(&card.id_list) else {
                outcome.skipped += 1;
                continue;
            };
            if item.status.as_deref() == Some(expected.name.as_str()) {
                outcome.skipped += 1;
                continue;
            }
            client
                .set_item_status(&project.id, &item.id, &project.status_field_id, &expected.id)
                .await?;
            outcome.updates += 1;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    use crate::target::tests::MockTarget;
    use crate::target::StatusOption;

    fn board() -> Board {
        Board::from_json(
            br#"{
                "name": "Product",
                "lists": [{"id": "l-done", "name": "Done"}],
                "cards": [
                    {"id": "c1", "name": "Fix bug", "idList": "l-done"},
                    {"id": "c2", "name": "Add feature", "idList": "l-done"}
                ],
                "labels": [], "checklists": [], "members": [], "actions": []
            }"#,
        )
        .unwrap()
    }

    fn plan_with_status(list_id: &str, option_id: &str, name: &str) -> MigrationPlan {
        let mut statuses = HashMap::new();
        statuses.insert(
            list_id.to_string(),
            StatusOption {
                id: option_id.into(),
                name: name.into(),
                color: None,
            },
        );
        MigrationPlan {
            labels: Vec::new(),
            milestones: HashMap::new(),
            statuses,
            members: Vec::new(),
            skip_list_ids: HashSet::new(),
            project: None,
            problems: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[tokio::test]
    async fn updates_only_items_with_drifted_status() {
        let client = MockTarget::default()
            .with_project(&[("opt-todo", "Todo"), ("opt-done", "Done")])
            .with_items(vec![vec![
                ("item1", 1, "Fix bug", Some("Todo")),
                ("item2", 2, "Add feature", Some("Done")),
            ]]);
        let board = board();
        let plan = plan_with_status("l-done", "opt-done", "Done");
        let project = client.project.clone().unwrap();

        let outcome = sync_statuses(&board, &plan, &project, &client).await.unwrap();
        assert_eq!(outcome.updates, 1);
        assert_eq!(client.mutations(), vec!["set_status:item1:opt-done"]);
    }

    #[tokio::test]
    async fn second_run_issues_zero_updates() {
        let client = MockTarget::default()
            .with_project(&[("opt-done", "Done")])
            .with_items(vec![vec![("item1", 1, "Fix bug", Some("Todo"))]]);
        let board = board();
        let plan = plan_with_status("l-done", "opt-done", "Done");
        let project = client.project.clone().unwrap();

        sync_statuses(&board, &plan, &project, &client).await.unwrap();

        // Same source, target now converged.
        let client2 = MockTarget::default()
            .with_project(&[("opt-done", "Done")])
            .with_items(vec![vec![("item1", 1, "Fix bug", Some("Done"))]]);
        let outcome = sync_statuses(&board, &plan, &project, &client2).await.unwrap();
        assert_eq!(outcome.updates, 0);
        assert!(client2.mutations().is_empty());
    }

    #[tokio::test]
    async fn unmatched_titles_and_unmapped_lists_are_skipped() {
        let client = MockTarget::default()
            .with_project(&[("opt-done", "Done")])
            .with_items(vec![vec![
                ("item1", 1, "Renamed issue", Some("Todo")),
                ("item2", 2, "No status", None),
            ]]);
        let mut board = board();
        board.cards.push(
            serde_json::from_str(
                r#"{"id": "c3", "name": "No status", "idList": "l-unmapped"}"#,
            )
            .unwrap(),
        );
        let plan = plan_with_status("l-done", "opt-done", "Done");
        let project = client.project.clone().unwrap();

        let outcome = sync_statuses(&board, &plan, &project, &client).await.unwrap();
        assert_eq!(outcome.updates, 0);
        assert_eq!(outcome.skipped, 2);
    }

    #[tokio::test]
    async fn follows_pagination_to_exhaustion() {
        let client = MockTarget::default()
            .with_project(&[("opt-done", "Done")])
            .with_items(vec![
                vec![("item1", 1, "Fix bug", Some("Todo"))],
                vec![("item2", 2, "Add feature", Some("Todo"))],
            ]);
        let board = board();
        let plan = plan_with_status("l-done", "opt-done", "Done");
        let project = client.project.clone().unwrap();

        let outcome = sync_statuses(&board, &plan, &project, &client).await.unwrap();
        assert_eq!(outcome.updates, 2);
    }
}
