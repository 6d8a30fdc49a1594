use crate::model::board::{Action, Board, Card};
use crate::resolve::labels::ResolvedLabel;
use crate::resolve::members::{find_verified, ResolvedMember};
use crate::resolve::plan::MigrationPlan;
use crate::target::NewIssue;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// One source card rendered into target issue fields plus its comment
/// bodies, oldest first.
#[derive(Debug, Clone)]
pub struct CardIssue {
    pub issue: NewIssue,
    pub comments: Vec<String>,
}

pub fn transform_card(card: &Card, board: &Board, plan: &MigrationPlan) -> CardIssue {
    CardIssue {
        issue: NewIssue {
            title: card.name.clone(),
            body: build_body(card, board),
            labels: issue_labels(card, plan),
            assignees: issue_assignees(card, board, &plan.members),
            milestone: plan.milestones.get(&card.id_list).map(|m| m.number),
        },
        comments: board
            .comments_for(&card.id)
            .into_iter()
            .map(|action| render_comment(action, &plan.members))
            .collect(),
    }
}

/// Description, checklists, and provenance footer joined by a rule. A
/// separator only ever sits between two non-empty sections.
fn build_body(card: &Card, board: &Board) -> String {
    let mut sections = Vec::new();
    let desc = card.desc.trim();
    if !desc.is_empty() {
        sections.push(desc.to_string());
    }
    if let Some(checklists) = render_checklists(card, board) {
        sections.push(checklists);
    }
    sections.push(render_footer(card));
    sections.join(SECTION_SEPARATOR)
}

fn render_checklists(card: &Card, board: &Board) -> Option<String> {
    let checklists: Vec<_> = card
        .id_checklists
        .iter()
        .filter_map(|id| board.checklist(id))
        .collect();
    if checklists.is_empty() {
        return None;
    }
    let mut out = String::from("## Checklists");
    for checklist in checklists {
        out.push_str("\n\n### ");
        out.push_str(&checklist.name);
        for item in &checklist.check_items {
            let marker = if item.is_complete() { "x" } else { " " };
            out.push_str(&format!("\n- [{marker}] {}", item.name));
        }
    }
    Some(out)
}

fn render_footer(card: &Card) -> String {
    let mut footer = match &card.short_url {
        Some(url) => format!("*Migrated from [Trello card]({url})*"),
        None => format!("*Migrated from Trello card {}*", card.id),
    };
    for attachment in &card.attachments {
        footer.push_str(&format!("\n- [{}]({})", attachment.name, attachment.url));
    }
    footer
}

/// Union of rule-mapped board labels matching the card's label names and the
/// single list-derived label, deduplicated in first-seen order.
fn issue_labels(card: &Card, plan: &MigrationPlan) -> Vec<String> {
    let card_names: Vec<&str> = card.labels.iter().map(|l| l.name.as_str()).collect();
    let mut labels: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !labels.iter().any(|l| l == name) {
            labels.push(name.to_string());
        }
    };
    for resolved in &plan.labels {
        match resolved {
            ResolvedLabel::Mapped {
                trello_name,
                target,
            } if card_names.contains(&trello_name.as_str()) => push(&target.name),
            ResolvedLabel::ToCreate {
                trello_name, name, ..
            } if card_names.contains(&trello_name.as_str()) => push(name),
            ResolvedLabel::ListMapped {
                list_id, target, ..
            } if *list_id == card.id_list => push(&target.name),
            _ => {}
        }
    }
    labels
}

/// Members that cannot be matched to a verified target user are dropped
/// without comment; partial assignee loss is accepted.
fn issue_assignees(card: &Card, board: &Board, members: &[ResolvedMember]) -> Vec<String> {
    let mut assignees: Vec<String> = Vec::new();
    for member_id in &card.id_members {
        let Some(member) = board.member(member_id) else {
            continue;
        };
        let aliases = [
            Some(member.id.as_str()),
            Some(member.username.as_str()),
            member.full_name.as_deref(),
        ];
        if let Some(user) = find_verified(members, &aliases) {
            if !assignees.contains(&user.login) {
                assignees.push(user.login.clone());
            }
        }
    }
    assignees
}

fn render_comment(action: &Action, members: &[ResolvedMember]) -> String {
    let date = action.date.format("%Y-%m-%d %H:%M UTC");
    let author = match &action.member_creator {
        Some(creator) => {
            let aliases = [Some(creator.username.as_str()), creator.full_name.as_deref()];
            match find_verified(members, &aliases) {
                Some(user) => format!("@{}", user.login),
                None => format!("\"{}\"", creator.username),
            }
        }
        None => "an unknown member".to_string(),
    };
    format!(
        "**{author}** commented on {date}:\n\n{}",
        action.data.text.as_deref().unwrap_or("")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    use crate::resolve::members::ResolvedMember;
    use crate::target::{TargetLabel, TargetUser};

    fn board() -> Board {
        Board::from_json(
            br#"{
                "name": "Product",
                "lists": [{"id": "l1", "name": "Doing"}],
                "cards": [{
                    "id": "c1",
                    "name": "Ship it",
                    "desc": "",
                    "idList": "l1",
                    "shortUrl": "https://trello.com/c/abc",
                    "labels": [{"name": "bug"}, {"name": "ops"}],
                    "idChecklists": ["ch1"],
                    "idMembers": ["m1", "m2"],
                    "attachments": [{"name": "spec.pdf", "url": "https://x/spec.pdf"}]
                }],
                "labels": [],
                "checklists": [{
                    "id": "ch1",
                    "name": "Launch",
                    "checkItems": [
                        {"name": "write docs", "state": "complete"},
                        {"name": "tag release", "state": "incomplete"}
                    ]
                }],
                "members": [
                    {"id": "m1", "username": "alice", "fullName": "Alice A"},
                    {"id": "m2", "username": "bob"}
                ],
                "actions": [
                    {"type": "commentCard", "date": "2024-03-03T00:00:00Z",
                     "memberCreator": {"username": "bob"},
                     "data": {"text": "third", "card": {"id": "c1"}}},
                    {"type": "commentCard", "date": "2024-03-01T00:00:00Z",
                     "memberCreator": {"username": "alice"},
                     "data": {"text": "first", "card": {"id": "c1"}}},
                    {"type": "commentCard", "date": "2024-03-02T00:00:00Z",
                     "memberCreator": {"username": "alice"},
                     "data": {"text": "second", "card": {"id": "c1"}}}
                ]
            }"#,
        )
        .unwrap()
    }

    fn plan(labels: Vec<ResolvedLabel>, members: Vec<ResolvedMember>) -> MigrationPlan {
        MigrationPlan {
            labels,
            milestones: HashMap::new(),
            statuses: HashMap::new(),
            members,
            skip_list_ids: HashSet::new(),
            project: None,
            problems: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn target_label(id: u64, name: &str) -> TargetLabel {
        TargetLabel {
            id,
            name: name.into(),
            color: None,
        }
    }

    fn verified(trello: &str, login: &str) -> ResolvedMember {
        ResolvedMember::Verified {
            trello: trello.into(),
            user: TargetUser {
                id: 1,
                login: login.into(),
            },
        }
    }

    #[test]
    fn body_has_no_leading_or_duplicate_separators() {
        let board = board();
        let plan = plan(Vec::new(), Vec::new());
        let out = transform_card(&board.cards[0], &board, &plan);
        // Empty description, one checklist, one attachment: exactly one
        // separator, between the checklist section and the footer.
        assert_eq!(out.issue.body.matches("\n\n---\n\n").count(), 1);
        assert!(out.issue.body.starts_with("## Checklists"));
        assert!(out.issue.body.contains("- [x] write docs"));
        assert!(out.issue.body.contains("- [ ] tag release"));
        assert!(out.issue.body.contains("[Trello card](https://trello.com/c/abc)"));
        assert!(out.issue.body.contains("[spec.pdf](https://x/spec.pdf)"));
        assert!(!out.issue.body.ends_with("---"));
    }

    #[test]
    fn body_with_description_separates_all_sections() {
        let mut board = board();
        board.cards[0].desc = "A description.".into();
        let plan = plan(Vec::new(), Vec::new());
        let out = transform_card(&board.cards[0], &board, &plan);
        assert_eq!(out.issue.body.matches("\n\n---\n\n").count(), 2);
        assert!(out.issue.body.starts_with("A description."));
    }

    #[test]
    fn labels_are_the_union_of_card_and_list_resolutions() {
        let board = board();
        let plan = plan(
            vec![
                ResolvedLabel::Mapped {
                    trello_name: "bug".into(),
                    target: target_label(1, "bug"),
                },
                ResolvedLabel::ToCreate {
                    trello_name: "ops".into(),
                    name: "operations".into(),
                    color: None,
                },
                ResolvedLabel::Mapped {
                    trello_name: "unrelated".into(),
                    target: target_label(2, "unrelated"),
                },
                ResolvedLabel::ListMapped {
                    list_id: "l1".into(),
                    list_name: "Doing".into(),
                    target: target_label(3, "in-flight"),
                },
                ResolvedLabel::ListMapped {
                    list_id: "l9".into(),
                    list_name: "Other".into(),
                    target: target_label(4, "elsewhere"),
                },
            ],
            Vec::new(),
        );
        let out = transform_card(&board.cards[0], &board, &plan);
        assert_eq!(out.issue.labels, vec!["bug", "operations", "in-flight"]);
    }

    #[test]
    fn unmatched_members_are_silently_dropped_from_assignees() {
        let board = board();
        let plan = plan(Vec::new(), vec![verified("alice", "alice-gh")]);
        let out = transform_card(&board.cards[0], &board, &plan);
        // bob has no verified mapping; no error, just absent.
        assert_eq!(out.issue.assignees, vec!["alice-gh"]);
    }

    #[test]
    fn assignee_matching_accepts_full_name() {
        let board = board();
        let plan = plan(Vec::new(), vec![verified("Alice A", "alice-gh")]);
        let out = transform_card(&board.cards[0], &board, &plan);
        assert_eq!(out.issue.assignees, vec!["alice-gh"]);
    }

    #[test]
    fn comments_render_in_chronological_order() {
        let board = board();
        let plan = plan(Vec::new(), vec![verified("alice", "alice-gh")]);
        let out = transform_card(&board.cards[0], &board, &plan);
        assert_eq!(out.comments.len(), 3);
        assert!(out.comments[0].ends_with("first"));
        assert!(out.comments[1].ends_with("second"));
        assert!(out.comments[2].ends_with("third"));
        // Verified author renders as the target identity, unverified as a
        // quoted source username.
        assert!(out.comments[0].starts_with("**@alice-gh** commented on 2024-03-01"));
        assert!(out.comments[2].starts_with("**\"bob\"** commented on 2024-03-03"));
    }

    #[test]
    fn milestone_comes_from_the_cards_list() {
        let board = board();
        let mut plan = plan(Vec::new(), Vec::new());
        plan.milestones.insert(
            "l1".into(),
            crate::target::Milestone {
                id: 7,
                number: 3,
                title: "v1".into(),
            },
        );
        let out = transform_card(&board.cards[0], &board, &plan);
        assert_eq!(out.issue.milestone, Some(3));
    }
}
