use crate::model::board::{BoardLabel, List};
use crate::model::mapping::{LabelRule, ListRule, RefValue};
use crate::resolve::matcher::find_match;
use crate::target::TargetLabel;

/// Classification of one source label or one list-level label rule.
/// Consumers match exhaustively; a new variant cannot be silently ignored.
#[derive(Debug, Clone)]
pub enum ResolvedLabel {
    /// No rule mentions the source label; its cards lose it.
    Skipped { trello_name: String },
    /// Create rule: the label is made on the target before any issue.
    ToCreate {
        trello_name: String,
        name: String,
        color: Option<String>,
    },
    /// Lookup rule matched an existing target label.
    Mapped {
        trello_name: String,
        target: TargetLabel,
    },
    /// Lookup rule missed. Fatal.
    Missing {
        trello_name: String,
        reference: RefValue,
    },
    /// A list rule's label matched; every card on the list gets it.
    ListMapped {
        list_id: String,
        list_name: String,
        target: TargetLabel,
    },
    /// A list rule's label missed. Fatal.
    MissingList {
        list_name: String,
        reference: RefValue,
    },
}

/// Strips an optional leading `#`, lowercases, and accepts 3- or 6-digit hex.
pub fn normalize_color(raw: &str) -> Option<String> {
    let hex = raw.strip_prefix('#').unwrap_or(raw).to_ascii_lowercase();
    if (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hex)
    } else {
        None
    }
}

/// Classifies every named source label against the label rules. Unnamed
/// Trello color swatches are ignored outright.
pub fn resolve_labels(
    board_labels: &[BoardLabel],
    rules: &[LabelRule],
    target: &[TargetLabel],
) -> Vec<ResolvedLabel> {
    board_labels
        .iter()
        .filter(|label| !label.name.is_empty())
        .map(|label| {
            let Some(rule) = rules.iter().find(|r| r.trello == label.name) else {
                return ResolvedLabel::Skipped {
                    trello_name: label.name.clone(),
                };
            };
            if rule.create {
                return match &rule.github {
                    RefValue::Name(name) => ResolvedLabel::ToCreate {
                        trello_name: label.name.clone(),
                        name: name.clone(),
                        color: rule.color.as_deref().and_then(normalize_color),
                    },
                    // A label cannot be created under a numeric id.
                    reference @ RefValue::Id(_) => ResolvedLabel::Missing {
                        trello_name: label.name.clone(),
                        reference: reference.clone(),
                    },
                };
            }
            match find_match(&rule.github, target) {
                Some(hit) => ResolvedLabel::Mapped {
                    trello_name: label.name.clone(),
                    target: hit.clone(),
                },
                None => ResolvedLabel::Missing {
                    trello_name: label.name.clone(),
                    reference: rule.github.clone(),
                },
            }
        })
        .collect()
}

/// Resolves the label reference of each list rule that carries one. The list
/// itself was already resolved by the caller; label, milestone and status
/// rules on one list are independent of each other.
pub fn resolve_list_labels(
    list_rules: &[(&List, &ListRule)],
    target: &[TargetLabel],
) -> Vec<ResolvedLabel> {
    list_rules
        .iter()
        .filter_map(|(list, rule)| {
            let reference = rule.label.as_ref()?;
            Some(match find_match(reference, target) {
                Some(hit) => ResolvedLabel::ListMapped {
                    list_id: list.id.clone(),
                    list_name: list.name.clone(),
                    target: hit.clone(),
                },
                None => ResolvedLabel::MissingList {
                    list_name: list.name.clone(),
                    reference: reference.clone(),
                },
            })
        })
        .collect()
}
