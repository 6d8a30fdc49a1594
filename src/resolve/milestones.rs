use std::collections::HashMap;

use crate::model::board::List;
use crate::model::mapping::{ListRule, RefValue};
use crate::resolve::matcher::find_match;
use crate::target::Milestone;

#[derive(Debug, Default)]
pub struct MilestoneResolution {
    /// Source list id → target milestone.
    pub by_list: HashMap<String, Milestone>,
    /// (list name, unresolved reference). There is no create affordance for
    /// milestones, so every miss is fatal.
    pub missing: Vec<(String, RefValue)>,
}

pub fn resolve_milestones(
    list_rules: &[(&List, &ListRule)],
    target: &[Milestone],
) -> MilestoneResolution {
    let mut resolution = MilestoneResolution::default();
    for (list, rule) in list_rules {
        let Some(reference) = &rule.milestone else {
            continue;
        };
        match find_match(reference, target) {
            Some(hit) => {
                resolution.by_list.insert(list.id.clone(), hit.clone());
            }
            None => resolution
                .missing
                .push((list.name.clone(), reference.clone())),
        }
    }
    resolution
}
