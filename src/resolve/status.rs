use std::collections::HashMap;

use crate::model::board::List;
use crate::model::mapping::{ListRule, RefValue};
use crate::resolve::matcher::find_match;
use crate::target::{ProjectInfo, StatusOption};

/// A status option the user opted to create manually on the target project
/// before re-running. Fatal for this run, but reported separately from
/// configuration errors.
#[derive(Debug, Clone)]
pub struct StatusToCreate {
    pub list_id: String,
    pub list_name: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct StatusResolution {
    /// Source list id → status option, for rules that resolved.
    pub by_list: HashMap<String, StatusOption>,
    pub to_create: Vec<StatusToCreate>,
    /// (list name, unresolved reference) for rules without create intent or
    /// with a numeric reference.
    pub missing: Vec<(String, RefValue)>,
    /// List names whose rules carry a status while no project is configured.
    pub without_project: Vec<String>,
}

pub fn resolve_statuses(
    list_rules: &[(&List, &ListRule)],
    project: Option<&ProjectInfo>,
) -> StatusResolution {
    let mut resolution = StatusResolution::default();
    for (list, rule) in list_rules {
        let Some(reference) = &rule.status else {
            continue;
        };
        let Some(project) = project else {
            resolution.without_project.push(list.name.clone());
            continue;
        };
        match find_match(reference, &project.status_options) {
            // An existing option always wins over create intent.
            Some(hit) => {
                resolution.by_list.insert(list.id.clone(), hit.clone());
            }
            None => match reference {
                // Option ids are assigned by the target on creation, so only
                // a name can express something that does not exist yet.
                RefValue::Name(name) if rule.create => {
                    resolution.to_create.push(StatusToCreate {
                        list_id: list.id.clone(),
                        list_name: list.name.clone(),
                        name: name.clone(),
                    });
                }
                _ => resolution
                    .missing
                    .push((list.name.clone(), reference.clone())),
            },
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: &str, name: &str) -> List {
        List {
            id: id.into(),
            name: name.into(),
            closed: false,
        }
    }

    fn rule(list: &str, status: RefValue, create: bool) -> ListRule {
        ListRule {
            list: RefValue::Name(list.into()),
            status: Some(status),
            label: None,
            milestone: None,
            create,
        }
    }

    fn project(options: &[&str]) -> ProjectInfo {
        ProjectInfo {
            id: "PROJ".into(),
            title: "Board".into(),
            status_field_id: "FIELD".into(),
            status_options: options
                .iter()
                .enumerate()
                .map(|(i, name)| StatusOption {
                    id: format!("opt{i}"),
                    name: (*name).to_string(),
                    color: None,
                })
                .collect(),
        }
    }

    #[test]
    fn hit_resolves_even_with_create_flag() {
        let project = project(&["Todo", "Done"]);
        let l = list("l1", "Done");
        let r = rule("Done", RefValue::Name("Done".into()), true);
        let resolution = resolve_statuses(&[(&l, &r)], Some(&project));
        assert_eq!(resolution.by_list["l1"].name, "Done");
        assert!(resolution.to_create.is_empty());
    }

    #[test]
    fn miss_with_create_intent_is_pending_manual_creation() {
        let project = project(&["Todo", "In Progress"]);
        let l = list("l-done", "Done");
        let r = rule("Done", RefValue::Name("Done".into()), true);
        let resolution = resolve_statuses(&[(&l, &r)], Some(&project));
        assert!(resolution.by_list.is_empty());
        assert_eq!(resolution.to_create.len(), 1);
        assert_eq!(resolution.to_create[0].list_id, "l-done");
        assert_eq!(resolution.to_create[0].name, "Done");
        assert!(resolution.missing.is_empty());
    }

    #[test]
    fn miss_without_create_is_missing() {
        let project = project(&["Todo"]);
        let l = list("l1", "Done");
        let r = rule("Done", RefValue::Name("Done".into()), false);
        let resolution = resolve_statuses(&[(&l, &r)], Some(&project));
        assert_eq!(resolution.missing.len(), 1);
        assert!(resolution.to_create.is_empty());
    }

    #[test]
    fn numeric_miss_is_missing_despite_create_flag() {
        let project = project(&["Todo"]);
        let l = list("l1", "Done");
        let r = rule("Done", RefValue::Id(9), true);
        let resolution = resolve_statuses(&[(&l, &r)], Some(&project));
        assert_eq!(resolution.missing.len(), 1);
        assert!(resolution.to_create.is_empty());
    }

    #[test]
    fn status_without_project_is_an_error_not_silence() {
        let l = list("l1", "Done");
        let r = rule("Done", RefValue::Name("Done".into()), false);
        let resolution = resolve_statuses(&[(&l, &r)], None);
        assert_eq!(resolution.without_project, vec!["Done".to_string()]);
        assert!(resolution.missing.is_empty());
    }
}
