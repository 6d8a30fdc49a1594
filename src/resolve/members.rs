use crate::model::mapping::UserRule;
use crate::target::{TargetClient, TargetError, TargetUser};

/// Outcome of a user rule. Verified entries carry a confirmed target
/// identity; unverified entries only record what the lookup attempted.
#[derive(Debug, Clone)]
pub enum ResolvedMember {
    Verified { trello: String, user: TargetUser },
    Unverified { trello: String, github: String },
}

impl ResolvedMember {
    pub fn trello(&self) -> &str {
        match self {
            ResolvedMember::Verified { trello, .. } => trello,
            ResolvedMember::Unverified { trello, .. } => trello,
        }
    }
}

/// Looks every user rule up on the target. A not-found answer is expected
/// and becomes `Unverified`; any other failure propagates.
pub async fn resolve_members(
    rules: &[UserRule],
    client: &dyn TargetClient,
) -> Result<Vec<ResolvedMember>, TargetError> {
    let mut members = Vec::with_capacity(rules.len());
    for rule in rules {
        match client.lookup_user(&rule.github).await {
            Ok(user) => members.push(ResolvedMember::Verified {
                trello: rule.trello.clone(),
                user,
            }),
            Err(TargetError::NotFound(_)) => members.push(ResolvedMember::Unverified {
                trello: rule.trello.clone(),
                github: rule.github.clone(),
            }),
            Err(err) => return Err(err),
        }
    }
    Ok(members)
}

/// A verified member whose source name equals any of the given aliases
/// (Trello member id, username, or full name). First match wins.
pub fn find_verified<'a>(
    members: &'a [ResolvedMember],
    aliases: &[Option<&str>],
) -> Option<&'a TargetUser> {
    members.iter().find_map(|member| match member {
        ResolvedMember::Verified { trello, user }
            if aliases.iter().flatten().any(|alias| alias == trello) =>
        {
            Some(user)
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::tests::MockTarget;

    fn rule(trello: &str, github: &str) -> UserRule {
        UserRule {
            trello: trello.into(),
            github: github.into(),
        }
    }

    #[tokio::test]
    async fn known_user_is_verified() {
        let client = MockTarget::default().with_users(&["alice-gh"]);
        let members = resolve_members(&[rule("alice", "alice-gh")], &client)
            .await
            .unwrap();
        match &members[0] {
            ResolvedMember::Verified { trello, user } => {
                assert_eq!(trello, "alice");
                assert_eq!(user.login, "alice-gh");
            }
            other => panic!("expected Verified, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn not_found_becomes_unverified() {
        let client = MockTarget::default();
        let members = resolve_members(&[rule("bob", "no-such-login")], &client)
            .await
            .unwrap();
        assert!(matches!(members[0], ResolvedMember::Unverified { .. }));
    }

    #[test]
    fn find_verified_matches_any_alias_and_skips_unverified() {
        let members = vec![
            ResolvedMember::Unverified {
                trello: "alice".into(),
                github: "gone".into(),
            },
            ResolvedMember::Verified {
                trello: "Alice Smith".into(),
                user: TargetUser {
                    id: 1,
                    login: "alice-gh".into(),
                },
            },
        ];
        let user = find_verified(&members, &[Some("m1"), Some("alice"), Some("Alice Smith")]);
        assert_eq!(user.unwrap().login, "alice-gh");
        assert!(find_verified(&members, &[Some("nobody")]).is_none());
    }
}
