use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Immutable snapshot of a Trello board export. Cards reference lists,
/// checklists and members by id; label names are embedded on the card.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub name: String,
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub labels: Vec<BoardLabel>,
    #[serde(default)]
    pub checklists: Vec<Checklist>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardLabel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub closed: bool,
    pub id_list: String,
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub labels: Vec<CardLabel>,
    #[serde(default)]
    pub id_checklists: Vec<String>,
    #[serde(default)]
    pub id_members: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardLabel {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub check_items: Vec<CheckItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckItem {
    pub name: String,
    pub state: String,
}

impl CheckItem {
    pub fn is_complete(&self) -> bool {
        self.state == "complete"
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// One entry of the board's action log. Only `commentCard` actions are
/// consumed; everything else deserializes and is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub member_creator: Option<ActionMember>,
    #[serde(default)]
    pub data: ActionData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMember {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionData {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub card: Option<ActionCard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionCard {
    pub id: String,
}

impl Board {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("Failed to parse Trello board export")
    }

    pub fn list(&self, id: &str) -> Option<&List> {
        self.lists.iter().find(|l| l.id == id)
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn checklist(&self, id: &str) -> Option<&Checklist> {
        self.checklists.iter().find(|c| c.id == id)
    }

    /// Comment actions attached to one card, oldest first.
    pub fn comments_for(&self, card_id: &str) -> Vec<&Action> {
        let mut comments: Vec<&Action> = self
            .actions
            .iter()
            .filter(|a| {
                a.kind == "commentCard"
                    && a.data.card.as_ref().is_some_and(|c| c.id == card_id)
            })
            .collect();
        comments.sort_by_key(|a| a.date);
        comments
    }

    /// Drops archived cards, cards on archived lists, and cards on skipped
    /// lists. The only mutation the board sees after parsing.
    pub fn filter_cards(
        &mut self,
        keep_closed: bool,
        keep_closed_lists: bool,
        skip_list_ids: &HashSet<String>,
    ) -> usize {
        let closed_lists: HashSet<&str> = self
            .lists
            .iter()
            .filter(|l| l.closed)
            .map(|l| l.id.as_str())
            .collect();
        let before = self.cards.len();
        self.cards.retain(|card| {
            if card.closed && !keep_closed {
                return false;
            }
            if closed_lists.contains(card.id_list.as_str()) && !keep_closed_lists {
                return false;
            }
            !skip_list_ids.contains(&card.id_list)
        });
        before - self.cards.len()
    }
}
