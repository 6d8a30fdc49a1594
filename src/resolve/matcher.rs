use crate::model::board::List;
use crate::model::mapping::RefValue;
use crate::target::{Milestone, StatusOption, TargetLabel};

/// A candidate entity the matcher can resolve a reference against.
pub trait Matchable {
    /// True when a numeric reference equals this candidate's id or number.
    fn matches_id(&self, id: u64) -> bool;
    /// Exact string comparison, no normalization or case folding.
    fn matches_name(&self, name: &str) -> bool;
}

/// First candidate matching the reference wins; candidate order is stable
/// for a fixed snapshot, so resolution is deterministic.
pub fn find_match<'a, T: Matchable>(reference: &RefValue, candidates: &'a [T]) -> Option<&'a T> {
    candidates.iter().find(|c| match reference {
        RefValue::Id(id) => c.matches_id(*id),
        RefValue::Name(name) => c.matches_name(name),
    })
}

impl Matchable for TargetLabel {
    fn matches_id(&self, id: u64) -> bool {
        self.id == id
    }
    fn matches_name(&self, name: &str) -> bool {
        self.name == name
    }
}

impl Matchable for Milestone {
    fn matches_id(&self, id: u64) -> bool {
        self.id == id || self.number == id
    }
    fn matches_name(&self, name: &str) -> bool {
        self.title == name
    }
}

impl Matchable for StatusOption {
    // Option ids are opaque strings assigned by the target; a numeric
    // reference can never match one.
    fn matches_id(&self, _id: u64) -> bool {
        false
    }
    fn matches_name(&self, name: &str) -> bool {
        self.name == name
    }
}

impl Matchable for List {
    // Trello list ids are hex strings, so they arrive on the string arm.
    fn matches_id(&self, _id: u64) -> bool {
        false
    }
    fn matches_name(&self, name: &str) -> bool {
        self.name == name || self.id == name
    }
}
