pub mod labels;
pub mod matcher;
pub mod members;
pub mod milestones;
pub mod plan;
pub mod status;
