pub mod board;
pub mod mapping;
