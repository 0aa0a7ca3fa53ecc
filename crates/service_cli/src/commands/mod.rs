//! CLI command implementations

pub mod benchmark;
pub mod compare;
pub mod price;
