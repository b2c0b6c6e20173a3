//! CLI command implementations

pub mod audit;
pub mod checklist;
pub mod completions;
pub mod config;
pub mod contract;
pub mod utils;
