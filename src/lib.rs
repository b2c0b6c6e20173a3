//! Contract Desk: browse and maintain contract-lifecycle records
//!
//! Loads record snapshots (contract requests, AI audit log entries, closeout
//! checklist items) from a REST backend, filters and pages them locally, and
//! sends edits and deletes back with per-record single-flight.

pub mod cli;
pub mod core;
pub mod entities;
