//! Record kinds served by the contract backend

pub mod audit_log;
pub mod checklist;
pub mod contract;

pub use audit_log::{AuditCategory, AuditLogEntry};
pub use checklist::{ChecklistItem, ChecklistStatus};
pub use contract::{ContractEdit, ContractRequest, ContractStatus};
