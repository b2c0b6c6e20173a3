//! Filter and sort enums for list commands
//!
//! Each filter maps onto an exact-match field constraint of the filter
//! engine; `All` leaves the field unconstrained.

use clap::ValueEnum;

use crate::core::record::RecordStatus;
use crate::core::sort::SortKey;
use crate::entities::audit_log::AuditCategory;
use crate::entities::checklist::ChecklistStatus;
use crate::entities::contract::ContractStatus;

/// Contract status filter
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ContractStatusFilter {
    Intake,
    Evaluation,
    Approved,
    Executed,
    /// Every status - default
    #[default]
    All,
}

impl ContractStatusFilter {
    pub fn status(&self) -> Option<ContractStatus> {
        match self {
            ContractStatusFilter::Intake => Some(ContractStatus::Intake),
            ContractStatusFilter::Evaluation => Some(ContractStatus::Evaluation),
            ContractStatusFilter::Approved => Some(ContractStatus::Approved),
            ContractStatusFilter::Executed => Some(ContractStatus::Executed),
            ContractStatusFilter::All => None,
        }
    }

    /// Value for the `status` field filter; empty is a wildcard
    pub fn field_value(&self) -> &'static str {
        self.status().map(|s| s.as_str()).unwrap_or("")
    }
}

impl std::fmt::Display for ContractStatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "all"),
        }
    }
}

/// Audit category filter
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum AuditCategoryFilter {
    Risk,
    Classification,
    Approval,
    Compliance,
    Analysis,
    Pending,
    /// Every category - default
    #[default]
    All,
}

impl AuditCategoryFilter {
    pub fn category(&self) -> Option<AuditCategory> {
        match self {
            AuditCategoryFilter::Risk => Some(AuditCategory::Risk),
            AuditCategoryFilter::Classification => Some(AuditCategory::Classification),
            AuditCategoryFilter::Approval => Some(AuditCategory::Approval),
            AuditCategoryFilter::Compliance => Some(AuditCategory::Compliance),
            AuditCategoryFilter::Analysis => Some(AuditCategory::Analysis),
            AuditCategoryFilter::Pending => Some(AuditCategory::Pending),
            AuditCategoryFilter::All => None,
        }
    }

    pub fn field_value(&self) -> &'static str {
        self.category().map(|c| c.as_str()).unwrap_or("")
    }
}

/// Checklist status filter
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ChecklistStatusFilter {
    Pending,
    Complete,
    #[default]
    All,
}

impl ChecklistStatusFilter {
    pub fn field_value(&self) -> &'static str {
        match self {
            ChecklistStatusFilter::Pending => ChecklistStatus::Pending.as_str(),
            ChecklistStatusFilter::Complete => ChecklistStatus::Complete.as_str(),
            ChecklistStatusFilter::All => "",
        }
    }
}

/// Sort field for list commands
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Value,
    Status,
    Created,
}

impl From<SortField> for SortKey {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Id => SortKey::Id,
            SortField::Title => SortKey::Title,
            SortField::Value => SortKey::Value,
            SortField::Status => SortKey::Status,
            SortField::Created => SortKey::Created,
        }
    }
}
