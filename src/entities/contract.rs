//! Contract request entity
//!
//! Contract requests move through a four-stage lifecycle
//! (intake → evaluation → approved → executed). They are the only
//! record kind the backend allows editing and deleting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::core::backend::{ApiError, Backend};
use crate::core::error::{FieldIssue, LoadError, ValidationError};
use crate::core::record::{Record, RecordId, RecordKind, RecordStatus};

/// Contract types offered by the intake form
pub const CONTRACT_TYPES: &[&str] = &[
    "Services",
    "Goods",
    "Construction",
    "Consulting",
    "Maintenance",
    "Software License",
    "Professional Services",
];

/// Status-count endpoint
pub const SUMMARY_PATH: &str = "/api/new_contract_request/contracts/summary";

/// Contract lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    /// Submitted, not yet reviewed
    #[default]
    Intake,
    /// Under review
    Evaluation,
    /// Approved for execution
    Approved,
    /// Signed and in force
    Executed,
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as RecordStatus>::parse(&s.to_lowercase())
            .ok_or_else(|| format!("Unknown contract status: {}", s))
    }
}

impl RecordStatus for ContractStatus {
    const ALL: &'static [Self] = &[
        ContractStatus::Intake,
        ContractStatus::Evaluation,
        ContractStatus::Approved,
        ContractStatus::Executed,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Intake => "intake",
            ContractStatus::Evaluation => "evaluation",
            ContractStatus::Approved => "approved",
            ContractStatus::Executed => "executed",
        }
    }
}

/// A contract request as served by the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRequest {
    /// Backend-assigned identifier
    pub id: RecordId,

    pub title: String,

    /// Requesting agency
    pub agency: String,

    /// One of `CONTRACT_TYPES` for requests created through the form
    pub contract_type: String,

    /// Estimated value in USD
    pub value: f64,

    pub status: ContractStatus,

    /// Submission time
    #[serde(
        default,
        alias = "date",
        alias = "created_date",
        with = "crate::core::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,

    /// Server-side path of the uploaded document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl ContractRequest {
    /// Human-facing request number, e.g. `CR-000042`
    pub fn request_number(&self) -> String {
        match &self.id {
            RecordId::Int(n) => format!("CR-{:06}", n),
            RecordId::Str(s) => format!("CR-{}", s),
        }
    }

    /// File name of the attached document
    pub fn attachment_name(&self) -> Option<&str> {
        self.file_path
            .as_deref()
            .and_then(|p| p.rsplit(['/', '\\']).next())
            .filter(|name| !name.is_empty())
    }
}

impl Record for ContractRequest {
    const KIND: RecordKind = RecordKind {
        name: "contract",
        name_plural: "contracts",
        list_path: "/api/new_contract_request/api/contracts_request_list",
        list_envelope: None,
        edit_path: Some("/api/new_contract_request/api/contracts/{id}/edit"),
        delete_path: Some("/api/new_contract_request/api/contracts/{id}/delete"),
        filter_fields: &["status", "agency", "contract_type"],
    };

    type Status = ContractStatus;
    type Patch = ContractEdit;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> ContractStatus {
        self.status
    }

    fn numeric_value(&self) -> Option<f64> {
        Some(self.value)
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.agency, &self.contract_type]
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.as_str().to_string()),
            "agency" => Some(self.agency.clone()),
            "contract_type" | "type" => Some(self.contract_type.clone()),
            _ => None,
        }
    }

    fn apply_patch(&mut self, patch: &ContractEdit) {
        self.title = patch.title.clone();
        self.agency = patch.agency.clone();
        self.contract_type = patch.contract_type.clone();
        self.value = patch.value;
        self.status = patch.status;
    }

    fn validate_patch(&self, patch: &ContractEdit) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if patch.title.trim().is_empty() {
            issues.push(FieldIssue::new("title", "title is required"));
        }
        if patch.agency.trim().is_empty() {
            issues.push(FieldIssue::new("agency", "agency is required"));
        }
        // a stored type from outside the list may be sent back unchanged
        let type_changed = patch.contract_type != self.contract_type;
        if type_changed && !CONTRACT_TYPES.contains(&patch.contract_type.as_str()) {
            issues.push(FieldIssue::new(
                "contract_type",
                format!(
                    "'{}' is not a contract type (expected one of: {})",
                    patch.contract_type,
                    CONTRACT_TYPES.join(", ")
                ),
            ));
        }
        if !patch.value.is_finite() {
            issues.push(FieldIssue::new("value", "value must be a number"));
        } else if patch.value < 0.0 {
            issues.push(FieldIssue::new("value", "value must not be negative"));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

/// Full replacement field set sent by an edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractEdit {
    pub title: String,
    pub agency: String,
    pub contract_type: String,
    pub value: f64,
    pub status: ContractStatus,
}

impl ContractEdit {
    /// Start from the record's current values
    pub fn from_record(record: &ContractRequest) -> Self {
        Self {
            title: record.title.clone(),
            agency: record.agency.clone(),
            contract_type: record.contract_type.clone(),
            value: record.value,
            status: record.status,
        }
    }
}

/// Contract counts per lifecycle stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractSummary {
    /// Count per status name; every known status is present
    pub counts: BTreeMap<String, u64>,
}

impl ContractSummary {
    fn zeroed() -> Self {
        Self {
            counts: ContractStatus::ALL
                .iter()
                .map(|s| (s.as_str().to_string(), 0))
                .collect(),
        }
    }

    /// Count a snapshot locally
    pub fn from_records(records: &[ContractRequest]) -> Self {
        let mut summary = Self::zeroed();
        for record in records {
            *summary
                .counts
                .entry(record.status.as_str().to_string())
                .or_insert(0) += 1;
        }
        summary
    }

    /// Ask the backend for its counts
    ///
    /// The server may report stages this client does not know; they are kept.
    pub fn fetch<B: Backend>(backend: &B) -> Result<Self, LoadError> {
        let body = backend
            .get_json(SUMMARY_PATH)
            .map_err(|e| LoadError::from_api("contract summary", e))?;
        let remote: BTreeMap<String, u64> = serde_json::from_value(body).map_err(|e| {
            LoadError::from_api("contract summary", ApiError::Decode(e.to_string()))
        })?;

        let mut summary = Self::zeroed();
        summary.counts.extend(remote);
        Ok(summary)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn count(&self, status: ContractStatus) -> u64 {
        self.counts.get(status.as_str()).copied().unwrap_or(0)
    }

    /// Counts in lifecycle order, unknown stages last
    pub fn ordered(&self) -> Vec<(&str, u64)> {
        let known = ContractStatus::ALL
            .iter()
            .map(|s| (s.as_str(), self.count(*s)));
        let extra = self
            .counts
            .iter()
            .filter(|(k, _)| ContractStatus::parse(k).is_none())
            .map(|(k, v)| (k.as_str(), *v));
        known.chain(extra).collect()
    }
}
