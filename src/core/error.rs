//! Error taxonomy for loading and mutating records
//!
//! Every error here is recoverable at the view boundary: a failed load keeps
//! the previous snapshot, a failed mutation leaves the store untouched.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::backend::ApiError;
use crate::core::record::RecordId;

/// One field-level problem reported by validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Field name, when the problem is attributable to one
    pub field: Option<String>,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Edit rejected because of field-level problems
///
/// Displays the first issue; the rest stay available through `issues`.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
#[error("{}", first_issue(.issues))]
#[diagnostic(
    code(clm::validation),
    help("correct the listed fields and retry the edit")
)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn first_issue(issues: &[FieldIssue]) -> String {
    issues
        .first()
        .map(|i| i.to_string())
        .unwrap_or_else(|| "validation failed".to_string())
}

impl ValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// First message attributed to the given field
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.issues
            .iter()
            .find(|i| i.field.as_deref() == Some(field))
            .map(|i| i.message.as_str())
    }
}

/// Remote list fetch failed; the previous snapshot is still in place
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to load {kind}: {message}")]
    #[diagnostic(code(clm::load::transport), help("check the API URL and retry"))]
    Transport { kind: &'static str, message: String },

    #[error("Failed to load {kind}: HTTP {status}")]
    #[diagnostic(code(clm::load::status), help("the backend rejected the request; retry later"))]
    Status { kind: &'static str, status: u16 },

    #[error("Failed to load {kind}: malformed response ({message})")]
    #[diagnostic(code(clm::load::malformed))]
    Malformed { kind: &'static str, message: String },
}

impl LoadError {
    pub fn from_api(kind: &'static str, err: ApiError) -> Self {
        match err {
            ApiError::Transport(message) => LoadError::Transport { kind, message },
            ApiError::Status { status, .. } => LoadError::Status { kind, status },
            ApiError::Validation(_) => LoadError::Status { kind, status: 422 },
            ApiError::Decode(message) => LoadError::Malformed { kind, message },
        }
    }
}

/// Remote edit/delete failed, or was refused before being sent
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum MutationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("Update failed (HTTP {status})")]
    #[diagnostic(code(clm::mutation::update))]
    UpdateFailed { status: u16, detail: Option<String> },

    #[error("Delete failed (HTTP {status})")]
    #[diagnostic(code(clm::mutation::delete))]
    DeleteFailed { status: u16, detail: Option<String> },

    #[error("Request failed: {0}")]
    #[diagnostic(code(clm::mutation::transport), help("check the API URL and retry"))]
    Transport(String),

    #[error("A request for {kind} {id} is already in flight")]
    #[diagnostic(code(clm::mutation::busy))]
    Busy { kind: &'static str, id: RecordId },

    #[error("No {kind} found with id {id}")]
    #[diagnostic(code(clm::mutation::not_found), help("refresh the list; it may have been removed"))]
    NotFound { kind: &'static str, id: RecordId },

    #[error("{kind} records cannot be {action}")]
    #[diagnostic(code(clm::mutation::unsupported))]
    Unsupported {
        kind: &'static str,
        action: &'static str,
    },
}

impl MutationError {
    pub(crate) fn from_update(err: ApiError) -> Self {
        match err {
            ApiError::Validation(issues) => ValidationError::new(issues).into(),
            ApiError::Status { status, detail } => MutationError::UpdateFailed { status, detail },
            ApiError::Transport(message) | ApiError::Decode(message) => {
                MutationError::Transport(message)
            }
        }
    }

    pub(crate) fn from_delete(err: ApiError) -> Self {
        match err {
            ApiError::Validation(issues) => ValidationError::new(issues).into(),
            ApiError::Status { status, detail } => MutationError::DeleteFailed { status, detail },
            ApiError::Transport(message) | ApiError::Decode(message) => {
                MutationError::Transport(message)
            }
        }
    }
}

/// Configuration file or value problems
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    #[diagnostic(code(clm::config::not_found), help("create it or drop the --config flag"))]
    NotFound(PathBuf),

    #[error("Failed to read config file {}", .path.display())]
    #[diagnostic(code(clm::config::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", .path.display())]
    #[diagnostic(code(clm::config::parse))]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(clm::config::invalid))]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_displays_first_issue() {
        let err = ValidationError::new(vec![
            FieldIssue::new("value", "must be positive"),
            FieldIssue::new("title", "required"),
        ]);
        assert_eq!(err.to_string(), "value: must be positive");
        assert_eq!(err.message_for("title"), Some("required"));
        assert_eq!(err.message_for("agency"), None);
    }

    #[test]
    fn test_validation_error_without_issues() {
        let err = ValidationError::new(Vec::new());
        assert_eq!(err.to_string(), "validation failed");
    }

    #[test]
    fn test_update_failure_includes_status() {
        let err = MutationError::from_update(ApiError::Status {
            status: 500,
            detail: None,
        });
        assert_eq!(err.to_string(), "Update failed (HTTP 500)");

        let err = MutationError::from_delete(ApiError::Status {
            status: 404,
            detail: Some("gone".to_string()),
        });
        assert_eq!(err.to_string(), "Delete failed (HTTP 404)");
    }

    #[test]
    fn test_update_422_becomes_validation() {
        let err = MutationError::from_update(ApiError::Validation(vec![FieldIssue::new(
            "value",
            "value is not a valid float",
        )]));
        assert!(matches!(err, MutationError::Validation(_)));
        assert_eq!(err.to_string(), "value: value is not a valid float");
    }

    #[test]
    fn test_load_error_from_api() {
        let err = LoadError::from_api("contracts", ApiError::Transport("refused".to_string()));
        assert_eq!(err.to_string(), "Failed to load contracts: refused");

        let err = LoadError::from_api(
            "contracts",
            ApiError::Status {
                status: 503,
                detail: None,
            },
        );
        assert_eq!(err.to_string(), "Failed to load contracts: HTTP 503");
    }
}
