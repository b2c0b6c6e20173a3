//! Backend trait - the REST collaborator seen through a narrow interface
//!
//! Transports speak untyped JSON; typing happens in the store, record by
//! record, so a single malformed row never poisons a whole snapshot.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::error::FieldIssue;
use crate::core::record::RecordKind;

/// Failure reported by a backend transport
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("validation failed")]
    Validation(Vec<FieldIssue>),

    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Error body shape used by the backend (FastAPI style)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Issues(Vec<RawIssue>),
    Message(String),
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    msg: String,
    #[serde(default)]
    loc: Vec<Value>,
}

impl RawIssue {
    /// The last non-envelope element of `loc` names the field
    fn into_issue(self) -> FieldIssue {
        let field = self
            .loc
            .iter()
            .rev()
            .find_map(|v| match v {
                Value::String(s) if s != "body" && s != "query" && s != "path" => Some(s.clone()),
                _ => None,
            });
        FieldIssue {
            field,
            message: self.msg,
        }
    }
}

impl ApiError {
    /// Classify a non-success response from its status and raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();

        if status == 422 {
            let issues = match parsed.map(|b| b.detail) {
                Some(Detail::Issues(raw)) if !raw.is_empty() => {
                    raw.into_iter().map(RawIssue::into_issue).collect()
                }
                Some(Detail::Message(msg)) => vec![FieldIssue::general(msg)],
                _ => vec![FieldIssue::general("validation failed")],
            };
            return ApiError::Validation(issues);
        }

        let detail = match parsed.map(|b| b.detail) {
            Some(Detail::Message(msg)) => Some(msg),
            Some(Detail::Issues(raw)) => raw.into_iter().next().map(|i| i.msg),
            None => None,
        };
        ApiError::Status { status, detail }
    }
}

/// Pull the record array out of a list response
pub fn unwrap_list(kind: &RecordKind, body: Value) -> Result<Vec<Value>, ApiError> {
    let list = match kind.list_envelope {
        Some(key) => match body {
            Value::Object(mut map) => map.remove(key).unwrap_or(Value::Null),
            _ => Value::Null,
        },
        None => body,
    };

    match list {
        Value::Array(items) => Ok(items),
        Value::Null => Err(ApiError::Decode(match kind.list_envelope {
            Some(key) => format!("expected an object with a '{}' array", key),
            None => "expected a JSON array".to_string(),
        })),
        other => Err(ApiError::Decode(format!(
            "expected a JSON array, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The remote REST backend
pub trait Backend {
    /// GET a JSON document
    fn get_json(&self, path: &str) -> Result<Value, ApiError>;

    /// PUT a JSON body; the response body is not interpreted
    fn put_json(&self, path: &str, body: &Value) -> Result<(), ApiError>;

    /// DELETE a resource
    fn delete(&self, path: &str) -> Result<(), ApiError>;

    /// Fetch the full snapshot for a record kind
    fn fetch_list(&self, kind: &RecordKind) -> Result<Vec<Value>, ApiError> {
        let body = self.get_json(kind.list_path)?;
        unwrap_list(kind, body)
    }
}

impl<B: Backend + ?Sized> Backend for &B {
    fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        (**self).get_json(path)
    }

    fn put_json(&self, path: &str, body: &Value) -> Result<(), ApiError> {
        (**self).put_json(path, body)
    }

    fn delete(&self, path: &str) -> Result<(), ApiError> {
        (**self).delete(path)
    }

    fn fetch_list(&self, kind: &RecordKind) -> Result<Vec<Value>, ApiError> {
        (**self).fetch_list(kind)
    }
}
