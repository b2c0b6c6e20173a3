//! Record trait - common interface for all list-managed record kinds

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::ValidationError;

/// Backend-assigned record identifier
///
/// The backend hands out either integers or strings. Numeric strings are
/// normalized to integers so that `"7"` and `7` name the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Parse a user-supplied identifier
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => RecordId::Int(n),
            _ => RecordId::Str(s.to_string()),
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::parse(s)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecordId::Int(n) => serializer.serialize_i64(*n),
            RecordId::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Ok(RecordId::Int(n)),
            Raw::Str(s) if s.trim().is_empty() => {
                Err(serde::de::Error::custom("record id must not be empty"))
            }
            Raw::Str(s) => Ok(RecordId::parse(&s)),
        }
    }
}

/// Static description of a record kind and where the backend serves it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKind {
    /// Singular name for messages (e.g., "contract")
    pub name: &'static str,
    /// Plural name for messages (e.g., "contracts")
    pub name_plural: &'static str,
    /// Path of the full-snapshot list endpoint
    pub list_path: &'static str,
    /// Key wrapping the list array in the response body, if any
    pub list_envelope: Option<&'static str>,
    /// Edit endpoint template; `{id}` is substituted
    pub edit_path: Option<&'static str>,
    /// Delete endpoint template; `{id}` is substituted
    pub delete_path: Option<&'static str>,
    /// Fields that accept exact-match filters
    pub filter_fields: &'static [&'static str],
}

impl RecordKind {
    pub fn edit_path_for(&self, id: &RecordId) -> Option<String> {
        self.edit_path.map(|p| p.replace("{id}", &id.to_string()))
    }

    pub fn delete_path_for(&self, id: &RecordId) -> Option<String> {
        self.delete_path.map(|p| p.replace("{id}", &id.to_string()))
    }

    pub fn accepts_filter(&self, field: &str) -> bool {
        self.filter_fields.contains(&field)
    }
}

/// A finite status enum carried by a record kind
pub trait RecordStatus: Copy + Eq + std::fmt::Debug + std::fmt::Display + 'static {
    /// Every declared value, in lifecycle order
    const ALL: &'static [Self];

    /// Wire representation
    fn as_str(&self) -> &'static str;

    /// Parse a wire value; unknown values are rejected
    fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    /// Position in lifecycle order, used for sorting
    fn rank(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(usize::MAX)
    }
}

/// Patch type for kinds the backend does not allow editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadOnly {}

/// Common trait for all record kinds
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Endpoint and naming information
    const KIND: RecordKind;

    type Status: RecordStatus;

    /// Full replacement field set sent on edit
    type Patch: Serialize + Clone + std::fmt::Debug;

    /// Get the record's unique ID
    fn id(&self) -> &RecordId;

    /// Get the display title
    fn title(&self) -> &str;

    /// Get the record's status
    fn status(&self) -> Self::Status;

    /// Get the numeric value used by range filters, if the kind has one
    fn numeric_value(&self) -> Option<f64>;

    /// Get the creation timestamp, if known
    fn created(&self) -> Option<DateTime<Utc>>;

    /// Text fields matched by free-text search
    fn search_fields(&self) -> Vec<&str>;

    /// Value of a filterable field, by name
    fn field(&self, name: &str) -> Option<String>;

    /// Overwrite this record's fields from a patch
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Client-side checks run before a patch is sent to this record
    fn validate_patch(&self, _patch: &Self::Patch) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Invariants checked when a record enters a snapshot
    fn check(&self) -> Result<(), String> {
        match self.numeric_value() {
            Some(v) if !v.is_finite() => Err(format!("value {} is not a finite number", v)),
            Some(v) if v < 0.0 => Err(format!("value {} is negative", v)),
            _ => Ok(()),
        }
    }
}
