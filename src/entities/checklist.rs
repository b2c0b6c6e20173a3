//! Closeout checklist items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::record::{ReadOnly, Record, RecordId, RecordKind, RecordStatus};

/// Derived from `checked`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistStatus {
    Pending,
    Complete,
}

impl std::fmt::Display for ChecklistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChecklistStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as RecordStatus>::parse(&s.to_lowercase())
            .ok_or_else(|| format!("Unknown checklist status: {}", s))
    }
}

impl RecordStatus for ChecklistStatus {
    const ALL: &'static [Self] = &[ChecklistStatus::Pending, ChecklistStatus::Complete];

    fn as_str(&self) -> &'static str {
        match self {
            ChecklistStatus::Pending => "pending",
            ChecklistStatus::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: RecordId,

    /// What has to be done
    pub text: String,

    #[serde(default)]
    pub checked: bool,

    /// Required items gate closeout readiness; items are required unless
    /// the server says otherwise
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Record for ChecklistItem {
    const KIND: RecordKind = RecordKind {
        name: "checklist item",
        name_plural: "checklist items",
        list_path: "/api/closeout_report/checklist/default",
        list_envelope: Some("checklist"),
        edit_path: None,
        delete_path: None,
        filter_fields: &["status", "required"],
    };

    type Status = ChecklistStatus;
    type Patch = ReadOnly;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.text
    }

    fn status(&self) -> ChecklistStatus {
        if self.checked {
            ChecklistStatus::Complete
        } else {
            ChecklistStatus::Pending
        }
    }

    fn numeric_value(&self) -> Option<f64> {
        None
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.text]
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status().as_str().to_string()),
            "required" => Some(self.required.to_string()),
            _ => None,
        }
    }

    fn apply_patch(&mut self, patch: &ReadOnly) {
        match *patch {}
    }
}

/// Completion figures for a checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistProgress {
    pub completed: usize,
    pub total: usize,
    pub required_completed: usize,
    pub required_total: usize,
}

impl ChecklistProgress {
    pub fn compute<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a ChecklistItem>,
    {
        let mut progress = Self {
            completed: 0,
            total: 0,
            required_completed: 0,
            required_total: 0,
        };
        for item in items {
            progress.total += 1;
            if item.checked {
                progress.completed += 1;
            }
            if item.required {
                progress.required_total += 1;
                if item.checked {
                    progress.required_completed += 1;
                }
            }
        }
        progress
    }

    /// Whole-percent completion; 0 for an empty checklist
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
        }
    }

    /// Required items still open
    pub fn required_pending(&self) -> usize {
        self.required_total - self.required_completed
    }

    /// Every required item is checked
    pub fn ready_for_closeout(&self) -> bool {
        self.required_completed == self.required_total
    }
}
