//! AI audit log entry
//!
//! One row per automated decision (risk assessment, classification, vendor
//! evaluation...). Entries are read-only; the category plays the role of a
//! status for badges and filtering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

use crate::core::record::{ReadOnly, Record, RecordId, RecordKind, RecordStatus};

/// Confidence at or above which a decision counts as high confidence
pub const HIGH_CONFIDENCE: f64 = 80.0;

/// Column headers of the CSV export
pub const CSV_HEADERS: [&str; 6] = [
    "Timestamp",
    "User",
    "Action",
    "AI Decision",
    "Confidence %",
    "Details",
];

/// Kind of automated decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditCategory {
    Risk,
    Classification,
    Approval,
    Compliance,
    Analysis,
    Pending,
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as RecordStatus>::parse(&s.to_lowercase())
            .ok_or_else(|| format!("Unknown audit category: {}", s))
    }
}

impl RecordStatus for AuditCategory {
    const ALL: &'static [Self] = &[
        AuditCategory::Risk,
        AuditCategory::Classification,
        AuditCategory::Approval,
        AuditCategory::Compliance,
        AuditCategory::Analysis,
        AuditCategory::Pending,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            AuditCategory::Risk => "risk",
            AuditCategory::Classification => "classification",
            AuditCategory::Approval => "approval",
            AuditCategory::Compliance => "compliance",
            AuditCategory::Analysis => "analysis",
            AuditCategory::Pending => "pending",
        }
    }
}

/// One AI decision from the audit log
///
/// The list endpoint `/api/admin/audit-logs` is assumed: the backend only
/// exposes a CSV export for admins, so the JSON list shape mirrors the
/// export columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: RecordId,

    /// When the decision was made
    #[serde(
        default,
        with = "crate::core::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,

    /// User who triggered the action
    pub user: String,

    /// Action performed (e.g., "Contract Risk Assessment")
    pub action: String,

    /// Decision text produced by the model
    #[serde(alias = "aiDecision")]
    pub ai_decision: String,

    /// Model confidence, 0-100
    pub confidence: f64,

    #[serde(default)]
    pub details: String,

    pub category: AuditCategory,
}

impl AuditLogEntry {
    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= HIGH_CONFIDENCE
    }

    pub fn is_risk_alert(&self) -> bool {
        self.ai_decision.contains("High Risk")
    }

    /// Timestamp as the backend writes it, `YYYY-MM-DD HH:MM:SS`
    pub fn timestamp_text(&self) -> String {
        self.timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

impl Record for AuditLogEntry {
    const KIND: RecordKind = RecordKind {
        name: "audit log entry",
        name_plural: "audit log entries",
        list_path: "/api/admin/audit-logs",
        list_envelope: None,
        edit_path: None,
        delete_path: None,
        filter_fields: &["user", "action", "category"],
    };

    type Status = AuditCategory;
    type Patch = ReadOnly;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.action
    }

    fn status(&self) -> AuditCategory {
        self.category
    }

    fn numeric_value(&self) -> Option<f64> {
        Some(self.confidence)
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.user, &self.action, &self.ai_decision]
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "user" => Some(self.user.clone()),
            "action" => Some(self.action.clone()),
            "category" | "status" => Some(self.category.as_str().to_string()),
            _ => None,
        }
    }

    fn apply_patch(&mut self, patch: &ReadOnly) {
        match *patch {}
    }

    fn check(&self) -> Result<(), String> {
        if !self.confidence.is_finite() || !(0.0..=100.0).contains(&self.confidence) {
            return Err(format!(
                "confidence {} is outside 0-100",
                self.confidence
            ));
        }
        Ok(())
    }
}

/// Headline numbers for a set of audit entries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditStats {
    pub total: usize,
    pub high_confidence: usize,
    pub risk_alerts: usize,
    /// Mean confidence rounded to a whole percent; `None` when empty
    pub average_confidence: Option<u32>,
}

impl AuditStats {
    pub fn compute<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a AuditLogEntry>,
    {
        let mut total = 0;
        let mut high_confidence = 0;
        let mut risk_alerts = 0;
        let mut sum = 0.0;

        for entry in entries {
            total += 1;
            sum += entry.confidence;
            if entry.is_high_confidence() {
                high_confidence += 1;
            }
            if entry.is_risk_alert() {
                risk_alerts += 1;
            }
        }

        Self {
            total,
            high_confidence,
            risk_alerts,
            average_confidence: (total > 0).then(|| (sum / total as f64).round() as u32),
        }
    }
}

/// Write entries as CSV with every field quoted
pub fn write_csv<'a, W, I>(writer: W, entries: I) -> csv::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a AuditLogEntry>,
{
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    wtr.write_record(CSV_HEADERS)?;
    for entry in entries {
        wtr.write_record([
            entry.timestamp_text(),
            entry.user.clone(),
            entry.action.clone(),
            entry.ai_decision.clone(),
            entry.confidence.to_string(),
            entry.details.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Default export file name for a given day
pub fn export_file_name(day: chrono::NaiveDate) -> String {
    format!("ai-audit-logs-{}.csv", day.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: i64, decision: &str, confidence: f64) -> AuditLogEntry {
        serde_json::from_value(json!({
            "id": id,
            "timestamp": "2025-01-20 14:30:22",
            "user": "John Doe",
            "action": "Contract Risk Assessment",
            "aiDecision": decision,
            "confidence": confidence,
            "details": "Unusual termination clauses detected",
            "category": "risk"
        }))
        .unwrap()
    }

    #[test]
    fn test_camel_case_alias() {
        let e = entry(1, "High Risk - Recommend Legal Review", 89.0);
        assert_eq!(e.ai_decision, "High Risk - Recommend Legal Review");
        assert_eq!(e.timestamp_text(), "2025-01-20 14:30:22");
        assert_eq!(e.status(), AuditCategory::Risk);
    }

    #[test]
    fn test_search_fields_cover_decision() {
        let e = entry(1, "Non-compliant - GDPR Issues", 92.0);
        let fields = e.search_fields();
        assert!(fields.iter().any(|f| f.contains("GDPR")));
        assert!(!fields.iter().any(|f| f.contains("termination")));
    }

    #[test]
    fn test_confidence_out_of_range_fails_check() {
        assert!(entry(1, "x", 100.0).check().is_ok());
        assert!(entry(1, "x", 101.0).check().is_err());
        assert!(entry(1, "x", -1.0).check().is_err());
    }

    #[test]
    fn test_stats() {
        let entries = vec![
            entry(1, "High Risk - Recommend Legal Review", 89.0),
            entry(2, "Approved - Low Risk Vendor", 78.0),
            entry(3, "Pending Review - Insufficient Data", 45.0),
        ];
        let stats = AuditStats::compute(&entries);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.high_confidence, 1);
        assert_eq!(stats.risk_alerts, 1);
        assert_eq!(stats.average_confidence, Some(71));

        let empty: Vec<AuditLogEntry> = Vec::new();
        assert_eq!(AuditStats::compute(&empty).average_confidence, None);
    }

    #[test]
    fn test_csv_export_quotes_everything() {
        let entries = vec![entry(1, "15% Above Market Rate, review", 82.0)];
        let mut out = Vec::new();
        write_csv(&mut out, &entries).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("\"Timestamp\",\"User\",\"Action\",\"AI Decision\",\"Confidence %\",\"Details\"")
        );
        assert_eq!(
            lines.next(),
            Some("\"2025-01-20 14:30:22\",\"John Doe\",\"Contract Risk Assessment\",\"15% Above Market Rate, review\",\"82\",\"Unusual termination clauses detected\"")
        );
    }

    #[test]
    fn test_export_file_name() {
        let day = chrono::NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        assert_eq!(export_file_name(day), "ai-audit-logs-2025-01-20.csv");
    }
}
