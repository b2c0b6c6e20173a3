//! Presentation adapter - labels, colours, currency and dates
//!
//! Everything here is pure formatting; styling goes through `console` so
//! it degrades to plain text when stdout is not a terminal.

use chrono::{DateTime, Utc};
use console::{style, StyledObject};

use crate::entities::audit_log::AuditCategory;
use crate::entities::checklist::ChecklistStatus;
use crate::entities::contract::ContractStatus;

/// Colour family of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Blue,
    Yellow,
    Green,
    Magenta,
    Red,
    Cyan,
    White,
}

/// Label and colour for a status-like value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub color: BadgeColor,
}

impl Badge {
    pub fn styled(&self) -> StyledObject<&'static str> {
        paint(self.label, self.color)
    }
}

fn paint<D>(value: D, color: BadgeColor) -> StyledObject<D> {
    let s = style(value);
    match color {
        BadgeColor::Blue => s.blue(),
        BadgeColor::Yellow => s.yellow(),
        BadgeColor::Green => s.green(),
        BadgeColor::Magenta => s.magenta(),
        BadgeColor::Red => s.red(),
        BadgeColor::Cyan => s.cyan(),
        BadgeColor::White => s.white(),
    }
}

pub fn contract_badge(status: ContractStatus) -> Badge {
    match status {
        ContractStatus::Intake => Badge {
            label: "Intake",
            color: BadgeColor::Blue,
        },
        ContractStatus::Evaluation => Badge {
            label: "Evaluation",
            color: BadgeColor::Yellow,
        },
        ContractStatus::Approved => Badge {
            label: "Approved",
            color: BadgeColor::Green,
        },
        ContractStatus::Executed => Badge {
            label: "Executed",
            color: BadgeColor::Magenta,
        },
    }
}

pub fn category_badge(category: AuditCategory) -> Badge {
    match category {
        AuditCategory::Risk => Badge {
            label: "Risk",
            color: BadgeColor::Red,
        },
        AuditCategory::Classification => Badge {
            label: "Classification",
            color: BadgeColor::Blue,
        },
        AuditCategory::Approval => Badge {
            label: "Approval",
            color: BadgeColor::Green,
        },
        AuditCategory::Compliance => Badge {
            label: "Compliance",
            color: BadgeColor::Magenta,
        },
        AuditCategory::Analysis => Badge {
            label: "Analysis",
            color: BadgeColor::Cyan,
        },
        AuditCategory::Pending => Badge {
            label: "Pending",
            color: BadgeColor::White,
        },
    }
}

pub fn checklist_badge(status: ChecklistStatus) -> Badge {
    match status {
        ChecklistStatus::Pending => Badge {
            label: "Pending",
            color: BadgeColor::Yellow,
        },
        ChecklistStatus::Complete => Badge {
            label: "Complete",
            color: BadgeColor::Green,
        },
    }
}

/// How an audit decision reads at a glance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionTone {
    Alert,
    Positive,
    Pending,
    Neutral,
}

impl DecisionTone {
    /// Checked in order; the first matching phrase wins
    pub fn of(decision: &str) -> Self {
        if decision.contains("High Risk") || decision.contains("Non-compliant") {
            DecisionTone::Alert
        } else if decision.contains("Approved") || decision.contains("Low Risk") {
            DecisionTone::Positive
        } else if decision.contains("Pending") || decision.contains("Insufficient") {
            DecisionTone::Pending
        } else {
            DecisionTone::Neutral
        }
    }

    pub fn color(&self) -> BadgeColor {
        match self {
            DecisionTone::Alert => BadgeColor::Red,
            DecisionTone::Positive => BadgeColor::Green,
            DecisionTone::Pending => BadgeColor::White,
            DecisionTone::Neutral => BadgeColor::Yellow,
        }
    }

    pub fn paint<D>(&self, value: D) -> StyledObject<D> {
        paint(value, self.color())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    /// ≥80 high, ≥60 medium, otherwise low
    pub fn of(confidence: f64) -> Self {
        if confidence >= 80.0 {
            ConfidenceBand::High
        } else if confidence >= 60.0 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }

    pub fn color(&self) -> BadgeColor {
        match self {
            ConfidenceBand::High => BadgeColor::Blue,
            ConfidenceBand::Medium => BadgeColor::Yellow,
            ConfidenceBand::Low => BadgeColor::Red,
        }
    }
}

/// Ten-cell bar for a 0-100 value
pub fn confidence_bar(confidence: f64) -> String {
    let filled = ((confidence.clamp(0.0, 100.0) / 10.0).round()) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

/// `$250,000.00`
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u128;
    let dollars = cents / 100;
    let rest = cents % 100;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(dollars), rest)
}

/// `$250K`, `$1.5M`; at most one fractional digit
pub fn format_compact_currency(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    for (i, (scale, suffix)) in UNITS.iter().enumerate() {
        if abs >= *scale {
            let scaled = (abs / scale * 10.0).round() / 10.0;
            // 999,950 rounds up to 1000K; show it as 1M instead
            if scaled >= 1000.0 && i > 0 {
                let (up_scale, up_suffix) = UNITS[i - 1];
                let up = (abs / up_scale * 10.0).round() / 10.0;
                return format!("{}${}{}", sign, trim_decimal(up), up_suffix);
            }
            return format!("{}${}{}", sign, trim_decimal(scaled), suffix);
        }
    }

    format!("{}${}", sign, trim_decimal(abs.round()))
}

fn trim_decimal(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `March 15, 2024`
pub fn format_long_date(dt: &DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y").to_string()
}

/// `Mar 15, 2024`
pub fn format_short_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}

/// Short date or a dash when unknown
pub fn format_optional_date(dt: Option<&DateTime<Utc>>) -> String {
    dt.map(format_short_date).unwrap_or_else(|| "-".to_string())
}
