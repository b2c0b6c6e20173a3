//! Filter engine - pure predicate evaluation over a snapshot
//!
//! Every active predicate is ANDed. Empty search text and empty field
//! values are wildcards.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::core::record::Record;

/// Filter criteria applied to a record list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against the kind's text fields
    pub search: String,

    /// Exact-match constraints keyed by field name
    pub fields: BTreeMap<String, String>,

    /// Inclusive lower bound on the numeric value
    pub min_value: Option<f64>,

    /// Inclusive upper bound on the numeric value
    pub max_value: Option<f64>,

    /// Inclusive lower bound on the creation timestamp
    pub created_since: Option<DateTime<Utc>>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_min_value(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn with_max_value(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn with_created_since(mut self, since: DateTime<Utc>) -> Self {
        self.created_since = Some(since);
        self
    }

    /// True when at least one predicate would exclude something
    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || self.fields.values().any(|v| !v.is_empty())
            || self.min_value.is_some()
            || self.max_value.is_some()
            || self.created_since.is_some()
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.matches_search(record)
            && self.matches_fields(record)
            && self.matches_value(record)
            && self.matches_created(record)
    }

    fn matches_search<R: Record>(&self, record: &R) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        record
            .search_fields()
            .iter()
            .any(|text| text.to_lowercase().contains(&needle))
    }

    fn matches_fields<R: Record>(&self, record: &R) -> bool {
        self.fields
            .iter()
            .filter(|(_, wanted)| !wanted.is_empty())
            .all(|(name, wanted)| record.field(name).as_deref() == Some(wanted.as_str()))
    }

    fn matches_value<R: Record>(&self, record: &R) -> bool {
        if self.min_value.is_none() && self.max_value.is_none() {
            return true;
        }
        let Some(value) = record.numeric_value() else {
            return false;
        };
        self.min_value.map_or(true, |min| value >= min)
            && self.max_value.map_or(true, |max| value <= max)
    }

    fn matches_created<R: Record>(&self, record: &R) -> bool {
        match self.created_since {
            None => true,
            Some(since) => record.created().is_some_and(|created| created >= since),
        }
    }
}

/// Records satisfying every active predicate, in original order
pub fn filter<'a, R: Record>(records: &'a [R], criteria: &FilterCriteria) -> Vec<&'a R> {
    records.iter().filter(|r| criteria.matches(*r)).collect()
}

/// Positions of matching records, in original order
pub fn filter_indices<R: Record>(records: &[R], criteria: &FilterCriteria) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(*r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::RecordId;
    use crate::entities::contract::{ContractRequest, ContractStatus};
    use chrono::TimeZone;

    fn contract(id: i64, title: &str, agency: &str, status: ContractStatus, value: f64) -> ContractRequest {
        ContractRequest {
            id: RecordId::Int(id),
            title: title.to_string(),
            agency: agency.to_string(),
            contract_type: "Services".to_string(),
            value,
            status,
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, id as u32, 0, 0, 0).unwrap()),
            file_path: None,
        }
    }

    fn sample() -> Vec<ContractRequest> {
        vec![
            contract(1, "Software Development Services", "Department of Technology", ContractStatus::Intake, 250_000.0),
            contract(2, "Office Equipment Purchase", "Administrative Services", ContractStatus::Evaluation, 75_000.0),
            contract(3, "Building Maintenance", "Facilities Management", ContractStatus::Approved, 180_000.0),
        ]
    }

    fn ids(records: &[&ContractRequest]) -> Vec<i64> {
        records
            .iter()
            .map(|r| match r.id {
                RecordId::Int(n) => n,
                RecordId::Str(_) => -1,
            })
            .collect()
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let records = sample();
        let criteria = FilterCriteria::new();
        assert!(!criteria.is_active());
        assert_eq!(ids(&filter(&records, &criteria)), vec![1, 2, 3]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let records = sample();
        assert_eq!(ids(&filter(&records, &FilterCriteria::new().with_search("OFFICE"))), vec![2]);
        // agency text is searched too
        assert_eq!(ids(&filter(&records, &FilterCriteria::new().with_search("facilities"))), vec![3]);
        // "services" appears in a title, an agency and every contract type
        assert_eq!(ids(&filter(&records, &FilterCriteria::new().with_search("services"))), vec![1, 2, 3]);
    }

    #[test]
    fn test_field_filter_exact_match() {
        let records = sample();
        let criteria = FilterCriteria::new().with_field("status", "approved");
        assert_eq!(ids(&filter(&records, &criteria)), vec![3]);

        // substring is not enough for field filters
        let criteria = FilterCriteria::new().with_field("agency", "Facilities");
        assert!(filter(&records, &criteria).is_empty());
    }

    #[test]
    fn test_empty_field_value_is_wildcard() {
        let records = sample();
        let criteria = FilterCriteria::new().with_field("status", "");
        assert!(!criteria.is_active());
        assert_eq!(filter(&records, &criteria).len(), 3);
    }

    #[test]
    fn test_unknown_field_matches_nothing() {
        let records = sample();
        let criteria = FilterCriteria::new().with_field("colour", "red");
        assert!(filter(&records, &criteria).is_empty());
    }

    #[test]
    fn test_value_bounds_are_inclusive() {
        let records = sample();
        let criteria = FilterCriteria::new().with_min_value(75_000.0).with_max_value(180_000.0);
        assert_eq!(ids(&filter(&records, &criteria)), vec![2, 3]);
    }

    #[test]
    fn test_created_since() {
        let records = sample();
        let since = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let criteria = FilterCriteria::new().with_created_since(since);
        assert_eq!(ids(&filter(&records, &criteria)), vec![2, 3]);
    }

    #[test]
    fn test_predicates_are_anded() {
        let records = sample();
        let criteria = FilterCriteria::new()
            .with_search("services")
            .with_field("status", "evaluation")
            .with_max_value(100_000.0);
        assert_eq!(ids(&filter(&records, &criteria)), vec![2]);

        let criteria = criteria.with_min_value(80_000.0);
        assert!(filter(&records, &criteria).is_empty());
    }

    #[test]
    fn test_filter_agrees_with_matches() {
        let records = sample();
        let criteria = FilterCriteria::new().with_search("e").with_min_value(100_000.0);
        let result = filter(&records, &criteria);

        // no false positives
        assert!(result.iter().all(|r| criteria.matches(*r)));
        // no false negatives
        let expected = records.iter().filter(|r| criteria.matches(*r)).count();
        assert_eq!(result.len(), expected);
        assert_eq!(filter_indices(&records, &criteria), vec![0, 2]);
    }
}
