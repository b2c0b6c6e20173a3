//! Client-side ordering of filtered records

use std::cmp::Ordering;

use crate::core::record::{Record, RecordStatus};

/// Field to order a list by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Title,
    Value,
    Status,
    Created,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Id => write!(f, "id"),
            SortKey::Title => write!(f, "title"),
            SortKey::Value => write!(f, "value"),
            SortKey::Status => write!(f, "status"),
            SortKey::Created => write!(f, "created"),
        }
    }
}

/// Compare two records on a key; missing values sort first
pub fn compare<R: Record>(a: &R, b: &R, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id().cmp(b.id()),
        SortKey::Title => a.title().to_lowercase().cmp(&b.title().to_lowercase()),
        SortKey::Value => match (a.numeric_value(), b.numeric_value()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::Status => a.status().rank().cmp(&b.status().rank()),
        SortKey::Created => a.created().cmp(&b.created()),
    }
}

/// Stable sort of positions into a record slice
pub fn sort_indices<R: Record>(records: &[R], indices: &mut [usize], key: SortKey, reverse: bool) {
    indices.sort_by(|&a, &b| {
        let ord = compare(&records[a], &records[b], key);
        if reverse {
            ord.reverse()
        } else {
            ord
        }
    });
}
