//! Record store - the local snapshot of one record kind
//!
//! A load replaces the whole snapshot; there is no incremental merge. A
//! failed load leaves the previous snapshot in place. Edits and deletes are
//! applied only after the backend has accepted them.

use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

use crate::core::backend::Backend;
use crate::core::error::LoadError;
use crate::core::record::{Record, RecordId};

/// A list response entry that did not make it into the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position in the list response
    pub index: usize,
    /// Raw `id` value, if one could be read
    pub id: Option<String>,
    pub reason: String,
}

/// Decoded list response
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    pub records: Vec<R>,
    pub rejected: Vec<RejectedRecord>,
}

/// Decode a list response record by record
///
/// Entries that fail to decode, break a record invariant, or repeat an id
/// already seen are rejected; the rest keep their order.
pub fn decode_snapshot<R: Record>(values: Vec<Value>) -> Snapshot<R> {
    let mut records = Vec::with_capacity(values.len());
    let mut rejected = Vec::new();
    let mut seen: HashSet<RecordId> = HashSet::new();

    for (index, value) in values.into_iter().enumerate() {
        let raw_id = value.get("id").and_then(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });

        let reject = |reason: String| RejectedRecord {
            index,
            id: raw_id.clone(),
            reason,
        };

        if raw_id.is_none() {
            rejected.push(reject("missing id".to_string()));
            continue;
        }

        let record: R = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                rejected.push(reject(e.to_string()));
                continue;
            }
        };

        if let Err(reason) = record.check() {
            rejected.push(reject(reason));
            continue;
        }

        if !seen.insert(record.id().clone()) {
            rejected.push(reject(format!("duplicate id {}", record.id())));
            continue;
        }

        records.push(record);
    }

    for r in &rejected {
        warn!(
            kind = R::KIND.name,
            index = r.index,
            id = r.id.as_deref().unwrap_or("-"),
            reason = %r.reason,
            "rejected record from list response"
        );
    }

    Snapshot { records, rejected }
}

/// Identifies one load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Local snapshot plus load bookkeeping
#[derive(Debug, Clone)]
pub struct RecordStore<R: Record> {
    records: Vec<R>,
    rejected: Vec<RejectedRecord>,
    loaded: bool,
    pending: Option<LoadTicket>,
    next_ticket: u64,
    generation: u64,
}

impl<R: Record> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
            loaded: false,
            pending: None,
            next_ticket: 0,
            generation: 0,
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Entries dropped from the most recent successful load
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    /// True once any load has succeeded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True while a load is in flight
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Bumped on every snapshot change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    pub fn get(&self, id: &RecordId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Start a load; any earlier pending load becomes stale
    pub fn begin_load(&mut self) -> LoadTicket {
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.pending = Some(ticket);
        ticket
    }

    /// Finish a load started with `begin_load`
    ///
    /// Returns `Ok(false)` when the ticket is stale; its result is dropped,
    /// error or not. On error the previous snapshot stays.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Snapshot<R>, LoadError>,
    ) -> Result<bool, LoadError> {
        if self.pending != Some(ticket) {
            return Ok(false);
        }
        self.pending = None;

        let snapshot = result?;
        self.records = snapshot.records;
        self.rejected = snapshot.rejected;
        self.loaded = true;
        self.generation += 1;
        Ok(true)
    }

    /// Fetch and install a fresh snapshot; returns the record count
    pub fn load<B: Backend>(&mut self, backend: &B) -> Result<usize, LoadError> {
        let ticket = self.begin_load();
        let result = backend
            .fetch_list(&R::KIND)
            .map(decode_snapshot::<R>)
            .map_err(|e| LoadError::from_api(R::KIND.name_plural, e));
        self.finish_load(ticket, result)?;
        Ok(self.records.len())
    }

    /// Overwrite a record's fields from an accepted patch, in place
    pub fn apply_edit(&mut self, id: &RecordId, patch: &R::Patch) -> bool {
        match self.records.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                record.apply_patch(patch);
                self.generation += 1;
                true
            }
            None => false,
        }
    }

    /// Remove a record after an accepted delete
    pub fn apply_delete(&mut self, id: &RecordId) -> Option<R> {
        let pos = self.position(id)?;
        self.generation += 1;
        Some(self.records.remove(pos))
    }
}
