//! Mutation gateway - edit and delete requests against the backend
//!
//! At most one request per record id is in flight at a time. The gateway
//! never touches a store; callers apply the returned outcome only when it is
//! `Ok`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::core::backend::Backend;
use crate::core::error::MutationError;
use crate::core::record::{Record, RecordId};

/// Set of record ids with a request outstanding
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<RecordId>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    /// Claim an id; `None` when it is already claimed
    pub fn acquire(&self, id: &RecordId) -> Option<InFlightGuard> {
        let mut ids = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        if ids.insert(id.clone()) {
            Some(InFlightGuard {
                ids: Arc::clone(&self.ids),
                id: id.clone(),
            })
        } else {
            None
        }
    }
}

/// Releases its id on drop, whatever the request outcome
#[derive(Debug)]
pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<RecordId>>>,
    id: RecordId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

/// Sends edits and deletes for any record kind
#[derive(Debug, Clone)]
pub struct MutationGateway<B> {
    backend: B,
    in_flight: InFlight,
}

impl<B: Backend> MutationGateway<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            in_flight: InFlight::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// True while a request for this id is outstanding
    pub fn is_busy(&self, id: &RecordId) -> bool {
        self.in_flight.contains(id)
    }

    /// Send a full-replacement edit
    ///
    /// Returns `current` with the patch applied, ready to be written back
    /// into the store.
    pub fn edit<R: Record>(&self, current: &R, patch: &R::Patch) -> Result<R, MutationError> {
        let kind = R::KIND;
        let id = current.id();

        current.validate_patch(patch)?;

        let path = kind.edit_path_for(id).ok_or(MutationError::Unsupported {
            kind: kind.name,
            action: "edited",
        })?;

        let _guard = self.in_flight.acquire(id).ok_or_else(|| MutationError::Busy {
            kind: kind.name,
            id: id.clone(),
        })?;

        let body = serde_json::to_value(patch)
            .map_err(|e| MutationError::Transport(format!("could not encode edit: {}", e)))?;

        debug!(kind = kind.name, %id, %path, "sending edit");
        self.backend
            .put_json(&path, &body)
            .map_err(MutationError::from_update)?;
        info!(kind = kind.name, %id, "edit accepted");

        let mut updated = current.clone();
        updated.apply_patch(patch);
        Ok(updated)
    }

    /// Send a delete for one record
    pub fn delete<R: Record>(&self, id: &RecordId) -> Result<(), MutationError> {
        let kind = R::KIND;

        let path = kind.delete_path_for(id).ok_or(MutationError::Unsupported {
            kind: kind.name,
            action: "deleted",
        })?;

        let _guard = self.in_flight.acquire(id).ok_or_else(|| MutationError::Busy {
            kind: kind.name,
            id: id.clone(),
        })?;

        debug!(kind = kind.name, %id, %path, "sending delete");
        self.backend
            .delete(&path)
            .map_err(MutationError::from_delete)?;
        info!(kind = kind.name, %id, "delete accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::ApiError;
    use crate::entities::audit_log::AuditLogEntry;
    use crate::entities::contract::{ContractEdit, ContractRequest, ContractStatus};
    use serde_json::Value;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, String, Option<Value>)>>,
        fail_with: Option<ApiError>,
    }

    impl Recorder {
        fn respond(&self) -> Result<(), ApiError> {
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    impl Backend for Recorder {
        fn get_json(&self, _path: &str) -> Result<Value, ApiError> {
            Ok(Value::Array(vec![]))
        }

        fn put_json(&self, path: &str, body: &Value) -> Result<(), ApiError> {
            self.calls
                .borrow_mut()
                .push(("PUT".into(), path.into(), Some(body.clone())));
            self.respond()
        }

        fn delete(&self, path: &str) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(("DELETE".into(), path.into(), None));
            self.respond()
        }
    }

    fn contract() -> ContractRequest {
        ContractRequest {
            id: RecordId::Int(1),
            title: "Software Development Services".to_string(),
            agency: "Department of Technology".to_string(),
            contract_type: "Services".to_string(),
            value: 250_000.0,
            status: ContractStatus::Intake,
            created_at: None,
            file_path: None,
        }
    }

    fn approve(record: &ContractRequest) -> ContractEdit {
        ContractEdit {
            status: ContractStatus::Approved,
            ..ContractEdit::from_record(record)
        }
    }

    #[test]
    fn test_edit_sends_full_field_set() {
        let gateway = MutationGateway::new(Recorder::default());
        let current = contract();

        let updated = gateway.edit(&current, &approve(&current)).unwrap();
        assert_eq!(updated.status, ContractStatus::Approved);
        assert_eq!(updated.id, current.id);

        let calls = gateway.backend().calls.borrow();
        assert_eq!(calls.len(), 1);
        let (method, path, body) = &calls[0];
        assert_eq!(method, "PUT");
        assert_eq!(path, "/api/new_contract_request/api/contracts/1/edit");
        let body = body.as_ref().unwrap();
        assert_eq!(body["status"], "approved");
        assert_eq!(body["title"], "Software Development Services");
        assert_eq!(body["value"], 250_000.0);
        assert!(!gateway.is_busy(&current.id));
    }

    #[test]
    fn test_edit_failure_reports_status() {
        let gateway = MutationGateway::new(Recorder {
            fail_with: Some(ApiError::Status {
                status: 500,
                detail: None,
            }),
            ..Recorder::default()
        });
        let current = contract();

        let err = gateway.edit(&current, &approve(&current)).unwrap_err();
        assert_eq!(err.to_string(), "Update failed (HTTP 500)");
        assert!(!gateway.is_busy(&current.id));
    }

    #[test]
    fn test_invalid_patch_is_not_sent() {
        let gateway = MutationGateway::new(Recorder::default());
        let current = contract();
        let patch = ContractEdit {
            value: -1.0,
            ..ContractEdit::from_record(&current)
        };

        let err = gateway.edit(&current, &patch).unwrap_err();
        assert!(matches!(err, MutationError::Validation(_)));
        assert!(gateway.backend().calls.borrow().is_empty());
    }

    #[test]
    fn test_second_request_for_same_id_is_busy() {
        let gateway = MutationGateway::new(Recorder::default());
        let id = RecordId::Int(1);

        let _held = gateway.in_flight().acquire(&id).unwrap();
        assert!(gateway.is_busy(&id));

        let err = gateway.delete::<ContractRequest>(&id).unwrap_err();
        assert!(matches!(err, MutationError::Busy { .. }));
        assert!(gateway.backend().calls.borrow().is_empty());

        // other ids are unaffected
        gateway.delete::<ContractRequest>(&RecordId::Int(2)).unwrap();
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let in_flight = InFlight::new();
        let id = RecordId::Int(7);
        {
            let _guard = in_flight.acquire(&id).unwrap();
            assert!(in_flight.acquire(&id).is_none());
        }
        assert!(!in_flight.contains(&id));
        assert!(in_flight.acquire(&id).is_some());
    }

    #[test]
    fn test_delete_path_and_failure() {
        let gateway = MutationGateway::new(Recorder {
            fail_with: Some(ApiError::Status {
                status: 404,
                detail: Some("Contract not found".to_string()),
            }),
            ..Recorder::default()
        });

        let err = gateway.delete::<ContractRequest>(&RecordId::Int(3)).unwrap_err();
        assert_eq!(err.to_string(), "Delete failed (HTTP 404)");
        assert_eq!(gateway.backend().calls.borrow()[0].1, "/api/new_contract_request/api/contracts/3/delete");
    }

    #[test]
    fn test_read_only_kind_is_unsupported() {
        let gateway = MutationGateway::new(Recorder::default());
        let err = gateway.delete::<AuditLogEntry>(&RecordId::Int(1)).unwrap_err();
        assert!(matches!(err, MutationError::Unsupported { .. }));
    }
}
