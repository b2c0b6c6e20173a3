//! List view - store, filters, sort and page position for one record kind
//!
//! Owns the pieces a dashboard screen would: the snapshot, the gateway,
//! current criteria and page, and a queue of dismissible notices. Failures
//! become notices and are also returned to the caller.

use std::num::NonZeroUsize;
use tracing::warn;

use crate::core::backend::Backend;
use crate::core::error::{LoadError, MutationError};
use crate::core::filter::{filter_indices, FilterCriteria};
use crate::core::gateway::MutationGateway;
use crate::core::paginate::{clamp_page, paginate, total_pages, Page};
use crate::core::record::{Record, RecordId};
use crate::core::sort::{sort_indices, SortKey};
use crate::core::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the user, kept until dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Rows of the current page plus totals
#[derive(Debug, Clone)]
pub struct ListPage<'a, R> {
    pub items: Vec<&'a R>,
    pub number: usize,
    pub total_pages: usize,
    /// Records passing the filter
    pub total_items: usize,
    /// Records in the snapshot
    pub total_loaded: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct MemoKey {
    criteria: FilterCriteria,
    sort: Option<(SortKey, bool)>,
    generation: u64,
}

#[derive(Debug)]
pub struct ListView<R: Record, B> {
    store: RecordStore<R>,
    gateway: MutationGateway<B>,
    criteria: FilterCriteria,
    sort: Option<(SortKey, bool)>,
    page: usize,
    page_size: NonZeroUsize,
    notices: Vec<Notice>,
    next_notice: u64,
    memo: Option<(MemoKey, Vec<usize>)>,
}

impl<R: Record, B: Backend> ListView<R, B> {
    pub fn new(backend: B, page_size: NonZeroUsize) -> Self {
        Self {
            store: RecordStore::new(),
            gateway: MutationGateway::new(backend),
            criteria: FilterCriteria::default(),
            sort: None,
            page: 1,
            page_size,
            notices: Vec::new(),
            next_notice: 0,
            memo: None,
        }
    }

    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    pub fn gateway(&self) -> &MutationGateway<B> {
        &self.gateway
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    // ---- notices ----

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    fn notify(&mut self, level: NoticeLevel, message: String) -> u64 {
        self.next_notice += 1;
        let id = self.next_notice;
        self.notices.push(Notice { id, level, message });
        id
    }

    // ---- loading ----

    /// Reload the snapshot; the page stays put but is clamped to the new total
    pub fn refresh(&mut self) -> Result<usize, LoadError> {
        match self.store.load(self.gateway.backend()) {
            Ok(count) => {
                let rejected = self.store.rejected().len();
                if rejected > 0 {
                    self.notify(
                        NoticeLevel::Error,
                        format!(
                            "{} {} skipped: malformed data from the server",
                            rejected,
                            if rejected == 1 { R::KIND.name } else { R::KIND.name_plural }
                        ),
                    );
                }
                self.page = clamp_page(self.page, self.total_pages());
                Ok(count)
            }
            Err(e) => {
                warn!(kind = R::KIND.name_plural, error = %e, "load failed");
                self.notify(NoticeLevel::Error, e.to_string());
                Err(e)
            }
        }
    }

    // ---- criteria ----

    /// Replace all criteria at once
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
        self.page = 1;
    }

    /// Set an exact-match field filter; an empty value clears it
    pub fn set_field_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        if value.is_empty() {
            self.criteria.fields.remove(&field);
        } else {
            self.criteria.fields.insert(field, value);
        }
        self.page = 1;
    }

    pub fn set_value_range(&mut self, min: Option<f64>, max: Option<f64>) {
        self.criteria.min_value = min;
        self.criteria.max_value = max;
        self.page = 1;
    }

    pub fn set_created_since(&mut self, since: Option<chrono::DateTime<chrono::Utc>>) {
        self.criteria.created_since = since;
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.page = 1;
    }

    /// `None` keeps backend order
    pub fn set_sort(&mut self, sort: Option<(SortKey, bool)>) {
        self.sort = sort;
        self.page = 1;
    }

    // ---- paging ----

    pub fn total_pages(&mut self) -> usize {
        total_pages(self.filtered_len(), self.page_size)
    }

    pub fn goto_page(&mut self, page: usize) -> usize {
        self.page = clamp_page(page, self.total_pages());
        self.page
    }

    pub fn next_page(&mut self) -> usize {
        self.goto_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> usize {
        self.goto_page(self.page.saturating_sub(1))
    }

    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Number of records passing the current criteria
    pub fn filtered_len(&mut self) -> usize {
        self.visible_indices().len()
    }

    /// Filtered and sorted records, every page
    pub fn filtered(&mut self) -> Vec<&R> {
        self.visible_indices();
        let records = self.store.records();
        match &self.memo {
            Some((_, indices)) => indices.iter().map(|&i| &records[i]).collect(),
            None => Vec::new(),
        }
    }

    /// The current page
    pub fn page(&mut self) -> ListPage<'_, R> {
        self.visible_indices();
        let number = self.page;
        let page_size = self.page_size;
        let records = self.store.records();
        let indices: &[usize] = match &self.memo {
            Some((_, indices)) => indices,
            None => &[],
        };

        let Page {
            items,
            total_pages,
            total_items,
            ..
        } = paginate(indices, page_size, number);

        ListPage {
            items: items.iter().map(|&i| &records[i]).collect(),
            number,
            total_pages,
            total_items,
            total_loaded: records.len(),
        }
    }

    fn visible_indices(&mut self) -> &[usize] {
        let key = MemoKey {
            criteria: self.criteria.clone(),
            sort: self.sort,
            generation: self.store.generation(),
        };

        let stale = match &self.memo {
            Some((cached, _)) => *cached != key,
            None => true,
        };

        if stale {
            let records = self.store.records();
            let mut indices = filter_indices(records, &self.criteria);
            if let Some((sort_key, reverse)) = self.sort {
                sort_indices(records, &mut indices, sort_key, reverse);
            }
            self.memo = Some((key, indices));
        }

        match &self.memo {
            Some((_, indices)) => indices,
            None => &[],
        }
    }

    // ---- mutations ----

    /// Edit a record; the store changes only if the backend accepts
    pub fn edit(&mut self, id: &RecordId, patch: &R::Patch) -> Result<&R, MutationError> {
        let result = match self.store.get(id) {
            Some(current) => self.gateway.edit(current, patch).map(|_| ()),
            None => Err(MutationError::NotFound {
                kind: R::KIND.name,
                id: id.clone(),
            }),
        };

        match result {
            Ok(()) => {
                self.store.apply_edit(id, patch);
                self.notify(
                    NoticeLevel::Info,
                    format!("{} {} updated", capitalize(R::KIND.name), id),
                );
                self.store.get(id).ok_or_else(|| MutationError::NotFound {
                    kind: R::KIND.name,
                    id: id.clone(),
                })
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, e.to_string());
                Err(e)
            }
        }
    }

    /// Delete a record; the store changes only if the backend accepts
    pub fn delete(&mut self, id: &RecordId) -> Result<R, MutationError> {
        let result = if self.store.get(id).is_some() {
            self.gateway.delete::<R>(id)
        } else {
            Err(MutationError::NotFound {
                kind: R::KIND.name,
                id: id.clone(),
            })
        };

        if let Err(e) = result {
            self.notify(NoticeLevel::Error, e.to_string());
            return Err(e);
        }

        let removed = self.store.apply_delete(id).ok_or_else(|| MutationError::NotFound {
            kind: R::KIND.name,
            id: id.clone(),
        })?;
        self.notify(
            NoticeLevel::Info,
            format!("{} {} deleted", capitalize(R::KIND.name), id),
        );
        self.page = clamp_page(self.page, self.total_pages());
        Ok(removed)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::ApiError;
    use crate::entities::contract::{ContractEdit, ContractRequest, ContractStatus};
    use serde_json::{json, Value};
    use std::cell::Cell;

    struct Fake {
        list: Value,
        mutation_status: Cell<Option<u16>>,
    }

    impl Fake {
        fn new(list: Value) -> Self {
            Self {
                list,
                mutation_status: Cell::new(None),
            }
        }

        fn mutation(&self) -> Result<(), ApiError> {
            match self.mutation_status.get() {
                Some(status) => Err(ApiError::Status {
                    status,
                    detail: None,
                }),
                None => Ok(()),
            }
        }
    }

    impl Backend for Fake {
        fn get_json(&self, _path: &str) -> Result<Value, ApiError> {
            Ok(self.list.clone())
        }

        fn put_json(&self, _path: &str, _body: &Value) -> Result<(), ApiError> {
            self.mutation()
        }

        fn delete(&self, _path: &str) -> Result<(), ApiError> {
            self.mutation()
        }
    }

    fn many(n: i64) -> Value {
        Value::Array(
            (1..=n)
                .map(|i| {
                    let agency = if i % 2 == 0 { "Even" } else { "Odd" };
                    let status = if i % 3 == 0 { "approved" } else { "intake" };
                    json!({
                        "id": i,
                        "title": format!("Contract {}", i),
                        "agency": agency,
                        "contract_type": "Goods",
                        "value": (i * 1000) as f64,
                        "status": status,
                    })
                })
                .collect(),
        )
    }

    fn view(n: i64, page_size: usize) -> ListView<ContractRequest, Fake> {
        let mut view = ListView::new(Fake::new(many(n)), NonZeroUsize::new(page_size).unwrap());
        view.refresh().unwrap();
        view
    }

    #[test]
    fn test_page_reflects_filter_and_size() {
        let mut view = view(25, 10);
        let page = view.page();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 25);

        view.set_field_filter("agency", "Even");
        let page = view.page();
        assert_eq!(page.total_items, 12);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_criteria_change_resets_page() {
        let mut view = view(25, 10);
        assert_eq!(view.goto_page(3), 3);

        view.set_search("contract");
        assert_eq!(view.current_page(), 1);

        view.goto_page(2);
        view.set_value_range(Some(0.0), None);
        assert_eq!(view.current_page(), 1);

        view.goto_page(2);
        view.set_sort(Some((SortKey::Value, true)));
        assert_eq!(view.current_page(), 1);

        view.goto_page(2);
        view.set_criteria(FilterCriteria::new().with_field("agency", "Even"));
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.filtered_len(), 12);

        view.clear_filters();
        assert_eq!(view.filtered_len(), 25);

        view.goto_page(3);
        view.set_page_size(NonZeroUsize::new(5).unwrap());
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.total_pages(), 5);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut view = view(25, 10);
        assert_eq!(view.prev_page(), 1);
        assert_eq!(view.goto_page(99), 3);
        assert_eq!(view.next_page(), 3);
        assert_eq!(view.goto_page(0), 1);
    }

    #[test]
    fn test_sorted_page() {
        let mut view = view(5, 2);
        view.set_sort(Some((SortKey::Value, true)));
        let titles: Vec<&str> = view.page().items.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Contract 5", "Contract 4"]);
    }

    #[test]
    fn test_edit_updates_store_and_filtered_view() {
        let mut view = view(3, 10);
        view.set_field_filter("status", "approved");
        assert_eq!(view.filtered_len(), 1);

        let id = RecordId::Int(1);
        let current = view.store().get(&id).unwrap().clone();
        let patch = ContractEdit {
            status: ContractStatus::Approved,
            ..ContractEdit::from_record(&current)
        };
        let updated = view.edit(&id, &patch).unwrap();
        assert_eq!(updated.status, ContractStatus::Approved);

        assert_eq!(view.filtered_len(), 2);
        assert_eq!(view.notices().last().unwrap().level, NoticeLevel::Info);
    }

    #[test]
    fn test_failed_mutation_leaves_store_and_adds_notice() {
        let mut view = view(3, 10);
        let before = view.store().records().to_vec();
        view.gateway().backend().mutation_status.set(Some(500));

        let err = view.delete(&RecordId::Int(2)).unwrap_err();
        assert_eq!(err.to_string(), "Delete failed (HTTP 500)");
        assert_eq!(view.store().records(), before.as_slice());

        let notice = view.notices().last().unwrap().clone();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Delete failed (HTTP 500)");
        assert!(view.dismiss(notice.id));
        assert!(!view.dismiss(notice.id));
    }

    #[test]
    fn test_delete_removes_and_clamps_page() {
        let mut view = view(11, 10);
        view.goto_page(2);
        view.delete(&RecordId::Int(11)).unwrap();
        assert_eq!(view.store().len(), 10);
        assert_eq!(view.current_page(), 1);
        assert!(view.store().get(&RecordId::Int(11)).is_none());
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut view = view(2, 10);
        let err = view.delete(&RecordId::Int(42)).unwrap_err();
        assert!(matches!(err, MutationError::NotFound { .. }));
        assert_eq!(err.to_string(), "No contract found with id 42");
    }

    #[test]
    fn test_rejected_records_raise_notice() {
        let list = json!([
            {"id": 1, "title": "ok", "agency": "X", "contract_type": "Goods", "value": 1.0, "status": "intake"},
            {"id": 2, "title": "bad", "agency": "X", "contract_type": "Goods", "value": 1.0, "status": "unknown"}
        ]);
        let mut view: ListView<ContractRequest, Fake> =
            ListView::new(Fake::new(list), NonZeroUsize::new(10).unwrap());
        assert_eq!(view.refresh().unwrap(), 1);
        assert_eq!(view.notices().len(), 1);
        assert!(view.notices()[0].message.contains("1 contract skipped"));
    }
}
