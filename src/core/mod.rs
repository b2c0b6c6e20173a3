//! Core module - record model, snapshot store, filtering, paging and mutations

pub mod backend;
pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod http;
pub mod list;
pub mod paginate;
pub mod record;
pub mod sort;
pub mod store;
pub mod timestamp;

pub use backend::{ApiError, Backend};
pub use config::{Config, Overrides};
pub use error::{ConfigError, FieldIssue, LoadError, MutationError, ValidationError};
pub use filter::{filter, FilterCriteria};
pub use gateway::MutationGateway;
pub use http::HttpBackend;
pub use list::{ListPage, ListView, Notice, NoticeLevel};
pub use paginate::{paginate, total_pages, Page};
pub use record::{ReadOnly, Record, RecordId, RecordKind, RecordStatus};
pub use sort::SortKey;
pub use store::{RecordStore, RejectedRecord, Snapshot};
