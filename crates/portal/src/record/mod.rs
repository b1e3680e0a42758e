//! Generic record store machinery shared by every domain collection.

pub mod entity;
pub mod filter;
pub mod id;
pub mod pagination;
pub mod stage;
pub mod store;

pub use entity::{field_value, Record};
pub use filter::{is_overdue, RecordFilter, TextSearch};
pub use id::new_record_id;
pub use pagination::{paginate, Page, PageRequest, Pagination};
pub use stage::{check_progress, Stage, StageEffect, StageTable, UnknownStage, MAX_PROGRESS};
pub use store::{recently_updated_first, ListQuery, RecordStore, StageCount};
