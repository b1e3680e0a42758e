pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod record;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{load_config, PortalConfig};
pub use error::{ConfigError, PortalError, Result, StorageError, StoreError};
pub use record::{
    ListQuery, Page, PageRequest, Pagination, Record, RecordFilter, RecordStore, Stage,
    StageTable,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
