use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Failures raised by a persistence backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Quota exceeded writing '{key}': {attempted} bytes over limit of {limit}")]
    QuotaExceeded {
        key: String,
        limit: usize,
        attempted: usize,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid storage key '{0}': only ASCII letters, digits, '_' and '-' are allowed")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Failures raised by the record store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record '{id}' not found in '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("Record '{id}' in '{collection}' cannot advance past stage '{stage}'")]
    TerminalStage {
        collection: String,
        id: String,
        stage: String,
    },

    #[error("Storage unavailable for '{key}': {source}")]
    StorageUnavailable {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Stored data for '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode collection '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid patch for record '{id}': {reason}")]
    InvalidPatch { id: String, reason: String },

    #[error("Invalid page request: page {page}, page size {page_size} (both must be at least 1)")]
    InvalidPageRequest { page: usize, page_size: usize },
}

impl StoreError {
    /// True when the persistence boundary could not be read or written,
    /// including stored blobs that no longer decode.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::StorageUnavailable { .. } | StoreError::Malformed { .. }
        )
    }

    /// True when re-invoking the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_storage_unavailable()
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failures_are_retryable() {
        let err = StoreError::StorageUnavailable {
            key: "tasks".to_string(),
            source: StorageError::Unavailable("disk gone".to_string()),
        };
        assert!(err.is_storage_unavailable());
        assert!(err.is_retryable());

        let malformed = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = StoreError::Malformed {
            key: "tasks".to_string(),
            source: malformed,
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_domain_failures_are_not_retryable() {
        let err = StoreError::NotFound {
            collection: "tasks".to_string(),
            id: "task-1".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Record 'task-1' not found in 'tasks'");

        let err = StoreError::TerminalStage {
            collection: "tasks".to_string(),
            id: "task-1".to_string(),
            stage: "Completed".to_string(),
        };
        assert!(!err.is_storage_unavailable());
    }

    #[test]
    fn test_encode_failure_is_not_storage_unavailable() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = StoreError::Encode {
            key: "tasks".to_string(),
            source,
        };
        assert!(!err.is_storage_unavailable());
        assert!(!err.is_retryable());
        assert!(err.to_string().starts_with("Failed to encode collection 'tasks'"));
    }

    #[test]
    fn test_portal_error_wraps_store_error() {
        let err: PortalError = StoreError::InvalidPageRequest {
            page: 0,
            page_size: 20,
        }
        .into();
        assert!(err.to_string().starts_with("Record store error:"));
    }
}
