use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{check_quota, KeyValueStore};
use crate::error::StorageError;

const EXTENSION: &str = "json";

/// Key-value store keeping one `<key>.json` file per key in a directory.
///
/// Keys are used verbatim as file stems, so only `[A-Za-z0-9_-]` keys are
/// accepted; anything else is rejected rather than rewritten.
///
/// Writes land in a temporary sibling first and are renamed into place, so
/// a reader never observes a half-written collection.
pub struct FileStore {
    directory: PathBuf,
    quota: Option<usize>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            quota: None,
        }
    }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.directory.join(format!("{}.{}", key, EXTENSION)))
    }

    async fn ensure_directory(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| StorageError::Io {
                path: self.directory.clone(),
                source: e,
            })
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }

    async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        check_quota(key, &value, self.quota)?;
        self.ensure_directory().await?;

        let tmp_path = path.with_extension(format!("{}.tmp", EXTENSION));

        tokio::fs::write(&tmp_path, value.as_bytes())
            .await
            .map_err(|e| StorageError::Io {
                path: tmp_path.clone(),
                source: e,
            })?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io { path, source: e });
        }

        log::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut dir = match tokio::fs::read_dir(&self.directory).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.directory.clone(),
                    source: e,
                })
            }
        };

        let mut keys = Vec::new();
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(StorageError::Io {
                        path: self.directory.clone(),
                        source: e,
                    })
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if is_valid_key(stem) => keys.push(stem.to_string()),
                _ => log::debug!("Skipping foreign file {}", path.display()),
            }
        }
        keys.sort();
        Ok(keys)
    }
}
