use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

/// Extension appended to every record key on disk
const RECORD_EXTENSION: &str = "json";

/// Errors from FileStore
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not create new file, it may already exist: {resource}/{key}")]
    AlreadyExists { resource: String, key: String },

    #[error("Record not found: {resource}/{key}")]
    NotFound { resource: String, key: String },

    #[error("Record {resource}/{key} is not valid JSON: {source}")]
    Parse {
        resource: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not serialize record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid record address: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

async fn write_synced(file: &mut fs::File, body: &[u8]) -> std::io::Result<()> {
    file.write_all(body).await?;
    file.flush().await?;
    file.sync_all().await
}

/// A create that failed mid-write must not leave a partial record holding the key
async fn discard_on_error(path: &Path, written: std::io::Result<()>) -> Result<(), StoreError> {
    let Err(e) = written else {
        return Ok(());
    };
    if let Err(cleanup) = fs::remove_file(path).await {
        warn!("Could not remove partial record {}: {}", path.display(), cleanup);
    }
    Err(StoreError::Io(e))
}

/// Directory-per-resource-type record store, one JSON file per record.
///
/// A record lives at `<base_dir>/<resource>/<key>.json`. Every operation touches
/// exactly one file; nothing is serialized across callers, so two writers racing on
/// the same key may interleave (see [`super::KeyLocks`] for in-process exclusion).
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create the directories for the given resource types if missing
    pub async fn ensure_resources(&self, resources: &[&str]) -> Result<(), StoreError> {
        for resource in resources {
            let dir = self.resource_dir(resource)?;
            fs::create_dir_all(&dir).await?;
            debug!("Record directory ready: {}", dir.display());
        }
        Ok(())
    }

    /// Write a new record; fails if one already exists at the address
    pub async fn create<T: Serialize>(
        &self,
        resource: &str,
        key: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let path = self.record_path(resource, key)?;
        let body = serde_json::to_vec(record).map_err(StoreError::Serialize)?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists {
                    resource: resource.to_string(),
                    key: key.to_string(),
                },
                _ => StoreError::Io(e),
            })?;

        let written = write_synced(&mut file, &body).await;
        drop(file);
        discard_on_error(&path, written).await
    }

    /// Decode the record at the address
    pub async fn read<T: DeserializeOwned>(&self, resource: &str, key: &str) -> Result<T, StoreError> {
        let path = self.record_path(resource, key)?;
        let bytes = fs::read(&path)
            .await
            .map_err(|e| self.map_missing(e, resource, key))?;

        serde_json::from_slice(&bytes).map_err(|source| {
            error!("Corrupt record at {}: {}", path.display(), source);
            StoreError::Parse {
                resource: resource.to_string(),
                key: key.to_string(),
                source,
            }
        })
    }

    /// Replace the full content of an existing record
    pub async fn update<T: Serialize>(
        &self,
        resource: &str,
        key: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let path = self.record_path(resource, key)?;
        let body = serde_json::to_vec(record).map_err(StoreError::Serialize)?;

        // No `create`: opening fails with NotFound when the record is absent
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| self.map_missing(e, resource, key))?;

        file.write_all(&body).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }

    pub async fn delete(&self, resource: &str, key: &str) -> Result<(), StoreError> {
        let path = self.record_path(resource, key)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| self.map_missing(e, resource, key))
    }

    /// Keys present under a resource type, sorted, extension stripped
    pub async fn list(&self, resource: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.resource_dir(resource)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn map_missing(&self, e: std::io::Error, resource: &str, key: &str) -> StoreError {
        match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                resource: resource.to_string(),
                key: key.to_string(),
            },
            _ => StoreError::Io(e),
        }
    }

    fn resource_dir(&self, resource: &str) -> Result<PathBuf, StoreError> {
        validate_segment(resource)?;
        Ok(self.base_dir.join(resource))
    }

    fn record_path(&self, resource: &str, key: &str) -> Result<PathBuf, StoreError> {
        validate_segment(key)?;
        Ok(self
            .resource_dir(resource)?
            .join(format!("{}.{}", key, RECORD_EXTENSION)))
    }
}

/// A resource type or key must map to exactly one plain path component
fn validate_segment(segment: &str) -> Result<(), StoreError> {
    let invalid = || StoreError::InvalidKey(segment.to_string());

    if segment.is_empty() || segment.contains('\0') || segment.contains('/') || segment.contains('\\') {
        return Err(invalid());
    }

    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}
