//! Contact storage.
//!
//! Handlers only see [`ContactStore`]; the binary picks [`MemoryStore`] or
//! [`JsonFileStore`] at startup and injects it through `AppState`.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use folio_common::{ContactId, ContactRecord, ContactSubmission};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::StoreError;

/// Storage collaborator consumed by the contact handlers.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Persist a validated submission, assigning its id and creation time.
    async fn create(&self, submission: ContactSubmission) -> Result<ContactRecord, StoreError>;

    /// All records in creation order.
    async fn list(&self) -> Result<Vec<ContactRecord>, StoreError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list().await?.len())
    }
}

fn next_id(records: &[ContactRecord]) -> ContactId {
    records
        .iter()
        .map(|r| r.id)
        .max()
        .map(ContactId::next)
        .unwrap_or(ContactId(1))
}

/// Process-scoped store. Records are gone when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<ContactRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn create(&self, submission: ContactSubmission) -> Result<ContactRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = ContactRecord::from_submission(next_id(&records), submission, Utc::now());
        records.push(record.clone());
        debug!(id = %record.id, "stored contact in memory");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ContactRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}

/// Store backed by a single pretty-printed JSON array on disk.
///
/// The whole file is rewritten on every create (temp file, then rename). The
/// lock is held across the write so a failed write can drop the new record
/// before anyone else observes it.
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Vec<ContactRecord>>,
}

impl JsonFileStore {
    /// Open the store, loading existing records. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records: Vec<ContactRecord> = match tokio::fs::read_to_string(&path).await {
            Ok(data) if data.trim().is_empty() => Vec::new(),
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!(
            path = %path.display(),
            count = records.len(),
            "opened contact file store"
        );
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write_all(&self, records: &[ContactRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(records)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, data).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ContactStore for JsonFileStore {
    async fn create(&self, submission: ContactSubmission) -> Result<ContactRecord, StoreError> {
        let mut records = self.records.lock().await;
        let record = ContactRecord::from_submission(next_id(&records), submission, Utc::now());
        records.push(record.clone());
        if let Err(e) = self.write_all(&records).await {
            records.pop();
            return Err(e);
        }
        debug!(id = %record.id, path = %self.path.display(), "stored contact on disk");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ContactRecord>, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.lock().await.len())
    }
}
