//! Submission stores.
//!
//! - [`InMemorySubmissionStore`] - Keeps records in memory (development, tests)
//! - [`JsonLinesStore`] - Appends one JSON record per line to a file
//!
//! Stores only ever append. Each submission is one independent insert, so
//! concurrent submissions need no coordination beyond the store's own lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

use formpipe_core::{FormError, FormResult, Settings};

use crate::index::{submission_indexes, IndexSpec, SortOrder};
use crate::record::SubmissionRecord;

/// A store accepting submission records.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Creates the index if it does not exist yet.
    async fn ensure_index(&self, index: &IndexSpec) -> FormResult<()>;

    /// Appends a record.
    async fn insert(&self, record: &SubmissionRecord) -> FormResult<()>;
}

/// Ensures the indexes the submission collection relies on.
pub async fn ensure_collection(store: &dyn SubmissionStore) -> FormResult<()> {
    for index in submission_indexes() {
        store.ensure_index(&index).await?;
        tracing::debug!(index = %index.name(), "ensured submission index");
    }
    Ok(())
}

/// Builds the store configured by `settings.submissions_path`, with its
/// indexes ensured.
pub async fn store_from_settings(settings: &Settings) -> FormResult<Arc<dyn SubmissionStore>> {
    let store: Arc<dyn SubmissionStore> = match &settings.submissions_path {
        Some(path) => Arc::new(JsonLinesStore::new(path.clone())),
        None => Arc::new(InMemorySubmissionStore::new()),
    };
    ensure_collection(store.as_ref()).await?;
    Ok(store)
}

/// A store that keeps records in memory.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionStore {
    records: Arc<RwLock<Vec<SubmissionRecord>>>,
    indexes: Arc<RwLock<Vec<IndexSpec>>>,
}

impl InMemorySubmissionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored record in insertion order.
    pub async fn all(&self) -> Vec<SubmissionRecord> {
        self.records.read().await.clone()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if nothing was stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Returns the names of the ensured indexes.
    pub async fn index_names(&self) -> Vec<String> {
        self.indexes.read().await.iter().map(IndexSpec::name).collect()
    }

    /// Returns the records of one form ordered by creation time.
    pub async fn find_by_form(&self, form_id: &str, order: SortOrder) -> Vec<SubmissionRecord> {
        let mut records: Vec<SubmissionRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.form_id == form_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.created_at);
        if order == SortOrder::Desc {
            records.reverse();
        }
        records
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn ensure_index(&self, index: &IndexSpec) -> FormResult<()> {
        let mut indexes = self.indexes.write().await;
        if !indexes.contains(index) {
            indexes.push(index.clone());
        }
        Ok(())
    }

    async fn insert(&self, record: &SubmissionRecord) -> FormResult<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

/// A store appending one JSON object per line to a file.
///
/// The file is scanned sequentially, so indexes are accepted but not
/// materialized.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesStore {
    /// Creates a store writing to `path`. The file is created on first insert.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record back from the file.
    pub async fn read_all(&self) -> FormResult<Vec<SubmissionRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(FormError::from))
            .collect()
    }
}

#[async_trait]
impl SubmissionStore for JsonLinesStore {
    async fn ensure_index(&self, index: &IndexSpec) -> FormResult<()> {
        tracing::trace!(index = %index.name(), path = %self.path.display(), "index not materialized");
        Ok(())
    }

    async fn insert(&self, record: &SubmissionRecord) -> FormResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| FormError::Storage(format!("{}: {e}", self.path.display())))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| FormError::Storage(format!("{}: {e}", self.path.display())))?;
        file.flush().await?;
        Ok(())
    }
}
