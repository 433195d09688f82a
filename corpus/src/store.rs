//! Document store backends.
//!
//! [`DocumentStore`] is the seam to whatever persists records. The
//! [`FileStore`] keeps one JSON collection file and commits it atomically via
//! a temp file and rename; the [`MemoryStore`] backs tests and ephemeral
//! deployments.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{DocumentRecord, NewDocument};
use crate::error::{Result, StoreError};

/// Storage seam for document records.
///
/// A batch insert is atomic: either every record in the batch becomes
/// visible, or none does.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a batch of records, returning their assigned ids in order.
    async fn put_batch(&self, docs: Vec<NewDocument>) -> Result<Vec<String>>;

    /// Return every record in the collection.
    async fn scan(&self) -> Result<Vec<DocumentRecord>>;

    /// Fetch a single record by id.
    async fn get(&self, id: &str) -> Result<DocumentRecord>;

    /// Replace the embedding of an existing record.
    async fn update_embedding(&self, id: &str, embedding: Vec<f32>) -> Result<()>;

    /// Number of records in the collection.
    async fn count(&self) -> Result<usize>;
}

fn make_records(docs: Vec<NewDocument>) -> (Vec<DocumentRecord>, Vec<String>) {
    let now = Utc::now();
    let records: Vec<DocumentRecord> = docs
        .into_iter()
        .map(|doc| DocumentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title: doc.title,
            url: doc.url,
            text: doc.text,
            embedding: Some(doc.embedding),
            created_at: now,
        })
        .collect();
    let ids = records.iter().map(|r| r.id.clone()).collect();
    (records, ids)
}

/// File-backed store: one JSON file per collection.
///
/// Records are loaded once on open and held in memory; every commit rewrites
/// the collection file through a temp file and rename, so a failed commit
/// leaves both the file and the in-memory view untouched.
pub struct FileStore {
    path: PathBuf,
    records: RwLock<Vec<DocumentRecord>>,
}

impl FileStore {
    /// Open (or create) the collection `name` under `dir`.
    pub async fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .map_err(|e| StoreError::CreateDirectory(format!("{}: {e}", dir.display())))?;

        let path = dir.join(format!("{name}.json"));
        let records = if path.exists() {
            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| StoreError::ReadCollection(format!("{}: {e}", path.display())))?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };

        info!("Opened collection {name} with {} records", records.len());
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Write the full record set to disk, atomically.
    async fn commit(&self, records: &[DocumentRecord]) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .await
            .map_err(|e| StoreError::WriteCollection(format!("{}: {e}", temp_path.display())))?;

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::WriteCollection(format!("{}: {e}", self.path.display())))?;

        debug!("Committed {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn put_batch(&self, docs: Vec<NewDocument>) -> Result<Vec<String>> {
        let (records, ids) = make_records(docs);

        let mut guard = self.records.write().await;
        let mut next = guard.clone();
        next.extend(records);

        // Commit before the cache swap: a failed write leaves the previous
        // state fully intact.
        self.commit(&next).await?;
        *guard = next;
        Ok(ids)
    }

    async fn scan(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<DocumentRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    async fn update_embedding(&self, id: &str, embedding: Vec<f32>) -> Result<()> {
        let mut guard = self.records.write().await;
        let mut next = guard.clone();
        let record = next
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.embedding = Some(embedding);

        self.commit(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<DocumentRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with records.
    pub fn with_records(records: Vec<DocumentRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put_batch(&self, docs: Vec<NewDocument>) -> Result<Vec<String>> {
        let (records, ids) = make_records(docs);
        self.records.write().await.extend(records);
        Ok(ids)
    }

    async fn scan(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<DocumentRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    async fn update_embedding(&self, id: &str, embedding: Vec<f32>) -> Result<()> {
        let mut guard = self.records.write().await;
        let record = guard
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.embedding = Some(embedding);
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn doc(title: &str, text: &str) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            url: String::new(),
            text: text.to_string(),
            embedding: vec![0.1, 0.2, 0.3],
        }
    }

    #[tokio::test]
    async fn file_store_put_and_scan() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path(), "docs").await.unwrap();

        let ids = store
            .put_batch(vec![doc("a", "first"), doc("b", "second")])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);

        let records = store.scan().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "a");
    }

    #[tokio::test]
    async fn file_store_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = FileStore::open(temp_dir.path(), "docs").await.unwrap();
            store.put_batch(vec![doc("a", "body")]).await.unwrap();
        }

        let store = FileStore::open(temp_dir.path(), "docs").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_batch_commit_leaves_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path(), "docs").await.unwrap();
        store.put_batch(vec![doc("a", "kept")]).await.unwrap();

        // Removing the directory makes the temp-file write fail.
        std::fs::remove_dir_all(temp_dir.path()).unwrap();

        let result = store.put_batch(vec![doc("b", "lost")]).await;
        assert!(result.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_embedding_replaces_vector() {
        let store = MemoryStore::new();
        let ids = store.put_batch(vec![doc("a", "body")]).await.unwrap();

        store
            .update_embedding(&ids[0], vec![9.0, 9.0])
            .await
            .unwrap();

        let record = store.get(&ids[0]).await.unwrap();
        assert_eq!(record.embedding, Some(vec![9.0, 9.0]));
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(
            err,
            crate::CorpusError::Store(StoreError::NotFound(_))
        ));
    }
}
