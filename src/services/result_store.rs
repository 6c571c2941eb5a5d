//! Two-tier persistence for result records.
//!
//! The local JSON cache is consulted first; on a miss (or unreadable cache
//! content) the record is fetched once from the durable blob store into the
//! cache and the local read is retried once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::job::JobId;
use crate::models::record::ResultRecord;
use crate::services::gateway::BlobStore;
use crate::services::storage::StorageError;

/// Remote fetches a single `load` may perform.
const MAX_REMOTE_FETCHES: usize = 1;

pub struct ResultStore {
    json_dir: PathBuf,
    blobs: Arc<dyn BlobStore>,
}

impl ResultStore {
    pub fn new(json_dir: impl Into<PathBuf>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            json_dir: json_dir.into(),
            blobs,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.json_dir
    }

    /// `<json_dir>/<id>.json`
    pub fn cache_path(&self, id: &JobId) -> PathBuf {
        self.json_dir.join(format!("{}.json", id))
    }

    /// Resolve a job identifier to its record. `None` means not found in either tier.
    pub async fn load(&self, id: &JobId) -> Option<ResultRecord> {
        let path = self.cache_path(id);

        for attempt in 0..=MAX_REMOTE_FETCHES {
            match read_cached(&path).await {
                Ok(record) => return Some(record),
                Err(e) => {
                    tracing::debug!(job_id = %id, attempt, error = %e, "Local result cache miss");
                }
            }

            if attempt == MAX_REMOTE_FETCHES {
                break;
            }

            tracing::info!(job_id = %id, "Result not found locally; downloading from durable store");
            metrics::counter!("forensics_result_cache_misses_total").increment(1);

            // A failed fetch still gets the re-read: a concurrent load may have filled the cache.
            if let Err(e) = self.fetch_into_cache(id, &path).await {
                if e.is_not_found() {
                    tracing::info!(job_id = %id, "Result not present in durable store");
                } else {
                    tracing::warn!(job_id = %id, error = %e, "Unable to retrieve result from durable store");
                }
            }
        }

        metrics::counter!("forensics_result_not_found_total").increment(1);
        None
    }

    /// Persist a completed record to the local cache, then to the durable store.
    ///
    /// Both writes must succeed. A failed durable write leaves the local copy in place.
    pub async fn save(&self, id: &JobId, record: &ResultRecord) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(record)?;

        tokio::fs::create_dir_all(&self.json_dir).await?;
        let path = self.cache_path(id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        self.blobs.put(&path, &id.record_key()).await?;

        tracing::debug!(job_id = %id, bytes = bytes.len(), "Result record persisted");
        Ok(())
    }

    /// Download into a per-call `<id>.json.<nonce>.part` file, then rename into place.
    async fn fetch_into_cache(&self, id: &JobId, path: &Path) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.json_dir).await?;
        let part = path.with_extension(format!("json.{}.part", Uuid::new_v4().simple()));

        if let Err(e) = self.blobs.download(&id.record_key(), &part).await {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
        tokio::fs::rename(&part, path).await?;
        Ok(())
    }
}

async fn read_cached(path: &Path) -> Result<ResultRecord, StorageError> {
    let data = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&data)?)
}
