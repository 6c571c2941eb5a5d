use std::path::{Path, PathBuf};

use crate::models::job::JobId;
use crate::services::storage::StorageError;

/// Local staging area for uploaded images awaiting processing.
#[derive(Debug, Clone)]
pub struct ImageStaging {
    upload_dir: PathBuf,
}

impl ImageStaging {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.upload_dir
    }

    /// `<upload_dir>/<id>.jpg`
    pub fn path_for(&self, id: &JobId) -> PathBuf {
        self.upload_dir.join(format!("{}.jpg", id))
    }

    /// Write an uploaded payload to its staging path.
    pub async fn stage(&self, id: &JobId, data: &[u8]) -> Result<PathBuf, StorageError> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let path = self.path_for(id);
        tokio::fs::write(&path, data).await?;
        tracing::debug!(job_id = %id, path = %path.display(), "Staged upload");
        Ok(path)
    }
}
