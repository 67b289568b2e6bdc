//! On-disk storage for uploaded PDFs
//!
//! Files are named `<paper_id>.pdf` under the configured upload directory.

use crate::config::StorageConfig;
use crate::errors::Result;
use crate::metrics::FILE_REMOVALS_FAILED_TOTAL;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.upload_dir.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location a paper's PDF is written to
    pub fn path_for(&self, paper_id: Uuid) -> PathBuf {
        self.root.join(format!("{paper_id}.pdf"))
    }

    /// Write the uploaded bytes, creating the upload directory on demand
    pub async fn save(&self, paper_id: Uuid, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(paper_id);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "Stored upload");
        Ok(path)
    }

    /// Create the upload directory if needed and confirm a file can be
    /// written and removed there
    pub async fn check_writable(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let marker = self.root.join(".write-check");
        tokio::fs::write(&marker, b"ok").await?;
        tokio::fs::remove_file(&marker).await?;
        Ok(())
    }

    /// Read a stored file; `Ok(None)` if it is gone
    pub async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a file. A missing file counts as removed; other failures are
    /// logged and counted, never returned.
    pub async fn remove_best_effort(&self, path: &Path) -> bool {
        match tokio::fs::remove_file(path).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove stored file");
                metrics::counter!(FILE_REMOVALS_FAILED_TOTAL).increment(1);
                false
            }
        }
    }
}
