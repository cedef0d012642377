//! Durable resume marker for the scrape pipeline.
//!
//! The checkpoint is a single plain-text integer: the highest input id whose
//! terminal outcome has been durably recorded. It is persisted atomically
//! (write-then-rename) so a reader never observes a partial value.

use crate::models::{Result, ScrapeError};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Persists the highest fully processed sentence id.
///
/// Owned by the scrape driver alone; `save` must only be called after the
/// record's outcome is flushed to the result sink. The retry-failed driver
/// never reads it.
pub struct CheckpointStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tmp_path = path.with_extension("tmp");
        Self { path, tmp_path }
    }

    /// Last fully processed id, or `None` on a first run.
    pub fn load(&self) -> Result<Option<u64>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| ScrapeError::io("reading checkpoint", e))?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let id = trimmed
            .parse::<u64>()
            .map_err(|_| ScrapeError::InvalidCheckpoint(format!("not an integer: {trimmed:?}")))?;
        Ok(Some(id))
    }

    /// Overwrite the stored id (atomic replace).
    pub fn save(&self, id: u64) -> Result<()> {
        fs::write(&self.tmp_path, id.to_string())
            .map_err(|e| ScrapeError::io("writing checkpoint", e))?;
        fs::rename(&self.tmp_path, &self.path)
            .map_err(|e| ScrapeError::io("renaming checkpoint", e))?;
        debug!(id, "Checkpoint saved");
        Ok(())
    }
}
