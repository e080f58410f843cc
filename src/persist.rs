//! Snapshot storage and the debounced write queue behind the learning loop.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load/save contract for the serialized learning snapshot.
pub trait SnapshotStore {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&mut self, payload: &str) -> Result<(), StoreError>;
}

fn check_quota(quota: Option<usize>, payload: &str) -> Result<(), StoreError> {
    match quota {
        Some(limit) if payload.len() > limit => Err(StoreError::QuotaExceeded { needed: payload.len(), limit }),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub quota: Option<usize>,
    pub data: Option<String>,
    /// Successful saves.
    pub writes: usize,
}

impl MemoryStore {
    pub fn with_quota(limit: usize) -> MemoryStore {
        MemoryStore { quota: Some(limit), ..MemoryStore::default() }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, payload: &str) -> Result<(), StoreError> {
        check_quota(self.quota, payload)?;
        self.data = Some(payload.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Stores the snapshot as one JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    quota: Option<usize>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> FileStore {
        FileStore { path: path.as_ref().to_path_buf(), quota: None }
    }

    pub fn with_quota(mut self, limit: usize) -> FileStore {
        self.quota = Some(limit);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, payload: &str) -> Result<(), StoreError> {
        check_quota(self.quota, payload)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// Trailing-edge debounce: every change pushes the deadline out by `delay`,
/// so a burst of changes produces one write.
#[derive(Debug, Clone)]
pub struct WriteQueue {
    delay: Duration,
    deadline: Option<Instant>,
}

impl WriteQueue {
    pub fn new(delay: Duration) -> WriteQueue {
        WriteQueue { delay, deadline: None }
    }

    pub fn mark_dirty(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.map_or(false, |deadline| now >= deadline)
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
