//! core::ops::lock
//!
//! Exclusive lock over the state directory.
//!
//! Only one codechain process may run load → apply → save at a time. The
//! lock is held for that whole span so two processes never apply
//! transitions against the same snapshot.
//!
//! # Invariants
//!
//! - Lock is released on drop (RAII)
//! - Acquisition is non-blocking: fails fast if another process holds it
//!
//! # Example
//!
//! ```
//! use codechain::core::ops::lock::StateLock;
//! use codechain::core::paths::StatePaths;
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let paths = StatePaths::new(dir.path());
//!
//! let lock = StateLock::acquire(&paths).unwrap();
//! assert!(StateLock::acquire(&paths).is_err());
//! drop(lock);
//! assert!(StateLock::acquire(&paths).is_ok());
//! ```

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::StatePaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("state directory is locked by another codechain process")]
    AlreadyLocked,

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive lock on the state directory.
#[derive(Debug)]
pub struct StateLock {
    path: PathBuf,
    /// `Some` while the lock is held.
    file: Option<File>,
}

impl StateLock {
    /// Acquire the lock without blocking.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &StatePaths) -> Result<Self, LockError> {
        paths.ensure_dirs().map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", paths.root().display(), e))
        })?;

        let path = paths.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release before the guard goes out of scope. Safe to call twice.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}
