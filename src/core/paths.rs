//! core::paths
//!
//! Centralized path routing for codechain state storage.
//!
//! No code outside this module computes paths under the state directory.
//!
//! # Storage Layout
//!
//! All data lives under one state directory:
//! - `state.json` - Registry snapshot (source of truth)
//! - `events.jsonl` - Append-only event ledger
//! - `lock` - Exclusive lock file
//! - `config.toml` - Store-scoped configuration
//! - `objects/` - Default content store root
//!
//! # Resolution
//!
//! The state directory is, in order:
//! 1. An explicit path (the `--state` flag)
//! 2. `$CODECHAIN_HOME`
//! 3. `~/.codechain`
//!
//! # Example
//!
//! ```
//! use codechain::core::paths::StatePaths;
//! use std::path::PathBuf;
//!
//! let paths = StatePaths::new("/var/lib/codechain");
//!
//! assert_eq!(
//!     paths.snapshot_path(),
//!     PathBuf::from("/var/lib/codechain/state.json")
//! );
//! ```

use std::path::{Path, PathBuf};

/// Environment variable naming the state directory.
pub const HOME_ENV: &str = "CODECHAIN_HOME";

/// Directory name used under the user's home when nothing else is set.
pub const DEFAULT_DIR_NAME: &str = ".codechain";

/// Centralized path routing for codechain storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    root: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the state directory from flag, environment, then home.
    ///
    /// Returns `None` only when nothing is set and no home directory exists.
    pub fn resolve(explicit: Option<&Path>) -> Option<Self> {
        if let Some(path) = explicit {
            return Some(Self::new(path));
        }
        if let Some(path) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Some(Self::new(PathBuf::from(path)));
        }
        dirs::home_dir().map(|home| Self::new(home.join(DEFAULT_DIR_NAME)))
    }

    /// The state directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registry snapshot: `<root>/state.json`.
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    /// Event ledger: `<root>/events.jsonl`.
    pub fn ledger_path(&self) -> PathBuf {
        self.root.join("events.jsonl")
    }

    /// Lock file: `<root>/lock`.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join("lock")
    }

    /// Store config: `<root>/config.toml`.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Default content store root: `<root>/objects`.
    pub fn objects_dir(&self) -> PathBuf {
        self.root.join("objects")
    }

    /// Create the state directory if needed.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let paths = StatePaths::new("/s");
        assert_eq!(paths.root(), Path::new("/s"));
        assert_eq!(paths.snapshot_path(), PathBuf::from("/s/state.json"));
        assert_eq!(paths.ledger_path(), PathBuf::from("/s/events.jsonl"));
        assert_eq!(paths.lock_path(), PathBuf::from("/s/lock"));
        assert_eq!(paths.config_path(), PathBuf::from("/s/config.toml"));
        assert_eq!(paths.objects_dir(), PathBuf::from("/s/objects"));
    }

    #[test]
    fn explicit_path_wins() {
        let paths = StatePaths::resolve(Some(Path::new("/explicit"))).unwrap();
        assert_eq!(paths.root(), Path::new("/explicit"));
    }

    #[test]
    fn ensure_dirs_creates_root() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = StatePaths::new(temp.path().join("nested/state"));
        paths.ensure_dirs().unwrap();
        assert!(paths.root().is_dir());
    }
}
