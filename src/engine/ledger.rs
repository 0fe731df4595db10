//! engine::ledger
//!
//! Event ledger for divergence detection and audit trail.
//!
//! # Architecture
//!
//! The event ledger is an append-only JSON-lines file, one event per line,
//! stored next to the registry snapshot. It records every submitted
//! transition, applied or rejected, with the registry fingerprint after it.
//!
//! **Important:** The ledger is evidence, not authority. The snapshot is
//! the source of truth; the ledger explains how it got there and reveals
//! out-of-band edits to it.
//!
//! # Event Categories
//!
//! - `Applied`: A transition passed validation and was applied
//! - `Rejected`: A transition was refused; state is unchanged
//! - `DivergenceObserved`: The snapshot no longer matches the last
//!   recorded fingerprint
//!
//! # Example
//!
//! ```
//! use codechain::engine::ledger::{Event, EventLedger};
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let ledger = EventLedger::new(dir.path().join("events.jsonl"));
//!
//! ledger
//!     .append(&Event::divergence_observed("aaa", "bbb"))
//!     .unwrap();
//!
//! assert_eq!(ledger.count().unwrap(), 1);
//! assert_eq!(ledger.last_fingerprint().unwrap().as_deref(), Some("bbb"));
//! ```

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::error::TransitionError;
use crate::core::transition::Applied;
use crate::core::types::{Fingerprint, Identity, RepoName, UtcTimestamp};

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// I/O failure on the ledger file.
    #[error("ledger i/o error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize event.
    #[error("failed to serialize event: {0}")]
    Serialize(String),

    /// A line of the ledger is not a valid event.
    #[error("ledger corrupted at line {line}: {message}")]
    Corrupted { line: usize, message: String },
}

/// An event in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A transition was applied.
    Applied {
        op_id: String,
        /// Sequence number assigned by the engine.
        seq: u64,
        caller: Identity,
        op: String,
        repo: RepoName,
        effect: Applied,
        /// Registry fingerprint after the transition.
        fingerprint: String,
        timestamp: UtcTimestamp,
    },

    /// A transition was rejected.
    Rejected {
        op_id: String,
        caller: Identity,
        op: String,
        repo: RepoName,
        /// Stable error code, e.g. `not_authorized`.
        code: String,
        reason: String,
        /// Registry fingerprint, unchanged by the rejection.
        fingerprint: String,
        timestamp: UtcTimestamp,
    },

    /// Snapshot fingerprint differs from the last recorded one.
    DivergenceObserved {
        prior_fingerprint: String,
        current_fingerprint: String,
        timestamp: UtcTimestamp,
    },
}

impl Event {
    pub fn applied(
        seq: u64,
        caller: &Identity,
        op: impl Into<String>,
        repo: &RepoName,
        effect: Applied,
        fingerprint: &Fingerprint,
    ) -> Self {
        Event::Applied {
            op_id: uuid::Uuid::new_v4().to_string(),
            seq,
            caller: caller.clone(),
            op: op.into(),
            repo: repo.clone(),
            effect,
            fingerprint: fingerprint.to_string(),
            timestamp: UtcTimestamp::now(),
        }
    }

    pub fn rejected(
        caller: &Identity,
        op: impl Into<String>,
        repo: &RepoName,
        error: &TransitionError,
        fingerprint: &Fingerprint,
    ) -> Self {
        Event::Rejected {
            op_id: uuid::Uuid::new_v4().to_string(),
            caller: caller.clone(),
            op: op.into(),
            repo: repo.clone(),
            code: error.code().to_string(),
            reason: error.to_string(),
            fingerprint: fingerprint.to_string(),
            timestamp: UtcTimestamp::now(),
        }
    }

    pub fn divergence_observed(
        prior_fingerprint: impl Into<String>,
        current_fingerprint: impl Into<String>,
    ) -> Self {
        Event::DivergenceObserved {
            prior_fingerprint: prior_fingerprint.into(),
            current_fingerprint: current_fingerprint.into(),
            timestamp: UtcTimestamp::now(),
        }
    }

    pub fn op_id(&self) -> Option<&str> {
        match self {
            Event::Applied { op_id, .. } | Event::Rejected { op_id, .. } => Some(op_id),
            Event::DivergenceObserved { .. } => None,
        }
    }

    /// Repository the transition named, if any.
    pub fn repo(&self) -> Option<&RepoName> {
        match self {
            Event::Applied { repo, .. } | Event::Rejected { repo, .. } => Some(repo),
            Event::DivergenceObserved { .. } => None,
        }
    }

    /// Identity that submitted the transition, if any.
    pub fn caller(&self) -> Option<&Identity> {
        match self {
            Event::Applied { caller, .. } | Event::Rejected { caller, .. } => Some(caller),
            Event::DivergenceObserved { .. } => None,
        }
    }

    /// Registry fingerprint as of this event.
    pub fn fingerprint(&self) -> &str {
        match self {
            Event::Applied { fingerprint, .. } | Event::Rejected { fingerprint, .. } => {
                fingerprint
            }
            Event::DivergenceObserved {
                current_fingerprint,
                ..
            } => current_fingerprint,
        }
    }

    pub fn seq(&self) -> Option<u64> {
        match self {
            Event::Applied { seq, .. } => Some(*seq),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> &UtcTimestamp {
        match self {
            Event::Applied { timestamp, .. }
            | Event::Rejected { timestamp, .. }
            | Event::DivergenceObserved { timestamp, .. } => timestamp,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Event::Applied { .. })
    }

    pub fn is_divergence(&self) -> bool {
        matches!(self, Event::DivergenceObserved { .. })
    }

    /// Single-line JSON form.
    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string(self).map_err(|e| LedgerError::Serialize(e.to_string()))
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Applied {
                seq,
                caller,
                repo,
                effect,
                ..
            } => write!(f, "#{} {} {}: {}", seq, caller, repo, effect),
            Event::Rejected {
                caller,
                op,
                repo,
                reason,
                ..
            } => write!(f, "rejected {} by {} on {}: {}", op, caller, repo, reason),
            Event::DivergenceObserved {
                prior_fingerprint,
                current_fingerprint,
                ..
            } => write!(
                f,
                "divergence: expected {}, found {}",
                abbreviate(prior_fingerprint),
                abbreviate(current_fingerprint)
            ),
        }
    }
}

fn abbreviate(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

/// Append-only JSON-lines event ledger.
#[derive(Debug, Clone)]
pub struct EventLedger {
    path: PathBuf,
}

impl EventLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append one event and flush it to disk.
    ///
    /// A torn final line left by an interrupted append is cut off first so
    /// the new event starts on a line of its own.
    pub fn append(&self, event: &Event) -> Result<(), LedgerError> {
        let mut line = event.to_json()?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        self.truncate_torn_tail()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        file.write_all(line.as_bytes()).map_err(|e| self.io_err(e))?;
        file.sync_data().map_err(|e| self.io_err(e))
    }

    fn truncate_torn_tail(&self) -> Result<(), LedgerError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(self.io_err(e)),
        };
        if raw.last().map_or(true, |b| *b == b'\n') {
            return Ok(());
        }

        let keep = raw.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
        warn!(
            path = %self.path.display(),
            dropped = raw.len() - keep,
            "dropping torn trailing ledger line"
        );
        let file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        file.set_len(keep as u64).map_err(|e| self.io_err(e))?;
        file.sync_data().map_err(|e| self.io_err(e))
    }

    /// All events, oldest first. A missing file is an empty ledger.
    pub fn read_all(&self) -> Result<Vec<Event>, LedgerError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };

        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.io_err(e))?;
        let last = lines.iter().rposition(|l| !l.trim().is_empty());

        let mut events = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(event) => events.push(event),
                // An interrupted append can only tear the final line.
                Err(e) if Some(index) == last => {
                    warn!(
                        path = %self.path.display(),
                        line = index + 1,
                        error = %e,
                        "skipping torn trailing ledger line"
                    );
                }
                Err(e) => {
                    return Err(LedgerError::Corrupted {
                        line: index + 1,
                        message: e.to_string(),
                    })
                }
            }
        }
        Ok(events)
    }

    /// The last `count` events, most recent first.
    pub fn recent(&self, count: usize) -> Result<Vec<Event>, LedgerError> {
        let mut events = self.read_all()?;
        events.reverse();
        events.truncate(count);
        Ok(events)
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(self.read_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.count()? == 0)
    }

    /// Fingerprint recorded by the most recent event.
    pub fn last_fingerprint(&self) -> Result<Option<String>, LedgerError> {
        Ok(self
            .read_all()?
            .last()
            .map(|event| event.fingerprint().to_string()))
    }

    /// Sequence number of the most recent applied transition, or 0.
    pub fn last_seq(&self) -> Result<u64, LedgerError> {
        Ok(self
            .read_all()?
            .iter()
            .rev()
            .find_map(Event::seq)
            .unwrap_or(0))
    }

    /// Events touching `repo`, oldest first.
    pub fn events_for_repo(&self, repo: &RepoName) -> Result<Vec<Event>, LedgerError> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|event| event.repo() == Some(repo))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CommitId;
    use tempfile::TempDir;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn repo(s: &str) -> RepoName {
        RepoName::new(s).unwrap()
    }

    fn fp(s: &str) -> Fingerprint {
        Fingerprint::compute(s.as_bytes())
    }

    mod event {
        use super::*;

        #[test]
        fn applied_creation() {
            let event = Event::applied(
                3,
                &id("O"),
                "commit",
                &repo("r"),
                Applied::Committed {
                    branch: crate::core::types::BranchName::main(),
                    id: CommitId::new(1),
                },
                &fp("x"),
            );
            assert!(event.is_applied());
            assert_eq!(event.seq(), Some(3));
            assert_eq!(event.fingerprint(), fp("x").as_str());
            assert!(event.op_id().is_some());
            assert!(event.timestamp() <= &UtcTimestamp::now());
        }

        #[test]
        fn rejected_carries_code_and_reason() {
            let err = TransitionError::DuplicateName(repo("r"));
            let event = Event::rejected(&id("X"), "create_repository", &repo("r"), &err, &fp("y"));
            match &event {
                Event::Rejected { code, reason, .. } => {
                    assert_eq!(code, "duplicate_name");
                    assert!(reason.contains("already exists"));
                }
                other => panic!("unexpected event: {other:?}"),
            }
            assert_eq!(event.seq(), None);
        }

        #[test]
        fn json_has_type_tag() {
            let event = Event::divergence_observed("a", "b");
            let json = event.to_json().unwrap();
            assert!(json.contains("\"type\":\"divergence_observed\""));
            assert!(!json.contains('\n'));
        }

        #[test]
        fn display_formatting() {
            let event = Event::divergence_observed("aaaaaaaaaaaaaaaa", "bbbb");
            assert_eq!(event.to_string(), "divergence: expected aaaaaaaaaaaa, found bbbb");
        }
    }

    mod storage {
        use super::*;

        #[test]
        fn missing_file_is_empty() {
            let temp = TempDir::new().unwrap();
            let ledger = EventLedger::new(temp.path().join("events.jsonl"));
            assert!(ledger.is_empty().unwrap());
            assert_eq!(ledger.last_fingerprint().unwrap(), None);
            assert_eq!(ledger.last_seq().unwrap(), 0);
        }

        #[test]
        fn appends_preserve_order() {
            let temp = TempDir::new().unwrap();
            let ledger = EventLedger::new(temp.path().join("events.jsonl"));
            ledger.append(&Event::divergence_observed("a", "b")).unwrap();
            ledger.append(&Event::divergence_observed("b", "c")).unwrap();
            ledger.append(&Event::divergence_observed("c", "d")).unwrap();

            assert_eq!(ledger.count().unwrap(), 3);
            let recent = ledger.recent(2).unwrap();
            assert_eq!(recent.len(), 2);
            assert_eq!(recent[0].fingerprint(), "d");
            assert_eq!(recent[1].fingerprint(), "c");
            assert_eq!(ledger.last_fingerprint().unwrap().as_deref(), Some("d"));
        }

        #[test]
        fn last_seq_skips_rejections() {
            let temp = TempDir::new().unwrap();
            let ledger = EventLedger::new(temp.path().join("events.jsonl"));
            ledger
                .append(&Event::applied(
                    1,
                    &id("O"),
                    "create_repository",
                    &repo("r"),
                    Applied::RepositoryCreated { name: repo("r") },
                    &fp("1"),
                ))
                .unwrap();
            ledger
                .append(&Event::rejected(
                    &id("X"),
                    "create_repository",
                    &repo("r"),
                    &TransitionError::DuplicateName(repo("r")),
                    &fp("1"),
                ))
                .unwrap();

            assert_eq!(ledger.last_seq().unwrap(), 1);
            assert_eq!(ledger.events_for_repo(&repo("r")).unwrap().len(), 2);
            assert!(ledger.events_for_repo(&repo("other")).unwrap().is_empty());
        }

        #[test]
        fn corrupted_inner_line_is_reported() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("events.jsonl");
            let ledger = EventLedger::new(&path);
            ledger.append(&Event::divergence_observed("a", "b")).unwrap();
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "{{not json").unwrap();
            drop(file);
            ledger.append(&Event::divergence_observed("b", "c")).unwrap();

            assert!(matches!(
                ledger.read_all(),
                Err(LedgerError::Corrupted { line: 2, .. })
            ));
        }

        #[test]
        fn torn_trailing_line_is_skipped() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("events.jsonl");
            let ledger = EventLedger::new(&path);
            ledger.append(&Event::divergence_observed("a", "b")).unwrap();
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            write!(file, "{{\"type\":\"applied\",\"op_id\":\"x").unwrap();
            drop(file);

            assert_eq!(ledger.count().unwrap(), 1);
            assert_eq!(ledger.last_fingerprint().unwrap().as_deref(), Some("b"));
        }

        #[test]
        fn append_after_torn_line_starts_fresh_line() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("events.jsonl");
            let ledger = EventLedger::new(&path);
            ledger.append(&Event::divergence_observed("a", "b")).unwrap();
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            write!(file, "{{\"type\":\"applied\",\"op_id\":\"x").unwrap();
            drop(file);

            ledger.append(&Event::divergence_observed("b", "c")).unwrap();
            let events = ledger.read_all().unwrap();
            assert_eq!(events.len(), 2);
            assert_eq!(events[1].fingerprint(), "c");
            assert!(!fs::read_to_string(&path).unwrap().contains("op_id\":\"x"));
        }
    }
}
