//! engine::store
//!
//! Durable registry snapshots and the locked mutation session.
//!
//! # Architecture
//!
//! [`StateStore`] reads and writes `state.json`. Writes go to a temp file
//! that is renamed into place, so readers see either the old or the new
//! snapshot and never a torn one.
//!
//! [`Session`] is the process-level transaction used by mutating commands:
//!
//! ```text
//! lock -> load -> divergence check -> submit -> save -> ledger append -> unlock
//! ```
//!
//! The lock is held for the lifetime of the session, so concurrent
//! processes are serialized the same way the [`Engine`] serializes threads.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use super::executor::{Engine, Receipt};
use super::ledger::{Event, EventLedger, LedgerError};
use crate::core::error::TransitionError;
use crate::core::ops::{LockError, StateLock};
use crate::core::paths::StatePaths;
use crate::core::registry::Registry;
use crate::core::transition::Transition;
use crate::core::types::{Amount, Fingerprint, Identity};
use crate::substrate::ValueTransfer;

/// Errors from snapshot storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state i/o error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("state snapshot '{path}' is invalid: {message}")]
    Corrupted { path: PathBuf, message: String },

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Errors from [`Session::submit`].
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The transition was rejected; nothing changed.
    #[error("rejected")]
    Rejected(#[from] TransitionError),

    /// The transition could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Loads and saves the registry snapshot.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(paths: &StatePaths) -> Self {
        Self {
            path: paths.snapshot_path(),
        }
    }

    /// Load the snapshot. A missing file is an empty registry.
    pub fn load(&self) -> Result<Registry, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot, starting empty");
                return Ok(Registry::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupted {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Save the snapshot atomically.
    pub fn save(&self, registry: &Registry) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(registry)?;
        let io_err = |path: &PathBuf| {
            let path = path.clone();
            move |source| StoreError::Io { path, source }
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err(&parent.to_path_buf()))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(io_err(&temp_path))?;
            file.write_all(&contents).map_err(io_err(&temp_path))?;
            file.sync_all().map_err(io_err(&temp_path))?;
        }
        fs::rename(&temp_path, &self.path).map_err(io_err(&self.path))?;
        Ok(())
    }
}

/// A locked load → submit → save cycle over one state directory.
pub struct Session<T: ValueTransfer> {
    engine: Engine<T>,
    store: StateStore,
    ledger: EventLedger,
    lock: StateLock,
}

impl<T: ValueTransfer> Session<T> {
    /// Lock the state directory, load the snapshot and check it against
    /// the ledger.
    ///
    /// A snapshot whose fingerprint differs from the last one the ledger
    /// recorded is still loaded; the divergence is logged and recorded.
    pub fn open(
        paths: &StatePaths,
        transfer: T,
        default_min_stake: Amount,
    ) -> Result<Self, StoreError> {
        let lock = StateLock::acquire(paths)?;
        debug!(lock = %lock.path().display(), "state locked");
        let store = StateStore::new(paths);
        let ledger = EventLedger::new(paths.ledger_path());

        let registry = store.load()?;
        let current = registry.fingerprint()?;
        if let Some(prior) = ledger.last_fingerprint()? {
            if prior != current.as_str() {
                warn!(
                    prior = %prior,
                    current = %current,
                    "state snapshot diverged from event ledger"
                );
                ledger.append(&Event::divergence_observed(prior, current.as_str()))?;
            }
        }

        let seq = ledger.last_seq()?;
        Ok(Self {
            engine: Engine::resume(registry, seq, transfer, default_min_stake),
            store,
            ledger,
            lock,
        })
    }

    /// Apply one transition and persist it.
    ///
    /// Applied transitions are saved before they are recorded in the
    /// ledger. Rejections are recorded only.
    pub fn submit(
        &mut self,
        caller: &Identity,
        transition: Transition,
    ) -> Result<Receipt, SubmitError> {
        let op = transition.name();
        let repo = transition.repo().clone();

        match self.engine.submit(caller, transition) {
            Ok(receipt) => {
                let registry = self.engine.snapshot();
                self.store.save(&registry)?;
                let fingerprint = registry.fingerprint().map_err(StoreError::from)?;
                let event = Event::applied(
                    receipt.seq,
                    caller,
                    op,
                    &repo,
                    receipt.applied.clone(),
                    &fingerprint,
                );
                if let Err(e) = self.ledger.append(&event) {
                    warn!(error = %e, "snapshot saved but ledger append failed");
                }
                Ok(receipt)
            }
            Err(err) => {
                let fingerprint = self.fingerprint()?;
                let event = Event::rejected(caller, op, &repo, &err, &fingerprint);
                if let Err(e) = self.ledger.append(&event) {
                    warn!(error = %e, "failed to record rejection");
                }
                Err(SubmitError::Rejected(err))
            }
        }
    }

    pub fn engine(&self) -> &Engine<T> {
        &self.engine
    }

    pub fn registry(&self) -> Registry {
        self.engine.snapshot()
    }

    pub fn ledger(&self) -> &EventLedger {
        &self.ledger
    }

    pub fn fingerprint(&self) -> Result<Fingerprint, StoreError> {
        Ok(self.engine.fingerprint()?)
    }

    /// Release the state lock, reporting unlock failures that a plain drop
    /// would swallow.
    pub fn close(mut self) -> Result<(), StoreError> {
        Ok(self.lock.release()?)
    }
}
