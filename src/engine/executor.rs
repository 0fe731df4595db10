//! engine::executor
//!
//! The single transactional executor for transitions.
//!
//! # Architecture
//!
//! [`Engine`] owns the [`Registry`] behind one mutex. The lock spans both
//! validation and application of a transition, so concurrent callers are
//! totally ordered and each one observes every effect committed before it.
//!
//! Every submission is numbered. Applied transitions advance the sequence;
//! rejected ones do not.
//!
//! # Invariants
//!
//! - The engine is the only component that mutates the registry
//! - A rejected transition leaves the registry untouched
//! - Sequence numbers of applied transitions are gapless and increasing
//!
//! # Example
//!
//! ```
//! use codechain::core::stake::DEFAULT_MIN_STAKE;
//! use codechain::core::transition::Transition;
//! use codechain::core::types::{Identity, RepoName};
//! use codechain::engine::Engine;
//! use codechain::substrate::MockTransfer;
//!
//! let engine = Engine::new(MockTransfer::new(), DEFAULT_MIN_STAKE);
//! let owner = Identity::new("O").unwrap();
//! let receipt = engine
//!     .submit(
//!         &owner,
//!         Transition::CreateRepository { name: RepoName::new("repo1").unwrap(), min_stake: None },
//!     )
//!     .unwrap();
//! assert_eq!(receipt.seq, 1);
//! assert_eq!(engine.read(|r| r.len()), 1);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::TransitionError;
use crate::core::registry::{Registry, TransitionEnv};
use crate::core::transition::{Applied, Transition};
use crate::core::types::{Amount, Fingerprint, Identity};
use crate::substrate::ValueTransfer;

/// Outcome of an applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Position in the total order of applied transitions.
    pub seq: u64,
    pub op: String,
    pub applied: Applied,
}

#[derive(Debug)]
struct EngineState {
    registry: Registry,
    seq: u64,
}

/// Mutex-serialized state machine over a [`Registry`].
#[derive(Debug)]
pub struct Engine<T: ValueTransfer> {
    state: Mutex<EngineState>,
    transfer: T,
    default_min_stake: Amount,
}

impl<T: ValueTransfer> Engine<T> {
    /// Engine over an empty registry.
    pub fn new(transfer: T, default_min_stake: Amount) -> Self {
        Self::resume(Registry::new(), 0, transfer, default_min_stake)
    }

    /// Engine over an existing registry whose last applied sequence is `seq`.
    pub fn resume(registry: Registry, seq: u64, transfer: T, default_min_stake: Amount) -> Self {
        Self {
            state: Mutex::new(EngineState { registry, seq }),
            transfer,
            default_min_stake,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        // Transitions never leave the registry half-applied, so a poisoned
        // guard still holds a consistent registry.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and apply one transition atomically.
    ///
    /// # Errors
    ///
    /// Returns the [`TransitionError`] of the first failed precondition.
    /// The registry is unchanged in that case.
    pub fn submit(
        &self,
        caller: &Identity,
        transition: Transition,
    ) -> Result<Receipt, TransitionError> {
        let op = transition.name();
        let repo = transition.repo().clone();
        let env = TransitionEnv::new(&self.transfer, self.default_min_stake);

        let mut state = self.lock();
        match state.registry.apply(caller, transition, &env) {
            Ok(applied) => {
                state.seq += 1;
                let seq = state.seq;
                info!(op, %repo, %caller, seq, "transition applied: {}", applied);
                Ok(Receipt {
                    seq,
                    op: op.to_string(),
                    applied,
                })
            }
            Err(err) => {
                warn!(op, %repo, %caller, code = err.code(), "transition rejected: {}", err);
                Err(err)
            }
        }
    }

    /// Run a read-only query against a consistent view of the registry.
    pub fn read<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        let state = self.lock();
        f(&state.registry)
    }

    /// Sequence number of the last applied transition.
    pub fn seq(&self) -> u64 {
        self.lock().seq
    }

    pub fn fingerprint(&self) -> Result<Fingerprint, serde_json::Error> {
        self.lock().registry.fingerprint()
    }

    /// Clone of the current registry.
    pub fn snapshot(&self) -> Registry {
        self.lock().registry.clone()
    }

    pub fn default_min_stake(&self) -> Amount {
        self.default_min_stake
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    pub fn into_registry(self) -> Registry {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .registry
    }
}
