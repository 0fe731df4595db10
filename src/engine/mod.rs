//! engine
//!
//! Serializes transitions and makes their effects durable.
//!
//! # Architecture
//!
//! - [`executor`] - [`Engine`]: the mutex-guarded single transactional executor
//! - [`sequencer`] - [`Sequencer`]: an mpsc queue drained by one writer task
//! - [`store`] - [`StateStore`] snapshots and the locked [`Session`]
//! - [`ledger`] - [`EventLedger`]: append-only audit trail
//!
//! # Command Lifecycle
//!
//! ```text
//! Lock -> Load -> Check divergence -> Submit -> Save -> Record -> Unlock
//! ```
//!
//! # Invariants
//!
//! - All mutations flow through [`Engine::submit`]
//! - A rejected transition changes nothing but the ledger
//! - The snapshot is the source of truth; the ledger is evidence

pub mod executor;
pub mod ledger;
pub mod sequencer;
pub mod store;

pub use executor::{Engine, Receipt};
pub use ledger::{Event, EventLedger, LedgerError};
pub use sequencer::{Sequencer, SequencerError, SequencerHandle};
pub use store::{Session, StateStore, StoreError, SubmitError};

use std::path::PathBuf;

/// Execution context for commands.
///
/// Global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// State directory override (`--state`).
    pub state: Option<PathBuf>,
    /// Caller identity override (`--as`).
    pub identity: Option<String>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}
