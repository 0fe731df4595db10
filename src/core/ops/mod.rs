//! core::ops
//!
//! Process-level serialization of mutating commands.
//!
//! Every mutating command:
//! 1. Acquires the exclusive state lock
//! 2. Loads the registry snapshot
//! 3. Applies exactly one transition
//! 4. Saves the snapshot and appends to the event ledger
//! 5. Releases the lock

pub mod lock;

pub use lock::{LockError, StateLock};
