//! substrate::traits
//!
//! Capability traits for the systems the ledger core depends on but does
//! not implement.
//!
//! # Design
//!
//! Each external dependency is a narrow trait supplied by the host:
//!
//! - [`ValueTransfer`] moves stake funds from a joining identity to the
//!   repository owner. It is called only after every other precondition of
//!   the join transition passed, and a failure rejects the whole transition.
//! - [`ContentStore`] turns a directory tree into an opaque
//!   [`ContentRef`] and back. The core never calls it.
//! - [`IdentitySource`] yields the verified identity of the caller. The
//!   core trusts it completely.
//!
//! All traits are synchronous: the core applies one transition at a time
//! and never suspends in the middle of one.
//!
//! # Example
//!
//! ```
//! use codechain::core::types::{Amount, Identity};
//! use codechain::substrate::{MockTransfer, ValueTransfer};
//!
//! let transfer = MockTransfer::new();
//! let receipt = transfer
//!     .transfer(
//!         &Identity::new("payer").unwrap(),
//!         &Identity::new("payee").unwrap(),
//!         Amount::new(5),
//!     )
//!     .unwrap();
//! assert_eq!(receipt.as_str(), "mock-1");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Amount, ContentRef, Identity};

/// Errors from the value-transfer substrate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// Payer cannot cover the amount.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// The substrate refused the transfer.
    #[error("transfer rejected: {0}")]
    Rejected(String),

    /// The substrate could not be reached.
    #[error("transfer substrate unavailable: {0}")]
    Unavailable(String),
}

/// Proof of a completed transfer, issued by the substrate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferReceipt(String);

impl TransferReceipt {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransferReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Moves value between identities.
pub trait ValueTransfer: Send + Sync {
    /// Transfer `amount` from `payer` to `payee`.
    ///
    /// # Errors
    ///
    /// Any error means no value moved.
    fn transfer(
        &self,
        payer: &Identity,
        payee: &Identity,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferError>;
}

/// Errors from content stores.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The reference is not known to the store.
    #[error("content not found: {0}")]
    NotFound(String),

    /// Only directory trees can be stored.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(std::path::PathBuf),

    /// The stored content does not match its reference.
    #[error("content corrupted: {0}")]
    Corrupted(String),

    /// I/O failure while reading or writing content.
    #[error("content i/o error at '{path}': {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Content-addressed storage for directory trees.
pub trait ContentStore: Send + Sync {
    /// Store the tree rooted at `dir`, returning its reference.
    fn put(&self, dir: &Path) -> Result<ContentRef, ContentError>;

    /// Materialize the tree behind `reference` under `dest`.
    fn fetch(&self, reference: &ContentRef, dest: &Path) -> Result<(), ContentError>;
}

/// Errors resolving the caller identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No identity was configured or supplied.
    #[error("no caller identity available; pass --as <identity> or set `identity` in config")]
    Missing,

    /// The supplied identity is malformed.
    #[error(transparent)]
    Invalid(#[from] crate::core::types::TypeError),
}

/// Supplies the verified identity of the current caller.
pub trait IdentitySource {
    fn current(&self) -> Result<Identity, IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_error_display() {
        let err = TransferError::InsufficientFunds("balance 0".into());
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[test]
    fn receipt_serializes_transparently() {
        let receipt = TransferReceipt::new("r-1");
        assert_eq!(serde_json::to_string(&receipt).unwrap(), "\"r-1\"");
    }

    #[test]
    fn identity_missing_mentions_flag() {
        assert!(IdentityError::Missing.to_string().contains("--as"));
    }
}
