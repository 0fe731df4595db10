//! substrate
//!
//! The external systems the ledger depends on: value transfer, content
//! storage, and caller identity.
//!
//! # Architecture
//!
//! The core only ever sees the traits in [`traits`]. Hosts wire concrete
//! implementations:
//!
//! - [`local`] - Receipt-issuing transfer and configured identity for the CLI
//! - [`content`] - Content-addressed directory store on local disk
//! - [`mock`] - Deterministic transfer double with failure injection
//!
//! # Example
//!
//! ```
//! use codechain::substrate::{LocalTransfer, ValueTransfer};
//!
//! fn takes_transfer(_t: &dyn ValueTransfer) {}
//! takes_transfer(&LocalTransfer::new());
//! ```

pub mod content;
pub mod local;
pub mod mock;
pub mod traits;

pub use content::LocalContentStore;
pub use local::{ConfiguredIdentity, LocalTransfer, IDENTITY_ENV};
pub use mock::{CompletedTransfer, FailOn, MockOperation, MockTransfer};
pub use traits::{
    ContentError, ContentStore, IdentityError, IdentitySource, TransferError, TransferReceipt,
    ValueTransfer,
};
