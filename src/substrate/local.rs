//! substrate::local
//!
//! Local stand-ins for the value-transfer and identity substrates, used by
//! the CLI host.
//!
//! [`LocalTransfer`] does not custody funds: it accepts every non-zero
//! transfer and issues a unique receipt, leaving settlement to whatever
//! system the host is wired to. [`ConfiguredIdentity`] resolves the caller
//! from an explicit flag, then the environment, then configuration.

use tracing::debug;

use super::traits::{
    IdentityError, IdentitySource, TransferError, TransferReceipt, ValueTransfer,
};
use crate::core::types::{Amount, Identity};

/// Environment variable consulted for the caller identity.
pub const IDENTITY_ENV: &str = "CODECHAIN_IDENTITY";

/// Value transfer that records intent and issues receipts.
#[derive(Debug, Clone, Default)]
pub struct LocalTransfer;

impl LocalTransfer {
    pub fn new() -> Self {
        Self
    }
}

impl ValueTransfer for LocalTransfer {
    fn transfer(
        &self,
        payer: &Identity,
        payee: &Identity,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferError> {
        if amount == Amount::ZERO {
            return Err(TransferError::Rejected("cannot transfer zero".into()));
        }
        if payer == payee {
            return Err(TransferError::Rejected(
                "payer and payee are the same identity".into(),
            ));
        }
        let receipt = TransferReceipt::new(uuid::Uuid::new_v4().to_string());
        debug!(%payer, %payee, %amount, %receipt, "local transfer issued");
        Ok(receipt)
    }
}

/// Caller identity resolved from flag, environment, or configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredIdentity {
    explicit: Option<String>,
    configured: Option<String>,
}

impl ConfiguredIdentity {
    /// `explicit` comes from the command line, `configured` from config files.
    pub fn new(explicit: Option<String>, configured: Option<String>) -> Self {
        Self {
            explicit,
            configured,
        }
    }
}

impl IdentitySource for ConfiguredIdentity {
    fn current(&self) -> Result<Identity, IdentityError> {
        let raw = self
            .explicit
            .clone()
            .or_else(|| std::env::var(IDENTITY_ENV).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.configured.clone())
            .ok_or(IdentityError::Missing)?;
        Ok(Identity::new(raw)?)
    }
}
