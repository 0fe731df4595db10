//! substrate::mock
//!
//! Mock value-transfer substrate for deterministic testing.
//!
//! # Design
//!
//! The mock issues sequential receipts (`mock-1`, `mock-2`, ...), records
//! every attempted transfer, and can be configured to fail so that tests
//! can prove a refused transfer leaves the ledger untouched.
//!
//! # Example
//!
//! ```
//! use codechain::core::types::{Amount, Identity};
//! use codechain::substrate::{FailOn, MockTransfer, TransferError, ValueTransfer};
//!
//! let transfer = MockTransfer::new()
//!     .fail_on(FailOn::Transfer(TransferError::InsufficientFunds("empty".into())));
//!
//! let result = transfer.transfer(
//!     &Identity::new("a").unwrap(),
//!     &Identity::new("b").unwrap(),
//!     Amount::new(1),
//! );
//! assert!(result.is_err());
//! assert_eq!(transfer.attempts().len(), 1);
//! assert!(transfer.transfers().is_empty());
//! ```

use std::sync::{Arc, Mutex};

use super::traits::{TransferError, TransferReceipt, ValueTransfer};
use crate::core::types::{Amount, Identity};

/// Mock transfer substrate for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockTransfer {
    inner: Arc<Mutex<MockTransferInner>>,
}

#[derive(Debug)]
struct MockTransferInner {
    next_receipt: u64,
    fail_on: Option<FailOn>,
    attempts: Vec<MockOperation>,
    completed: Vec<CompletedTransfer>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every transfer with the given error.
    Transfer(TransferError),
    /// Fail transfers from this payer only.
    TransferFrom(Identity, TransferError),
}

/// Recorded attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Transfer {
        payer: Identity,
        payee: Identity,
        amount: Amount,
    },
}

/// A transfer that went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTransfer {
    pub payer: Identity,
    pub payee: Identity,
    pub amount: Amount,
    pub receipt: TransferReceipt,
}

impl MockTransfer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransferInner {
                next_receipt: 1,
                fail_on: None,
                attempts: Vec::new(),
                completed: Vec::new(),
            })),
        }
    }

    /// Configure the mock to fail.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Every transfer attempt, in order.
    pub fn attempts(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.attempts.clone()
    }

    /// Transfers that succeeded, in order.
    pub fn transfers(&self) -> Vec<CompletedTransfer> {
        let inner = self.inner.lock().unwrap();
        inner.completed.clone()
    }

    fn check_fail(&self, payer: &Identity) -> Option<TransferError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::Transfer(e)) => Some(e.clone()),
            Some(FailOn::TransferFrom(who, e)) if who == payer => Some(e.clone()),
            _ => None,
        }
    }
}

impl Default for MockTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueTransfer for MockTransfer {
    fn transfer(
        &self,
        payer: &Identity,
        payee: &Identity,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferError> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.attempts.push(MockOperation::Transfer {
                payer: payer.clone(),
                payee: payee.clone(),
                amount,
            });
        }

        if let Some(err) = self.check_fail(payer) {
            return Err(err);
        }

        let mut inner = self.inner.lock().unwrap();
        let receipt = TransferReceipt::new(format!("mock-{}", inner.next_receipt));
        inner.next_receipt += 1;
        inner.completed.push(CompletedTransfer {
            payer: payer.clone(),
            payee: payee.clone(),
            amount,
            receipt: receipt.clone(),
        });
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    #[test]
    fn receipts_are_sequential() {
        let transfer = MockTransfer::new();
        let a = transfer.transfer(&id("a"), &id("o"), Amount::new(1)).unwrap();
        let b = transfer.transfer(&id("b"), &id("o"), Amount::new(2)).unwrap();
        assert_eq!(a.as_str(), "mock-1");
        assert_eq!(b.as_str(), "mock-2");
    }

    #[test]
    fn fail_on_payer_only_hits_that_payer() {
        let transfer = MockTransfer::new().fail_on(FailOn::TransferFrom(
            id("broke"),
            TransferError::InsufficientFunds("0".into()),
        ));

        assert!(transfer.transfer(&id("broke"), &id("o"), Amount::new(1)).is_err());
        assert!(transfer.transfer(&id("rich"), &id("o"), Amount::new(1)).is_ok());
        assert_eq!(transfer.attempts().len(), 2);
        assert_eq!(transfer.transfers().len(), 1);
    }

    #[test]
    fn clear_fail_on_restores_success() {
        let transfer =
            MockTransfer::new().fail_on(FailOn::Transfer(TransferError::Unavailable("down".into())));
        assert!(transfer.transfer(&id("a"), &id("o"), Amount::new(1)).is_err());
        transfer.clear_fail_on();
        assert!(transfer.transfer(&id("a"), &id("o"), Amount::new(1)).is_ok());
    }

    #[test]
    fn clones_share_state() {
        let transfer = MockTransfer::new();
        let clone = transfer.clone();
        clone.transfer(&id("a"), &id("o"), Amount::new(1)).unwrap();
        assert_eq!(transfer.transfers().len(), 1);
    }
}
