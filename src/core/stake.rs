//! core::stake
//!
//! Stake ledger gating collaborator membership.
//!
//! # Atomicity
//!
//! Joining a repository pairs two effects: the value transfer from the
//! joining identity to the owner, and the membership grant. [`join`]
//! validates every precondition first, then asks the value-transfer
//! capability to move funds, and only once that succeeded records the
//! transfer and grants membership in a single infallible step. Either both
//! effects appear or neither does.

use serde::{Deserialize, Serialize};

use super::error::TransitionError;
use super::repository::Repository;
use super::types::{Amount, Identity};
use crate::substrate::{TransferReceipt, ValueTransfer};

/// Minimum stake applied when neither configuration nor the creating
/// transition names one: one whole token.
pub const DEFAULT_MIN_STAKE: Amount = Amount::TOKEN;

/// A recorded stake transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub payer: Identity,
    pub payee: Identity,
    pub amount: Amount,
    pub receipt: TransferReceipt,
}

/// Per-repository stake state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeLedger {
    minimum: Amount,
    records: Vec<StakeRecord>,
}

impl StakeLedger {
    pub fn new(minimum: Amount) -> Self {
        Self {
            minimum,
            records: Vec::new(),
        }
    }

    /// Minimum stake required to join.
    pub fn minimum(&self) -> Amount {
        self.minimum
    }

    /// Recorded transfers, oldest first.
    pub fn records(&self) -> &[StakeRecord] {
        &self.records
    }

    pub(crate) fn record(&mut self, record: StakeRecord) {
        self.records.push(record);
    }
}

/// Join `repo` as a collaborator by staking `amount`.
///
/// # Errors
///
/// - [`TransitionError::AlreadyMember`] if `caller` is the owner or a collaborator
/// - [`TransitionError::InsufficientStake`] if `amount` is below the minimum
/// - [`TransitionError::TransferFailed`] if the capability refuses the transfer
///
/// On any error the repository is unchanged.
pub fn join(
    repo: &mut Repository,
    caller: &Identity,
    amount: Amount,
    transfer: &dyn ValueTransfer,
) -> Result<TransferReceipt, TransitionError> {
    if repo.role_of(caller).is_member() {
        return Err(TransitionError::AlreadyMember {
            repo: repo.name().clone(),
            caller: caller.clone(),
        });
    }

    let required = repo.stake().minimum();
    if amount < required {
        return Err(TransitionError::InsufficientStake {
            repo: repo.name().clone(),
            required,
            offered: amount,
        });
    }

    let receipt = transfer
        .transfer(caller, repo.owner(), amount)
        .map_err(|e| TransitionError::TransferFailed {
            repo: repo.name().clone(),
            reason: e.to_string(),
        })?;

    let record = StakeRecord {
        payer: caller.clone(),
        payee: repo.owner().clone(),
        amount,
        receipt: receipt.clone(),
    };
    repo.admit_with_stake(caller.clone(), record);

    Ok(receipt)
}
