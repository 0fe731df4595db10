//! core::pull
//!
//! Pull request workflow for one repository.
//!
//! Each pull request moves through a single one-way transition,
//! `pending -> approved`. Approval only records the decision and the
//! approver; it does not move the head of either branch.

use serde::{Deserialize, Serialize};

use super::types::{BranchName, CommitId, Identity, PullRequestId};

/// Pull request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrStatus {
    Pending,
    Approved,
}

impl std::fmt::Display for PrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrStatus::Pending => write!(f, "pending"),
            PrStatus::Approved => write!(f, "approved"),
        }
    }
}

/// A proposed merge from one branch into another at a given commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: PullRequestId,
    pub from: BranchName,
    pub to: BranchName,
    pub commit: CommitId,
    pub author: Identity,
    pub status: PrStatus,
    pub approver: Option<Identity>,
}

impl PullRequest {
    pub fn is_approved(&self) -> bool {
        self.status == PrStatus::Approved
    }
}

/// Pull requests of one repository, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestWorkflow {
    requests: Vec<PullRequest>,
}

impl PullRequestWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next opened pull request will receive.
    pub fn next_id(&self) -> PullRequestId {
        PullRequestId::new(self.requests.len() as u64 + 1)
    }

    /// Open a pending pull request. Callers validate branches and commit first.
    pub fn open(
        &mut self,
        from: BranchName,
        to: BranchName,
        commit: CommitId,
        author: Identity,
    ) -> PullRequestId {
        let id = self.next_id();
        self.requests.push(PullRequest {
            id,
            from,
            to,
            commit,
            author,
            status: PrStatus::Pending,
            approver: None,
        });
        id
    }

    pub fn get(&self, id: PullRequestId) -> Option<&PullRequest> {
        self.requests.iter().find(|pr| pr.id == id)
    }

    /// Mark a pending pull request approved.
    ///
    /// Returns `false` without changing anything if the request does not
    /// exist or is already approved.
    pub fn approve(&mut self, id: PullRequestId, approver: Identity) -> bool {
        match self.requests.iter_mut().find(|pr| pr.id == id) {
            Some(pr) if pr.status == PrStatus::Pending => {
                pr.status = PrStatus::Approved;
                pr.approver = Some(approver);
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PullRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
