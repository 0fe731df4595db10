//! core::error
//!
//! Rejection reasons for state-machine transitions.
//!
//! Every variant is a precondition failure detected before any mutation,
//! so a transition that returns one of these has left the registry
//! untouched.

use thiserror::Error;

use super::types::{Amount, BranchName, CommitId, Identity, PullRequestId, RepoName};

/// Why a transition or restricted query was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// A repository with this name is already registered.
    #[error("repository '{0}' already exists")]
    DuplicateName(RepoName),

    /// The branch already exists in the repository.
    #[error("branch '{branch}' already exists in '{repo}'")]
    DuplicateBranch { repo: RepoName, branch: BranchName },

    /// No repository with this name is registered.
    #[error("repository '{0}' does not exist")]
    UnknownRepository(RepoName),

    /// Operation is restricted to the repository owner.
    #[error("'{caller}' is not the owner of '{repo}'")]
    NotOwner { repo: RepoName, caller: Identity },

    /// Caller lacks the role required for this operation.
    #[error("'{caller}' is not authorized to {action} in '{repo}'")]
    NotAuthorized {
        repo: RepoName,
        caller: Identity,
        action: &'static str,
    },

    /// Repository is private and the caller is not a member.
    #[error("repository '{repo}' is not visible to '{caller}'")]
    NotVisible { repo: RepoName, caller: Identity },

    /// The branch does not exist in the repository.
    #[error("branch '{branch}' does not exist in '{repo}'")]
    UnknownBranch { repo: RepoName, branch: BranchName },

    /// No commit with this id is reachable.
    #[error("commit {commit} does not exist in '{repo}'")]
    UnknownCommit { repo: RepoName, commit: CommitId },

    /// The pull request does not exist in the repository.
    #[error("pull request #{id} does not exist in '{repo}'")]
    UnknownPullRequest { repo: RepoName, id: PullRequestId },

    /// Caller is already the owner or a collaborator.
    #[error("'{caller}' is already a member of '{repo}'")]
    AlreadyMember { repo: RepoName, caller: Identity },

    /// The pull request has already been approved.
    #[error("pull request #{id} in '{repo}' is already approved")]
    AlreadyApproved { repo: RepoName, id: PullRequestId },

    /// Offered stake is below the repository minimum.
    #[error("stake of {offered} is below the minimum of {required} for '{repo}'")]
    InsufficientStake {
        repo: RepoName,
        required: Amount,
        offered: Amount,
    },

    /// A repository minimum stake must be positive.
    #[error("minimum stake for '{0}' must be greater than zero")]
    ZeroMinStake(RepoName),

    /// The value-transfer capability refused the stake transfer.
    #[error("stake transfer for '{repo}' failed: {reason}")]
    TransferFailed { repo: RepoName, reason: String },
}

impl TransitionError {
    /// Stable machine-readable code for this rejection.
    pub fn code(&self) -> &'static str {
        match self {
            TransitionError::DuplicateName(_) => "duplicate_name",
            TransitionError::DuplicateBranch { .. } => "duplicate_branch",
            TransitionError::UnknownRepository(_) => "unknown_repository",
            TransitionError::NotOwner { .. } => "not_owner",
            TransitionError::NotAuthorized { .. } => "not_authorized",
            TransitionError::NotVisible { .. } => "not_visible",
            TransitionError::UnknownBranch { .. } => "unknown_branch",
            TransitionError::UnknownCommit { .. } => "unknown_commit",
            TransitionError::UnknownPullRequest { .. } => "unknown_pull_request",
            TransitionError::AlreadyMember { .. } => "already_member",
            TransitionError::AlreadyApproved { .. } => "already_approved",
            TransitionError::InsufficientStake { .. } => "insufficient_stake",
            TransitionError::ZeroMinStake(_) => "zero_min_stake",
            TransitionError::TransferFailed { .. } => "transfer_failed",
        }
    }
}
