//! core::transition
//!
//! The named write operations accepted by the registry.
//!
//! A [`Transition`] carries every parameter of its operation except the
//! caller identity, which is supplied separately by the identity substrate.
//! Transitions serialize with an `op` tag so they can be queued, logged and
//! replayed verbatim.
//!
//! # Example
//!
//! ```
//! use codechain::core::transition::Transition;
//! use codechain::core::types::RepoName;
//!
//! let t = Transition::CreateRepository {
//!     name: RepoName::new("repo1").unwrap(),
//!     min_stake: None,
//! };
//! let json = serde_json::to_string(&t).unwrap();
//! assert!(json.contains("\"op\":\"create_repository\""));
//! ```

use serde::{Deserialize, Serialize};

use super::types::{
    Amount, BranchName, CommitId, ContentRef, PullRequestId, RepoName, Visibility,
};
use crate::substrate::TransferReceipt;

/// A write operation against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Transition {
    CreateRepository {
        name: RepoName,
        /// Per-repository minimum stake; `None` uses the engine default.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_stake: Option<Amount>,
    },
    SetVisibility {
        repo: RepoName,
        public: bool,
    },
    CreateBranch {
        repo: RepoName,
        branch: BranchName,
    },
    Commit {
        repo: RepoName,
        branch: BranchName,
        message: String,
        content: ContentRef,
    },
    AddCollaborator {
        repo: RepoName,
        stake: Amount,
    },
    CreatePullRequest {
        repo: RepoName,
        from: BranchName,
        to: BranchName,
        commit: CommitId,
    },
    ApprovePullRequest {
        repo: RepoName,
        id: PullRequestId,
    },
}

impl Transition {
    /// Operation name, matching the serialized `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Transition::CreateRepository { .. } => "create_repository",
            Transition::SetVisibility { .. } => "set_visibility",
            Transition::CreateBranch { .. } => "create_branch",
            Transition::Commit { .. } => "commit",
            Transition::AddCollaborator { .. } => "add_collaborator",
            Transition::CreatePullRequest { .. } => "create_pull_request",
            Transition::ApprovePullRequest { .. } => "approve_pull_request",
        }
    }

    /// Repository the transition targets.
    pub fn repo(&self) -> &RepoName {
        match self {
            Transition::CreateRepository { name, .. } => name,
            Transition::SetVisibility { repo, .. }
            | Transition::CreateBranch { repo, .. }
            | Transition::Commit { repo, .. }
            | Transition::AddCollaborator { repo, .. }
            | Transition::CreatePullRequest { repo, .. }
            | Transition::ApprovePullRequest { repo, .. } => repo,
        }
    }
}

/// Effect of a successfully applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Applied {
    RepositoryCreated { name: RepoName },
    VisibilitySet { visibility: Visibility },
    BranchCreated { branch: BranchName },
    Committed { branch: BranchName, id: CommitId },
    CollaboratorAdded { receipt: TransferReceipt },
    PullRequestOpened { id: PullRequestId },
    PullRequestApproved { id: PullRequestId },
}

impl std::fmt::Display for Applied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Applied::RepositoryCreated { name } => write!(f, "created repository '{}'", name),
            Applied::VisibilitySet { visibility } => write!(f, "visibility set to {}", visibility),
            Applied::BranchCreated { branch } => write!(f, "created branch '{}'", branch),
            Applied::Committed { branch, id } => write!(f, "committed {} on '{}'", id, branch),
            Applied::CollaboratorAdded { receipt } => {
                write!(f, "joined as collaborator (receipt {})", receipt)
            }
            Applied::PullRequestOpened { id } => write!(f, "opened pull request #{}", id),
            Applied::PullRequestApproved { id } => write!(f, "approved pull request #{}", id),
        }
    }
}
