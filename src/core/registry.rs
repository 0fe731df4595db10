//! core::registry
//!
//! The repository registry: the single aggregate holding all ledger state,
//! and the dispatcher for [`Transition`]s.
//!
//! # Design
//!
//! The registry is an explicit store object. Hosts create one (or load one
//! from a snapshot) and pass it by reference into every handler; nothing in
//! the crate keeps ambient global state, so tests simply build a fresh
//! registry each time.
//!
//! The registry itself is single threaded. Serializing concurrent callers is
//! the job of [`crate::engine::Engine`] or [`crate::engine::Sequencer`].
//!
//! # Invariants
//!
//! - Repository names are unique; registration order is preserved
//! - Every operation validates all preconditions before mutating, so an
//!   `Err` leaves the registry byte-for-byte identical (same fingerprint)
//!
//! # Example
//!
//! ```
//! use codechain::core::registry::{Registry, TransitionEnv};
//! use codechain::core::stake::DEFAULT_MIN_STAKE;
//! use codechain::core::transition::Transition;
//! use codechain::core::types::{BranchName, Identity, RepoName};
//! use codechain::substrate::MockTransfer;
//!
//! let transfer = MockTransfer::new();
//! let env = TransitionEnv::new(&transfer, DEFAULT_MIN_STAKE);
//! let mut registry = Registry::new();
//! let owner = Identity::new("O").unwrap();
//! let repo = RepoName::new("repo1").unwrap();
//!
//! registry
//!     .apply(&owner, Transition::CreateRepository { name: repo.clone(), min_stake: None }, &env)
//!     .unwrap();
//! assert_eq!(registry.branches(&repo).unwrap(), vec![BranchName::main()]);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::branch::Commit;
use super::error::TransitionError;
use super::pull::PullRequest;
use super::repository::{Repository, RepositoryInfo};
use super::stake::{self, StakeRecord};
use super::transition::{Applied, Transition};
use super::types::{
    Amount, BranchName, CommitId, ContentRef, Fingerprint, Identity, PullRequestId, RepoName,
    Visibility,
};
use crate::substrate::{TransferReceipt, ValueTransfer};

/// Host capabilities and defaults available while applying a transition.
#[derive(Clone, Copy)]
pub struct TransitionEnv<'a> {
    pub transfer: &'a dyn ValueTransfer,
    pub default_min_stake: Amount,
}

impl<'a> TransitionEnv<'a> {
    pub fn new(transfer: &'a dyn ValueTransfer, default_min_stake: Amount) -> Self {
        Self {
            transfer,
            default_min_stake,
        }
    }
}

/// All repositories, keyed by name, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    repositories: BTreeMap<RepoName, Repository>,
    order: Vec<RepoName>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transition on behalf of `caller`.
    pub fn apply(
        &mut self,
        caller: &Identity,
        transition: Transition,
        env: &TransitionEnv<'_>,
    ) -> Result<Applied, TransitionError> {
        match transition {
            Transition::CreateRepository { name, min_stake } => {
                let min_stake = min_stake.unwrap_or(env.default_min_stake);
                self.create_repository(name.clone(), caller, min_stake)?;
                Ok(Applied::RepositoryCreated { name })
            }
            Transition::SetVisibility { repo, public } => {
                self.set_visibility(&repo, caller, public)?;
                Ok(Applied::VisibilitySet {
                    visibility: Visibility::from_public(public),
                })
            }
            Transition::CreateBranch { repo, branch } => {
                self.create_branch(&repo, caller, branch.clone())?;
                Ok(Applied::BranchCreated { branch })
            }
            Transition::Commit {
                repo,
                branch,
                message,
                content,
            } => {
                let id = self.commit(&repo, caller, &branch, message, content)?;
                Ok(Applied::Committed { branch, id })
            }
            Transition::AddCollaborator { repo, stake } => {
                let receipt = self.add_collaborator(&repo, caller, stake, env.transfer)?;
                Ok(Applied::CollaboratorAdded { receipt })
            }
            Transition::CreatePullRequest {
                repo,
                from,
                to,
                commit,
            } => {
                let id = self.create_pull_request(&repo, caller, from, to, commit)?;
                Ok(Applied::PullRequestOpened { id })
            }
            Transition::ApprovePullRequest { repo, id } => {
                self.approve_pull_request(&repo, caller, id)?;
                Ok(Applied::PullRequestApproved { id })
            }
        }
    }

    /// SHA-256 of the registry's canonical JSON form.
    ///
    /// Every map in the registry is ordered, so equal registries always
    /// produce equal fingerprints.
    pub fn fingerprint(&self) -> Result<Fingerprint, serde_json::Error> {
        Ok(Fingerprint::compute(&serde_json::to_vec(self)?))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Repositories in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Repository> {
        self.order
            .iter()
            .filter_map(move |name| self.repositories.get(name))
    }

    pub fn repository(&self, name: &RepoName) -> Result<&Repository, TransitionError> {
        self.repositories
            .get(name)
            .ok_or_else(|| TransitionError::UnknownRepository(name.clone()))
    }

    fn repository_mut(&mut self, name: &RepoName) -> Result<&mut Repository, TransitionError> {
        self.repositories
            .get_mut(name)
            .ok_or_else(|| TransitionError::UnknownRepository(name.clone()))
    }

    // ------------------------------------------------------------------
    // Repository registry
    // ------------------------------------------------------------------

    /// Register a private repository owned by `caller` with an empty `main`.
    pub fn create_repository(
        &mut self,
        name: RepoName,
        caller: &Identity,
        min_stake: Amount,
    ) -> Result<(), TransitionError> {
        if self.repositories.contains_key(&name) {
            return Err(TransitionError::DuplicateName(name));
        }
        if min_stake == Amount::ZERO {
            return Err(TransitionError::ZeroMinStake(name));
        }
        let repo = Repository::new(name.clone(), caller.clone(), min_stake);
        self.repositories.insert(name.clone(), repo);
        self.order.push(name);
        Ok(())
    }

    pub fn set_visibility(
        &mut self,
        name: &RepoName,
        caller: &Identity,
        public: bool,
    ) -> Result<(), TransitionError> {
        self.repository_mut(name)?
            .set_visibility(caller, Visibility::from_public(public))
    }

    pub fn repository_info(
        &self,
        name: &RepoName,
        caller: &Identity,
    ) -> Result<RepositoryInfo, TransitionError> {
        self.repository(name)?.info(caller)
    }

    /// Public repository names, in registration order.
    pub fn list_public_repositories(&self) -> Vec<RepoName> {
        self.iter()
            .filter(|r| r.visibility().is_public())
            .map(|r| r.name().clone())
            .collect()
    }

    /// Repositories where `identity` is owner or collaborator, in registration order.
    pub fn list_repositories_for(&self, identity: &Identity) -> Vec<RepoName> {
        self.iter()
            .filter(|r| r.role_of(identity).is_member())
            .map(|r| r.name().clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Branch store / commit log
    // ------------------------------------------------------------------

    pub fn create_branch(
        &mut self,
        repo: &RepoName,
        caller: &Identity,
        branch: BranchName,
    ) -> Result<(), TransitionError> {
        self.repository_mut(repo)?.create_branch(caller, branch)
    }

    pub fn commit(
        &mut self,
        repo: &RepoName,
        caller: &Identity,
        branch: &BranchName,
        message: String,
        content: ContentRef,
    ) -> Result<CommitId, TransitionError> {
        self.repository_mut(repo)?
            .commit(caller, branch, message, content)
    }

    pub fn latest_commit_id(
        &self,
        repo: &RepoName,
        branch: &BranchName,
    ) -> Result<Option<CommitId>, TransitionError> {
        self.repository(repo)?.latest_commit_id(branch)
    }

    pub fn latest_content_ref(
        &self,
        repo: &RepoName,
        branch: &BranchName,
    ) -> Result<ContentRef, TransitionError> {
        self.repository(repo)?
            .latest_content_ref(branch)
            .cloned()
    }

    /// Most recent commit carrying `id` in the repository.
    pub fn get_commit(&self, repo: &RepoName, id: CommitId) -> Result<Commit, TransitionError> {
        self.repository(repo)?.commit_by_id(id).cloned()
    }

    pub fn get_commit_on(
        &self,
        repo: &RepoName,
        branch: &BranchName,
        id: CommitId,
    ) -> Result<Commit, TransitionError> {
        self.repository(repo)?.commit_on(branch, id).cloned()
    }

    /// Branch names in creation order.
    pub fn branches(&self, repo: &RepoName) -> Result<Vec<BranchName>, TransitionError> {
        Ok(self.repository(repo)?.branches().names())
    }

    /// All commits on `branch`, oldest first.
    pub fn branch_history(
        &self,
        repo: &RepoName,
        branch: &BranchName,
    ) -> Result<Vec<Commit>, TransitionError> {
        Ok(self.repository(repo)?.branch(branch)?.history().to_vec())
    }

    // ------------------------------------------------------------------
    // Stake ledger
    // ------------------------------------------------------------------

    pub fn add_collaborator(
        &mut self,
        repo: &RepoName,
        caller: &Identity,
        amount: Amount,
        transfer: &dyn ValueTransfer,
    ) -> Result<TransferReceipt, TransitionError> {
        stake::join(self.repository_mut(repo)?, caller, amount, transfer)
    }

    pub fn is_collaborator(
        &self,
        repo: &RepoName,
        identity: &Identity,
    ) -> Result<bool, TransitionError> {
        Ok(self.repository(repo)?.is_collaborator(identity))
    }

    pub fn stake_records(&self, repo: &RepoName) -> Result<Vec<StakeRecord>, TransitionError> {
        Ok(self.repository(repo)?.stake().records().to_vec())
    }

    // ------------------------------------------------------------------
    // Pull request workflow
    // ------------------------------------------------------------------

    pub fn create_pull_request(
        &mut self,
        repo: &RepoName,
        caller: &Identity,
        from: BranchName,
        to: BranchName,
        commit: CommitId,
    ) -> Result<PullRequestId, TransitionError> {
        self.repository_mut(repo)?
            .open_pull_request(caller, from, to, commit)
    }

    pub fn approve_pull_request(
        &mut self,
        repo: &RepoName,
        caller: &Identity,
        id: PullRequestId,
    ) -> Result<(), TransitionError> {
        self.repository_mut(repo)?.approve_pull_request(caller, id)
    }

    pub fn get_pull_request(
        &self,
        repo: &RepoName,
        id: PullRequestId,
    ) -> Result<PullRequest, TransitionError> {
        self.repository(repo)?.pull_request(id).cloned()
    }

    pub fn pull_requests(&self, repo: &RepoName) -> Result<Vec<PullRequest>, TransitionError> {
        Ok(self.repository(repo)?.pulls().iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stake::DEFAULT_MIN_STAKE;
    use crate::substrate::MockTransfer;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn name(s: &str) -> RepoName {
        RepoName::new(s).unwrap()
    }

    fn create(registry: &mut Registry, repo: &str, owner: &str) {
        registry
            .create_repository(name(repo), &id(owner), DEFAULT_MIN_STAKE)
            .unwrap();
    }

    #[test]
    fn zero_min_stake_rejected_at_creation() {
        let transfer = MockTransfer::new();
        let env = TransitionEnv::new(&transfer, DEFAULT_MIN_STAKE);
        let mut registry = Registry::new();

        let err = registry
            .apply(
                &id("O"),
                Transition::CreateRepository {
                    name: name("free"),
                    min_stake: Some(Amount::ZERO),
                },
                &env,
            )
            .unwrap_err();
        assert_eq!(err, TransitionError::ZeroMinStake(name("free")));
        assert!(registry.is_empty());

        registry
            .apply(
                &id("O"),
                Transition::CreateRepository {
                    name: name("free"),
                    min_stake: Some(Amount::new(1)),
                },
                &env,
            )
            .unwrap();
        assert_eq!(registry.repository(&name("free")).unwrap().stake().minimum(), Amount::new(1));
    }

    #[test]
    fn duplicate_name_keeps_first_owner() {
        let mut registry = Registry::new();
        create(&mut registry, "n", "first");

        let err = registry
            .create_repository(name("n"), &id("second"), DEFAULT_MIN_STAKE)
            .unwrap_err();

        assert_eq!(err, TransitionError::DuplicateName(name("n")));
        assert_eq!(registry.repository(&name("n")).unwrap().owner(), &id("first"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_repository_everywhere() {
        let mut registry = Registry::new();
        let ghost = name("ghost");
        assert!(matches!(
            registry.set_visibility(&ghost, &id("o"), true),
            Err(TransitionError::UnknownRepository(_))
        ));
        assert!(matches!(
            registry.branches(&ghost),
            Err(TransitionError::UnknownRepository(_))
        ));
        assert!(matches!(
            registry.is_collaborator(&ghost, &id("o")),
            Err(TransitionError::UnknownRepository(_))
        ));
    }

    #[test]
    fn public_listing_uses_registration_order() {
        let mut registry = Registry::new();
        for repo in ["zeta", "alpha", "mid", "hidden"] {
            create(&mut registry, repo, "o");
        }
        for repo in ["zeta", "alpha", "mid"] {
            registry.set_visibility(&name(repo), &id("o"), true).unwrap();
        }

        assert_eq!(
            registry.list_public_repositories(),
            vec![name("zeta"), name("alpha"), name("mid")]
        );
    }

    #[test]
    fn visibility_can_be_revoked() {
        let mut registry = Registry::new();
        create(&mut registry, "r", "o");
        registry.set_visibility(&name("r"), &id("o"), true).unwrap();
        registry.set_visibility(&name("r"), &id("o"), false).unwrap();
        assert!(registry.list_public_repositories().is_empty());
    }

    #[test]
    fn repositories_for_identity_include_owned_and_joined() {
        let mut registry = Registry::new();
        let transfer = MockTransfer::new();
        create(&mut registry, "mine", "me");
        create(&mut registry, "theirs", "them");
        create(&mut registry, "other", "them");
        registry
            .add_collaborator(&name("theirs"), &id("me"), DEFAULT_MIN_STAKE, &transfer)
            .unwrap();

        assert_eq!(
            registry.list_repositories_for(&id("me")),
            vec![name("mine"), name("theirs")]
        );
    }

    #[test]
    fn get_commit_resolves_across_branches() {
        let mut registry = Registry::new();
        create(&mut registry, "r", "o");
        let repo = name("r");
        let feature = BranchName::new("feature").unwrap();
        registry.create_branch(&repo, &id("o"), feature.clone()).unwrap();
        registry
            .commit(&repo, &id("o"), &feature, "m1".into(), ContentRef::new("ref1"))
            .unwrap();

        let commit = registry.get_commit(&repo, CommitId::new(1)).unwrap();
        assert_eq!(commit.message, "m1");
        assert_eq!(commit.content, ContentRef::new("ref1"));
        assert!(matches!(
            registry.get_commit(&repo, CommitId::new(2)),
            Err(TransitionError::UnknownCommit { .. })
        ));
        assert!(matches!(
            registry.get_commit_on(&repo, &BranchName::main(), CommitId::new(1)),
            Err(TransitionError::UnknownCommit { .. })
        ));
    }

    #[test]
    fn rejected_transitions_keep_fingerprint() {
        let transfer = MockTransfer::new();
        let env = TransitionEnv::new(&transfer, DEFAULT_MIN_STAKE);
        let mut registry = Registry::new();
        create(&mut registry, "r", "o");
        let before = registry.fingerprint().unwrap();

        let rejected = [
            Transition::CreateRepository {
                name: name("r"),
                min_stake: None,
            },
            Transition::SetVisibility {
                repo: name("r"),
                public: true,
            },
            Transition::CreateBranch {
                repo: name("r"),
                branch: BranchName::new("x").unwrap(),
            },
            Transition::AddCollaborator {
                repo: name("r"),
                stake: Amount::new(1),
            },
            Transition::ApprovePullRequest {
                repo: name("r"),
                id: PullRequestId::new(1),
            },
        ];
        for transition in rejected {
            assert!(registry.apply(&id("stranger"), transition, &env).is_err());
        }

        assert_eq!(registry.fingerprint().unwrap(), before);
    }

    #[test]
    fn apply_create_uses_env_default_stake() {
        let transfer = MockTransfer::new();
        let env = TransitionEnv::new(&transfer, Amount::new(42));
        let mut registry = Registry::new();
        registry
            .apply(
                &id("o"),
                Transition::CreateRepository {
                    name: name("a"),
                    min_stake: None,
                },
                &env,
            )
            .unwrap();
        registry
            .apply(
                &id("o"),
                Transition::CreateRepository {
                    name: name("b"),
                    min_stake: Some(Amount::new(7)),
                },
                &env,
            )
            .unwrap();

        assert_eq!(
            registry.repository(&name("a")).unwrap().stake().minimum(),
            Amount::new(42)
        );
        assert_eq!(
            registry.repository(&name("b")).unwrap().stake().minimum(),
            Amount::new(7)
        );
    }

    #[test]
    fn serde_roundtrip_preserves_fingerprint() {
        let mut registry = Registry::new();
        create(&mut registry, "b", "o");
        create(&mut registry, "a", "o");
        let json = serde_json::to_string(&registry).unwrap();
        let restored: Registry = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, registry);
        assert_eq!(restored.fingerprint().unwrap(), registry.fingerprint().unwrap());
        assert_eq!(
            restored.iter().map(|r| r.name().clone()).collect::<Vec<_>>(),
            vec![name("b"), name("a")]
        );
    }
}
