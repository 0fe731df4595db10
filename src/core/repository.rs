//! core::repository
//!
//! The Repository aggregate: owner, visibility, collaborators, branches,
//! pull requests and stake records.
//!
//! # Invariants
//!
//! - Name and owner never change after creation
//! - A `main` branch exists from the instant of creation
//! - The owner is never listed as a collaborator
//! - Every mutating method checks all of its preconditions before touching
//!   any field, so an `Err` return leaves the aggregate unchanged

use serde::{Deserialize, Serialize};

use super::access::{self, Permission, Role};
use super::branch::{Branch, BranchStore, Commit};
use super::error::TransitionError;
use super::pull::{PullRequest, PullRequestWorkflow};
use super::stake::{StakeLedger, StakeRecord};
use super::types::{
    Amount, BranchName, CommitId, ContentRef, Identity, PullRequestId, RepoName, Visibility,
};

/// A repository and everything it exclusively owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    name: RepoName,
    owner: Identity,
    visibility: Visibility,
    collaborators: Vec<Identity>,
    branches: BranchStore,
    pulls: PullRequestWorkflow,
    stake: StakeLedger,
}

/// Summary returned by `repository_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: RepoName,
    pub owner: Identity,
    pub visibility: Visibility,
    pub branches: Vec<BranchName>,
    pub collaborators: Vec<Identity>,
    pub min_stake: Amount,
}

impl Repository {
    /// A private repository with an empty `main` branch.
    pub fn new(name: RepoName, owner: Identity, min_stake: Amount) -> Self {
        Self {
            name,
            owner,
            visibility: Visibility::Private,
            collaborators: Vec::new(),
            branches: BranchStore::with_main(),
            pulls: PullRequestWorkflow::new(),
            stake: StakeLedger::new(min_stake),
        }
    }

    pub fn name(&self) -> &RepoName {
        &self.name
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Collaborators in join order.
    pub fn collaborators(&self) -> &[Identity] {
        &self.collaborators
    }

    pub fn branches(&self) -> &BranchStore {
        &self.branches
    }

    pub fn pulls(&self) -> &PullRequestWorkflow {
        &self.pulls
    }

    pub fn stake(&self) -> &StakeLedger {
        &self.stake
    }

    pub fn role_of(&self, identity: &Identity) -> Role {
        if identity == &self.owner {
            Role::Owner
        } else if self.collaborators.contains(identity) {
            Role::Collaborator
        } else {
            Role::NonMember
        }
    }

    pub fn is_collaborator(&self, identity: &Identity) -> bool {
        self.role_of(identity) == Role::Collaborator
    }

    /// Whether `identity` may see this repository's details.
    pub fn is_visible_to(&self, identity: &Identity) -> bool {
        access::allows(self.role_of(identity), self.visibility, Permission::Read)
    }

    pub(crate) fn admit(&mut self, identity: Identity) {
        if self.role_of(&identity) == Role::NonMember {
            self.collaborators.push(identity);
        }
    }

    pub(crate) fn admit_with_stake(&mut self, identity: Identity, record: StakeRecord) {
        self.stake.record(record);
        self.admit(identity);
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Owner-only visibility change.
    pub fn set_visibility(
        &mut self,
        caller: &Identity,
        visibility: Visibility,
    ) -> Result<(), TransitionError> {
        access::require(self, caller, Permission::SetVisibility)?;
        self.visibility = visibility;
        Ok(())
    }

    pub fn create_branch(
        &mut self,
        caller: &Identity,
        branch: BranchName,
    ) -> Result<(), TransitionError> {
        access::require(self, caller, Permission::CreateBranch)?;
        if self.branches.contains(&branch) {
            return Err(TransitionError::DuplicateBranch {
                repo: self.name.clone(),
                branch,
            });
        }
        self.branches.create(branch);
        Ok(())
    }

    pub fn commit(
        &mut self,
        caller: &Identity,
        branch: &BranchName,
        message: String,
        content: ContentRef,
    ) -> Result<CommitId, TransitionError> {
        access::require(self, caller, Permission::Commit)?;
        self.branch(branch)?;
        self.branches
            .append(branch, message, content, caller.clone())
            .ok_or_else(|| self.unknown_branch(branch))
    }

    pub fn open_pull_request(
        &mut self,
        caller: &Identity,
        from: BranchName,
        to: BranchName,
        commit: CommitId,
    ) -> Result<PullRequestId, TransitionError> {
        access::require(self, caller, Permission::OpenPullRequest)?;
        let source = self.branch(&from)?;
        self.branch(&to)?;
        if !source.contains(commit) {
            return Err(TransitionError::UnknownCommit {
                repo: self.name.clone(),
                commit,
            });
        }
        Ok(self.pulls.open(from, to, commit, caller.clone()))
    }

    pub fn approve_pull_request(
        &mut self,
        caller: &Identity,
        id: PullRequestId,
    ) -> Result<(), TransitionError> {
        access::require(self, caller, Permission::ApprovePullRequest)?;
        if self.pull_request(id)?.is_approved() {
            return Err(TransitionError::AlreadyApproved {
                repo: self.name.clone(),
                id,
            });
        }
        self.pulls.approve(id, caller.clone());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Details for `caller`, subject to visibility.
    pub fn info(&self, caller: &Identity) -> Result<RepositoryInfo, TransitionError> {
        access::require(self, caller, Permission::Read)?;
        Ok(RepositoryInfo {
            name: self.name.clone(),
            owner: self.owner.clone(),
            visibility: self.visibility,
            branches: self.branches.names(),
            collaborators: self.collaborators.clone(),
            min_stake: self.stake.minimum(),
        })
    }

    pub fn branch(&self, name: &BranchName) -> Result<&Branch, TransitionError> {
        self.branches
            .get(name)
            .ok_or_else(|| self.unknown_branch(name))
    }

    pub fn latest_commit_id(&self, branch: &BranchName) -> Result<Option<CommitId>, TransitionError> {
        Ok(self.branch(branch)?.head())
    }

    /// Content reference of the newest commit on `branch`.
    pub fn latest_content_ref(&self, branch: &BranchName) -> Result<&ContentRef, TransitionError> {
        self.branch(branch)?
            .head_commit()
            .map(|c| &c.content)
            .ok_or_else(|| TransitionError::UnknownCommit {
                repo: self.name.clone(),
                commit: CommitId::new(0),
            })
    }

    /// Most recent commit carrying `id` on any branch.
    pub fn commit_by_id(&self, id: CommitId) -> Result<&Commit, TransitionError> {
        self.branches
            .latest_with_id(id)
            .ok_or_else(|| self.unknown_commit(id))
    }

    /// Commit `id` on exactly `branch`.
    pub fn commit_on(&self, branch: &BranchName, id: CommitId) -> Result<&Commit, TransitionError> {
        self.branch(branch)?
            .commit(id)
            .ok_or_else(|| self.unknown_commit(id))
    }

    pub fn pull_request(&self, id: PullRequestId) -> Result<&PullRequest, TransitionError> {
        self.pulls
            .get(id)
            .ok_or_else(|| TransitionError::UnknownPullRequest {
                repo: self.name.clone(),
                id,
            })
    }

    fn unknown_branch(&self, branch: &BranchName) -> TransitionError {
        TransitionError::UnknownBranch {
            repo: self.name.clone(),
            branch: branch.clone(),
        }
    }

    fn unknown_commit(&self, commit: CommitId) -> TransitionError {
        TransitionError::UnknownCommit {
            repo: self.name.clone(),
            commit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pull::PrStatus;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn branch(s: &str) -> BranchName {
        BranchName::new(s).unwrap()
    }

    fn repo() -> Repository {
        let mut repo = Repository::new(RepoName::new("repo1").unwrap(), id("O"), Amount::new(1));
        repo.admit(id("C"));
        repo
    }

    #[test]
    fn new_repository_is_private_with_main() {
        let repo = repo();
        assert_eq!(repo.visibility(), Visibility::Private);
        assert_eq!(repo.branches().names(), vec![BranchName::main()]);
        assert_eq!(repo.latest_commit_id(&BranchName::main()).unwrap(), None);
    }

    #[test]
    fn admit_never_lists_owner() {
        let mut repo = repo();
        repo.admit(id("O"));
        repo.admit(id("C"));
        assert_eq!(repo.collaborators(), &[id("C")]);
    }

    #[test]
    fn collaborator_creates_branch_and_commits() {
        let mut repo = repo();
        repo.create_branch(&id("C"), branch("feature")).unwrap();
        let commit = repo
            .commit(&id("C"), &branch("feature"), "m1".into(), ContentRef::new("ref1"))
            .unwrap();
        assert_eq!(commit, CommitId::new(1));
        assert_eq!(repo.commit_by_id(commit).unwrap().author, id("C"));
    }

    #[test]
    fn non_member_cannot_write_even_when_public() {
        let mut repo = repo();
        repo.set_visibility(&id("O"), Visibility::Public).unwrap();
        let before = repo.clone();

        let err = repo.create_branch(&id("X"), branch("x")).unwrap_err();
        assert!(matches!(err, TransitionError::NotAuthorized { .. }));
        let err = repo
            .commit(&id("X"), &BranchName::main(), "m".into(), ContentRef::new("r"))
            .unwrap_err();
        assert!(matches!(err, TransitionError::NotAuthorized { .. }));
        assert_eq!(repo, before);
    }

    #[test]
    fn duplicate_branch_rejected() {
        let mut repo = repo();
        let err = repo.create_branch(&id("O"), BranchName::main()).unwrap_err();
        assert!(matches!(err, TransitionError::DuplicateBranch { .. }));
    }

    #[test]
    fn commit_to_unknown_branch_rejected() {
        let mut repo = repo();
        let err = repo
            .commit(&id("O"), &branch("nope"), "m".into(), ContentRef::new("r"))
            .unwrap_err();
        assert!(matches!(err, TransitionError::UnknownBranch { .. }));
    }

    #[test]
    fn pull_request_requires_commit_on_source() {
        let mut repo = repo();
        repo.create_branch(&id("C"), branch("feature")).unwrap();
        repo.commit(&id("C"), &BranchName::main(), "m".into(), ContentRef::new("r"))
            .unwrap();

        let err = repo
            .open_pull_request(&id("C"), branch("feature"), BranchName::main(), CommitId::new(1))
            .unwrap_err();
        assert!(matches!(err, TransitionError::UnknownCommit { .. }));
        assert!(repo.pulls().is_empty());
    }

    #[test]
    fn pull_request_checks_both_branches() {
        let mut repo = repo();
        let err = repo
            .open_pull_request(&id("C"), BranchName::main(), branch("ghost"), CommitId::new(1))
            .unwrap_err();
        assert!(matches!(err, TransitionError::UnknownBranch { branch, .. } if branch == BranchName::new("ghost").unwrap()));
    }

    #[test]
    fn approval_is_owner_only_and_single() {
        let mut repo = repo();
        repo.commit(&id("C"), &BranchName::main(), "m".into(), ContentRef::new("r"))
            .unwrap();
        repo.create_branch(&id("C"), branch("feature")).unwrap();
        let pr = repo
            .open_pull_request(&id("C"), BranchName::main(), branch("feature"), CommitId::new(1))
            .unwrap();

        let err = repo.approve_pull_request(&id("C"), pr).unwrap_err();
        assert!(matches!(err, TransitionError::NotAuthorized { .. }));

        repo.approve_pull_request(&id("O"), pr).unwrap();
        let err = repo.approve_pull_request(&id("O"), pr).unwrap_err();
        assert!(matches!(err, TransitionError::AlreadyApproved { .. }));

        let stored = repo.pull_request(pr).unwrap();
        assert_eq!(stored.status, PrStatus::Approved);
        assert_eq!(stored.approver, Some(id("O")));
    }

    #[test]
    fn approval_does_not_move_heads() {
        let mut repo = repo();
        repo.create_branch(&id("C"), branch("feature")).unwrap();
        repo.commit(&id("C"), &branch("feature"), "m".into(), ContentRef::new("r"))
            .unwrap();
        let pr = repo
            .open_pull_request(&id("C"), branch("feature"), BranchName::main(), CommitId::new(1))
            .unwrap();
        repo.approve_pull_request(&id("O"), pr).unwrap();

        assert_eq!(repo.latest_commit_id(&BranchName::main()).unwrap(), None);
    }

    #[test]
    fn unknown_pull_request() {
        let mut repo = repo();
        let err = repo
            .approve_pull_request(&id("O"), PullRequestId::new(1))
            .unwrap_err();
        assert!(matches!(err, TransitionError::UnknownPullRequest { .. }));
    }

    #[test]
    fn latest_content_ref_on_empty_branch() {
        let repo = repo();
        let err = repo.latest_content_ref(&BranchName::main()).unwrap_err();
        assert!(matches!(err, TransitionError::UnknownCommit { .. }));
    }

    #[test]
    fn info_respects_visibility() {
        let mut repo = repo();
        assert!(repo.info(&id("X")).is_err());
        assert!(repo.info(&id("C")).is_ok());
        repo.set_visibility(&id("O"), Visibility::Public).unwrap();
        let info = repo.info(&id("X")).unwrap();
        assert_eq!(info.owner, id("O"));
        assert_eq!(info.collaborators, vec![id("C")]);
    }
}
