//! core::branch
//!
//! Per-repository branch store and append-only commit log.
//!
//! # Invariants
//!
//! - Branch names are unique within a store and never change
//! - Branches are never removed; `names()` is creation order
//! - Commit ids on a branch are 1, 2, 3, ... with no gaps
//! - Commits are immutable; the only history mutation is [`BranchStore::append`]
//!
//! Commit ids are scoped per branch rather than being content hashes: the
//! content itself is addressed externally through [`ContentRef`], and the
//! log only needs a total order within a branch to define head and history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{BranchName, CommitId, ContentRef, Identity};

/// An immutable commit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub content: ContentRef,
    pub author: Identity,
    /// Head of the branch at commit time.
    pub parent: Option<CommitId>,
}

/// A named, append-only commit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    name: BranchName,
    commits: Vec<Commit>,
}

impl Branch {
    fn new(name: BranchName) -> Self {
        Self {
            name,
            commits: Vec::new(),
        }
    }

    pub fn name(&self) -> &BranchName {
        &self.name
    }

    /// Id of the most recent commit, or `None` for an empty branch.
    pub fn head(&self) -> Option<CommitId> {
        self.commits.last().map(|c| c.id)
    }

    /// Most recent commit.
    pub fn head_commit(&self) -> Option<&Commit> {
        self.commits.last()
    }

    /// All commits, oldest first.
    pub fn history(&self) -> &[Commit] {
        &self.commits
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Look up a commit by id on this branch.
    pub fn commit(&self, id: CommitId) -> Option<&Commit> {
        id.index().and_then(|i| self.commits.get(i))
    }

    /// Whether `id` names a commit on this branch.
    pub fn contains(&self, id: CommitId) -> bool {
        self.commit(id).is_some()
    }
}

/// Branches of one repository.
///
/// Also keeps a repository-wide index from commit id to the branch that
/// most recently produced a commit with that id, which backs the
/// branch-less `get_commit` lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStore {
    branches: Vec<Branch>,
    latest_by_id: BTreeMap<CommitId, BranchName>,
}

impl BranchStore {
    /// A store holding only an empty `main` branch.
    pub fn with_main() -> Self {
        Self {
            branches: vec![Branch::new(BranchName::main())],
            latest_by_id: BTreeMap::new(),
        }
    }

    /// Branch names in creation order.
    pub fn names(&self) -> Vec<BranchName> {
        self.branches.iter().map(|b| b.name.clone()).collect()
    }

    pub fn get(&self, name: &BranchName) -> Option<&Branch> {
        self.branches.iter().find(|b| &b.name == name)
    }

    pub fn contains(&self, name: &BranchName) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter()
    }

    /// Add an empty branch.
    ///
    /// Returns `false` without changing anything if the name is taken.
    pub fn create(&mut self, name: BranchName) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.branches.push(Branch::new(name));
        true
    }

    /// Append a commit to `branch`, returning its id.
    ///
    /// Returns `None` without changing anything if the branch does not exist.
    pub fn append(
        &mut self,
        branch: &BranchName,
        message: String,
        content: ContentRef,
        author: Identity,
    ) -> Option<CommitId> {
        let target = self.branches.iter_mut().find(|b| &b.name == branch)?;
        let id = CommitId::following(target.commits.len());
        target.commits.push(Commit {
            id,
            message,
            content,
            author,
            parent: target.head(),
        });
        self.latest_by_id.insert(id, branch.clone());
        Some(id)
    }

    /// Most recent commit carrying `id` on any branch.
    pub fn latest_with_id(&self, id: CommitId) -> Option<&Commit> {
        let branch = self.latest_by_id.get(&id)?;
        self.get(branch)?.commit(id)
    }
}
