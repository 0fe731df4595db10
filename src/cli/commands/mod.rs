//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Converts raw arguments into validated core types
//! 2. Reads the snapshot, or submits a transition through a [`Session`]
//! 3. Formats and displays output
//!
//! Handlers do NOT mutate the registry directly.

mod branch;
mod clone;
mod commit;
mod completion;
mod join;
mod log_cmd;
mod pr;
mod repo;

pub use branch::{branch, branches, head, history, show};
pub use clone::clone;
pub use commit::commit;
pub use completion::completion;
pub use join::join;
pub use log_cmd::log;
pub use pr::{pr_approve, pr_list, pr_open};
pub use repo::{info, init_repo, list, visibility};

use anyhow::{anyhow, Context as _, Result};

use super::args::{Command, PrAction};
use crate::core::access::{self, Permission};
use crate::core::config::Config;
use crate::core::paths::StatePaths;
use crate::core::registry::Registry;
use crate::core::repository::Repository;
use crate::core::transition::Transition;
use crate::core::types::{BranchName, Identity, RepoName};
use crate::engine::{Context, Receipt, Session, StateStore};
use crate::substrate::{ConfiguredIdentity, IdentitySource, LocalTransfer};
use crate::ui::output::{self, Verbosity};

/// Everything a handler needs besides its own arguments.
pub struct Env<'a> {
    pub ctx: &'a Context,
    pub paths: &'a StatePaths,
    pub config: &'a Config,
}

impl Env<'_> {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.ctx.quiet, self.ctx.debug)
    }

    /// Resolve the caller from `--as`, the environment, or config.
    pub fn caller(&self) -> Result<Identity> {
        let source = ConfiguredIdentity::new(
            self.ctx.identity.clone(),
            self.config.identity().map(str::to_string),
        );
        Ok(source.current()?)
    }

    /// Load the current snapshot without taking the write lock.
    pub fn load(&self) -> Result<Registry> {
        StateStore::new(self.paths)
            .load()
            .context("failed to load state")
    }

    /// Submit one transition as the resolved caller and report it.
    pub fn mutate(&self, transition: Transition) -> Result<Receipt> {
        let caller = self.caller()?;
        let mut session = Session::open(
            self.paths,
            LocalTransfer::new(),
            self.config.default_min_stake(),
        )
        .context("failed to open state")?;
        let outcome = session.submit(&caller, transition);
        session.close().context("failed to release state lock")?;
        let receipt = outcome?;
        output::success(&receipt.applied, self.verbosity());
        Ok(receipt)
    }

    /// Load the snapshot and check that the caller may see `repo`.
    pub fn visible<'r>(&self, registry: &'r Registry, repo: &RepoName) -> Result<&'r Repository> {
        let caller = self.caller()?;
        let repository = registry.repository(repo)?;
        access::require(repository, &caller, Permission::Read)?;
        Ok(repository)
    }
}

pub(crate) fn repo_name(raw: String) -> Result<RepoName> {
    RepoName::new(raw).map_err(|e| anyhow!("invalid repository name: {e}"))
}

pub(crate) fn branch_name(raw: String) -> Result<BranchName> {
    BranchName::new(raw).map_err(|e| anyhow!("invalid branch name: {e}"))
}

/// Dispatch a parsed command to its handler.
pub fn dispatch(
    command: Command,
    ctx: &Context,
    paths: &StatePaths,
    config: &Config,
) -> Result<()> {
    let env = Env { ctx, paths, config };

    match command {
        Command::InitRepo { name, min_stake } => init_repo(&env, name, min_stake),
        Command::Visibility { repo, visibility: v } => visibility(&env, repo, v.is_public()),
        Command::Info { repo } => info(&env, repo),
        Command::List { public } => list(&env, public),
        Command::Branch { repo, name } => branch(&env, repo, name),
        Command::Branches { repo } => branches(&env, repo),
        Command::Commit {
            repo,
            branch,
            message,
            reference,
            path,
        } => commit(&env, repo, branch, message, reference, path),
        Command::Head { repo, branch } => head(&env, repo, branch),
        Command::Show { repo, id, branch } => show(&env, repo, id, branch),
        Command::History { repo, branch } => history(&env, repo, branch),
        Command::Join { repo, stake } => join(&env, repo, stake),
        Command::Pr { action } => match action {
            PrAction::Open {
                repo,
                from,
                to,
                commit,
            } => pr_open(&env, repo, from, to, commit),
            PrAction::Approve { repo, id } => pr_approve(&env, repo, id),
            PrAction::List { repo } => pr_list(&env, repo),
        },
        Command::Clone { repo, dest, branch } => clone(&env, repo, dest, branch),
        Command::Log { limit, repo } => log(&env, limit, repo),
        Command::Completion { shell } => completion(shell),
    }
}
