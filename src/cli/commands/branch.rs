//! Branch and commit-log commands: branch, branches, head, show, history
//!
//! Read commands load the snapshot without locking and enforce the same
//! visibility rule as `info`.

use anyhow::Result;

use super::{branch_name, repo_name, Env};
use crate::core::transition::Transition;
use crate::core::types::CommitId;
use crate::ui::output;

pub fn branch(env: &Env<'_>, repo: String, name: String) -> Result<()> {
    env.mutate(Transition::CreateBranch {
        repo: repo_name(repo)?,
        branch: branch_name(name)?,
    })?;
    Ok(())
}

pub fn branches(env: &Env<'_>, repo: String) -> Result<()> {
    let repo = repo_name(repo)?;
    let registry = env.load()?;
    env.visible(&registry, &repo)?;
    let names = registry.branches(&repo)?;
    output::data(output::format_list(&names, ""));
    Ok(())
}

/// Print the head commit id and content reference of a branch.
///
/// An empty branch prints `-` and an empty reference.
pub fn head(env: &Env<'_>, repo: String, branch: String) -> Result<()> {
    let repo = repo_name(repo)?;
    let branch = branch_name(branch)?;
    let registry = env.load()?;
    env.visible(&registry, &repo)?;

    match registry.latest_commit_id(&repo, &branch)? {
        Some(id) => {
            let content = registry.latest_content_ref(&repo, &branch)?;
            output::data(format!("{}\t{}", id, content));
        }
        None => output::data("-\t"),
    }
    Ok(())
}

pub fn show(env: &Env<'_>, repo: String, id: u64, branch: Option<String>) -> Result<()> {
    let repo = repo_name(repo)?;
    let registry = env.load()?;
    env.visible(&registry, &repo)?;

    let commit = match branch {
        Some(branch) => registry.get_commit_on(&repo, &branch_name(branch)?, CommitId::new(id))?,
        None => registry.get_commit(&repo, CommitId::new(id))?,
    };
    output::data(output::format_commit_detail(&commit));
    Ok(())
}

pub fn history(env: &Env<'_>, repo: String, branch: String) -> Result<()> {
    let repo = repo_name(repo)?;
    let branch = branch_name(branch)?;
    let registry = env.load()?;
    env.visible(&registry, &repo)?;

    let commits = registry.branch_history(&repo, &branch)?;
    if commits.is_empty() {
        output::print(format!("(no commits on '{}')", branch), env.verbosity());
    }
    for commit in &commits {
        output::data(output::format_commit(commit));
    }
    Ok(())
}
