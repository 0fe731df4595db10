//! pr command - Open, approve and list pull requests

use anyhow::Result;

use super::{branch_name, repo_name, Env};
use crate::core::transition::Transition;
use crate::core::types::{CommitId, PullRequestId};
use crate::ui::output;

pub fn pr_open(env: &Env<'_>, repo: String, from: String, to: String, commit: u64) -> Result<()> {
    env.mutate(Transition::CreatePullRequest {
        repo: repo_name(repo)?,
        from: branch_name(from)?,
        to: branch_name(to)?,
        commit: CommitId::new(commit),
    })?;
    Ok(())
}

/// Approve a pending pull request. Branch heads are left unchanged.
pub fn pr_approve(env: &Env<'_>, repo: String, id: u64) -> Result<()> {
    env.mutate(Transition::ApprovePullRequest {
        repo: repo_name(repo)?,
        id: PullRequestId::new(id),
    })?;
    Ok(())
}

pub fn pr_list(env: &Env<'_>, repo: String) -> Result<()> {
    let repo = repo_name(repo)?;
    let registry = env.load()?;
    env.visible(&registry, &repo)?;

    let pulls = registry.pull_requests(&repo)?;
    if pulls.is_empty() {
        output::print("(no pull requests)", env.verbosity());
    }
    for pr in &pulls {
        output::data(output::format_pull_request(pr));
    }
    Ok(())
}
