//! clone command - Materialize a branch head from the content store

use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};

use super::{branch_name, repo_name, Env};
use crate::substrate::{ContentStore, LocalContentStore};
use crate::ui::output;

pub fn clone(env: &Env<'_>, repo: String, dest: PathBuf, branch: String) -> Result<()> {
    let repo = repo_name(repo)?;
    let branch = branch_name(branch)?;
    let registry = env.load()?;
    env.visible(&registry, &repo)?;

    if registry.latest_commit_id(&repo, &branch)?.is_none() {
        return Err(anyhow!("branch '{}' of '{}' has no commits", branch, repo));
    }
    let content = registry.latest_content_ref(&repo, &branch)?;

    let store = LocalContentStore::new(env.config.content_dir(env.paths));
    store
        .fetch(&content, &dest)
        .with_context(|| format!("failed to materialize {} into '{}'", content, dest.display()))?;

    output::success(
        format!("cloned {}@{} ({}) into {}", repo, branch, content, dest.display()),
        env.verbosity(),
    );
    Ok(())
}
