//! commit command - Append a commit to a branch
//!
//! The content is either an existing reference (`--ref`) or a directory
//! stored in the local content store first (`--path`).

use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};
use tracing::debug;

use super::{branch_name, repo_name, Env};
use crate::core::transition::Transition;
use crate::core::types::ContentRef;
use crate::substrate::{ContentStore, LocalContentStore};

pub fn commit(
    env: &Env<'_>,
    repo: String,
    branch: String,
    message: String,
    reference: Option<String>,
    path: Option<PathBuf>,
) -> Result<()> {
    let repo = repo_name(repo)?;
    let branch = branch_name(branch)?;

    let content = match (reference, path) {
        (Some(reference), _) => ContentRef::new(reference),
        (None, Some(dir)) => {
            let store = LocalContentStore::new(env.config.content_dir(env.paths));
            let content = store
                .put(&dir)
                .with_context(|| format!("failed to store '{}'", dir.display()))?;
            debug!(%content, dir = %dir.display(), "stored content");
            content
        }
        (None, None) => return Err(anyhow!("either --ref or --path is required")),
    };

    env.mutate(Transition::Commit {
        repo,
        branch,
        message,
        content,
    })?;
    Ok(())
}
