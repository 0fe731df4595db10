//! Repository commands: init-repo, visibility, info, list

use anyhow::{anyhow, Result};

use super::{repo_name, Env};
use crate::core::transition::Transition;
use crate::core::types::Amount;
use crate::ui::output;

pub(crate) fn parse_amount(raw: &str) -> Result<Amount> {
    raw.parse::<Amount>()
        .map_err(|e| anyhow!("invalid amount: {e}"))
}

/// Register a new private repository owned by the caller.
pub fn init_repo(env: &Env<'_>, name: String, min_stake: Option<String>) -> Result<()> {
    let min_stake = min_stake.as_deref().map(parse_amount).transpose()?;
    env.mutate(Transition::CreateRepository {
        name: repo_name(name)?,
        min_stake,
    })?;
    Ok(())
}

pub fn visibility(env: &Env<'_>, repo: String, public: bool) -> Result<()> {
    env.mutate(Transition::SetVisibility {
        repo: repo_name(repo)?,
        public,
    })?;
    Ok(())
}

/// Show repository details to anyone allowed to see the repository.
pub fn info(env: &Env<'_>, repo: String) -> Result<()> {
    let repo = repo_name(repo)?;
    let caller = env.caller()?;
    let registry = env.load()?;
    let info = registry.repository_info(&repo, &caller)?;
    output::data(output::format_info(&info));
    Ok(())
}

/// List the caller's repositories, or all public ones.
pub fn list(env: &Env<'_>, public: bool) -> Result<()> {
    let registry = env.load()?;
    let names = if public {
        registry.list_public_repositories()
    } else {
        registry.list_repositories_for(&env.caller()?)
    };

    if names.is_empty() {
        output::print("(no repositories)", env.verbosity());
    } else {
        output::data(output::format_list(&names, ""));
    }
    Ok(())
}
