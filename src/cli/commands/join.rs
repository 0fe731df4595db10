//! join command - Stake value with the owner to become a collaborator

use anyhow::Result;

use super::repo::parse_amount;
use super::{repo_name, Env};
use crate::core::transition::Transition;

pub fn join(env: &Env<'_>, repo: String, stake: String) -> Result<()> {
    env.mutate(Transition::AddCollaborator {
        repo: repo_name(repo)?,
        stake: parse_amount(&stake)?,
    })?;
    Ok(())
}
