//! log command - Show recent ledger events, newest first
//!
//! Events for repositories the caller cannot read are left out. Events
//! naming a repository that does not exist are shown to their own caller
//! only.

use anyhow::{Context as _, Result};

use super::{repo_name, Env};
use crate::core::access::{self, Permission};
use crate::core::registry::Registry;
use crate::core::types::Identity;
use crate::engine::{Event, EventLedger};
use crate::ui::output;

fn readable(registry: &Registry, caller: &Identity, event: &Event) -> bool {
    match event.repo() {
        None => true,
        Some(repo) => match registry.repository(repo) {
            Ok(repository) => access::require(repository, caller, Permission::Read).is_ok(),
            Err(_) => event.caller() == Some(caller),
        },
    }
}

pub fn log(env: &Env<'_>, limit: usize, repo: Option<String>) -> Result<()> {
    let ledger = EventLedger::new(env.paths.ledger_path());
    let caller = env.caller()?;
    let registry = env.load()?;

    let mut events = match repo {
        Some(repo) => {
            let repo = repo_name(repo)?;
            env.visible(&registry, &repo)?;
            ledger
                .events_for_repo(&repo)
                .context("failed to read event ledger")?
        }
        None => ledger.read_all().context("failed to read event ledger")?,
    };
    events.reverse();
    let events: Vec<Event> = events
        .into_iter()
        .filter(|event| readable(&registry, &caller, event))
        .take(limit)
        .collect();

    if events.is_empty() {
        output::print("(no events)", env.verbosity());
    }
    for event in &events {
        output::data(event);
    }
    Ok(())
}
