//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Status messages respect the quiet flag. Query results (ids, content
//! references, listings) are always printed so scripts can read them.

use std::fmt::Display;

use crate::core::branch::Commit;
use crate::core::pull::PullRequest;
use crate::core::repository::RepositoryInfo;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a query result (always shown).
pub fn data(message: impl Display) {
    println!("{}", message);
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line commit summary: `<id> <content> <author> <message>`.
pub fn format_commit(commit: &Commit) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        commit.id, commit.content, commit.author, commit.message
    )
}

/// Multi-line commit detail.
pub fn format_commit_detail(commit: &Commit) -> String {
    let parent = commit
        .parent
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "commit   {}\nparent   {}\nauthor   {}\ncontent  {}\n\n    {}",
        commit.id, parent, commit.author, commit.content, commit.message
    )
}

/// One-line pull request summary.
pub fn format_pull_request(pr: &PullRequest) -> String {
    let mut line = format!(
        "#{}\t{} -> {}\tcommit {}\t{}\t{}",
        pr.id, pr.from, pr.to, pr.commit, pr.author, pr.status
    );
    if let Some(approver) = &pr.approver {
        line.push_str(&format!(" by {}", approver));
    }
    line
}

/// Repository detail block.
pub fn format_info(info: &RepositoryInfo) -> String {
    let collaborators = if info.collaborators.is_empty() {
        "(none)".to_string()
    } else {
        info.collaborators
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let branches = info
        .branches
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "name:          {}\nowner:         {}\nvisibility:    {}\nmin stake:     {}\nbranches:      {}\ncollaborators: {}",
        info.name, info.owner, info.visibility, info.min_stake, branches, collaborators
    )
}
