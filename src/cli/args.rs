//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--state <path>`: Use this state directory
//! - `--as <identity>`: Act as this identity
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// codechain - Access-controlled version-control ledger
#[derive(Parser, Debug)]
#[command(name = "codechain")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// State directory (default: $CODECHAIN_HOME or ~/.codechain)
    #[arg(long, global = true, value_name = "DIR")]
    pub state: Option<PathBuf>,

    /// Caller identity (default: $CODECHAIN_IDENTITY or config `identity`)
    #[arg(long = "as", global = true, value_name = "IDENTITY")]
    pub identity: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new private repository owned by the caller
    #[command(
        name = "init-repo",
        after_help = "\
WORKFLOW EXAMPLES:
    # Create a repository with the default minimum stake
    codechain --as alice init-repo website

    # Require 5 tokens from prospective collaborators
    codechain --as alice init-repo website --min-stake 5_000_000_000_000_000_000"
    )]
    InitRepo {
        /// Repository name
        name: String,

        /// Minimum stake in base units (default: store config or one token)
        #[arg(long, value_name = "AMOUNT")]
        min_stake: Option<String>,
    },

    /// Make a repository public or private (owner only)
    Visibility {
        /// Repository name
        repo: String,

        /// New visibility
        #[arg(value_enum)]
        visibility: VisibilityArg,
    },

    /// Show repository details
    Info {
        /// Repository name
        repo: String,
    },

    /// List repositories
    #[command(
        after_help = "\
By default lists repositories where the caller is owner or collaborator.
With --public, lists every public repository instead."
    )]
    List {
        /// List public repositories instead of your own
        #[arg(long)]
        public: bool,
    },

    /// Create a branch
    Branch {
        /// Repository name
        repo: String,

        /// New branch name
        name: String,
    },

    /// List branches in creation order
    Branches {
        /// Repository name
        repo: String,
    },

    /// Append a commit to a branch
    #[command(
        after_help = "\
WORKFLOW EXAMPLES:
    # Commit a content reference you already have
    codechain commit website -m \"initial\" --ref Qm123

    # Store a directory in the local content store and commit it
    codechain commit website -b feature -m \"add page\" --path ./site"
    )]
    Commit {
        /// Repository name
        repo: String,

        /// Branch to commit to
        #[arg(short, long, default_value = "main")]
        branch: String,

        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Existing content reference
        #[arg(long = "ref", value_name = "REF", conflicts_with = "path", required_unless_present = "path")]
        reference: Option<String>,

        /// Directory to store and reference
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,
    },

    /// Show the head commit of a branch
    Head {
        /// Repository name
        repo: String,

        /// Branch name
        #[arg(short, long, default_value = "main")]
        branch: String,
    },

    /// Show one commit
    Show {
        /// Repository name
        repo: String,

        /// Commit id
        id: u64,

        /// Look the id up on this branch only
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// List all commits on a branch, oldest first
    History {
        /// Repository name
        repo: String,

        /// Branch name
        #[arg(short, long, default_value = "main")]
        branch: String,
    },

    /// Join a repository as collaborator by staking value with the owner
    Join {
        /// Repository name
        repo: String,

        /// Stake in base units
        #[arg(long, value_name = "AMOUNT")]
        stake: String,
    },

    /// Pull request operations
    Pr {
        #[command(subcommand)]
        action: PrAction,
    },

    /// Materialize a branch head into a directory
    Clone {
        /// Repository name
        repo: String,

        /// Destination directory
        dest: PathBuf,

        /// Branch to clone
        #[arg(short, long, default_value = "main")]
        branch: String,
    },

    /// Show recent ledger events
    Log {
        /// Number of events to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Only events for this repository
        #[arg(long)]
        repo: Option<String>,
    },

    /// Generate shell completion scripts
    #[command(
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    codechain completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    codechain completion zsh >> ~/.zshrc"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Pull request subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PrAction {
    /// Open a pull request
    Open {
        /// Repository name
        repo: String,

        /// Source branch
        #[arg(long)]
        from: String,

        /// Target branch
        #[arg(long, default_value = "main")]
        to: String,

        /// Commit id on the source branch
        #[arg(long)]
        commit: u64,
    },
    /// Approve a pull request (owner only)
    Approve {
        /// Repository name
        repo: String,

        /// Pull request id
        id: u64,
    },
    /// List pull requests
    List {
        /// Repository name
        repo: String,
    },
}

/// Repository visibility argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityArg {
    Public,
    Private,
}

impl VisibilityArg {
    pub fn is_public(self) -> bool {
        self == VisibilityArg::Public
    }
}

/// Supported shells for completion
#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "codechain", "info", "repo1", "--as", "alice", "--state", "/tmp/s", "-q",
        ])
        .unwrap();
        assert_eq!(cli.identity.as_deref(), Some("alice"));
        assert_eq!(cli.state, Some(PathBuf::from("/tmp/s")));
        assert!(cli.quiet);
    }

    #[test]
    fn commit_requires_ref_or_path() {
        assert!(Cli::try_parse_from(["codechain", "commit", "r", "-m", "x"]).is_err());
        assert!(Cli::try_parse_from([
            "codechain", "commit", "r", "-m", "x", "--ref", "a", "--path", "/tmp"
        ])
        .is_err());
        let cli =
            Cli::try_parse_from(["codechain", "commit", "r", "-m", "x", "--ref", "Qm1"]).unwrap();
        match cli.command {
            Command::Commit {
                branch, reference, ..
            } => {
                assert_eq!(branch, "main");
                assert_eq!(reference.as_deref(), Some("Qm1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn pr_open_defaults_to_main() {
        let cli = Cli::try_parse_from([
            "codechain", "pr", "open", "r", "--from", "feature", "--commit", "1",
        ])
        .unwrap();
        match cli.command {
            Command::Pr {
                action: PrAction::Open { to, commit, .. },
            } => {
                assert_eq!(to, "main");
                assert_eq!(commit, 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
