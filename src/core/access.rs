//! core::access
//!
//! Role-based access control for repository operations.
//!
//! # Roles
//!
//! In precedence order for writes:
//!
//! - **Owner**: full rights
//! - **Collaborator**: create branches, commit, open pull requests
//! - **Non-member**: no write rights; read only when the repository is public
//!
//! Visibility only ever affects the read path. A collaborator of a private
//! repository keeps write access regardless of the visibility flag.
//!
//! # Example
//!
//! ```
//! use codechain::core::access::{allows, Permission, Role};
//! use codechain::core::types::Visibility;
//!
//! assert!(allows(Role::Collaborator, Visibility::Private, Permission::Commit));
//! assert!(!allows(Role::NonMember, Visibility::Private, Permission::Read));
//! assert!(allows(Role::NonMember, Visibility::Public, Permission::Read));
//! assert!(!allows(Role::Collaborator, Visibility::Public, Permission::ApprovePullRequest));
//! ```

use super::error::TransitionError;
use super::repository::Repository;
use super::types::{Identity, Visibility};

/// Relationship of an identity to a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    NonMember,
    Collaborator,
    Owner,
}

impl Role {
    /// Whether this role carries write membership.
    pub fn is_member(self) -> bool {
        self >= Role::Collaborator
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Collaborator => write!(f, "collaborator"),
            Role::NonMember => write!(f, "non-member"),
        }
    }
}

/// Operations subject to access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Restricted read of repository details.
    Read,
    CreateBranch,
    Commit,
    OpenPullRequest,
    ApprovePullRequest,
    SetVisibility,
}

impl Permission {
    /// Verb phrase used in rejection messages.
    pub fn action(self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::CreateBranch => "create branches",
            Permission::Commit => "commit",
            Permission::OpenPullRequest => "open pull requests",
            Permission::ApprovePullRequest => "approve pull requests",
            Permission::SetVisibility => "change visibility",
        }
    }
}

/// Pure access predicate.
pub fn allows(role: Role, visibility: Visibility, permission: Permission) -> bool {
    match permission {
        Permission::Read => role.is_member() || visibility.is_public(),
        Permission::CreateBranch | Permission::Commit | Permission::OpenPullRequest => {
            role.is_member()
        }
        Permission::ApprovePullRequest | Permission::SetVisibility => role == Role::Owner,
    }
}

/// Check `caller` against `repo`, mapping a denial to the rejection the
/// operation reports.
pub fn require(
    repo: &Repository,
    caller: &Identity,
    permission: Permission,
) -> Result<(), TransitionError> {
    if allows(repo.role_of(caller), repo.visibility(), permission) {
        return Ok(());
    }

    let err = match permission {
        Permission::Read => TransitionError::NotVisible {
            repo: repo.name().clone(),
            caller: caller.clone(),
        },
        Permission::SetVisibility => TransitionError::NotOwner {
            repo: repo.name().clone(),
            caller: caller.clone(),
        },
        _ => TransitionError::NotAuthorized {
            repo: repo.name().clone(),
            caller: caller.clone(),
            action: permission.action(),
        },
    };
    Err(err)
}
