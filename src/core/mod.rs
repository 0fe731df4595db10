//! core
//!
//! Core domain types and the ledger state machine.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Identity, RepoName, BranchName, CommitId, etc.
//! - [`error`] - Transition rejection taxonomy
//! - [`access`] - Role-based access control
//! - [`branch`] - Branch store and append-only commit log
//! - [`stake`] - Stake ledger and the atomic collaborator join
//! - [`pull`] - Pull request workflow
//! - [`repository`] - The Repository aggregate
//! - [`registry`] - Repository registry and transition dispatch
//! - [`transition`] - The named write operations
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for state storage
//! - [`ops`] - State locking
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Transitions validate everything before mutating anything
//! - All state is deterministic and fingerprintable

pub mod access;
pub mod branch;
pub mod config;
pub mod error;
pub mod ops;
pub mod paths;
pub mod pull;
pub mod registry;
pub mod repository;
pub mod stake;
pub mod transition;
pub mod types;
