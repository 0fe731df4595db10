//! codechain - An access-controlled version-control ledger
//!
//! codechain keeps a registry of repositories, each with an owner, a
//! visibility flag, collaborators admitted by staking value with the
//! owner, branches holding append-only commit logs, and a pull-request
//! approval workflow. Every change is a [`core::transition::Transition`]
//! applied by one serialized executor.
//!
//! # Architecture
//!
//! - [`core`] - Domain types, access rules, registry and transitions
//! - [`engine`] - Single-writer executor, sequencer, snapshots and ledger
//! - [`substrate`] - Value transfer, content storage and identity capabilities
//! - [`cli`] - Command-line interface layer
//! - [`logging`] - Subscriber setup for `tracing`
//! - [`ui`] - Terminal output helpers
//!
//! # Correctness Invariants
//!
//! 1. A transition is validated completely before anything changes
//! 2. A rejected transition leaves the registry fingerprint unchanged
//! 3. Commit ids on a branch are 1, 2, 3, ... in append order
//! 4. A failed value transfer never adds a collaborator

pub mod cli;
pub mod core;
pub mod engine;
pub mod logging;
pub mod substrate;
pub mod ui;
