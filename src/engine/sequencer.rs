//! engine::sequencer
//!
//! Explicit command queue in front of an [`Engine`].
//!
//! # Architecture
//!
//! A single tokio task owns the engine handle and drains an mpsc queue in
//! arrival order. Each request carries a oneshot channel for its reply.
//! Submitters can be spread across many tasks; the engine still sees one
//! transition at a time, in the order the queue received them.
//!
//! # Example
//!
//! ```
//! # tokio_test::block_on(async {
//! use std::sync::Arc;
//! use codechain::core::transition::Transition;
//! use codechain::core::types::{Amount, Identity, RepoName};
//! use codechain::engine::{Engine, Sequencer};
//! use codechain::substrate::MockTransfer;
//!
//! let engine = Arc::new(Engine::new(MockTransfer::new(), Amount::new(1)));
//! let sequencer = Sequencer::spawn(Arc::clone(&engine), 16);
//! let handle = sequencer.handle();
//!
//! let receipt = handle
//!     .submit(
//!         Identity::new("O").unwrap(),
//!         Transition::CreateRepository { name: RepoName::new("r").unwrap(), min_stake: None },
//!     )
//!     .await
//!     .unwrap();
//! assert_eq!(receipt.seq, 1);
//!
//! drop(handle);
//! sequencer.shutdown().await.unwrap();
//! # });
//! ```

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::executor::{Engine, Receipt};
use crate::core::error::TransitionError;
use crate::core::transition::Transition;
use crate::core::types::Identity;
use crate::substrate::ValueTransfer;

/// Errors from the sequencer.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// The transition was rejected by the engine.
    #[error("rejected")]
    Rejected(#[from] TransitionError),

    /// The executor task is gone.
    #[error("sequencer is closed")]
    Closed,

    /// The executor task panicked.
    #[error("sequencer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

struct Request {
    caller: Identity,
    transition: Transition,
    reply: oneshot::Sender<Result<Receipt, TransitionError>>,
}

/// Cloneable submission side of a [`Sequencer`].
#[derive(Clone)]
pub struct SequencerHandle {
    tx: mpsc::Sender<Request>,
}

impl SequencerHandle {
    /// Enqueue a transition and wait for its outcome.
    pub async fn submit(
        &self,
        caller: Identity,
        transition: Transition,
    ) -> Result<Receipt, SequencerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request {
                caller,
                transition,
                reply,
            })
            .await
            .map_err(|_| SequencerError::Closed)?;
        Ok(rx.await.map_err(|_| SequencerError::Closed)??)
    }
}

/// Single-writer executor task.
pub struct Sequencer {
    handle: SequencerHandle,
    task: JoinHandle<u64>,
}

impl Sequencer {
    /// Spawn the executor task on the current tokio runtime.
    ///
    /// `capacity` bounds the queue; submitters wait when it is full.
    pub fn spawn<T>(engine: Arc<Engine<T>>, capacity: usize) -> Self
    where
        T: ValueTransfer + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Request>(capacity.max(1));

        let task = tokio::spawn(async move {
            let mut processed = 0u64;
            while let Some(request) = rx.recv().await {
                let outcome = engine.submit(&request.caller, request.transition);
                processed += 1;
                if request.reply.send(outcome).is_err() {
                    debug!("submitter went away before reply");
                }
            }
            debug!(processed, "sequencer drained");
            processed
        });

        Self {
            handle: SequencerHandle { tx },
            task,
        }
    }

    pub fn handle(&self) -> SequencerHandle {
        self.handle.clone()
    }

    /// Close the queue and wait for queued requests to drain.
    ///
    /// Returns the number of requests processed. Outstanding
    /// [`SequencerHandle`] clones keep the queue open until dropped.
    pub async fn shutdown(self) -> Result<u64, SequencerError> {
        drop(self.handle);
        Ok(self.task.await?)
    }
}
