//! Persistence gateway: ordered, observable grid saves.
//!
//! DESIGN
//! ======
//! Snapshots are queued to a single background worker that performs one
//! `PUT /grid/update` at a time, so saves never interleave. When several
//! snapshots are waiting, only the newest is sent and the older ones are
//! reported as superseded; an older snapshot can therefore never land after
//! a newer one.
//!
//! ERROR HANDLING
//! ==============
//! Every submitted snapshot resolves to exactly one [`SaveOutcome`] on the
//! outcome channel. Failures are reported, never retried here: retry is a
//! user decision made in the session. A panicking [`GridApi`] fails only
//! the save it was sending. If the worker itself is gone, the latest
//! snapshot is reported failed instead of staying unresolved. Dropping the
//! gateway does not cancel queued saves; the worker drains them and exits.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, error, info, warn};

use crate::net::api::{ApiError, GridApi};
use crate::net::types::Grid;

/// Monotonic identifier of a submitted snapshot.
pub type SaveSeq = u64;

#[derive(Debug)]
pub enum SaveResult {
    /// The backend accepted the snapshot.
    Saved,
    /// The request failed; local state is untouched.
    Failed(ApiError),
    /// A newer snapshot was queued before this one was sent.
    Superseded { by: SaveSeq },
}

#[derive(Debug)]
pub struct SaveOutcome {
    pub seq: SaveSeq,
    pub result: SaveResult,
}

struct SaveRequest {
    seq: SaveSeq,
    grid: Grid,
}

pub struct PersistenceGateway {
    tx: mpsc::UnboundedSender<SaveRequest>,
    outcomes: mpsc::UnboundedReceiver<SaveOutcome>,
    last_seq: SaveSeq,
    unresolved: usize,
}

impl PersistenceGateway {
    /// Spawn the save worker. Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(api: Arc<dyn GridApi>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<SaveRequest>();
        let (outcome_tx, outcomes) = mpsc::unbounded_channel::<SaveOutcome>();
        drop(tokio::spawn(run_worker(api, rx, outcome_tx)));
        Self { tx, outcomes, last_seq: 0, unresolved: 0 }
    }

    /// Queue a snapshot. Returns its sequence number.
    pub fn submit(&mut self, grid: Grid) -> SaveSeq {
        self.last_seq += 1;
        let seq = self.last_seq;
        info!(seq, cells = grid.cells.len(), "grid save queued");
        if self.tx.send(SaveRequest { seq, grid }).is_err() {
            // The worker dropped its outcome sender too; the next read resolves this.
            error!(seq, "save worker stopped; snapshot not queued");
        }
        self.unresolved += 1;
        seq
    }

    /// Sequence number of the most recent submission, if any.
    #[must_use]
    pub fn last_seq(&self) -> Option<SaveSeq> {
        (self.last_seq > 0).then_some(self.last_seq)
    }

    /// Number of submitted snapshots whose outcome has not been received.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    /// Next outcome if one is ready, without waiting.
    pub fn try_next_outcome(&mut self) -> Option<SaveOutcome> {
        match self.outcomes.try_recv() {
            Ok(outcome) => {
                self.unresolved = self.unresolved.saturating_sub(1);
                Some(outcome)
            }
            Err(TryRecvError::Disconnected) if self.unresolved > 0 => Some(self.worker_lost()),
            Err(_) => None,
        }
    }

    /// Wait for the next outcome. Returns `None` once nothing is unresolved.
    pub async fn next_outcome(&mut self) -> Option<SaveOutcome> {
        if self.unresolved == 0 {
            return None;
        }
        let Some(outcome) = self.outcomes.recv().await else {
            return Some(self.worker_lost());
        };
        self.unresolved = self.unresolved.saturating_sub(1);
        Some(outcome)
    }

    /// Resolve everything outstanding as one failure of the latest snapshot.
    fn worker_lost(&mut self) -> SaveOutcome {
        error!(seq = self.last_seq, unresolved = self.unresolved, "save worker stopped with saves outstanding");
        self.unresolved = 0;
        SaveOutcome {
            seq: self.last_seq,
            result: SaveResult::Failed(ApiError::Transport("save worker stopped".to_owned())),
        }
    }
}

impl Drop for PersistenceGateway {
    fn drop(&mut self) {
        if self.unresolved > 0 {
            warn!(unresolved = self.unresolved, "gateway dropped; queued saves finish unobserved");
        }
    }
}

async fn run_worker(
    api: Arc<dyn GridApi>,
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
    outcome_tx: mpsc::UnboundedSender<SaveOutcome>,
) {
    while let Some(mut request) = rx.recv().await {
        // EDGE: newest queued snapshot wins; older ones are acknowledged as superseded.
        while let Ok(newer) = rx.try_recv() {
            warn!(seq = request.seq, by = newer.seq, "grid save superseded before sending");
            let superseded = SaveOutcome { seq: request.seq, result: SaveResult::Superseded { by: newer.seq } };
            report(&outcome_tx, superseded);
            request = newer;
        }

        let SaveRequest { seq, grid } = request;
        let call = tokio::spawn({
            let api = Arc::clone(&api);
            async move { api.update_grid(&grid).await }
        });
        let result = match call.await {
            Ok(Ok(())) => {
                info!(seq, "grid saved");
                SaveResult::Saved
            }
            Ok(Err(e)) => {
                error!(seq, error = %e, "grid save failed");
                SaveResult::Failed(e)
            }
            Err(e) => {
                error!(seq, error = %e, "grid save task died");
                SaveResult::Failed(ApiError::Transport(format!("save task died: {e}")))
            }
        };
        report(&outcome_tx, SaveOutcome { seq, result });
    }
}

fn report(outcome_tx: &mpsc::UnboundedSender<SaveOutcome>, outcome: SaveOutcome) {
    if let Err(e) = outcome_tx.send(outcome) {
        debug!(seq = e.0.seq, "save outcome has no listener");
    }
}
