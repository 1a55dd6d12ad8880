//! Progress reporting for ingest runs and resolution rounds.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One progress event.
///
/// Within a run `percent` never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestProgress {
    /// Completion, 0 to 100.
    pub percent: u8,
    /// What just happened (or is about to happen).
    pub message: String,
    /// Items finished so far.
    pub processed: usize,
    /// Items in the run.
    pub total: usize,
}

/// Counts finished items and turns them into progress events.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    processed: usize,
    total: usize,
    tx: Option<mpsc::Sender<IngestProgress>>,
}

impl ProgressTracker {
    pub fn new(total: usize, tx: Option<mpsc::Sender<IngestProgress>>) -> Self {
        Self {
            processed: 0,
            total,
            tx,
        }
    }

    /// Mark one more item as finished.
    pub fn complete_item(&mut self) {
        self.processed = (self.processed + 1).min(self.total);
    }

    /// Progress at the current position.
    pub fn snapshot(&self, message: impl Into<String>) -> IngestProgress {
        IngestProgress {
            percent: percent(self.processed, self.total),
            message: message.into(),
            processed: self.processed,
            total: self.total,
        }
    }

    /// Send a snapshot to the subscriber, if any.
    ///
    /// A dropped receiver is not an error; the run carries on unobserved.
    pub async fn emit(&self, message: impl Into<String>) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(self.snapshot(message)).await;
        }
    }
}

/// `round(processed / total * 100)`, clamped to 100.
pub(crate) fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let value = (processed as f64 / total as f64 * 100.0).round();
    value.clamp(0.0, 100.0) as u8
}
