//! Conflict-resolution rounds.

use std::path::PathBuf;

use tokio::sync::mpsc;

use hatch_core::ProjectMetadata;

use crate::conflict::{ConflictAction, ConflictEntry};
use crate::copy::{FileOutcome, copy_file_recorded};
use crate::ingest::{IngestEngine, IngestTask, write_log};
use crate::log::LogUpdate;
use crate::operation::{ResolutionResult, SkipRecord, USER_SKIPPED_REASON, VerificationTag};
use crate::progress::{IngestProgress, ProgressTracker};
use crate::OPERATION_CHANNEL_SIZE;

/// One decision applied to a set of conflicts from an earlier run.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub conflicts: Vec<ConflictEntry>,
    pub action: ConflictAction,
    pub destination: PathBuf,
    pub metadata: ProjectMetadata,
    /// Run to amend; without one the round is not logged.
    pub log_id: Option<String>,
}

impl IngestEngine {
    /// Run a resolution round on a background task.
    pub fn start_resolve(&self, request: ResolveRequest) -> IngestTask<ResolutionResult> {
        let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);
        let engine = self.clone();

        let handle = tokio::spawn(async move { Ok(engine.resolve(request, Some(tx)).await) });

        IngestTask::new(rx, handle)
    }

    /// Apply `request.action` to every conflict, in order.
    ///
    /// A progress event precedes each conflict and a final one marks
    /// completion. The round is merged into the log entry for
    /// `request.log_id` and returned; folding it into an in-memory run
    /// view is up to the caller (see [`IngestRunResult::absorb`]).
    ///
    /// [`IngestRunResult::absorb`]: crate::IngestRunResult::absorb
    pub async fn resolve(
        &self,
        request: ResolveRequest,
        progress: Option<mpsc::Sender<IngestProgress>>,
    ) -> ResolutionResult {
        let ResolveRequest {
            conflicts,
            action,
            destination,
            metadata,
            log_id,
        } = request;

        let mut round = ResolutionResult::default();
        if conflicts.is_empty() {
            return round;
        }

        tracing::info!(conflicts = conflicts.len(), %action, "resolving conflicts");
        let mut tracker = ProgressTracker::new(conflicts.len(), progress);

        for conflict in conflicts {
            tracker
                .emit(format!("Resolving {}", conflict.display_name))
                .await;

            match action {
                ConflictAction::Skip => round.skipped.push(SkipRecord {
                    display_name: conflict.display_name,
                    source_path: conflict.source_path,
                    reason: USER_SKIPPED_REASON.to_string(),
                }),
                ConflictAction::Overwrite => {
                    match copy_file_recorded(
                        conflict.display_name,
                        conflict.source_path,
                        conflict.dest_path,
                        VerificationTag::Overwritten,
                        self.config().clone(),
                    )
                    .await
                    {
                        FileOutcome::Copied(record) => round.copied.push(record),
                        FileOutcome::Failed(failure) => round.failed.push(failure),
                    }
                }
            }

            tracker.complete_item();
        }

        tracker.emit("Resolution complete").await;

        match log_id {
            Some(id) => {
                let update = LogUpdate::for_resolution(id, metadata, destination, &round);
                write_log(self.log(), update).await;
            }
            None => tracing::debug!("no run id supplied, resolution round not logged"),
        }

        tracing::info!(
            copied = round.copied.len(),
            skipped = round.skipped.len(),
            failed = round.failed.len(),
            "resolution finished"
        );
        round
    }
}
