//! The ingest run: conflict detection, verified copies, progress and logging.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use hatch_core::{FileDescriptor, IngestConfig, ProjectMetadata};

use crate::conflict::{ConflictEntry, destination_occupied};
use crate::copy::{FileOutcome, copy_file_recorded};
use crate::error::IngestError;
use crate::log::{LogEntry, LogUpdate, OperationLog};
use crate::operation::{IngestReport, IngestRunResult, VerificationTag};
use crate::progress::{IngestProgress, ProgressTracker};
use crate::OPERATION_CHANNEL_SIZE;

/// Input to one ingest run.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    /// Files to copy, in processing order.
    pub files: Vec<FileDescriptor>,
    /// Destination root; each file lands at `destination/relative_path`.
    pub destination: PathBuf,
    pub metadata: ProjectMetadata,
}

impl IngestRequest {
    pub fn new(
        files: Vec<FileDescriptor>,
        destination: impl Into<PathBuf>,
        metadata: ProjectMetadata,
    ) -> Self {
        Self {
            files,
            destination: destination.into(),
            metadata,
        }
    }
}

/// A run executing in the background.
///
/// Drain `progress` to observe the run, then call [`finish`](Self::finish).
/// Dropping the receiver early is fine; the run continues unobserved.
#[derive(Debug)]
pub struct IngestTask<T> {
    pub progress: mpsc::Receiver<IngestProgress>,
    handle: JoinHandle<Result<T, IngestError>>,
}

impl<T> IngestTask<T> {
    pub(crate) fn new(
        progress: mpsc::Receiver<IngestProgress>,
        handle: JoinHandle<Result<T, IngestError>>,
    ) -> Self {
        Self { progress, handle }
    }

    /// Wait for the terminal result.
    ///
    /// Undelivered progress is discarded so the worker never blocks on a
    /// full channel.
    pub async fn finish(self) -> Result<T, IngestError> {
        let IngestTask { progress, handle } = self;
        drop(progress);
        handle
            .await
            .map_err(|e| IngestError::Worker(e.to_string()))?
    }
}

/// Drives ingest runs and conflict-resolution rounds against one log.
///
/// Files within a run are processed strictly one after another; separate
/// runs may execute concurrently.
#[derive(Debug, Clone)]
pub struct IngestEngine {
    log: OperationLog,
    config: IngestConfig,
}

impl IngestEngine {
    /// Create an engine with default verification settings.
    pub fn new(log: OperationLog) -> Self {
        Self::with_config(log, IngestConfig::default())
    }

    pub fn with_config(log: OperationLog, config: IngestConfig) -> Self {
        Self { log, config }
    }

    /// The log this engine records into.
    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Run an ingest on a background task.
    pub fn start_ingest(&self, request: IngestRequest) -> IngestTask<IngestReport> {
        let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);
        let engine = self.clone();

        let handle = tokio::spawn(async move { engine.process(request, Some(tx)).await });

        IngestTask::new(rx, handle)
    }

    /// Copy every file of `request` into its destination.
    ///
    /// Existing destinations become conflicts and are left untouched.
    /// Per-file problems are collected as failures; only an empty or
    /// uncreatable destination aborts the run. One progress event is sent
    /// after each file.
    ///
    /// An empty file list returns an empty report without touching the
    /// destination or the log.
    pub async fn process(
        &self,
        request: IngestRequest,
        progress: Option<mpsc::Sender<IngestProgress>>,
    ) -> Result<IngestReport, IngestError> {
        let IngestRequest {
            files,
            destination,
            metadata,
        } = request;

        if destination.as_os_str().is_empty() {
            return Err(IngestError::InvalidDestination);
        }
        if files.is_empty() {
            return Ok(IngestReport::default());
        }

        tokio::fs::create_dir_all(&destination)
            .await
            .map_err(|source| IngestError::Destination {
                path: destination.clone(),
                source,
            })?;

        tracing::info!(
            files = files.len(),
            destination = %destination.display(),
            project = metadata.display_name(),
            "starting ingest"
        );

        let mut result = IngestRunResult::default();
        let mut tracker = ProgressTracker::new(files.len(), progress);

        for file in &files {
            let dest_path = file.destination_in(&destination);
            let name = file.display_name();

            let message = if destination_occupied(&dest_path) {
                tracing::debug!(file = %name, "destination exists, deferring as conflict");
                result
                    .conflicts
                    .push(ConflictEntry::from_descriptor(file, dest_path));
                format!("Conflict: {name}")
            } else {
                let outcome = copy_file_recorded(
                    name.clone(),
                    file.absolute_path.clone(),
                    dest_path,
                    VerificationTag::Match,
                    self.config.clone(),
                )
                .await;
                let message = match &outcome {
                    FileOutcome::Copied(record) => {
                        tracing::debug!(file = %name, size = record.size, "copied");
                        format!("Copied {name}")
                    }
                    FileOutcome::Failed(_) => format!("Failed {name}"),
                };
                result.record(outcome);
                message
            };

            tracker.complete_item();
            tracker.emit(message).await;
        }

        let source_directory = files.first().and_then(FileDescriptor::source_root);
        let update = LogUpdate::for_run(
            Uuid::new_v4().to_string(),
            metadata,
            destination,
            source_directory,
            &result,
        );
        let log_id = write_log(&self.log, update).await.map(|entry| entry.id);

        tracing::info!(summary = %result.summary(), "ingest finished");
        Ok(IngestReport { result, log_id })
    }
}

/// Record `update` on the blocking pool.
///
/// A log that cannot be written does not fail the run: the copies already
/// happened, so the error is reported and `None` returned.
pub(crate) async fn write_log(log: &OperationLog, update: LogUpdate) -> Option<LogEntry> {
    let log = log.clone();
    let id = update.id.clone();

    match tokio::task::spawn_blocking(move || log.record(update)).await {
        Ok(Ok(entry)) => Some(entry),
        Ok(Err(e)) => {
            tracing::error!(id = %id, "failed to write operation log: {e}");
            None
        }
        Err(e) => {
            tracing::error!(id = %id, "operation log task failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn descriptor(root: &std::path::Path, relative: &str, contents: &[u8]) -> FileDescriptor {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        FileDescriptor::new(path, name, contents.len() as u64, relative)
    }

    #[tokio::test]
    async fn test_empty_destination_is_invalid() {
        let engine = IngestEngine::new(OperationLog::in_memory());
        let err = engine
            .process(IngestRequest::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidDestination));
    }

    #[tokio::test]
    async fn test_empty_files_does_not_touch_destination() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("never");
        let engine = IngestEngine::new(OperationLog::in_memory());

        let report = engine
            .process(IngestRequest::new(vec![], &dest, ProjectMetadata::default()), None)
            .await
            .unwrap();

        assert_eq!(report.result.processed(), 0);
        assert!(report.log_id.is_none());
        assert!(!dest.exists());
        assert!(engine.log().list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conflict_is_not_copied() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("card");
        let dest = temp.path().join("backup");
        let a = descriptor(&src, "Shoot/A.mov", b"aaaa");
        let b = descriptor(&src, "Shoot/B.mov", b"bb");
        fs::create_dir_all(dest.join("Shoot")).unwrap();
        fs::write(dest.join("Shoot/B.mov"), b"old").unwrap();

        let engine = IngestEngine::new(OperationLog::in_memory());
        let report = engine
            .process(IngestRequest::new(vec![a, b], &dest, ProjectMetadata::named("Spot")), None)
            .await
            .unwrap();

        assert_eq!(report.result.copied.len(), 1);
        assert_eq!(report.result.conflicts.len(), 1);
        assert_eq!(report.result.total_size, 4);
        assert_eq!(fs::read(dest.join("Shoot/B.mov")).unwrap(), b"old");

        let entry = engine.log().get(report.log_id.as_deref().unwrap()).unwrap().unwrap();
        assert_eq!(entry.files_conflict, 1);
        assert_eq!(entry.source_directory.as_deref(), Some(src.as_path()));
    }
}
