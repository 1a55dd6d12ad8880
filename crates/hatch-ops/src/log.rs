//! Auditable log of ingest runs.
//!
//! One entry per run, created when the run finishes and amended in place
//! by every conflict-resolution round for the same run id.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use hatch_core::ProjectMetadata;

use crate::error::LogError;
use crate::operation::{CopyRecord, FailureRecord, IngestRunResult, ResolutionResult, SkipRecord};
use crate::store::{JsonLogStore, MemoryLogStore, OperationLogStore};

/// Overall state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogStatus {
    Success,
    Warning,
}

/// Every record a run has produced so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDetails {
    #[serde(default)]
    pub copied: Vec<CopyRecord>,
    #[serde(default)]
    pub skipped: Vec<SkipRecord>,
    #[serde(default)]
    pub failed: Vec<FailureRecord>,
}

/// A persisted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// When the last resolution round was merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub metadata: ProjectMetadata,
    pub destination: PathBuf,
    #[serde(default)]
    pub source_directory: Option<PathBuf>,
    pub description: String,
    pub details: LogDetails,
    pub files_copied: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    /// Conflicts still waiting for a decision.
    pub files_conflict: usize,
    pub status: LogStatus,
}

impl LogEntry {
    fn create(update: LogUpdate) -> Self {
        let files_conflict = match update.remaining {
            RemainingConflicts::Exactly(n) => n,
            _ => update.conflicts,
        };
        let status = if !update.failed.is_empty() || files_conflict > 0 {
            LogStatus::Warning
        } else {
            LogStatus::Success
        };

        Self {
            id: update.id,
            timestamp: Utc::now(),
            updated_at: None,
            metadata: update.metadata,
            destination: update.destination,
            source_directory: update.source_directory,
            description: update.description,
            files_copied: update.copied.len(),
            files_skipped: update.skipped.len(),
            files_failed: update.failed.len(),
            files_conflict,
            status,
            details: LogDetails {
                copied: update.copied,
                skipped: update.skipped,
                failed: update.failed,
            },
        }
    }

    fn merge(&mut self, update: LogUpdate) {
        self.details.copied.extend(update.copied);
        self.details.skipped.extend(update.skipped);
        self.details.failed.extend(update.failed);

        self.files_copied = self.details.copied.len();
        self.files_skipped = self.details.skipped.len();
        self.files_failed = self.details.failed.len();

        let conflicts_known = match update.remaining {
            RemainingConflicts::Unchanged => false,
            RemainingConflicts::Exactly(n) => {
                self.files_conflict = n;
                true
            }
            RemainingConflicts::Resolved(n) => {
                self.files_conflict = self.files_conflict.saturating_sub(n);
                true
            }
        };

        self.status = if !self.details.failed.is_empty() || (conflicts_known && self.files_conflict > 0)
        {
            LogStatus::Warning
        } else {
            LogStatus::Success
        };
        self.updated_at = Some(Utc::now());
    }

    /// Total files accounted for by copy, skip and failure records.
    pub fn files_settled(&self) -> usize {
        self.files_copied + self.files_skipped + self.files_failed
    }
}

/// How a write changes the pending-conflict counter of an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemainingConflicts {
    /// Leave the counter as stored.
    #[default]
    Unchanged,
    /// Set the counter to this value.
    Exactly(usize),
    /// Decrease the stored counter by this many resolved conflicts.
    Resolved(usize),
}

/// One write to the log: a finished run or a resolution round.
#[derive(Debug, Clone, Default)]
pub struct LogUpdate {
    pub id: String,
    pub metadata: ProjectMetadata,
    pub destination: PathBuf,
    pub source_directory: Option<PathBuf>,
    pub description: String,
    pub copied: Vec<CopyRecord>,
    pub skipped: Vec<SkipRecord>,
    pub failed: Vec<FailureRecord>,
    /// Unresolved conflicts, used when the entry is created.
    pub conflicts: usize,
    /// Counter change, used when the entry already exists.
    pub remaining: RemainingConflicts,
}

impl LogUpdate {
    /// The write for a finished ingest run.
    pub fn for_run(
        id: impl Into<String>,
        metadata: ProjectMetadata,
        destination: impl Into<PathBuf>,
        source_directory: Option<PathBuf>,
        result: &IngestRunResult,
    ) -> Self {
        let total = result.processed();
        Self {
            description: format!(
                "Ingest of {} file{} for {}",
                total,
                if total == 1 { "" } else { "s" },
                metadata.display_name()
            ),
            id: id.into(),
            metadata,
            destination: destination.into(),
            source_directory,
            copied: result.copied.clone(),
            skipped: result.skipped.clone(),
            failed: result.failed.clone(),
            conflicts: result.conflicts.len(),
            remaining: RemainingConflicts::Unchanged,
        }
    }

    /// The write for a resolution round that consumed `round.resolved()` conflicts.
    pub fn for_resolution(
        id: impl Into<String>,
        metadata: ProjectMetadata,
        destination: impl Into<PathBuf>,
        round: &ResolutionResult,
    ) -> Self {
        Self {
            description: format!("Conflict resolution for {}", metadata.display_name()),
            id: id.into(),
            metadata,
            destination: destination.into(),
            source_directory: None,
            copied: round.copied.clone(),
            skipped: round.skipped.clone(),
            failed: round.failed.clone(),
            conflicts: 0,
            remaining: RemainingConflicts::Resolved(round.resolved()),
        }
    }
}

/// Shared handle to the operation log.
///
/// Clones share one store; every read-modify-write happens under a single
/// lock, so concurrent rounds for the same run id cannot lose records.
#[derive(Clone)]
pub struct OperationLog {
    store: Arc<Mutex<Box<dyn OperationLogStore>>>,
}

impl std::fmt::Debug for OperationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationLog").finish_non_exhaustive()
    }
}

impl OperationLog {
    /// Wrap a store.
    pub fn new(store: impl OperationLogStore + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    /// A log that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryLogStore::new())
    }

    /// A log backed by a JSON file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        Ok(Self::new(JsonLogStore::open(path)?))
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn OperationLogStore>> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create or amend the entry for `update.id`.
    ///
    /// Returns the entry as stored.
    pub fn record(&self, update: LogUpdate) -> Result<LogEntry, LogError> {
        let mut store = self.lock();

        let entry = match store.get(&update.id)? {
            Some(mut existing) => {
                existing.merge(update);
                existing
            }
            None => LogEntry::create(update),
        };

        store.upsert(entry.clone())?;
        tracing::debug!(
            id = %entry.id,
            copied = entry.files_copied,
            skipped = entry.files_skipped,
            failed = entry.files_failed,
            conflicts = entry.files_conflict,
            status = %entry.status,
            "log entry written"
        );
        Ok(entry)
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Result<Option<LogEntry>, LogError> {
        self.lock().get(id)
    }

    /// All entries, newest first.
    pub fn list(&self) -> Result<Vec<LogEntry>, LogError> {
        self.lock().list()
    }

    /// Entries whose destination is `project` or lies inside it, newest first.
    pub fn list_for_destination(&self, project: &Path) -> Result<Vec<LogEntry>, LogError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| e.destination.starts_with(project))
            .collect())
    }

    /// Remove every entry. Irreversible.
    pub fn clear(&self) -> Result<(), LogError> {
        self.lock().clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{USER_SKIPPED_REASON, VerificationTag};

    fn copied(name: &str) -> CopyRecord {
        CopyRecord {
            display_name: name.into(),
            source_path: PathBuf::from(format!("/src/{name}")),
            dest_path: PathBuf::from(format!("/dst/{name}")),
            size: 10,
            verification: VerificationTag::Match,
        }
    }

    fn skipped(name: &str) -> SkipRecord {
        SkipRecord {
            display_name: name.into(),
            source_path: PathBuf::from(format!("/src/{name}")),
            reason: USER_SKIPPED_REASON.into(),
        }
    }

    fn initial(id: &str, copied_names: &[&str], conflicts: usize) -> LogUpdate {
        LogUpdate {
            id: id.into(),
            destination: PathBuf::from("/dst"),
            description: "run".into(),
            copied: copied_names.iter().map(|n| copied(n)).collect(),
            conflicts,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_with_conflicts_is_warning() {
        let log = OperationLog::in_memory();
        let entry = log.record(initial("r1", &["a.mov"], 2)).unwrap();

        assert_eq!(entry.files_copied, 1);
        assert_eq!(entry.files_conflict, 2);
        assert_eq!(entry.status, LogStatus::Warning);
    }

    #[test]
    fn test_create_clean_is_success() {
        let log = OperationLog::in_memory();
        let entry = log.record(initial("r1", &["a.mov", "b.mov"], 0)).unwrap();
        assert_eq!(entry.status, LogStatus::Success);
    }

    #[test]
    fn test_merge_appends_and_recomputes() {
        let log = OperationLog::in_memory();
        log.record(initial("r1", &["a.mov"], 2)).unwrap();

        let entry = log
            .record(LogUpdate {
                id: "r1".into(),
                skipped: vec![skipped("b.mov"), skipped("c.mov")],
                remaining: RemainingConflicts::Exactly(0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(entry.files_copied, 1);
        assert_eq!(entry.files_skipped, 2);
        assert_eq!(entry.files_conflict, 0);
        assert_eq!(entry.status, LogStatus::Success);
        assert_eq!(entry.details.copied.len(), 1);
        assert!(entry.updated_at.is_some());
        assert_eq!(log.list().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_without_remaining_keeps_counter() {
        let log = OperationLog::in_memory();
        log.record(initial("r1", &[], 1)).unwrap();

        let entry = log
            .record(LogUpdate {
                id: "r1".into(),
                copied: vec![copied("x.mov")],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(entry.files_conflict, 1);
        assert_eq!(entry.status, LogStatus::Success);
    }

    #[test]
    fn test_merge_resolved_decrements() {
        let log = OperationLog::in_memory();
        log.record(initial("r1", &[], 3)).unwrap();

        let entry = log
            .record(LogUpdate {
                id: "r1".into(),
                skipped: vec![skipped("a.mov")],
                remaining: RemainingConflicts::Resolved(1),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(entry.files_conflict, 2);
        assert_eq!(entry.status, LogStatus::Warning);
    }

    #[test]
    fn test_failure_keeps_warning_after_merge() {
        let log = OperationLog::in_memory();
        let mut first = initial("r1", &[], 0);
        first.failed = vec![FailureRecord::new("a.mov", "/src/a.mov", "boom")];
        log.record(first).unwrap();

        let entry = log
            .record(LogUpdate {
                id: "r1".into(),
                remaining: RemainingConflicts::Exactly(0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(entry.status, LogStatus::Warning);
    }

    #[test]
    fn test_merge_order_independent() {
        let round_a = || LogUpdate {
            id: "r".into(),
            copied: vec![copied("a.mov")],
            remaining: RemainingConflicts::Resolved(1),
            ..Default::default()
        };
        let round_b = || LogUpdate {
            id: "r".into(),
            skipped: vec![skipped("b.mov")],
            failed: vec![FailureRecord::new("c.mov", "/src/c.mov", "boom")],
            remaining: RemainingConflicts::Resolved(2),
            ..Default::default()
        };

        let ab = OperationLog::in_memory();
        ab.record(initial("r", &[], 3)).unwrap();
        ab.record(round_a()).unwrap();
        let ab = ab.record(round_b()).unwrap();

        let ba = OperationLog::in_memory();
        ba.record(initial("r", &[], 3)).unwrap();
        ba.record(round_b()).unwrap();
        let ba = ba.record(round_a()).unwrap();

        assert_eq!(
            (ab.files_copied, ab.files_skipped, ab.files_failed, ab.files_conflict),
            (ba.files_copied, ba.files_skipped, ba.files_failed, ba.files_conflict)
        );
        assert_eq!(ab.files_conflict, 0);
        assert_eq!(ab.status, ba.status);
    }

    #[test]
    fn test_list_for_destination_and_clear() {
        let log = OperationLog::in_memory();
        let mut a = initial("a", &[], 0);
        a.destination = PathBuf::from("/projects/spot/Footage");
        let mut b = initial("b", &[], 0);
        b.destination = PathBuf::from("/projects/other");
        log.record(a).unwrap();
        log.record(b).unwrap();

        let spot = log.list_for_destination(Path::new("/projects/spot")).unwrap();
        assert_eq!(spot.len(), 1);
        assert_eq!(spot[0].id, "a");

        log.clear().unwrap();
        assert!(log.list().unwrap().is_empty());
    }

    #[test]
    fn test_entry_json_shape() {
        let log = OperationLog::in_memory();
        let mut update = initial("r1", &["a.mov"], 0);
        update.metadata = ProjectMetadata::named("Spot");
        let entry = log.record(update).unwrap();

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["projectName"], "Spot");
        assert_eq!(json["filesCopied"], 1);
        assert_eq!(json["status"], "SUCCESS");
        assert_eq!(json["details"]["copied"][0]["verification"], "MATCH");
    }
}
