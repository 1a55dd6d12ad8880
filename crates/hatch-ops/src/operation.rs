//! Per-file records and aggregated run results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::conflict::ConflictEntry;
use crate::copy::FileOutcome;

/// Reason recorded when the user skips a conflict.
pub const USER_SKIPPED_REASON: &str = "User Skipped [Resolved]";

/// Failure message when the copy's size differs from the source.
pub const SIZE_MISMATCH_MESSAGE: &str = "Size Mismatch Verification Failed";

/// Failure message when the copy's checksum differs from the source.
pub const CHECKSUM_MISMATCH_MESSAGE: &str = "Checksum Mismatch Verification Failed";

/// How a copied file was verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationTag {
    /// Fresh copy, verified.
    Match,
    /// Replaced an existing file during conflict resolution, verified.
    Overwritten,
}

/// A verified copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRecord {
    pub display_name: String,
    pub source_path: PathBuf,
    pub dest_path: PathBuf,
    /// Destination size in bytes.
    pub size: u64,
    pub verification: VerificationTag,
}

/// A file deliberately not copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRecord {
    pub display_name: String,
    pub source_path: PathBuf,
    pub reason: String,
}

/// A file whose copy or verification failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub display_name: String,
    pub source_path: PathBuf,
    pub error: String,
}

impl FailureRecord {
    /// Create a new failure record.
    pub fn new(
        display_name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            source_path: source_path.into(),
            error: error.into(),
        }
    }
}

impl std::fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.display_name, self.error)
    }
}

/// Outcome of one ingest run.
///
/// Every input file lands in exactly one of the four lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRunResult {
    pub copied: Vec<CopyRecord>,
    pub skipped: Vec<SkipRecord>,
    pub failed: Vec<FailureRecord>,
    pub conflicts: Vec<ConflictEntry>,
    /// Bytes of verified fresh copies.
    pub total_size: u64,
}

impl IngestRunResult {
    /// Number of files accounted for.
    pub fn processed(&self) -> usize {
        self.copied.len() + self.skipped.len() + self.failed.len() + self.conflicts.len()
    }

    /// Check if the run has nothing left to report or resolve.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.conflicts.is_empty()
    }

    /// Add the outcome of a fresh copy.
    ///
    /// Only verified copies count toward `total_size`.
    pub(crate) fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Copied(record) => {
                self.total_size += record.size;
                self.copied.push(record);
            }
            FileOutcome::Failed(failure) => self.failed.push(failure),
        }
    }

    /// Fold a resolution round into this in-memory view.
    ///
    /// Each record of the round settles one pending conflict with the same
    /// source path; the rest stay pending. `total_size` is left as is.
    pub fn absorb(&mut self, round: ResolutionResult) {
        let resolved = round
            .copied
            .iter()
            .map(|r| &r.source_path)
            .chain(round.skipped.iter().map(|r| &r.source_path))
            .chain(round.failed.iter().map(|r| &r.source_path));

        for source in resolved {
            if let Some(pos) = self.conflicts.iter().position(|c| &c.source_path == source) {
                self.conflicts.remove(pos);
            }
        }

        self.copied.extend(round.copied);
        self.skipped.extend(round.skipped);
        self.failed.extend(round.failed);
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} copied", self.copied.len())];
        if !self.skipped.is_empty() {
            parts.push(format!("{} skipped", self.skipped.len()));
        }
        if !self.failed.is_empty() {
            parts.push(format!("{} failed", self.failed.len()));
        }
        if !self.conflicts.is_empty() {
            parts.push(format!("{} conflicts", self.conflicts.len()));
        }
        parts.join(", ")
    }
}

/// Outcome of one conflict-resolution round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub copied: Vec<CopyRecord>,
    pub skipped: Vec<SkipRecord>,
    pub failed: Vec<FailureRecord>,
}

impl ResolutionResult {
    /// Number of conflicts this round consumed.
    pub fn resolved(&self) -> usize {
        self.copied.len() + self.skipped.len() + self.failed.len()
    }
}

/// Result of an ingest run together with the id of its log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    #[serde(flatten)]
    pub result: IngestRunResult,
    /// `None` when nothing was ingested or the log could not be written.
    pub log_id: Option<String>,
}
