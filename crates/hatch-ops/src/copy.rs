//! Single-file copy with post-copy verification.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use hatch_core::{IngestConfig, VerifyMode};

use crate::operation::{
    CHECKSUM_MISMATCH_MESSAGE, CopyRecord, FailureRecord, SIZE_MISMATCH_MESSAGE, VerificationTag,
};

/// What verification found after a copy completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The copy matches the source.
    Verified { size: u64 },
    /// Source and destination sizes differ.
    SizeMismatch { source: u64, destination: u64 },
    /// Sizes match but content digests differ.
    ChecksumMismatch,
}

impl Verification {
    /// Compare a finished copy against its source.
    ///
    /// `digests` holds the source and destination hashes when checksum
    /// verification ran; it is only consulted once the sizes agree.
    pub fn classify(
        source_len: u64,
        dest_len: u64,
        digests: Option<(blake3::Hash, blake3::Hash)>,
    ) -> Self {
        if source_len != dest_len {
            return Self::SizeMismatch {
                source: source_len,
                destination: dest_len,
            };
        }
        match digests {
            Some((source, dest)) if source != dest => Self::ChecksumMismatch,
            _ => Self::Verified { size: dest_len },
        }
    }
}

/// Copy `source` to `dest` and verify the result.
///
/// Parent directories of `dest` are created and an existing file at
/// `dest` is replaced. A copy that fails verification is left on disk.
pub fn copy_verified(
    source: &Path,
    dest: &Path,
    config: &IngestConfig,
) -> Result<Verification, String> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }

    fs::copy(source, dest).map_err(|e| format!("Failed to copy: {}", e))?;

    let source_meta =
        fs::metadata(source).map_err(|e| format!("Failed to read source metadata: {}", e))?;
    let dest_meta =
        fs::metadata(dest).map_err(|e| format!("Failed to read destination metadata: {}", e))?;

    if config.preserve_timestamps {
        if let Err(e) = preserve_modified(&source_meta, dest) {
            tracing::debug!(path = %dest.display(), "could not preserve timestamp: {e}");
        }
    }

    let digests = if config.verify == VerifyMode::Checksum && source_meta.len() == dest_meta.len() {
        let source_hash =
            hash_file(source).map_err(|e| format!("Failed to hash source: {}", e))?;
        let dest_hash =
            hash_file(dest).map_err(|e| format!("Failed to hash destination: {}", e))?;
        Some((source_hash, dest_hash))
    } else {
        None
    };

    Ok(Verification::classify(
        source_meta.len(),
        dest_meta.len(),
        digests,
    ))
}

/// Compute the BLAKE3 digest of a file.
pub fn hash_file(path: &Path) -> io::Result<blake3::Hash> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize())
}

fn preserve_modified(source_meta: &fs::Metadata, dest: &Path) -> io::Result<()> {
    let modified = source_meta.modified()?;
    File::options().write(true).open(dest)?.set_modified(modified)
}

/// Result of copying one file as part of a run.
#[derive(Debug)]
pub(crate) enum FileOutcome {
    Copied(CopyRecord),
    Failed(FailureRecord),
}

/// Copy on the blocking pool and turn the verification into a record.
pub(crate) async fn copy_file_recorded(
    display_name: String,
    source: PathBuf,
    dest: PathBuf,
    tag: VerificationTag,
    config: IngestConfig,
) -> FileOutcome {
    let (source_c, dest_c) = (source.clone(), dest.clone());
    let result =
        tokio::task::spawn_blocking(move || copy_verified(&source_c, &dest_c, &config))
            .await
            .map_err(|e| format!("Task failed: {}", e))
            .and_then(|r| r);

    file_outcome(display_name, source, dest, tag, result)
}

/// Turn a copy attempt into the record it produces.
pub(crate) fn file_outcome(
    display_name: String,
    source: PathBuf,
    dest: PathBuf,
    tag: VerificationTag,
    result: Result<Verification, String>,
) -> FileOutcome {
    match result {
        Ok(Verification::Verified { size }) => FileOutcome::Copied(CopyRecord {
            display_name,
            source_path: source,
            dest_path: dest,
            size,
            verification: tag,
        }),
        Ok(Verification::SizeMismatch {
            source: expected,
            destination: actual,
        }) => {
            tracing::warn!(file = %display_name, expected, actual, "size verification failed");
            FileOutcome::Failed(FailureRecord::new(display_name, source, SIZE_MISMATCH_MESSAGE))
        }
        Ok(Verification::ChecksumMismatch) => {
            tracing::warn!(file = %display_name, "checksum verification failed");
            FileOutcome::Failed(FailureRecord::new(
                display_name,
                source,
                CHECKSUM_MISMATCH_MESSAGE,
            ))
        }
        Err(message) => {
            tracing::warn!(file = %display_name, "copy failed: {message}");
            FileOutcome::Failed(FailureRecord::new(display_name, source, message))
        }
    }
}
