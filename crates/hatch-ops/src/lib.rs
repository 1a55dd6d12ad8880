//! Ingest engine for hatch.
//!
//! This crate copies enumerated source files into a project destination
//! with post-copy verification, defers existing destinations as conflicts
//! for a later resolution round, streams progress over channels and keeps
//! an auditable log of every run.
//!
//! # Example
//!
//! ```rust,no_run
//! use hatch_ops::{IngestEngine, IngestRequest, OperationLog};
//! use hatch_core::ProjectMetadata;
//!
//! # async fn run(files: Vec<hatch_core::FileDescriptor>) -> Result<(), hatch_ops::IngestError> {
//! let engine = IngestEngine::new(OperationLog::in_memory());
//! let mut task = engine.start_ingest(IngestRequest::new(
//!     files,
//!     "/Projects/Spot/Footage",
//!     ProjectMetadata::named("Spot"),
//! ));
//!
//! while let Some(progress) = task.progress.recv().await {
//!     println!("{:>3}% {}", progress.percent, progress.message);
//! }
//! let report = task.finish().await?;
//! println!("{}", report.result.summary());
//! # Ok(())
//! # }
//! ```

mod conflict;
mod copy;
mod error;
mod ingest;
mod log;
mod operation;
mod progress;
mod resolve;
mod scaffold;
mod store;

pub use conflict::{ConflictAction, ConflictEntry};
pub use copy::{Verification, copy_verified, hash_file};
pub use error::{IngestError, LogError, ScaffoldError};
pub use ingest::{IngestEngine, IngestRequest, IngestTask};
pub use log::{LogDetails, LogEntry, LogStatus, LogUpdate, OperationLog, RemainingConflicts};
pub use operation::{
    CHECKSUM_MISMATCH_MESSAGE, CopyRecord, FailureRecord, IngestReport, IngestRunResult,
    ResolutionResult, SIZE_MISMATCH_MESSAGE, SkipRecord, USER_SKIPPED_REASON, VerificationTag,
};
pub use progress::IngestProgress;
pub use resolve::ResolveRequest;
pub use scaffold::{ScaffoldResult, scaffold_project};
pub use store::{JsonLogStore, MemoryLogStore, OperationLogStore};

/// Default channel buffer size for progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
