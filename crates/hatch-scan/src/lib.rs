//! Source enumeration for hatch.
//!
//! This crate turns the paths a user selects (single clips, whole card
//! folders, or a mix) into a flat list of [`FileDescriptor`]s ready for
//! ingest, and reads folder-only structure previews of project trees.
//!
//! # Example
//!
//! ```rust,no_run
//! use hatch_scan::SourceEnumerator;
//!
//! let enumerator = SourceEnumerator::new();
//! let result = enumerator.enumerate(&["/Volumes/A001/DCIM"]);
//!
//! for file in &result.files {
//!     println!("{} ({} bytes)", file.relative_path.display(), file.size);
//! }
//! ```
//!
//! Hidden entries are skipped and hidden folders are pruned. Directory
//! selections keep their own name as the first path segment, so
//! `/Volumes/A001/DCIM/C0001.MP4` becomes `DCIM/C0001.MP4` under the
//! destination.

mod enumerator;
mod structure;

pub use enumerator::{scan_paths, Enumeration, SourceEnumerator};
pub use structure::read_structure;

// Re-export core types for convenience
pub use hatch_core::{FileDescriptor, ScanConfig, ScanError, ScanWarning, StructureNode, WarningKind};
