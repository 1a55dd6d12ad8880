//! Core types for hatch.
//!
//! This crate provides the data structures shared by the enumeration and
//! ingest crates: source file descriptors, folder structure nodes, project
//! metadata, configuration and error types.

mod config;
mod descriptor;
mod error;
mod metadata;

pub use config::{
    IngestConfig, IngestConfigBuilder, ScanConfig, ScanConfigBuilder, Settings, VerifyMode,
};
pub use descriptor::{FileDescriptor, StructureNode};
pub use error::{ConfigError, ScanError, ScanWarning, WarningKind};
pub use metadata::ProjectMetadata;
