//! Source file descriptors and folder structure nodes.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A single source file selected for ingest.
///
/// `relative_path` is the location the file will take under the
/// destination. For files found inside a selected directory it starts with
/// that directory's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Absolute path of the source file.
    pub absolute_path: PathBuf,
    /// Base name of the file.
    pub name: CompactString,
    /// Size in bytes at enumeration time.
    pub size: u64,
    /// Path relative to the selection's common parent.
    pub relative_path: PathBuf,
}

impl FileDescriptor {
    /// Create a new descriptor.
    pub fn new(
        absolute_path: impl Into<PathBuf>,
        name: impl Into<CompactString>,
        size: u64,
        relative_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            name: name.into(),
            size,
            relative_path: relative_path.into(),
        }
    }

    /// Where this file lands under `destination`.
    ///
    /// Falls back to the base name when no relative path was recorded.
    pub fn destination_in(&self, destination: &Path) -> PathBuf {
        if self.relative_path.as_os_str().is_empty() {
            destination.join(self.name.as_str())
        } else {
            destination.join(&self.relative_path)
        }
    }

    /// Label used in records and progress messages.
    pub fn display_name(&self) -> String {
        if self.relative_path.as_os_str().is_empty() {
            self.name.to_string()
        } else {
            self.relative_path.to_string_lossy().into_owned()
        }
    }

    /// The directory the relative path is anchored at.
    ///
    /// For `/Volumes/CARD/Shoot/A.mov` with relative path `Shoot/A.mov`
    /// this is `/Volumes/CARD`.
    pub fn source_root(&self) -> Option<PathBuf> {
        let depth = self.relative_path.components().count().max(1);
        let mut root = self.absolute_path.as_path();
        for _ in 0..depth {
            root = root.parent()?;
        }
        Some(root.to_path_buf())
    }
}

/// A folder in a read-only structure preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    /// Folder name.
    pub name: CompactString,
    /// Absolute path of the folder.
    pub path: PathBuf,
    /// Sub-folders, sorted by name.
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    /// Create a folder node without children.
    pub fn new(name: impl Into<CompactString>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    /// Check if this folder has no sub-folders.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of folders below this one.
    pub fn folder_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.folder_count())
            .sum()
    }

    /// Every descendant folder as a path relative to this node, parents first.
    pub fn relative_folders(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for child in &self.children {
            let base = PathBuf::from(child.name.as_str());
            out.push(base.clone());
            out.extend(child.relative_folders().into_iter().map(|p| base.join(p)));
        }
        out
    }
}
