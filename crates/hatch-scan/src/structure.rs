//! Folder-only structure preview.

use std::path::Path;

use hatch_core::{ScanError, StructureNode};

/// Read the folder tree under `root` for display.
///
/// Only directories are listed; hidden folders and symlinks are left out
/// and no file metadata is read. Sub-folders that cannot be listed appear
/// without children.
pub fn read_structure(root: &Path) -> Result<StructureNode, ScanError> {
    let metadata = std::fs::metadata(root).map_err(|e| ScanError::io(root, e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.to_string_lossy().into_owned());

    Ok(build_node(root, name))
}

fn build_node(path: &Path, name: String) -> StructureNode {
    let mut node = StructureNode::new(name, path);

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(path = %path.display(), "cannot list folder: {err}");
            return node;
        }
    };

    let mut children: Vec<StructureNode> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                None
            } else {
                Some(build_node(&entry.path(), name))
            }
        })
        .collect();

    children.sort_by(|a, b| a.name.cmp(&b.name));
    node.children = children;
    node
}
