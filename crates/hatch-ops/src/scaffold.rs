//! Project folder scaffolding.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::ScaffoldError;

/// Folders created by [`scaffold_project`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldResult {
    /// The new project root.
    pub root: PathBuf,
    /// Every folder created below the root, in creation order.
    pub created: Vec<PathBuf>,
}

/// Create `destination/root_name` and every folder in `structure` below it.
///
/// Structure entries are relative paths such as `Footage/A-Cam`. Blank
/// entries are ignored and `..` segments are dropped so nothing escapes the
/// project root. The project root must not exist yet.
pub fn scaffold_project<S: AsRef<str>>(
    destination: &Path,
    root_name: &str,
    structure: &[S],
) -> Result<ScaffoldResult, ScaffoldError> {
    validate_name(root_name)?;

    let root = destination.join(root_name.trim());
    if root.exists() {
        return Err(ScaffoldError::AlreadyExists { path: root });
    }

    fs::create_dir_all(&root).map_err(|source| ScaffoldError::Io {
        path: root.clone(),
        source,
    })?;

    let mut created = Vec::new();
    for entry in structure {
        let Some(relative) = sanitize(entry.as_ref()) else {
            continue;
        };
        let path = root.join(&relative);
        fs::create_dir_all(&path).map_err(|source| ScaffoldError::Io {
            path: path.clone(),
            source,
        })?;
        created.push(path);
    }

    tracing::info!(root = %root.display(), folders = created.len(), "project scaffolded");
    Ok(ScaffoldResult { root, created })
}

fn validate_name(name: &str) -> Result<(), ScaffoldError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ScaffoldError::InvalidName("Name cannot be empty".into()));
    }
    if name.len() > 255 {
        return Err(ScaffoldError::InvalidName(
            "Name is too long (max 255 characters)".into(),
        ));
    }
    for c in ['/', '\\', '\0'] {
        if name.contains(c) {
            return Err(ScaffoldError::InvalidName(format!("Name cannot contain '{c}'")));
        }
    }
    if name == "." || name == ".." {
        return Err(ScaffoldError::InvalidName(format!("'{name}' is not a folder name")));
    }
    Ok(())
}

/// Keep only the normal segments of a structure entry.
fn sanitize(entry: &str) -> Option<PathBuf> {
    let cleaned = entry.trim().replace("..", "");
    let path: PathBuf = Path::new(&cleaned)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    (!path.as_os_str().is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_structure() {
        let temp = TempDir::new().unwrap();
        let result = scaffold_project(
            temp.path(),
            "2026_Spot",
            &["Footage/A-Cam", "Footage/B-Cam", "Audio", "  "],
        )
        .unwrap();

        assert_eq!(result.root, temp.path().join("2026_Spot"));
        assert_eq!(result.created.len(), 3);
        assert!(temp.path().join("2026_Spot/Footage/B-Cam").is_dir());
        assert!(temp.path().join("2026_Spot/Audio").is_dir());
    }

    #[test]
    fn test_existing_root_fails() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Spot")).unwrap();

        let err = scaffold_project::<&str>(temp.path(), "Spot", &[]).unwrap_err();
        assert!(matches!(err, ScaffoldError::AlreadyExists { .. }));
    }

    #[test]
    fn test_parent_segments_stripped() {
        let temp = TempDir::new().unwrap();
        let result = scaffold_project(temp.path(), "Spot", &["../../escape", "/abs/Edit"]).unwrap();

        assert_eq!(
            result.created,
            vec![
                temp.path().join("Spot/escape"),
                temp.path().join("Spot/abs/Edit")
            ]
        );
        assert!(!temp.path().join("escape").exists());
    }

    #[test]
    fn test_invalid_names() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            scaffold_project::<&str>(temp.path(), "   ", &[]),
            Err(ScaffoldError::InvalidName(_))
        ));
        assert!(matches!(
            scaffold_project::<&str>(temp.path(), "a/b", &[]),
            Err(ScaffoldError::InvalidName(_))
        ));
    }
}
