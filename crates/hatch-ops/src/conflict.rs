//! Destination conflicts and how to resolve them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use hatch_core::FileDescriptor;

/// A source file whose destination already existed when the run reached it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEntry {
    /// The source file that was not copied.
    pub source_path: PathBuf,
    /// The existing file at the destination.
    pub dest_path: PathBuf,
    /// Label shown to the user (the relative path).
    pub display_name: String,
    /// Source size at enumeration time.
    pub size: u64,
    /// Path relative to the destination root.
    pub relative_path: PathBuf,
}

impl ConflictEntry {
    /// Create a conflict for `file` landing on `dest_path`.
    pub fn from_descriptor(file: &FileDescriptor, dest_path: PathBuf) -> Self {
        Self {
            source_path: file.absolute_path.clone(),
            dest_path,
            display_name: file.display_name(),
            size: file.size,
            relative_path: file.relative_path.clone(),
        }
    }
}

/// What to do with every conflict of a resolution round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAction {
    /// Copy over the existing file.
    Overwrite,
    /// Leave the existing file and record a skip.
    Skip,
}

/// Check whether anything (file, directory or dangling link) occupies `path`.
pub(crate) fn destination_occupied(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_descriptor() {
        let file = FileDescriptor::new("/card/Shoot/B.mov", "B.mov", 5, "Shoot/B.mov");
        let conflict = ConflictEntry::from_descriptor(&file, PathBuf::from("/dst/Shoot/B.mov"));

        assert_eq!(conflict.display_name, "Shoot/B.mov");
        assert_eq!(conflict.source_path, PathBuf::from("/card/Shoot/B.mov"));
        assert_eq!(conflict.size, 5);
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("overwrite".parse::<ConflictAction>().unwrap(), ConflictAction::Overwrite);
        assert_eq!("SKIP".parse::<ConflictAction>().unwrap(), ConflictAction::Skip);
        assert!("rename".parse::<ConflictAction>().is_err());
        assert_eq!(ConflictAction::Skip.to_string(), "skip");
    }
}
