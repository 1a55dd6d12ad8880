//! Project metadata attached to ingest runs.

use serde::{Deserialize, Serialize};

/// Descriptive fields of the project an ingest belongs to.
///
/// Stored flattened into every log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ProjectMetadata {
    /// Metadata with only a project name.
    pub fn named(project_name: impl Into<String>) -> Self {
        Self {
            project_name: Some(project_name.into()),
            ..Default::default()
        }
    }

    /// Project name for display, with a placeholder when unset.
    pub fn display_name(&self) -> &str {
        self.project_name.as_deref().unwrap_or("Unnamed Project")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(ProjectMetadata::default().display_name(), "Unnamed Project");
        assert_eq!(ProjectMetadata::named("Launch Film").display_name(), "Launch Film");
    }

    #[test]
    fn test_unset_fields_not_serialized() {
        let json = serde_json::to_string(&ProjectMetadata::named("Spot")).unwrap();
        assert_eq!(json, r#"{"projectName":"Spot"}"#);
    }
}
