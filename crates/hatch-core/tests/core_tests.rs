use hatch_core::{
    FileDescriptor, IngestConfig, ProjectMetadata, ScanConfig, ScanError, ScanWarning, Settings,
    StructureNode, VerifyMode, WarningKind,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_descriptor_serializes_camel_case() {
    let file = FileDescriptor::new("/card/Shoot/A.mov", "A.mov", 10_485_760, "Shoot/A.mov");
    let json = serde_json::to_value(&file).unwrap();

    assert_eq!(json["absolutePath"], "/card/Shoot/A.mov");
    assert_eq!(json["relativePath"], "Shoot/A.mov");
    assert_eq!(json["size"], 10_485_760);
}

#[test]
fn test_descriptor_source_root() {
    let nested = FileDescriptor::new("/card/Shoot/Day1/A.mov", "A.mov", 1, "Shoot/Day1/A.mov");
    assert_eq!(nested.source_root(), Some(PathBuf::from("/card")));

    let single = FileDescriptor::new("/card/A.mov", "A.mov", 1, "A.mov");
    assert_eq!(single.source_root(), Some(PathBuf::from("/card")));
}

#[test]
fn test_structure_node_relative_folders() {
    let mut root = StructureNode::new("Spot", "/p/Spot");
    let mut footage = StructureNode::new("Footage", "/p/Spot/Footage");
    footage
        .children
        .push(StructureNode::new("A-Cam", "/p/Spot/Footage/A-Cam"));
    root.children.push(footage);
    root.children.push(StructureNode::new("Audio", "/p/Spot/Audio"));

    assert_eq!(root.folder_count(), 3);
    assert!(!root.is_leaf());
    assert_eq!(
        root.relative_folders(),
        vec![
            PathBuf::from("Footage"),
            PathBuf::from("Footage/A-Cam"),
            PathBuf::from("Audio"),
        ]
    );
}

#[test]
fn test_metadata_skips_unset_fields() {
    let meta = ProjectMetadata {
        client_name: Some("Acme".into()),
        ..ProjectMetadata::named("Launch")
    };
    let json = serde_json::to_value(&meta).unwrap();

    assert_eq!(json["projectName"], "Launch");
    assert_eq!(json["clientName"], "Acme");
    assert!(json.get("date").is_none());
}

#[test]
fn test_scan_config_rejects_blank_pattern() {
    let result = ScanConfig::builder()
        .ignore_patterns(vec!["*.tmp".to_string(), " ".to_string()])
        .build();
    assert!(result.is_err());
}

#[test]
fn test_ingest_config_builder() {
    let config = IngestConfig::builder()
        .verify(VerifyMode::Checksum)
        .build()
        .unwrap();
    assert_eq!(config.verify, VerifyMode::Checksum);
    assert!(config.preserve_timestamps);
    assert_eq!("CHECKSUM".parse::<VerifyMode>().unwrap(), VerifyMode::Checksum);
}

#[test]
fn test_settings_roundtrip_through_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("hatch/settings.toml");

    let settings = Settings {
        scan: ScanConfig {
            ignore_patterns: vec!["Thumbs.db".into()],
            ..Default::default()
        },
        ingest: IngestConfig {
            verify: VerifyMode::Checksum,
            preserve_timestamps: false,
        },
        log_path: Some(temp.path().join("logs.json")),
    };
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded.scan.ignore_patterns, vec!["Thumbs.db".to_string()]);
    assert_eq!(loaded.ingest.verify, VerifyMode::Checksum);
    assert!(!loaded.ingest.preserve_timestamps);
    assert_eq!(loaded.log_path(), Some(temp.path().join("logs.json")));
}

#[test]
fn test_settings_partial_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.toml");
    std::fs::write(&path, "[ingest]\nverify = \"checksum\"\n").unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded.ingest.verify, VerifyMode::Checksum);
    assert!(loaded.ingest.preserve_timestamps);
    assert!(!loaded.scan.include_hidden);
}

#[test]
fn test_scan_error_kind_mapping() {
    let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    assert!(matches!(
        ScanError::io("/card", denied),
        ScanError::PermissionDenied { .. }
    ));

    let gone = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let warning = ScanWarning::from_io(Path::new("/card/A.mov"), &gone);
    assert_eq!(warning.kind, WarningKind::NotFound);
    assert!(warning.message.starts_with("/card/A.mov"));
}
