use hatch_scan::{read_structure, scan_paths, ScanConfig, SourceEnumerator, WarningKind};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn card() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("Shoot/Day1")).unwrap();
    fs::create_dir_all(root.join("Shoot/.cache")).unwrap();
    fs::write(root.join("Shoot/A.mov"), vec![0u8; 1000]).unwrap();
    fs::write(root.join("Shoot/Day1/B.mov"), vec![0u8; 500]).unwrap();
    fs::write(root.join("Shoot/.DS_Store"), b"x").unwrap();
    fs::write(root.join("Shoot/.cache/thumb.jpg"), b"x").unwrap();
    fs::write(root.join("Shoot/Day1/C.tmp"), b"x").unwrap();
    fs::write(root.join("notes.txt"), b"hello").unwrap();
    temp
}

#[test]
fn test_mixed_selection_preserves_folder_names() {
    let temp = card();
    let shoot = temp.path().join("Shoot");
    let notes = temp.path().join("notes.txt");

    let files = scan_paths(&[notes, shoot]);
    let relative: Vec<PathBuf> = files.iter().map(|f| f.relative_path.clone()).collect();

    assert_eq!(
        relative,
        vec![
            PathBuf::from("notes.txt"),
            PathBuf::from("Shoot/A.mov"),
            PathBuf::from("Shoot/Day1/B.mov"),
            PathBuf::from("Shoot/Day1/C.tmp"),
        ]
    );
    assert!(files.iter().all(|f| f.absolute_path.is_absolute()));
}

#[test]
fn test_ignore_patterns_and_total_size() {
    let temp = card();
    let config = ScanConfig::builder()
        .ignore_patterns(vec!["*.tmp".to_string()])
        .build()
        .unwrap();
    let enumerator = SourceEnumerator::with_config(config).unwrap();

    let result = enumerator.enumerate(&[temp.path().join("Shoot")]);

    assert_eq!(result.files.len(), 2);
    assert_eq!(result.total_size(), 1500);
    assert!(!result.has_warnings());
}

#[test]
fn test_missing_path_is_warning_and_others_continue() {
    let temp = card();
    let enumerator = SourceEnumerator::new();

    let result = enumerator.enumerate(&[temp.path().join("gone"), temp.path().join("notes.txt")]);

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::NotFound);
}

#[test]
fn test_repeated_paths_are_not_deduplicated() {
    let temp = card();
    let notes = temp.path().join("notes.txt");

    let files = scan_paths(&[notes.clone(), notes]);
    assert_eq!(files.len(), 2);
}

#[test]
fn test_structure_preview_lists_folders_only() {
    let temp = card();

    let tree = read_structure(&temp.path().join("Shoot")).unwrap();

    assert_eq!(tree.name.as_str(), "Shoot");
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].name.as_str(), "Day1");
    assert!(tree.children[0].is_leaf());
}
