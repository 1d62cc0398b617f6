use flamehook::aggregator::FlatStack;
use flamehook::output::{validate_path, write_folded};
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn test_write_folded_format() {
    let temp_file = NamedTempFile::new().unwrap();
    let stacks = vec![
        FlatStack::new("root;LUA:main", 0),
        FlatStack::new("root;LUA:main;C:luaB_print", 18446744073709551615),
    ];

    write_folded(&stacks, temp_file.path()).unwrap();

    assert_eq!(
        std::fs::read_to_string(temp_file.path()).unwrap(),
        "root;LUA:main 0\nroot;LUA:main;C:luaB_print 18446744073709551615\n"
    );
}

#[test]
fn test_write_empty_report_creates_empty_file() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "old\n").unwrap();

    write_folded(&[], temp_file.path()).unwrap();

    assert!(std::fs::read_to_string(temp_file.path()).unwrap().is_empty());
}

#[test]
fn test_validate_output_path_empty() {
    let result = validate_path(Path::new(""));
    assert!(result.is_err());
}

#[test]
fn test_validate_output_path_directory() {
    // Try to write to a directory path
    let temp_dir = tempfile::tempdir().unwrap();
    let result = validate_path(temp_dir.path());
    assert!(result.is_err());
}

#[test]
fn test_missing_parent_directory_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let nested_path = temp_dir.path().join("nested/dirs/stacks.fg");

    assert!(write_folded(&[FlatStack::new("root;LUA:a", 1)], &nested_path).is_err());
    assert!(!nested_path.exists());
}
