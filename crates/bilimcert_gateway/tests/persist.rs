use std::fs;

use bilimcert_gateway::{ensure_state_dir, AtomicFileWriter, FileTokenStore, TokenPair, TokenStore};
use tempfile::TempDir;

#[test]
fn creates_missing_state_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_state_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("prefs.ron", "hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "prefs.ron");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("prefs.ron", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("prefs.ron", "data").is_err());
    assert!(!file_path.with_file_name("prefs.ron").exists());
}

#[test]
fn file_token_store_survives_reopen_and_clears() {
    let temp = TempDir::new().unwrap();
    let store = FileTokenStore::new(temp.path().to_path_buf());
    assert!(store.load().is_none());

    store
        .save(&TokenPair::new("access-1", Some("refresh-1".into())))
        .unwrap();

    let reopened = FileTokenStore::new(temp.path().to_path_buf());
    let tokens = reopened.load().unwrap();
    assert_eq!(tokens.access, "access-1");
    assert_eq!(tokens.refresh.as_deref(), Some("refresh-1"));

    reopened.clear().unwrap();
    assert!(!reopened.path().exists());
    // Clearing twice is fine.
    reopened.clear().unwrap();
}

#[test]
fn corrupt_token_file_reads_as_signed_out() {
    let temp = TempDir::new().unwrap();
    let store = FileTokenStore::new(temp.path().to_path_buf());
    fs::write(store.path(), "{not json").unwrap();
    assert!(store.load().is_none());
}
