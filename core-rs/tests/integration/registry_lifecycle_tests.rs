//! Integration tests for the complete registry lifecycle
//!
//! Tests the full lifecycle of a project against a real registry file:
//! - Suggestion (registry, .env recovery, next free)
//! - Confirmation and persistence
//! - Listing, orphan cleanup and removal

use sail_core::env_file::setup_env;
use sail_core::project::{confirm_suffix, normalize_project_path};
use sail_core::{
    FileRegistryStore, PortRegistry, PortRole, RegistryStore, SailError, SuggestionSource,
};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

fn file_registry(temp_dir: &TempDir) -> PortRegistry<FileRegistryStore> {
    PortRegistry::new(FileRegistryStore::new(
        temp_dir.path().join(".laravel-sail-ports.json"),
    ))
}

#[test]
fn test_complete_project_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("blog");
    fs::create_dir_all(&project).unwrap();
    let registry = file_registry(&temp_dir);

    // 1. First suggestion on a fresh host
    let suggestion = registry.suggest(&project).unwrap();
    assert_eq!(suggestion.suffix, 1);
    assert!(!suggestion.registry_existed);
    assert!(!suggestion.is_existing_assignment());

    // 2. Confirm and persist
    registry.save_project_suffix(&project, 48).unwrap();
    assert!(registry.store().path().exists());

    // 3. Same project gets its suffix back
    let again = registry.suggest(&project).unwrap();
    assert_eq!(again.suffix, 48);
    assert_eq!(again.source, SuggestionSource::Registry);
    assert!(again.registry_existed);

    // 4. A second project gets the next one
    let shop = temp_dir.path().join("shop");
    fs::create_dir_all(&shop).unwrap();
    assert_eq!(registry.suggest(&shop).unwrap().suffix, 49);

    // 5. Listing shows the entry with live ports
    let entries = registry.list_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].port(PortRole::App), 8048);
    assert!(entries[0].exists_on_disk);

    // 6. Remove it
    assert_eq!(registry.remove_project(&project).unwrap(), 48);
    assert!(registry.list_all().unwrap().is_empty());

    // 7. High-water mark keeps counting
    assert_eq!(registry.suggest(&shop).unwrap().suffix, 49);
}

#[test]
fn test_env_written_by_setup_is_recovered_after_registry_loss() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("api");
    fs::create_dir_all(&project).unwrap();

    setup_env(&project, 77, false).unwrap();

    // Registry file deleted or never synced: the .env still knows the suffix
    let registry = file_registry(&temp_dir);
    let suggestion = registry.suggest(&project).unwrap();
    assert_eq!(suggestion.suffix, 77);
    assert_eq!(suggestion.source, SuggestionSource::EnvFile);
}

#[test]
fn test_oversized_suffix_is_refused_before_save() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("legacy");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join(".env"), "APP_PORT=99999\n").unwrap();

    let registry = file_registry(&temp_dir);
    let suggestion = registry.suggest(&project).unwrap();
    assert_eq!(suggestion.suffix, 91999);
    assert_eq!(suggestion.source, SuggestionSource::EnvFile);

    // Enter, then input ends: nothing valid was confirmed
    let mut input = Cursor::new(b"\n".to_vec());
    let mut output = Vec::new();
    let result = confirm_suffix(&registry, &project, &suggestion, &mut input, &mut output);
    assert!(matches!(result, Err(SailError::SuffixOutOfRange(_))));
    assert!(!registry.store().path().exists());

    // A typed suffix after the refusal is accepted
    let mut input = Cursor::new(b"\n60\n".to_vec());
    let mut output = Vec::new();
    let confirmed =
        confirm_suffix(&registry, &project, &suggestion, &mut input, &mut output).unwrap();
    assert_eq!(confirmed, 60);
}

#[test]
fn test_collision_between_projects() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a");
    let b = temp_dir.path().join("b");
    let c = temp_dir.path().join("c");
    let registry = file_registry(&temp_dir);

    registry.save_project_suffix(&a, 51).unwrap();
    registry.save_project_suffix(&b, 52).unwrap();

    let (stored, _) = registry.load().unwrap();
    assert_eq!(stored.high_water_mark, 52);

    assert_eq!(
        registry.find_conflict(&c, 51).unwrap(),
        Some(normalize_project_path(&a).unwrap())
    );
    assert_eq!(registry.find_conflict(&a, 51).unwrap(), None);
    assert!(matches!(
        registry.ensure_available(&c, 52),
        Err(SailError::SuffixCollision { suffix: 52, .. })
    ));
}

#[test]
fn test_orphan_cleanup_against_real_directories() {
    let temp_dir = TempDir::new().unwrap();
    let keep = temp_dir.path().join("keep");
    let gone = temp_dir.path().join("gone");
    fs::create_dir_all(&keep).unwrap();
    fs::create_dir_all(&gone).unwrap();

    let registry = file_registry(&temp_dir);
    registry.save_project_suffix(&keep, 10).unwrap();
    registry.save_project_suffix(&gone, 11).unwrap();

    fs::remove_dir_all(&gone).unwrap();

    let removed = registry.remove_orphans().unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].path, normalize_project_path(&gone).unwrap());

    // Persisted: a fresh handle on the same file sees the pruned registry
    let reopened = file_registry(&temp_dir);
    let entries = reopened.list_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].suffix, 10);

    assert!(reopened.remove_orphans().unwrap().is_empty());
}

#[test]
fn test_remove_unregistered_leaves_file_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let registry = file_registry(&temp_dir);
    registry
        .save_project_suffix(&temp_dir.path().join("a"), 3)
        .unwrap();
    let before = fs::read_to_string(registry.store().path()).unwrap();

    let result = registry.remove_project(&temp_dir.path().join("never"));
    assert!(matches!(result, Err(SailError::ProjectNotRegistered(_))));
    assert_eq!(fs::read_to_string(registry.store().path()).unwrap(), before);
}

#[test]
fn test_corrupt_registry_blocks_every_operation() {
    let temp_dir = TempDir::new().unwrap();
    let registry = file_registry(&temp_dir);
    fs::write(registry.store().path(), "[1, 2").unwrap();

    let project = temp_dir.path().join("a");
    assert!(matches!(registry.suggest(&project), Err(SailError::StoreRead { .. })));
    assert!(registry.save_project_suffix(&project, 5).is_err());
    assert!(registry.list_all().is_err());
    assert!(registry.remove_orphans().is_err());

    // Nothing overwrote the corrupt file
    assert_eq!(fs::read_to_string(registry.store().path()).unwrap(), "[1, 2");
}

#[test]
fn test_store_load_reports_existence() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileRegistryStore::new(temp_dir.path().join("ports.json"));
    assert!(!store.load().unwrap().1);

    let registry = PortRegistry::new(store);
    registry
        .save_project_suffix(&temp_dir.path().join("x"), 1)
        .unwrap();
    assert!(registry.store().load().unwrap().1);
}
