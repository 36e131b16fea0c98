//! Tests for SetStore
//!
//! These tests verify:
//! - get/set/add/update semantics and set idempotence
//! - Delimiter handling and integer-valued stores
//! - Full-store scans with lazy member sequences
//! - reset/destroy and unopened-handle errors

use std::collections::HashSet;

use snvmap::config::StoreConfig;
use snvmap::hashset::SetStore;
use snvmap::StoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, SetStore) {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder().data_root(temp_dir.path()).build();
    let store = SetStore::open_named(&config, "sets").unwrap();
    (temp_dir, store)
}

fn setup_integer_store() -> (TempDir, SetStore) {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder()
        .data_root(temp_dir.path())
        .integer_values(true)
        .build();
    let store = SetStore::open_named(&config, "ids").unwrap();
    (temp_dir, store)
}

fn set_of(members: &[&str]) -> HashSet<String> {
    members.iter().map(|m| m.to_string()).collect()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_store_gene_scenario() {
    let (_temp, store) = setup_temp_store();

    store.add("tp53", "oligomerization domain").unwrap();
    store.add("brca2", "cancer").unwrap();
    store.update("brca2", ["breast", "DNA repair"]).unwrap();

    assert_eq!(store.members("tp53").unwrap(), set_of(&["oligomerization domain"]));
    assert_eq!(
        store.members("brca2").unwrap(),
        set_of(&["cancer", "breast", "DNA repair"])
    );
    assert_eq!(store.len().unwrap(), 2);
}

#[test]
fn test_store_absent_key_is_empty() {
    let (_temp, store) = setup_temp_store();

    assert!(store.members("missing").unwrap().is_empty());
    assert!(store.get("missing").unwrap().is_empty());
    assert!(!store.contains_key("missing").unwrap());
}

#[test]
fn test_store_add_is_idempotent() {
    let (_temp, store) = setup_temp_store();

    store.add("key", "member").unwrap();
    store.add("key", "member").unwrap();

    assert_eq!(store.members("key").unwrap().len(), 1);
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_store_set_replaces() {
    let (_temp, store) = setup_temp_store();

    store.update("key", ["a", "b"]).unwrap();
    store.set("key", &set_of(&["c"])).unwrap();

    assert_eq!(store.members("key").unwrap(), set_of(&["c"]));
}

#[test]
fn test_store_set_empty_creates_key() {
    let (_temp, store) = setup_temp_store();

    store.set("key", &HashSet::new()).unwrap();

    assert!(store.contains_key("key").unwrap());
    assert!(store.members("key").unwrap().is_empty());
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_store_skips_empty_fragments() {
    let (_temp, store) = setup_temp_store();

    store.engine().put(b"key", b"|a||b|").unwrap();

    assert_eq!(store.members("key").unwrap(), set_of(&["a", "b"]));
}

#[test]
#[should_panic(expected = "reserved delimiter")]
fn test_store_rejects_delimiter_in_member() {
    let (_temp, store) = setup_temp_store();

    let _ = store.add("key", "bad|member");
}

#[test]
fn test_store_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder().data_root(temp_dir.path()).build();

    {
        let store = SetStore::open_named(&config, "sets").unwrap();
        store.update("key", ["a", "b"]).unwrap();
        store.close().unwrap();
    }

    let store = SetStore::open_named(&config, "sets").unwrap();
    assert_eq!(store.members("key").unwrap(), set_of(&["a", "b"]));
}

// =============================================================================
// Integer Values Tests
// =============================================================================

#[test]
fn test_integer_store_round_trip() {
    let (_temp, store) = setup_integer_store();

    store.add_integer("NM_000546", 1).unwrap();
    store.update_integers("NM_000546", [2, 3, 1]).unwrap();

    let expected: HashSet<i64> = [1, 2, 3].into_iter().collect();
    assert_eq!(store.get_integers("NM_000546").unwrap(), expected);
    assert_eq!(store.members("NM_000546").unwrap(), set_of(&["1", "2", "3"]));
}

#[test]
fn test_integer_store_set_integers() {
    let (_temp, store) = setup_integer_store();

    store.update_integers("key", [7, 8]).unwrap();
    let replacement: HashSet<i64> = [42].into_iter().collect();
    store.set_integers("key", &replacement).unwrap();

    assert_eq!(store.get_integers("key").unwrap(), replacement);
}

#[test]
#[should_panic(expected = "not a decimal integer")]
fn test_integer_store_rejects_text_member() {
    let (_temp, store) = setup_integer_store();

    let _ = store.add("key", "abc");
}

#[test]
fn test_get_integers_on_text_member_is_corrupt() {
    let (_temp, store) = setup_temp_store();
    store.add("key", "abc").unwrap();

    assert!(matches!(
        store.get_integers("key"),
        Err(StoreError::CorruptRecord(_))
    ));
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_store_iter_items() {
    let (_temp, store) = setup_temp_store();
    store.update("a", ["1", "2"]).unwrap();
    store.add("b", "3").unwrap();

    let items: Vec<(String, HashSet<String>)> = store
        .iter_items()
        .unwrap()
        .map(|item| {
            let (key, members) = item.unwrap();
            (key, members.collect())
        })
        .collect();

    assert_eq!(
        items,
        vec![
            ("a".to_string(), set_of(&["1", "2"])),
            ("b".to_string(), set_of(&["3"])),
        ]
    );
}

#[test]
fn test_store_iter_values_is_lazy() {
    let (_temp, store) = setup_temp_store();
    store.update("a", ["x", "y", "z"]).unwrap();

    let mut values = store.iter_values().unwrap();
    let mut members = values.next().unwrap().unwrap();

    assert_eq!(members.raw().matches('|').count(), 2);
    let first = members.next().unwrap();
    assert!(["x", "y", "z"].contains(&first.as_str()));
    assert_eq!(members.count(), 2);
    assert!(values.next().is_none());
}

// =============================================================================
// Administration Tests
// =============================================================================

#[test]
fn test_store_reset() {
    let (_temp, store) = setup_temp_store();
    store.add("key", "member").unwrap();

    store.reset().unwrap();

    assert!(store.is_open());
    assert!(store.path().exists());
    assert_eq!(store.len().unwrap(), 0);
}

#[test]
fn test_store_destroy() {
    let (_temp, store) = setup_temp_store();
    store.add("key", "member").unwrap();

    store.destroy().unwrap();

    assert!(!store.path().exists());
    assert!(matches!(store.members("key"), Err(StoreError::StoreNotOpened)));
}

#[test]
fn test_store_destroy_unopened_handle() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder().data_root(temp_dir.path()).build();
    let store = SetStore::open_named(&config, "sets").unwrap();
    store.add("key", "member").unwrap();
    store.close().unwrap();

    let fresh = SetStore::new(config.store_path("sets"), config.clone());
    fresh.destroy().unwrap();

    assert!(!fresh.is_open());
    assert!(!config.store_path("sets").exists());
}

#[test]
fn test_store_reset_unopened_handle() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder().data_root(temp_dir.path()).build();
    let store = SetStore::open_named(&config, "sets").unwrap();
    store.add("key", "member").unwrap();
    store.close().unwrap();

    let fresh = SetStore::new(config.store_path("sets"), config);
    fresh.reset().unwrap();

    assert!(fresh.is_open());
    assert_eq!(fresh.len().unwrap(), 0);
}

#[test]
fn test_unopened_store_errors() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder().data_root(temp_dir.path()).build();
    let store = SetStore::new(config.store_path("sets"), config);

    assert!(matches!(store.members("key"), Err(StoreError::StoreNotOpened)));
    assert!(matches!(store.get("key"), Err(StoreError::StoreNotOpened)));
    assert!(matches!(store.add("key", "m"), Err(StoreError::StoreNotOpened)));
    assert!(matches!(
        store.set("key", &set_of(&["m"])),
        Err(StoreError::StoreNotOpened)
    ));
    assert!(matches!(store.len(), Err(StoreError::StoreNotOpened)));
    assert!(matches!(store.iter_items(), Err(StoreError::StoreNotOpened)));
    assert!(matches!(store.iter_values(), Err(StoreError::StoreNotOpened)));
}
