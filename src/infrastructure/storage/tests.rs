//! Keyed store and file backend tests

use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::domain::entities::KeywordEntry;

fn backend(dir: &tempfile::TempDir) -> Arc<FileBackend> {
    Arc::new(FileBackend::new(dir.path()))
}

#[tokio::test]
async fn test_keys_are_case_and_whitespace_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = KeyedStore::new(StoreKind::Emotes, ScopeId(1), backend(&dir));

    store.set(" Foo ", json!("x"));

    assert_eq!(store.get("foo").unwrap(), &json!("x"));
    assert_eq!(store.get("FOO").unwrap(), &json!("x"));
    assert!(store.contains("  fOo"));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_add_rejects_existing_normalized_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = KeyedStore::new(StoreKind::Emotes, ScopeId(1), backend(&dir));

    store.add("Shrug", json!("¯\\_(ツ)_/¯")).unwrap();
    let err = store.add(" shrug", json!("other")).unwrap_err();

    assert!(matches!(err, StorageError::KeyExists(ref key) if key == "shrug"));
    assert_eq!(store.get("shrug").unwrap(), &json!("¯\\_(ツ)_/¯"));
}

#[tokio::test]
async fn test_missing_keys_report_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = KeyedStore::new(StoreKind::Emotes, ScopeId(1), backend(&dir));

    assert!(matches!(store.get("nope"), Err(StorageError::KeyNotFound(_))));
    assert!(matches!(store.delete("nope"), Err(StorageError::KeyNotFound(_))));
}

#[tokio::test]
async fn test_sorted_text_list() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = KeyedStore::new(StoreKind::Emotes, ScopeId(1), backend(&dir));

    store.set("zebra", json!(""));
    store.set("Apple", json!(""));
    store.set("mango", json!(""));

    assert_eq!(store.as_sorted_text_list(), "apple, mango, zebra");
}

#[tokio::test]
async fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(&dir);

    let mut store = KeyedStore::open(StoreKind::Keywords, ScopeId(42), backend.clone()).await.unwrap();
    assert!(store.is_empty());
    store.set_as("Hello", &KeywordEntry::with_reaction("👍")).unwrap();
    store.set_as("bye", &KeywordEntry { reactions: vec![], count: 7 }).unwrap();
    store.set("  Third ", json!({"reactions": ["a", "b"], "count": 1}));
    assert!(store.save().await.unwrap());

    let reloaded = KeyedStore::open(StoreKind::Keywords, ScopeId(42), backend).await.unwrap();
    assert_eq!(reloaded.keys().collect::<Vec<_>>(), vec!["bye", "hello", "third"]);
    let hello: KeywordEntry = reloaded.get_as("hello").unwrap();
    assert_eq!(hello.reactions, vec!["👍".to_string()]);
    let bye: KeywordEntry = reloaded.get_as("BYE").unwrap();
    assert_eq!(bye.count, 7);
}

#[tokio::test]
async fn test_files_are_pretty_printed_with_sorted_keys() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(&dir);
    let mut store = KeyedStore::new(StoreKind::Emotes, ScopeId(3), backend.clone());
    store.set("b", json!("2"));
    store.set("a", json!("1"));
    store.save().await.unwrap();

    let raw = std::fs::read_to_string(backend.path_for(StoreKind::Emotes, ScopeId(3))).unwrap();
    assert_eq!(raw, "{\n    \"a\" : \"1\",\n    \"b\" : \"2\"\n}");
}

#[tokio::test]
async fn test_nested_values_and_non_ascii_are_written_escaped() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(&dir);
    let mut store = KeyedStore::new(StoreKind::Keywords, ScopeId(3), backend.clone());
    store.set("café", json!({"count": 1, "reactions": ["👍"]}));
    store.save().await.unwrap();

    let raw = std::fs::read_to_string(backend.path_for(StoreKind::Keywords, ScopeId(3))).unwrap();
    assert_eq!(
        raw,
        r#"{
    "caf\u00e9" : {
        "count" : 1,
        "reactions" : [
            "\ud83d\udc4d"
        ]
    }
}"#
    );

    let reloaded = KeyedStore::open(StoreKind::Keywords, ScopeId(3), backend).await.unwrap();
    assert_eq!(reloaded.get("CAFÉ").unwrap(), &json!({"count": 1, "reactions": ["👍"]}));
}

#[test]
fn test_keys_fold_with_plain_lowercasing() {
    assert_eq!(normalize_key(" ÉCOLE "), "école");
    assert_eq!(normalize_key("Straße"), "straße");
    assert_ne!(normalize_key("Straße"), normalize_key("STRASSE"));
}

#[tokio::test]
async fn test_load_creates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(&dir);

    let store = KeyedStore::open(StoreKind::Emotes, ScopeId(9), backend.clone()).await.unwrap();

    assert!(store.is_empty());
    let raw = std::fs::read_to_string(backend.path_for(StoreKind::Emotes, ScopeId(9))).unwrap();
    assert_eq!(raw, "{}");
}

#[tokio::test]
async fn test_empty_store_never_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(&dir);
    let path = backend.path_for(StoreKind::Emotes, ScopeId(5));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let original = "{\"keep\": \"me\"}";
    std::fs::write(&path, original).unwrap();

    let store = KeyedStore::new(StoreKind::Emotes, ScopeId(5), backend);
    let written = store.save().await.unwrap();

    assert!(!written);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[tokio::test]
async fn test_load_rejects_non_object_documents() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(&dir);
    let path = backend.path_for(StoreKind::Emotes, ScopeId(6));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let result = KeyedStore::open(StoreKind::Emotes, ScopeId(6), backend).await;

    assert!(matches!(result, Err(StorageError::InvalidDocument { .. })));
}

#[tokio::test]
async fn test_scoped_stores_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let stores = ScopedStores::new(StoreKind::Emotes, backend(&dir));

    stores.open(ScopeId(1)).await.unwrap().lock().await.set("a", json!("1"));
    stores.open(ScopeId(2)).await.unwrap().lock().await.set("b", json!("2"));
    stores.open(ScopeId(2)).await.unwrap().lock().await.set("c", json!("3"));

    assert_eq!(stores.scopes().await, vec![ScopeId(1), ScopeId(2)]);
    assert_eq!(stores.total_entries().await, 3);
    assert!(!stores.get(ScopeId(1)).await.unwrap().lock().await.contains("b"));
    assert!(stores.get(ScopeId(3)).await.is_none());
}
