//! File-backed pattern library behaviour across repository instances.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use uipm::{
    BackendConfig, LayoutMode, PatternRepository, PositionZone, StructureFeatures,
    UpsertPatternRequest,
};

fn library_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("naming-patterns.json")
}

fn open(dir: &TempDir) -> PatternRepository {
    let path = library_path(dir);
    PatternRepository::new(&BackendConfig::file(path.to_string_lossy().to_string()))
        .expect("file backend")
}

fn header() -> StructureFeatures {
    StructureFeatures::new(
        vec!["INSTANCE".into(), "TEXT".into(), "INSTANCE".into()],
        LayoutMode::Horizontal,
        375.0,
        64.0,
        PositionZone::Top,
    )
    .with_child_names(vec!["Back".into(), "Title".into(), "Menu".into()])
}

#[test]
fn first_access_creates_empty_document() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    assert!(repo.get_all_patterns().unwrap().is_empty());

    let raw = fs::read_to_string(library_path(&dir)).expect("document written");
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["patterns"].as_array().unwrap().len(), 0);
    assert_eq!(doc["history"].as_array().unwrap().len(), 0);
}

#[test]
fn patterns_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let created = {
        let repo = open(&dir);
        repo.upsert_pattern(
            UpsertPatternRequest::new("Header/Default", header()).with_source("12:34", "FILEKEY"),
        )
        .unwrap()
    };

    let reopened = open(&dir);
    let loaded = reopened
        .get_pattern_by_name("Header/Default")
        .unwrap()
        .expect("pattern persisted");
    assert_eq!(loaded, created);
    assert_eq!(loaded.source_node_id.as_deref(), Some("12:34"));
}

#[test]
fn document_uses_camel_case_keys() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let pattern = repo
        .upsert_pattern(UpsertPatternRequest::new("Header", header()))
        .unwrap();
    repo.rename_pattern(&pattern.id, "Header/Main").unwrap();

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(library_path(&dir)).unwrap()).unwrap();
    let stored = &doc["patterns"][0];
    assert_eq!(stored["usageCount"], 1);
    assert!(stored["lastUsedAt"].is_string());
    assert_eq!(stored["structure"]["childCount"], 3);
    assert_eq!(stored["structure"]["layoutMode"], "HORIZONTAL");
    assert_eq!(stored["structure"]["positionZone"], "top");
    assert_eq!(doc["history"][0]["fromName"], "Header");
    assert_eq!(doc["history"][0]["toName"], "Header/Main");
}

#[test]
fn unparsable_document_is_replaced_with_empty_store() {
    let dir = TempDir::new().unwrap();
    let path = library_path(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ this is not json").unwrap();

    let repo = open(&dir);
    assert!(repo.get_all_patterns().unwrap().is_empty());

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).expect("rewritten as JSON");
    assert_eq!(doc["version"], 1);
}

#[test]
fn schema_invalid_document_is_replaced_with_empty_store() {
    let dir = TempDir::new().unwrap();
    let path = library_path(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    // Parses as JSON, but the pattern id is not a UUID and the width is negative.
    let bad = serde_json::json!({
        "version": 1,
        "patterns": [{
            "id": "not-a-uuid",
            "name": "Broken",
            "structure": {
                "childCount": 0,
                "childTypes": [],
                "layoutMode": "NONE",
                "width": -5.0,
                "height": 10.0,
                "aspectRatio": 1.0,
                "positionZone": "middle"
            },
            "createdAt": "2024-01-01T00:00:00Z",
            "lastUsedAt": "2024-01-01T00:00:00Z",
            "usageCount": 1
        }],
        "history": []
    });
    fs::write(&path, serde_json::to_vec(&bad).unwrap()).unwrap();

    let repo = open(&dir);
    assert!(repo.get_pattern_by_name("Broken").unwrap().is_none());

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["patterns"].as_array().unwrap().len(), 0);
}

#[test]
fn external_edits_are_seen_after_invalidation() {
    let dir = TempDir::new().unwrap();
    let writer = open(&dir);
    let reader = open(&dir);

    assert!(reader.get_all_patterns().unwrap().is_empty());
    writer
        .upsert_pattern(UpsertPatternRequest::new("Header", header()))
        .unwrap();

    // The reader still serves its cached snapshot.
    assert!(reader.get_all_patterns().unwrap().is_empty());
    reader.invalidate_cache();
    assert_eq!(reader.get_all_patterns().unwrap().len(), 1);
}

#[test]
fn reset_persists_empty_library() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let pattern = repo
        .upsert_pattern(UpsertPatternRequest::new("Header", header()))
        .unwrap();
    repo.rename_pattern(&pattern.id, "Header/Top").unwrap();

    repo.reset().unwrap();

    let reopened = open(&dir);
    let stats = reopened.stats().unwrap();
    assert_eq!(stats.pattern_count, 0);
    assert_eq!(stats.history_count, 0);
}
