//! Concurrency and thread safety tests for the pattern library

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;
use uipm::{
    BackendConfig, LayoutMode, MatchOptions, Matcher, PatternRepository, PositionZone,
    StructureFeatures, UpsertPatternRequest,
};

fn structure(children: usize) -> StructureFeatures {
    StructureFeatures::new(
        vec!["TEXT".to_string(); children],
        LayoutMode::Vertical,
        200.0,
        100.0,
        PositionZone::Middle,
    )
}

fn file_repository(dir: &TempDir) -> Arc<PatternRepository> {
    let path = dir.path().join("naming-patterns.json");
    Arc::new(
        PatternRepository::new(&BackendConfig::file(path.to_string_lossy().to_string()))
            .expect("file backend"),
    )
}

#[test]
fn concurrent_upserts_of_distinct_names_lose_nothing() {
    let dir = TempDir::new().unwrap();
    let repo = file_repository(&dir);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                for i in 0..10 {
                    repo.upsert_pattern(UpsertPatternRequest::new(
                        format!("Pattern/{t}-{i}"),
                        structure(i % 4 + 1),
                    ))
                    .expect("upsert should succeed");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let names: HashSet<String> = repo
        .get_all_patterns()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names.len(), 80);

    // What is on disk matches what the cache saw.
    repo.invalidate_cache();
    assert_eq!(repo.get_all_patterns().unwrap().len(), 80);
}

#[test]
fn concurrent_upserts_of_one_name_count_every_use() {
    let dir = TempDir::new().unwrap();
    let repo = file_repository(&dir);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                for _ in 0..5 {
                    repo.upsert_pattern(UpsertPatternRequest::new("Shared", structure(2)))
                        .expect("upsert should succeed");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let patterns = repo.get_all_patterns().unwrap();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].usage_count, 50);
}

#[test]
fn concurrent_usage_and_renames_keep_history_consistent() {
    let dir = TempDir::new().unwrap();
    let repo = file_repository(&dir);
    let id = repo
        .upsert_pattern(UpsertPatternRequest::new("Card", structure(3)))
        .unwrap()
        .id;

    let renamer = {
        let repo = Arc::clone(&repo);
        let id = id.clone();
        thread::spawn(move || {
            for i in 0..20 {
                repo.rename_pattern(&id, &format!("Card/v{i}"))
                    .expect("rename should succeed");
            }
        })
    };
    let users: Vec<_> = (0..4)
        .map(|_| {
            let repo = Arc::clone(&repo);
            let id = id.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    repo.record_pattern_usage(&id).expect("usage should succeed");
                }
            })
        })
        .collect();

    renamer.join().unwrap();
    for user in users {
        user.join().unwrap();
    }

    let pattern = repo.get_pattern_by_id(&id).unwrap().unwrap();
    assert_eq!(pattern.name, "Card/v19");
    assert_eq!(pattern.usage_count, 41);

    let history = repo.get_history(100).unwrap();
    assert_eq!(history.len(), 20);
    assert_eq!(history[0].to_name, "Card/v19");
}

#[test]
fn matching_while_writing_sees_consistent_snapshots() {
    let dir = TempDir::new().unwrap();
    let repo = file_repository(&dir);
    repo.upsert_pattern(UpsertPatternRequest::new("Seed", structure(3)))
        .unwrap();
    let matcher = Arc::new(Matcher::new(Arc::clone(&repo)));

    let writer = {
        let repo = Arc::clone(&repo);
        thread::spawn(move || {
            for i in 0..30 {
                repo.upsert_pattern(UpsertPatternRequest::new(
                    format!("Extra/{i}"),
                    structure(i % 5 + 1),
                ))
                .unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let matcher = Arc::clone(&matcher);
            thread::spawn(move || {
                for _ in 0..20 {
                    let result = matcher
                        .find_similar_patterns(&structure(3), &MatchOptions::default())
                        .expect("match should succeed");
                    assert!(!result.candidates.is_empty());
                    assert!(result.candidates.len() <= 3);
                    assert!((result.candidates[0].score - 1.0).abs() < 1e-9);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(repo.stats().unwrap().pattern_count, 31);
}
