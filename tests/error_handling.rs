use uipm::{
    ConfigLoadError, LayoutMode, MatchError, MatchOptions, PositionZone, StoreError,
    StructureFeatures, Uipm, UipmConfig, UipmError, UpsertPatternRequest, Weights,
};

fn base_structure() -> StructureFeatures {
    StructureFeatures::new(
        vec!["TEXT".into(), "INSTANCE".into()],
        LayoutMode::Horizontal,
        160.0,
        40.0,
        PositionZone::Middle,
    )
}

#[test]
fn blank_name_is_rejected_before_write() {
    let uipm = Uipm::in_memory();
    let result = uipm.save_pattern(UpsertPatternRequest::new("   ", base_structure()));

    match result {
        Err(UipmError::Store(StoreError::Validation(err))) => {
            assert_eq!(err.errors[0].field, "name");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(uipm.repository().stats().unwrap().pattern_count, 0);
}

#[test]
fn every_invalid_structure_field_is_reported() {
    let uipm = Uipm::in_memory();
    let mut structure = base_structure();
    structure.width = 0.0;
    structure.height = f64::NAN;
    structure.opacity = Some(2.0);

    let Err(UipmError::Store(StoreError::Validation(err))) =
        uipm.save_pattern(UpsertPatternRequest::new("Chip", structure))
    else {
        panic!("expected validation error");
    };
    let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"structure.width"));
    assert!(fields.contains(&"structure.height"));
    assert!(fields.contains(&"structure.opacity"));
}

#[test]
fn rename_onto_taken_name_conflicts() {
    let uipm = Uipm::in_memory();
    let chip = uipm
        .save_pattern(UpsertPatternRequest::new("Chip", base_structure()))
        .unwrap();
    uipm.save_pattern(UpsertPatternRequest::new("Tag", base_structure()))
        .unwrap();

    let err = uipm.repository().rename_pattern(&chip.id, "Tag").unwrap_err();
    assert_eq!(err, StoreError::NameConflict("Tag".into()));

    // Renaming to its own current name is allowed and recorded.
    let same = uipm.repository().rename_pattern(&chip.id, "Chip").unwrap();
    assert_eq!(same.map(|p| p.name).as_deref(), Some("Chip"));
}

#[test]
fn unknown_ids_are_not_errors() {
    let uipm = Uipm::in_memory();
    let repo = uipm.repository();
    let missing = "00000000-0000-4000-8000-000000000000";

    assert!(repo.get_pattern_by_id(missing).unwrap().is_none());
    assert!(!repo.delete_pattern(missing).unwrap());
    assert!(repo.record_pattern_usage(missing).unwrap().is_none());
    assert!(repo.rename_pattern(missing, "Anything").unwrap().is_none());
    assert!(repo.get_history(10).unwrap().is_empty());
}

#[test]
fn invalid_match_options_are_rejected() {
    let uipm = Uipm::in_memory();
    let zero_limit = MatchOptions::default().with_limit(0);
    assert!(matches!(
        uipm.suggest_with(&base_structure(), &zero_limit),
        Err(UipmError::Match(MatchError::InvalidOptions(_)))
    ));

    let bad_score = MatchOptions::default().with_min_score(-0.1);
    assert!(matches!(
        uipm.suggest_with(&base_structure(), &bad_score),
        Err(UipmError::Match(MatchError::InvalidOptions(_)))
    ));
}

#[test]
fn empty_library_yields_empty_result() {
    let uipm = Uipm::in_memory();
    let result = uipm.suggest(&base_structure()).unwrap();
    assert!(result.candidates.is_empty());
    assert!(!result.has_exact_match);
}

#[test]
fn unbalanced_weights_are_rejected_by_matcher() {
    let uipm = Uipm::in_memory();
    let weights = Weights {
        child_count: 1.0,
        ..Weights::default()
    };
    let matcher = uipm::Matcher::new(uipm.repository().clone());
    assert!(matches!(
        matcher.with_weights(weights),
        Err(MatchError::InvalidWeights(_))
    ));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = UipmConfig::from_yaml("version: [unterminated").unwrap_err();
    assert!(matches!(err, ConfigLoadError::YamlParse(_)));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = UipmConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigLoadError::FileRead(_)));
}
