//! Persisted aggregate and its records.
use chrono::{DateTime, Utc};
use features::{validate_name, FieldError, StructureFeatures, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Bump this value whenever the on-disk `PatternStore` layout changes.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// A named, reusable structural template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    /// UUID v4, assigned on creation.
    pub id: String,
    /// Unique key for upserts.
    pub name: String,
    pub structure: StructureFeatures,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub usage_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_key: Option<String>,
}

impl Pattern {
    /// Fresh pattern with `usageCount = 1`.
    pub(crate) fn create(request: UpsertPatternRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            structure: request.structure,
            created_at: now,
            last_used_at: now,
            usage_count: 1,
            source_node_id: request.source_node_id,
            source_file_key: request.source_file_key,
        }
    }

    /// Record one more use at `now`. The counter saturates at `u64::MAX`.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.usage_count = self.usage_count.saturating_add(1);
        self.last_used_at = now;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors: Vec<FieldError> = Vec::new();
        if Uuid::parse_str(&self.id).is_err() {
            errors.push(FieldError::new("id", "must be a UUID"));
        }
        if let Err(err) = validate_name("name", &self.name) {
            errors.extend(err.errors);
        }
        if let Err(err) = self.structure.validate() {
            errors.extend(err.nested("structure").errors);
        }
        ValidationError::check(errors)
    }
}

/// Audit record written whenever a pattern is renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternHistory {
    pub pattern_id: String,
    pub from_name: String,
    pub to_name: String,
    pub changed_at: DateTime<Utc>,
}

/// The whole persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternStore {
    pub version: u32,
    pub patterns: Vec<Pattern>,
    pub history: Vec<PatternHistory>,
}

impl Default for PatternStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl PatternStore {
    pub fn empty() -> Self {
        Self {
            version: STORE_SCHEMA_VERSION,
            patterns: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Schema check for a document read back from a backend.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.version != STORE_SCHEMA_VERSION {
            errors.push(FieldError::new(
                "version",
                format!("expected {STORE_SCHEMA_VERSION}, found {}", self.version),
            ));
        }
        let mut names = HashSet::new();
        for (i, pattern) in self.patterns.iter().enumerate() {
            if let Err(err) = pattern.validate() {
                errors.extend(err.nested(&format!("patterns[{i}]")).errors);
            }
            if !names.insert(pattern.name.as_str()) {
                errors.push(FieldError::new(
                    format!("patterns[{i}].name"),
                    format!("duplicate pattern name {:?}", pattern.name),
                ));
            }
        }
        for (i, entry) in self.history.iter().enumerate() {
            if Uuid::parse_str(&entry.pattern_id).is_err() {
                errors.push(FieldError::new(
                    format!("history[{i}].patternId"),
                    "must be a UUID",
                ));
            }
        }
        ValidationError::check(errors)
    }

    pub(crate) fn position_by_id(&self, id: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.id == id)
    }

    pub(crate) fn position_by_name(&self, name: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.name == name)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            pattern_count: self.patterns.len(),
            history_count: self.history.len(),
            total_usage: self.patterns.iter().map(|p| p.usage_count).sum(),
        }
    }
}

/// Input for [`PatternRepository::upsert_pattern`](crate::PatternRepository::upsert_pattern).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPatternRequest {
    pub name: String,
    pub structure: StructureFeatures,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_key: Option<String>,
}

impl UpsertPatternRequest {
    pub fn new(name: impl Into<String>, structure: StructureFeatures) -> Self {
        Self {
            name: name.into(),
            structure,
            source_node_id: None,
            source_file_key: None,
        }
    }

    pub fn with_source(
        mut self,
        node_id: impl Into<String>,
        file_key: impl Into<String>,
    ) -> Self {
        self.source_node_id = Some(node_id.into());
        self.source_file_key = Some(file_key.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if let Err(err) = validate_name("name", &self.name) {
            errors.extend(err.errors);
        }
        if let Err(err) = self.structure.validate() {
            errors.extend(err.nested("structure").errors);
        }
        ValidationError::check(errors)
    }
}

/// Summary counters for readiness/metadata endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub pattern_count: usize,
    pub history_count: usize,
    pub total_usage: u64,
}
