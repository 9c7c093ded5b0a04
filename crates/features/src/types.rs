//! Core data model for structural fingerprints.
//!
//! A [`StructureFeatures`] value is always *derived* from a UI element by an
//! external extractor; nothing in this workspace walks a design tree. The
//! JSON shape uses camelCase field names so persisted libraries and wire
//! payloads stay interchangeable with the extractor's output.
//!
//! ```text
//! StructureFeatures
//! ├── childCount: u32
//! ├── childTypes: [String]        (order-significant)
//! ├── childNames: [String]?       (set semantics)
//! ├── layoutMode: HORIZONTAL | VERTICAL | NONE
//! ├── width, height, aspectRatio: f64 > 0
//! ├── positionZone: top | middle | bottom
//! ├── textHints, iconHints: [String]?
//! └── parentName, vectorPathHash, textFingerprint, fillColor: String?, opacity: f64?
//! ```
use serde::{Deserialize, Serialize};

/// Relative vertical centre below which an element sits in the top zone.
pub const TOP_ZONE_THRESHOLD: f64 = 0.15;
/// Relative vertical centre at or above which an element sits in the bottom zone.
pub const BOTTOM_ZONE_THRESHOLD: f64 = 0.85;

/// Auto-layout direction of the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LayoutMode {
    Horizontal,
    Vertical,
    #[default]
    None,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Horizontal => "HORIZONTAL",
            LayoutMode::Vertical => "VERTICAL",
            LayoutMode::None => "NONE",
        }
    }
}

/// Coarse vertical placement of an element relative to its screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PositionZone {
    Top,
    #[default]
    Middle,
    Bottom,
}

impl PositionZone {
    /// Bucket an element by the vertical centre of its bounding box.
    ///
    /// `y` is the top edge of the element and `screen_height` the height of
    /// the containing screen, both in the same units.
    ///
    /// ```rust
    /// use features::PositionZone;
    ///
    /// assert_eq!(PositionZone::from_geometry(0.0, 60.0, 800.0), PositionZone::Top);
    /// assert_eq!(PositionZone::from_geometry(740.0, 60.0, 800.0), PositionZone::Bottom);
    /// ```
    pub fn from_geometry(y: f64, height: f64, screen_height: f64) -> Self {
        let center_y = y + height / 2.0;
        let relative_y = center_y / screen_height;

        if relative_y < TOP_ZONE_THRESHOLD {
            PositionZone::Top
        } else if relative_y >= BOTTOM_ZONE_THRESHOLD {
            PositionZone::Bottom
        } else {
            PositionZone::Middle
        }
    }

    /// True for the neighbouring pairs top/middle and middle/bottom.
    pub fn is_adjacent(&self, other: &PositionZone) -> bool {
        matches!(
            (self, other),
            (PositionZone::Top, PositionZone::Middle)
                | (PositionZone::Middle, PositionZone::Top)
                | (PositionZone::Middle, PositionZone::Bottom)
                | (PositionZone::Bottom, PositionZone::Middle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionZone::Top => "top",
            PositionZone::Middle => "middle",
            PositionZone::Bottom => "bottom",
        }
    }
}

/// Structural fingerprint of one UI element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureFeatures {
    /// Number of direct children.
    pub child_count: u32,
    /// Underlying element types of the direct children, in order.
    pub child_types: Vec<String>,
    /// Suggested names of the direct children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_names: Option<Vec<String>>,
    pub layout_mode: LayoutMode,
    pub width: f64,
    pub height: f64,
    /// `width / height` at extraction time.
    pub aspect_ratio: f64,
    pub position_zone: PositionZone,
    /// Content of child text nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_hints: Option<Vec<String>>,
    /// Names of child icon instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_hints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    /// Shape hash of vector children, formatted `<pathLength>-<digest>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_path_hash: Option<String>,
    /// Text shape fingerprint whose first character is a length bucket (S/M/L).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_fingerprint: Option<String>,
    /// `#RRGGBB` fill colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// Raw geometry and child data used to derive a [`StructureFeatures`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureGeometry {
    pub child_types: Vec<String>,
    pub child_names: Option<Vec<String>>,
    pub layout_mode: LayoutMode,
    pub width: f64,
    pub height: f64,
    /// Top edge of the element within its screen.
    pub y: f64,
    pub screen_height: f64,
    pub text_hints: Option<Vec<String>>,
    pub icon_hints: Option<Vec<String>>,
}

impl StructureFeatures {
    /// Build a fingerprint from raw geometry, deriving `aspectRatio`,
    /// `positionZone` and `childCount`.
    pub fn derive(geometry: FeatureGeometry) -> Self {
        let aspect_ratio = geometry.width / geometry.height;
        let position_zone =
            PositionZone::from_geometry(geometry.y, geometry.height, geometry.screen_height);

        Self {
            child_count: geometry.child_types.len() as u32,
            child_types: geometry.child_types,
            child_names: geometry.child_names,
            layout_mode: geometry.layout_mode,
            width: geometry.width,
            height: geometry.height,
            aspect_ratio,
            position_zone,
            text_hints: geometry.text_hints,
            icon_hints: geometry.icon_hints,
            parent_name: None,
            vector_path_hash: None,
            text_fingerprint: None,
            fill_color: None,
            opacity: None,
        }
    }

    /// Minimal fingerprint with only the required fields set.
    pub fn new(
        child_types: Vec<String>,
        layout_mode: LayoutMode,
        width: f64,
        height: f64,
        position_zone: PositionZone,
    ) -> Self {
        Self {
            child_count: child_types.len() as u32,
            child_types,
            child_names: None,
            layout_mode,
            width,
            height,
            aspect_ratio: width / height,
            position_zone,
            text_hints: None,
            icon_hints: None,
            parent_name: None,
            vector_path_hash: None,
            text_fingerprint: None,
            fill_color: None,
            opacity: None,
        }
    }

    pub fn with_parent_name(mut self, name: impl Into<String>) -> Self {
        self.parent_name = Some(name.into());
        self
    }

    pub fn with_child_names(mut self, names: Vec<String>) -> Self {
        self.child_names = Some(names);
        self
    }

    pub fn with_vector_path_hash(mut self, hash: impl Into<String>) -> Self {
        self.vector_path_hash = Some(hash.into());
        self
    }

    pub fn with_text_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.text_fingerprint = Some(fingerprint.into());
        self
    }
}
