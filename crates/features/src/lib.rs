//! UIPM Features
//!
//! The data model every other crate in the workspace speaks: a compact
//! structural fingerprint of a UI element ([`StructureFeatures`]) plus the
//! schema checks applied before a fingerprint is matched or persisted.
//!
//! ## What lives here
//!
//! - **Fingerprint types** - child count/types/names, layout direction, size,
//!   aspect ratio, coarse screen position and optional text/icon/colour hints.
//! - **Derivation helpers** - [`PositionZone::from_geometry`] and
//!   [`StructureFeatures::derive`] turn raw geometry into a fingerprint with
//!   the 0.15 / 0.85 zone thresholds applied.
//! - **Validation** - [`StructureFeatures::validate`] reports every offending
//!   field at once through [`ValidationError`].
//!
//! How fingerprints are extracted from a design tree is not this crate's
//! concern.
//!
//! ## Example
//!
//! ```
//! use features::{FeatureGeometry, LayoutMode, PositionZone, StructureFeatures};
//!
//! let features = StructureFeatures::derive(FeatureGeometry {
//!     child_types: vec!["INSTANCE".into(), "TEXT".into()],
//!     layout_mode: LayoutMode::Horizontal,
//!     width: 200.0,
//!     height: 40.0,
//!     y: 20.0,
//!     screen_height: 800.0,
//!     ..Default::default()
//! });
//!
//! assert_eq!(features.position_zone, PositionZone::Top);
//! assert!(features.validate().is_ok());
//! ```

mod error;
mod types;
mod validate;

pub use crate::error::{FieldError, ValidationError};
pub use crate::types::{
    FeatureGeometry, LayoutMode, PositionZone, StructureFeatures, BOTTOM_ZONE_THRESHOLD,
    TOP_ZONE_THRESHOLD,
};
pub use crate::validate::validate_name;
