//! Schema checks that serde alone cannot express.
//!
//! Deserialization already enforces types, enum values and non-negative
//! integers. What is left are range constraints on the real-valued fields.
use crate::error::{FieldError, ValidationError};
use crate::types::StructureFeatures;

fn check_positive(field: &str, value: f64, errors: &mut Vec<FieldError>) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(FieldError::new(field, "must be a positive number"));
    }
}

impl StructureFeatures {
    /// Validate range constraints, reporting every offending field.
    ///
    /// ```rust
    /// use features::{LayoutMode, PositionZone, StructureFeatures};
    ///
    /// let mut features = StructureFeatures::new(
    ///     vec!["TEXT".into()], LayoutMode::None, 10.0, 10.0, PositionZone::Middle,
    /// );
    /// assert!(features.validate().is_ok());
    ///
    /// features.width = 0.0;
    /// features.opacity = Some(1.5);
    /// assert_eq!(features.validate().unwrap_err().len(), 2);
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        check_positive("width", self.width, &mut errors);
        check_positive("height", self.height, &mut errors);
        check_positive("aspectRatio", self.aspect_ratio, &mut errors);

        if let Some(opacity) = self.opacity {
            if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
                errors.push(FieldError::new("opacity", "must be between 0 and 1"));
            }
        }

        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "structure features failed validation");
        }
        ValidationError::check(errors)
    }
}

/// Validate a pattern name: non-empty after trimming.
pub fn validate_name(field: &str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::single(field, "must be a non-empty string"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LayoutMode, PositionZone};

    fn sample() -> StructureFeatures {
        StructureFeatures::new(
            vec!["TEXT".into(), "VECTOR".into()],
            LayoutMode::Horizontal,
            120.0,
            40.0,
            PositionZone::Top,
        )
    }

    #[test]
    fn valid_sample_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn every_bad_field_is_reported() {
        let mut features = sample();
        features.width = -1.0;
        features.height = f64::NAN;
        features.aspect_ratio = 0.0;
        features.opacity = Some(-0.1);

        let err = features.validate().expect_err("should be invalid");
        let fields: Vec<_> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["width", "height", "aspectRatio", "opacity"]);
    }

    #[test]
    fn opacity_bounds_are_inclusive() {
        let mut features = sample();
        features.opacity = Some(0.0);
        assert!(features.validate().is_ok());
        features.opacity = Some(1.0);
        assert!(features.validate().is_ok());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_name("name", "Button/Primary").is_ok());
        let err = validate_name("name", "   ").expect_err("blank");
        assert_eq!(err.errors[0].field, "name");
    }
}
