//! # Engine Settings
//!
//! Every fixed clearance, stage height and reduction step the engine uses,
//! gathered in one serializable struct. [`EngineSettings::default`] carries
//! the values the product has always shipped with; projects store their own
//! copy so older calculations can be re-run with the settings they were
//! made with.
//!
//! ## Example
//!
//! ```rust
//! use scaffold_core::settings::EngineSettings;
//!
//! let settings = EngineSettings::default();
//! assert_eq!(settings.boundary_clearance_mm, 60);
//! assert!(settings.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::RoofShape;
use crate::errors::{CalcError, CalcResult};

/// Tunable constants for the dimension engine. All lengths in millimetres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Safety offset subtracted from a site boundary distance
    pub boundary_clearance_mm: i64,

    /// Clearance added to an eave overhang to get the minimum margin
    pub eave_clearance_mm: i64,

    /// Height of one scaffold stage
    pub stage_height_mm: i64,

    /// Below this, the leftover height is merged into one more stage
    pub min_first_layer_mm: i64,

    /// Tie-column reduction keeps looping while the jack height is at least this
    pub tie_loop_threshold_mm: i64,

    /// Height removed per jack-up reduction loop (one extra module each)
    pub jack_step_mm: i64,

    /// Minimum jack height for the final tie-column adjustment
    pub tie_final_min_mm: i64,

    /// Height removed by the final tie-column adjustment
    pub tie_final_step_mm: i64,

    /// Maximum number of normal parts per face combination
    pub max_normal_parts: usize,

    /// Base unit height for flat roofs
    pub flat_base_mm: i64,

    /// Base unit height for sloped roofs
    pub sloped_base_mm: i64,

    /// Base unit height for deck roofs
    pub deck_base_mm: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            boundary_clearance_mm: 60,
            eave_clearance_mm: 80,
            stage_height_mm: 1900,
            min_first_layer_mm: 950,
            tie_loop_threshold_mm: 550,
            jack_step_mm: 475,
            tie_final_min_mm: 150,
            tie_final_step_mm: 130,
            max_normal_parts: 4,
            flat_base_mm: 1700,
            sloped_base_mm: 1900,
            deck_base_mm: 1800,
        }
    }
}

impl EngineSettings {
    /// Base unit height for a roof category.
    pub fn base_unit_mm(&self, roof: RoofShape) -> i64 {
        match roof {
            RoofShape::Flat => self.flat_base_mm,
            RoofShape::Sloped => self.sloped_base_mm,
            RoofShape::Deck => self.deck_base_mm,
        }
    }

    /// Validate settings.
    ///
    /// Step sizes must be positive or the staging and reduction loops
    /// would never terminate.
    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("stage_height_mm", self.stage_height_mm),
            ("jack_step_mm", self.jack_step_mm),
            ("tie_final_step_mm", self.tie_final_step_mm),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Step size must be positive",
                ));
            }
        }

        let non_negative = [
            ("boundary_clearance_mm", self.boundary_clearance_mm),
            ("eave_clearance_mm", self.eave_clearance_mm),
            ("min_first_layer_mm", self.min_first_layer_mm),
            ("tie_final_min_mm", self.tie_final_min_mm),
        ];
        for (field, value) in non_negative {
            if value < 0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Cannot be negative",
                ));
            }
        }

        if self.tie_loop_threshold_mm < self.jack_step_mm {
            return Err(CalcError::invalid_input(
                "tie_loop_threshold_mm",
                self.tie_loop_threshold_mm.to_string(),
                "Must be at least jack_step_mm",
            ));
        }
        if self.max_normal_parts == 0 {
            return Err(CalcError::invalid_input(
                "max_normal_parts",
                "0",
                "At least one normal part must be allowed",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineSettings::default().validate().is_ok());
    }

    #[test]
    fn test_base_units() {
        let settings = EngineSettings::default();
        assert_eq!(settings.base_unit_mm(RoofShape::Flat), 1700);
        assert_eq!(settings.base_unit_mm(RoofShape::Sloped), 1900);
        assert_eq!(settings.base_unit_mm(RoofShape::Deck), 1800);
    }

    #[test]
    fn test_zero_step_rejected() {
        let settings = EngineSettings {
            jack_step_mm: 0,
            ..EngineSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: EngineSettings =
            serde_json::from_str(r#"{ "boundary_clearance_mm": 100 }"#).unwrap();
        assert_eq!(settings.boundary_clearance_mm, 100);
        assert_eq!(settings.stage_height_mm, 1900);
    }
}
