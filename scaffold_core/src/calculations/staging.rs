//! # Vertical Staging
//!
//! Splits the building's reference height into scaffold stages, then
//! lowers the base jack with extra modules.
//!
//! ```text
//!   ┌──────────────┐  base unit (by roof shape)
//!   ├──────────────┤  stage 1900
//!   ├──────────────┤  ...
//!   │  first layer │  leftover, at least 950 unless the building is short
//!   └──────────────┘  jack-up height = first layer, before reduction
//! ```
//!
//! Each reduction loop takes 475 mm off the jack and costs one module. With
//! a tie-column the loop runs while the jack is at least 550 mm and must be
//! followed by a final 130 mm adjustment; if the jack ends up too low for
//! that, the reduction is abandoned and `tie_ok` is false.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::settings::EngineSettings;

/// Roof categories, each with its own base unit height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofShape {
    /// Flat roof (1700 mm base unit)
    #[default]
    Flat,
    /// Sloped roof (1900 mm base unit)
    Sloped,
    /// Deck roof (1800 mm base unit)
    Deck,
}

impl RoofShape {
    /// All roof shapes for selection lists
    pub const ALL: [RoofShape; 3] = [RoofShape::Flat, RoofShape::Sloped, RoofShape::Deck];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoofShape::Flat => "flat",
            RoofShape::Sloped => "sloped",
            RoofShape::Deck => "deck",
        }
    }
}

impl std::fmt::Display for RoofShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoofShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RoofShape::ALL
            .into_iter()
            .find(|shape| shape.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown roof shape '{}' (expected flat, sloped or deck)", s))
    }
}

/// Vertical staging result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staging {
    /// Number of scaffold levels (at least 1)
    pub num_stages: i64,

    /// Height of the first layer (mm)
    pub first_layer_height: i64,

    /// Base jack height after any reduction (mm)
    pub jack_up_height: i64,

    /// Number of 475 mm reduction loops applied
    pub reduction_loops: i64,

    /// Whether the requested tie-column reduction was feasible
    /// (always true when no tie-column was requested)
    pub tie_ok: bool,

    /// Total module count including railing extras
    pub modules_count: i64,
}

/// Calculate stages, jack height and module count.
pub fn calculate_staging(
    standard_height: i64,
    roof_shape: RoofShape,
    tie_column: bool,
    railing_count: u8,
    settings: &EngineSettings,
) -> Staging {
    // Unvalidated settings must not divide by zero
    let stage = settings.stage_height_mm.max(1);
    let remainder = standard_height - settings.base_unit_mm(roof_shape);

    // First pass: estimate, then merge a short leftover into the first layer
    let estimated_stages = if remainder > 0 { 1 + remainder / stage } else { 1 };
    let leftover = remainder - (estimated_stages - 1) * stage;
    let first_layer = if leftover < settings.min_first_layer_mm {
        leftover + stage
    } else {
        leftover
    };
    let num_stages = (1 + (remainder - first_layer).div_euclid(stage)).max(1);

    // Second pass is authoritative
    let first_layer_height = remainder - (num_stages - 1) * stage;

    let (jack_up_height, reduction_loops, tie_ok) =
        reduce_jack_height(first_layer_height, tie_column, settings);

    let modules_count = 4 + (num_stages - 1) * 4 + reduction_loops + railing_modules(railing_count);

    debug!(
        remainder,
        num_stages,
        first_layer_height,
        jack_up_height,
        reduction_loops,
        tie_ok,
        modules_count,
        "staging"
    );

    Staging {
        num_stages,
        first_layer_height,
        jack_up_height,
        reduction_loops,
        tie_ok,
        modules_count,
    }
}

/// Lower the jack in fixed steps. Returns `(height, loops, tie_ok)`.
fn reduce_jack_height(jack: i64, tie_column: bool, settings: &EngineSettings) -> (i64, i64, bool) {
    let step = settings.jack_step_mm;
    if step <= 0 {
        return (jack, 0, !tie_column);
    }

    if !tie_column {
        let (height, loops) = step_down(jack, step, step);
        return (height, loops, true);
    }

    let final_min = settings.tie_final_min_mm;
    let final_step = settings.tie_final_step_mm;

    if jack >= settings.tie_loop_threshold_mm {
        let (height, loops) = step_down(jack, settings.tie_loop_threshold_mm, step);
        if height >= final_min {
            (height - final_step, loops, true)
        } else {
            debug!(jack, height, "tie-column reduction leaves jack too low, reverting");
            (jack, 0, false)
        }
    } else if jack >= final_min {
        (jack - final_step, 0, true)
    } else {
        debug!(jack, "jack too low for tie-column");
        (jack, 0, false)
    }
}

/// Subtract `step` while `height >= threshold`; `step` must be positive.
fn step_down(mut height: i64, threshold: i64, step: i64) -> (i64, i64) {
    let mut loops = 0;
    while height >= threshold {
        height -= step;
        loops += 1;
    }
    (height, loops)
}

fn railing_modules(railing_count: u8) -> i64 {
    match railing_count {
        3 => 2,
        2 => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staging(height: i64, roof: RoofShape, tie: bool, railing: u8) -> Staging {
        calculate_staging(height, roof, tie, railing, &EngineSettings::default())
    }

    #[test]
    fn test_two_pass_refinement() {
        // remainder 4300: estimate 3 stages, leftover 500 < 950 merges into first layer
        let s = staging(6000, RoofShape::Flat, false, 0);
        assert_eq!(s.num_stages, 2);
        assert_eq!(s.first_layer_height, 2400);
    }

    #[test]
    fn test_leftover_kept_when_tall_enough() {
        // remainder 3000: leftover 1100 stays as first layer
        let s = staging(4800, RoofShape::Deck, false, 0);
        assert_eq!(s.num_stages, 2);
        assert_eq!(s.first_layer_height, 1100);

        // remainder 2900: leftover 1000 stays as first layer
        let s = staging(4800, RoofShape::Sloped, false, 0);
        assert_eq!(s.num_stages, 2);
        assert_eq!(s.first_layer_height, 1000);
    }

    #[test]
    fn test_tie_column_reduction() {
        // 2400 -> 1925 -> 1450 -> 975 -> 500, then -130
        let s = staging(6000, RoofShape::Flat, true, 3);
        assert!(s.tie_ok);
        assert_eq!(s.reduction_loops, 4);
        assert_eq!(s.jack_up_height, 370);
        assert_eq!(s.modules_count, 4 + 4 + 4 + 2);
    }

    #[test]
    fn test_reduction_without_tie_column() {
        // 2400 -> ... -> 25 in five loops
        let s = staging(6000, RoofShape::Flat, false, 2);
        assert!(s.tie_ok);
        assert_eq!(s.reduction_loops, 5);
        assert_eq!(s.jack_up_height, 25);
        assert_eq!(s.modules_count, 4 + 4 + 5 + 1);
    }

    #[test]
    fn test_tie_column_reverts_when_jack_ends_too_low() {
        // remainder 2975: first layer 1075 -> 600 -> 125 < 150
        let s = staging(4675, RoofShape::Flat, true, 0);
        assert_eq!(s.first_layer_height, 1075);
        assert!(!s.tie_ok);
        assert_eq!(s.jack_up_height, 1075);
        assert_eq!(s.reduction_loops, 0);
        assert_eq!(s.modules_count, 8);
    }

    #[test]
    fn test_tie_column_below_minimum() {
        // remainder 100: single stage, jack 100 < 150
        let s = staging(1800, RoofShape::Flat, true, 1);
        assert_eq!(s.num_stages, 1);
        assert!(!s.tie_ok);
        assert_eq!(s.jack_up_height, 100);
        assert_eq!(s.reduction_loops, 0);
        assert_eq!(s.modules_count, 4);
    }

    #[test]
    fn test_tie_column_single_adjustment() {
        // remainder 400: jack 400 is below the loop threshold but above 150
        let s = staging(2100, RoofShape::Flat, true, 0);
        assert!(s.tie_ok);
        assert_eq!(s.jack_up_height, 270);
        assert_eq!(s.reduction_loops, 0);
    }

    #[test]
    fn test_short_building_keeps_one_stage() {
        let s = staging(1200, RoofShape::Sloped, false, 0);
        assert_eq!(s.num_stages, 1);
        assert_eq!(s.first_layer_height, -700);
    }

    #[test]
    fn test_stage_count_positive_and_jack_non_negative() {
        for roof in RoofShape::ALL {
            for height in (1_000..=30_000).step_by(77) {
                for tie in [true, false] {
                    let s = staging(height, roof, tie, 0);
                    assert!(s.num_stages >= 1);
                    if s.tie_ok && height > EngineSettings::default().base_unit_mm(roof) {
                        assert!(s.jack_up_height >= 0, "height {} roof {} tie {}", height, roof, tie);
                    }
                }
            }
        }
    }

    #[test]
    fn test_roof_shape_parsing() {
        assert_eq!("Sloped".parse::<RoofShape>(), Ok(RoofShape::Sloped));
        assert_eq!(" deck ".parse::<RoofShape>(), Ok(RoofShape::Deck));
        assert!("gable".parse::<RoofShape>().is_err());
        assert_eq!(serde_json::to_string(&RoofShape::Flat).unwrap(), "\"flat\"");
    }
}
