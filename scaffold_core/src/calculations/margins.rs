//! # Margin Distribution
//!
//! Splits the gap between a face's total span and the building width into
//! a left and a right margin. Site boundaries cap each side at the boundary
//! distance minus a fixed clearance; whatever one side cannot take moves to
//! the other.
//!
//! The margins always sum to `max(0, total_span - width)` unless both caps
//! together are smaller than that, in which case both sides sit at their
//! caps and the sum falls short.
//!
//! ## Example
//!
//! ```rust
//! use scaffold_core::calculations::margins::{calculate_initial_margins, SideLimits};
//!
//! // 1000 mm to distribute, left boundary 400 mm away (340 mm usable)
//! let limits = SideLimits::from_boundaries(Some(400), None, 60);
//! let margins = calculate_initial_margins(11_000, 10_000, &limits, 900);
//! assert_eq!((margins.left, margins.right), (340, 660));
//! ```

use serde::{Deserialize, Serialize};

/// Left/right margin pair for one face (mm)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub left: i64,
    pub right: i64,
}

impl Margins {
    pub fn new(left: i64, right: i64) -> Self {
        Margins { left, right }
    }

    /// Sum of both sides
    pub fn total(&self) -> i64 {
        self.left + self.right
    }

    /// Whether both sides reach their thresholds
    pub fn meets(&self, threshold: &Margins) -> bool {
        self.left >= threshold.left && self.right >= threshold.right
    }

    /// Total amount by which the sides fall below their thresholds
    pub fn shortfall(&self, threshold: &Margins) -> i64 {
        (threshold.left - self.left).max(0) + (threshold.right - self.right).max(0)
    }
}

/// Maximum margin each side may take; `None` means no boundary on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideLimits {
    pub left: Option<i64>,
    pub right: Option<i64>,
}

impl SideLimits {
    /// Derive limits from boundary distances. Negative results clamp to 0.
    pub fn from_boundaries(left_boundary: Option<i64>, right_boundary: Option<i64>, clearance_mm: i64) -> Self {
        SideLimits {
            left: left_boundary.map(|b| (b - clearance_mm).max(0)),
            right: right_boundary.map(|b| (b - clearance_mm).max(0)),
        }
    }

    /// True when neither side has a boundary
    pub fn is_unbounded(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// True when both sides have a boundary
    pub fn is_fully_bounded(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn cap_left(&self) -> i64 {
        self.left.unwrap_or(i64::MAX)
    }

    pub fn cap_right(&self) -> i64 {
        self.right.unwrap_or(i64::MAX)
    }

    /// Sum of both caps, or `None` if either side is unbounded
    pub fn total(&self) -> Option<i64> {
        Some(self.left? + self.right?)
    }
}

/// Clip a margin pair to `[0, cap]` per side, then move any difference to
/// `available` onto the side that still has room.
///
/// A deficit goes to the right side first, then the left; an excess is
/// taken from the right side first. When neither side has room the pair
/// stays at its caps and under-fills.
pub fn rebalance_margins(left: i64, right: i64, available: i64, limits: &SideLimits) -> Margins {
    let cap_left = limits.cap_left();
    let cap_right = limits.cap_right();
    let mut left = left.clamp(0, cap_left);
    let mut right = right.clamp(0, cap_right);

    let diff = available - left - right;
    if diff > 0 {
        let to_right = diff.min(cap_right - right);
        right += to_right;
        left += (diff - to_right).min(cap_left - left);
    } else if diff < 0 {
        let excess = -diff;
        let from_right = excess.min(right);
        right -= from_right;
        left -= (excess - from_right).min(left);
    }

    Margins { left, right }
}

/// Initial left/right gaps for a face with the given total span.
///
/// Without boundaries the gap splits evenly, each side first taking the
/// target margin and then an even share of any surplus. With at least one
/// boundary the even split is clipped to the limits and rebalanced.
pub fn calculate_initial_margins(total_span: i64, width: i64, limits: &SideLimits, target_margin: i64) -> Margins {
    let available = (total_span - width).max(0);
    let half = available / 2;

    if limits.is_unbounded() {
        if half > target_margin {
            let surplus = available - 2 * target_margin;
            let extra_left = surplus / 2;
            return Margins::new(target_margin + extra_left, target_margin + surplus - extra_left);
        }
        return Margins::new(half, available - half);
    }

    rebalance_margins(half, available - half, available, limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEARANCE: i64 = 60;

    #[test]
    fn test_no_boundaries_even_split() {
        let limits = SideLimits::default();
        let m = calculate_initial_margins(11_000, 10_000, &limits, 900);
        assert_eq!(m, Margins::new(500, 500));

        let m = calculate_initial_margins(11_001, 10_000, &limits, 900);
        assert_eq!(m, Margins::new(500, 501));
    }

    #[test]
    fn test_no_boundaries_surplus_over_target() {
        let limits = SideLimits::default();
        let m = calculate_initial_margins(13_001, 10_000, &limits, 900);
        // 900 each plus 1201 surplus split 600/601
        assert_eq!(m, Margins::new(1500, 1501));
    }

    #[test]
    fn test_span_shorter_than_width() {
        let limits = SideLimits::default();
        let m = calculate_initial_margins(9_000, 10_000, &limits, 900);
        assert_eq!(m, Margins::new(0, 0));
    }

    #[test]
    fn test_single_boundary_moves_rest_to_free_side() {
        let limits = SideLimits::from_boundaries(Some(400), None, CLEARANCE);
        let m = calculate_initial_margins(11_000, 10_000, &limits, 900);
        assert_eq!(m, Margins::new(340, 660));

        let limits = SideLimits::from_boundaries(None, Some(300), CLEARANCE);
        let m = calculate_initial_margins(11_000, 10_000, &limits, 900);
        assert_eq!(m, Margins::new(760, 240));
    }

    #[test]
    fn test_both_boundaries_underfill() {
        let limits = SideLimits::from_boundaries(Some(400), Some(300), CLEARANCE);
        let m = calculate_initial_margins(11_000, 10_000, &limits, 900);
        assert_eq!(m, Margins::new(340, 240));
        assert!(m.total() < 1000);
    }

    #[test]
    fn test_boundary_inside_clearance_clamps_to_zero() {
        let limits = SideLimits::from_boundaries(Some(30), None, CLEARANCE);
        assert_eq!(limits.left, Some(0));
        let m = calculate_initial_margins(11_000, 10_000, &limits, 900);
        assert_eq!(m, Margins::new(0, 1000));
    }

    #[test]
    fn test_margin_sum_invariant() {
        let boundaries = [None, Some(0), Some(200), Some(640), Some(1500), Some(5000)];
        for total_span in (9_000..=14_000).step_by(350) {
            for &lb in &boundaries {
                for &rb in &boundaries {
                    let limits = SideLimits::from_boundaries(lb, rb, CLEARANCE);
                    let m = calculate_initial_margins(total_span, 10_000, &limits, 900);
                    let available = (total_span - 10_000).max(0);
                    assert!(m.left >= 0 && m.right >= 0);
                    assert!(m.left <= limits.cap_left() && m.right <= limits.cap_right());
                    match limits.total() {
                        Some(cap) if cap < available => assert_eq!(m.total(), cap),
                        _ => assert_eq!(m.total(), available, "span {} {:?} {:?}", total_span, lb, rb),
                    }
                }
            }
        }
    }

    #[test]
    fn test_rebalance_excess() {
        let limits = SideLimits::default();
        let m = rebalance_margins(800, 800, 1000, &limits);
        assert_eq!(m, Margins::new(800, 200));
    }

    #[test]
    fn test_shortfall() {
        let threshold = Margins::new(580, 580);
        assert_eq!(Margins::new(600, 500).shortfall(&threshold), 80);
        assert!(Margins::new(580, 600).meets(&threshold));
    }
}
