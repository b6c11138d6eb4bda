//! # Face Dimensions
//!
//! Works out one face of the scaffold: the parts layout, the gap left on
//! each side of the building, and the threshold correction.
//!
//! Each side has a threshold of its eave overhang plus a fixed clearance.
//! When the distributed margins miss a threshold, the margins are shifted
//! within the boundary limits to try to satisfy both. If that still fails,
//! a correction part is chosen for each short side and shown as a `(+N)`
//! annotation on the margin note and the span text.
//!
//! The correction is a display annotation only: the numeric margins and
//! total span are left as computed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::margins::{calculate_initial_margins, rebalance_margins, Margins, SideLimits};
use super::parts::{format_span_parts, CORRECTION_PARTS, NORMAL_PARTS};
use super::span::{calculate_span_with_boundaries, SpanLayout, SpanRequest};
use crate::settings::EngineSettings;

/// Mandatory special-part counts for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecialParts {
    pub use_355: u32,
    pub use_300: u32,
    pub use_150: u32,
}

impl SpecialParts {
    /// Expand the counts into a parts list
    pub fn to_parts(&self) -> Vec<i64> {
        let mut parts = Vec::new();
        for (length, count) in [(355, self.use_355), (300, self.use_300), (150, self.use_150)] {
            parts.extend(std::iter::repeat(length).take(count as usize));
        }
        parts
    }
}

/// One face of the building as seen by the engine.
///
/// "Left" and "right" are the two ends of the face; the caller decides
/// which compass sides they map to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRequest {
    /// Building width along this face (mm)
    pub width: i64,
    pub eaves_left: i64,
    pub eaves_right: i64,
    pub boundary_left: Option<i64>,
    pub boundary_right: Option<i64>,
    pub specials: SpecialParts,
    pub target_margin: i64,
}

/// Result for one face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceDimensions {
    /// Total scaffold span (mm)
    pub total_span: i64,

    /// Parts composition as display text, e.g. `"5span, 1200(+150)"`
    pub span_text: String,

    /// Parts layout behind `total_span`
    pub layout: SpanLayout,

    /// Final margins (mm)
    pub margins: Margins,

    /// Minimum acceptable margin per side (eaves + clearance)
    pub thresholds: Margins,

    /// Display note for the left margin, e.g. `"540 mm(+150)"`
    pub left_note: String,

    /// Display note for the right margin
    pub right_note: String,

    /// Whether any side is still below its threshold
    pub needs_correction: bool,

    /// Correction part for the left side, if it is short
    pub left_correction: Option<i64>,

    /// Correction part for the right side, if it is short
    pub right_correction: Option<i64>,

    /// Larger of the two side corrections; the one annotated in `span_text`
    pub correction_part: Option<i64>,
}

/// Calculate the layout, margins and correction notes for one face.
pub fn calculate_face_dimensions(request: &FaceRequest, settings: &EngineSettings) -> FaceDimensions {
    let width = request.width;
    let limits = SideLimits::from_boundaries(
        request.boundary_left,
        request.boundary_right,
        settings.boundary_clearance_mm,
    );

    let mandatory = request.specials.to_parts();
    let layout = calculate_span_with_boundaries(&SpanRequest {
        width,
        eaves: request.eaves_left.max(request.eaves_right),
        mandatory_parts: &mandatory,
        normal_parts: &NORMAL_PARTS,
        limits,
        target_margin: request.target_margin,
        max_normal_parts: settings.max_normal_parts,
    });
    let total_span = layout.total_span_mm;
    let available = (total_span - width).max(0);

    let initial = calculate_initial_margins(total_span, width, &limits, request.target_margin);
    let thresholds = Margins::new(
        request.eaves_left + settings.eave_clearance_mm,
        request.eaves_right + settings.eave_clearance_mm,
    );

    let mut margins = rebalance_margins(initial.left, initial.right, available, &limits);
    if !margins.meets(&thresholds) {
        let shifted = if limits.is_fully_bounded() {
            best_bounded_distribution(margins, available, &limits, &thresholds)
        } else {
            push_toward_thresholds(margins, available, &limits, &thresholds)
        };
        margins = rebalance_margins(shifted.left, shifted.right, available, &limits);
    }
    let needs_correction = !margins.meets(&thresholds);

    let (left_correction, right_correction) = if needs_correction {
        (
            (margins.left < thresholds.left).then(|| correction_part_for(margins.left, thresholds.left)),
            (margins.right < thresholds.right).then(|| correction_part_for(margins.right, thresholds.right)),
        )
    } else {
        (None, None)
    };
    let correction_part = left_correction.max(right_correction);

    debug!(
        total_span,
        left = margins.left,
        right = margins.right,
        threshold_left = thresholds.left,
        threshold_right = thresholds.right,
        ?left_correction,
        ?right_correction,
        "face margins"
    );

    let span_text = annotate_span_text(
        &format_span_parts(&layout.all_parts()),
        left_correction,
        right_correction,
        correction_part,
    );

    FaceDimensions {
        total_span,
        span_text,
        layout,
        margins,
        thresholds,
        left_note: margin_note(margins.left, left_correction),
        right_note: margin_note(margins.right, right_correction),
        needs_correction,
        left_correction,
        right_correction,
        correction_part,
    }
}

/// Try the priority orderings for a face bounded on both sides.
///
/// The first candidate meeting both thresholds wins; otherwise the one
/// with the smallest total shortfall, starting from `current`.
fn best_bounded_distribution(current: Margins, available: i64, limits: &SideLimits, thresholds: &Margins) -> Margins {
    let cap_left = limits.cap_left();
    let cap_right = limits.cap_right();

    let right_max = cap_right.min(available);
    let right_threshold = thresholds.right.min(cap_right).min(available);
    let left_max = cap_left.min(available);
    let left_threshold = thresholds.left.min(cap_left).min(available);

    let candidates = [
        (available - right_max, right_max),
        (available - right_threshold, right_threshold),
        (left_max, available - left_max),
        (left_threshold, available - left_threshold),
    ];

    let mut best = current;
    for (left, right) in candidates {
        let candidate = rebalance_margins(left, right, available, limits);
        if candidate.meets(thresholds) {
            return candidate;
        }
        if candidate.shortfall(thresholds) < best.shortfall(thresholds) {
            best = candidate;
        }
    }
    best
}

/// Shift margins toward the thresholds when at most one side is bounded.
///
/// The bounded side is set to its threshold (capped by its limit) and the
/// free side takes the rest. With no boundary at all, the short side
/// (left checked first) is set to its threshold.
fn push_toward_thresholds(current: Margins, available: i64, limits: &SideLimits, thresholds: &Margins) -> Margins {
    match (limits.left, limits.right) {
        (Some(cap_left), None) => {
            let left = thresholds.left.min(cap_left).min(available);
            Margins::new(left, available - left)
        }
        (None, Some(cap_right)) => {
            let right = thresholds.right.min(cap_right).min(available);
            Margins::new(available - right, right)
        }
        _ if current.left < thresholds.left => {
            let left = thresholds.left.min(available);
            Margins::new(left, available - left)
        }
        _ => {
            let right = thresholds.right.min(available);
            Margins::new(available - right, right)
        }
    }
}

/// Smallest correction part that lifts `margin` past `threshold`; the
/// largest part when none does.
fn correction_part_for(margin: i64, threshold: i64) -> i64 {
    CORRECTION_PARTS
        .iter()
        .copied()
        .find(|&part| margin + part > threshold)
        .unwrap_or(CORRECTION_PARTS[CORRECTION_PARTS.len() - 1])
}

/// Attach `(+N)` to the front and/or end of the span text for each side
/// whose correction equals the annotated part.
fn annotate_span_text(
    span_text: &str,
    left_correction: Option<i64>,
    right_correction: Option<i64>,
    correction_part: Option<i64>,
) -> String {
    let Some(part) = correction_part else {
        return span_text.to_string();
    };
    let tag = format!("(+{})", part);
    let prefix = if left_correction == Some(part) { tag.as_str() } else { "" };
    let suffix = if right_correction == Some(part) { tag.as_str() } else { "" };
    format!("{}{}{}", prefix, span_text, suffix)
}

fn margin_note(margin: i64, correction: Option<i64>) -> String {
    match correction {
        Some(part) => format!("{} mm(+{})", margin, part),
        None => format!("{} mm", margin),
    }
}
