//! # Span With Boundaries
//!
//! Chooses the normal parts that, together with whole standard parts and
//! the mandatory special parts, make up one face of the scaffold.
//!
//! The search balances three goals:
//!
//! - the total span should land as close as possible to the building width
//!   plus the target margin on each side (capped by the boundaries);
//! - the building must be fully covered;
//! - the span may never exceed what the boundaries physically allow.
//!
//! Every combination of up to four normal parts is scored; at most a few
//! hundred candidates exist, so the search is exhaustive.
//!
//! ## Known gap
//!
//! When no combination both covers the building and fits inside the
//! boundaries, the layout is returned without normal parts and its total
//! span is shorter than the width. [`SpanLayout::covers_width`] reports
//! this; nothing else guards it.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::margins::SideLimits;
use super::parts::{base_width, select_parts, standard_count, PartCombinations, STANDARD_PART_MM};

/// Inputs for one span search.
#[derive(Debug, Clone)]
pub struct SpanRequest<'a> {
    /// Building width along this face (mm)
    pub width: i64,

    /// Representative eave overhang (larger of the two sides); informational
    pub eaves: i64,

    /// Special parts that must appear in the result
    pub mandatory_parts: &'a [i64],

    /// Catalog of normal parts to choose from
    pub normal_parts: &'a [i64],

    /// Maximum margin per side derived from the site boundaries
    pub limits: SideLimits,

    /// Desired margin on each unconstrained side (mm)
    pub target_margin: i64,

    /// Maximum number of normal parts in a combination
    pub max_normal_parts: usize,
}

/// Parts layout of one face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanLayout {
    /// Width covered by whole standard parts
    pub base_mm: i64,

    /// Mandatory and chosen normal parts, longest first (standard parts in
    /// `base_mm` not included)
    pub parts: Vec<i64>,

    /// `base_mm` plus the sum of `parts`
    pub total_span_mm: i64,

    /// Whether the span reaches the building width
    pub covers_width: bool,
}

impl SpanLayout {
    /// Number of whole standard parts making up the base
    pub fn base_count(&self) -> usize {
        (self.base_mm / STANDARD_PART_MM).max(0) as usize
    }

    /// Every part in the face, base standard parts included
    pub fn all_parts(&self) -> Vec<i64> {
        let mut all = vec![STANDARD_PART_MM; self.base_count()];
        all.extend_from_slice(&self.parts);
        all
    }
}

/// Find the parts layout for one face.
pub fn calculate_span_with_boundaries(request: &SpanRequest<'_>) -> SpanLayout {
    let width = request.width;
    let base = base_width(width, STANDARD_PART_MM);
    let sum_mandatory: i64 = request.mandatory_parts.iter().sum();
    let limits = &request.limits;

    let ideal_total_span = width
        + request.target_margin.min(limits.cap_left())
        + request.target_margin.min(limits.cap_right());
    // None when at least one side has no boundary
    let max_normal_sum = limits.total().map(|cap| width + cap - base - sum_mandatory);

    let target_normal_sum = ideal_total_span - base - sum_mandatory;
    let min_normal_sum = (width - base - sum_mandatory).max(0);

    debug!(
        width,
        eaves = request.eaves,
        base,
        sum_mandatory,
        target_normal_sum,
        min_normal_sum,
        ?max_normal_sum,
        "searching normal parts"
    );

    let fits = |sum: i64| sum >= min_normal_sum && max_normal_sum.map_or(true, |max| sum <= max);

    let best = PartCombinations::new(request.normal_parts, 0, request.max_normal_parts)
        .map(|combo| (combo.iter().sum::<i64>(), combo))
        .filter(|(sum, _)| fits(*sum))
        .inspect(|(sum, combo)| trace!(sum, ?combo, "candidate"))
        .min_by_key(|(sum, combo)| {
            (
                (sum - target_normal_sum).abs(),
                combo.len(),
                Reverse(standard_count(combo)),
            )
        });

    let normal = match best {
        Some((_, combo)) => combo,
        None if min_normal_sum > 0 => {
            // Kept for parity with the coverage rule: a fallback that fits is
            // already a search candidate, so in practice only the warn branch runs.
            let fallback = select_parts(min_normal_sum, request.normal_parts, request.max_normal_parts);
            let fallback_sum: i64 = fallback.iter().sum();
            if !fallback.is_empty() && max_normal_sum.map_or(true, |max| fallback_sum <= max) {
                debug!(?fallback, "using coverage fallback");
                fallback
            } else {
                warn!(width, min_normal_sum, "no part combination covers the building width");
                Vec::new()
            }
        }
        None => Vec::new(),
    };

    let mut parts: Vec<i64> = request.mandatory_parts.to_vec();
    parts.extend(normal);
    parts.sort_unstable_by(|a, b| b.cmp(a));

    let total_span_mm = base + parts.iter().sum::<i64>();
    debug!(?parts, total_span_mm, "span layout chosen");

    SpanLayout {
        base_mm: base,
        parts,
        total_span_mm,
        covers_width: total_span_mm >= width,
    }
}
