//! # Scaffold Parts
//!
//! Part catalogs and the small helpers every face calculation builds on:
//! splitting a width into whole standard parts, searching part
//! combinations, and rendering a parts list as span text.
//!
//! ## Catalog
//!
//! | Kind       | Lengths (mm)                  |
//! |------------|-------------------------------|
//! | Standard   | 1800                          |
//! | Normal     | 1800, 1500, 1200, 900, 600    |
//! | Special    | 355, 300, 150                 |
//! | Correction | 150, 300, 355, 600, 900       |
//!
//! ## Example
//!
//! ```rust
//! use scaffold_core::calculations::parts::{base_width, format_span_parts, select_parts, NORMAL_PARTS};
//!
//! assert_eq!(base_width(10010, 1800), 9000);
//! assert_eq!(select_parts(1000, &NORMAL_PARTS, 4), vec![1200]);
//! assert_eq!(format_span_parts(&[1800, 1800, 1800, 900]), "3span, 900");
//! ```

use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Length of the standard scaffold part (one "span")
pub const STANDARD_PART_MM: i64 = 1800;

/// Normal parts available for filling a face, longest first
pub const NORMAL_PARTS: [i64; 5] = [1800, 1500, 1200, 900, 600];

/// Special parts that can be requested per axis
pub const SPECIAL_PARTS: [i64; 3] = [355, 300, 150];

/// Candidate parts for a threshold correction, shortest first
pub const CORRECTION_PARTS: [i64; 5] = [150, 300, 355, 600, 900];

/// Largest multiple of `unit` not exceeding `width`.
///
/// Uses truncating remainder, so negative widths give a negative base.
/// A non-positive unit yields 0.
pub fn base_width(width: i64, unit: i64) -> i64 {
    if unit <= 0 {
        return 0;
    }
    width - width % unit
}

/// Number of standard parts in a parts list
pub fn standard_count(parts: &[i64]) -> usize {
    parts.iter().filter(|&&p| p == STANDARD_PART_MM).count()
}

/// Lazy iterator over combinations with repetition of catalog parts.
///
/// Yields every multiset of `min_items..=max_items` parts exactly once,
/// smallest sizes first, each combination in catalog order. The sequence
/// is finite and a fresh iterator restarts it.
///
/// ```rust
/// use scaffold_core::calculations::parts::PartCombinations;
///
/// let combos: Vec<Vec<i64>> = PartCombinations::new(&[600, 300], 0, 2).collect();
/// assert_eq!(
///     combos,
///     vec![vec![], vec![600], vec![300], vec![600, 600], vec![600, 300], vec![300, 300]]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PartCombinations<'a> {
    options: &'a [i64],
    max_items: usize,
    /// Non-decreasing catalog indices of the next combination; `None` once exhausted
    indices: Option<Vec<usize>>,
}

impl<'a> PartCombinations<'a> {
    /// Create an iterator over combinations of `min_items` to `max_items` parts.
    pub fn new(options: &'a [i64], min_items: usize, max_items: usize) -> Self {
        let exhausted = min_items > max_items || (options.is_empty() && min_items > 0);
        PartCombinations {
            options,
            max_items,
            indices: if exhausted { None } else { Some(vec![0; min_items]) },
        }
    }
}

impl Iterator for PartCombinations<'_> {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        let options = self.options;
        let max_items = self.max_items;
        let indices = self.indices.as_mut()?;
        let combination: Vec<i64> = indices.iter().map(|&i| options[i]).collect();

        let n = options.len();
        match indices.iter().rposition(|&i| i + 1 < n) {
            Some(pos) => {
                let next = indices[pos] + 1;
                for slot in &mut indices[pos..] {
                    *slot = next;
                }
            }
            None => {
                let next_len = indices.len() + 1;
                if next_len > max_items || n == 0 {
                    self.indices = None;
                } else {
                    *indices = vec![0; next_len];
                }
            }
        }

        Some(combination)
    }
}

/// Pick the cheapest combination of 1 to `max_items` parts reaching `target_length`.
///
/// "Cheapest" means the smallest sum not below the target, then the fewest
/// parts, then the most standard parts. Returns the parts longest first, or
/// an empty list when no combination within `max_items` reaches the target.
pub fn select_parts(target_length: i64, parts_options: &[i64], max_items: usize) -> Vec<i64> {
    let best = PartCombinations::new(parts_options, 1, max_items)
        .map(|combo| (combo.iter().sum::<i64>(), combo))
        .filter(|(sum, _)| *sum >= target_length)
        .min_by_key(|(sum, combo)| (*sum, combo.len(), Reverse(standard_count(combo))));

    match best {
        Some((_, mut combo)) => {
            combo.sort_unstable_by(|a, b| b.cmp(a));
            combo
        }
        None => Vec::new(),
    }
}

/// Render a parts list as span text.
///
/// Standard parts collapse into `"<N>span"`; every other distinct length
/// follows once, longest first, comma separated.
pub fn format_span_parts(parts: &[i64]) -> String {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &part in parts {
        *counts.entry(part).or_default() += 1;
    }

    let mut elements = Vec::new();
    if let Some(n) = counts.remove(&STANDARD_PART_MM) {
        elements.push(format!("{}span", n));
    }
    elements.extend(counts.keys().rev().map(|len| len.to_string()));
    elements.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_width() {
        assert_eq!(base_width(10010, 1800), 9000);
        assert_eq!(base_width(9100, 1800), 9000);
        assert_eq!(base_width(1799, 1800), 0);
        assert_eq!(base_width(3600, 1800), 3600);
        assert_eq!(base_width(0, 1800), 0);
        assert_eq!(base_width(5000, 0), 0);
    }

    #[test]
    fn test_base_width_negative_is_not_clamped() {
        assert_eq!(base_width(-2000, 1800), -1800);
    }

    #[test]
    fn test_combination_counts() {
        // Multisets of k items from 5 kinds: C(5+k-1, k) -> 1, 5, 15, 35, 70
        assert_eq!(PartCombinations::new(&NORMAL_PARTS, 0, 4).count(), 126);
        assert_eq!(PartCombinations::new(&NORMAL_PARTS, 1, 1).count(), 5);
        assert_eq!(PartCombinations::new(&NORMAL_PARTS, 4, 4).count(), 70);
    }

    #[test]
    fn test_combinations_are_unique_multisets() {
        let mut seen: Vec<Vec<i64>> = PartCombinations::new(&NORMAL_PARTS, 0, 3)
            .map(|mut c| {
                c.sort_unstable();
                c
            })
            .collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn test_combinations_restart() {
        let first: Vec<_> = PartCombinations::new(&SPECIAL_PARTS, 0, 2).collect();
        let second: Vec<_> = PartCombinations::new(&SPECIAL_PARTS, 0, 2).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_combinations_empty_catalog() {
        let combos: Vec<_> = PartCombinations::new(&[], 0, 4).collect();
        assert_eq!(combos, vec![Vec::<i64>::new()]);
        assert_eq!(PartCombinations::new(&[], 1, 4).count(), 0);
        assert_eq!(PartCombinations::new(&NORMAL_PARTS, 3, 2).count(), 0);
    }

    #[test]
    fn test_select_parts_exact() {
        assert_eq!(select_parts(1800, &NORMAL_PARTS, 4), vec![1800]);
        assert_eq!(select_parts(2400, &NORMAL_PARTS, 4), vec![1800, 600]);
    }

    #[test]
    fn test_select_parts_rounds_up() {
        assert_eq!(select_parts(1000, &NORMAL_PARTS, 4), vec![1200]);
        assert_eq!(select_parts(1, &NORMAL_PARTS, 4), vec![600]);
    }

    #[test]
    fn test_select_parts_prefers_standard_parts_on_tie() {
        // 3600 = 1800+1800 = 1800+1200+600 = ...; fewest parts first
        assert_eq!(select_parts(3600, &NORMAL_PARTS, 4), vec![1800, 1800]);
        // 2700 = 1800+900 = 1500+1200; same count, more standard parts wins
        assert_eq!(select_parts(2700, &NORMAL_PARTS, 4), vec![1800, 900]);
    }

    #[test]
    fn test_select_parts_unreachable() {
        assert!(select_parts(7201, &NORMAL_PARTS, 4).is_empty());
        assert_eq!(select_parts(7200, &NORMAL_PARTS, 4), vec![1800; 4]);
    }

    #[test]
    fn test_format_span_parts() {
        assert_eq!(format_span_parts(&[1800, 1800, 1800, 900]), "3span, 900");
        assert_eq!(format_span_parts(&[900, 1800, 355, 1800]), "2span, 900, 355");
        assert_eq!(format_span_parts(&[600, 300]), "600, 300");
        assert_eq!(format_span_parts(&[]), "");
    }

    #[test]
    fn test_format_span_parts_groups_repeated_lengths() {
        assert_eq!(format_span_parts(&[1800, 355, 355, 150]), "1span, 355, 150");
    }

    #[test]
    fn test_format_span_parts_shape() {
        // "<N>span" first, remaining lengths strictly descending
        for n in 1..6 {
            let mut parts = vec![STANDARD_PART_MM; n];
            parts.extend([150, 1200, 600, 355]);
            let text = format_span_parts(&parts);
            let mut elements = text.split(", ");
            assert_eq!(elements.next(), Some(format!("{}span", n).as_str()));
            let rest: Vec<i64> = elements.map(|e| e.parse().unwrap()).collect();
            assert_eq!(rest, vec![1200, 600, 355, 150]);
        }
    }
}
