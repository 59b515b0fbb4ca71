//! Quality metrics attached to each extracted table.

use serde::Serialize;

/// How well the text fit the detected grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParsingReport {
    /// 100 when every fragment fit its cell exactly
    pub accuracy: f32,
    /// Percentage of empty cells
    pub whitespace: f32,
    /// 1-based position of the table on its page, topmost first
    pub order: usize,
    /// Page number supplied by the caller
    pub page: usize,
}

impl ParsingReport {
    /// Build a report from per-fragment errors and the final cell text.
    pub fn new(errors: &[f32], data: &[Vec<String>], order: usize, page: usize) -> Self {
        Self {
            accuracy: round2(compute_accuracy(errors)),
            whitespace: round2(compute_whitespace(data)),
            order,
            page,
        }
    }
}

/// Weighted accuracy over fragment placement errors.
///
/// Every fragment carries an equal share of 100 points, reduced by its error.
///
/// # Examples
///
/// ```
/// use lattice_oxide::lattice::report::compute_accuracy;
///
/// assert_eq!(compute_accuracy(&[0.0, 0.0]), 100.0);
/// assert_eq!(compute_accuracy(&[0.0, 0.5]), 75.0);
/// assert_eq!(compute_accuracy(&[]), 0.0);
/// ```
pub fn compute_accuracy(errors: &[f32]) -> f32 {
    if errors.is_empty() {
        return 0.0;
    }
    let weight = 100.0 / errors.len() as f32;
    errors.iter().map(|e| weight * (1.0 - e)).sum()
}

/// Percentage of cells whose text is blank.
pub fn compute_whitespace(data: &[Vec<String>]) -> f32 {
    let total: usize = data.iter().map(Vec::len).sum();
    if total == 0 {
        return 0.0;
    }
    let empty = data.iter().flatten().filter(|s| s.trim().is_empty()).count();
    100.0 * empty as f32 / total as f32
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
