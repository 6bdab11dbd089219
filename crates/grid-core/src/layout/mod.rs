// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Adaptive grid sizing.
//!
//! Given the width available to a grid, a preferred cell size and a small set
//! of candidate spacings, picks the spacing that fits the most columns
//! (preferring the larger spacing on a tie) and stretches the cells to fill
//! the row while keeping the preferred aspect ratio.
//!
//! When not even one preferred-width cell fits, the layout degrades to a
//! single narrowed cell per row that keeps the preferred height instead of
//! the aspect ratio.

mod sizer;

pub use sizer::LayoutSizer;

use thiserror::Error;

/// Default preferred cell width in points.
pub const DEFAULT_CELL_WIDTH: f64 = 358.0;
/// Default preferred cell height in points.
pub const DEFAULT_CELL_HEIGHT: f64 = 368.0;
/// Smallest spacing the grid will use between and around cells.
pub const DEFAULT_MINIMUM_SPACING: f64 = 8.0;
/// Spacing used when it costs no columns.
pub const DEFAULT_REQUESTED_SPACING: f64 = 16.0;

/// Errors that can occur when sizing a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("invalid sizing input for '{field}': {value}")]
    InvalidSizingInput { field: &'static str, value: String },
}

impl SizingError {
    fn invalid(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidSizingInput {
            field,
            value: value.to_string(),
        }
    }
}

/// Width and height of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub width: f64,
    pub height: f64,
}

impl CellSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Build a size of the given width whose `width / height` equals `aspect_ratio`.
    #[must_use]
    pub fn with_aspect_ratio(aspect_ratio: f64, width: f64) -> Self {
        Self {
            width,
            height: width / aspect_ratio,
        }
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Insets applied around the whole grid section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    #[must_use]
    pub fn uniform(inset: f64) -> Self {
        Self {
            top: inset,
            left: inset,
            bottom: inset,
            right: inset,
        }
    }
}

/// Static sizing configuration owned by a [`LayoutSizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub preferred_cell_width: f64,
    pub preferred_cell_height: f64,
    /// Candidate spacings, smallest first.
    pub spacing_candidates: Vec<f64>,
    /// Spacing used when no candidate fits a full cell.
    pub fallback_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            preferred_cell_width: DEFAULT_CELL_WIDTH,
            preferred_cell_height: DEFAULT_CELL_HEIGHT,
            spacing_candidates: vec![DEFAULT_MINIMUM_SPACING, DEFAULT_REQUESTED_SPACING],
            fallback_spacing: DEFAULT_MINIMUM_SPACING,
        }
    }
}

impl LayoutConfig {
    /// Build the sizing request for one viewport width.
    #[must_use]
    pub fn request_for(&self, viewport_width: f64) -> SizingRequest {
        SizingRequest {
            viewport_width,
            preferred_cell_size: CellSize::new(
                self.preferred_cell_width,
                self.preferred_cell_height,
            ),
            spacing_candidates: self.spacing_candidates.clone(),
            fallback_spacing: self.fallback_spacing,
        }
    }

    /// Check everything except the viewport width, which is never an error.
    pub fn validate(&self) -> Result<(), SizingError> {
        self.request_for(0.0).validate()
    }
}

/// Inputs to a single sizing computation.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingRequest {
    pub viewport_width: f64,
    /// Also defines the aspect ratio cells keep outside degraded mode.
    pub preferred_cell_size: CellSize,
    pub spacing_candidates: Vec<f64>,
    pub fallback_spacing: f64,
}

impl SizingRequest {
    pub fn validate(&self) -> Result<(), SizingError> {
        let CellSize { width, height } = self.preferred_cell_size;
        if !width.is_finite() || width <= 0.0 {
            return Err(SizingError::invalid("preferred_cell_size.width", width));
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(SizingError::invalid("preferred_cell_size.height", height));
        }
        if self.spacing_candidates.is_empty() {
            return Err(SizingError::invalid("spacing_candidates", "empty list"));
        }
        if let Some(bad) = self
            .spacing_candidates
            .iter()
            .find(|s| !s.is_finite() || **s < 0.0)
        {
            return Err(SizingError::invalid("spacing_candidates", bad));
        }
        if !self.fallback_spacing.is_finite() || self.fallback_spacing < 0.0 {
            return Err(SizingError::invalid("fallback_spacing", self.fallback_spacing));
        }
        Ok(())
    }
}

/// Chosen geometry for one viewport width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingResult {
    pub cell_size: CellSize,
    pub spacing: f64,
    /// Zero means degraded mode: one narrowed cell per row.
    pub column_count: u32,
}

impl SizingResult {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.column_count == 0
    }

    /// Cells actually placed in each row.
    #[must_use]
    pub fn cells_per_row(&self) -> u32 {
        self.column_count.max(1)
    }

    /// Uniform inset around the grid section.
    #[must_use]
    pub fn section_insets(&self) -> EdgeInsets {
        EdgeInsets::uniform(self.spacing)
    }

    /// Vertical gap between rows.
    #[must_use]
    pub fn line_spacing(&self) -> f64 {
        self.spacing
    }

    #[must_use]
    pub fn row_count(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.cells_per_row() as usize)
    }

    /// Total scrollable height for `item_count` cells, insets included.
    #[must_use]
    pub fn content_height(&self, item_count: usize) -> f64 {
        let rows = self.row_count(item_count);
        if rows == 0 {
            return 2.0 * self.spacing;
        }
        #[allow(clippy::cast_precision_loss, reason = "row counts are far below 2^52")]
        let rows = rows as f64;
        rows * self.cell_size.height + (rows + 1.0) * self.spacing
    }
}

/// Clamp a viewport width to the usable range; negative and non-finite widths
/// mean no space at all.
pub(crate) fn available_width(viewport_width: f64) -> f64 {
    if viewport_width.is_finite() && viewport_width > 0.0 {
        viewport_width
    } else {
        0.0
    }
}

/// Number of cells of at least `min_cell_width` that fit in a row with
/// `spacing` on both sides and between cells. Left unclamped so candidates
/// compare correctly even past `u32::MAX` columns.
fn columns_for_spacing(viewport_width: f64, spacing: f64, min_cell_width: f64) -> f64 {
    ((viewport_width - spacing) / (min_cell_width + spacing)).floor()
}

/// Column count as reported in a [`SizingResult`], saturating at `u32::MAX`.
fn clamp_columns(count: f64) -> u32 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "count is clamped to the u32 range first"
    )]
    let count = count.clamp(0.0, f64::from(u32::MAX)) as u32;
    count
}

/// Width of each of `columns` cells once the row's spacing is taken out.
fn cell_width_for_columns(viewport_width: f64, spacing: f64, columns: u32) -> f64 {
    let columns = f64::from(columns);
    (viewport_width - spacing * (columns + 1.0)) / columns
}

/// Compute the grid geometry for a request.
///
/// Deterministic and side-effect free; memoization lives in [`LayoutSizer`].
pub fn compute_sizing(request: &SizingRequest) -> Result<SizingResult, SizingError> {
    request.validate()?;
    Ok(compute_validated(request))
}

pub(crate) fn compute_validated(request: &SizingRequest) -> SizingResult {
    let viewport_width = available_width(request.viewport_width);
    let preferred = request.preferred_cell_size;

    let best = request
        .spacing_candidates
        .iter()
        .filter_map(|&spacing| {
            let columns = columns_for_spacing(viewport_width, spacing, preferred.width);
            (columns >= 1.0).then_some((spacing, columns))
        })
        // More columns first, then more spacing.
        .max_by(|a, b| a.1.total_cmp(&b.1).then(a.0.total_cmp(&b.0)));

    match best {
        Some((spacing, columns)) => {
            let columns = clamp_columns(columns);
            let width = cell_width_for_columns(viewport_width, spacing, columns);
            SizingResult {
                cell_size: CellSize::with_aspect_ratio(preferred.aspect_ratio(), width),
                spacing,
                column_count: columns,
            }
        }
        None => {
            let spacing = request.fallback_spacing;
            SizingResult {
                cell_size: CellSize::new(
                    (viewport_width - 2.0 * spacing).max(0.0),
                    preferred.height,
                ),
                spacing,
                column_count: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(viewport_width: f64) -> SizingRequest {
        LayoutConfig::default().request_for(viewport_width)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_tie_prefers_larger_spacing() {
        let result = compute_sizing(&request(800.0)).unwrap();
        assert_eq!(result.column_count, 2);
        assert_close(result.spacing, 16.0);
        assert_close(result.cell_size.width, 376.0);
        assert_close(result.cell_size.height, 376.0 * 368.0 / 358.0);
        assert!((result.cell_size.height - 386.5).abs() < 0.1);
    }

    #[test]
    fn test_more_columns_beat_larger_spacing() {
        // 8: floor(1112 / 366) = 3, 16: floor(1104 / 374) = 2
        let result = compute_sizing(&request(1120.0)).unwrap();
        assert_eq!(result.column_count, 3);
        assert_close(result.spacing, 8.0);
        assert_close(result.cell_size.width, (1120.0 - 32.0) / 3.0);
    }

    #[test]
    fn test_candidate_order_does_not_matter() {
        let mut reversed = request(800.0);
        reversed.spacing_candidates.reverse();
        assert_eq!(
            compute_sizing(&reversed).unwrap(),
            compute_sizing(&request(800.0)).unwrap()
        );
    }

    #[test]
    fn test_degraded_mode_keeps_height() {
        let result = compute_sizing(&request(100.0)).unwrap();
        assert!(result.is_degraded());
        assert_eq!(result.column_count, 0);
        assert_close(result.spacing, 8.0);
        assert_close(result.cell_size.width, 84.0);
        assert_close(result.cell_size.height, 368.0);
        assert_eq!(result.cells_per_row(), 1);
    }

    #[test]
    fn test_non_positive_viewport_is_degraded_with_zero_width() {
        for width in [0.0, -50.0, f64::NAN, f64::INFINITY] {
            let result = compute_sizing(&request(width)).unwrap();
            assert!(result.is_degraded());
            assert_close(result.cell_size.width, 0.0);
            assert_close(result.cell_size.height, 368.0);
        }
    }

    #[test]
    fn test_degraded_width_clamped_to_zero() {
        let result = compute_sizing(&request(10.0)).unwrap();
        assert_close(result.cell_size.width, 0.0);
    }

    #[test]
    fn test_exact_fit_boundary() {
        // 16 + 358 + 16 fits one cell with the larger spacing.
        let result = compute_sizing(&request(390.0)).unwrap();
        assert_eq!(result.column_count, 1);
        assert_close(result.spacing, 16.0);
        assert_close(result.cell_size.width, 358.0);
        assert_close(result.cell_size.height, 368.0);

        let narrower = compute_sizing(&request(389.0)).unwrap();
        assert_eq!(narrower.column_count, 1);
        assert_close(narrower.spacing, 8.0);
    }

    #[test]
    fn test_column_maximization_and_aspect_over_widths() {
        let preferred_ratio = DEFAULT_CELL_WIDTH / DEFAULT_CELL_HEIGHT;
        let mut width = 0.0;
        while width <= 4000.0 {
            let req = request(width);
            let result = compute_sizing(&req).unwrap();
            let best = req
                .spacing_candidates
                .iter()
                .map(|&s| columns_for_spacing(width, s, DEFAULT_CELL_WIDTH))
                .fold(0.0, f64::max);
            assert_eq!(result.column_count, clamp_columns(best), "width {width}");
            if best >= 1.0 {
                let max_spacing = req
                    .spacing_candidates
                    .iter()
                    .copied()
                    .filter(|&s| columns_for_spacing(width, s, DEFAULT_CELL_WIDTH) >= best)
                    .fold(f64::MIN, f64::max);
                assert_close(result.spacing, max_spacing);
                let ratio = result.cell_size.aspect_ratio();
                assert!(
                    ((ratio - preferred_ratio) / preferred_ratio).abs() < 1e-6,
                    "width {width}: ratio {ratio}"
                );
                assert!(result.cell_size.width >= DEFAULT_CELL_WIDTH - 1e-9);
            }
            width += 7.25;
        }
    }

    #[test]
    fn test_saturated_column_count_keeps_real_maximum() {
        // Both candidates exceed u32::MAX columns; 8 still fits more of them.
        let result = compute_sizing(&request(1e300)).unwrap();
        assert_eq!(result.column_count, u32::MAX);
        assert_close(result.spacing, 8.0);
    }

    #[test]
    fn test_deterministic() {
        let req = request(1366.0);
        let first = compute_sizing(&req).unwrap();
        for _ in 0..10 {
            assert_eq!(compute_sizing(&req).unwrap(), first);
        }
    }

    #[test]
    fn test_rejects_invalid_preferred_size() {
        let mut req = request(800.0);
        req.preferred_cell_size.width = 0.0;
        assert!(matches!(
            compute_sizing(&req),
            Err(SizingError::InvalidSizingInput {
                field: "preferred_cell_size.width",
                ..
            })
        ));

        let mut req = request(800.0);
        req.preferred_cell_size.height = -1.0;
        assert!(matches!(
            compute_sizing(&req),
            Err(SizingError::InvalidSizingInput {
                field: "preferred_cell_size.height",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_bad_spacings() {
        let mut req = request(800.0);
        req.spacing_candidates.clear();
        assert!(compute_sizing(&req).is_err());

        let mut req = request(800.0);
        req.spacing_candidates.push(f64::NAN);
        assert!(compute_sizing(&req).is_err());

        let mut req = request(800.0);
        req.fallback_spacing = -8.0;
        assert!(compute_sizing(&req).is_err());
    }

    #[test]
    fn test_section_geometry() {
        let result = compute_sizing(&request(800.0)).unwrap();
        assert_eq!(result.section_insets(), EdgeInsets::uniform(16.0));
        assert_close(result.line_spacing(), 16.0);
        assert_eq!(result.row_count(0), 0);
        assert_eq!(result.row_count(3), 2);
        assert_close(result.content_height(0), 32.0);
        assert_close(
            result.content_height(3),
            2.0 * result.cell_size.height + 3.0 * 16.0,
        );
    }
}
