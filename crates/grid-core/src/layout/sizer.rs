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

//! Memoizing front end for grid sizing.

use log::debug;

use super::{available_width, compute_validated, LayoutConfig, SizingError, SizingResult};

#[derive(Debug, Clone, Copy)]
struct Memo {
    viewport_width: f64,
    result: SizingResult,
}

/// Sizes a grid for the current viewport, remembering the last answer.
///
/// The memo holds a single slot: layout passes ask again and again for the
/// same width until the viewport is resized, so only the most recent width is
/// worth keeping. `get_sizing` takes `&mut self`; the sizer belongs to
/// whichever thread drives layout.
#[derive(Debug)]
pub struct LayoutSizer {
    config: LayoutConfig,
    memo: Option<Memo>,
    computations: u64,
}

impl LayoutSizer {
    /// Create a sizer, rejecting configurations no viewport could satisfy.
    pub fn new(config: LayoutConfig) -> Result<Self, SizingError> {
        config.validate()?;
        Ok(Self {
            config,
            memo: None,
            computations: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Geometry for `viewport_width`, computed at most once per distinct width
    /// in a row of calls.
    pub fn get_sizing(&mut self, viewport_width: f64) -> SizingResult {
        let width = available_width(viewport_width);

        if let Some(memo) = self.memo {
            if memo.viewport_width.to_bits() == width.to_bits() {
                return memo.result;
            }
        }

        let result = compute_validated(&self.config.request_for(width));
        self.computations += 1;
        debug!(
            "Viewport width {} -> {} column(s) of {:.1}x{:.1} with spacing {}",
            width,
            result.column_count,
            result.cell_size.width,
            result.cell_size.height,
            result.spacing
        );

        self.memo = Some(Memo {
            viewport_width: width,
            result,
        });
        result
    }

    /// Width of the memoized result, if any.
    #[must_use]
    pub fn cached_width(&self) -> Option<f64> {
        self.memo.map(|m| m.viewport_width)
    }

    /// How many times the sizing was actually computed.
    #[must_use]
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Drop the memo so the next call recomputes.
    pub fn invalidate(&mut self) {
        self.memo = None;
    }
}
