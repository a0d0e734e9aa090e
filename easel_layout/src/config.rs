// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Size;

/// Layout planning parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Smallest allowed board side. Never shrunk below, whatever the viewport.
    pub min_board: f64,
    /// Margin kept between the layout and each viewport edge.
    pub margin: f64,
    /// Minimum gap between secondary elements, and between the board and them.
    pub spacing: f64,
    /// Aspect ratios above this prefer side-by-side.
    pub side_by_side_ratio: f64,
    /// Aspect ratios below this prefer stacked.
    pub stacked_ratio: f64,
    /// The mixed strategy is only considered from this many secondary elements.
    pub mixed_min_elements: usize,
    /// Reserve the board before considering secondary elements.
    pub prioritize_board: bool,
    /// Stacking order written for the board.
    pub board_layer: i32,
    /// Stacking order written for secondary elements.
    pub element_layer: i32,
    /// Size assumed per element when only a count is known.
    pub estimated_element: Size,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_board: 280.0,
            margin: 20.0,
            spacing: 16.0,
            side_by_side_ratio: 3.0,
            stacked_ratio: 0.33,
            mixed_min_elements: 4,
            prioritize_board: true,
            board_layer: 1,
            element_layer: 2,
            estimated_element: Size::new(160.0, 48.0),
        }
    }
}

impl PlannerConfig {
    /// Replace the board floor.
    #[must_use]
    pub fn with_min_board(mut self, min_board: f64) -> Self {
        self.min_board = min_board.max(0.0);
        self
    }

    /// Replace the viewport margin.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin.max(0.0);
        self
    }

    /// Replace the minimum spacing.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing.max(0.0);
        self
    }

    /// Enable or disable board priority.
    #[must_use]
    pub fn with_prioritize_board(mut self, prioritize: bool) -> Self {
        self.prioritize_board = prioritize;
        self
    }

    /// Replace the element count from which mixed layouts are considered.
    #[must_use]
    pub fn with_mixed_min_elements(mut self, count: usize) -> Self {
        self.mixed_min_elements = count;
        self
    }
}
