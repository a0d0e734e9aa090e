// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use easel_apply::ApplierConfig;
use easel_layout::PlannerConfig;
use easel_scroll::ScrollConfig;
use easel_surface::Duration;
use easel_visibility::VisibilityConfig;

/// Coordinator parameters, including those of every owned component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoordinatorConfig {
    /// Quiet period after the last resize before re-analysing.
    pub debounce: Duration,
    /// Resizes smaller than this on both axes are ignored.
    pub resize_threshold: f64,
    /// Cached geometry older than this is dropped on the next tick.
    pub cache_max_age: Duration,
    /// Layout planning.
    pub planner: PlannerConfig,
    /// Visibility classification.
    pub visibility: VisibilityConfig,
    /// Scroll regions.
    pub scroll: ScrollConfig,
    /// Style writes.
    pub applier: ApplierConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(150),
            resize_threshold: 10.0,
            cache_max_age: Duration::from_millis(30_000),
            planner: PlannerConfig::default(),
            visibility: VisibilityConfig::default(),
            scroll: ScrollConfig::default(),
            applier: ApplierConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Replace the debounce window.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Replace the resize threshold.
    #[must_use]
    pub fn with_resize_threshold(mut self, threshold: f64) -> Self {
        self.resize_threshold = threshold.max(0.0);
        self
    }

    /// Replace the maximum age of cached geometry.
    #[must_use]
    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = max_age;
        self
    }

    /// Replace the planner configuration.
    #[must_use]
    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    /// Replace the visibility configuration.
    #[must_use]
    pub fn with_visibility(mut self, visibility: VisibilityConfig) -> Self {
        self.visibility = visibility;
        self
    }

    /// Replace the scroll configuration.
    #[must_use]
    pub fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    /// Replace the applier configuration.
    #[must_use]
    pub fn with_applier(mut self, applier: ApplierConfig) -> Self {
        self.applier = applier;
        self
    }
}
