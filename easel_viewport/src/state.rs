// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use easel_layout::{BreakpointBand, LayoutPlan, Viewport};
use easel_scroll::{IndicatorState, RegionId};
use easel_surface::{CacheStats, ElementId, HostTime};

/// Lifecycle of a [`ViewportCoordinator`](crate::ViewportCoordinator).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CoordinatorState {
    /// Created, not yet initialized.
    Uninitialized,
    /// Running the first analysis.
    Initializing,
    /// Waiting for signals.
    Idle,
    /// Inside an analysis cycle.
    Analyzing,
    /// Torn down. Terminal.
    Destroyed,
}

/// Misuse of the coordinator lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// [`ViewportCoordinator::initialize`](crate::ViewportCoordinator::initialize) was not called yet.
    #[error("coordinator is not initialized")]
    NotInitialized,
    /// [`ViewportCoordinator::initialize`](crate::ViewportCoordinator::initialize) was already called.
    #[error("coordinator is already initialized")]
    AlreadyInitialized,
    /// The coordinator was destroyed and processes no further signals.
    #[error("coordinator is destroyed")]
    Destroyed,
}

/// Failures absorbed by the coordinator, by kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorStats {
    /// Dead element handles and malformed viewports.
    pub invalid_input: u64,
    /// Plans that failed validation and were replaced by the fallback layout.
    pub computation: u64,
    /// Positions or scroll regions refused before or while writing.
    pub application: u64,
}

impl ErrorStats {
    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.invalid_input + self.computation + self.application
    }
}

/// A live scroll region as seen from outside.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionSnapshot {
    /// Region handle.
    pub id: RegionId,
    /// Contained elements, top to bottom.
    pub elements: Vec<ElementId>,
    /// Current scroll offset.
    pub offset: f64,
    /// Whether the content exceeds the height cap.
    pub needs_scrolling: bool,
    /// Indicator bars.
    pub indicators: IndicatorState,
}

/// Read-only diagnostics returned by
/// [`ViewportCoordinator::get_state`](crate::ViewportCoordinator::get_state).
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    /// Lifecycle state.
    pub state: CoordinatorState,
    /// Last computed plan.
    pub plan: Option<LayoutPlan>,
    /// Viewport of the last analysis.
    pub viewport: Viewport,
    /// Breakpoint band of the last analysis.
    pub band: Option<BreakpointBand>,
    /// Geometry cache counters.
    pub cache: CacheStats,
    /// Absorbed failures.
    pub errors: ErrorStats,
    /// Analysis cycles run.
    pub analyses: u64,
    /// Analysis requests folded into a cycle already in flight.
    pub coalesced_requests: u64,
    /// Live scroll regions.
    pub regions: Vec<RegionSnapshot>,
    /// When the debounced analysis is due, if one is pending.
    pub pending_analysis: Option<HostTime>,
    /// Whether transitions or scroll animations are running.
    pub animating: bool,
}
