// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easel Layout: decide where the board and the secondary elements go.
//!
//! - [`Viewport`]: snapshot of the display area (size, aspect ratio, orientation).
//! - [`LayoutPlanner`]: board-priority planning. Produces an immutable
//!   [`LayoutPlan`] with a square focal region, a [`LayoutStrategy`], a
//!   [`Position`] per secondary element, and any scroll regions.
//! - [`LayoutPlan::validate`]: the plan invariants (finite, square, floor-sized
//!   board, everything on screen or inside its scroll region).
//! - [`BreakpointManager`]: content-derived [`Breakpoints`], visibility-transition
//!   bookkeeping, and the minimum-spacing check and repair.
//!
//! Planning is pure: the same viewport and natural element sizes always give
//! the same plan.

mod breakpoints;
mod config;
mod flow;
mod plan;
mod planner;
mod viewport;

pub use breakpoints::{
    BreakpointBand, BreakpointManager, Breakpoints, ListenerId, RecalculationListener,
    SpacingAxis, SpacingReport, SpacingViolation,
};
pub use config::PlannerConfig;
pub use plan::{
    AnalysisResult, LayoutPlan, LayoutStrategy, PlanError, Position, SecondaryElement, TOLERANCE,
};
pub use planner::LayoutPlanner;
pub use viewport::{EXTREME_TALL, EXTREME_WIDE, Orientation, Viewport};
