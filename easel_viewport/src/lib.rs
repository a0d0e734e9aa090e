// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easel Viewport: the top-level coordinator of the Easel responsive-layout engine.
//!
//! [`ViewportCoordinator`] owns one of each component and drives them through
//! a small state machine:
//!
//! ```text
//! Uninitialized -> Initializing -> Idle <-> Analyzing
//!                                   |
//!                                   v
//!                               Destroyed
//! ```
//!
//! One analysis cycle:
//!
//! 1. Refresh visibility ([`easel_visibility::VisibilityTracker`]).
//! 2. Measure natural sizes through the [`easel_surface::GeometryCache`] and
//!    derive breakpoints ([`easel_layout::BreakpointManager`]).
//! 3. Plan ([`easel_layout::LayoutPlanner`]), repair spacing, validate. A plan
//!    that fails validation is replaced by a fallback: a floor-sized board,
//!    centered, with every other element where it started.
//! 4. Reconcile scroll regions ([`easel_scroll::OverflowPlanner`]), keeping the
//!    offset of regions whose element set did not change.
//! 5. Submit the plan to the [`easel_apply::LayoutApplier`]; the writes land in
//!    the next [`ViewportCoordinator::tick`] (or immediately during
//!    [`ViewportCoordinator::initialize`]).
//!
//! The host supplies time. [`ViewportCoordinator::next_deadline`] says when the
//! next tick is due; nothing happens between ticks and signals.
//!
//! Everything is in memory. No component persists anything.

mod config;
mod coordinator;
mod debounce;
mod state;

pub use config::CoordinatorConfig;
pub use coordinator::{TickOutcome, ViewportCoordinator};
pub use state::{CoordinatorError, CoordinatorState, ErrorStats, RegionSnapshot, StateSnapshot};
