// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easel Scroll: scroll regions for stacked secondary elements that do not fit.
//!
//! Planning and realisation are split:
//!
//! - [`ScrollRegionPlan`] is pure data computed by the layout planner: which
//!   elements are stacked, where (in unscrolled content coordinates), and the
//!   height cap of the visible frame. [`StackModel`] provides the offsets.
//! - [`OverflowPlanner`] realises plans on a [`Surface`](easel_surface::Surface):
//!   it creates the wrapper and the two indicator bars, applies scroll styling,
//!   keeps the indicators in sync with the offset, and handles programmatic
//!   scrolling, pointer/touch drag with momentum, and eased smooth scrolling.
//!
//! Offsets are always clamped to `[0, content_height - max_height]`.
//! Animation is driven by the host: call [`OverflowPlanner::frame`] with the
//! current [`HostTime`](easel_surface::HostTime) while
//! [`OverflowPlanner::is_animating`] is true.

mod motion;
mod planner;
mod region;
mod stack;

pub use motion::{ScrollAlign, align_offset, ease_out};
pub use planner::{IndicatorState, OverflowPlanner, RegionId, ScrollConfig, ScrollRegion};
pub use region::ScrollRegionPlan;
pub use stack::StackModel;
