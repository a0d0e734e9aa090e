// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easel Apply: write layout plans to a [`Surface`](easel_surface::Surface).
//!
//! [`LayoutApplier`] validates every submitted [`Position`](easel_layout::Position)
//! (finite, non-negative, inside the viewport or its scroll region's content
//! area, clamping small overhangs) and batches the accepted ones into a single
//! rendering pass per [`LayoutApplier::frame`]. Placement changes carry a
//! transition; an element that is still moving queues further writes in FIFO
//! order until its transition ends.
//!
//! Only geometry and stacking order are written. Elements are never detached
//! or recreated, so host attachments and focus are preserved.

mod applier;
mod validation;

pub use applier::{ApplierConfig, ApplySummary, FrameReport, LayoutApplier};
pub use validation::ApplyError;
