// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easel Visibility: classify managed elements as visible or invisible.
//!
//! - [`VisibilityTracker`]: registry of managed elements with their
//!   [`VisibilityStatus`] (`is_visible`, intersection ratio, and a
//!   [`VisibilityReason`]), plus change callbacks.
//! - [`VisibilityObserver`]: the observation capability. Use [`RecordQueue`] to
//!   feed records from a native intersection primitive, or [`PollingObserver`] to
//!   derive them from surface geometry when no such primitive exists.
//!
//! Records are classified against the viewport expanded by
//! [`VisibilityConfig::margin`]; an element is visible when its visible fraction is
//! non-zero and reaches [`VisibilityConfig::threshold`].

mod observer;
mod tracker;

pub use observer::{
    PollingObserver, RecordQueue, VisibilityObserver, VisibilityRecord, intersection_ratio,
};
pub use tracker::{
    CallbackId, ManagedElement, VisibilityCallback, VisibilityChange, VisibilityConfig,
    VisibilityReason, VisibilityStatus, VisibilityTracker, classify,
};
