// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observation capability and its two stock implementations.

use easel_surface::{ElementId, Surface};
use kurbo::Rect;

/// One observation of an element against the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityRecord {
    /// The observed element.
    pub element: ElementId,
    /// On-screen bounds at observation time.
    pub bounds: Rect,
    /// Clip from enclosing scroll regions, if any.
    pub clip: Option<Rect>,
    /// Visible fraction of the element's area, in `[0, 1]`.
    pub intersection_ratio: f64,
    /// Whether the element was hidden via style.
    pub hidden: bool,
}

/// Continuous visibility observation, as provided by the environment.
///
/// A browser host backs this with an intersection observer and feeds its
/// entries through a [`RecordQueue`]; hosts without such a primitive use
/// [`PollingObserver`], which derives the same records from surface geometry
/// whenever the host reports a scroll or resize.
pub trait VisibilityObserver {
    /// Start observing `id`.
    fn observe(&mut self, id: ElementId);

    /// Stop observing `id`.
    fn unobserve(&mut self, id: ElementId);

    /// Drain the records produced since the last call.
    ///
    /// `viewport` is the observation root, already expanded by the configured margin.
    fn take_records(&mut self, surface: &dyn Surface, viewport: Rect) -> Vec<VisibilityRecord>;

    /// Stop observing everything.
    fn disconnect(&mut self);
}

/// Fraction of `bounds` that lies inside `viewport` (and inside `clip`, if any).
///
/// Zero-area elements count as fully visible when their origin is inside the
/// visible area and invisible otherwise.
pub fn intersection_ratio(bounds: Rect, clip: Option<Rect>, viewport: Rect) -> f64 {
    let visible = clip.map_or(viewport, |c| c.intersect(viewport));
    let area = bounds.area();
    if area <= 0.0 {
        return if visible.contains(bounds.origin()) {
            1.0
        } else {
            0.0
        };
    }
    let shown = bounds.intersect(visible);
    (shown.area() / area).clamp(0.0, 1.0)
}

/// Manual fallback: computes records from surface geometry on every poll.
#[derive(Clone, Debug, Default)]
pub struct PollingObserver {
    observed: Vec<ElementId>,
}

impl PollingObserver {
    /// Create an observer with nothing observed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements currently observed, in registration order.
    pub fn observed(&self) -> &[ElementId] {
        &self.observed
    }
}

impl VisibilityObserver for PollingObserver {
    fn observe(&mut self, id: ElementId) {
        if !self.observed.contains(&id) {
            self.observed.push(id);
        }
    }

    fn unobserve(&mut self, id: ElementId) {
        self.observed.retain(|e| *e != id);
    }

    fn take_records(&mut self, surface: &dyn Surface, viewport: Rect) -> Vec<VisibilityRecord> {
        self.observed
            .iter()
            .filter_map(|&element| {
                let bounds = surface.bounds(element)?;
                let clip = surface.clip(element);
                let hidden = surface.is_hidden(element);
                Some(VisibilityRecord {
                    element,
                    bounds,
                    clip,
                    intersection_ratio: if hidden {
                        0.0
                    } else {
                        intersection_ratio(bounds, clip, viewport)
                    },
                    hidden,
                })
            })
            .collect()
    }

    fn disconnect(&mut self) {
        self.observed.clear();
    }
}

/// Queue fed by a native observation primitive.
///
/// The host pushes whatever its environment reports; records for elements that
/// are not observed are dropped.
#[derive(Clone, Debug, Default)]
pub struct RecordQueue {
    observed: Vec<ElementId>,
    pending: Vec<VisibilityRecord>,
}

impl RecordQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a record reported by the environment.
    pub fn push(&mut self, record: VisibilityRecord) {
        if self.observed.contains(&record.element) {
            self.pending.push(record);
        }
    }

    /// Number of records waiting to be taken.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl VisibilityObserver for RecordQueue {
    fn observe(&mut self, id: ElementId) {
        if !self.observed.contains(&id) {
            self.observed.push(id);
        }
    }

    fn unobserve(&mut self, id: ElementId) {
        self.observed.retain(|e| *e != id);
        self.pending.retain(|r| r.element != id);
    }

    fn take_records(&mut self, _surface: &dyn Surface, _viewport: Rect) -> Vec<VisibilityRecord> {
        core::mem::take(&mut self.pending)
    }

    fn disconnect(&mut self) {
        self.observed.clear();
        self.pending.clear();
    }
}
