// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of managed elements and their visibility classification.

use easel_surface::{ElementId, Surface};
use hashbrown::HashMap;
use kurbo::{Rect, Size};

use crate::observer::{PollingObserver, VisibilityObserver, VisibilityRecord};

/// Why an element is (or is not) visible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VisibilityReason {
    /// Inside the viewport.
    InBounds,
    /// Mostly or entirely outside the viewport to the left or right.
    HorizontalOverflow,
    /// Mostly or entirely outside the viewport above or below.
    VerticalOverflow,
    /// Hidden via style.
    Hidden,
}

/// Classification of one element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisibilityStatus {
    /// Whether the element counts as visible.
    pub is_visible: bool,
    /// Visible fraction of the element.
    pub intersection_ratio: f64,
    /// Why.
    pub reason: VisibilityReason,
}

impl Default for VisibilityStatus {
    fn default() -> Self {
        Self {
            is_visible: true,
            intersection_ratio: 1.0,
            reason: VisibilityReason::InBounds,
        }
    }
}

/// Observation parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisibilityConfig {
    /// Minimum visible fraction for an element to count as visible.
    pub threshold: f64,
    /// Margin added around the viewport before intersecting.
    pub margin: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            margin: 0.0,
        }
    }
}

impl VisibilityConfig {
    /// Replace the threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Replace the margin.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// The observation root for a viewport of `size`.
    pub fn root(&self, size: Size) -> Rect {
        Rect::from_origin_size((0.0, 0.0), size).inflate(self.margin, self.margin)
    }
}

/// A registered element and its last known state.
#[derive(Clone, Debug, PartialEq)]
pub struct ManagedElement {
    /// The element.
    pub id: ElementId,
    /// Bounds from the last observation.
    pub last_bounds: Option<Rect>,
    /// Classification from the last observation.
    pub status: VisibilityStatus,
}

/// A classification change produced by one observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityChange {
    /// The element.
    pub element: ElementId,
    /// Visibility before this observation, `None` for the first one.
    pub was_visible: Option<bool>,
    /// The new classification.
    pub status: VisibilityStatus,
}

/// Handle for removing a registered callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallbackId(u32);

/// Callback invoked with `(element, is_visible, status)`.
pub type VisibilityCallback = Box<dyn FnMut(ElementId, bool, &VisibilityStatus)>;

/// Classify one observation.
///
/// Elements whose visible fraction reaches `threshold` (and is non-zero) are
/// visible. Otherwise the reason tells whether the element left the viewport
/// horizontally or vertically (comparing how far it overflows on each axis),
/// or is hidden via style.
pub fn classify(record: &VisibilityRecord, viewport: Rect, threshold: f64) -> VisibilityStatus {
    if record.hidden {
        return VisibilityStatus {
            is_visible: false,
            intersection_ratio: 0.0,
            reason: VisibilityReason::Hidden,
        };
    }
    let ratio = record.intersection_ratio;
    if ratio > 0.0 && ratio >= threshold {
        return VisibilityStatus {
            is_visible: true,
            intersection_ratio: ratio,
            reason: VisibilityReason::InBounds,
        };
    }
    let visible = record.clip.map_or(viewport, |c| c.intersect(viewport));
    let b = record.bounds;
    let outside_h = b.x1 <= visible.x0 || b.x0 >= visible.x1;
    let outside_v = b.y1 <= visible.y0 || b.y0 >= visible.y1;
    let reason = match (outside_h, outside_v) {
        (true, false) => VisibilityReason::HorizontalOverflow,
        (false, true) => VisibilityReason::VerticalOverflow,
        _ => {
            let over_h = (visible.x0 - b.x0).max(0.0) + (b.x1 - visible.x1).max(0.0);
            let over_v = (visible.y0 - b.y0).max(0.0) + (b.y1 - visible.y1).max(0.0);
            if over_h > over_v {
                VisibilityReason::HorizontalOverflow
            } else {
                VisibilityReason::VerticalOverflow
            }
        }
    };
    VisibilityStatus {
        is_visible: false,
        intersection_ratio: ratio,
        reason,
    }
}

/// Tracks which managed elements are visible relative to the viewport.
///
/// Classification lives in memory only. Invalid input (stale handles, records
/// for unregistered elements) is ignored.
///
/// ## Example
///
/// ```rust
/// use easel_surface::{Attachments, BoxSurface};
/// use easel_visibility::{VisibilityConfig, VisibilityReason, VisibilityTracker};
/// use kurbo::{Rect, Size};
///
/// let mut surface = BoxSurface::new(Size::new(400.0, 300.0));
/// let inside = surface.insert_host(Rect::new(10.0, 10.0, 60.0, 40.0), Attachments::default());
/// let below = surface.insert_host(Rect::new(10.0, 500.0, 60.0, 540.0), Attachments::default());
///
/// let mut tracker = VisibilityTracker::new(VisibilityConfig::default());
/// tracker.observe(&surface, inside);
/// tracker.observe(&surface, below);
/// tracker.refresh(&surface, Size::new(400.0, 300.0));
///
/// assert!(tracker.is_visible(inside));
/// assert_eq!(tracker.invisible_elements(), vec![below]);
/// assert_eq!(tracker.status(below).unwrap().reason, VisibilityReason::VerticalOverflow);
/// ```
pub struct VisibilityTracker<O: VisibilityObserver = PollingObserver> {
    observer: O,
    config: VisibilityConfig,
    registry: HashMap<ElementId, ManagedElement>,
    order: Vec<ElementId>,
    callbacks: Vec<(CallbackId, VisibilityCallback)>,
    next_callback: u32,
    destroyed: bool,
}

impl<O: VisibilityObserver + core::fmt::Debug> core::fmt::Debug for VisibilityTracker<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisibilityTracker")
            .field("observer", &self.observer)
            .field("config", &self.config)
            .field("managed", &self.order.len())
            .field("callbacks", &self.callbacks.len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl VisibilityTracker {
    /// Create a tracker using the polling fallback.
    pub fn new(config: VisibilityConfig) -> Self {
        Self::with_observer(PollingObserver::new(), config)
    }
}

impl<O: VisibilityObserver> VisibilityTracker<O> {
    /// Create a tracker over a specific observation primitive.
    pub fn with_observer(observer: O, config: VisibilityConfig) -> Self {
        Self {
            observer,
            config,
            registry: HashMap::new(),
            order: Vec::new(),
            callbacks: Vec::new(),
            next_callback: 0,
            destroyed: false,
        }
    }

    /// The observation primitive.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observation primitive (for pushing native records).
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Active configuration.
    pub fn config(&self) -> VisibilityConfig {
        self.config
    }

    /// Register `id`. Returns `false` (and changes nothing) for elements that
    /// are not alive on `surface` or after [`VisibilityTracker::destroy`].
    pub fn observe(&mut self, surface: &dyn Surface, id: ElementId) -> bool {
        if self.destroyed || !surface.is_alive(id) {
            tracing::warn!(?id, "ignoring observe for unknown element");
            return false;
        }
        if self.registry.contains_key(&id) {
            return true;
        }
        self.registry.insert(
            id,
            ManagedElement {
                id,
                last_bounds: None,
                status: VisibilityStatus::default(),
            },
        );
        self.order.push(id);
        self.observer.observe(id);
        true
    }

    /// Unregister `id`. Returns whether it was registered.
    pub fn unobserve(&mut self, id: ElementId) -> bool {
        if self.registry.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|e| *e != id);
        self.observer.unobserve(id);
        true
    }

    /// Whether `id` is registered.
    pub fn is_managed(&self, id: ElementId) -> bool {
        self.registry.contains_key(&id)
    }

    /// Registered elements in registration order.
    pub fn managed(&self) -> &[ElementId] {
        &self.order
    }

    /// Classification of every registered element, in registration order.
    pub fn visibility_map(&self) -> impl Iterator<Item = (ElementId, &VisibilityStatus)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.registry.get(id).map(|m| (*id, &m.status)))
    }

    /// Registered elements currently classified invisible, in registration order.
    pub fn invisible_elements(&self) -> Vec<ElementId> {
        self.visibility_map()
            .filter(|(_, s)| !s.is_visible)
            .map(|(id, _)| id)
            .collect()
    }

    /// Whether `id` is registered and visible.
    pub fn is_visible(&self, id: ElementId) -> bool {
        self.registry.get(&id).is_some_and(|m| m.status.is_visible)
    }

    /// Classification of `id`, if registered.
    pub fn status(&self, id: ElementId) -> Option<&VisibilityStatus> {
        self.registry.get(&id).map(|m| &m.status)
    }

    /// The registry entry of `id`.
    pub fn element(&self, id: ElementId) -> Option<&ManagedElement> {
        self.registry.get(&id)
    }

    /// Register a callback invoked for every classification change.
    pub fn on_visibility_change(&mut self, callback: VisibilityCallback) -> CallbackId {
        let id = CallbackId(self.next_callback);
        self.next_callback = self.next_callback.wrapping_add(1);
        self.callbacks.push((id, callback));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn remove_callback(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(c, _)| *c != id);
        before != self.callbacks.len()
    }

    /// Pull records from the observer and classify them against a viewport of `viewport` size.
    pub fn refresh(&mut self, surface: &dyn Surface, viewport: Size) -> Vec<VisibilityChange> {
        if self.destroyed {
            return Vec::new();
        }
        let root = self.config.root(viewport);
        let records = self.observer.take_records(surface, root);
        self.process_records(&records, viewport)
    }

    /// Classify records delivered by the environment.
    ///
    /// Records for unregistered elements are ignored. Callbacks fire, and a
    /// [`VisibilityChange`] is returned, only for records that change an
    /// element's classification (or classify it for the first time).
    pub fn process_records(
        &mut self,
        records: &[VisibilityRecord],
        viewport: Size,
    ) -> Vec<VisibilityChange> {
        let root = self.config.root(viewport);
        let mut changes = Vec::new();
        for record in records {
            let Some(managed) = self.registry.get_mut(&record.element) else {
                continue;
            };
            let status = classify(record, root, self.config.threshold);
            let first = managed.last_bounds.is_none();
            let prev = managed.status;
            managed.last_bounds = Some(record.bounds);
            managed.status = status;
            if !first && prev.is_visible == status.is_visible && prev.reason == status.reason {
                continue;
            }
            tracing::debug!(
                element = ?record.element,
                visible = status.is_visible,
                ratio = status.intersection_ratio,
                reason = ?status.reason,
                "visibility changed"
            );
            for (_, cb) in &mut self.callbacks {
                cb(record.element, status.is_visible, &status);
            }
            changes.push(VisibilityChange {
                element: record.element,
                was_visible: (!first).then_some(prev.is_visible),
                status,
            });
        }
        changes
    }

    /// Stop observing, drop every registration and callback.
    ///
    /// Subsequent calls are no-ops.
    pub fn destroy(&mut self) {
        self.observer.disconnect();
        self.registry.clear();
        self.order.clear();
        self.callbacks.clear();
        self.destroyed = true;
    }

    /// Whether [`VisibilityTracker::destroy`] was called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
