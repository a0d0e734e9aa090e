// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-batched application of layout plans.

use std::collections::VecDeque;

use easel_layout::{LayoutPlan, Position};
use easel_surface::{Damage, Duration, ElementId, HostTime, Surface};
use hashbrown::HashMap;
use kurbo::{Rect, Size};

use crate::validation::{ApplyError, Checked, check};

/// Applier parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ApplierConfig {
    /// Transition written alongside every placement change.
    pub transition: Duration,
    /// Animate placement changes. When off, no transition is written and
    /// writes never queue.
    pub animate: bool,
    /// Slack allowed before a position counts as out of bounds.
    pub tolerance: f64,
}

impl Default for ApplierConfig {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(300),
            animate: true,
            tolerance: 0.5,
        }
    }
}

impl ApplierConfig {
    /// Replace the transition duration.
    #[must_use]
    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    /// Enable or disable animation.
    #[must_use]
    pub fn with_animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }
}

/// Validation outcome of submitting a plan or a batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApplySummary {
    /// Positions accepted for the next frame (including clamped ones).
    pub accepted: usize,
    /// Positions moved back inside their bounds.
    pub clamped: usize,
    /// Positions refused; the previous valid position is kept.
    pub rejected: Vec<(ElementId, ApplyError)>,
}

impl ApplySummary {
    fn merge(&mut self, other: Self) {
        self.accepted += other.accepted;
        self.clamped += other.clamped;
        self.rejected.extend(other.rejected);
    }
}

/// What one [`LayoutApplier::frame`] did.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// Placements written.
    pub written: usize,
    /// Writes deferred behind an in-flight animation.
    pub queued: usize,
    /// Writes refused by the surface.
    pub rejected: Vec<(ElementId, ApplyError)>,
    /// Damage of the rendering pass.
    pub damage: Damage,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct PendingWrite {
    element: ElementId,
    position: Position,
}

/// Writes layout plans to a [`Surface`].
///
/// Only placement (position, size, stacking order) and transitions are ever
/// written; elements are never detached or recreated, so whatever the host
/// attached to them survives. Submitted positions are validated first and
/// collected; [`LayoutApplier::frame`] writes them all in one rendering pass.
/// A write for an element whose previous transition is still running waits in
/// a per-element FIFO queue until it completes.
///
/// ## Example
///
/// ```rust
/// use easel_apply::{ApplierConfig, LayoutApplier};
/// use easel_layout::{AnalysisResult, LayoutPlanner, PlannerConfig, SecondaryElement, Viewport};
/// use easel_surface::{Attachments, BoxSurface, HostTime, Surface};
/// use kurbo::{Rect, Size};
///
/// let mut surface = BoxSurface::new(Size::new(1200.0, 800.0));
/// let board = surface.insert_host(Rect::new(0.0, 0.0, 400.0, 400.0), Attachments::default());
/// let button = surface.insert_host(Rect::new(0.0, 0.0, 120.0, 40.0), Attachments::default());
///
/// let mut analysis = AnalysisResult::empty(Viewport::new(1200.0, 800.0));
/// analysis.board = Some(board);
/// analysis.secondary.push(SecondaryElement { id: button, size: Size::new(120.0, 40.0), visible: true });
/// let plan = LayoutPlanner::new(PlannerConfig::default()).calculate_optimal_layout(&analysis);
///
/// let mut applier = LayoutApplier::new(ApplierConfig::default());
/// let summary = applier.apply_layout(&plan);
/// assert_eq!(summary.accepted, 2);
/// let report = applier.frame(&mut surface, HostTime(0));
/// assert_eq!(report.written, 2);
/// assert_eq!(surface.bounds(board), Some(plan.board_position().rect()));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LayoutApplier {
    config: ApplierConfig,
    viewport: Rect,
    /// Content areas of scroll-contained elements from the last plan.
    regions: HashMap<ElementId, Rect>,
    pending: Vec<PendingWrite>,
    queues: HashMap<ElementId, VecDeque<PendingWrite>>,
    animations: HashMap<ElementId, HostTime>,
    last_valid: HashMap<ElementId, Position>,
    defaults: HashMap<ElementId, (Rect, i32)>,
    destroyed: bool,
}

impl LayoutApplier {
    /// Create an applier.
    pub fn new(config: ApplierConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration.
    pub fn config(&self) -> ApplierConfig {
        self.config
    }

    /// Set the viewport positions are validated against.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size.to_rect();
    }

    /// Submit every position of `plan` (board included) for the next frame.
    ///
    /// Anything submitted earlier but not yet written is discarded, including
    /// writes queued behind a running transition: a new plan replaces the
    /// previous one wholesale. Running transitions are left to finish.
    pub fn apply_layout(&mut self, plan: &LayoutPlan) -> ApplySummary {
        if self.destroyed {
            return ApplySummary::default();
        }
        self.pending.clear();
        self.queues.clear();
        self.viewport = plan.viewport.rect();
        self.regions.clear();
        for region in &plan.scroll_regions {
            for &element in region.elements() {
                self.regions.insert(element, region.content_rect());
            }
        }
        let mut summary = ApplySummary::default();
        if let Some(board) = plan.focal_element {
            summary.merge(self.submit(&[(board, plan.board_position())]));
        }
        summary.merge(self.submit(&plan.element_positions));
        tracing::debug!(
            accepted = summary.accepted,
            clamped = summary.clamped,
            rejected = summary.rejected.len(),
            "layout submitted"
        );
        summary
    }

    /// Submit one position for the next frame.
    pub fn update_element_position(&mut self, element: ElementId, position: Position) -> ApplySummary {
        self.batch_update(&[(element, position)])
    }

    /// Submit several positions, written together in the next frame.
    pub fn batch_update(&mut self, updates: &[(ElementId, Position)]) -> ApplySummary {
        if self.destroyed {
            return ApplySummary::default();
        }
        self.submit(updates)
    }

    fn submit(&mut self, updates: &[(ElementId, Position)]) -> ApplySummary {
        let mut summary = ApplySummary::default();
        for &(element, position) in updates {
            let bounds = self.regions.get(&element).copied().unwrap_or(self.viewport);
            match check(element, position, bounds, self.config.tolerance) {
                Ok(checked) => {
                    if matches!(checked, Checked::Clamped(_)) {
                        tracing::debug!(?element, "position clamped into bounds");
                        summary.clamped += 1;
                    }
                    summary.accepted += 1;
                    self.pending.push(PendingWrite {
                        element,
                        position: checked.position(),
                    });
                }
                Err(err) => {
                    tracing::warn!(?element, %err, "position rejected");
                    summary.rejected.push((element, err));
                }
            }
        }
        summary
    }

    /// Write everything that is due in one rendering pass.
    ///
    /// Finished transitions are retired first. Each element with queued writes
    /// and no running transition gets its oldest queued write; then submitted
    /// writes are written, or queued behind a running transition.
    pub fn frame(&mut self, surface: &mut dyn Surface, now: HostTime) -> FrameReport {
        let mut report = FrameReport::default();
        if self.destroyed {
            return report;
        }
        self.animations.retain(|_, end| *end > now);

        let mut ready: Vec<ElementId> = self
            .queues
            .keys()
            .filter(|e| !self.animations.contains_key(*e))
            .copied()
            .collect();
        ready.sort_unstable();
        for element in ready {
            if let Some(write) = self.queues.get_mut(&element).and_then(VecDeque::pop_front) {
                self.write(surface, write, now, &mut report);
            }
        }

        for write in core::mem::take(&mut self.pending) {
            let busy = self.animations.contains_key(&write.element)
                || self.queues.get(&write.element).is_some_and(|q| !q.is_empty());
            if busy {
                self.queues.entry(write.element).or_default().push_back(write);
                report.queued += 1;
            } else {
                self.write(surface, write, now, &mut report);
            }
        }
        self.queues.retain(|_, q| !q.is_empty());

        report.damage = surface.commit();
        report
    }

    fn write(&mut self, surface: &mut dyn Surface, write: PendingWrite, now: HostTime, report: &mut FrameReport) {
        let PendingWrite { element, position } = write;
        let (Some(current), Some(order)) = (surface.placement(element), surface.stack_order(element)) else {
            tracing::warn!(?element, "element vanished before its write");
            report.rejected.push((element, ApplyError::Stale(element)));
            return;
        };
        self.defaults.entry(element).or_insert((current, order));
        let rect = position.rect();
        let animate = self.config.animate && !self.config.transition.is_zero() && current != rect;
        let result = surface
            .set_transition(element, animate.then_some(self.config.transition))
            .and_then(|()| surface.set_placement(element, rect, position.stack_order));
        if let Err(err) = result {
            report.rejected.push((element, err.into()));
            return;
        }
        tracing::trace!(?element, ?rect, order = position.stack_order, "placement written");
        if animate {
            self.animations.insert(element, now + self.config.transition);
        }
        self.last_valid.insert(element, position);
        report.written += 1;
    }

    /// Put every element this applier touched back where it was before the first write.
    ///
    /// Pending and queued writes are dropped and running transitions are
    /// cleared. Returns the number of elements restored.
    pub fn revert_to_default(&mut self, surface: &mut dyn Surface) -> usize {
        self.pending.clear();
        self.queues.clear();
        self.animations.clear();
        let mut restored = 0;
        let mut defaults: Vec<(ElementId, (Rect, i32))> = self.defaults.drain().collect();
        defaults.sort_unstable_by_key(|(e, _)| *e);
        for (element, (rect, order)) in defaults {
            let result = surface
                .set_transition(element, None)
                .and_then(|()| surface.set_placement(element, rect, order));
            if result.is_ok() {
                restored += 1;
            }
        }
        self.last_valid.clear();
        surface.commit();
        tracing::debug!(restored, "layout reverted");
        restored
    }

    /// Whether a transition is running or writes are waiting behind one.
    pub fn is_animating(&self) -> bool {
        !self.animations.is_empty() || !self.queues.is_empty()
    }

    /// Whether writes were submitted but not yet written.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// When the earliest running transition ends.
    pub fn next_animation_end(&self) -> Option<HostTime> {
        self.animations.values().min().copied()
    }

    /// Last position successfully written for `element`.
    pub fn last_valid_position(&self, element: ElementId) -> Option<Position> {
        self.last_valid.get(&element).copied()
    }

    /// Number of writes waiting behind transitions.
    pub fn queued(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Drop all state. Later calls do nothing.
    pub fn destroy(&mut self) {
        self.pending.clear();
        self.queues.clear();
        self.animations.clear();
        self.last_valid.clear();
        self.defaults.clear();
        self.regions.clear();
        self.destroyed = true;
    }

    /// Whether [`LayoutApplier::destroy`] was called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
