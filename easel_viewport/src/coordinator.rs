// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The analyze, plan, apply state machine.

use easel_apply::LayoutApplier;
use easel_layout::{
    AnalysisResult, BreakpointBand, BreakpointManager, LayoutPlan, LayoutPlanner, LayoutStrategy,
    ListenerId, Position, RecalculationListener, SecondaryElement, Viewport,
};
use easel_scroll::{OverflowPlanner, RegionId, ScrollAlign};
use easel_surface::{ElementId, GeometryCache, HostTime, Surface};
use easel_visibility::{
    CallbackId, PollingObserver, VisibilityCallback, VisibilityChange, VisibilityObserver,
    VisibilityRecord, VisibilityTracker,
};
use hashbrown::HashMap;
use kurbo::{Rect, Size};

use crate::config::CoordinatorConfig;
use crate::debounce::Debounce;
use crate::state::{CoordinatorError, CoordinatorState, ErrorStats, RegionSnapshot, StateSnapshot};

/// What one [`ViewportCoordinator::tick`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// An analysis cycle ran (debounced, or triggered by visibility).
    pub analyzed: bool,
    /// Placements written.
    pub written: usize,
    /// A scroll animation is still running.
    pub scrolling: bool,
}

/// Owns every component and drives the analyze, plan, apply cycle.
///
/// The host forwards signals (`handle_resize`, `handle_orientation_change`,
/// `handle_scroll`, visibility records) and calls [`ViewportCoordinator::tick`]
/// at or after [`ViewportCoordinator::next_deadline`]. All times are host time;
/// the coordinator never reads a clock.
///
/// - Resizes are debounced; a resize smaller than the threshold on both axes
///   does nothing.
/// - Orientation changes clear the geometry cache and join the pending debounce
///   window.
/// - A visibility transition analyses immediately and cancels the debounce.
/// - A request that arrives while a cycle is running is folded into it.
///
/// Failures never escape: bad handles and malformed viewports are counted as
/// invalid input, plans that fail validation are replaced with a fallback, and
/// refused writes keep the previous position. See [`ErrorStats`].
///
/// ## Example
///
/// ```rust
/// use easel_surface::{Attachments, BoxSurface, HostTime, Surface};
/// use easel_viewport::{CoordinatorConfig, ViewportCoordinator};
/// use kurbo::{Rect, Size};
///
/// let mut surface = BoxSurface::new(Size::new(1920.0, 1080.0));
/// let board = surface.insert_host(Rect::new(0.0, 0.0, 600.0, 600.0), Attachments::default());
/// let mut coordinator =
///     ViewportCoordinator::new(surface, Some(board), Vec::new(), CoordinatorConfig::default());
/// coordinator.initialize(HostTime(0)).unwrap();
///
/// // Layout is written before the first paint.
/// assert_eq!(coordinator.surface().bounds(board), Some(Rect::new(440.0, 20.0, 1480.0, 1060.0)));
///
/// // Let the transition finish, then resize; resizes wait for the debounce window.
/// coordinator.tick(HostTime(300)).unwrap();
/// coordinator.surface_mut().set_viewport_size(Size::new(1280.0, 720.0));
/// assert!(coordinator.handle_resize(1280.0, 720.0, HostTime(1000)).unwrap());
/// assert_eq!(coordinator.next_deadline(), Some(HostTime(1150)));
/// coordinator.tick(HostTime(1150)).unwrap();
/// assert_eq!(coordinator.surface().bounds(board), Some(Rect::new(300.0, 20.0, 980.0, 700.0)));
/// ```
pub struct ViewportCoordinator<S: Surface, O: VisibilityObserver = PollingObserver> {
    surface: S,
    config: CoordinatorConfig,
    state: CoordinatorState,
    board: Option<ElementId>,
    secondary: Vec<ElementId>,
    /// Placement of each element when it was registered.
    originals: HashMap<ElementId, (Rect, i32)>,
    cache: GeometryCache,
    tracker: VisibilityTracker<O>,
    planner: LayoutPlanner,
    overflow: OverflowPlanner,
    applier: LayoutApplier,
    breakpoints: BreakpointManager,
    debounce: Debounce,
    /// Latest size reported by the host.
    signalled: Size,
    /// Viewport of the last analysis.
    viewport: Viewport,
    band: Option<BreakpointBand>,
    plan: Option<LayoutPlan>,
    errors: ErrorStats,
    analyses: u64,
    coalesced: u64,
    now: HostTime,
}

impl<S: Surface + core::fmt::Debug, O: VisibilityObserver + core::fmt::Debug> core::fmt::Debug
    for ViewportCoordinator<S, O>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewportCoordinator")
            .field("surface", &self.surface)
            .field("state", &self.state)
            .field("board", &self.board)
            .field("secondary", &self.secondary)
            .field("viewport", &self.viewport)
            .field("band", &self.band)
            .field("errors", &self.errors)
            .field("analyses", &self.analyses)
            .field("pending", &self.debounce.deadline())
            .finish_non_exhaustive()
    }
}

impl<S: Surface> ViewportCoordinator<S> {
    /// Create a coordinator that polls surface geometry for visibility.
    ///
    /// Nothing is observed or written until [`ViewportCoordinator::initialize`].
    pub fn new(
        surface: S,
        board: Option<ElementId>,
        secondary: Vec<ElementId>,
        config: CoordinatorConfig,
    ) -> Self {
        Self::with_observer(surface, PollingObserver::new(), board, secondary, config)
    }
}

impl<S: Surface, O: VisibilityObserver> ViewportCoordinator<S, O> {
    /// Create a coordinator over a host-provided visibility primitive.
    pub fn with_observer(
        surface: S,
        observer: O,
        board: Option<ElementId>,
        secondary: Vec<ElementId>,
        config: CoordinatorConfig,
    ) -> Self {
        let mut unique: Vec<ElementId> = Vec::with_capacity(secondary.len());
        for id in secondary {
            if Some(id) != board && !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self {
            surface,
            config,
            state: CoordinatorState::Uninitialized,
            board,
            secondary: unique,
            originals: HashMap::new(),
            cache: GeometryCache::new(),
            tracker: VisibilityTracker::with_observer(observer, config.visibility),
            planner: LayoutPlanner::new(config.planner),
            overflow: OverflowPlanner::new(config.scroll),
            applier: LayoutApplier::new(config.applier),
            breakpoints: BreakpointManager::new(config.planner),
            debounce: Debounce::new(config.debounce),
            signalled: Size::ZERO,
            viewport: Viewport::new(0.0, 0.0),
            band: None,
            plan: None,
            errors: ErrorStats::default(),
            analyses: 0,
            coalesced: 0,
            now: HostTime::default(),
        }
    }

    /// Register the elements and lay them out before anything is painted.
    ///
    /// Runs one analysis synchronously and writes its result in the same call.
    pub fn initialize(&mut self, now: HostTime) -> Result<(), CoordinatorError> {
        match self.state {
            CoordinatorState::Uninitialized => {}
            CoordinatorState::Destroyed => return Err(CoordinatorError::Destroyed),
            _ => return Err(CoordinatorError::AlreadyInitialized),
        }
        self.state = CoordinatorState::Initializing;
        self.now = now;
        self.signalled = self.surface.viewport_size();

        if let Some(board) = self.board
            && !self.register(board)
        {
            self.board = None;
        }
        let candidates = core::mem::take(&mut self.secondary);
        for id in candidates {
            if self.register(id) {
                self.secondary.push(id);
            }
        }

        self.analyze(now);
        self.flush(now);
        if self.poll_visibility(now) {
            self.flush(now);
        }
        tracing::debug!(
            board = ?self.board,
            elements = self.secondary.len(),
            width = self.viewport.width,
            height = self.viewport.height,
            "coordinator initialized"
        );
        Ok(())
    }

    fn register(&mut self, id: ElementId) -> bool {
        if !self.tracker.observe(&self.surface, id) {
            self.errors.invalid_input += 1;
            return false;
        }
        if let (Some(rect), Some(order)) = (self.surface.placement(id), self.surface.stack_order(id)) {
            self.originals.entry(id).or_insert((rect, order));
        }
        true
    }

    fn ensure_running(&self) -> Result<(), CoordinatorError> {
        match self.state {
            CoordinatorState::Uninitialized => Err(CoordinatorError::NotInitialized),
            CoordinatorState::Destroyed => Err(CoordinatorError::Destroyed),
            _ => Ok(()),
        }
    }

    /// The host's viewport changed size.
    ///
    /// Returns whether an analysis was scheduled; changes below the resize
    /// threshold on both axes are ignored.
    pub fn handle_resize(
        &mut self,
        width: f64,
        height: f64,
        now: HostTime,
    ) -> Result<bool, CoordinatorError> {
        self.ensure_running()?;
        self.now = now;
        self.signalled = Size::new(width, height);
        let threshold = self.config.resize_threshold;
        let dw = (width - self.viewport.width).abs();
        let dh = (height - self.viewport.height).abs();
        if dw < threshold && dh < threshold {
            tracing::trace!(width, height, "resize below threshold ignored");
            return Ok(false);
        }
        self.debounce.restart(now);
        tracing::trace!(width, height, due = ?self.debounce.deadline(), "analysis scheduled");
        Ok(true)
    }

    /// The device orientation changed.
    ///
    /// Clears the geometry cache and analyses within the pending debounce
    /// window, or a fresh one.
    pub fn handle_orientation_change(
        &mut self,
        width: f64,
        height: f64,
        now: HostTime,
    ) -> Result<(), CoordinatorError> {
        self.ensure_running()?;
        self.now = now;
        self.signalled = Size::new(width, height);
        self.cache.clear();
        self.debounce.join(now);
        tracing::debug!(width, height, "orientation changed");
        Ok(())
    }

    /// The page scrolled. Polls visibility; returns whether a transition
    /// triggered an analysis.
    pub fn handle_scroll(&mut self, now: HostTime) -> Result<bool, CoordinatorError> {
        self.ensure_running()?;
        self.now = now;
        Ok(self.poll_visibility(now))
    }

    /// Feed records from a native visibility primitive.
    ///
    /// Returns whether a transition triggered an analysis.
    pub fn process_visibility_records(
        &mut self,
        records: &[VisibilityRecord],
        now: HostTime,
    ) -> Result<bool, CoordinatorError> {
        self.ensure_running()?;
        self.now = now;
        let changes = self.tracker.process_records(records, self.viewport.size());
        Ok(self.on_changes(&changes, now))
    }

    /// Advance time: age out cached geometry, run a due debounced analysis,
    /// step scroll animations, and write everything that is ready in one
    /// rendering pass.
    pub fn tick(&mut self, now: HostTime) -> Result<TickOutcome, CoordinatorError> {
        self.ensure_running()?;
        self.now = now;
        let evicted = self.cache.evict_older_than(now, self.config.cache_max_age);
        if evicted > 0 {
            tracing::trace!(evicted, "stale geometry dropped");
        }
        let mut outcome = TickOutcome::default();
        if self.debounce.fire(now) {
            self.analyze(now);
            outcome.analyzed = true;
        }
        let scrolling = self.overflow.is_animating();
        if scrolling {
            outcome.scrolling = self.overflow.frame(&mut self.surface, now);
        }
        if scrolling || self.applier.has_pending() || self.applier.is_animating() {
            outcome.written = self.flush(now);
            if outcome.written > 0 || scrolling {
                outcome.analyzed |= self.poll_visibility(now);
            }
        }
        Ok(outcome)
    }

    /// When the host should next call [`ViewportCoordinator::tick`].
    pub fn next_deadline(&self) -> Option<HostTime> {
        if matches!(
            self.state,
            CoordinatorState::Uninitialized | CoordinatorState::Destroyed
        ) {
            return None;
        }
        let frame = self.applier.has_pending().then_some(self.now);
        [
            self.debounce.deadline(),
            frame,
            self.applier.next_animation_end(),
            self.overflow.next_frame(self.now),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Start managing another secondary element. It is laid out by the next
    /// debounced analysis.
    pub fn observe(&mut self, id: ElementId, now: HostTime) -> Result<bool, CoordinatorError> {
        self.ensure_running()?;
        self.now = now;
        if Some(id) == self.board || self.secondary.contains(&id) {
            return Ok(true);
        }
        if !self.register(id) {
            tracing::warn!(?id, "ignoring observe for unknown element");
            return Ok(false);
        }
        self.secondary.push(id);
        self.debounce.join(now);
        Ok(true)
    }

    /// Stop managing an element. Its last written placement stays.
    pub fn unobserve(&mut self, id: ElementId, now: HostTime) -> Result<bool, CoordinatorError> {
        self.ensure_running()?;
        self.now = now;
        let was_board = self.board == Some(id);
        let before = self.secondary.len();
        self.secondary.retain(|e| *e != id);
        if !was_board && before == self.secondary.len() {
            return Ok(false);
        }
        if was_board {
            self.board = None;
        }
        self.forget(id);
        self.debounce.join(now);
        Ok(true)
    }

    fn forget(&mut self, id: ElementId) {
        self.tracker.unobserve(id);
        self.breakpoints.forget(id);
        self.cache.invalidate(id);
        self.originals.remove(&id);
    }

    /// Register a callback for every visibility classification change.
    pub fn on_visibility_change(&mut self, callback: VisibilityCallback) -> CallbackId {
        self.tracker.on_visibility_change(callback)
    }

    /// Register a listener fired once per actual visibility transition.
    pub fn on_recalculate(&mut self, listener: RecalculationListener) -> ListenerId {
        self.breakpoints.on_recalculate(listener)
    }

    /// Scroll a region by `delta`. Returns the applied offset.
    pub fn scroll_by(&mut self, region: RegionId, delta: f64, now: HostTime) -> Option<f64> {
        self.ensure_running().ok()?;
        let applied = self.overflow.scroll_by(&mut self.surface, region, delta)?;
        self.after_scroll(now);
        Some(applied)
    }

    /// Scroll the region holding `element` so it is placed as `align` asks.
    pub fn scroll_element_into_view(
        &mut self,
        element: ElementId,
        align: ScrollAlign,
        now: HostTime,
    ) -> Option<f64> {
        self.ensure_running().ok()?;
        let region = self.overflow.region_of(element)?;
        let applied = self
            .overflow
            .scroll_element_into_view(&mut self.surface, region, element, align)?;
        self.after_scroll(now);
        Some(applied)
    }

    /// Start an eased scroll, advanced by [`ViewportCoordinator::tick`].
    pub fn smooth_scroll_to(&mut self, region: RegionId, target: f64, now: HostTime) -> bool {
        self.ensure_running().is_ok() && self.overflow.smooth_scroll_to(region, target, now)
    }

    /// Pointer or touch went down over a region.
    pub fn begin_drag(&mut self, region: RegionId, y: f64, now: HostTime) -> bool {
        self.ensure_running().is_ok() && self.overflow.begin_drag(region, y, now)
    }

    /// Pointer or touch moved during a drag. Returns the applied offset.
    pub fn drag_to(&mut self, region: RegionId, y: f64, now: HostTime) -> Option<f64> {
        self.ensure_running().ok()?;
        let applied = self.overflow.drag_to(&mut self.surface, region, y, now)?;
        self.after_scroll(now);
        Some(applied)
    }

    /// Pointer or touch released; momentum continues in [`ViewportCoordinator::tick`].
    pub fn end_drag(&mut self, region: RegionId, now: HostTime) -> bool {
        self.ensure_running().is_ok() && self.overflow.end_drag(region, now)
    }

    /// Put every element back where it was before the first write.
    ///
    /// Scroll regions are removed. The next analysis lays everything out again.
    pub fn revert_to_default(&mut self) -> Result<usize, CoordinatorError> {
        self.ensure_running()?;
        self.overflow.clear(&mut self.surface);
        let restored = self.applier.revert_to_default(&mut self.surface);
        self.cache.clear();
        Ok(restored)
    }

    /// Tear everything down. Later signals are refused with
    /// [`CoordinatorError::Destroyed`].
    ///
    /// Scroll regions are dissolved (elements return to their parents and the
    /// indicators are removed); written placements stay.
    pub fn destroy(&mut self) {
        if self.state == CoordinatorState::Destroyed {
            return;
        }
        self.debounce.cancel();
        self.overflow.clear(&mut self.surface);
        self.surface.commit();
        self.applier.destroy();
        self.tracker.destroy();
        self.cache.clear();
        self.originals.clear();
        self.state = CoordinatorState::Destroyed;
        tracing::debug!("coordinator destroyed");
    }

    /// Diagnostics snapshot.
    pub fn get_state(&self) -> StateSnapshot {
        let regions = self
            .overflow
            .region_ids()
            .into_iter()
            .filter_map(|id| self.overflow.region(id))
            .map(|r| RegionSnapshot {
                id: r.id(),
                elements: r.elements().to_vec(),
                offset: r.offset(),
                needs_scrolling: r.plan().needs_scrolling(),
                indicators: r.indicators(),
            })
            .collect();
        StateSnapshot {
            state: self.state,
            plan: self.plan.clone(),
            viewport: self.viewport,
            band: self.band,
            cache: self.cache.stats(),
            errors: self.errors,
            analyses: self.analyses,
            coalesced_requests: self.coalesced,
            regions,
            pending_analysis: self.debounce.deadline(),
            animating: self.applier.is_animating() || self.overflow.is_animating(),
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Last computed plan.
    pub fn plan(&self) -> Option<&LayoutPlan> {
        self.plan.as_ref()
    }

    /// Absorbed failures.
    pub fn errors(&self) -> ErrorStats {
        self.errors
    }

    /// The managed board.
    pub fn board(&self) -> Option<ElementId> {
        self.board
    }

    /// Managed secondary elements, in layout order.
    pub fn secondary(&self) -> &[ElementId] {
        &self.secondary
    }

    /// The surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, for host-side changes.
    ///
    /// Geometry changes made here are picked up by the next analysis; call
    /// [`ViewportCoordinator::handle_resize`] or [`ViewportCoordinator::handle_scroll`]
    /// to signal them.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Visibility state.
    pub fn tracker(&self) -> &VisibilityTracker<O> {
        &self.tracker
    }

    /// Mutable visibility state, for pushing records into a native observer.
    pub fn tracker_mut(&mut self) -> &mut VisibilityTracker<O> {
        &mut self.tracker
    }

    /// Breakpoint state.
    pub fn breakpoints(&self) -> &BreakpointManager {
        &self.breakpoints
    }

    /// Scroll regions.
    pub fn overflow(&self) -> &OverflowPlanner {
        &self.overflow
    }

    /// Style writer.
    pub fn applier(&self) -> &LayoutApplier {
        &self.applier
    }

    /// Geometry cache.
    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    fn after_scroll(&mut self, now: HostTime) {
        self.now = now;
        let damage = self.surface.commit();
        self.cache.invalidate_all(damage.moved.iter().copied());
        self.poll_visibility(now);
    }

    /// Write everything the applier has ready. Returns the number of placements written.
    fn flush(&mut self, now: HostTime) -> usize {
        let report = self.applier.frame(&mut self.surface, now);
        self.errors.application += report.rejected.len() as u64;
        self.cache.invalidate_all(report.damage.moved.iter().copied());
        report.written
    }

    fn poll_visibility(&mut self, now: HostTime) -> bool {
        let changes = self.tracker.refresh(&self.surface, self.viewport.size());
        self.on_changes(&changes, now)
    }

    /// Feed classification changes to the breakpoint manager; a transition
    /// analyses immediately, bypassing the resize debounce.
    fn on_changes(&mut self, changes: &[VisibilityChange], now: HostTime) -> bool {
        if !self.note_transitions(changes) {
            return false;
        }
        if self.state == CoordinatorState::Analyzing {
            self.coalesced += 1;
            return false;
        }
        tracing::debug!("visibility transition, analyzing immediately");
        self.analyze(now);
        true
    }

    fn note_transitions(&mut self, changes: &[VisibilityChange]) -> bool {
        let mut triggered = false;
        for change in changes {
            triggered |= self.breakpoints.on_visibility_change(
                change.element,
                change.status.is_visible,
                &self.viewport,
            );
        }
        triggered
    }

    fn analyze(&mut self, now: HostTime) {
        self.state = CoordinatorState::Analyzing;
        self.analyses += 1;
        self.debounce.cancel();
        let viewport = Viewport::from_size(self.signalled);
        self.viewport = viewport;

        let changes = self.tracker.refresh(&self.surface, viewport.size());
        if self.note_transitions(&changes) {
            // Already reflected in this cycle.
            self.coalesced += 1;
        }

        let (analysis, items) = self.gather(&viewport, now);
        let breakpoints = self.breakpoints.calculate_breakpoints(&items, &viewport);
        self.band = Some(breakpoints.band);

        if viewport.is_malformed() {
            self.errors.invalid_input += 1;
            tracing::warn!(
                width = viewport.width,
                height = viewport.height,
                "malformed viewport, keeping the current layout"
            );
            self.plan = Some(self.planner.calculate_optimal_layout(&analysis));
            self.state = CoordinatorState::Idle;
            return;
        }

        let mut plan = self.planner.calculate_optimal_layout(&analysis);
        self.repair_spacing(&mut plan);
        if let Err(err) = plan.validate(&viewport, self.planner.config()) {
            self.errors.computation += 1;
            tracing::warn!(%err, "plan failed validation, applying fallback layout");
            plan = self.fallback_plan(&viewport, &analysis);
        }

        self.reconcile_regions(&plan);
        let summary = self.applier.apply_layout(&plan);
        self.errors.application += summary.rejected.len() as u64;
        tracing::debug!(
            strategy = ?plan.strategy,
            board = plan.focal_size.width,
            band = ?breakpoints.band,
            regions = plan.scroll_regions.len(),
            accepted = summary.accepted,
            rejected = summary.rejected.len(),
            "analysis complete"
        );
        self.plan = Some(plan);
        self.state = CoordinatorState::Idle;
    }

    /// Measure the managed elements. Elements that died are dropped.
    fn gather(&mut self, viewport: &Viewport, now: HostTime) -> (AnalysisResult, Vec<(ElementId, Size)>) {
        let mut analysis = AnalysisResult::empty(*viewport);
        if let Some(board) = self.board {
            match self.cache.get(&self.surface, board, now) {
                Some(geometry) => {
                    analysis.board = Some(board);
                    let natural = geometry.natural;
                    if natural.width > 0.0 && natural.height > 0.0 {
                        analysis.board_aspect = natural.width / natural.height;
                    }
                }
                None => {
                    self.errors.invalid_input += 1;
                    tracing::warn!(?board, "board element is gone");
                    self.board = None;
                    self.forget(board);
                }
            }
        }

        let mut items = Vec::with_capacity(self.secondary.len());
        let mut dead = Vec::new();
        for &id in &self.secondary {
            let Some(geometry) = self.cache.get(&self.surface, id, now) else {
                dead.push(id);
                continue;
            };
            items.push((id, geometry.natural));
            analysis.secondary.push(SecondaryElement {
                id,
                size: geometry.natural,
                visible: self.tracker.is_visible(id),
            });
        }
        for id in dead {
            self.errors.invalid_input += 1;
            tracing::warn!(?id, "managed element is gone");
            self.secondary.retain(|e| *e != id);
            self.forget(id);
        }
        analysis.invisible = self.tracker.invisible_elements();
        (analysis, items)
    }

    fn repair_spacing(&self, plan: &mut LayoutPlan) {
        let free: Vec<(ElementId, Position)> = plan.free_positions().collect();
        let report = self.breakpoints.enforce_minimum_spacing(&free);
        if report.valid {
            return;
        }
        tracing::debug!(
            violations = report.violations.len(),
            "repairing element spacing"
        );
        let adjusted = self.breakpoints.adjust_positions_for_spacing(&free);
        let residual = self.breakpoints.enforce_minimum_spacing(&adjusted);
        let viewport = plan.viewport.rect();
        let off_screen = adjusted
            .iter()
            .filter(|(_, p)| !viewport.contains_rect(p.rect()))
            .count();
        if !residual.valid || off_screen > 0 {
            tracing::warn!(
                residual = residual.violations.len(),
                off_screen,
                "spacing repair incomplete"
            );
        }
        for (id, position) in adjusted {
            if let Some(slot) = plan.element_positions.iter_mut().find(|(e, _)| *e == id) {
                slot.1 = position;
            }
        }
    }

    /// Floor-sized board centered in the viewport, elements where they started.
    fn fallback_plan(&self, viewport: &Viewport, analysis: &AnalysisResult) -> LayoutPlan {
        let cfg = self.planner.config();
        let side = cfg.min_board;
        let focal_position = Position {
            x: ((viewport.width - side) / 2.0).max(0.0),
            y: ((viewport.height - side) / 2.0).max(0.0),
            width: side,
            height: side,
            stack_order: cfg.board_layer,
        };
        let element_positions = analysis
            .secondary
            .iter()
            .filter_map(|e| {
                self.originals
                    .get(&e.id)
                    .map(|(rect, order)| (e.id, Position::from_rect(*rect, *order)))
            })
            .collect();
        LayoutPlan {
            viewport: *viewport,
            focal_element: analysis.board,
            board_aspect: analysis.board_aspect,
            focal_size: Size::new(side, side),
            focal_position,
            strategy: LayoutStrategy::Stacked,
            element_positions,
            requires_scrolling: false,
            scroll_regions: Vec::new(),
        }
    }

    /// Keep regions over unchanged element sets (and their offsets), rebuild the rest.
    fn reconcile_regions(&mut self, plan: &LayoutPlan) {
        let mut keep = Vec::new();
        let mut create = Vec::new();
        for region in &plan.scroll_regions {
            match self.overflow.find_region(region.elements()) {
                Some(id) if self.overflow.update_region(&mut self.surface, id, region.clone()) => {
                    keep.push(id);
                }
                _ => create.push(region.clone()),
            }
        }
        for id in self.overflow.region_ids() {
            if !keep.contains(&id) {
                self.overflow.remove_scrolling(&mut self.surface, id);
            }
        }
        for region in create {
            match self.overflow.create_scroll_container(&mut self.surface, region) {
                Ok(id) => {
                    self.overflow.enable_scrolling(&mut self.surface, id);
                }
                Err(err) => {
                    self.errors.application += 1;
                    tracing::warn!(%err, "could not create scroll region");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_surface::{Attachments, BoxSurface, Duration, ElementKind};

    fn coordinator(
        viewport: Size,
        board: Size,
        elements: &[Size],
    ) -> (ViewportCoordinator<BoxSurface>, ElementId, Vec<ElementId>) {
        let mut surface = BoxSurface::new(viewport);
        let b = surface.insert_host(board.to_rect(), Attachments::default());
        let ids: Vec<ElementId> = elements
            .iter()
            .map(|s| surface.insert_host(s.to_rect(), Attachments::default()))
            .collect();
        surface.commit();
        let c = ViewportCoordinator::new(surface, Some(b), ids.clone(), CoordinatorConfig::default());
        (c, b, ids)
    }

    #[test]
    fn lifecycle_errors() {
        let (mut c, _, _) = coordinator(Size::new(800.0, 600.0), Size::new(100.0, 100.0), &[]);
        assert_eq!(
            c.handle_resize(900.0, 600.0, HostTime(0)),
            Err(CoordinatorError::NotInitialized)
        );
        c.initialize(HostTime(0)).unwrap();
        assert_eq!(c.state(), CoordinatorState::Idle);
        assert_eq!(c.initialize(HostTime(1)), Err(CoordinatorError::AlreadyInitialized));
        c.destroy();
        assert_eq!(c.state(), CoordinatorState::Destroyed);
        assert_eq!(c.tick(HostTime(2)), Err(CoordinatorError::Destroyed));
        assert_eq!(c.next_deadline(), None);
        c.destroy();
    }

    #[test]
    fn small_resizes_are_ignored() {
        let (mut c, _, _) = coordinator(Size::new(800.0, 600.0), Size::new(100.0, 100.0), &[]);
        c.initialize(HostTime(0)).unwrap();
        assert_eq!(c.handle_resize(809.0, 595.0, HostTime(10)), Ok(false));
        assert_eq!(c.get_state().pending_analysis, None);
        assert_eq!(c.handle_resize(810.0, 600.0, HostTime(10)), Ok(true));
        assert_eq!(c.get_state().pending_analysis, Some(HostTime(160)));
    }

    #[test]
    fn resize_debounce_is_superseded() {
        let (mut c, _, _) = coordinator(Size::new(800.0, 600.0), Size::new(100.0, 100.0), &[]);
        c.initialize(HostTime(0)).unwrap();
        let analyses = c.get_state().analyses;
        c.handle_resize(1000.0, 700.0, HostTime(100)).unwrap();
        c.handle_resize(1100.0, 700.0, HostTime(200)).unwrap();
        assert!(!c.tick(HostTime(260)).unwrap().analyzed, "first window was superseded");
        assert!(c.tick(HostTime(350)).unwrap().analyzed);
        assert_eq!(c.get_state().analyses, analyses + 1);
        assert_eq!(c.get_state().viewport.width, 1100.0);
    }

    #[test]
    fn orientation_change_clears_cache_and_joins_window() {
        let (mut c, _, _) = coordinator(Size::new(800.0, 600.0), Size::new(100.0, 100.0), &[]);
        c.initialize(HostTime(0)).unwrap();
        c.handle_resize(600.0, 500.0, HostTime(100)).unwrap();
        c.handle_orientation_change(600.0, 800.0, HostTime(200)).unwrap();
        assert!(c.cache().is_empty());
        assert_eq!(c.next_deadline(), Some(HostTime(250)));
        c.tick(HostTime(250)).unwrap();
        assert_eq!(c.get_state().viewport.height, 800.0);
    }

    #[test]
    fn tick_ages_out_cached_geometry() {
        let mut surface = BoxSurface::new(Size::new(800.0, 600.0));
        // Already where the planner puts it, so no write invalidates the entry.
        let home = Rect::new(120.0, 20.0, 680.0, 580.0);
        let b = surface.insert_host(home, Attachments::default());
        surface.commit();
        let config = CoordinatorConfig::default().with_cache_max_age(Duration::from_millis(5_000));
        let mut c = ViewportCoordinator::new(surface, Some(b), Vec::new(), config);
        c.initialize(HostTime(0)).unwrap();
        assert_eq!(c.surface().bounds(b), Some(home));
        assert_eq!(c.cache().len(), 1);
        c.tick(HostTime(5_000)).unwrap();
        assert_eq!(c.cache().len(), 1, "entry is exactly max_age old");
        c.tick(HostTime(5_001)).unwrap();
        assert!(c.cache().is_empty());
    }

    #[test]
    fn malformed_viewport_keeps_layout() {
        let (mut c, b, _) = coordinator(Size::new(800.0, 600.0), Size::new(100.0, 100.0), &[]);
        c.initialize(HostTime(0)).unwrap();
        let before = c.surface().bounds(b);
        c.handle_resize(0.0, 600.0, HostTime(10)).unwrap();
        c.tick(HostTime(200)).unwrap();
        assert_eq!(c.errors().invalid_input, 1);
        assert_eq!(c.surface().bounds(b), before);
        assert!(c.plan().is_some(), "best-effort plan is still recorded");
    }

    #[test]
    fn invalid_plan_falls_back() {
        let mut surface = BoxSurface::new(Size::new(300.0, 300.0));
        let b = surface.insert_host(Rect::new(0.0, 0.0, 100.0, 100.0), Attachments::default());
        let config = CoordinatorConfig::default()
            .with_planner(easel_layout::PlannerConfig::default().with_min_board(400.0));
        let mut c = ViewportCoordinator::new(surface, Some(b), Vec::new(), config);
        c.initialize(HostTime(0)).unwrap();
        assert_eq!(c.errors().computation, 1);
        let plan = c.plan().unwrap();
        assert_eq!(plan.focal_size, Size::new(400.0, 400.0));
        assert_eq!((plan.focal_position.x, plan.focal_position.y), (0.0, 0.0));
        assert!(plan.scroll_regions.is_empty());
        // The fallback board cannot fit either, so the write is refused.
        assert_eq!(c.errors().application, 1);
        assert_eq!(c.surface().bounds(b), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(c.state(), CoordinatorState::Idle);
    }

    #[test]
    fn dead_elements_are_dropped() {
        let (mut c, _, ids) = coordinator(
            Size::new(1200.0, 800.0),
            Size::new(100.0, 100.0),
            &[Size::new(120.0, 40.0), Size::new(120.0, 40.0)],
        );
        let ghost = {
            let mut other = BoxSurface::new(Size::new(10.0, 10.0));
            let _ = other.insert_host(Rect::ZERO, Attachments::default());
            let _ = other.insert_host(Rect::ZERO, Attachments::default());
            let _ = other.insert_host(Rect::ZERO, Attachments::default());
            other.insert_host(Rect::ZERO, Attachments::default())
        };
        c.initialize(HostTime(0)).unwrap();
        assert_eq!(c.observe(ghost, HostTime(1)), Ok(false));
        assert_eq!(c.errors().invalid_input, 1);
        assert_eq!(c.secondary(), ids.as_slice());
        assert_eq!(c.unobserve(ids[0], HostTime(2)), Ok(true));
        assert_eq!(c.unobserve(ids[0], HostTime(2)), Ok(false));
    }

    #[test]
    fn destroy_dissolves_scroll_regions() {
        let elements = vec![Size::new(200.0, 60.0); 5];
        let (mut c, _, ids) = coordinator(Size::new(360.0, 600.0), Size::new(100.0, 100.0), &elements);
        c.initialize(HostTime(0)).unwrap();
        assert_eq!(c.get_state().regions.len(), 1);
        assert_eq!(c.surface().count_of_kind(ElementKind::ScrollWrapper), 1);
        c.destroy();
        assert_eq!(c.surface().count_of_kind(ElementKind::ScrollWrapper), 0);
        assert_eq!(c.surface().count_of_kind(ElementKind::Indicator), 0);
        for id in ids {
            assert_eq!(c.surface().parent_of(id), None);
        }
    }

    #[test]
    fn transitions_are_flushed_by_ticks() {
        let (mut c, b, _) = coordinator(Size::new(800.0, 600.0), Size::new(100.0, 100.0), &[]);
        c.initialize(HostTime(0)).unwrap();
        assert_eq!(c.surface().transition(b), Some(Duration::from_millis(300)));
        assert_eq!(c.next_deadline(), Some(HostTime(300)));
        c.tick(HostTime(300)).unwrap();
        assert!(!c.get_state().animating);
        assert_eq!(c.next_deadline(), None);
    }
}
