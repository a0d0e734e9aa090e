// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live scroll regions on a [`Surface`].

use easel_surface::{Duration, ElementId, ElementKind, HostTime, ScrollStyle, Surface, SurfaceError};
use hashbrown::HashMap;
use kurbo::Rect;
use smallvec::SmallVec;

use crate::motion::{Motion, ScrollAlign, align_offset, decay, ease_out};
use crate::region::ScrollRegionPlan;

/// Scroll behaviour parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollConfig {
    /// Content that must lie off-screen in a direction before its indicator shows.
    pub indicator_threshold: f64,
    /// Height of the indicator bars.
    pub indicator_thickness: f64,
    /// Stacking order of indicator bars.
    pub indicator_layer: i32,
    /// Velocity multiplier applied every `frame_interval` during momentum.
    pub friction: f64,
    /// Nominal animation frame.
    pub frame_interval: Duration,
    /// Momentum stops below this speed (units per millisecond).
    pub min_velocity: f64,
    /// Duration of [`OverflowPlanner::smooth_scroll_to`].
    pub smooth_duration: Duration,
    /// Ask the host for native smooth scrolling.
    pub native_smooth: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            indicator_threshold: 10.0,
            indicator_thickness: 4.0,
            indicator_layer: 10,
            friction: 0.95,
            frame_interval: Duration::from_millis(16),
            min_velocity: 0.02,
            smooth_duration: Duration::from_millis(300),
            native_smooth: true,
        }
    }
}

impl ScrollConfig {
    /// Replace the indicator threshold.
    #[must_use]
    pub fn with_indicator_threshold(mut self, threshold: f64) -> Self {
        self.indicator_threshold = threshold.max(0.0);
        self
    }

    /// Replace the momentum friction.
    #[must_use]
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    /// Replace the smooth-scroll duration.
    #[must_use]
    pub fn with_smooth_duration(mut self, duration: Duration) -> Self {
        self.smooth_duration = duration;
        self
    }
}

/// Handle of a live scroll region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u32);

/// Visibility and width of the two indicator bars.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct IndicatorState {
    /// Content is hidden above the frame.
    pub top_visible: bool,
    /// Width of the top bar, proportional to the scrolled fraction.
    pub top_width: f64,
    /// Content is hidden below the frame.
    pub bottom_visible: bool,
    /// Width of the bottom bar, proportional to the remaining fraction.
    pub bottom_width: f64,
}

/// A tracked scroll region.
#[derive(Clone, Debug)]
pub struct ScrollRegion {
    id: RegionId,
    plan: ScrollRegionPlan,
    wrapper: ElementId,
    top: ElementId,
    bottom: ElementId,
    /// Parent of each element before it moved into the wrapper.
    origins: SmallVec<[(ElementId, Option<ElementId>); 8]>,
    offset: f64,
    enabled: bool,
    indicators: IndicatorState,
    motion: Motion,
}

impl ScrollRegion {
    /// Handle.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// The plan this region realises.
    pub fn plan(&self) -> &ScrollRegionPlan {
        &self.plan
    }

    /// Contained elements.
    pub fn elements(&self) -> &[ElementId] {
        self.plan.elements()
    }

    /// Height cap.
    pub fn max_height(&self) -> f64 {
        self.plan.max_height()
    }

    /// Current scroll offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Whether scroll styling is applied.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The wrapper element.
    pub fn wrapper(&self) -> ElementId {
        self.wrapper
    }

    /// The `(top, bottom)` indicator elements.
    pub fn indicator_elements(&self) -> (ElementId, ElementId) {
        (self.top, self.bottom)
    }

    /// Indicator state as last written.
    pub fn indicators(&self) -> IndicatorState {
        self.indicators
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.motion, Motion::Dragging { .. })
    }

    /// Whether momentum or a smooth scroll is running.
    pub fn is_animating(&self) -> bool {
        self.motion.is_animating()
    }
}

/// Wraps overflowing stacked elements in scrollable regions on a [`Surface`].
///
/// A region owns one wrapper element (the elements are reparented into it) and
/// two indicator bars. All writes go through the surface; removing a region
/// returns every element to its original parent.
///
/// ## Example
///
/// ```rust
/// use easel_scroll::{OverflowPlanner, ScrollConfig, ScrollRegionPlan};
/// use easel_surface::{Attachments, BoxSurface, Surface};
/// use kurbo::{Point, Rect, Size};
///
/// let mut surface = BoxSurface::new(Size::new(360.0, 600.0));
/// let items: Vec<_> = (0..5)
///     .map(|_| {
///         let id = surface.insert_host(Rect::new(0.0, 0.0, 200.0, 60.0), Attachments::default());
///         (id, Size::new(200.0, 60.0))
///     })
///     .collect();
/// let plan = ScrollRegionPlan::stack(&items, Point::new(80.0, 380.0), 200.0, 200.0, 16.0);
///
/// let mut overflow = OverflowPlanner::new(ScrollConfig::default());
/// let region = overflow.create_scroll_container(&mut surface, plan).unwrap();
/// overflow.enable_scrolling(&mut surface, region);
/// assert!(overflow.needs_scrolling(region));
///
/// overflow.scroll_to(&mut surface, region, 1e9);
/// assert_eq!(overflow.offset(region), Some(364.0 - 200.0));
///
/// overflow.remove_scrolling(&mut surface, region);
/// overflow.remove_scrolling(&mut surface, region);
/// assert!(overflow.region(region).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct OverflowPlanner {
    config: ScrollConfig,
    regions: HashMap<RegionId, ScrollRegion>,
    next_id: u32,
}

impl OverflowPlanner {
    /// Create a planner with no regions.
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            regions: HashMap::new(),
            next_id: 0,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> ScrollConfig {
        self.config
    }

    /// Build a region for `plan`: create the wrapper and indicators and move the
    /// elements into the wrapper. Scroll styling is applied by
    /// [`OverflowPlanner::enable_scrolling`].
    ///
    /// Fails without touching the surface if any element is not alive.
    pub fn create_scroll_container(
        &mut self,
        surface: &mut dyn Surface,
        plan: ScrollRegionPlan,
    ) -> Result<RegionId, SurfaceError> {
        if let Some(stale) = plan.elements().iter().find(|e| !surface.is_alive(**e)) {
            return Err(SurfaceError::StaleElement(*stale));
        }
        let wrapper = surface.insert_element(None, ElementKind::ScrollWrapper, plan.frame());
        let top = surface.insert_element(None, ElementKind::Indicator, Rect::ZERO);
        let bottom = surface.insert_element(None, ElementKind::Indicator, Rect::ZERO);
        for indicator in [top, bottom] {
            surface.set_hidden(indicator, true)?;
        }
        let mut origins = SmallVec::new();
        for &element in plan.elements() {
            origins.push((element, surface.parent_of(element)));
            surface.reparent(element, Some(wrapper))?;
        }
        let id = RegionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        tracing::debug!(
            region = ?id,
            elements = plan.elements().len(),
            content = plan.content_height(),
            max_height = plan.max_height(),
            "scroll region created"
        );
        self.regions.insert(
            id,
            ScrollRegion {
                id,
                plan,
                wrapper,
                top,
                bottom,
                origins,
                offset: 0.0,
                enabled: false,
                indicators: IndicatorState::default(),
                motion: Motion::Idle,
            },
        );
        Ok(id)
    }

    /// Whether the region's content exceeds its height cap. Unknown regions never scroll.
    pub fn needs_scrolling(&self, region: RegionId) -> bool {
        self.regions
            .get(&region)
            .is_some_and(|r| r.plan.needs_scrolling())
    }

    /// Apply scroll styling and show the indicators that apply.
    pub fn enable_scrolling(&mut self, surface: &mut dyn Surface, region: RegionId) -> bool {
        let Some(r) = self.regions.get_mut(&region) else {
            return false;
        };
        r.enabled = true;
        r.offset = r.offset.clamp(0.0, r.plan.max_offset());
        write_scroll_style(surface, r, self.config.native_smooth);
        self.update_scroll_indicators(surface, region);
        true
    }

    /// Recompute indicator visibility and width from the current offset.
    ///
    /// An indicator is visible when more than `indicator_threshold` units lie
    /// off-screen in its direction; its width is the frame width times the
    /// scrolled (top) or remaining (bottom) fraction.
    pub fn update_scroll_indicators(&mut self, surface: &mut dyn Surface, region: RegionId) {
        let Some(r) = self.regions.get_mut(&region) else {
            return;
        };
        let cfg = &self.config;
        let frame = r.plan.frame();
        let max_offset = r.plan.max_offset();
        let above = r.offset;
        let below = (max_offset - r.offset).max(0.0);
        let (top_fraction, bottom_fraction) = if max_offset > 0.0 {
            (above / max_offset, below / max_offset)
        } else {
            (0.0, 0.0)
        };
        let state = IndicatorState {
            top_visible: r.enabled && above > cfg.indicator_threshold,
            top_width: frame.width() * top_fraction,
            bottom_visible: r.enabled && below > cfg.indicator_threshold,
            bottom_width: frame.width() * bottom_fraction,
        };
        let top_rect = Rect::from_origin_size(
            frame.origin(),
            (state.top_width, cfg.indicator_thickness),
        );
        let bottom_rect = Rect::from_origin_size(
            (frame.x0, frame.y1 - cfg.indicator_thickness),
            (state.bottom_width, cfg.indicator_thickness),
        );
        let writes = [
            (r.top, top_rect, state.top_visible),
            (r.bottom, bottom_rect, state.bottom_visible),
        ];
        for (element, rect, visible) in writes {
            if surface
                .set_placement(element, rect, cfg.indicator_layer)
                .and_then(|()| surface.set_hidden(element, !visible))
                .is_err()
            {
                tracing::warn!(?region, ?element, "indicator element is gone");
            }
        }
        r.indicators = state;
    }

    /// Strip scroll styling, stop any motion, remove the indicators and the
    /// wrapper, return the elements to their original parents and stop tracking
    /// the region.
    ///
    /// Returns whether the region was tracked. Calling it again is a no-op.
    pub fn remove_scrolling(&mut self, surface: &mut dyn Surface, region: RegionId) -> bool {
        let Some(r) = self.regions.remove(&region) else {
            return false;
        };
        // Best effort: the host may already have torn elements down.
        let _ = surface.set_scroll_style(r.wrapper, None);
        for &(element, parent) in &r.origins {
            let parent = parent.filter(|p| surface.is_alive(*p));
            if surface.parent_of(element) == Some(r.wrapper) {
                let _ = surface.reparent(element, parent);
            }
        }
        for structural in [r.top, r.bottom, r.wrapper] {
            if surface.is_alive(structural) {
                let _ = surface.remove_element(structural);
            }
        }
        tracing::debug!(region = ?region, "scroll region removed");
        true
    }

    /// Remove every region.
    pub fn clear(&mut self, surface: &mut dyn Surface) {
        let ids = self.region_ids();
        for id in ids {
            self.remove_scrolling(surface, id);
        }
    }

    /// Adopt a new plan over the same elements, keeping the scroll offset (clamped).
    ///
    /// Returns `false` if the region is unknown or the element sets differ.
    pub fn update_region(
        &mut self,
        surface: &mut dyn Surface,
        region: RegionId,
        plan: ScrollRegionPlan,
    ) -> bool {
        let Some(r) = self.regions.get_mut(&region) else {
            return false;
        };
        if !plan.same_elements(r.plan.elements()) {
            return false;
        }
        if surface.set_placement(r.wrapper, plan.frame(), 0).is_err() {
            return false;
        }
        r.plan = plan;
        r.offset = r.offset.clamp(0.0, r.plan.max_offset());
        if let Motion::Smooth { to, .. } = &mut r.motion {
            *to = to.clamp(0.0, r.plan.max_offset());
        }
        if r.enabled {
            write_scroll_style(surface, r, self.config.native_smooth);
        }
        self.update_scroll_indicators(surface, region);
        true
    }

    /// Region holding exactly `elements`, in any order.
    pub fn find_region(&self, elements: &[ElementId]) -> Option<RegionId> {
        self.regions
            .values()
            .find(|r| r.plan.same_elements(elements))
            .map(|r| r.id)
    }

    /// Region containing `element`.
    pub fn region_of(&self, element: ElementId) -> Option<RegionId> {
        self.regions
            .values()
            .find(|r| r.plan.contains_element(element))
            .map(|r| r.id)
    }

    /// A tracked region.
    pub fn region(&self, region: RegionId) -> Option<&ScrollRegion> {
        self.regions.get(&region)
    }

    /// Tracked regions in creation order.
    pub fn region_ids(&self) -> Vec<RegionId> {
        let mut ids: Vec<RegionId> = self.regions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of tracked regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no region is tracked.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Current offset of a region.
    pub fn offset(&self, region: RegionId) -> Option<f64> {
        self.regions.get(&region).map(|r| r.offset)
    }

    /// Scroll to `offset` (clamped), cancelling any motion. Returns the applied offset.
    pub fn scroll_to(&mut self, surface: &mut dyn Surface, region: RegionId, offset: f64) -> Option<f64> {
        let r = self.regions.get_mut(&region)?;
        r.motion = Motion::Idle;
        let applied = self.set_offset(surface, region, offset);
        Some(applied)
    }

    /// Scroll by `delta` (clamped). Returns the applied offset.
    pub fn scroll_by(&mut self, surface: &mut dyn Surface, region: RegionId, delta: f64) -> Option<f64> {
        let current = self.offset(region)?;
        self.scroll_to(surface, region, current + delta)
    }

    /// Scroll so `element` is placed in the frame as `align` asks.
    pub fn scroll_element_into_view(
        &mut self,
        surface: &mut dyn Surface,
        region: RegionId,
        element: ElementId,
        align: ScrollAlign,
    ) -> Option<f64> {
        let r = self.regions.get(&region)?;
        let rect = r.plan.rect_of(element)?;
        let top = r.plan.frame().y0;
        let target = align_offset(
            rect.y0 - top,
            rect.y1 - top,
            r.plan.frame().height(),
            r.offset,
            align,
        );
        self.scroll_to(surface, region, target)
    }

    /// Start an eased scroll toward `target` (clamped). Advanced by [`OverflowPlanner::frame`].
    pub fn smooth_scroll_to(&mut self, region: RegionId, target: f64, now: HostTime) -> bool {
        let duration = self.config.smooth_duration;
        let Some(r) = self.regions.get_mut(&region) else {
            return false;
        };
        r.motion = Motion::Smooth {
            from: r.offset,
            to: target.clamp(0.0, r.plan.max_offset()),
            start: now,
            duration,
        };
        true
    }

    /// Pointer or touch went down at `y`.
    pub fn begin_drag(&mut self, region: RegionId, y: f64, now: HostTime) -> bool {
        let Some(r) = self.regions.get_mut(&region) else {
            return false;
        };
        if !r.enabled {
            return false;
        }
        r.motion = Motion::Dragging {
            last_y: y,
            last_time: now,
            velocity: 0.0,
        };
        true
    }

    /// Pointer or touch moved to `y`. Content follows the pointer.
    pub fn drag_to(&mut self, surface: &mut dyn Surface, region: RegionId, y: f64, now: HostTime) -> Option<f64> {
        let r = self.regions.get_mut(&region)?;
        let Motion::Dragging {
            last_y,
            last_time,
            velocity,
        } = r.motion
        else {
            return None;
        };
        let delta = last_y - y;
        let dt = now.saturating_duration_since(last_time).as_f64();
        let velocity = if dt > 0.0 {
            // Weighted toward the most recent sample.
            0.8 * (delta / dt) + 0.2 * velocity
        } else {
            velocity
        };
        r.motion = Motion::Dragging {
            last_y: y,
            last_time: now,
            velocity,
        };
        let target = r.offset + delta;
        Some(self.set_offset(surface, region, target))
    }

    /// Pointer or touch released. Starts momentum when the release was fast enough.
    pub fn end_drag(&mut self, region: RegionId, now: HostTime) -> bool {
        let min_velocity = self.config.min_velocity;
        let Some(r) = self.regions.get_mut(&region) else {
            return false;
        };
        let Motion::Dragging { velocity, .. } = r.motion else {
            return false;
        };
        r.motion = if velocity.abs() >= min_velocity {
            Motion::Momentum {
                velocity,
                last_time: now,
            }
        } else {
            Motion::Idle
        };
        true
    }

    /// Whether any region has momentum or a smooth scroll running.
    pub fn is_animating(&self) -> bool {
        self.regions.values().any(ScrollRegion::is_animating)
    }

    /// When the next animation frame is due, if any region is animating.
    pub fn next_frame(&self, now: HostTime) -> Option<HostTime> {
        self.is_animating().then(|| now + self.config.frame_interval)
    }

    /// Advance momentum and smooth scrolls to `now`. Returns whether any region
    /// is still animating.
    pub fn frame(&mut self, surface: &mut dyn Surface, now: HostTime) -> bool {
        let cfg = self.config;
        for id in self.region_ids() {
            let Some(r) = self.regions.get_mut(&id) else {
                continue;
            };
            let (target, next) = match r.motion {
                Motion::Momentum {
                    velocity,
                    last_time,
                } => {
                    let elapsed = now.saturating_duration_since(last_time).as_f64();
                    let (distance, v) =
                        decay(velocity, elapsed, cfg.friction, cfg.frame_interval.as_f64());
                    let target = r.offset + distance;
                    let hit_edge = target <= 0.0 || target >= r.plan.max_offset();
                    let next = if v.abs() < cfg.min_velocity || hit_edge {
                        Motion::Idle
                    } else {
                        Motion::Momentum {
                            velocity: v,
                            last_time: now,
                        }
                    };
                    (target, next)
                }
                Motion::Smooth {
                    from,
                    to,
                    start,
                    duration,
                } => {
                    let elapsed = now.saturating_duration_since(start);
                    if duration.is_zero() || elapsed >= duration {
                        (to, Motion::Idle)
                    } else {
                        let t = elapsed.as_f64() / duration.as_f64();
                        (from + (to - from) * ease_out(t), r.motion)
                    }
                }
                Motion::Idle | Motion::Dragging { .. } => continue,
            };
            r.motion = next;
            self.set_offset(surface, id, target);
        }
        self.is_animating()
    }

    fn set_offset(&mut self, surface: &mut dyn Surface, region: RegionId, offset: f64) -> f64 {
        let native_smooth = self.config.native_smooth;
        let Some(r) = self.regions.get_mut(&region) else {
            return 0.0;
        };
        let offset = if offset.is_finite() { offset } else { r.offset };
        r.offset = offset.clamp(0.0, r.plan.max_offset());
        let applied = r.offset;
        if r.enabled {
            write_scroll_style(surface, r, native_smooth);
        }
        self.update_scroll_indicators(surface, region);
        applied
    }
}

fn write_scroll_style(surface: &mut dyn Surface, r: &ScrollRegion, smooth: bool) {
    let style = ScrollStyle {
        max_height: r.plan.max_height(),
        offset: r.offset,
        smooth,
    };
    tracing::trace!(region = ?r.id, offset = r.offset, "scroll style");
    if surface.set_scroll_style(r.wrapper, Some(style)).is_err() {
        tracing::warn!(region = ?r.id, "scroll wrapper is gone");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_surface::{Attachments, BoxSurface};
    use kurbo::{Point, Size};

    fn setup(n: usize) -> (BoxSurface, Vec<ElementId>, ScrollRegionPlan) {
        let mut s = BoxSurface::new(Size::new(360.0, 600.0));
        let ids: Vec<ElementId> = (0..n)
            .map(|_| s.insert_host(Rect::new(0.0, 0.0, 200.0, 60.0), Attachments::default()))
            .collect();
        let items: Vec<(ElementId, Size)> = ids.iter().map(|id| (*id, Size::new(200.0, 60.0))).collect();
        // Content: 5 * 60 + 4 * 16 = 364.
        let plan = ScrollRegionPlan::stack(&items, Point::new(80.0, 380.0), 200.0, 200.0, 16.0);
        (s, ids, plan)
    }

    fn enabled(n: usize) -> (BoxSurface, Vec<ElementId>, OverflowPlanner, RegionId) {
        let (mut s, ids, plan) = setup(n);
        let mut o = OverflowPlanner::new(ScrollConfig::default());
        let r = o.create_scroll_container(&mut s, plan).unwrap();
        o.enable_scrolling(&mut s, r);
        (s, ids, o, r)
    }

    #[test]
    fn container_wraps_elements_and_adds_indicators() {
        let (mut s, ids, o, r) = enabled(5);
        let region = o.region(r).unwrap();
        for id in &ids {
            assert_eq!(s.parent_of(*id), Some(region.wrapper()));
        }
        assert_eq!(s.count_of_kind(ElementKind::Indicator), 2);
        let style = s.scroll_style(region.wrapper()).unwrap();
        assert_eq!(style.max_height, 200.0);
        assert_eq!(style.offset, 0.0);
        let state = region.indicators();
        assert!(!state.top_visible);
        assert!(state.bottom_visible);
        assert_eq!(state.bottom_width, 200.0);
        s.commit();
        assert_eq!(s.clip(ids[4]), Some(Rect::new(80.0, 380.0, 280.0, 580.0)));
    }

    #[test]
    fn indicators_track_offset() {
        let (mut s, _, mut o, r) = enabled(5);
        // max offset = 164
        o.scroll_to(&mut s, r, 82.0);
        let state = o.region(r).unwrap().indicators();
        assert!(state.top_visible && state.bottom_visible);
        assert!((state.top_width - 100.0).abs() < 1e-9);
        assert!((state.bottom_width - 100.0).abs() < 1e-9);

        o.scroll_to(&mut s, r, 158.0);
        let state = o.region(r).unwrap().indicators();
        assert!(!state.bottom_visible, "only 6 units left below");
        let (_, bottom) = o.region(r).unwrap().indicator_elements();
        s.commit();
        assert!(s.is_hidden(bottom));
    }

    #[test]
    fn offsets_are_clamped() {
        let (mut s, _, mut o, r) = enabled(5);
        assert_eq!(o.scroll_by(&mut s, r, -50.0), Some(0.0));
        assert_eq!(o.scroll_to(&mut s, r, 1000.0), Some(164.0));
        assert_eq!(o.scroll_to(&mut s, r, f64::NAN), Some(164.0));
    }

    #[test]
    fn element_into_view() {
        let (mut s, ids, mut o, r) = enabled(5);
        // Element 3 spans [228, 288) in content space.
        assert_eq!(
            o.scroll_element_into_view(&mut s, r, ids[3], ScrollAlign::Nearest),
            Some(88.0)
        );
        assert_eq!(
            o.scroll_element_into_view(&mut s, r, ids[0], ScrollAlign::Start),
            Some(0.0)
        );
        assert_eq!(
            o.scroll_element_into_view(&mut s, r, ids[4], ScrollAlign::End),
            Some(164.0)
        );
    }

    #[test]
    fn remove_scrolling_is_idempotent_and_restores_parents() {
        let (mut s, ids, mut o, r) = enabled(5);
        let wrapper = o.region(r).unwrap().wrapper();
        assert!(o.remove_scrolling(&mut s, r));
        let after_first = (s.count_of_kind(ElementKind::Indicator), s.is_alive(wrapper));
        assert!(!o.remove_scrolling(&mut s, r));
        assert_eq!(after_first, (0, false));
        assert_eq!(
            (s.count_of_kind(ElementKind::Indicator), s.is_alive(wrapper)),
            after_first
        );
        for id in ids {
            assert_eq!(s.parent_of(id), None);
        }
        assert!(o.is_empty());
    }

    #[test]
    fn stale_elements_fail_before_any_write() {
        let (mut s, _, plan) = setup(2);
        let bogus = ElementId::from_raw(77, 1);
        let plan = ScrollRegionPlan::stack(
            &[(plan.elements()[0], Size::new(10.0, 10.0)), (bogus, Size::new(10.0, 10.0))],
            Point::ZERO,
            10.0,
            5.0,
            16.0,
        );
        let mut o = OverflowPlanner::new(ScrollConfig::default());
        assert_eq!(
            o.create_scroll_container(&mut s, plan),
            Err(SurfaceError::StaleElement(bogus))
        );
        assert_eq!(s.mutations().inserted, 0);
    }

    #[test]
    fn drag_then_momentum_decays_to_rest() {
        let (mut s, _, mut o, r) = enabled(5);
        assert!(o.begin_drag(r, 300.0, HostTime(0)));
        assert_eq!(o.drag_to(&mut s, r, 290.0, HostTime(16)), Some(10.0));
        assert_eq!(o.drag_to(&mut s, r, 280.0, HostTime(32)), Some(20.0));
        assert!(o.end_drag(r, HostTime(32)));
        assert!(o.is_animating());
        assert_eq!(o.next_frame(HostTime(32)), Some(HostTime(48)));

        let mut t = 32;
        let mut last = 20.0;
        while o.frame(&mut s, HostTime(t)) {
            let now = o.offset(r).unwrap();
            assert!(now >= last, "momentum keeps the release direction");
            last = now;
            t += 16;
            assert!(t < 10_000, "momentum never settled");
        }
        assert!(o.offset(r).unwrap() > 20.0);
        assert!(!o.region(r).unwrap().is_animating());
    }

    #[test]
    fn smooth_scroll_reaches_target() {
        let (mut s, _, mut o, r) = enabled(5);
        assert!(o.smooth_scroll_to(r, 100.0, HostTime(1000)));
        o.frame(&mut s, HostTime(1150));
        let mid = o.offset(r).unwrap();
        assert!(mid > 50.0 && mid < 100.0, "eased midpoint: {mid}");
        assert!(!o.frame(&mut s, HostTime(1300)));
        assert_eq!(o.offset(r), Some(100.0));
    }

    #[test]
    fn update_region_preserves_offset() {
        let (mut s, ids, mut o, r) = enabled(5);
        o.scroll_to(&mut s, r, 150.0);
        let items: Vec<(ElementId, Size)> = ids.iter().rev().map(|id| (*id, Size::new(200.0, 60.0))).collect();
        let taller = ScrollRegionPlan::stack(&items, Point::new(80.0, 380.0), 200.0, 300.0, 16.0);
        assert!(o.update_region(&mut s, r, taller));
        assert_eq!(o.offset(r), Some(64.0), "clamped to the new maximum");
        assert_eq!(o.find_region(&ids), Some(r));
        assert_eq!(o.region_of(ids[2]), Some(r));
    }
}
