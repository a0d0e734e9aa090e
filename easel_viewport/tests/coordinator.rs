// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behaviour of the coordinator over an in-memory surface.

use std::cell::Cell;
use std::rc::Rc;

use easel_layout::LayoutStrategy;
use easel_scroll::{OverflowPlanner, ScrollAlign, ScrollConfig, ScrollRegionPlan};
use easel_surface::{Attachments, BoxSurface, ElementFlags, ElementId, ElementKind, HostTime, Surface};
use easel_viewport::{CoordinatorConfig, CoordinatorState, ViewportCoordinator};
use kurbo::{Point, Rect, Size};

struct Scene {
    coordinator: ViewportCoordinator<BoxSurface>,
    board: ElementId,
    elements: Vec<ElementId>,
    now: HostTime,
}

impl Scene {
    fn new(viewport: Size, elements: &[Size]) -> Self {
        let mut surface = BoxSurface::new(viewport);
        let board = surface.insert_host(Rect::new(0.0, 0.0, 500.0, 500.0), attachments("board"));
        let ids: Vec<ElementId> = elements
            .iter()
            .enumerate()
            .map(|(i, s)| surface.insert_host(s.to_rect(), attachments(&format!("control {i}"))))
            .collect();
        surface.commit();
        let mut coordinator =
            ViewportCoordinator::new(surface, Some(board), ids.clone(), CoordinatorConfig::default());
        coordinator.initialize(HostTime(0)).unwrap();
        let mut scene = Self {
            coordinator,
            board,
            elements: ids,
            now: HostTime(0),
        };
        scene.settle();
        scene
    }

    /// Tick until nothing is pending.
    fn settle(&mut self) {
        for _ in 0..1000 {
            let Some(due) = self.coordinator.next_deadline() else {
                return;
            };
            self.now = due.max(self.now);
            self.coordinator.tick(self.now).unwrap();
        }
        panic!("coordinator did not settle");
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.now = HostTime(self.now.0 + 1000);
        self.coordinator
            .surface_mut()
            .set_viewport_size(Size::new(width, height));
        self.coordinator
            .handle_resize(width, height, self.now)
            .unwrap();
        self.settle();
    }

    fn later(&mut self) -> HostTime {
        self.now = HostTime(self.now.0 + 1000);
        self.now
    }
}

fn attachments(label: &str) -> Attachments {
    Attachments {
        handlers: 3,
        accessible_label: Some(label.to_owned()),
        theme_classes: vec!["control".to_owned(), "theme-dark".to_owned()],
    }
}

fn controls(n: usize) -> Vec<Size> {
    vec![Size::new(160.0, 48.0); n]
}

#[test]
fn wide_viewport_without_controls_centers_the_board() {
    let scene = Scene::new(Size::new(1920.0, 1080.0), &[]);
    let plan = scene.coordinator.plan().unwrap();
    assert_eq!(plan.focal_size, Size::new(1040.0, 1040.0));
    assert_eq!((plan.focal_position.x, plan.focal_position.y), (440.0, 20.0));
    assert!(plan.element_positions.is_empty());
    assert_eq!(
        scene.coordinator.surface().bounds(scene.board),
        Some(Rect::new(440.0, 20.0, 1480.0, 1060.0))
    );
}

#[test]
fn tall_viewport_stacks_below_the_board() {
    let scene = Scene::new(Size::new(360.0, 1200.0), &vec![Size::new(200.0, 60.0); 5]);
    let plan = scene.coordinator.plan().unwrap();
    assert_eq!(plan.strategy, LayoutStrategy::Stacked);
    assert!(plan.focal_size.width <= 360.0);
    assert_eq!(plan.focal_size.width, plan.focal_size.height);
    assert!(!plan.requires_scrolling, "the stack fits below the board");
    let ys: Vec<f64> = plan.element_positions.iter().map(|(_, p)| p.y).collect();
    for pair in ys.windows(2) {
        assert_eq!(pair[1] - pair[0], 60.0 + 16.0, "uniform 16-unit gaps");
    }
    assert!(scene.coordinator.get_state().regions.is_empty());
}

#[test]
fn short_viewport_wraps_the_stack_in_a_scroll_region() {
    let mut scene = Scene::new(Size::new(360.0, 600.0), &vec![Size::new(200.0, 60.0); 5]);
    let state = scene.coordinator.get_state();
    assert!(state.plan.as_ref().unwrap().requires_scrolling);
    assert_eq!(state.regions.len(), 1);
    assert!(state.regions[0].needs_scrolling);
    assert_eq!(state.regions[0].elements, scene.elements);
    assert_eq!(scene.coordinator.surface().count_of_kind(ElementKind::ScrollWrapper), 1);
    assert_eq!(scene.coordinator.surface().count_of_kind(ElementKind::Indicator), 2);

    // Growing tall enough removes the region and returns the elements.
    scene.resize(360.0, 1200.0);
    assert!(scene.coordinator.get_state().regions.is_empty());
    assert_eq!(scene.coordinator.surface().count_of_kind(ElementKind::ScrollWrapper), 0);
    assert_eq!(scene.coordinator.surface().count_of_kind(ElementKind::Indicator), 0);
    for &id in &scene.elements {
        assert_eq!(scene.coordinator.surface().parent_of(id), None);
    }
}

#[test]
fn removing_scrolling_twice_is_harmless() {
    let mut surface = BoxSurface::new(Size::new(360.0, 600.0));
    let items: Vec<(ElementId, Size)> = (0..5)
        .map(|_| {
            let id = surface.insert_host(Rect::new(0.0, 0.0, 200.0, 60.0), Attachments::default());
            (id, Size::new(200.0, 60.0))
        })
        .collect();
    let plan = ScrollRegionPlan::stack(&items, Point::new(80.0, 356.0), 200.0, 224.0, 16.0);
    let mut overflow = OverflowPlanner::new(ScrollConfig::default());
    let region = overflow.create_scroll_container(&mut surface, plan).unwrap();
    overflow.enable_scrolling(&mut surface, region);
    assert!(overflow.needs_scrolling(region));

    assert!(overflow.remove_scrolling(&mut surface, region));
    let after_first = (surface.mutations(), surface.count_of_kind(ElementKind::Indicator));
    assert!(!overflow.remove_scrolling(&mut surface, region));
    let after_second = (surface.mutations(), surface.count_of_kind(ElementKind::Indicator));
    assert_eq!(after_first, after_second);
    assert_eq!(after_second.1, 0);
    assert!(!overflow.needs_scrolling(region));
    for (id, _) in items {
        assert_eq!(surface.scroll_style(id), None);
        assert_eq!(surface.parent_of(id), None);
    }
}

#[test]
fn returning_to_a_viewport_reproduces_its_plan() {
    let sizes = [(1280.0, 800.0), (600.0, 900.0), (2400.0, 700.0), (400.0, 700.0)];
    for &(w1, h1) in &sizes {
        for &(w2, h2) in &sizes {
            if (w1, h1) == (w2, h2) {
                continue;
            }
            let mut scene = Scene::new(Size::new(w1, h1), &controls(6));
            let original = scene.coordinator.plan().cloned().unwrap();
            let board = scene.coordinator.surface().bounds(scene.board);
            scene.resize(w2, h2);
            scene.resize(w1, h1);
            let again = scene.coordinator.plan().unwrap();
            assert!(
                original.focal_position.approx_eq(&again.focal_position, 2.0),
                "board moved after {w1}x{h1} -> {w2}x{h2} -> back"
            );
            for ((a, pa), (b, pb)) in original.element_positions.iter().zip(&again.element_positions) {
                assert_eq!(a, b);
                assert!(pa.approx_eq(pb, 2.0), "{a:?} moved after a round trip via {w2}x{h2}");
            }
            let back = scene.coordinator.surface().bounds(scene.board);
            assert_eq!(board, back);
        }
    }
}

#[test]
fn board_never_shrinks_as_the_viewport_grows() {
    let mut scene = Scene::new(Size::new(320.0, 320.0), &controls(6));
    let mut previous = scene.coordinator.plan().unwrap().focal_size.width;
    for step in 1..=20 {
        let (w, h) = (320.0 + 80.0 * f64::from(step), 320.0 + 45.0 * f64::from(step));
        scene.resize(w, h);
        let size = scene.coordinator.plan().unwrap().focal_size.width;
        assert!(size + 1e-9 >= previous, "board shrank from {previous} to {size} at {w}x{h}");
        previous = size;
    }
}

#[test]
fn board_never_shrinks_across_the_aspect_thresholds() {
    // A very wide control makes side-by-side expensive past the 3.0 ratio.
    let mut scene = Scene::new(Size::new(2600.0, 1000.0), &[Size::new(2434.0, 40.0)]);
    let mut previous = scene.coordinator.plan().unwrap().focal_size.width;
    for step in 1..=40 {
        let (w, h) = (2600.0 + 20.0 * f64::from(step), 1000.0 + 0.5 * f64::from(step));
        scene.resize(w, h);
        let size = scene.coordinator.plan().unwrap().focal_size.width;
        assert!(size + 1e-9 >= previous, "board shrank from {previous} to {size} at {w}x{h}");
        previous = size;
    }

    // A very tall control makes stacking expensive below the 0.33 ratio.
    let mut scene = Scene::new(Size::new(1100.0, 3200.0), &[Size::new(40.0, 2500.0)]);
    let mut previous = scene.coordinator.plan().unwrap().focal_size.width;
    for step in 1..=25 {
        let (w, h) = (1100.0 + 0.5 * f64::from(step), 3200.0 + 12.0 * f64::from(step));
        scene.resize(w, h);
        let plan = scene.coordinator.plan().unwrap();
        let size = plan.focal_size.width;
        assert!(size + 1e-9 >= previous, "board shrank from {previous} to {size} at {w}x{h}");
        assert_eq!(plan.strategy, LayoutStrategy::SideBySide, "{w}x{h}");
        previous = size;
    }
}

#[test]
fn board_never_drops_below_the_floor() {
    let mut scene = Scene::new(Size::new(1024.0, 768.0), &controls(8));
    for &(w, h) in &[
        (320.0, 320.0),
        (330.0, 2000.0),
        (2000.0, 330.0),
        (700.0, 400.0),
        (400.0, 700.0),
        (1920.0, 1080.0),
        (360.0, 640.0),
    ] {
        scene.resize(w, h);
        let plan = scene.coordinator.plan().unwrap();
        assert!(plan.focal_size.width >= 280.0, "{w}x{h}");
        assert_eq!(plan.focal_size.width, plan.focal_size.height, "{w}x{h}");
    }
}

#[test]
fn controls_keep_their_spacing() {
    let mut scene = Scene::new(Size::new(1280.0, 800.0), &controls(7));
    for &(w, h) in &[
        (1920.0, 1080.0),
        (1024.0, 768.0),
        (800.0, 1280.0),
        (600.0, 900.0),
        (2560.0, 700.0),
        (500.0, 2000.0),
        (1280.0, 800.0),
    ] {
        scene.resize(w, h);
        assert_eq!(scene.coordinator.errors().computation, 0, "{w}x{h}");
        let plan = scene.coordinator.plan().unwrap();
        let report = scene
            .coordinator
            .breakpoints()
            .enforce_minimum_spacing(&plan.element_positions);
        assert!(report.valid, "{w}x{h}: {:?}", report.violations);
    }
}

#[test]
fn each_visibility_transition_recalculates_once() {
    let mut scene = Scene::new(Size::new(1280.0, 800.0), &controls(3));
    let fired = Rc::new(Cell::new(0_u32));
    let counter = Rc::clone(&fired);
    scene
        .coordinator
        .on_recalculate(Box::new(move |_, _, _| counter.set(counter.get() + 1)));
    let target = scene.elements[1];
    let base = scene.coordinator.breakpoints().recalculations();
    let analyses = scene.coordinator.get_state().analyses;

    scene.coordinator.surface_mut().set_style_hidden(target, true);
    scene.coordinator.surface_mut().commit();
    let now = scene.later();
    assert_eq!(scene.coordinator.handle_scroll(now), Ok(true));
    assert_eq!(scene.coordinator.breakpoints().recalculations(), base + 1);
    assert_eq!(scene.coordinator.get_state().analyses, analyses + 1);

    // Same state again: nothing happens.
    let now = scene.later();
    assert_eq!(scene.coordinator.handle_scroll(now), Ok(false));
    assert_eq!(scene.coordinator.breakpoints().recalculations(), base + 1);
    scene.settle();

    scene.coordinator.surface_mut().set_style_hidden(target, false);
    scene.coordinator.surface_mut().commit();
    let now = scene.later();
    assert_eq!(scene.coordinator.handle_scroll(now), Ok(true));
    assert_eq!(scene.coordinator.breakpoints().recalculations(), base + 2);
    assert_eq!(fired.get(), 2);
}

#[test]
fn visibility_transition_preempts_the_debounce() {
    let mut scene = Scene::new(Size::new(1280.0, 800.0), &controls(3));
    let now = scene.later();
    scene.coordinator.handle_resize(1400.0, 800.0, now).unwrap();
    assert!(scene.coordinator.get_state().pending_analysis.is_some());

    scene.coordinator.surface_mut().set_style_hidden(scene.elements[0], true);
    scene.coordinator.surface_mut().commit();
    assert_eq!(scene.coordinator.handle_scroll(HostTime(now.0 + 10)), Ok(true));
    let state = scene.coordinator.get_state();
    assert_eq!(state.pending_analysis, None, "the immediate analysis covers the resize");
    assert_eq!(state.viewport.width, 1400.0);
}

#[test]
fn layout_never_touches_attached_behaviour() {
    let mut surface = BoxSurface::new(Size::new(1280.0, 800.0));
    let board = surface.insert_host(Rect::new(0.0, 0.0, 500.0, 500.0), attachments("board"));
    let ids: Vec<ElementId> = (0..5)
        .map(|i| surface.insert_host(Rect::new(0.0, 0.0, 200.0, 60.0), attachments(&format!("c{i}"))))
        .collect();
    surface.set_focused(ids[2], true);
    surface.commit();
    let before: Vec<Option<Attachments>> = ids.iter().map(|id| surface.attachments(*id).cloned()).collect();

    let mut coordinator =
        ViewportCoordinator::new(surface, Some(board), ids.clone(), CoordinatorConfig::default());
    coordinator.initialize(HostTime(0)).unwrap();
    let mut now = 0;
    for (w, h) in [(360.0, 600.0), (1920.0, 1080.0), (360.0, 640.0), (800.0, 600.0)] {
        now += 1000;
        coordinator.surface_mut().set_viewport_size(Size::new(w, h));
        coordinator.handle_resize(w, h, HostTime(now)).unwrap();
        for t in (now..now + 1000).step_by(16) {
            coordinator.tick(HostTime(t)).unwrap();
        }
    }

    let surface = coordinator.surface();
    let after: Vec<Option<Attachments>> = ids.iter().map(|id| surface.attachments(*id).cloned()).collect();
    assert_eq!(before, after);
    assert!(surface.flags(ids[2]).unwrap().contains(ElementFlags::FOCUSED));
    assert_eq!(surface.count_of_kind(ElementKind::Host), 6);
    assert!(ids.iter().all(|id| surface.is_alive(*id)));
    assert!(surface.is_alive(board));
    assert_eq!(surface.attachments(board).cloned(), Some(attachments("board")));
}

#[test]
fn scroll_offset_survives_a_small_relayout() {
    let mut scene = Scene::new(Size::new(360.0, 600.0), &vec![Size::new(200.0, 60.0); 5]);
    let region = scene.coordinator.get_state().regions[0].id;
    let now = scene.later();
    assert_eq!(scene.coordinator.scroll_by(region, 50.0, now), Some(50.0));

    scene.resize(360.0, 620.0);
    let state = scene.coordinator.get_state();
    assert_eq!(state.regions.len(), 1);
    assert_eq!(state.regions[0].id, region, "same elements keep their region");
    assert_eq!(state.regions[0].offset, 50.0);
}

#[test]
fn scrolling_an_element_into_view() {
    let mut scene = Scene::new(Size::new(360.0, 600.0), &vec![Size::new(200.0, 60.0); 5]);
    let last = scene.elements[4];
    assert!(!scene.coordinator.tracker().is_visible(last), "clipped by the region frame");

    let now = scene.later();
    let offset = scene
        .coordinator
        .scroll_element_into_view(last, ScrollAlign::End, now)
        .unwrap();
    assert!(offset > 0.0);
    let frame = scene.coordinator.plan().unwrap().scroll_regions[0].frame();
    let bounds = scene.coordinator.surface().bounds(last).unwrap();
    assert!((bounds.y1 - frame.y1).abs() < 1e-9);
    assert!(scene.coordinator.tracker().is_visible(last));
    let indicators = scene.coordinator.get_state().regions[0].indicators;
    assert!(indicators.top_visible);
}

#[test]
fn drag_release_carries_momentum() {
    let mut scene = Scene::new(Size::new(360.0, 600.0), &vec![Size::new(200.0, 60.0); 5]);
    let region = scene.coordinator.get_state().regions[0].id;
    let t = scene.later().0;
    assert!(scene.coordinator.begin_drag(region, 500.0, HostTime(t)));
    scene.coordinator.drag_to(region, 480.0, HostTime(t + 16));
    scene.coordinator.drag_to(region, 460.0, HostTime(t + 32));
    let released = scene.coordinator.get_state().regions[0].offset;
    assert_eq!(released, 40.0);
    assert!(scene.coordinator.end_drag(region, HostTime(t + 32)));
    assert!(scene.coordinator.get_state().animating);
    scene.now = HostTime(t + 32);
    scene.settle();
    let settled = scene.coordinator.get_state().regions[0].offset;
    assert!(settled > released, "momentum kept scrolling");
    assert!(!scene.coordinator.get_state().animating);
}

#[test]
fn destroyed_coordinator_ignores_signals() {
    let mut scene = Scene::new(Size::new(360.0, 600.0), &vec![Size::new(200.0, 60.0); 5]);
    let region = scene.coordinator.get_state().regions[0].id;
    scene.coordinator.destroy();
    let state = scene.coordinator.get_state();
    assert_eq!(state.state, CoordinatorState::Destroyed);
    assert!(state.regions.is_empty());
    let now = scene.later();
    assert!(scene.coordinator.handle_resize(100.0, 100.0, now).is_err());
    assert!(scene.coordinator.handle_scroll(now).is_err());
    assert!(scene.coordinator.tick(now).is_err());
    assert_eq!(scene.coordinator.scroll_by(region, 10.0, now), None);
    assert!(!scene.coordinator.begin_drag(region, 10.0, now));
}
