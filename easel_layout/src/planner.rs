// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Board-priority layout planning.

use easel_scroll::ScrollRegionPlan;
use easel_surface::ElementId;
use kurbo::{Point, Rect, Size};

use crate::config::PlannerConfig;
use crate::flow::{cross_total, flow_lines};
use crate::plan::{AnalysisResult, LayoutPlan, LayoutStrategy, Position};
use crate::viewport::{Orientation, Viewport};

const EPSILON: f64 = 1e-6;

/// Aggregate extents of the secondary elements.
#[derive(Copy, Clone, Debug, Default)]
struct Metrics {
    count: usize,
    column_width: f64,
    stack_height: f64,
    min_height: f64,
}

impl Metrics {
    fn of(sizes: &[Size], spacing: f64) -> Self {
        if sizes.is_empty() {
            return Self::default();
        }
        let gaps = spacing * (sizes.len() - 1) as f64;
        Self {
            count: sizes.len(),
            column_width: sizes.iter().map(|s| s.width).fold(0.0, f64::max),
            stack_height: sizes.iter().map(|s| s.height).sum::<f64>() + gaps,
            min_height: sizes.iter().map(|s| s.height).fold(f64::INFINITY, f64::min),
        }
    }
}

/// Outcome of strategy selection.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Decision {
    strategy: LayoutStrategy,
    /// Single-column strategy the mixed flow is derived from.
    primary: LayoutStrategy,
    board: f64,
    /// Neither single strategy fits without shrinking the board below the floor.
    forced: bool,
}

/// Placed geometry before conversion into a [`LayoutPlan`].
struct Placed {
    board: Rect,
    elements: Vec<(ElementId, Rect)>,
    region: Option<ScrollRegionPlan>,
}

/// Computes [`LayoutPlan`]s.
///
/// Planning is a pure function of the viewport and the elements' natural sizes,
/// so returning to an earlier viewport reproduces the earlier plan.
///
/// The board-priority algorithm:
///
/// 1. The largest square that fits the viewport alone is the base board size
///    (smaller viewport dimension minus margins, never below the floor).
/// 2. Side-by-side shrinks the board only until one column of elements fits
///    beside it; stacked shrinks it only until the shortest element fits below it.
///    With board priority disabled, stacked reserves room for the whole stack.
/// 3. If neither strategy can keep the board at the floor, elements are forced
///    into a scrolling stack below a floor-sized board.
/// 4. The strategy with the larger board wins. Extreme aspect ratios prefer
///    side-by-side (wide) or stacked (tall) when that board is at least as
///    large; otherwise orientation breaks ties.
/// 5. When the chosen single column would scroll and there are enough elements,
///    the mixed strategy flows them into several columns (or rows) instead,
///    provided that fits without scrolling. The board size does not change.
/// 6. A single column that still does not fit becomes a scroll region.
///
/// ## Example
///
/// ```rust
/// use easel_layout::{AnalysisResult, LayoutPlanner, PlannerConfig, Viewport};
///
/// let planner = LayoutPlanner::new(PlannerConfig::default());
/// let plan = planner.calculate_optimal_layout(&AnalysisResult::empty(Viewport::new(1920.0, 1080.0)));
/// assert_eq!(plan.focal_size.width, 1040.0);
/// assert_eq!((plan.focal_position.x, plan.focal_position.y), (440.0, 20.0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LayoutPlanner {
    config: PlannerConfig,
}

impl LayoutPlanner {
    /// Create a planner.
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Compute the complete plan for one analysis.
    ///
    /// Never fails: a malformed viewport yields a best-effort plan with a
    /// floor-sized board at the origin and the elements stacked below it.
    pub fn calculate_optimal_layout(&self, analysis: &AnalysisResult) -> LayoutPlan {
        let viewport = analysis.viewport;
        let items: Vec<(ElementId, Size)> = analysis
            .secondary
            .iter()
            .map(|e| (e.id, sanitize(e.size)))
            .collect();
        if viewport.is_malformed() {
            tracing::warn!(
                width = viewport.width,
                height = viewport.height,
                "malformed viewport, planning at minimum size"
            );
            return self.minimal_plan(analysis, &items);
        }

        let sizes: Vec<Size> = items.iter().map(|(_, s)| *s).collect();
        let decision = self.decide(&viewport, &sizes);
        if decision.forced {
            tracing::warn!(
                width = viewport.width,
                height = viewport.height,
                elements = items.len(),
                "viewport too small, forcing a scrolling stack"
            );
        }
        let placed = match decision.strategy {
            _ if items.is_empty() => self.place_alone(&viewport, decision.board),
            LayoutStrategy::SideBySide => self.place_side(&viewport, decision.board, &items, false),
            LayoutStrategy::Stacked => self.place_stacked(&viewport, decision.board, &items, false),
            LayoutStrategy::Mixed => match decision.primary {
                LayoutStrategy::SideBySide => self.place_side(&viewport, decision.board, &items, true),
                _ => self.place_stacked(&viewport, decision.board, &items, true),
            },
        };
        tracing::debug!(
            strategy = ?decision.strategy,
            board = decision.board,
            elements = items.len(),
            scrolling = placed.region.is_some(),
            "layout planned"
        );
        self.finish(analysis, decision.strategy, placed)
    }

    /// Side of the focal region for `viewport` and the given element sizes.
    pub fn calculate_board_size(&self, viewport: &Viewport, secondary: &[Size]) -> Size {
        if viewport.is_malformed() {
            return Size::new(self.config.min_board, self.config.min_board);
        }
        let sizes: Vec<Size> = secondary.iter().copied().map(sanitize).collect();
        let board = self.decide(viewport, &sizes).board;
        Size::new(board, board)
    }

    /// Strategy for `element_count` elements of the configured estimated size.
    pub fn determine_layout_strategy(
        &self,
        viewport: &Viewport,
        element_count: usize,
    ) -> LayoutStrategy {
        if viewport.is_malformed() {
            return LayoutStrategy::Stacked;
        }
        let sizes = vec![sanitize(self.config.estimated_element); element_count];
        self.decide(viewport, &sizes).strategy
    }

    fn decide(&self, viewport: &Viewport, sizes: &[Size]) -> Decision {
        let cfg = &self.config;
        let (w, h) = (viewport.width, viewport.height);
        let (m, s, floor) = (cfg.margin, cfg.spacing, cfg.min_board);
        let base = (w.min(h) - 2.0 * m).max(floor);
        let by_orientation = match viewport.orientation {
            Orientation::Landscape => LayoutStrategy::SideBySide,
            Orientation::Portrait => LayoutStrategy::Stacked,
        };
        let metrics = Metrics::of(sizes, s);
        if metrics.count == 0 {
            return Decision {
                strategy: by_orientation,
                primary: by_orientation,
                board: base,
                forced: false,
            };
        }

        let fits_board = w.min(h) - 2.0 * m >= floor;
        let side_limit = w - 2.0 * m - s - metrics.column_width;
        let side_ok = fits_board && side_limit >= floor;
        let side = side_limit.min(base).max(floor);

        let stacked_limit = h - 2.0 * m - s - metrics.min_height;
        let stacked_ok = fits_board && stacked_limit >= floor;
        let stacked_reserve = if cfg.prioritize_board {
            stacked_limit
        } else {
            h - 2.0 * m - s - metrics.stack_height
        };
        let stacked = stacked_reserve.min(base).max(floor);

        let preferred = if viewport.aspect_ratio > cfg.side_by_side_ratio {
            Some(LayoutStrategy::SideBySide)
        } else if viewport.aspect_ratio < cfg.stacked_ratio {
            Some(LayoutStrategy::Stacked)
        } else {
            None
        };
        let (primary, board, forced) = match (side_ok, stacked_ok) {
            (false, false) => (LayoutStrategy::Stacked, stacked, true),
            (true, false) => (LayoutStrategy::SideBySide, side, false),
            (false, true) => (LayoutStrategy::Stacked, stacked, false),
            (true, true) => {
                // Aspect preference never costs board size.
                let side_wins = match preferred {
                    Some(LayoutStrategy::SideBySide) if side + EPSILON >= stacked => true,
                    Some(LayoutStrategy::Stacked) if stacked + EPSILON >= side => false,
                    _ if side > stacked + EPSILON => true,
                    _ if stacked > side + EPSILON => false,
                    _ => by_orientation == LayoutStrategy::SideBySide,
                };
                if side_wins {
                    (LayoutStrategy::SideBySide, side, false)
                } else {
                    (LayoutStrategy::Stacked, stacked, false)
                }
            }
        };

        let strategy = if metrics.count >= cfg.mixed_min_elements
            && self.single_column_scrolls(viewport, primary, board, &metrics)
            && self.flow_fits(viewport, primary, board, sizes)
        {
            LayoutStrategy::Mixed
        } else {
            primary
        };
        Decision {
            strategy,
            primary,
            board,
            forced,
        }
    }

    fn single_column_scrolls(
        &self,
        viewport: &Viewport,
        primary: LayoutStrategy,
        board: f64,
        metrics: &Metrics,
    ) -> bool {
        let available = match primary {
            LayoutStrategy::SideBySide => viewport.height - 2.0 * self.config.margin,
            _ => self.below_board(viewport, board, metrics.min_height).1,
        };
        metrics.stack_height > available + EPSILON
    }

    fn flow_fits(
        &self,
        viewport: &Viewport,
        primary: LayoutStrategy,
        board: f64,
        sizes: &[Size],
    ) -> bool {
        let (m, s) = (self.config.margin, self.config.spacing);
        match primary {
            LayoutStrategy::SideBySide => {
                let limit = viewport.height - 2.0 * m;
                let extents: Vec<(f64, f64)> = sizes.iter().map(|z| (z.height, z.width)).collect();
                let lines = flow_lines(&extents, limit, s);
                lines.iter().all(|l| l.main <= limit + EPSILON)
                    && cross_total(&lines, s) <= viewport.width - 2.0 * m - board - s + EPSILON
            }
            _ => {
                let min_height = sizes.iter().map(|z| z.height).fold(f64::INFINITY, f64::min);
                let (_, available) = self.below_board(viewport, board, min_height);
                let width = self.available_width(viewport);
                let extents: Vec<(f64, f64)> = sizes
                    .iter()
                    .map(|z| (z.width.min(width), z.height))
                    .collect();
                cross_total(&flow_lines(&extents, width, s), s) <= available + EPSILON
            }
        }
    }

    /// Board origin for the stacked strategies.
    fn stacked_board_origin(&self, viewport: &Viewport, board: f64) -> Point {
        let m = self.config.margin;
        let y = if viewport.height >= board + 2.0 * m {
            m
        } else {
            ((viewport.height - board) / 2.0).max(0.0)
        };
        Point::new(((viewport.width - board) / 2.0).max(0.0), y)
    }

    /// Top of the area below the board and its usable height.
    ///
    /// The bottom margin is dropped when keeping it would leave no room for the
    /// shortest element.
    fn below_board(&self, viewport: &Viewport, board: f64, min_height: f64) -> (f64, f64) {
        let top = self.stacked_board_origin(viewport, board).y + board + self.config.spacing;
        let with_margin = viewport.height - self.config.margin - top;
        let available = if with_margin < min_height {
            viewport.height - top
        } else {
            with_margin
        };
        (top, available.max(0.0))
    }

    fn available_width(&self, viewport: &Viewport) -> f64 {
        let inner = viewport.width - 2.0 * self.config.margin;
        if inner > 0.0 { inner } else { viewport.width.max(0.0) }
    }

    fn place_alone(&self, viewport: &Viewport, board: f64) -> Placed {
        let x = ((viewport.width - board) / 2.0).max(0.0);
        let y = ((viewport.height - board) / 2.0).max(0.0);
        Placed {
            board: Rect::from_origin_size((x, y), (board, board)),
            elements: Vec::new(),
            region: None,
        }
    }

    fn place_side(
        &self,
        viewport: &Viewport,
        board: f64,
        items: &[(ElementId, Size)],
        flow: bool,
    ) -> Placed {
        let (m, s) = (self.config.margin, self.config.spacing);
        let (w, h) = (viewport.width, viewport.height);
        let limit = h - 2.0 * m;
        let extents: Vec<(f64, f64)> = items.iter().map(|(_, z)| (z.height, z.width)).collect();
        let lines = if flow {
            flow_lines(&extents, limit, s)
        } else {
            // One column holding everything.
            flow_lines(&extents, f64::INFINITY, s)
        };
        let grid_width = cross_total(&lines, s);
        let x0 = ((w - (board + s + grid_width)) / 2.0).max(0.0);
        let board_rect = Rect::from_origin_size((x0, ((h - board) / 2.0).max(0.0)), (board, board));
        let column_x = x0 + board + s;

        if !flow && lines.first().is_some_and(|l| l.main > limit + EPSILON) {
            let region = ScrollRegionPlan::stack(items, Point::new(column_x, m), grid_width, limit, s);
            return Placed {
                board: board_rect,
                elements: region.element_rects().collect(),
                region: Some(region),
            };
        }

        let mut elements = Vec::with_capacity(items.len());
        let mut x = column_x;
        for line in &lines {
            let mut y = ((h - line.main) / 2.0).max(0.0);
            for (id, size) in &items[line.items.clone()] {
                let ex = x + (line.cross - size.width) / 2.0;
                elements.push((*id, Rect::from_origin_size((ex, y), *size)));
                y += size.height + s;
            }
            x += line.cross + s;
        }
        Placed {
            board: board_rect,
            elements,
            region: None,
        }
    }

    fn place_stacked(
        &self,
        viewport: &Viewport,
        board: f64,
        items: &[(ElementId, Size)],
        flow: bool,
    ) -> Placed {
        let s = self.config.spacing;
        let w = viewport.width;
        let origin = self.stacked_board_origin(viewport, board);
        let board_rect = Rect::from_origin_size(origin, (board, board));
        let width = self.available_width(viewport);
        let items: Vec<(ElementId, Size)> = items
            .iter()
            .map(|(id, z)| (*id, Size::new(z.width.min(width), z.height)))
            .collect();
        let min_height = items.iter().map(|(_, z)| z.height).fold(f64::INFINITY, f64::min);
        let (top, available) = self.below_board(viewport, board, min_height);

        if flow {
            let extents: Vec<(f64, f64)> = items.iter().map(|(_, z)| (z.width, z.height)).collect();
            let mut elements = Vec::with_capacity(items.len());
            let mut y = top;
            for line in flow_lines(&extents, width, s) {
                let mut x = ((w - line.main) / 2.0).max(0.0);
                for (id, size) in &items[line.items.clone()] {
                    elements.push((*id, Rect::from_origin_size((x, y), *size)));
                    x += size.width + s;
                }
                y += line.cross + s;
            }
            return Placed {
                board: board_rect,
                elements,
                region: None,
            };
        }

        let column_width = items.iter().map(|(_, z)| z.width).fold(0.0, f64::max);
        let region = ScrollRegionPlan::stack(
            &items,
            Point::new(((w - column_width) / 2.0).max(0.0), top),
            column_width,
            available,
            s,
        );
        let elements = region.element_rects().collect();
        Placed {
            board: board_rect,
            elements,
            region: region.needs_scrolling().then_some(region),
        }
    }

    fn finish(&self, analysis: &AnalysisResult, strategy: LayoutStrategy, placed: Placed) -> LayoutPlan {
        let cfg = &self.config;
        let side = placed.board.width();
        let scroll_regions: Vec<ScrollRegionPlan> = placed.region.into_iter().collect();
        LayoutPlan {
            viewport: analysis.viewport,
            focal_element: analysis.board,
            board_aspect: analysis.board_aspect,
            focal_size: Size::new(side, side),
            focal_position: Position::from_rect(placed.board, cfg.board_layer),
            strategy,
            element_positions: placed
                .elements
                .into_iter()
                .map(|(id, r)| (id, Position::from_rect(r, cfg.element_layer)))
                .collect(),
            requires_scrolling: !scroll_regions.is_empty(),
            scroll_regions,
        }
    }

    fn minimal_plan(&self, analysis: &AnalysisResult, items: &[(ElementId, Size)]) -> LayoutPlan {
        let cfg = &self.config;
        let floor = cfg.min_board;
        let mut y = floor + cfg.spacing;
        let elements = items
            .iter()
            .map(|(id, size)| {
                let rect = Rect::from_origin_size((0.0, y), *size);
                y += size.height + cfg.spacing;
                (*id, rect)
            })
            .collect();
        self.finish(
            analysis,
            LayoutStrategy::Stacked,
            Placed {
                board: Rect::new(0.0, 0.0, floor, floor),
                elements,
                region: None,
            },
        )
    }
}

fn sanitize(size: Size) -> Size {
    let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    Size::new(clean(size.width), clean(size.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::SecondaryElement;

    fn analysis(w: f64, h: f64, sizes: &[Size]) -> AnalysisResult {
        AnalysisResult {
            viewport: Viewport::new(w, h),
            board: Some(ElementId::from_raw(100, 1)),
            board_aspect: 1.0,
            secondary: sizes
                .iter()
                .enumerate()
                .map(|(i, size)| SecondaryElement {
                    id: ElementId::from_raw(u32::try_from(i).unwrap(), 1),
                    size: *size,
                    visible: true,
                })
                .collect(),
            invisible: Vec::new(),
        }
    }

    fn planner() -> LayoutPlanner {
        LayoutPlanner::new(PlannerConfig::default())
    }

    #[test]
    fn empty_landscape_board_is_centered() {
        let plan = planner().calculate_optimal_layout(&analysis(1920.0, 1080.0, &[]));
        assert_eq!(plan.focal_size, Size::new(1040.0, 1040.0));
        assert_eq!(plan.focal_position.rect(), Rect::new(440.0, 20.0, 1480.0, 1060.0));
        assert!(!plan.requires_scrolling);
        assert_eq!(plan.validate(&plan.viewport, planner().config()), Ok(()));
    }

    #[test]
    fn tall_viewport_stacks_below_board() {
        let sizes = [Size::new(200.0, 60.0); 5];
        let plan = planner().calculate_optimal_layout(&analysis(360.0, 1200.0, &sizes));
        assert_eq!(plan.strategy, LayoutStrategy::Stacked);
        assert_eq!(plan.focal_size, Size::new(320.0, 320.0));
        assert_eq!(plan.focal_position.rect(), Rect::new(20.0, 20.0, 340.0, 340.0));
        let ys: Vec<f64> = plan.element_positions.iter().map(|(_, p)| p.y).collect();
        assert_eq!(ys, vec![356.0, 432.0, 508.0, 584.0, 660.0]);
        assert!(plan.element_positions.iter().all(|(_, p)| p.x == 80.0));
        assert!(!plan.requires_scrolling);
        assert_eq!(plan.validate(&plan.viewport, planner().config()), Ok(()));
    }

    #[test]
    fn overflowing_stack_becomes_scroll_region() {
        // 12 * 60 + 11 * 16 = 896 > 1200 - 20 - 356 = 824
        let sizes = [Size::new(320.0, 60.0); 12];
        let plan = planner().calculate_optimal_layout(&analysis(360.0, 1200.0, &sizes));
        assert_eq!(plan.strategy, LayoutStrategy::Stacked);
        assert!(plan.requires_scrolling);
        let region = &plan.scroll_regions[0];
        assert!(region.needs_scrolling());
        assert_eq!(region.max_height(), 824.0);
        assert_eq!(region.elements().len(), 12);
        assert_eq!(plan.validate(&plan.viewport, planner().config()), Ok(()));
    }

    #[test]
    fn wide_viewport_places_column_beside_board() {
        let sizes = [Size::new(200.0, 60.0); 3];
        let plan = planner().calculate_optimal_layout(&analysis(1600.0, 900.0, &sizes));
        assert_eq!(plan.strategy, LayoutStrategy::SideBySide);
        assert_eq!(plan.focal_size.width, 860.0);
        let board = plan.focal_position.rect();
        for (_, p) in &plan.element_positions {
            assert!(p.x >= board.x1 + 16.0, "column sits right of the board");
        }
        assert_eq!(plan.validate(&plan.viewport, planner().config()), Ok(()));
    }

    #[test]
    fn larger_board_wins_when_aspect_is_moderate() {
        // Wide elements make side-by-side expensive in a near-square viewport.
        let sizes = [Size::new(400.0, 40.0); 2];
        let p = planner();
        let v = Viewport::new(900.0, 800.0);
        let plan = p.calculate_optimal_layout(&analysis(900.0, 800.0, &sizes));
        assert_eq!(plan.strategy, LayoutStrategy::Stacked);
        // side: 900 - 40 - 16 - 400 = 444; stacked: 800 - 40 - 16 - 40 = 704
        assert_eq!(p.calculate_board_size(&v, &sizes), Size::new(704.0, 704.0));
    }

    #[test]
    fn aspect_threshold_does_not_shrink_the_board() {
        // One very wide element: side-by-side leaves 500-520, stacked leaves 904-905.
        let sizes = [Size::new(2434.0, 40.0)];
        let p = planner();
        let below = Viewport::new(2990.0, 1000.0);
        let above = Viewport::new(3010.0, 1001.0);
        assert!(above.aspect_ratio > p.config().side_by_side_ratio);
        let small = p.calculate_board_size(&below, &sizes);
        let large = p.calculate_board_size(&above, &sizes);
        assert_eq!(small, Size::new(904.0, 904.0));
        assert_eq!(large, Size::new(905.0, 905.0), "board shrank across the aspect threshold");
        let plan = p.calculate_optimal_layout(&analysis(3010.0, 1001.0, &sizes));
        assert_eq!(plan.strategy, LayoutStrategy::Stacked);
    }

    #[test]
    fn extreme_aspect_prefers_its_strategy_on_ties() {
        // side: 1201 - 40 - 16 - 841 = 304; stacked: 400 - 40 - 16 - 40 = 304
        let sizes = [Size::new(841.0, 40.0)];
        let p = planner();
        let v = Viewport::new(1201.0, 400.0);
        assert!(v.aspect_ratio > p.config().side_by_side_ratio);
        assert_eq!(p.calculate_board_size(&v, &sizes), Size::new(304.0, 304.0));
        assert_eq!(
            p.calculate_optimal_layout(&analysis(1201.0, 400.0, &sizes)).strategy,
            LayoutStrategy::SideBySide
        );
    }

    #[test]
    fn many_elements_flow_into_mixed_columns() {
        // One column of 12 would need 12 * 60 + 11 * 16 = 896 > 660.
        let sizes = [Size::new(150.0, 60.0); 12];
        let plan = planner().calculate_optimal_layout(&analysis(1400.0, 700.0, &sizes));
        assert_eq!(plan.strategy, LayoutStrategy::Mixed);
        assert_eq!(plan.focal_size.width, 660.0, "mixed keeps the board size");
        assert!(!plan.requires_scrolling);
        assert_eq!(plan.validate(&plan.viewport, planner().config()), Ok(()));

        let few = planner().calculate_optimal_layout(&analysis(1400.0, 700.0, &sizes[..3]));
        assert_eq!(few.strategy, LayoutStrategy::SideBySide);
    }

    #[test]
    fn tiny_viewport_forces_scrolling_stack_at_floor() {
        let sizes = [Size::new(200.0, 60.0); 4];
        let plan = planner().calculate_optimal_layout(&analysis(330.0, 330.0, &sizes));
        assert_eq!(plan.strategy, LayoutStrategy::Stacked);
        assert_eq!(plan.focal_size.width, 280.0);
        assert!(plan.focal_position.is_non_negative());
    }

    #[test]
    fn malformed_viewport_yields_minimum_plan() {
        let sizes = [Size::new(200.0, 60.0); 2];
        for (w, h) in [(0.0, 0.0), (-100.0, 500.0), (f64::NAN, 500.0)] {
            let plan = planner().calculate_optimal_layout(&analysis(w, h, &sizes));
            assert_eq!(plan.focal_size, Size::new(280.0, 280.0));
            assert!(plan.element_positions.iter().all(|(_, p)| p.is_finite() && p.is_non_negative()));
        }
    }

    #[test]
    fn board_priority_never_loses_to_non_priority() {
        let relaxed = LayoutPlanner::new(PlannerConfig::default().with_prioritize_board(false));
        let sizes = [Size::new(200.0, 80.0); 6];
        for (w, h) in [(400.0, 900.0), (700.0, 700.0), (1200.0, 700.0), (360.0, 640.0)] {
            let v = Viewport::new(w, h);
            let strict = planner().calculate_board_size(&v, &sizes);
            let loose = relaxed.calculate_board_size(&v, &sizes);
            assert!(strict.width >= loose.width, "{w}x{h}: {strict:?} < {loose:?}");
            assert!(loose.width >= 280.0);
        }
    }

    #[test]
    fn strategy_from_count() {
        let p = planner();
        assert_eq!(
            p.determine_layout_strategy(&Viewport::new(2000.0, 500.0), 3),
            LayoutStrategy::SideBySide
        );
        assert_eq!(
            p.determine_layout_strategy(&Viewport::new(300.0, 1000.0), 3),
            LayoutStrategy::Stacked
        );
        assert_eq!(
            p.determine_layout_strategy(&Viewport::new(0.0, 1000.0), 3),
            LayoutStrategy::Stacked
        );
    }
}
