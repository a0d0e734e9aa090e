// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content-derived breakpoints and the minimum-spacing invariant.

use easel_surface::ElementId;
use hashbrown::HashMap;
use kurbo::Size;

use crate::config::PlannerConfig;
use crate::plan::Position;
use crate::viewport::Viewport;

const EPSILON: f64 = 1e-6;

/// Layout band a viewport falls into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BreakpointBand {
    /// Neither single-column strategy keeps the board at its floor.
    Compact,
    /// Wide enough for a column below the board, preferred or the only option.
    Stacked,
    /// Wide enough for a column beside the board, preferred or the only option.
    SideBySide,
}

/// Size thresholds derived from the measured elements.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Breakpoints {
    /// Widest element.
    pub column_width: f64,
    /// Shortest element.
    pub min_element_height: f64,
    /// Height of all elements stacked with spacing.
    pub stack_height: f64,
    /// Viewport width from which a floor-sized board and a column fit side by side.
    pub side_by_side_min_width: f64,
    /// Viewport height from which a floor-sized board and one element fit stacked.
    pub stacked_min_height: f64,
    /// Viewport height from which the whole stack fits below a floor-sized board.
    pub stacked_no_scroll_height: f64,
    /// Smallest viewport dimension that holds a floor-sized board with margins.
    pub board_min_extent: f64,
    /// Band of the viewport these were calculated for.
    pub band: BreakpointBand,
}

impl Breakpoints {
    /// Classify a viewport against these thresholds.
    pub fn classify(&self, viewport: &Viewport) -> BreakpointBand {
        if viewport.is_malformed() || viewport.width.min(viewport.height) < self.board_min_extent {
            return BreakpointBand::Compact;
        }
        let side = viewport.width >= self.side_by_side_min_width;
        let stacked = viewport.height >= self.stacked_min_height;
        match (side, stacked) {
            (false, false) => BreakpointBand::Compact,
            (true, false) => BreakpointBand::SideBySide,
            (false, true) => BreakpointBand::Stacked,
            (true, true) if viewport.width >= viewport.height => BreakpointBand::SideBySide,
            (true, true) => BreakpointBand::Stacked,
        }
    }
}

/// Which pair of edges a spacing violation is measured between.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpacingAxis {
    /// Same column: vertical gap.
    Vertical,
    /// Same row: horizontal gap.
    Horizontal,
    /// The two elements overlap.
    Overlap,
}

/// Two elements closer than the minimum spacing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpacingViolation {
    /// Earlier element in input order.
    pub a: ElementId,
    /// Later element in input order.
    pub b: ElementId,
    /// Gap axis.
    pub axis: SpacingAxis,
    /// Measured gap (negative when overlapping).
    pub gap: f64,
}

/// Result of [`BreakpointManager::enforce_minimum_spacing`].
#[derive(Clone, Debug, PartialEq)]
pub struct SpacingReport {
    /// No violations.
    pub valid: bool,
    /// Every offending pair.
    pub violations: Vec<SpacingViolation>,
}

/// Handle for removing a recalculation listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Recalculation listener, called with `(element, visible, viewport)`.
pub type RecalculationListener = Box<dyn FnMut(ElementId, bool, &Viewport)>;

/// Derives breakpoints from content and guards the spacing invariant.
///
/// Breakpoints are cached until the element set, their sizes, or the viewport
/// change, or until a visibility transition invalidates them.
pub struct BreakpointManager {
    config: PlannerConfig,
    cache: Option<(Vec<(ElementId, Size)>, Size, Breakpoints)>,
    visibility: HashMap<ElementId, bool>,
    listeners: Vec<(ListenerId, RecalculationListener)>,
    next_listener: u32,
    recalculations: u64,
}

impl core::fmt::Debug for BreakpointManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BreakpointManager")
            .field("config", &self.config)
            .field("cached", &self.cache.as_ref().map(|(_, _, b)| b))
            .field("tracked", &self.visibility.len())
            .field("listeners", &self.listeners.len())
            .field("recalculations", &self.recalculations)
            .finish_non_exhaustive()
    }
}

impl BreakpointManager {
    /// Create a manager using the planner's floor, margin, and spacing.
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            cache: None,
            visibility: HashMap::new(),
            listeners: Vec::new(),
            next_listener: 0,
            recalculations: 0,
        }
    }

    /// Breakpoints for `elements` (with their natural sizes) at `viewport`.
    pub fn calculate_breakpoints(
        &mut self,
        elements: &[(ElementId, Size)],
        viewport: &Viewport,
    ) -> Breakpoints {
        let size = viewport.size();
        if let Some((cached_elements, cached_size, bp)) = &self.cache
            && cached_elements.as_slice() == elements
            && *cached_size == size
        {
            return *bp;
        }
        let bp = self.derive(elements, viewport);
        tracing::trace!(band = ?bp.band, "breakpoints recalculated");
        self.cache = Some((elements.to_vec(), size, bp));
        bp
    }

    /// Most recently calculated breakpoints, if still valid.
    pub fn cached(&self) -> Option<&Breakpoints> {
        self.cache.as_ref().map(|(_, _, b)| b)
    }

    /// Drop the cached breakpoints.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn derive(&self, elements: &[(ElementId, Size)], viewport: &Viewport) -> Breakpoints {
        let cfg = &self.config;
        let (m, s, floor) = (cfg.margin, cfg.spacing, cfg.min_board);
        let column_width = elements.iter().map(|(_, z)| z.width).fold(0.0, f64::max);
        let min_element_height = if elements.is_empty() {
            0.0
        } else {
            elements.iter().map(|(_, z)| z.height).fold(f64::INFINITY, f64::min)
        };
        let stack_height = elements.iter().map(|(_, z)| z.height).sum::<f64>()
            + s * elements.len().saturating_sub(1) as f64;
        let (side_extra, stacked_extra, stack_extra) = if elements.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (s + column_width, s + min_element_height, s + stack_height)
        };
        let mut bp = Breakpoints {
            column_width,
            min_element_height,
            stack_height,
            side_by_side_min_width: floor + 2.0 * m + side_extra,
            stacked_min_height: floor + 2.0 * m + stacked_extra,
            stacked_no_scroll_height: floor + 2.0 * m + stack_extra,
            board_min_extent: floor + 2.0 * m,
            band: BreakpointBand::Compact,
        };
        bp.band = bp.classify(viewport);
        bp
    }

    /// Register a listener fired once per actual visibility transition.
    pub fn on_recalculate(&mut self, listener: RecalculationListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        before != self.listeners.len()
    }

    /// Record a visibility observation.
    ///
    /// Elements start out assumed visible. A transition invalidates the cached
    /// breakpoints, fires every listener once, and returns `true`; repeating the
    /// current value does nothing and returns `false`.
    pub fn on_visibility_change(
        &mut self,
        element: ElementId,
        visible: bool,
        viewport: &Viewport,
    ) -> bool {
        let previous = self.visibility.insert(element, visible).unwrap_or(true);
        if previous == visible {
            return false;
        }
        self.invalidate();
        self.recalculations += 1;
        tracing::debug!(?element, visible, "visibility transition, recalculating");
        for (_, listener) in &mut self.listeners {
            listener(element, visible, viewport);
        }
        true
    }

    /// Stop tracking an element's visibility.
    pub fn forget(&mut self, element: ElementId) {
        self.visibility.remove(&element);
    }

    /// Number of transitions that triggered a recalculation.
    pub fn recalculations(&self) -> u64 {
        self.recalculations
    }

    /// Check every pair sharing a row or column against the minimum spacing.
    ///
    /// Two elements share a column when their horizontal extents overlap (the
    /// vertical gap is measured) and a row when their vertical extents overlap
    /// (the horizontal gap is measured). Elements overlapping on both axes
    /// always violate.
    pub fn enforce_minimum_spacing(&self, positions: &[(ElementId, Position)]) -> SpacingReport {
        let min = self.config.spacing;
        let mut violations = Vec::new();
        for (i, (a, pa)) in positions.iter().enumerate() {
            for (b, pb) in &positions[i + 1..] {
                if let Some((axis, gap)) = pair_gap(pa, pb)
                    && gap + EPSILON < min
                {
                    violations.push(SpacingViolation {
                        a: *a,
                        b: *b,
                        axis,
                        gap,
                    });
                }
            }
        }
        SpacingReport {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// Move elements down or right until no pair violates the minimum spacing.
    ///
    /// Elements are settled top to bottom, left to right; each one is only
    /// ever pushed down (when it shares a column with a settled element) or
    /// right (when it shares a row), so relative order is preserved. The result
    /// is in input order.
    ///
    /// This is a best-effort repair. Pushes ignore the viewport, so elements
    /// can end up off screen, and each element gets at most one push per
    /// settled neighbour, so a dense cluster can keep violations. Check the
    /// result with [`BreakpointManager::enforce_minimum_spacing`] and validate
    /// the plan before applying it.
    pub fn adjust_positions_for_spacing(
        &self,
        positions: &[(ElementId, Position)],
    ) -> Vec<(ElementId, Position)> {
        let min = self.config.spacing;
        let mut order: Vec<usize> = (0..positions.len()).collect();
        order.sort_by(|&i, &j| {
            let (a, b) = (&positions[i].1, &positions[j].1);
            a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
        });

        let mut adjusted: Vec<(ElementId, Position)> = positions.to_vec();
        let mut settled: Vec<usize> = Vec::with_capacity(positions.len());
        for &i in &order {
            let mut p = adjusted[i].1;
            // Each push clears one settled neighbour for good.
            for _ in 0..=settled.len() {
                let conflict = settled.iter().find_map(|&j| {
                    let q = &adjusted[j].1;
                    pair_gap(q, &p)
                        .filter(|(_, gap)| gap + EPSILON < min)
                        .map(|(axis, _)| (axis, *q))
                });
                let Some((axis, q)) = conflict else {
                    break;
                };
                match axis {
                    SpacingAxis::Horizontal => p.x = q.x + q.width + min,
                    SpacingAxis::Vertical | SpacingAxis::Overlap => p.y = q.y + q.height + min,
                }
            }
            adjusted[i].1 = p;
            settled.push(i);
        }
        adjusted
    }
}

/// Gap between two positions that share a row or column.
fn pair_gap(a: &Position, b: &Position) -> Option<(SpacingAxis, f64)> {
    let (ra, rb) = (a.rect(), b.rect());
    let x_overlap = ra.x0 < rb.x1 - EPSILON && rb.x0 < ra.x1 - EPSILON;
    let y_overlap = ra.y0 < rb.y1 - EPSILON && rb.y0 < ra.y1 - EPSILON;
    let vertical = (rb.y0 - ra.y1).max(ra.y0 - rb.y1);
    let horizontal = (rb.x0 - ra.x1).max(ra.x0 - rb.x1);
    match (x_overlap, y_overlap) {
        (true, true) => Some((SpacingAxis::Overlap, vertical.max(horizontal))),
        (true, false) => Some((SpacingAxis::Vertical, vertical)),
        (false, true) => Some((SpacingAxis::Horizontal, horizontal)),
        (false, false) => None,
    }
}
