// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Planner inputs and outputs.

use easel_scroll::ScrollRegionPlan;
use easel_surface::ElementId;
use kurbo::{Rect, Size};

use crate::config::PlannerConfig;
use crate::viewport::Viewport;

/// Slack allowed when checking bounds and squareness.
pub const TOLERANCE: f64 = 0.5;

/// How secondary elements are placed relative to the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayoutStrategy {
    /// One column beside the board.
    SideBySide,
    /// One column below the board.
    Stacked,
    /// Elements flow into several columns beside, or several rows below, the board.
    Mixed,
}

/// Placement of one element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Stacking order.
    pub stack_order: i32,
}

impl Position {
    /// Position covering `rect`.
    pub fn from_rect(rect: Rect, stack_order: i32) -> Self {
        Self {
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            stack_order,
        }
    }

    /// Rectangle covered by this position.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Every coordinate is non-negative.
    pub fn is_non_negative(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.width >= 0.0 && self.height >= 0.0
    }

    /// Whether the two positions are within `tolerance` of each other on every coordinate.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
            && self.stack_order == other.stack_order
    }
}

/// A secondary element as seen by the planner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SecondaryElement {
    /// The element.
    pub id: ElementId,
    /// Natural (intrinsic) size.
    pub size: Size,
    /// Whether the element was visible when the analysis ran.
    pub visible: bool,
}

/// Everything the planner needs from one analysis cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    /// The display area.
    pub viewport: Viewport,
    /// The board, if one is managed.
    pub board: Option<ElementId>,
    /// Natural aspect ratio (width / height) of the board.
    pub board_aspect: f64,
    /// Secondary elements in layout order.
    pub secondary: Vec<SecondaryElement>,
    /// Managed elements classified invisible during the analysis.
    pub invisible: Vec<ElementId>,
}

impl AnalysisResult {
    /// An analysis with no managed elements.
    pub fn empty(viewport: Viewport) -> Self {
        Self {
            viewport,
            board: None,
            board_aspect: 1.0,
            secondary: Vec::new(),
            invisible: Vec::new(),
        }
    }

    /// Whether the board was classified invisible.
    pub fn board_invisible(&self) -> bool {
        self.board.is_some_and(|b| self.invisible.contains(&b))
    }
}

/// Why a plan violates the layout invariants.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// The viewport has a zero, negative, or non-finite dimension.
    #[error("malformed viewport {width}x{height}")]
    MalformedViewport {
        /// Width as given.
        width: f64,
        /// Height as given.
        height: f64,
    },
    /// A coordinate is NaN or infinite.
    #[error("non-finite position for {0:?}")]
    NonFinite(Option<ElementId>),
    /// A coordinate is negative.
    #[error("negative position for {0:?}")]
    Negative(Option<ElementId>),
    /// The focal region is not square.
    #[error("focal region {width}x{height} is not square")]
    NotSquare {
        /// Width.
        width: f64,
        /// Height.
        height: f64,
    },
    /// The focal region is below the floor.
    #[error("focal region {size} is below the minimum {min}")]
    BoardTooSmall {
        /// Side.
        size: f64,
        /// Floor.
        min: f64,
    },
    /// A position leaves the viewport. `None` is the board.
    #[error("{element:?} at {rect:?} is outside the viewport")]
    OutOfBounds {
        /// The element.
        element: Option<ElementId>,
        /// Its rectangle.
        rect: Rect,
    },
    /// A scroll-contained position leaves its region.
    #[error("{0:?} is outside its scroll region")]
    OutsideRegion(ElementId),
    /// `requires_scrolling` disagrees with the scroll regions.
    #[error("scroll flag disagrees with the scroll regions")]
    ScrollMismatch,
}

/// Output of one planning cycle. Immutable; a new plan replaces the old one wholesale.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPlan {
    /// The viewport this plan was computed for.
    pub viewport: Viewport,
    /// The board element, if any.
    pub focal_element: Option<ElementId>,
    /// Natural aspect ratio of the board.
    pub board_aspect: f64,
    /// Side of the square focal region.
    pub focal_size: Size,
    /// The focal region.
    pub focal_position: Position,
    /// Chosen strategy.
    pub strategy: LayoutStrategy,
    /// Position of every secondary element, in layout order.
    pub element_positions: Vec<(ElementId, Position)>,
    /// Whether any secondary element is scroll-contained.
    pub requires_scrolling: bool,
    /// Scroll regions; their elements' positions are in unscrolled content coordinates.
    pub scroll_regions: Vec<ScrollRegionPlan>,
}

impl LayoutPlan {
    /// Position of `id`.
    pub fn position_of(&self, id: ElementId) -> Option<Position> {
        self.element_positions
            .iter()
            .find(|(e, _)| *e == id)
            .map(|(_, p)| *p)
    }

    /// Region containing `id`.
    pub fn region_of(&self, id: ElementId) -> Option<&ScrollRegionPlan> {
        self.scroll_regions.iter().find(|r| r.contains_element(id))
    }

    /// Rectangle of the board element: its natural aspect fitted and centered
    /// inside the focal region.
    pub fn board_position(&self) -> Position {
        let region = self.focal_position.rect();
        let aspect = if self.board_aspect.is_finite() && self.board_aspect > 0.0 {
            self.board_aspect
        } else {
            1.0
        };
        let (w, h) = if aspect >= 1.0 {
            (region.width(), region.width() / aspect)
        } else {
            (region.height() * aspect, region.height())
        };
        let rect = Rect::from_center_size(region.center(), (w, h));
        Position::from_rect(rect, self.focal_position.stack_order)
    }

    /// Positions that are not scroll-contained.
    pub fn free_positions(&self) -> impl Iterator<Item = (ElementId, Position)> + '_ {
        self.element_positions
            .iter()
            .filter(|(e, _)| self.region_of(*e).is_none())
            .copied()
    }

    /// Check the plan invariants against `viewport`.
    ///
    /// The focal region must be finite, square, and at least `config.min_board`;
    /// every position must be finite and non-negative; positions outside scroll
    /// regions (and the region frames) must lie inside the viewport; scroll-contained
    /// positions must lie inside their region's content area.
    pub fn validate(&self, viewport: &Viewport, config: &PlannerConfig) -> Result<(), PlanError> {
        if viewport.is_malformed() {
            return Err(PlanError::MalformedViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let bounds = viewport.rect().inflate(TOLERANCE, TOLERANCE);
        let inside = |r: Rect| {
            r.x0 >= bounds.x0 && r.y0 >= bounds.y0 && r.x1 <= bounds.x1 && r.y1 <= bounds.y1
        };

        let focal = self.focal_position;
        if !focal.is_finite() || !self.focal_size.width.is_finite() {
            return Err(PlanError::NonFinite(None));
        }
        if (focal.width - focal.height).abs() > TOLERANCE
            || (self.focal_size.width - self.focal_size.height).abs() > TOLERANCE
        {
            return Err(PlanError::NotSquare {
                width: focal.width,
                height: focal.height,
            });
        }
        if focal.width + TOLERANCE < config.min_board {
            return Err(PlanError::BoardTooSmall {
                size: focal.width,
                min: config.min_board,
            });
        }
        if !focal.is_non_negative() {
            return Err(PlanError::Negative(None));
        }
        if !inside(focal.rect()) {
            return Err(PlanError::OutOfBounds {
                element: None,
                rect: focal.rect(),
            });
        }

        for (id, p) in &self.element_positions {
            if !p.is_finite() {
                return Err(PlanError::NonFinite(Some(*id)));
            }
            if !p.is_non_negative() {
                return Err(PlanError::Negative(Some(*id)));
            }
            match self.region_of(*id) {
                Some(region) => {
                    if !region.contains_rect(p.rect(), TOLERANCE) {
                        return Err(PlanError::OutsideRegion(*id));
                    }
                }
                None => {
                    if !inside(p.rect()) {
                        return Err(PlanError::OutOfBounds {
                            element: Some(*id),
                            rect: p.rect(),
                        });
                    }
                }
            }
        }

        for region in &self.scroll_regions {
            if !inside(region.frame()) {
                return Err(PlanError::OutOfBounds {
                    element: region.elements().first().copied(),
                    rect: region.frame(),
                });
            }
        }
        if self.requires_scrolling == self.scroll_regions.is_empty() {
            return Err(PlanError::ScrollMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(viewport: Viewport, board: Rect) -> LayoutPlan {
        LayoutPlan {
            viewport,
            focal_element: None,
            board_aspect: 1.0,
            focal_size: board.size(),
            focal_position: Position::from_rect(board, 1),
            strategy: LayoutStrategy::Stacked,
            element_positions: Vec::new(),
            requires_scrolling: false,
            scroll_regions: Vec::new(),
        }
    }

    #[test]
    fn validate_catches_each_invariant() {
        let v = Viewport::new(800.0, 600.0);
        let cfg = PlannerConfig::default();
        assert_eq!(plan(v, Rect::new(20.0, 20.0, 580.0, 580.0)).validate(&v, &cfg), Ok(()));
        assert!(matches!(
            plan(v, Rect::new(20.0, 20.0, 580.0, 500.0)).validate(&v, &cfg),
            Err(PlanError::NotSquare { .. })
        ));
        assert!(matches!(
            plan(v, Rect::new(0.0, 0.0, 100.0, 100.0)).validate(&v, &cfg),
            Err(PlanError::BoardTooSmall { .. })
        ));
        assert!(matches!(
            plan(v, Rect::new(600.0, 0.0, 900.0, 300.0)).validate(&v, &cfg),
            Err(PlanError::OutOfBounds { element: None, .. })
        ));

        let mut p = plan(v, Rect::new(20.0, 20.0, 580.0, 580.0));
        let id = ElementId::from_raw(1, 1);
        p.element_positions.push((id, Position::from_rect(Rect::new(f64::NAN, 0.0, 1.0, 1.0), 2)));
        assert_eq!(p.validate(&v, &cfg), Err(PlanError::NonFinite(Some(id))));

        p.element_positions[0].1 = Position::from_rect(Rect::new(600.0, 20.0, 700.0, 80.0), 2);
        p.requires_scrolling = true;
        assert_eq!(p.validate(&v, &cfg), Err(PlanError::ScrollMismatch));
    }

    #[test]
    fn board_is_fitted_inside_focal_region() {
        let v = Viewport::new(800.0, 600.0);
        let mut p = plan(v, Rect::new(20.0, 20.0, 420.0, 420.0));
        assert_eq!(p.board_position().rect(), Rect::new(20.0, 20.0, 420.0, 420.0));
        p.board_aspect = 2.0;
        assert_eq!(p.board_position().rect(), Rect::new(20.0, 120.0, 420.0, 320.0));
        p.board_aspect = f64::NAN;
        assert_eq!(p.board_position().width, 400.0);
    }
}
