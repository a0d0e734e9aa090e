// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure description of a scroll region, computed during planning.

use easel_surface::ElementId;
use kurbo::{Point, Rect, Size};

use crate::stack::StackModel;

/// Tolerance when comparing content height against the region cap.
const EPSILON: f64 = 1e-6;

/// A run of stacked elements that may not fit in the height available to it.
///
/// Element rectangles are in unscrolled content coordinates: the first element
/// starts at the top of [`ScrollRegionPlan::frame`] and each following element
/// starts `spacing` below the previous one. Elements are centered horizontally
/// within the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollRegionPlan {
    elements: Vec<ElementId>,
    rects: Vec<Rect>,
    origin: Point,
    width: f64,
    max_height: f64,
    content_height: f64,
    spacing: f64,
}

impl ScrollRegionPlan {
    /// Stack `elements` (with their sizes) below `origin` in a column `width` wide,
    /// capped at `max_height`.
    ///
    /// ```rust
    /// use easel_scroll::ScrollRegionPlan;
    /// use easel_surface::ElementId;
    /// use kurbo::{Point, Size};
    ///
    /// let items: Vec<_> = (0..5)
    ///     .map(|i| (ElementId::from_raw(i, 1), Size::new(200.0, 60.0)))
    ///     .collect();
    /// let plan = ScrollRegionPlan::stack(&items, Point::new(80.0, 380.0), 200.0, 200.0, 16.0);
    /// assert_eq!(plan.content_height(), 5.0 * 60.0 + 4.0 * 16.0);
    /// assert!(plan.needs_scrolling());
    /// ```
    pub fn stack(
        elements: &[(ElementId, Size)],
        origin: Point,
        width: f64,
        max_height: f64,
        spacing: f64,
    ) -> Self {
        let width = width.max(0.0);
        let model = StackModel::from_extents(elements.iter().map(|(_, s)| s.height), spacing);
        let content_height = model.total();
        let rects = elements
            .iter()
            .zip(model.offsets())
            .map(|((_, size), &dy)| {
                let w = size.width.max(0.0);
                let x = origin.x + ((width - w) / 2.0).max(0.0);
                Rect::from_origin_size((x, origin.y + dy), (w, size.height.max(0.0)))
            })
            .collect();
        Self {
            elements: elements.iter().map(|(id, _)| *id).collect(),
            rects,
            origin,
            width,
            max_height: max_height.max(0.0),
            content_height,
            spacing: model.spacing(),
        }
    }

    /// Contained elements, top to bottom.
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// Whether `id` is contained in this region.
    pub fn contains_element(&self, id: ElementId) -> bool {
        self.elements.contains(&id)
    }

    /// Unscrolled content rectangle of each element, in element order.
    pub fn element_rects(&self) -> impl Iterator<Item = (ElementId, Rect)> + '_ {
        self.elements.iter().copied().zip(self.rects.iter().copied())
    }

    /// Unscrolled content rectangle of `id`.
    pub fn rect_of(&self, id: ElementId) -> Option<Rect> {
        let i = self.elements.iter().position(|e| *e == id)?;
        self.rects.get(i).copied()
    }

    /// Visible frame: the region's column, at most `max_height` tall.
    pub fn frame(&self) -> Rect {
        Rect::from_origin_size(
            self.origin,
            (self.width, self.content_height.min(self.max_height)),
        )
    }

    /// Full content area: the region's column, `content_height` tall.
    pub fn content_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, (self.width, self.content_height))
    }

    /// Height cap of the visible frame.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// Height of the stacked content including gaps.
    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Gap between adjacent elements.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Largest valid scroll offset.
    pub fn max_offset(&self) -> f64 {
        (self.content_height - self.max_height).max(0.0)
    }

    /// Whether content exceeds the height cap.
    pub fn needs_scrolling(&self) -> bool {
        self.content_height > self.max_height + EPSILON
    }

    /// Whether this region holds exactly the same elements as `other`, in any order.
    pub fn same_elements(&self, other: &[ElementId]) -> bool {
        self.elements.len() == other.len() && other.iter().all(|e| self.elements.contains(e))
    }

    /// Whether `rect` lies inside this region's content area (with `tolerance`).
    pub fn contains_rect(&self, rect: Rect, tolerance: f64) -> bool {
        let area = self.content_rect().inflate(tolerance, tolerance);
        rect.x0 >= area.x0 && rect.y0 >= area.y0 && rect.x1 <= area.x1 && rect.y1 <= area.y1
    }
}
