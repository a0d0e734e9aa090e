// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host capability: geometry queries in, restricted style mutations out.

use kurbo::{Rect, Size};

use crate::damage::Damage;
use crate::time::Duration;
use crate::types::{ElementId, ElementKind, ScrollStyle};

/// Errors reported by a [`Surface`] when a mutation cannot be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The handle does not refer to a live element.
    #[error("element {0:?} is not alive")]
    StaleElement(ElementId),
    /// The element belongs to the host document and may not be removed.
    #[error("element {0:?} is owned by the host and cannot be removed")]
    HostOwned(ElementId),
    /// Reparenting would make an element its own ancestor.
    #[error("reparenting {0:?} would create a cycle")]
    Cycle(ElementId),
}

/// Visual surface hosting managed elements.
///
/// This is the only channel through which Easel observes or mutates the host.
/// Mutations are limited to position, size, stacking order, transition and
/// scroll styling, plus creating/removing the wrapper and indicator elements of
/// scroll regions. Host elements are never detached, cloned, or recreated, so
/// anything the host attached to them survives every layout pass.
///
/// Mutations are batched: implementations may defer them until [`Surface::commit`],
/// which represents one rendering pass. Geometry queries report what is on
/// screen as of the last commit.
pub trait Surface {
    /// Whether `id` refers to a live element.
    fn is_alive(&self, id: ElementId) -> bool;

    /// Current on-screen bounds of the element (after scroll offsets of any
    /// enclosing scroll regions), as of the last commit.
    fn bounds(&self, id: ElementId) -> Option<Rect>;

    /// Placement last written with [`Surface::set_placement`]. Unlike
    /// [`Surface::bounds`] this ignores the scroll offsets of enclosing regions
    /// and is current even before the next commit.
    fn placement(&self, id: ElementId) -> Option<Rect>;

    /// Clip applied to the element by enclosing scroll regions, if any.
    fn clip(&self, id: ElementId) -> Option<Rect> {
        let _ = id;
        None
    }

    /// Intrinsic content size of the element, independent of any placement
    /// written by Easel.
    fn natural_size(&self, id: ElementId) -> Option<Size>;

    /// Whether the element is hidden via style.
    fn is_hidden(&self, id: ElementId) -> bool;

    /// Current stacking order of the element.
    fn stack_order(&self, id: ElementId) -> Option<i32>;

    /// Size of the display area.
    fn viewport_size(&self) -> Size;

    /// The element's current parent, if any.
    fn parent_of(&self, id: ElementId) -> Option<ElementId>;

    /// Kind of a live element.
    fn kind(&self, id: ElementId) -> Option<ElementKind>;

    /// Write position, size, and stacking order.
    fn set_placement(
        &mut self,
        id: ElementId,
        rect: Rect,
        stack_order: i32,
    ) -> Result<(), SurfaceError>;

    /// Write (or clear) the visual transition used for subsequent placement changes.
    fn set_transition(
        &mut self,
        id: ElementId,
        transition: Option<Duration>,
    ) -> Result<(), SurfaceError>;

    /// Write (or clear) scroll styling.
    fn set_scroll_style(
        &mut self,
        id: ElementId,
        style: Option<ScrollStyle>,
    ) -> Result<(), SurfaceError>;

    /// Show or hide an element via style.
    fn set_hidden(&mut self, id: ElementId, hidden: bool) -> Result<(), SurfaceError>;

    /// Create a structural element (scroll wrapper or indicator).
    fn insert_element(&mut self, parent: Option<ElementId>, kind: ElementKind, rect: Rect)
    -> ElementId;

    /// Move an element under a new parent (or to the root when `None`).
    fn reparent(&mut self, id: ElementId, parent: Option<ElementId>) -> Result<(), SurfaceError>;

    /// Remove a structural element. Host elements are refused.
    fn remove_element(&mut self, id: ElementId) -> Result<(), SurfaceError>;

    /// Flush pending mutations in one rendering pass and report coarse damage.
    fn commit(&mut self) -> Damage;
}
