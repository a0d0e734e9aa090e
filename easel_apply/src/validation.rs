// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use easel_layout::Position;
use easel_surface::{ElementId, SurfaceError};
use kurbo::Rect;

/// Why a position was not written.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ApplyError {
    /// The element is not alive on the surface.
    #[error("element {0:?} is not alive")]
    Stale(ElementId),
    /// A coordinate is NaN or infinite.
    #[error("non-finite position for {0:?}")]
    NonFinite(ElementId),
    /// A coordinate is negative.
    #[error("negative position for {0:?}")]
    Negative(ElementId),
    /// The position cannot be clamped into its bounds.
    #[error("{element:?} at {rect:?} does not fit in {bounds:?}")]
    OutOfBounds {
        /// The element.
        element: ElementId,
        /// Requested rectangle.
        rect: Rect,
        /// Viewport or scroll region content area.
        bounds: Rect,
    },
    /// The surface refused the write.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Outcome of validating one position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Checked {
    /// Inside its bounds.
    Valid(Position),
    /// Moved inside its bounds.
    Clamped(Position),
}

impl Checked {
    pub(crate) fn position(self) -> Position {
        match self {
            Self::Valid(p) | Self::Clamped(p) => p,
        }
    }
}

/// Validate `position` against `bounds`.
///
/// Non-finite and negative positions are rejected. A position that leaves
/// `bounds` is clamped back inside when it fits, and rejected otherwise.
pub(crate) fn check(
    element: ElementId,
    position: Position,
    bounds: Rect,
    tolerance: f64,
) -> Result<Checked, ApplyError> {
    if !position.is_finite() {
        return Err(ApplyError::NonFinite(element));
    }
    if !position.is_non_negative() {
        return Err(ApplyError::Negative(element));
    }
    let rect = position.rect();
    let slack = bounds.inflate(tolerance, tolerance);
    if rect.x0 >= slack.x0 && rect.y0 >= slack.y0 && rect.x1 <= slack.x1 && rect.y1 <= slack.y1 {
        return Ok(Checked::Valid(position));
    }
    if rect.width() > bounds.width() + tolerance || rect.height() > bounds.height() + tolerance {
        return Err(ApplyError::OutOfBounds {
            element,
            rect,
            bounds,
        });
    }
    let clamp = |v: f64, lo: f64, extent: f64, hi: f64| v.min(hi - extent).max(lo);
    Ok(Checked::Clamped(Position {
        x: clamp(position.x, bounds.x0, position.width, bounds.x1),
        y: clamp(position.y, bounds.y0, position.height, bounds.y1),
        ..position
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: ElementId = ElementId::from_raw(0, 1);

    fn pos(x: f64, y: f64, w: f64, h: f64) -> Position {
        Position {
            x,
            y,
            width: w,
            height: h,
            stack_order: 2,
        }
    }

    #[test]
    fn inside_is_valid() {
        let b = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            check(ID, pos(10.0, 10.0, 20.0, 20.0), b, 0.5),
            Ok(Checked::Valid(pos(10.0, 10.0, 20.0, 20.0)))
        );
    }

    #[test]
    fn overhanging_is_clamped() {
        let b = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            check(ID, pos(90.0, 95.0, 20.0, 20.0), b, 0.5),
            Ok(Checked::Clamped(pos(80.0, 80.0, 20.0, 20.0)))
        );
    }

    #[test]
    fn invalid_is_rejected() {
        let b = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            check(ID, pos(f64::INFINITY, 0.0, 1.0, 1.0), b, 0.5),
            Err(ApplyError::NonFinite(ID))
        );
        assert_eq!(
            check(ID, pos(-1.0, 0.0, 1.0, 1.0), b, 0.5),
            Err(ApplyError::Negative(ID))
        );
        assert!(matches!(
            check(ID, pos(0.0, 0.0, 200.0, 1.0), b, 0.5),
            Err(ApplyError::OutOfBounds { .. })
        ));
    }
}
