// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Size};

/// Aspect ratios above this are extreme (very wide).
pub const EXTREME_WIDE: f64 = 3.0;
/// Aspect ratios below this are extreme (very tall).
pub const EXTREME_TALL: f64 = 0.33;

/// Viewport orientation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Width at least height.
    Landscape,
    /// Height greater than width.
    Portrait,
}

/// Snapshot of the display area, derived once per analysis cycle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// `width / height`, or `1.0` when malformed.
    pub aspect_ratio: f64,
    /// Orientation.
    pub orientation: Orientation,
    /// Aspect ratio above [`EXTREME_WIDE`] or below [`EXTREME_TALL`].
    pub is_extreme_aspect_ratio: bool,
}

impl Viewport {
    /// Describe a `width` × `height` display area.
    ///
    /// Malformed dimensions (zero, negative, or non-finite) are kept as given
    /// so they can be reported; see [`Viewport::is_malformed`].
    pub fn new(width: f64, height: f64) -> Self {
        let malformed = !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0);
        let aspect_ratio = if malformed { 1.0 } else { width / height };
        Self {
            width,
            height,
            aspect_ratio,
            orientation: if malformed || width >= height {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
            is_extreme_aspect_ratio: aspect_ratio > EXTREME_WIDE || aspect_ratio < EXTREME_TALL,
        }
    }

    /// Describe a display area of `size`.
    pub fn from_size(size: Size) -> Self {
        Self::new(size.width, size.height)
    }

    /// Whether a dimension is zero, negative, or non-finite.
    pub fn is_malformed(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    /// Size, with malformed dimensions replaced by zero.
    pub fn size(&self) -> Size {
        let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Size::new(clean(self.width), clean(self.height))
    }

    /// `(0, 0)`-anchored rectangle of [`Viewport::size`].
    pub fn rect(&self) -> Rect {
        self.size().to_rect()
    }
}
