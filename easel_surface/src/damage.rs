// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage summary types returned from commit.

use kurbo::Rect;

use crate::types::ElementId;

/// A batched set of changes derived from [`crate::Surface::commit`].
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// Viewport-space rectangles that should be repainted.
    pub dirty_rects: Vec<Rect>,
    /// Elements whose on-screen geometry changed in this pass.
    pub moved: Vec<ElementId>,
}

impl Damage {
    /// Returns the union of all damage rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    /// Whether the pass changed nothing visible.
    pub fn is_empty(&self) -> bool {
        self.dirty_rects.is_empty()
    }
}
