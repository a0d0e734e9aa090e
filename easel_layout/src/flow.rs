// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line breaking of element extents, used by the mixed strategy.

use core::ops::Range;

/// One line (column or row) of flowed items.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Line {
    /// Indices of the items on this line.
    pub(crate) items: Range<usize>,
    /// Extent along the flow direction, including gaps.
    pub(crate) main: f64,
    /// Largest extent across the flow direction.
    pub(crate) cross: f64,
}

/// Break `(main, cross)` extents into lines no longer than `limit` along the main axis.
///
/// An item longer than `limit` gets a line of its own.
pub(crate) fn flow_lines(extents: &[(f64, f64)], limit: f64, spacing: f64) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut main = 0.0;
    let mut cross: f64 = 0.0;
    for (i, &(m, c)) in extents.iter().enumerate() {
        let next = if i == start { m } else { main + spacing + m };
        if i > start && next > limit {
            lines.push(Line {
                items: start..i,
                main,
                cross,
            });
            start = i;
            main = m;
            cross = c;
        } else {
            main = next;
            cross = cross.max(c);
        }
    }
    if start < extents.len() {
        lines.push(Line {
            items: start..extents.len(),
            main,
            cross,
        });
    }
    lines
}

/// Total cross extent of `lines` with `spacing` between them.
pub(crate) fn cross_total(lines: &[Line], spacing: f64) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }
    lines.iter().map(|l| l.cross).sum::<f64>() + spacing * (lines.len() - 1) as f64
}
