// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertical stack of extents separated by uniform spacing.

/// Extents stacked along one axis with `spacing` between adjacent items.
///
/// Offsets are prefix sums over `extent + spacing`. There is no spacing before
/// the first item or after the last.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackModel {
    starts: Vec<f64>,
    total: f64,
    spacing: f64,
}

impl StackModel {
    /// Creates a stack from a sequence of extents.
    ///
    /// Non-finite and negative extents count as zero.
    pub fn from_extents(extents: impl IntoIterator<Item = f64>, spacing: f64) -> Self {
        let spacing = sanitize(spacing);
        let mut starts = Vec::new();
        let mut end: Option<f64> = None;
        for extent in extents {
            let start = end.map_or(0.0, |e| e + spacing);
            starts.push(start);
            end = Some(start + sanitize(extent));
        }
        Self {
            starts,
            total: end.unwrap_or(0.0),
            spacing,
        }
    }

    /// Gap between adjacent items.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Total extent, including the gaps between items.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// All start offsets in order.
    pub fn offsets(&self) -> &[f64] {
        &self.starts
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}
