// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized per-element geometry queries.

use hashbrown::HashMap;
use kurbo::{Rect, Size};

use crate::surface::Surface;
use crate::time::{Duration, HostTime};
use crate::types::ElementId;

/// Whole-element geometry as returned by one surface query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    /// On-screen bounds.
    pub bounds: Rect,
    /// Clip from enclosing scroll regions.
    pub clip: Option<Rect>,
    /// Intrinsic content size.
    pub natural: Size,
    /// Hidden via style.
    pub hidden: bool,
}

/// A cached geometry record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheEntry {
    /// The element the geometry belongs to.
    pub element: ElementId,
    /// The geometry as of `timestamp`.
    pub geometry: Geometry,
    /// When the geometry was queried.
    pub timestamp: HostTime,
}

/// Hit/miss statistics for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to query the surface.
    pub misses: u64,
    /// Individual entries dropped via [`GeometryCache::invalidate`].
    pub invalidations: u64,
    /// Wholesale clears.
    pub clears: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache, or `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Memoizes geometry queries so one analysis cycle asks the surface at most
/// once per element.
///
/// Entries are never partially stale: each holds the result of a single
/// whole-element query. The cache is invalidated explicitly, per element after
/// the element was moved, or wholesale on orientation change.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: HashMap<ElementId, CacheEntry>,
    stats: CacheStats,
}

impl GeometryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the geometry of `id`, querying `surface` on a miss.
    ///
    /// Returns `None` for elements that are not alive on the surface; such
    /// lookups are not cached.
    pub fn get<S: Surface + ?Sized>(
        &mut self,
        surface: &S,
        id: ElementId,
        now: HostTime,
    ) -> Option<Geometry> {
        if let Some(entry) = self.entries.get(&id) {
            self.stats.hits += 1;
            return Some(entry.geometry);
        }
        self.stats.misses += 1;
        let geometry = Geometry {
            bounds: surface.bounds(id)?,
            clip: surface.clip(id),
            natural: surface.natural_size(id)?,
            hidden: surface.is_hidden(id),
        };
        self.entries.insert(
            id,
            CacheEntry {
                element: id,
                geometry,
                timestamp: now,
            },
        );
        Some(geometry)
    }

    /// The cached entry for `id`, without querying or touching statistics.
    pub fn peek(&self, id: ElementId) -> Option<&CacheEntry> {
        self.entries.get(&id)
    }

    /// Drop the entry for `id`. Returns whether an entry existed.
    pub fn invalidate(&mut self, id: ElementId) -> bool {
        let removed = self.entries.remove(&id).is_some();
        if removed {
            self.stats.invalidations += 1;
        }
        removed
    }

    /// Drop the entries of every element in `ids`.
    pub fn invalidate_all<I: IntoIterator<Item = ElementId>>(&mut self, ids: I) {
        for id in ids {
            self.invalidate(id);
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.clears += 1;
    }

    /// Drop entries queried more than `max_age` before `now`. Returns how many were dropped.
    pub fn evict_older_than(&mut self, now: HostTime, max_age: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.timestamp) <= max_age);
        before - self.entries.len()
    }

    /// Hit/miss statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
