// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easel Surface: element handles, the host surface capability, and a geometry cache.
//!
//! Easel is a responsive-layout engine for one fixed-aspect "board" and a set of
//! secondary controls. This crate is the boundary between Easel and the host that
//! actually draws things.
//!
//! - [`ElementId`]: generational handle of a managed element.
//! - [`Surface`]: the capability Easel consumes. Geometry queries in, a small set of
//!   style mutations out (placement, stacking order, transition, scroll styling, and the
//!   wrapper/indicator elements of scroll regions). Host elements are never detached or
//!   recreated, so handlers, accessibility metadata, theme, and focus survive layout.
//! - [`BoxSurface`]: an in-memory [`Surface`] with batched writes and a
//!   [`Surface::commit`] step that yields coarse [`Damage`].
//! - [`GeometryCache`]: memoizes whole-element geometry queries with explicit invalidation
//!   and hit/miss statistics.
//! - [`HostTime`] / [`Duration`]: host-supplied monotonic milliseconds. Nothing in Easel
//!   reads a clock on its own.
//!
//! ## Not a renderer
//!
//! This crate does not paint. A browser host implements [`Surface`] over the DOM; a native
//! host implements it over its scene graph; tests use [`BoxSurface`].

mod box_surface;
mod cache;
mod damage;
mod surface;
mod time;
mod types;

pub use box_surface::{BoxSurface, MutationCounts};
pub use cache::{CacheEntry, CacheStats, Geometry, GeometryCache};
pub use damage::Damage;
pub use surface::{Surface, SurfaceError};
pub use time::{Duration, HostTime};
pub use types::{Attachments, ElementFlags, ElementId, ElementKind, ScrollStyle};
