// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for managed elements: handles, flags, kinds, and style fragments.

/// Identifier for an element on a [`Surface`](crate::Surface) (generational).
///
/// A handle stays valid until the element is removed; a reused slot bumps the
/// generation so stale handles never alias a newer element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Build a handle from raw parts.
    ///
    /// Hosts that keep their own element table can mint handles this way and
    /// implement [`Surface`](crate::Surface) on top of it.
    pub const fn from_raw(index: u32, generation: u32) -> Self {
        Self(index, generation)
    }

    /// Raw `(index, generation)` parts.
    pub const fn into_raw(self) -> (u32, u32) {
        (self.0, self.1)
    }
}

bitflags::bitflags! {
    /// Element flags controlling display and focus.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element is displayed. Cleared means "hidden via style".
        const VISIBLE = 0b0000_0001;
        /// Element currently holds input focus.
        const FOCUSED = 0b0000_0010;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// What created an element, which decides what may structurally change it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Owned by the host document. Never removed or recreated by Easel.
    Host,
    /// Scroll-region wrapper created by the overflow planner.
    ScrollWrapper,
    /// Top or bottom scroll indicator created by the overflow planner.
    Indicator,
}

impl ElementKind {
    /// Whether Easel created this element and may therefore remove it.
    pub const fn is_structural(self) -> bool {
        !matches!(self, Self::Host)
    }
}

/// Scroll styling applied to a scroll-region wrapper.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollStyle {
    /// Height cap of the visible region.
    pub max_height: f64,
    /// Current vertical scroll offset into the content.
    pub offset: f64,
    /// Whether the host should use native smooth scrolling.
    pub smooth: bool,
}

/// Behaviour attached to a host element by the application.
///
/// Easel never writes these fields. They exist so hosts (and tests) can verify
/// that repositioning an element leaves its handlers, accessibility metadata,
/// and theme untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attachments {
    /// Number of event handlers (click, keyboard, ...) bound to the element.
    pub handlers: u32,
    /// Accessible label.
    pub accessible_label: Option<String>,
    /// Theme classes applied to the element.
    pub theme_classes: Vec<String>,
}
