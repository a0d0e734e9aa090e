// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory surface: element slots, batched style writes, commit and damage.

use kurbo::{Rect, Size, Vec2};
use smallvec::SmallVec;

use crate::damage::Damage;
use crate::surface::{Surface, SurfaceError};
use crate::time::Duration;
use crate::types::{Attachments, ElementFlags, ElementId, ElementKind, ScrollStyle};

/// In-memory [`Surface`] for tests and non-browser hosts.
///
/// Elements live in generational slots. Style writes (placement, transition,
/// scroll, visibility) are recorded immediately but only reach the on-screen
/// geometry reported by [`Surface::bounds`] after [`Surface::commit`], which
/// recomputes scroll offsets and clips for every element and yields coarse
/// damage.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Rect, Size};
/// use easel_surface::{Attachments, BoxSurface, Surface};
///
/// let mut surface = BoxSurface::new(Size::new(800.0, 600.0));
/// let button = surface.insert_host(Rect::new(0.0, 0.0, 120.0, 40.0), Attachments::default());
///
/// surface.set_placement(button, Rect::new(10.0, 10.0, 130.0, 50.0), 1).unwrap();
/// // Writes only become visible after a rendering pass.
/// assert_eq!(surface.bounds(button), Some(Rect::new(0.0, 0.0, 120.0, 40.0)));
/// surface.commit();
/// assert_eq!(surface.bounds(button), Some(Rect::new(10.0, 10.0, 130.0, 50.0)));
/// ```
pub struct BoxSurface {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    viewport: Size,
    epoch: u64,
    mutations: MutationCounts,
}

impl core::fmt::Debug for BoxSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("BoxSurface")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("viewport", &self.viewport)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

/// Counters of every mutation applied through the [`Surface`] interface.
///
/// Hosts use these to audit that a layout pass touched nothing beyond the
/// permitted property set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationCounts {
    /// `set_placement` calls.
    pub placements: u64,
    /// `set_transition` calls.
    pub transitions: u64,
    /// `set_scroll_style` calls.
    pub scroll_styles: u64,
    /// `set_hidden` calls.
    pub visibility: u64,
    /// Structural elements created.
    pub inserted: u64,
    /// Reparent operations.
    pub reparented: u64,
    /// Structural elements removed.
    pub removed: u64,
    /// Rendering passes.
    pub commits: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct OnScreen {
    bounds: Rect,
    clip: Option<Rect>,
    hidden: bool,
    stack_order: i32,
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    kind: ElementKind,
    parent: Option<ElementId>,
    children: SmallVec<[ElementId; 4]>,
    natural: Size,
    placement: Rect,
    stack_order: i32,
    flags: ElementFlags,
    transition: Option<Duration>,
    scroll: Option<ScrollStyle>,
    attachments: Attachments,
    on_screen: OnScreen,
    dirty: bool,
}

impl Node {
    fn new(generation: u32, kind: ElementKind, rect: Rect, attachments: Attachments) -> Self {
        Self {
            generation,
            kind,
            parent: None,
            children: SmallVec::new(),
            natural: rect.size(),
            placement: rect,
            stack_order: 0,
            flags: ElementFlags::default(),
            transition: None,
            scroll: None,
            attachments,
            on_screen: OnScreen {
                bounds: rect,
                ..OnScreen::default()
            },
            dirty: true,
        }
    }
}

impl BoxSurface {
    /// Create an empty surface with the given viewport size.
    pub fn new(viewport: Size) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            viewport,
            epoch: 0,
            mutations: MutationCounts::default(),
        }
    }

    /// Resize the viewport, as a window resize or rotation would.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport = size;
    }

    /// Insert a host-owned element whose natural size is the size of `rect`.
    pub fn insert_host(&mut self, rect: Rect, attachments: Attachments) -> ElementId {
        self.insert_node(None, ElementKind::Host, rect, attachments)
    }

    /// Change the intrinsic size of a host element (for example after its content changed).
    pub fn set_natural_size(&mut self, id: ElementId, size: Size) {
        if let Some(n) = self.node_opt_mut(id) {
            n.natural = size;
        }
    }

    /// Behaviour attached to the element by the host.
    pub fn attachments(&self, id: ElementId) -> Option<&Attachments> {
        self.node_opt(id).map(|n| &n.attachments)
    }

    /// Mutable access to host-attached behaviour.
    pub fn attachments_mut(&mut self, id: ElementId) -> Option<&mut Attachments> {
        self.node_opt_mut(id).map(|n| &mut n.attachments)
    }

    /// Transition as last written.
    pub fn transition(&self, id: ElementId) -> Option<Duration> {
        self.node_opt(id).and_then(|n| n.transition)
    }

    /// Scroll style as last written.
    pub fn scroll_style(&self, id: ElementId) -> Option<ScrollStyle> {
        self.node_opt(id).and_then(|n| n.scroll)
    }

    /// Flags of a live element.
    pub fn flags(&self, id: ElementId) -> Option<ElementFlags> {
        self.node_opt(id).map(|n| n.flags)
    }

    /// Give or take input focus. This is host state and is never touched by layout.
    pub fn set_focused(&mut self, id: ElementId, focused: bool) {
        if let Some(n) = self.node_opt_mut(id) {
            n.flags.set(ElementFlags::FOCUSED, focused);
        }
    }

    /// Hide or show a host element via style, as the application would.
    pub fn set_style_hidden(&mut self, id: ElementId, hidden: bool) {
        if let Some(n) = self.node_opt_mut(id) {
            n.flags.set(ElementFlags::VISIBLE, !hidden);
            n.dirty = true;
        }
    }

    /// Children of a live element, or an empty slice if stale.
    pub fn children_of(&self, id: ElementId) -> &[ElementId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Number of live elements of the given kind.
    pub fn count_of_kind(&self, kind: ElementKind) -> usize {
        self.nodes
            .iter()
            .flatten()
            .filter(|n| n.kind == kind)
            .count()
    }

    /// Mutation counters since creation.
    pub fn mutations(&self) -> MutationCounts {
        self.mutations
    }

    // --- internals ---

    fn insert_node(
        &mut self,
        parent: Option<ElementId>,
        kind: ElementKind,
        rect: Rect,
        attachments: Attachments,
    ) -> ElementId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, kind, rect, attachments));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes
                .push(Some(Node::new(generation, kind, rect, attachments)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = ElementId::new(idx, generation);
        if let Some(p) = parent
            && self.is_alive(p)
        {
            self.link_parent(id, p);
        }
        id
    }

    fn node_opt(&self, id: ElementId) -> Option<&Node> {
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .filter(|n| n.generation == id.1)
    }

    fn node_opt_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())
            .and_then(|slot| slot.as_mut())
            .filter(|n| n.generation == id.1)
    }

    fn live_mut(&mut self, id: ElementId) -> Result<&mut Node, SurfaceError> {
        self.node_opt_mut(id).ok_or(SurfaceError::StaleElement(id))
    }

    fn link_parent(&mut self, id: ElementId, parent: ElementId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = Some(parent);
            n.dirty = true;
        }
    }

    fn unlink_parent(&mut self, id: ElementId, parent: ElementId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = None;
            n.dirty = true;
        }
    }

    fn is_ancestor(&self, ancestor: ElementId, mut of: ElementId) -> bool {
        while let Some(p) = self.parent_of(of) {
            if p == ancestor {
                return true;
            }
            of = p;
        }
        false
    }

    fn update_on_screen_recursive(
        &mut self,
        id: ElementId,
        scroll_offset: f64,
        clip: Option<Rect>,
        parent_hidden: bool,
        damage: &mut Damage,
    ) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        let bounds = node.placement + Vec2::new(0.0, -scroll_offset);
        let hidden = parent_hidden || !node.flags.contains(ElementFlags::VISIBLE);
        let next = OnScreen {
            bounds,
            clip,
            hidden,
            stack_order: node.stack_order,
        };
        let prev = node.on_screen;
        let (child_offset, child_clip) = match (node.kind, node.scroll) {
            (ElementKind::ScrollWrapper, Some(style)) => {
                let frame = Rect::from_origin_size(
                    bounds.origin(),
                    Size::new(bounds.width(), style.max_height.min(bounds.height())),
                );
                let frame = clip.map_or(frame, |c| c.intersect(frame));
                (scroll_offset + style.offset, Some(frame))
            }
            _ => (scroll_offset, clip),
        };
        let children = node.children.clone();
        if let Some(n) = self.node_opt_mut(id) {
            if n.dirty || prev != next {
                if prev.bounds != next.bounds {
                    damage.moved.push(id);
                }
                if prev != next {
                    damage.dirty_rects.push(prev.bounds);
                    damage.dirty_rects.push(next.bounds);
                }
            }
            n.on_screen = next;
            n.dirty = false;
        }
        for c in children {
            self.update_on_screen_recursive(c, child_offset, child_clip, hidden, damage);
        }
    }
}

impl Surface for BoxSurface {
    fn is_alive(&self, id: ElementId) -> bool {
        self.node_opt(id).is_some()
    }

    fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.on_screen.bounds)
    }

    fn placement(&self, id: ElementId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.placement)
    }

    fn clip(&self, id: ElementId) -> Option<Rect> {
        self.node_opt(id).and_then(|n| n.on_screen.clip)
    }

    fn natural_size(&self, id: ElementId) -> Option<Size> {
        self.node_opt(id).map(|n| n.natural)
    }

    fn is_hidden(&self, id: ElementId) -> bool {
        self.node_opt(id).is_some_and(|n| n.on_screen.hidden)
    }

    fn stack_order(&self, id: ElementId) -> Option<i32> {
        self.node_opt(id).map(|n| n.stack_order)
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.node_opt(id).map(|n| n.kind)
    }

    fn set_placement(
        &mut self,
        id: ElementId,
        rect: Rect,
        stack_order: i32,
    ) -> Result<(), SurfaceError> {
        let n = self.live_mut(id)?;
        if n.placement != rect || n.stack_order != stack_order {
            n.placement = rect;
            n.stack_order = stack_order;
            n.dirty = true;
        }
        self.mutations.placements += 1;
        Ok(())
    }

    fn set_transition(
        &mut self,
        id: ElementId,
        transition: Option<Duration>,
    ) -> Result<(), SurfaceError> {
        self.live_mut(id)?.transition = transition;
        self.mutations.transitions += 1;
        Ok(())
    }

    fn set_scroll_style(
        &mut self,
        id: ElementId,
        style: Option<ScrollStyle>,
    ) -> Result<(), SurfaceError> {
        let n = self.live_mut(id)?;
        if n.scroll != style {
            n.scroll = style;
            n.dirty = true;
        }
        self.mutations.scroll_styles += 1;
        Ok(())
    }

    fn set_hidden(&mut self, id: ElementId, hidden: bool) -> Result<(), SurfaceError> {
        let n = self.live_mut(id)?;
        n.flags.set(ElementFlags::VISIBLE, !hidden);
        n.dirty = true;
        self.mutations.visibility += 1;
        Ok(())
    }

    fn insert_element(
        &mut self,
        parent: Option<ElementId>,
        kind: ElementKind,
        rect: Rect,
    ) -> ElementId {
        self.mutations.inserted += 1;
        self.insert_node(parent, kind, rect, Attachments::default())
    }

    fn reparent(&mut self, id: ElementId, parent: Option<ElementId>) -> Result<(), SurfaceError> {
        if !self.is_alive(id) {
            return Err(SurfaceError::StaleElement(id));
        }
        if let Some(p) = parent {
            if !self.is_alive(p) {
                return Err(SurfaceError::StaleElement(p));
            }
            if p == id || self.is_ancestor(id, p) {
                return Err(SurfaceError::Cycle(id));
            }
        }
        if self.parent_of(id) == parent {
            return Ok(());
        }
        if let Some(old) = self.parent_of(id) {
            self.unlink_parent(id, old);
        }
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        self.mutations.reparented += 1;
        Ok(())
    }

    fn remove_element(&mut self, id: ElementId) -> Result<(), SurfaceError> {
        let Some(node) = self.node_opt(id) else {
            return Err(SurfaceError::StaleElement(id));
        };
        if !node.kind.is_structural() {
            return Err(SurfaceError::HostOwned(id));
        }
        let parent = node.parent;
        let children = node.children.clone();
        // Host elements inside a wrapper go back to the wrapper's parent.
        for child in children {
            match self.kind(child) {
                Some(ElementKind::Host) => self.reparent(child, parent)?,
                Some(_) => self.remove_element(child)?,
                None => {}
            }
        }
        if let Some(p) = parent {
            self.unlink_parent(id, p);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
        self.mutations.removed += 1;
        Ok(())
    }

    fn commit(&mut self) -> Damage {
        let mut damage = Damage::default();
        let roots: Vec<ElementId> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "ElementId uses 32-bit indices by design."
                    )]
                    Some(ElementId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect();
        for root in roots {
            self.update_on_screen_recursive(root, 0.0, None, false, &mut damage);
        }
        self.epoch += 1;
        self.mutations.commits += 1;
        tracing::trace!(
            epoch = self.epoch,
            moved = damage.moved.len(),
            "surface commit"
        );
        damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> BoxSurface {
        BoxSurface::new(Size::new(800.0, 600.0))
    }

    #[test]
    fn writes_become_visible_on_commit() {
        let mut s = surface();
        let a = s.insert_host(Rect::new(0.0, 0.0, 50.0, 20.0), Attachments::default());
        s.commit();
        s.set_placement(a, Rect::new(100.0, 100.0, 150.0, 120.0), 3)
            .unwrap();
        assert_eq!(s.bounds(a), Some(Rect::new(0.0, 0.0, 50.0, 20.0)));
        let damage = s.commit();
        assert_eq!(s.bounds(a), Some(Rect::new(100.0, 100.0, 150.0, 120.0)));
        assert_eq!(damage.moved, vec![a]);
        assert_eq!(
            damage.union_rect(),
            Some(Rect::new(0.0, 0.0, 150.0, 120.0)),
            "damage covers old and new bounds"
        );
        // Natural size is independent of placement.
        assert_eq!(s.natural_size(a), Some(Size::new(50.0, 20.0)));
    }

    #[test]
    fn unchanged_commit_reports_no_damage() {
        let mut s = surface();
        let _a = s.insert_host(Rect::new(0.0, 0.0, 50.0, 20.0), Attachments::default());
        let _ = s.commit();
        assert!(s.commit().is_empty());
    }

    #[test]
    fn host_elements_cannot_be_removed() {
        let mut s = surface();
        let a = s.insert_host(Rect::new(0.0, 0.0, 50.0, 20.0), Attachments::default());
        assert_eq!(s.remove_element(a), Err(SurfaceError::HostOwned(a)));
        assert!(s.is_alive(a));
    }

    #[test]
    fn removing_wrapper_returns_host_children_to_its_parent() {
        let mut s = surface();
        let a = s.insert_host(Rect::new(0.0, 0.0, 50.0, 20.0), Attachments::default());
        let wrapper = s.insert_element(
            None,
            ElementKind::ScrollWrapper,
            Rect::new(0.0, 0.0, 50.0, 100.0),
        );
        let indicator =
            s.insert_element(Some(wrapper), ElementKind::Indicator, Rect::ZERO);
        s.reparent(a, Some(wrapper)).unwrap();
        assert_eq!(s.parent_of(a), Some(wrapper));

        s.remove_element(wrapper).unwrap();
        assert!(s.is_alive(a));
        assert_eq!(s.parent_of(a), None);
        assert!(!s.is_alive(indicator), "structural children are removed");
        assert!(!s.is_alive(wrapper));
    }

    #[test]
    fn stale_ids_are_rejected_after_slot_reuse() {
        let mut s = surface();
        let w = s.insert_element(None, ElementKind::ScrollWrapper, Rect::ZERO);
        s.remove_element(w).unwrap();
        let w2 = s.insert_element(None, ElementKind::ScrollWrapper, Rect::ZERO);
        assert_eq!(w.idx(), w2.idx(), "slot is reused");
        assert!(!s.is_alive(w));
        assert_eq!(
            s.set_placement(w, Rect::ZERO, 0),
            Err(SurfaceError::StaleElement(w))
        );
    }

    #[test]
    fn scroll_wrapper_offsets_and_clips_children() {
        let mut s = surface();
        let wrapper = s.insert_element(
            None,
            ElementKind::ScrollWrapper,
            Rect::new(0.0, 100.0, 200.0, 400.0),
        );
        let a = s.insert_host(Rect::new(0.0, 350.0, 200.0, 410.0), Attachments::default());
        s.reparent(a, Some(wrapper)).unwrap();
        s.set_scroll_style(
            wrapper,
            Some(ScrollStyle {
                max_height: 200.0,
                offset: 50.0,
                smooth: true,
            }),
        )
        .unwrap();
        s.commit();
        assert_eq!(s.bounds(a), Some(Rect::new(0.0, 300.0, 200.0, 360.0)));
        assert_eq!(s.clip(a), Some(Rect::new(0.0, 100.0, 200.0, 300.0)));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut s = surface();
        let outer = s.insert_element(None, ElementKind::ScrollWrapper, Rect::ZERO);
        let inner = s.insert_element(Some(outer), ElementKind::ScrollWrapper, Rect::ZERO);
        assert_eq!(s.reparent(outer, Some(inner)), Err(SurfaceError::Cycle(outer)));
    }

    #[test]
    fn hidden_is_inherited() {
        let mut s = surface();
        let wrapper = s.insert_element(None, ElementKind::ScrollWrapper, Rect::ZERO);
        let a = s.insert_host(Rect::new(0.0, 0.0, 10.0, 10.0), Attachments::default());
        s.reparent(a, Some(wrapper)).unwrap();
        s.set_hidden(wrapper, true).unwrap();
        s.commit();
        assert!(s.is_hidden(a));
    }
}
