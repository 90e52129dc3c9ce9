// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: arena, child lists, counters, notifications.

use alloc::{boxed::Box, vec, vec::Vec};
use core::any::Any;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::TreeError;
use crate::layout::LayoutStrategy;
use crate::notify::{HierarchyFlags, Notification};
use crate::types::{Bounds, Component, CounterDelta, Counters, EventMask, NodeFlags, NodeId};

/// Arena of components and containers.
///
/// Components are created detached with [`Tree::insert_leaf`] or
/// [`Tree::insert_container`] and attached with [`Tree::add`]. Every container
/// keeps [`Counters`] over its subtree; they are adjusted along the ancestor
/// chain on each mutation, so no operation rescans a moved subtree.
///
/// Mutations that other parts of a toolkit care about queue a [`Notification`].
/// Notifications are only queued once the tree is consistent again, and are
/// collected with [`Tree::drain_notifications`].
///
/// ## Example
///
/// ```rust
/// use trellis_tree::{Bounds, Component, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert_container(Component::with_bounds(Bounds::new(0, 0, 100, 100)), None);
/// let panel = tree.insert_container(Component::with_bounds(Bounds::new(10, 10, 50, 50)), None);
/// let button = tree.insert_leaf(Component::with_bounds(Bounds::new(0, 0, 20, 10)));
///
/// tree.add(panel, button, None).unwrap();
/// tree.add(root, panel, None).unwrap();
///
/// assert_eq!(tree.counters(root).unwrap().descendants, 2);
/// assert_eq!(tree.parent_of(button), Some(panel));
/// ```
pub struct Tree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    notifications: Vec<Notification>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("pending_notifications", &self.notifications.len())
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) local: Component,
    pub(crate) kind: NodeKind,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Leaf,
    Container(ContainerData),
}

pub(crate) struct ContainerData {
    /// Index 0 is topmost.
    pub(crate) children: Vec<NodeId>,
    layout: Option<Box<dyn LayoutStrategy>>,
    pub(crate) counters: Counters,
    valid: bool,
}

impl core::fmt::Debug for ContainerData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContainerData")
            .field("children", &self.children)
            .field("has_layout", &self.layout.is_some())
            .field("counters", &self.counters)
            .field("valid", &self.valid)
            .finish()
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            notifications: Vec::new(),
        }
    }

    /// Create a detached leaf component.
    pub fn insert_leaf(&mut self, local: Component) -> NodeId {
        self.alloc(local, NodeKind::Leaf)
    }

    /// Create a detached container with an optional layout strategy.
    ///
    /// New containers start out invalid; the first [`Tree::validate`] lays them out.
    pub fn insert_container(
        &mut self,
        local: Component,
        layout: Option<Box<dyn LayoutStrategy>>,
    ) -> NodeId {
        self.alloc(
            local,
            NodeKind::Container(ContainerData {
                children: Vec::new(),
                layout,
                counters: Counters::default(),
                valid: false,
            }),
        )
    }

    fn alloc(&mut self, local: Component, kind: NodeKind) -> NodeId {
        let node = |generation| Node {
            generation,
            parent: None,
            local,
            kind,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(node(generation));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(node(generation)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Append or insert `child` into `container`.
    ///
    /// `index` of `None` appends; `Some(i)` inserts before the current child at
    /// `i` (`i == len` appends). If `child` already has a parent it is removed
    /// from it first, and `index` is checked against the child count that
    /// results from that removal.
    ///
    /// Fails without touching the tree if `child` is `container` or one of its
    /// ancestors, if `child` is a top-level component, or if `index` is out of
    /// range.
    pub fn add(
        &mut self,
        container: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        self.add_with_constraints(container, child, index, None)
    }

    /// Like [`Tree::add`], forwarding `constraints` to the container's layout strategy.
    pub fn add_with_constraints(
        &mut self,
        container: NodeId,
        child: NodeId,
        index: Option<usize>,
        constraints: Option<&dyn Any>,
    ) -> Result<(), TreeError> {
        self.check_insertion(container, child, index)
            .inspect_err(|e| debug!(?container, ?child, %e, "add rejected"))?;

        if let Some(old_parent) = self.node(child).parent {
            let old_index = self.position_in(old_parent, child);
            self.detach_at(old_parent, old_index);
        }
        self.attach(container, child, index, constraints);
        Ok(())
    }

    /// Remove the child at `index` from `container` and return it.
    pub fn remove(&mut self, container: NodeId, index: usize) -> Result<NodeId, TreeError> {
        let len = self.container_data(container)?.children.len();
        if index >= len {
            debug!(?container, index, len, "remove rejected: index out of range");
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        Ok(self.detach_at(container, index))
    }

    /// Remove `child` from `container` and return the index it occupied.
    pub fn remove_child(&mut self, container: NodeId, child: NodeId) -> Result<usize, TreeError> {
        self.container_data(container)?;
        self.check_live(child)?;
        if self.node(child).parent != Some(container) {
            return Err(TreeError::NotAChild { container, child });
        }
        let index = self.position_in(container, child);
        self.detach_at(container, index);
        Ok(index)
    }

    /// Remove every child of `container`, returning them in their former order.
    ///
    /// Ancestor counters are decremented by the container's totals in a single
    /// step before any child is detached.
    pub fn remove_all(&mut self, container: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let data = self.container_data(container)?;
        if data.children.is_empty() {
            return Ok(Vec::new());
        }
        let totals = data.counters;
        self.adjust_counters(container, CounterDelta::from(totals).negate());

        let children = core::mem::take(&mut self.container_data_mut(container).children);
        for &child in children.iter().rev() {
            if let Some(layout) = self.container_data_mut(container).layout.as_mut() {
                layout.remove_child(child);
            }
            self.node_mut(child).parent = None;
        }
        self.invalidate(container);

        let structural = self.wants_container_events(container);
        for &child in children.iter().rev() {
            if structural {
                self.notifications
                    .push(Notification::ChildRemoved { container, child });
            }
            self.queue_hierarchy(child, Some(container), HierarchyFlags::PARENT_CHANGED);
        }
        trace!(?container, removed = children.len(), "removed all children");
        Ok(children)
    }

    /// Move `child` to `index` in `container`'s z-order.
    ///
    /// If `child` is already in `container`, it is repositioned in place
    /// (`index` must be below the child count), counters are untouched, and a
    /// [`Notification::ZOrderChanged`] is queued if the container or an
    /// ancestor subscribes to container events. Moving to the current index
    /// does nothing. Otherwise the child is moved over from its old parent with
    /// the same checks as [`Tree::add`], except that `index` is required.
    pub fn move_to_index(
        &mut self,
        container: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        self.check_live(child)?;
        let len = self.container_data(container)?.children.len();

        if self.node(child).parent == Some(container) {
            if index >= len {
                return Err(TreeError::IndexOutOfRange { index, len });
            }
            let old_index = self.position_in(container, child);
            if old_index == index {
                return Ok(());
            }
            let children = &mut self.container_data_mut(container).children;
            children.remove(old_index);
            children.insert(index, child);
            self.invalidate(container);
            if self.wants_container_events(container) {
                self.notifications.push(Notification::ZOrderChanged {
                    container,
                    child,
                    old_index,
                    new_index: index,
                });
            }
            trace!(?container, ?child, old_index, index, "z-order changed");
            return Ok(());
        }

        self.check_insertion(container, child, Some(index))
            .inspect_err(|e| debug!(?container, ?child, %e, "move rejected"))?;
        if let Some(old_parent) = self.node(child).parent {
            let old_index = self.position_in(old_parent, child);
            self.detach_at(old_parent, old_index);
        }
        self.attach(container, child, Some(index), None);
        Ok(())
    }

    /// Detach a component (if attached) and free it together with its subtree.
    ///
    /// Every freed [`NodeId`] becomes stale.
    pub fn dispose(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            let index = self.position_in(parent, id);
            self.detach_at(parent, index);
        }
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.nodes[n.idx()].take() {
                if let NodeKind::Container(data) = node.kind {
                    stack.extend(data.children);
                }
                self.free_list.push(n.idx());
            }
        }
    }

    /// Update a component's bounds.
    ///
    /// Resizing a container invalidates it. When a container moves or is
    /// resized, descendants subscribed to [`EventMask::HIERARCHY_BOUNDS`]
    /// receive [`Notification::AncestorMoved`] / [`Notification::AncestorResized`].
    pub fn set_bounds(&mut self, id: NodeId, bounds: Bounds) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        let old = node.local.bounds;
        if old == bounds {
            return;
        }
        node.local.bounds = bounds;
        let is_container = matches!(node.kind, NodeKind::Container(_));
        let moved = bounds.moved_from(&old);
        let resized = bounds.resized_from(&old);

        if is_container && resized {
            self.invalidate(id);
        }
        if is_container {
            self.queue_ancestor_bounds(id, moved, resized);
        }
    }

    /// Update a component's flags.
    ///
    /// Toggling [`NodeFlags::VISIBLE`] queues a
    /// [`HierarchyFlags::SHOWING_CHANGED`] notification for hierarchy
    /// subscribers in the component's subtree. [`NodeFlags::TOP_LEVEL`] is only
    /// consulted when the component is added somewhere.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        let old = node.local.flags;
        if old == flags {
            return;
        }
        node.local.flags = flags;
        let parent = node.parent;
        if old.contains(NodeFlags::VISIBLE) != flags.contains(NodeFlags::VISIBLE) {
            self.queue_hierarchy(id, parent, HierarchyFlags::SHOWING_CHANGED);
        }
    }

    /// Update the set of event categories a component has subscribers for.
    ///
    /// Flipping [`EventMask::HIERARCHY`] or [`EventMask::HIERARCHY_BOUNDS`]
    /// adjusts the counters of every ancestor by one.
    pub fn set_event_mask(&mut self, id: NodeId, events: EventMask) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        let old = node.local.events;
        if old == events {
            return;
        }
        node.local.events = events;
        let parent = node.parent;

        let flip = |category: EventMask| {
            i32::from(events.contains(category)) - i32::from(old.contains(category))
        };
        let delta = CounterDelta {
            listening: flip(EventMask::HIERARCHY),
            listening_bounds: flip(EventMask::HIERARCHY_BOUNDS),
            descendants: 0,
        };
        if let Some(parent) = parent {
            self.adjust_counters(parent, delta);
        }
    }

    /// Replace the layout strategy of a container and invalidate it.
    pub fn set_layout(
        &mut self,
        container: NodeId,
        layout: Option<Box<dyn LayoutStrategy>>,
    ) -> Result<(), TreeError> {
        self.container_data(container)?;
        self.container_data_mut(container).layout = layout;
        self.invalidate(container);
        Ok(())
    }

    /// Mark `id` (if it is a container) and its ancestors as needing layout.
    ///
    /// Each affected container's layout strategy is told via
    /// [`LayoutStrategy::invalidate`]. The walk stops at the first ancestor that
    /// is already invalid, since everything above it is invalid too.
    pub fn invalidate(&mut self, id: NodeId) {
        let mut current = Some(id);
        let mut first = true;
        while let Some(n) = current {
            let Some(node) = self.node_opt_mut(n) else {
                break;
            };
            let parent = node.parent;
            if let NodeKind::Container(data) = &mut node.kind {
                if !first && !data.valid {
                    break;
                }
                data.valid = false;
                if let Some(layout) = data.layout.as_mut() {
                    layout.invalidate(n);
                }
            }
            first = false;
            current = parent;
        }
    }

    /// Lay out `container` if it is invalid, then every invalid container below it.
    pub fn validate(&mut self, container: NodeId) {
        let Some(data) = self.container_opt_mut(container) else {
            return;
        };
        if data.valid {
            return;
        }
        if let Some(mut layout) = data.layout.take() {
            layout.layout_container(self, container);
            // The strategy may have been replaced while it ran; keep the newer one.
            if let Some(data) = self.container_opt_mut(container)
                && data.layout.is_none()
            {
                data.layout = Some(layout);
            }
        }
        let Some(data) = self.container_opt_mut(container) else {
            return;
        };
        data.valid = true;

        let children: SmallVec<[NodeId; 8]> = data.children.iter().copied().collect();
        for child in children {
            if self
                .container_opt_mut(child)
                .is_some_and(|data| !data.valid)
            {
                self.validate(child);
            }
        }
    }

    /// Whether a container's layout is up to date. Leaves are always valid.
    pub fn is_valid(&self, id: NodeId) -> bool {
        match self.node_opt(id).map(|n| &n.kind) {
            Some(NodeKind::Container(data)) => data.valid,
            Some(NodeKind::Leaf) => true,
            None => false,
        }
    }

    /// Take every notification queued since the last drain, oldest first.
    pub fn drain_notifications(&mut self) -> alloc::vec::Drain<'_, Notification> {
        self.notifications.drain(..)
    }

    /// Returns true if `id` refers to a live component.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Whether `id` is a live container.
    pub fn is_container(&self, id: NodeId) -> bool {
        matches!(
            self.node_opt(id).map(|n| &n.kind),
            Some(NodeKind::Container(_))
        )
    }

    /// Returns the parent of a component if live, or `None` for detached or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|node| node.parent)
    }

    /// Returns the bounds of a live component.
    pub fn bounds(&self, id: NodeId) -> Option<Bounds> {
        self.node_opt(id).map(|node| node.local.bounds)
    }

    /// Returns the flags of a live component.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node_opt(id).map(|node| node.local.flags)
    }

    /// Returns the event mask of a live component.
    pub fn event_mask(&self, id: NodeId) -> Option<EventMask> {
        self.node_opt(id).map(|node| node.local.events)
    }

    /// Whether the component has subscribers for any category in `category`.
    pub fn has_subscribers_for(&self, id: NodeId, category: EventMask) -> bool {
        self.node_opt(id)
            .is_some_and(|node| node.local.events.intersects(category))
    }

    /// Returns the counters of a live container.
    pub fn counters(&self, id: NodeId) -> Option<Counters> {
        match &self.node_opt(id)?.kind {
            NodeKind::Container(data) => Some(data.counters),
            NodeKind::Leaf => None,
        }
    }

    /// Number of components in `id`'s subtree, itself included, subscribed to
    /// `category`.
    ///
    /// Answered from the counters for [`EventMask::HIERARCHY`] and
    /// [`EventMask::HIERARCHY_BOUNDS`]; other categories only report the
    /// component itself.
    pub fn num_listening(&self, id: NodeId, category: EventMask) -> u32 {
        let Some(node) = self.node_opt(id) else {
            return 0;
        };
        let own = u32::from(node.local.events.contains(category));
        let below = match &node.kind {
            NodeKind::Container(data) if category == EventMask::HIERARCHY => {
                data.counters.listening
            }
            NodeKind::Container(data) if category == EventMask::HIERARCHY_BOUNDS => {
                data.counters.listening_bounds
            }
            _ => 0,
        };
        own + below
    }

    /// Number of components in `id`'s subtree, itself included.
    pub fn count_hierarchy_members(&self, id: NodeId) -> u32 {
        match self.node_opt(id).map(|n| &n.kind) {
            Some(NodeKind::Container(data)) => data.counters.descendants + 1,
            Some(NodeKind::Leaf) => 1,
            None => 0,
        }
    }

    /// Children of a container in z-order (topmost first), or an empty slice.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.node_opt(id).map(|n| &n.kind) {
            Some(NodeKind::Container(data)) => &data.children,
            _ => &[],
        }
    }

    /// Children from topmost to bottommost: hit-test order.
    pub fn children_top_to_bottom(
        &self,
        id: NodeId,
    ) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.children_of(id).iter().copied()
    }

    /// Children from bottommost to topmost: paint order.
    pub fn children_bottom_to_top(
        &self,
        id: NodeId,
    ) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.children_of(id).iter().rev().copied()
    }

    /// Number of direct children of a container.
    pub fn component_count(&self, id: NodeId) -> usize {
        self.children_of(id).len()
    }

    /// The child at `index`, or an error if out of range.
    pub fn child_at(&self, container: NodeId, index: usize) -> Result<NodeId, TreeError> {
        let children = &self.container_data(container)?.children;
        children
            .get(index)
            .copied()
            .ok_or(TreeError::IndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    /// Z-order index of `child` within `container`, or `None` if it is not a child.
    pub fn index_of(&self, container: NodeId, child: NodeId) -> Option<usize> {
        if self.parent_of(child) != Some(container) {
            return None;
        }
        self.children_of(container).iter().position(|&c| c == child)
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent_of(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent_of(p);
        }
        false
    }

    /// The outermost ancestor of `id` (itself if detached).
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        self.node_opt(current)?;
        while let Some(p) = self.parent_of(current) {
            current = p;
        }
        Some(current)
    }

    /// Whether `id` and all of its ancestors are visible.
    pub fn is_showing(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            let Some(node) = self.node_opt(n) else {
                return false;
            };
            if !node.local.flags.contains(NodeFlags::VISIBLE) {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Convert a point in `ancestor`'s coordinate space into `id`'s.
    ///
    /// Returns `None` if `ancestor` is neither `id` nor one of its ancestors.
    pub fn point_from_ancestor(
        &self,
        ancestor: NodeId,
        id: NodeId,
        x: i32,
        y: i32,
    ) -> Option<(i32, i32)> {
        let (mut x, mut y) = (x, y);
        let mut current = id;
        while current != ancestor {
            let node = self.node_opt(current)?;
            x = x.saturating_sub(node.local.bounds.x);
            y = y.saturating_sub(node.local.bounds.y);
            current = node.parent?;
        }
        Some((x, y))
    }

    /// Recount a container's subtree from scratch.
    ///
    /// This is a consistency-check tool; the tree itself never needs it.
    pub fn recount(&self, id: NodeId) -> Option<Counters> {
        match &self.node_opt(id)?.kind {
            NodeKind::Container(_) => Some(self.tally(id, &mut 0)),
            NodeKind::Leaf => None,
        }
    }

    /// Whether every container in `id`'s subtree has counters equal to a full recount.
    pub fn counters_consistent(&self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let mut mismatches = 0_u32;
        self.tally(id, &mut mismatches);
        mismatches == 0
    }

    /// Children totals for `id`, counting every container whose stored counters disagree.
    fn tally(&self, id: NodeId, mismatches: &mut u32) -> Counters {
        let node = self.node(id);
        let NodeKind::Container(data) = &node.kind else {
            return Counters::default();
        };
        let mut sum = Counters::default();
        for &child in &data.children {
            let below = self.tally(child, mismatches);
            let events = self.node(child).local.events;
            sum.listening += below.listening + u32::from(events.contains(EventMask::HIERARCHY));
            sum.listening_bounds +=
                below.listening_bounds + u32::from(events.contains(EventMask::HIERARCHY_BOUNDS));
            sum.descendants += below.descendants + 1;
        }
        if sum != data.counters {
            *mismatches += 1;
        }
        sum
    }
}

impl Tree {
    // --- internals ---

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn check_live(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.node_opt(id).ok_or(TreeError::StaleNode(id))
    }

    fn container_data(&self, id: NodeId) -> Result<&ContainerData, TreeError> {
        match &self.check_live(id)?.kind {
            NodeKind::Container(data) => Ok(data),
            NodeKind::Leaf => Err(TreeError::NotAContainer(id)),
        }
    }

    fn container_opt_mut(&mut self, id: NodeId) -> Option<&mut ContainerData> {
        match &mut self.node_opt_mut(id)?.kind {
            NodeKind::Container(data) => Some(data),
            NodeKind::Leaf => None,
        }
    }

    /// Container data of a node already known to be a live container.
    fn container_data_mut(&mut self, id: NodeId) -> &mut ContainerData {
        match &mut self.node_mut(id).kind {
            NodeKind::Container(data) => data,
            NodeKind::Leaf => unreachable!("checked to be a container"),
        }
    }

    fn position_in(&self, container: NodeId, child: NodeId) -> usize {
        self.children_of(container)
            .iter()
            .position(|&c| c == child)
            .expect("parent link without matching child entry")
    }

    /// All preconditions of an insertion, checked before anything changes.
    ///
    /// `index` may be at most the child count left once `child` has been taken
    /// out of its current parent.
    fn check_insertion(
        &self,
        container: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        let len = self.container_data(container)?.children.len();
        let child_node = self.check_live(child)?;
        if child_node.local.flags.contains(NodeFlags::TOP_LEVEL) {
            return Err(TreeError::TopLevelChild(child));
        }

        // Walk up from the container; meeting `child` would close a cycle.
        let mut current = Some(container);
        while let Some(id) = current {
            if id == child {
                return Err(TreeError::AddToSelf);
            }
            current = self.node(id).parent;
        }

        let len = if child_node.parent == Some(container) {
            len - 1
        } else {
            len
        };
        match index {
            Some(index) if index > len => Err(TreeError::IndexOutOfRange { index, len }),
            _ => Ok(()),
        }
    }

    /// Counter contribution of `id`'s whole subtree to its parent.
    fn subtree_delta(&self, id: NodeId) -> CounterDelta {
        let signed = |n: u32| i32::try_from(n).expect("subtree counter exceeds i32");
        CounterDelta {
            listening: signed(self.num_listening(id, EventMask::HIERARCHY)),
            listening_bounds: signed(self.num_listening(id, EventMask::HIERARCHY_BOUNDS)),
            descendants: signed(self.count_hierarchy_members(id)),
        }
    }

    /// Apply `delta` to `start` and every ancestor of it.
    fn adjust_counters(&mut self, start: NodeId, delta: CounterDelta) {
        if delta.is_zero() {
            return;
        }
        let mut current = Some(start);
        while let Some(id) = current {
            let node = self.node_mut(id);
            if let NodeKind::Container(data) = &mut node.kind {
                data.counters.apply(delta);
            }
            current = node.parent;
        }
    }

    fn attach(
        &mut self,
        container: NodeId,
        child: NodeId,
        index: Option<usize>,
        constraints: Option<&dyn Any>,
    ) {
        let delta = self.subtree_delta(child);
        let children = &mut self.container_data_mut(container).children;
        match index {
            Some(i) => children.insert(i, child),
            None => children.push(child),
        }
        self.node_mut(child).parent = Some(container);
        self.adjust_counters(container, delta);
        self.invalidate(container);
        if let Some(layout) = self.container_data_mut(container).layout.as_mut() {
            layout.add_child(child, constraints);
        }

        if self.wants_container_events(container) {
            self.notifications
                .push(Notification::ChildAdded { container, child });
        }
        self.queue_hierarchy(child, Some(container), HierarchyFlags::PARENT_CHANGED);
        trace!(?container, ?child, ?index, "child added");
    }

    fn detach_at(&mut self, container: NodeId, index: usize) -> NodeId {
        let child = self.container_data_mut(container).children[index];
        if let Some(layout) = self.container_data_mut(container).layout.as_mut() {
            layout.remove_child(child);
        }
        let delta = self.subtree_delta(child).negate();
        self.adjust_counters(container, delta);
        self.node_mut(child).parent = None;
        self.container_data_mut(container).children.remove(index);
        self.invalidate(container);

        if self.wants_container_events(container) {
            self.notifications
                .push(Notification::ChildRemoved { container, child });
        }
        self.queue_hierarchy(child, Some(container), HierarchyFlags::PARENT_CHANGED);
        trace!(?container, ?child, index, "child removed");
        child
    }

    /// Whether `container` or any ancestor subscribes to container events.
    fn wants_container_events(&self, container: NodeId) -> bool {
        let mut current = Some(container);
        while let Some(id) = current {
            let node = self.node(id);
            if node.local.events.contains(EventMask::CONTAINER) {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// Queue [`Notification::HierarchyChanged`] for every hierarchy subscriber in
    /// `changed`'s subtree, skipping subtrees the counters show to be empty.
    fn queue_hierarchy(
        &mut self,
        changed: NodeId,
        changed_parent: Option<NodeId>,
        flags: HierarchyFlags,
    ) {
        if self.num_listening(changed, EventMask::HIERARCHY) == 0 {
            return;
        }
        let mut out = Vec::new();
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(changed);
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.local.events.contains(EventMask::HIERARCHY) {
                out.push(Notification::HierarchyChanged {
                    node: id,
                    changed,
                    changed_parent,
                    flags,
                });
            }
            if let NodeKind::Container(data) = &node.kind
                && data.counters.listening > 0
            {
                for &child in data.children.iter().rev() {
                    if self.num_listening(child, EventMask::HIERARCHY) > 0 {
                        stack.push(child);
                    }
                }
            }
        }
        self.notifications.extend(out);
    }

    /// Queue ancestor bound notifications for bounds subscribers below `ancestor`.
    fn queue_ancestor_bounds(&mut self, ancestor: NodeId, moved: bool, resized: bool) {
        let Some(Counters {
            listening_bounds, ..
        }) = self.counters(ancestor)
        else {
            return;
        };
        if listening_bounds == 0 {
            return;
        }
        let mut out = Vec::new();
        let mut stack: SmallVec<[NodeId; 16]> =
            self.children_of(ancestor).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.num_listening(id, EventMask::HIERARCHY_BOUNDS) == 0 {
                continue;
            }
            if self.has_subscribers_for(id, EventMask::HIERARCHY_BOUNDS) {
                if moved {
                    out.push(Notification::AncestorMoved { node: id, ancestor });
                }
                if resized {
                    out.push(Notification::AncestorResized { node: id, ancestor });
                }
            }
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        self.notifications.extend(out);
    }
}

impl From<Counters> for CounterDelta {
    fn from(c: Counters) -> Self {
        let signed = |n: u32| i32::try_from(n).expect("subtree counter exceeds i32");
        Self {
            listening: signed(c.listening),
            listening_bounds: signed(c.listening_bounds),
            descendants: signed(c.descendants),
        }
    }
}
