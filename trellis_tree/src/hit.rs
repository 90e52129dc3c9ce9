// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point queries over the component tree.
//!
//! All coordinates are in the coordinate space of the component the query
//! starts from: `(0, 0)` is its top-left corner.

use crate::tree::{NodeKind, Tree};
use crate::types::{EventMask, NodeFlags, NodeId};

/// Decides which components may become the target of a pointer event.
///
/// The default accepts components subscribed to any pointer category
/// ([`EventMask::POINTER`]), regardless of whether they are enabled.
///
/// ```rust
/// use trellis_tree::{EventMask, TargetFilter};
///
/// let filter = TargetFilter::new()
///     .listening_to(EventMask::MOUSE)
///     .enabled_only();
/// assert!(filter.require_enabled);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TargetFilter {
    /// Categories that make a component eligible. Empty accepts every component.
    pub any_of: EventMask,
    /// Only accept enabled components.
    pub require_enabled: bool,
    /// Extra check, run after the category and enablement checks pass.
    pub predicate: Option<fn(&Tree, NodeId) -> bool>,
}

impl Default for TargetFilter {
    fn default() -> Self {
        Self {
            any_of: EventMask::POINTER,
            require_enabled: false,
            predicate: None,
        }
    }
}

impl TargetFilter {
    /// The default filter: pointer subscribers only.
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter that accepts every component.
    pub fn any() -> Self {
        Self {
            any_of: EventMask::empty(),
            ..Self::default()
        }
    }

    /// Replace the categories that make a component eligible.
    pub fn listening_to(mut self, any_of: EventMask) -> Self {
        self.any_of = any_of;
        self
    }

    /// Reject disabled components.
    pub fn enabled_only(mut self) -> Self {
        self.require_enabled = true;
        self
    }

    /// Add a custom predicate.
    pub fn with_predicate(mut self, predicate: fn(&Tree, NodeId) -> bool) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Whether `id` is an acceptable target.
    pub fn accepts(&self, tree: &Tree, id: NodeId) -> bool {
        let Some(node) = tree.node_opt(id) else {
            return false;
        };
        if !self.any_of.is_empty() && !node.local.events.intersects(self.any_of) {
            return false;
        }
        if self.require_enabled && !node.local.flags.contains(NodeFlags::ENABLED) {
            return false;
        }
        self.predicate.is_none_or(|p| p(tree, id))
    }
}

impl Tree {
    /// Resolve the target of a pointer event at `(x, y)` within `root`.
    ///
    /// Children are tried in z-order, topmost first. A visible child whose
    /// bounds contain the point is searched recursively if it is a container;
    /// a leaf is returned if `filter` accepts it. The first match wins, and a
    /// container with no matching descendant does not stop the search among
    /// its siblings. If no descendant matches, `root` itself is returned when
    /// `include_self` is set, it contains the point, and `filter` accepts it.
    ///
    /// The same `include_self` applies to nested containers.
    pub fn resolve_target(
        &self,
        root: NodeId,
        x: i32,
        y: i32,
        include_self: bool,
        filter: &TargetFilter,
    ) -> Option<NodeId> {
        let node = self.node_opt(root)?;
        if let NodeKind::Container(data) = &node.kind {
            for &child in &data.children {
                let c = self.node(child);
                let (cx, cy) = (
                    x.saturating_sub(c.local.bounds.x),
                    y.saturating_sub(c.local.bounds.y),
                );
                if !c.local.flags.contains(NodeFlags::VISIBLE)
                    || !c.local.bounds.contains_local(cx, cy)
                {
                    continue;
                }
                match &c.kind {
                    NodeKind::Container(_) => {
                        if let Some(target) =
                            self.resolve_target(child, cx, cy, include_self, filter)
                        {
                            return Some(target);
                        }
                    }
                    NodeKind::Leaf => {
                        if filter.accepts(self, child) {
                            return Some(child);
                        }
                    }
                }
            }
        }
        (include_self && node.local.bounds.contains_local(x, y) && filter.accepts(self, root))
            .then_some(root)
    }

    /// The deepest visible, enabled component at `(x, y)` within `root`.
    ///
    /// Unlike [`Tree::resolve_target`], no filter is applied; `root` is returned
    /// if no child matches. Returns `None` if `root` is hidden, disabled, or does
    /// not contain the point.
    pub fn find_component_at(&self, root: NodeId, x: i32, y: i32) -> Option<NodeId> {
        let node = self.node_opt(root)?;
        let flags = node.local.flags;
        if !node.local.bounds.contains_local(x, y)
            || !flags.contains(NodeFlags::VISIBLE | NodeFlags::ENABLED)
        {
            return None;
        }
        for &child in self.children_of(root) {
            let b = self.node(child).local.bounds;
            if let Some(found) =
                self.find_component_at(child, x.saturating_sub(b.x), y.saturating_sub(b.y))
            {
                return Some(found);
            }
        }
        Some(root)
    }

    /// The topmost direct child of `container` containing `(x, y)`, visible or
    /// not, else `container` itself if it contains the point.
    pub fn component_at(&self, container: NodeId, x: i32, y: i32) -> Option<NodeId> {
        let node = self.node_opt(container)?;
        if !node.local.bounds.contains_local(x, y) {
            return None;
        }
        self.children_top_to_bottom(container)
            .find(|&child| {
                let b = self.node(child).local.bounds;
                b.contains_local(x.saturating_sub(b.x), y.saturating_sub(b.y))
            })
            .or(Some(container))
    }
}
