// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable layout strategy seam.
//!
//! The tree never computes positions itself. A container may carry a
//! [`LayoutStrategy`]; the tree tells it about children coming and going and
//! about invalidation, and calls [`LayoutStrategy::layout_container`] from
//! [`Tree::validate`](crate::Tree::validate).

use core::any::Any;

use crate::tree::Tree;
use crate::types::NodeId;

/// Layout policy attached to a container.
///
/// All methods except [`layout_container`](Self::layout_container) have empty
/// defaults, since many strategies only read the child list when laying out.
pub trait LayoutStrategy {
    /// A child was added, with the constraints passed to
    /// [`Tree::add_with_constraints`](crate::Tree::add_with_constraints).
    fn add_child(&mut self, child: NodeId, constraints: Option<&dyn Any>) {
        let _ = (child, constraints);
    }

    /// A child was removed.
    fn remove_child(&mut self, child: NodeId) {
        let _ = child;
    }

    /// Cached layout information for `container` must be discarded.
    fn invalidate(&mut self, container: NodeId) {
        let _ = container;
    }

    /// Position the children of `container`.
    ///
    /// The strategy is detached from the container for the duration of the call,
    /// so it may freely mutate the tree, typically with
    /// [`Tree::set_bounds`](crate::Tree::set_bounds).
    fn layout_container(&mut self, tree: &mut Tree, container: NodeId);
}
