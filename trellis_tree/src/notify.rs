// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural notifications queued by tree mutations.

use crate::types::NodeId;

bitflags::bitflags! {
    /// What changed in a [`Notification::HierarchyChanged`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct HierarchyFlags: u8 {
        /// `changed` got a new parent (or lost its parent).
        const PARENT_CHANGED  = 0b0000_0001;
        /// `changed` was shown or hidden.
        const SHOWING_CHANGED = 0b0000_0010;
    }
}

/// A change to the tree that subscribers may want to react to.
///
/// Notifications are queued only after the mutation that caused them is
/// complete, and are handed out by [`Tree::drain_notifications`](crate::Tree::drain_notifications).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    /// `child` was inserted into `container`.
    ChildAdded {
        /// The container that gained a child.
        container: NodeId,
        /// The new child.
        child: NodeId,
    },
    /// `child` was removed from `container`.
    ChildRemoved {
        /// The container that lost a child.
        container: NodeId,
        /// The removed child, now detached.
        child: NodeId,
    },
    /// `child` moved within `container` without leaving it.
    ZOrderChanged {
        /// The parent of `child`.
        container: NodeId,
        /// The repositioned child.
        child: NodeId,
        /// Index before the move.
        old_index: usize,
        /// Index after the move.
        new_index: usize,
    },
    /// Delivered to `node`, which subscribes to hierarchy events, because
    /// `changed` (itself or an ancestor) changed.
    HierarchyChanged {
        /// The subscriber.
        node: NodeId,
        /// The component whose parent or visibility changed.
        changed: NodeId,
        /// Parent of `changed` involved in the change (old parent on removal).
        changed_parent: Option<NodeId>,
        /// What changed.
        flags: HierarchyFlags,
    },
    /// Delivered to `node` because `ancestor` moved.
    AncestorMoved {
        /// The subscriber.
        node: NodeId,
        /// The ancestor that moved.
        ancestor: NodeId,
    },
    /// Delivered to `node` because `ancestor` was resized.
    AncestorResized {
        /// The subscriber.
        node: NodeId,
        /// The ancestor that was resized.
        ancestor: NodeId,
    },
}
