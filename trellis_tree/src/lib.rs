// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Tree: the component/container arena of a retained-mode widget toolkit.
//!
//! Components form a tree. Leaves are plain components; containers own an
//! ordered list of children where index 0 is the topmost child, both for
//! hit-testing and for front-to-back painting.
//!
//! - Children are attached, detached, and reordered with checked operations.
//!   Every precondition is verified before the first change, so a failed call
//!   never leaves the tree half-mutated.
//! - Each container keeps [`Counters`] over its subtree (hierarchy subscribers,
//!   bounds subscribers, descendants). They are maintained incrementally along
//!   the ancestor chain and let notification walks skip silent subtrees.
//! - Point queries resolve pointer targets in z-order with a configurable
//!   [`TargetFilter`].
//!
//! ## Not a layout engine
//!
//! Positions come from a pluggable [`LayoutStrategy`] attached to a container,
//! or from whoever calls [`Tree::set_bounds`]. The tree only tracks validity and
//! tells the strategy about children coming and going.
//!
//! ## Notifications
//!
//! Mutations queue [`Notification`]s (child added or removed, z-order changed,
//! hierarchy changed, ancestor moved or resized) which the embedding toolkit
//! drains with [`Tree::drain_notifications`] and forwards to its subscribers.
//! Which components have subscribers is reported through
//! [`Tree::set_event_mask`].
//!
//! ## API overview
//!
//! - [`Tree`]: the arena.
//! - [`NodeId`]: generational handle of a component.
//! - [`Component`]: per-component bounds, [`NodeFlags`], and [`EventMask`].
//! - [`TreeError`]: why a mutation was rejected.
//!
//! Key operations:
//! - [`Tree::insert_leaf`] / [`Tree::insert_container`] → [`NodeId`]
//! - [`Tree::add`], [`Tree::remove`], [`Tree::remove_child`], [`Tree::remove_all`],
//!   [`Tree::move_to_index`], [`Tree::dispose`]
//! - [`Tree::resolve_target`], [`Tree::find_component_at`], [`Tree::component_at`]
//! - [`Tree::invalidate`] / [`Tree::validate`]
//! - [`Tree::counters_consistent`] checks the incremental counters against a full recount.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod hit;
mod layout;
mod notify;
mod tree;
mod types;

pub use error::TreeError;
pub use hit::TargetFilter;
pub use layout::LayoutStrategy;
pub use notify::{HierarchyFlags, Notification};
pub use tree::Tree;
pub use types::{Bounds, Component, Counters, EventMask, NodeFlags, NodeId};
