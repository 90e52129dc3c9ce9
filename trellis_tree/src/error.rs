// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by tree mutations.

use crate::types::NodeId;

/// A rejected tree operation.
///
/// Every precondition is checked before the first change, so an `Err` always
/// means the tree is exactly as it was before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The identifier refers to a disposed component.
    #[error("stale node id {0:?}")]
    StaleNode(NodeId),
    /// The operation needs a container but got a leaf.
    #[error("{0:?} is not a container")]
    NotAContainer(NodeId),
    /// The component is the container itself or one of its ancestors.
    #[error("adding a container's parent to itself")]
    AddToSelf,
    /// Top-level surfaces cannot be children.
    #[error("top-level component {0:?} cannot be added to a container")]
    TopLevelChild(NodeId),
    /// A child index outside the valid range.
    #[error("child index {index} out of range for {len} children")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of children the index was checked against.
        len: usize,
    },
    /// The component is not a direct child of the container.
    #[error("{child:?} is not a child of {container:?}")]
    NotAChild {
        /// The container that was asked.
        container: NodeId,
        /// The component that was not found among its children.
        child: NodeId,
    },
}
