// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the component tree: identifiers, geometry, flags, and event interest.

use kurbo::Rect;

/// Identifier for a component in the tree (generational).
///
/// A `NodeId` stays valid until the component is disposed with
/// [`Tree::dispose`](crate::Tree::dispose). Slots are reused afterwards, but with a
/// bumped generation, so an old id never aliases a new component.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Integer bounds of a component, relative to its parent's origin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bounds {
    /// Horizontal offset within the parent.
    pub x: i32,
    /// Vertical offset within the parent.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Bounds {
    /// Empty bounds at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create bounds from an origin and a size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether a point in the component's own coordinate space lies inside it.
    ///
    /// The left and top edges are inclusive, the right and bottom edges exclusive.
    pub const fn contains_local(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Whether the origin differs from `other`'s.
    pub const fn moved_from(&self, other: &Self) -> bool {
        self.x != other.x || self.y != other.y
    }

    /// Whether the size differs from `other`'s.
    pub const fn resized_from(&self, other: &Self) -> bool {
        self.width != other.width || self.height != other.height
    }

    /// These bounds as a Kurbo rectangle in parent space, for painters.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x) + f64::from(self.width),
            f64::from(self.y) + f64::from(self.height),
        )
    }
}

bitflags::bitflags! {
    /// Component state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Component is visible (painted and hit-tested).
        const VISIBLE   = 0b0000_0001;
        /// Component accepts input. Disabled components still occlude hits.
        const ENABLED   = 0b0000_0010;
        /// Component is a top-level surface and can never become a child.
        const TOP_LEVEL = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ENABLED
    }
}

bitflags::bitflags! {
    /// Event categories a component has subscribers for.
    ///
    /// The tree only reads this mask. Managing the subscribers themselves is up to
    /// the embedding toolkit, which reports the result with
    /// [`Tree::set_event_mask`](crate::Tree::set_event_mask).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EventMask: u16 {
        /// Press, release, click, enter and exit.
        const MOUSE            = 0b0000_0001;
        /// Move and drag.
        const MOUSE_MOTION     = 0b0000_0010;
        /// Wheel rotation.
        const MOUSE_WHEEL      = 0b0000_0100;
        /// Child added to or removed from a container.
        const CONTAINER        = 0b0000_1000;
        /// Parent changes and showing changes anywhere above the component.
        const HIERARCHY        = 0b0001_0000;
        /// Moves and resizes of an ancestor.
        const HIERARCHY_BOUNDS = 0b0010_0000;

        /// Every pointer category.
        const POINTER = Self::MOUSE.bits() | Self::MOUSE_MOTION.bits() | Self::MOUSE_WHEEL.bits();
    }
}

/// Local data for a component.
#[derive(Clone, Debug)]
pub struct Component {
    /// Bounds relative to the parent.
    pub bounds: Bounds,
    /// Visibility, enablement, and top-level flags.
    pub flags: NodeFlags,
    /// Categories this component has subscribers for.
    pub events: EventMask,
}

impl Default for Component {
    fn default() -> Self {
        Self {
            bounds: Bounds::ZERO,
            flags: NodeFlags::default(),
            events: EventMask::empty(),
        }
    }
}

impl Component {
    /// A visible, enabled component with the given bounds and no subscribers.
    pub fn with_bounds(bounds: Bounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Builder-style helper to set the event mask.
    pub fn listening(mut self, events: EventMask) -> Self {
        self.events = events;
        self
    }
}

/// Aggregate counters kept on every container.
///
/// All three count the container's descendants only; the container's own
/// subscriptions are added on top by [`Tree::num_listening`](crate::Tree::num_listening).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Descendants subscribed to [`EventMask::HIERARCHY`].
    pub listening: u32,
    /// Descendants subscribed to [`EventMask::HIERARCHY_BOUNDS`].
    pub listening_bounds: u32,
    /// Total descendants.
    pub descendants: u32,
}

/// A signed change applied to [`Counters`] along an ancestor chain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CounterDelta {
    pub(crate) listening: i32,
    pub(crate) listening_bounds: i32,
    pub(crate) descendants: i32,
}

impl CounterDelta {
    pub(crate) const fn is_zero(&self) -> bool {
        self.listening == 0 && self.listening_bounds == 0 && self.descendants == 0
    }

    pub(crate) const fn negate(self) -> Self {
        Self {
            listening: -self.listening,
            listening_bounds: -self.listening_bounds,
            descendants: -self.descendants,
        }
    }
}

impl Counters {
    pub(crate) fn apply(&mut self, delta: CounterDelta) {
        fn step(count: &mut u32, by: i32) {
            *count = count
                .checked_add_signed(by)
                .expect("subtree counter went negative");
        }
        step(&mut self.listening, delta.listening);
        step(&mut self.listening_bounds, delta.listening_bounds);
        step(&mut self.descendants, delta.descendants);
    }
}
