// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw host input and the retargeted events delivered to components.

use kurbo::Point;
use trellis_tree::NodeId;

/// A physical pointer button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PointerButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    /// Usually the middle button or wheel press.
    Auxiliary,
    /// Browser back.
    Back,
    /// Browser forward.
    Forward,
}

bitflags::bitflags! {
    /// Set of buttons currently held.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        /// [`PointerButton::Primary`].
        const PRIMARY   = 0b0000_0001;
        /// [`PointerButton::Secondary`].
        const SECONDARY = 0b0000_0010;
        /// [`PointerButton::Auxiliary`].
        const AUXILIARY = 0b0000_0100;
        /// [`PointerButton::Back`].
        const BACK      = 0b0000_1000;
        /// [`PointerButton::Forward`].
        const FORWARD   = 0b0001_0000;
    }
}

impl From<PointerButton> for Buttons {
    fn from(button: PointerButton) -> Self {
        match button {
            PointerButton::Primary => Self::PRIMARY,
            PointerButton::Secondary => Self::SECONDARY,
            PointerButton::Auxiliary => Self::AUXILIARY,
            PointerButton::Back => Self::BACK,
            PointerButton::Forward => Self::FORWARD,
        }
    }
}

/// What the native host reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// The pointer moved, with or without buttons held.
    Moved,
    /// A button went down.
    Pressed(PointerButton),
    /// A button went up.
    Released(PointerButton),
    /// The wheel turned by `delta` notches.
    Wheel {
        /// Positive values scroll down.
        delta: i32,
    },
    /// The pointer entered the host surface.
    Entered,
    /// The pointer left the host surface.
    Exited,
}

/// Raw input from the native host, in host-local coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PointerInput {
    /// Horizontal position relative to the host's origin.
    pub x: i32,
    /// Vertical position relative to the host's origin.
    pub y: i32,
    /// What happened.
    pub kind: InputKind,
    /// Timestamp in milliseconds.
    pub time: u64,
}

impl PointerInput {
    /// Create an input record.
    pub const fn new(kind: InputKind, x: i32, y: i32, time: u64) -> Self {
        Self { x, y, kind, time }
    }
}

/// What a delivered event means to its target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    /// A button went down over the target.
    Pressed(PointerButton),
    /// A button went up; delivered to the grab target.
    Released(PointerButton),
    /// Press and release on the same target.
    Clicked {
        /// The button that was clicked.
        button: PointerButton,
        /// 1 for a single click, 2 for a double click, and so on.
        count: u32,
    },
    /// The pointer moved over the target with no button held.
    Moved,
    /// The pointer moved while the target holds the grab.
    Dragged,
    /// The pointer entered the target.
    Entered,
    /// The pointer left the target.
    Exited,
    /// The wheel turned over the target.
    Wheel {
        /// Positive values scroll down.
        delta: i32,
    },
}

/// An event retargeted to a single component.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    /// The receiving component.
    pub target: NodeId,
    /// The host whose dispatcher produced the event.
    pub host: NodeId,
    /// What happened.
    pub kind: PointerEventKind,
    /// Horizontal position in the target's coordinate space.
    pub x: i32,
    /// Vertical position in the target's coordinate space.
    pub y: i32,
    /// Buttons held when the event was produced.
    pub buttons: Buttons,
    /// Timestamp in milliseconds.
    pub time: u64,
}

impl PointerEvent {
    /// The target-local position as a Kurbo point.
    pub fn position(&self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}
