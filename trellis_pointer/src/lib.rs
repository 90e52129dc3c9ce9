// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Pointer: pointer event dispatch for a [`trellis_tree::Tree`].
//!
//! ## Overview
//!
//! A native surface (a window) is represented by a top-level host container.
//! Each host gets a [`PointerDispatcher`] that turns the host's raw input into
//! events aimed at the components inside it:
//!
//! - hit-testing in z-order with a configurable
//!   [`TargetFilter`](trellis_tree::TargetFilter),
//! - a grab from the first press until the last button is released,
//! - enter/exit synthesis with every exit delivered before its matching enter,
//! - click synthesis with optional tolerance and multi-click counting,
//! - coordinates retargeted into each receiving component's space.
//!
//! ## Cross-host drags
//!
//! Once a drag leaves its host, other hosts get no native motion. A [`Session`]
//! owns every dispatcher plus a [`DragBroadcastHub`]; while one dispatcher is
//! grabbed, its motion is republished in screen coordinates and the other
//! dispatchers update their enter/exit state from it.
//!
//! ## Reentrancy
//!
//! Handlers receive `&mut Tree` and may mutate it mid-dispatch. Targets are
//! re-resolved after deliveries, and a target that left the host, was
//! disposed, or was disabled simply gets nothing.
//!
//! ```
//! use trellis_pointer::{DispatcherConfig, InputKind, PointerEventKind, PointerInput, Session};
//! use trellis_tree::{Bounds, Component, EventMask, NodeFlags, Tree};
//!
//! let mut tree = Tree::new();
//! let window = |x| Component {
//!     flags: NodeFlags::default() | NodeFlags::TOP_LEVEL,
//!     ..Component::with_bounds(Bounds::new(x, 0, 100, 100))
//! };
//! let left = tree.insert_container(window(0), None);
//! let right = tree.insert_container(window(200), None);
//! let target = tree.insert_leaf(
//!     Component::with_bounds(Bounds::new(0, 0, 50, 50)).listening(EventMask::MOUSE),
//! );
//! tree.add(right, target, None).unwrap();
//!
//! let mut session = Session::new();
//! session.attach_host(&tree, left, DispatcherConfig::default()).unwrap();
//! session.attach_host(&tree, right, DispatcherConfig::default()).unwrap();
//!
//! let mut seen = Vec::new();
//! let inputs = [
//!     PointerInput::new(InputKind::Pressed(trellis_pointer::PointerButton::Primary), 10, 10, 0),
//!     // Screen x = 210: over `target` in the right window.
//!     PointerInput::new(InputKind::Moved, 210, 10, 5),
//! ];
//! for input in inputs {
//!     session.dispatch(&mut tree, left, input, |_, e| seen.push((e.target, e.kind)));
//! }
//! assert_eq!(seen, vec![(target, PointerEventKind::Entered)]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod click;
mod config;
mod dispatcher;
mod event;
mod hover;
mod hub;
mod session;

pub use click::{ClickResult, ClickTracker, DEFAULT_MULTI_CLICK_INTERVAL};
pub use config::DispatcherConfig;
pub use dispatcher::{DispatchState, PointerDispatcher};
pub use event::{Buttons, InputKind, PointerButton, PointerEvent, PointerEventKind, PointerInput};
pub use hover::{HoverEvent, HoverTracker};
pub use hub::{DragBroadcastHub, DragOver};
pub use session::Session;
