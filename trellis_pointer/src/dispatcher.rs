// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-host pointer dispatcher.
//!
//! A [`PointerDispatcher`] receives raw input for one host container and turns
//! it into [`PointerEvent`]s aimed at individual components:
//!
//! - Targets are resolved with [`Tree::resolve_target`] using the configured
//!   [`TargetFilter`](trellis_tree::TargetFilter).
//! - The first press grabs the target under the pointer; drags and releases go
//!   to it until the last held button is released.
//! - Enter and exit are synthesized whenever the component under the pointer
//!   changes, always exit first.
//! - Clicks are synthesized on release by a [`ClickTracker`].
//! - Coordinates are translated into each target's own space.
//! - Moves and drags only go to targets that have motion subscribers, on
//!   themselves or an ancestor. Wheel events go to the nearest component with
//!   wheel subscribers, starting at the target under the pointer.
//!
//! Handlers get `&mut Tree` and may change the tree while an event is being
//! dispatched. Every delivery checks that its target is still alive, still
//! inside the host, and enabled; otherwise the event is dropped silently.
//!
//! ```
//! use trellis_pointer::{InputKind, PointerDispatcher, PointerEventKind, PointerInput};
//! use trellis_tree::{Bounds, Component, EventMask, Tree};
//!
//! let mut tree = Tree::new();
//! let host = tree.insert_container(Component::with_bounds(Bounds::new(0, 0, 100, 100)), None);
//! let button = tree.insert_leaf(
//!     Component::with_bounds(Bounds::new(10, 10, 20, 20))
//!         .listening(EventMask::MOUSE | EventMask::MOUSE_MOTION),
//! );
//! tree.add(host, button, None).unwrap();
//!
//! let mut dispatcher = PointerDispatcher::new(host, Default::default());
//! let mut seen = Vec::new();
//! let mut log = |_: &mut Tree, e: &trellis_pointer::PointerEvent| seen.push((e.kind, e.x, e.y));
//! dispatcher.dispatch(&mut tree, PointerInput::new(InputKind::Moved, 15, 12, 0), &mut log);
//!
//! assert_eq!(seen, vec![(PointerEventKind::Entered, 5, 2), (PointerEventKind::Moved, 5, 2)]);
//! ```

use kurbo::Point;
use tracing::{debug, trace};
use trellis_tree::{EventMask, NodeFlags, NodeId, Tree};

use crate::click::{ClickResult, ClickTracker};
use crate::config::DispatcherConfig;
use crate::event::{Buttons, InputKind, PointerButton, PointerEvent, PointerEventKind, PointerInput};
use crate::hover::{HoverEvent, HoverTracker};
use crate::hub::DragOver;

/// Coarse dispatcher state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchState {
    /// Pointer outside the host and no button held.
    Idle,
    /// Pointer inside the host and no button held.
    Hovering,
    /// At least one button held; drags and releases go to the grab target.
    Grabbed,
}

/// Routes raw input of one host to the components inside it.
#[derive(Clone, Debug)]
pub struct PointerDispatcher {
    host: NodeId,
    config: DispatcherConfig,
    hover: HoverTracker,
    grab: Option<NodeId>,
    /// Last component found under the pointer.
    last_known: Option<NodeId>,
    held: Buttons,
    clicks: ClickTracker,
    /// Last known pointer position, host-local.
    last_position: Option<(i32, i32)>,
    disposed: bool,
}

impl PointerDispatcher {
    /// Create a dispatcher for `host`.
    pub fn new(host: NodeId, config: DispatcherConfig) -> Self {
        let mut clicks = ClickTracker::with_thresholds(config.click_distance, config.click_time);
        clicks.multi_click_interval = config.multi_click_interval;
        Self {
            host,
            config,
            hover: HoverTracker::new(),
            grab: None,
            last_known: None,
            held: Buttons::empty(),
            clicks,
            last_position: None,
            disposed: false,
        }
    }

    /// The host container.
    pub fn host(&self) -> NodeId {
        self.host
    }

    /// The configuration this dispatcher was created with.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> DispatchState {
        if !self.held.is_empty() {
            DispatchState::Grabbed
        } else if self.hover.inside_host() {
            DispatchState::Hovering
        } else {
            DispatchState::Idle
        }
    }

    /// Component holding the grab, if a button is held over one.
    pub fn grab_target(&self) -> Option<NodeId> {
        self.grab
    }

    /// Component the pointer last entered.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hover.current()
    }

    /// The last component found under the pointer, even if the pointer has
    /// since moved off every component.
    pub fn last_known_target(&self) -> Option<NodeId> {
        self.last_known
    }

    /// Buttons currently held.
    pub fn held_buttons(&self) -> Buttons {
        self.held
    }

    /// Whether the dispatcher was shut down by [`Self::on_host_disposed`].
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Screen position of the host origin.
    ///
    /// Hosts are top-level surfaces, so their bounds are in screen space.
    pub fn screen_origin(&self, tree: &Tree) -> Option<(i32, i32)> {
        tree.bounds(self.host).map(|b| (b.x, b.y))
    }

    /// Process one raw input record.
    ///
    /// `handler` receives every retargeted event, in order, together with the
    /// tree it may mutate.
    pub fn dispatch<H>(&mut self, tree: &mut Tree, input: PointerInput, mut handler: H)
    where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        if !self.host_ready(tree) {
            return;
        }
        let PointerInput { x, y, kind, time } = input;
        self.last_position = Some((x, y));
        match kind {
            InputKind::Moved => self.on_moved(tree, x, y, time, &mut handler),
            InputKind::Pressed(button) => self.on_pressed(tree, button, x, y, time, &mut handler),
            InputKind::Released(button) => {
                self.on_released(tree, button, x, y, time, &mut handler);
            }
            InputKind::Wheel { delta } => {
                let receiver = self
                    .track(tree, x, y, time, &mut handler)
                    .and_then(|target| self.subscriber_for(tree, target, EventMask::MOUSE_WHEEL));
                if let Some(receiver) = receiver {
                    let kind = PointerEventKind::Wheel { delta };
                    self.deliver(tree, receiver, kind, x, y, time, &mut handler);
                }
            }
            InputKind::Entered => {
                self.track(tree, x, y, time, &mut handler);
            }
            InputKind::Exited => {
                if let Some(HoverEvent::Exit(old)) = self.hover.exit_host() {
                    self.deliver(tree, old, PointerEventKind::Exited, x, y, time, &mut handler);
                }
            }
        }
    }

    /// The host changed size: re-run the enter/exit comparison at the last
    /// pointer position.
    pub fn on_host_resized<H>(&mut self, tree: &mut Tree, time: u64, mut handler: H)
    where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        if !self.host_ready(tree) || !self.hover.inside_host() {
            return;
        }
        if let Some((x, y)) = self.last_position {
            self.track(tree, x, y, time, &mut handler);
        }
    }

    /// The host is gone. Drops all state; later input is ignored.
    pub fn on_host_disposed(&mut self) {
        if self.disposed {
            return;
        }
        debug!(host = ?self.host, "pointer dispatcher disposed");
        self.disposed = true;
        self.hover.clear();
        self.grab = None;
        self.last_known = None;
        self.held = Buttons::empty();
        self.clicks.reset();
        self.last_position = None;
    }

    /// Another host is dragging: update enter/exit state from its position.
    ///
    /// The drag itself is not delivered here.
    pub fn on_foreign_drag<H>(&mut self, tree: &mut Tree, message: &DragOver, mut handler: H)
    where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        if !self.host_ready(tree) {
            return;
        }
        let Some((ox, oy)) = self.screen_origin(tree) else {
            return;
        };
        let x = message.screen_x.saturating_sub(ox);
        let y = message.screen_y.saturating_sub(oy);
        trace!(host = ?self.host, source = ?message.source, x, y, "foreign drag");
        self.last_position = Some((x, y));
        self.track(tree, x, y, message.time, &mut handler);
    }

    fn host_ready(&mut self, tree: &Tree) -> bool {
        if self.disposed {
            return false;
        }
        if !tree.is_alive(self.host) {
            self.on_host_disposed();
            return false;
        }
        true
    }

    fn on_moved<H>(&mut self, tree: &mut Tree, x: i32, y: i32, time: u64, handler: &mut H)
    where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        self.clicks.on_move(point(x, y));
        self.track(tree, x, y, time, handler);
        let (target, kind) = if self.held.is_empty() {
            (self.hover.current(), PointerEventKind::Moved)
        } else {
            (self.grab, PointerEventKind::Dragged)
        };
        if let Some(target) = target
            && self.subscriber_for(tree, target, EventMask::MOUSE_MOTION).is_some()
        {
            self.deliver(tree, target, kind, x, y, time, handler);
        }
    }

    fn on_pressed<H>(
        &mut self,
        tree: &mut Tree,
        button: PointerButton,
        x: i32,
        y: i32,
        time: u64,
        handler: &mut H,
    ) where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        let target = self.track(tree, x, y, time, handler);
        if self.held.is_empty() {
            self.grab = target;
            trace!(host = ?self.host, grab = ?target, "grab started");
        }
        self.held |= Buttons::from(button);
        self.clicks.on_down(button, self.grab, point(x, y), time);
        if let Some(grab) = self.grab {
            self.deliver(tree, grab, PointerEventKind::Pressed(button), x, y, time, handler);
        }
    }

    fn on_released<H>(
        &mut self,
        tree: &mut Tree,
        button: PointerButton,
        x: i32,
        y: i32,
        time: u64,
        handler: &mut H,
    ) where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        let bit = Buttons::from(button);
        if !self.held.contains(bit) {
            // Pressed somewhere else; nothing to click.
            let target = self.track(tree, x, y, time, handler).or(self.last_known);
            if let Some(target) = target {
                self.deliver(tree, target, PointerEventKind::Released(button), x, y, time, handler);
            }
            return;
        }

        self.held.remove(bit);
        if let Some(grab) = self.grab {
            self.deliver(tree, grab, PointerEventKind::Released(button), x, y, time, handler);
        }

        // Resolve again: the release handler may have changed the tree.
        let (_, current) = self.hit(tree, x, y);
        match self.clicks.on_up(button, current, point(x, y), time) {
            ClickResult::Click { target, count } => {
                trace!(?target, count, "click");
                self.deliver(
                    tree,
                    target,
                    PointerEventKind::Clicked { button, count },
                    x,
                    y,
                    time,
                    handler,
                );
            }
            ClickResult::Suppressed(pressed) => {
                trace!(?pressed, ?current, "click suppressed");
            }
        }

        if self.held.is_empty() {
            trace!(host = ?self.host, grab = ?self.grab, "grab released");
            self.grab = None;
        }
        self.track(tree, x, y, time, handler);
    }

    /// Whether the point is inside the host, and the target under it.
    fn hit(&self, tree: &Tree, x: i32, y: i32) -> (bool, Option<NodeId>) {
        let inside = tree
            .bounds(self.host)
            .is_some_and(|b| b.contains_local(x, y));
        let target = if inside {
            tree.resolve_target(self.host, x, y, true, &self.config.filter)
        } else {
            None
        };
        (inside, target)
    }

    /// Run the enter/exit comparison at a host-local point and deliver the
    /// transitions. Returns the target under the point.
    ///
    /// Transition handlers may rearrange the tree, so the point is resolved
    /// again after each round of deliveries until the target settles.
    fn track<H>(
        &mut self,
        tree: &mut Tree,
        x: i32,
        y: i32,
        time: u64,
        handler: &mut H,
    ) -> Option<NodeId>
    where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        let mut target = None;
        for _ in 0..MAX_RESOLVE_ROUNDS {
            let (inside, hit) = self.hit(tree, x, y);
            if hit.is_some() {
                self.last_known = hit;
            }
            target = hit;
            let transitions = self.hover.update(inside, hit);
            if transitions.is_empty() {
                return target;
            }
            for transition in transitions {
                match transition {
                    HoverEvent::Exit(old) => {
                        trace!(target = ?old, "exit");
                        self.deliver(tree, old, PointerEventKind::Exited, x, y, time, handler);
                    }
                    HoverEvent::Enter(new) => {
                        trace!(target = ?new, "enter");
                        self.deliver(tree, new, PointerEventKind::Entered, x, y, time, handler);
                    }
                }
            }
        }
        debug!(host = ?self.host, ?target, "target did not settle after enter/exit handlers");
        target
    }

    /// `target` or its nearest ancestor inside the host subscribed to `category`.
    fn subscriber_for(&self, tree: &Tree, target: NodeId, category: EventMask) -> Option<NodeId> {
        let mut current = Some(target);
        while let Some(id) = current {
            if tree.has_subscribers_for(id, category) {
                return Some(id);
            }
            if id == self.host {
                break;
            }
            current = tree.parent_of(id);
        }
        None
    }

    /// Retarget and hand one event to the handler, unless the target went away.
    fn deliver<H>(
        &self,
        tree: &mut Tree,
        target: NodeId,
        kind: PointerEventKind,
        x: i32,
        y: i32,
        time: u64,
        handler: &mut H,
    ) -> bool
    where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        let Some((x, y)) = tree.point_from_ancestor(self.host, target, x, y) else {
            trace!(?target, ?kind, "target left the host, dropped");
            return false;
        };
        if !tree.flags(target).is_some_and(|f| f.contains(NodeFlags::ENABLED)) {
            trace!(?target, ?kind, "target disabled, dropped");
            return false;
        }
        let event = PointerEvent {
            target,
            host: self.host,
            kind,
            x,
            y,
            buttons: self.held,
            time,
        };
        handler(tree, &event);
        true
    }
}

/// Rounds of enter/exit delivery before `track` stops re-resolving.
const MAX_RESOLVE_ROUNDS: usize = 4;

fn point(x: i32, y: i32) -> Point {
    Point::new(f64::from(x), f64::from(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{vec, vec::Vec};
    use trellis_tree::{Bounds, Component, TargetFilter};

    use crate::event::PointerEventKind::*;

    const L: PointerButton = PointerButton::Primary;
    const CLICK: PointerEventKind = Clicked {
        button: L,
        count: 1,
    };

    /// host (0,0,200,100)
    ///   a (10,10,50,30)
    ///   b (100,10,50,30)
    struct Scene {
        tree: Tree,
        host: NodeId,
        a: NodeId,
        b: NodeId,
        d: PointerDispatcher,
        log: Vec<(NodeId, PointerEventKind)>,
    }

    /// A 50x30 pointer subscriber at `(x, 10)`.
    fn tile(x: i32) -> Component {
        Component::with_bounds(Bounds::new(x, 10, 50, 30))
            .listening(EventMask::MOUSE | EventMask::MOUSE_MOTION | EventMask::MOUSE_WHEEL)
    }

    impl Scene {
        fn new() -> Self {
            Self::with_config(DispatcherConfig::default())
        }

        fn with_config(config: DispatcherConfig) -> Self {
            let mut tree = Tree::new();
            let host = tree.insert_container(
                Component {
                    flags: NodeFlags::default() | NodeFlags::TOP_LEVEL,
                    ..Component::with_bounds(Bounds::new(0, 0, 200, 100))
                },
                None,
            );
            let a = tree.insert_leaf(tile(10));
            let b = tree.insert_leaf(tile(100));
            tree.add(host, a, None).unwrap();
            tree.add(host, b, None).unwrap();
            let d = PointerDispatcher::new(host, config);
            Self {
                tree,
                host,
                a,
                b,
                d,
                log: Vec::new(),
            }
        }

        fn send(&mut self, kind: InputKind, x: i32, y: i32, time: u64) {
            let log = &mut self.log;
            self.d.dispatch(
                &mut self.tree,
                PointerInput::new(kind, x, y, time),
                |_, e| log.push((e.target, e.kind)),
            );
        }

        fn take(&mut self) -> Vec<(NodeId, PointerEventKind)> {
            core::mem::take(&mut self.log)
        }
    }

    #[test]
    fn moving_across_targets_pairs_exit_before_enter() {
        let mut s = Scene::new();
        s.send(InputKind::Moved, 20, 20, 0);
        s.send(InputKind::Moved, 110, 20, 1);
        s.send(InputKind::Moved, 80, 20, 2);
        let (a, b) = (s.a, s.b);
        assert_eq!(
            s.take(),
            vec![
                (a, Entered),
                (a, Moved),
                (a, Exited),
                (b, Entered),
                (b, Moved),
                (b, Exited),
            ]
        );
        assert_eq!(s.d.state(), DispatchState::Hovering);
        assert_eq!(s.d.hovered(), None);
    }

    #[test]
    fn events_are_retargeted_to_local_coordinates() {
        let mut s = Scene::new();
        let mut seen = Vec::new();
        s.d.dispatch(
            &mut s.tree,
            PointerInput::new(InputKind::Moved, 105, 15, 0),
            |_, e| seen.push((e.kind, e.x, e.y, e.host)),
        );
        assert_eq!(seen, vec![(Entered, 5, 5, s.host), (Moved, 5, 5, s.host)]);
    }

    #[test]
    fn grab_holds_while_dragging_elsewhere() {
        let mut s = Scene::new();
        s.send(InputKind::Pressed(L), 20, 20, 0);
        assert_eq!(s.d.state(), DispatchState::Grabbed);
        assert_eq!(s.d.grab_target(), Some(s.a));
        s.take();

        s.send(InputKind::Moved, 120, 20, 10);
        s.send(InputKind::Moved, 500, 500, 20);
        let (a, b) = (s.a, s.b);
        assert_eq!(
            s.take(),
            vec![
                (a, Exited),
                (b, Entered),
                (a, Dragged),
                (b, Exited),
                (a, Dragged),
            ]
        );
        assert_eq!(s.d.grab_target(), Some(a));

        s.send(InputKind::Released(L), 500, 500, 30);
        assert_eq!(s.take(), vec![(a, Released(L))]);
        assert_eq!(s.d.state(), DispatchState::Idle);
        assert_eq!(s.d.grab_target(), None);
    }

    #[test]
    fn click_requires_release_over_press_target() {
        let mut s = Scene::new();
        let (a, b) = (s.a, s.b);
        s.send(InputKind::Pressed(L), 20, 20, 0);
        s.send(InputKind::Released(L), 25, 20, 10);
        let events = s.take();
        assert_eq!(
            &events[events.len() - 2..],
            &[(a, Released(L)), (a, CLICK)]
        );

        s.send(InputKind::Pressed(L), 20, 20, 2_000);
        s.send(InputKind::Moved, 110, 20, 2_010);
        s.send(InputKind::Released(L), 110, 20, 2_020);
        let events = s.take();
        assert!(!events.iter().any(|(_, k)| matches!(k, Clicked { .. })));
        assert!(events.contains(&(a, Released(L))));
        assert_eq!(s.d.hovered(), Some(b));
    }

    #[test]
    fn click_survives_leaving_and_returning_to_press_target() {
        let mut s = Scene::new();
        let a = s.a;
        s.send(InputKind::Pressed(L), 20, 20, 0);
        s.send(InputKind::Moved, 80, 20, 5);
        s.send(InputKind::Moved, 25, 20, 10);
        s.send(InputKind::Released(L), 25, 20, 15);
        assert_eq!(
            s.take(),
            vec![
                (a, Entered),
                (a, Pressed(L)),
                (a, Exited),
                (a, Dragged),
                (a, Entered),
                (a, Dragged),
                (a, Released(L)),
                (a, CLICK),
            ]
        );
    }

    #[test]
    fn click_tolerance_from_config() {
        let config = DispatcherConfig::default()
            .with_click_tolerance(Some(10.0), Some(200));
        let mut s = Scene::with_config(config);
        let a = s.a;

        // Released just past the right edge of `a`, within tolerance.
        s.send(InputKind::Pressed(L), 55, 20, 0);
        s.send(InputKind::Released(L), 62, 20, 50);
        let events = s.take();
        assert!(events.contains(&(a, CLICK)));

        // Strayed too far before coming back near.
        s.send(InputKind::Pressed(L), 55, 20, 1_000);
        s.send(InputKind::Moved, 80, 20, 1_010);
        s.send(InputKind::Released(L), 62, 20, 1_020);
        assert!(!s.take().iter().any(|(_, k)| matches!(k, Clicked { .. })));

        // Held longer than the time tolerance.
        s.send(InputKind::Pressed(L), 55, 20, 2_000);
        s.send(InputKind::Released(L), 62, 20, 2_500);
        assert!(!s.take().iter().any(|(_, k)| matches!(k, Clicked { .. })));
    }

    #[test]
    fn enabled_only_filter_skips_disabled_targets() {
        let config = DispatcherConfig::default()
            .with_filter(TargetFilter::new().enabled_only());
        let mut s = Scene::with_config(config);
        s.tree.set_flags(s.a, NodeFlags::VISIBLE);
        s.send(InputKind::Moved, 20, 20, 0);
        assert!(s.take().is_empty());
        assert_eq!(s.d.hovered(), None);
        assert_eq!(s.d.state(), DispatchState::Hovering);
    }

    #[test]
    fn target_swapped_by_enter_handler_is_resolved_again() {
        let mut s = Scene::new();
        let (host, a) = (s.host, s.a);
        let mut replacement = None;
        let mut seen = Vec::new();
        let mut swap = |tree: &mut Tree, e: &PointerEvent| {
            seen.push((e.target, e.kind));
            if e.target == a && e.kind == Entered {
                tree.remove_child(host, a).unwrap();
                let c = tree.insert_leaf(tile(10));
                tree.add(host, c, None).unwrap();
                replacement = Some(c);
            }
        };
        let inputs = [
            (InputKind::Moved, 20, 0),
            (InputKind::Pressed(L), 20, 5),
            (InputKind::Moved, 25, 10),
            (InputKind::Released(L), 25, 15),
        ];
        for (kind, x, time) in inputs {
            let input = PointerInput::new(kind, x, 20, time);
            s.d.dispatch(&mut s.tree, input, &mut swap);
        }

        let c = replacement.unwrap();
        assert_eq!(
            seen,
            vec![
                // The exit to the detached `a` is dropped.
                (a, Entered),
                (c, Entered),
                (c, Moved),
                (c, Pressed(L)),
                (c, Dragged),
                (c, Released(L)),
                (c, CLICK),
            ]
        );
        assert_eq!(s.d.hovered(), Some(c));
        assert_eq!(s.d.grab_target(), None);
    }

    #[test]
    fn double_click_counts() {
        let mut s = Scene::new();
        for t in [0, 100] {
            s.send(InputKind::Pressed(L), 20, 20, t);
            s.send(InputKind::Released(L), 20, 20, t + 10);
        }
        let clicks: Vec<_> = s
            .take()
            .into_iter()
            .filter_map(|(_, k)| match k {
                Clicked { count, .. } => Some(count),
                _ => None,
            })
            .collect();
        assert_eq!(clicks, vec![1, 2]);
    }

    #[test]
    fn grab_lasts_until_last_button_released() {
        let mut s = Scene::new();
        let a = s.a;
        s.send(InputKind::Pressed(L), 20, 20, 0);
        s.send(InputKind::Moved, 110, 20, 5);
        s.send(InputKind::Pressed(PointerButton::Secondary), 110, 20, 10);
        assert_eq!(s.d.grab_target(), Some(a));
        s.send(InputKind::Released(L), 110, 20, 20);
        assert_eq!(s.d.state(), DispatchState::Grabbed);
        s.take();

        s.send(InputKind::Moved, 115, 20, 30);
        assert_eq!(s.take(), vec![(a, Dragged)]);
        s.send(InputKind::Released(PointerButton::Secondary), 115, 20, 40);
        assert_eq!(s.d.state(), DispatchState::Hovering);
        assert_eq!(s.d.grab_target(), None);
    }

    #[test]
    fn wheel_goes_under_pointer_not_to_grab() {
        let mut s = Scene::new();
        let b = s.b;
        s.send(InputKind::Pressed(L), 20, 20, 0);
        s.send(InputKind::Moved, 110, 20, 5);
        s.take();
        s.send(InputKind::Wheel { delta: 3 }, 110, 20, 6);
        assert_eq!(s.take(), vec![(b, Wheel { delta: 3 })]);
    }

    #[test]
    fn motion_needs_a_motion_subscriber() {
        let mut s = Scene::new();
        let a = s.a;
        s.tree.set_event_mask(a, EventMask::MOUSE);
        s.send(InputKind::Moved, 20, 20, 0);
        assert_eq!(s.take(), vec![(a, Entered)]);

        // An ancestor subscribed to motion is enough.
        s.tree.set_event_mask(s.host, EventMask::MOUSE_MOTION);
        s.send(InputKind::Moved, 21, 20, 1);
        assert_eq!(s.take(), vec![(a, Moved)]);
    }

    #[test]
    fn wheel_bubbles_to_nearest_wheel_subscriber() {
        let mut s = Scene::new();
        let (host, a) = (s.host, s.a);
        s.tree.set_event_mask(a, EventMask::MOUSE);
        s.send(InputKind::Moved, 20, 20, 0);
        s.take();
        s.send(InputKind::Wheel { delta: -1 }, 20, 20, 1);
        assert!(s.take().is_empty());

        s.tree.set_event_mask(host, EventMask::MOUSE_WHEEL);
        s.send(InputKind::Wheel { delta: -1 }, 20, 20, 2);
        assert_eq!(s.take(), vec![(host, Wheel { delta: -1 })]);
    }

    #[test]
    fn last_known_target_survives_moving_off() {
        let mut s = Scene::new();
        let a = s.a;
        s.send(InputKind::Moved, 20, 20, 0);
        s.send(InputKind::Moved, 80, 20, 1);
        assert_eq!(s.d.hovered(), None);
        assert_eq!(s.d.last_known_target(), Some(a));

        // A stray release over empty space goes to it.
        s.take();
        s.send(InputKind::Released(L), 80, 20, 2);
        assert_eq!(s.take(), vec![(a, Released(L))]);
    }

    #[test]
    fn host_exit_exits_last_target() {
        let mut s = Scene::new();
        let a = s.a;
        s.send(InputKind::Moved, 20, 20, 0);
        s.take();
        s.send(InputKind::Exited, 20, 20, 1);
        assert_eq!(s.take(), vec![(a, Exited)]);
        assert_eq!(s.d.state(), DispatchState::Idle);
        s.send(InputKind::Exited, 20, 20, 2);
        assert!(s.take().is_empty());
    }

    #[test]
    fn target_removed_by_handler_is_dropped_silently() {
        let mut s = Scene::new();
        let (host, a) = (s.host, s.a);
        let mut seen = Vec::new();
        s.d.dispatch(
            &mut s.tree,
            PointerInput::new(InputKind::Pressed(L), 20, 20, 0),
            |tree: &mut Tree, e: &PointerEvent| {
                seen.push((e.target, e.kind));
                if e.kind == Pressed(L) {
                    tree.remove_child(host, a).unwrap();
                }
            },
        );
        s.d.dispatch(
            &mut s.tree,
            PointerInput::new(InputKind::Released(L), 20, 20, 10),
            |_: &mut Tree, e: &PointerEvent| seen.push((e.target, e.kind)),
        );
        // Release and click to the detached grab target are dropped.
        assert_eq!(seen, vec![(a, Entered), (a, Pressed(L))]);
        assert_eq!(s.d.state(), DispatchState::Hovering);
    }

    #[test]
    fn disabled_targets_occlude_but_receive_nothing() {
        let mut s = Scene::new();
        s.tree.set_flags(s.a, NodeFlags::VISIBLE);
        s.send(InputKind::Moved, 20, 20, 0);
        assert!(s.take().is_empty());
        assert_eq!(s.d.hovered(), Some(s.a));
    }

    #[test]
    fn resize_reruns_comparison() {
        let mut s = Scene::new();
        let a = s.a;
        s.send(InputKind::Moved, 20, 20, 0);
        s.take();
        s.tree.set_bounds(a, Bounds::new(40, 10, 50, 30));
        s.tree.set_bounds(s.host, Bounds::new(0, 0, 150, 100));
        let log = &mut s.log;
        s.d.on_host_resized(&mut s.tree, 5, |_, e| log.push((e.target, e.kind)));
        assert_eq!(s.take(), vec![(a, Exited)]);
    }

    #[test]
    fn disposed_host_ignores_input() {
        let mut s = Scene::new();
        let host = s.host;
        s.send(InputKind::Moved, 20, 20, 0);
        s.take();
        s.tree.dispose(host);
        s.send(InputKind::Moved, 110, 20, 1);
        assert!(s.take().is_empty());
        assert!(s.d.is_disposed());
        assert_eq!(s.d.state(), DispatchState::Idle);
    }
}
