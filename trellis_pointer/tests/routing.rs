// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end routing through a session with two windows.

use trellis_pointer::{
    DispatchState, DispatcherConfig, InputKind, PointerButton, PointerEventKind, PointerInput,
    Session,
};
use trellis_tree::{Bounds, Component, EventMask, NodeFlags, NodeId, Tree};

const L: PointerButton = PointerButton::Primary;

/// Two 100x100 windows side by side on screen, 50 px apart.
/// Each holds two 40x40 tiles: at (5, 5) and at (55, 5).
struct Desk {
    tree: Tree,
    session: Session,
    left: NodeId,
    right: NodeId,
    left_tiles: [NodeId; 2],
    right_tiles: [NodeId; 2],
    log: Vec<(NodeId, NodeId, PointerEventKind)>,
}

impl Desk {
    fn new() -> Self {
        let mut tree = Tree::new();
        let mut window = |x: i32| {
            let host = tree.insert_container(
                Component {
                    flags: NodeFlags::default() | NodeFlags::TOP_LEVEL,
                    ..Component::with_bounds(Bounds::new(x, 0, 100, 100))
                },
                None,
            );
            let tiles = [5, 55].map(|tx| {
                let tile = tree.insert_leaf(
                    Component::with_bounds(Bounds::new(tx, 5, 40, 40))
                        .listening(EventMask::MOUSE | EventMask::MOUSE_MOTION),
                );
                tree.add(host, tile, None).unwrap();
                tile
            });
            (host, tiles)
        };
        let (left, left_tiles) = window(0);
        let (right, right_tiles) = window(150);

        let mut session = Session::new();
        session
            .attach_host(&tree, left, DispatcherConfig::default())
            .unwrap();
        session
            .attach_host(&tree, right, DispatcherConfig::default())
            .unwrap();
        Self {
            tree,
            session,
            left,
            right,
            left_tiles,
            right_tiles,
            log: Vec::new(),
        }
    }

    fn send(&mut self, host: NodeId, kind: InputKind, x: i32, y: i32, time: u64) {
        let log = &mut self.log;
        self.session.dispatch(
            &mut self.tree,
            host,
            PointerInput::new(kind, x, y, time),
            |_, e| log.push((e.host, e.target, e.kind)),
        );
    }

    fn take(&mut self) -> Vec<(NodeId, NodeId, PointerEventKind)> {
        std::mem::take(&mut self.log)
    }
}

#[test]
fn every_crossing_pairs_exit_before_enter() {
    let mut desk = Desk::new();
    let left = desk.left;
    // Zig-zag between the two tiles and the gap between them.
    let xs = [20, 47, 70, 47, 20, 70, 20, 99, 20];
    for (t, &x) in xs.iter().enumerate() {
        desk.send(left, InputKind::Moved, x, 20, t as u64);
    }
    desk.send(left, InputKind::Exited, 120, 20, 100);

    let transitions: Vec<_> = desk
        .take()
        .into_iter()
        .filter(|(_, _, k)| matches!(k, PointerEventKind::Entered | PointerEventKind::Exited))
        .collect();
    let enters = transitions
        .iter()
        .filter(|(_, _, k)| *k == PointerEventKind::Entered)
        .count();
    let exits = transitions.len() - enters;
    assert_eq!(enters, exits);

    // Strict alternation: each target is exited before anything else is entered.
    let mut inside: Option<NodeId> = None;
    for (_, target, kind) in transitions {
        match kind {
            PointerEventKind::Entered => {
                assert_eq!(inside, None, "enter before previous exit");
                inside = Some(target);
            }
            PointerEventKind::Exited => {
                assert_eq!(inside, Some(target), "exit without matching enter");
                inside = None;
            }
            _ => unreachable!(),
        }
    }
    assert_eq!(inside, None);
}

#[test]
fn grab_survives_leaving_the_target_and_the_window() {
    let mut desk = Desk::new();
    let (left, [a, b]) = (desk.left, desk.left_tiles);
    desk.send(left, InputKind::Pressed(L), 20, 20, 0);
    desk.take();

    for (t, x) in [(1, 70), (2, 300), (3, -50), (4, 75)] {
        desk.send(left, InputKind::Moved, x, 20, t);
    }
    let drags: Vec<_> = desk
        .take()
        .into_iter()
        .filter(|(_, _, k)| *k == PointerEventKind::Dragged)
        .map(|(_, target, _)| target)
        .collect();
    assert_eq!(drags, vec![a, a, a, a]);

    desk.send(left, InputKind::Released(L), 75, 20, 10);
    let events = desk.take();
    assert_eq!(events.first(), Some(&(left, a, PointerEventKind::Released(L))));
    assert!(
        !events
            .iter()
            .any(|(_, _, k)| matches!(k, PointerEventKind::Clicked { .. }))
    );
    let state = desk.session.dispatcher(left).map(|d| (d.state(), d.hovered()));
    assert_eq!(state, Some((DispatchState::Hovering, Some(b))));
}

#[test]
fn click_only_on_same_target() {
    let mut desk = Desk::new();
    let (left, [a, _]) = (desk.left, desk.left_tiles);
    desk.send(left, InputKind::Pressed(L), 20, 20, 0);
    desk.send(left, InputKind::Moved, 30, 30, 5);
    desk.send(left, InputKind::Released(L), 30, 30, 10);
    let clicks: Vec<_> = desk
        .take()
        .into_iter()
        .filter(|(_, _, k)| matches!(k, PointerEventKind::Clicked { .. }))
        .collect();
    assert_eq!(
        clicks,
        vec![(
            left,
            a,
            PointerEventKind::Clicked {
                button: L,
                count: 1
            }
        )]
    );

    // Tile moves away under the pointer between press and release.
    desk.send(left, InputKind::Pressed(L), 20, 20, 1_000);
    desk.tree.set_bounds(a, Bounds::new(5, 60, 40, 40));
    desk.send(left, InputKind::Released(L), 20, 20, 1_010);
    assert!(
        !desk
            .take()
            .iter()
            .any(|(_, _, k)| matches!(k, PointerEventKind::Clicked { .. }))
    );
}

#[test]
fn click_after_leaving_and_returning_to_the_pressed_tile() {
    let mut desk = Desk::new();
    let (left, [a, _]) = (desk.left, desk.left_tiles);
    desk.send(left, InputKind::Pressed(L), 20, 20, 0);
    // Into the gap between the tiles, then back.
    desk.send(left, InputKind::Moved, 50, 20, 5);
    desk.send(left, InputKind::Moved, 20, 25, 10);
    desk.send(left, InputKind::Released(L), 20, 25, 15);

    let events = desk.take();
    assert!(events.contains(&(left, a, PointerEventKind::Exited)));
    assert_eq!(
        &events[events.len() - 2..],
        &[
            (left, a, PointerEventKind::Released(L)),
            (
                left,
                a,
                PointerEventKind::Clicked {
                    button: L,
                    count: 1
                }
            ),
        ]
    );
}

#[test]
fn drag_across_windows_tracks_enter_exit_on_the_other_host() {
    let mut desk = Desk::new();
    let (left, right) = (desk.left, desk.right);
    let [a, _] = desk.left_tiles;
    let [c, d] = desk.right_tiles;

    desk.send(left, InputKind::Pressed(L), 20, 20, 0);
    desk.take();

    // Screen x = 170 -> right-local 20 (tile c), then 220 -> right-local 70 (tile d).
    desk.send(left, InputKind::Moved, 170, 20, 1);
    desk.send(left, InputKind::Moved, 220, 20, 2);
    // Back into the left window.
    desk.send(left, InputKind::Moved, 20, 20, 3);

    assert_eq!(
        desk.take(),
        vec![
            (left, a, PointerEventKind::Exited),
            (left, a, PointerEventKind::Dragged),
            (right, c, PointerEventKind::Entered),
            (left, a, PointerEventKind::Dragged),
            (right, c, PointerEventKind::Exited),
            (right, d, PointerEventKind::Entered),
            (left, a, PointerEventKind::Entered),
            (left, a, PointerEventKind::Dragged),
            (right, d, PointerEventKind::Exited),
        ]
    );

    // The other window never sees the drag itself.
    let right_state = desk.session.dispatcher(right).map(|d| d.state());
    assert_eq!(right_state, Some(DispatchState::Idle));
}

#[test]
fn no_broadcast_without_grab() {
    let mut desk = Desk::new();
    let left = desk.left;
    desk.send(left, InputKind::Moved, 170, 20, 0);
    assert!(desk.take().is_empty());
}

#[test]
fn disposed_window_drops_out_of_the_session() {
    let mut desk = Desk::new();
    let (left, right) = (desk.left, desk.right);
    desk.tree.dispose(right);
    desk.send(left, InputKind::Pressed(L), 20, 20, 0);
    desk.send(left, InputKind::Moved, 170, 20, 1);
    assert!(desk.take().iter().all(|(host, _, _)| *host == left));
    assert_eq!(desk.session.hosts(), &[left]);
}
