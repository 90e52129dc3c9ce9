// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag from one window into another.
//!
//! Two top-level hosts share a `Session`. A press in the left window grabs a
//! tile there; as the pointer travels into the right window, the left
//! dispatcher keeps delivering drags to the grabbed tile while the right one
//! reports enter/exit for whatever is under the pointer.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p trellis_demos --example two_window_drag`

use tracing_subscriber::EnvFilter;
use trellis_pointer::{DispatcherConfig, InputKind, PointerButton, PointerInput, Session};
use trellis_tree::{Bounds, Component, EventMask, NodeFlags, NodeId, Tree};

type Names = Vec<(NodeId, &'static str)>;

fn window(tree: &mut Tree, x: i32, tiles: &[(i32, &'static str)], names: &mut Names) -> NodeId {
    let host = tree.insert_container(
        Component {
            flags: NodeFlags::default() | NodeFlags::TOP_LEVEL,
            ..Component::with_bounds(Bounds::new(x, 0, 120, 80))
        },
        None,
    );
    for &(tx, name) in tiles {
        let tile = tree.insert_leaf(
            Component::with_bounds(Bounds::new(tx, 20, 40, 40))
                .listening(EventMask::MOUSE | EventMask::MOUSE_MOTION),
        );
        tree.add(host, tile, None)
            .expect("fresh tile into fresh window");
        names.push((tile, name));
    }
    host
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut tree = Tree::new();
    let mut names = Vec::new();
    let left = window(&mut tree, 0, &[(10, "red"), (70, "green")], &mut names);
    let right = window(&mut tree, 200, &[(10, "blue"), (70, "yellow")], &mut names);

    let mut session = Session::new();
    for host in [left, right] {
        session
            .attach_host(&tree, host, DispatcherConfig::default())
            .expect("hosts are live containers");
    }

    let name_of = |id: NodeId| {
        names
            .iter()
            .find(|(n, _)| *n == id)
            .map_or("?", |(_, name)| *name)
    };

    // Native input as the left window would report it while captured.
    let script = [
        InputKind::Moved,
        InputKind::Pressed(PointerButton::Primary),
        InputKind::Moved,
        InputKind::Moved,
        InputKind::Moved,
        InputKind::Released(PointerButton::Primary),
    ];
    let path = [(20, 30), (20, 30), (90, 30), (220, 30), (280, 30), (280, 30)];

    for (time, (kind, (x, y))) in script.into_iter().zip(path).enumerate() {
        println!("-- {kind:?} at ({x}, {y})");
        session.dispatch(
            &mut tree,
            left,
            PointerInput::new(kind, x, y, time as u64 * 16),
            |_, e| {
                let window = if e.host == left { "left" } else { "right" };
                println!(
                    "   {window:>5} {:<7} {:?} at ({}, {})",
                    name_of(e.target),
                    e.kind,
                    e.x,
                    e.y
                );
            },
        );
    }
}
