// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A vertical column layout driven by the tree's validity tracking.
//!
//! Shows the layout seam, z-order changes, and the notifications a toolkit
//! would forward to its listeners.
//!
//! Run:
//! - `cargo run -p trellis_demos --example column_layout`

use std::any::Any;

use tracing_subscriber::EnvFilter;
use trellis_tree::{Bounds, Component, EventMask, LayoutStrategy, NodeId, Tree};

/// Stacks children top to bottom; `u32` constraints give a row height.
#[derive(Default)]
struct Column {
    heights: Vec<(NodeId, i32)>,
}

impl LayoutStrategy for Column {
    fn add_child(&mut self, child: NodeId, constraints: Option<&dyn Any>) {
        let height = constraints
            .and_then(|c| c.downcast_ref::<u32>())
            .map_or(20, |&h| i32::try_from(h).unwrap_or(i32::MAX));
        self.heights.push((child, height));
    }

    fn remove_child(&mut self, child: NodeId) {
        self.heights.retain(|(c, _)| *c != child);
    }

    fn layout_container(&mut self, tree: &mut Tree, container: NodeId) {
        let width = tree.bounds(container).map_or(0, |b| b.width);
        let mut y = 0;
        // Paint order is bottom to top, so stack in that order.
        let children: Vec<_> = tree.children_bottom_to_top(container).collect();
        for child in children {
            let height = self
                .heights
                .iter()
                .find(|(c, _)| *c == child)
                .map_or(20, |(_, h)| *h);
            tree.set_bounds(child, Bounds::new(0, y, width, height));
            y += height;
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut tree = Tree::new();
    let column = tree.insert_container(
        Component::with_bounds(Bounds::new(0, 0, 100, 200)).listening(EventMask::CONTAINER),
        Some(Box::new(Column::default())),
    );
    let rows: Vec<_> = [10_u32, 30, 20]
        .into_iter()
        .map(|h| {
            let row = tree.insert_leaf(Component::default().listening(EventMask::HIERARCHY));
            tree.add_with_constraints(column, row, None, Some(&h))
                .expect("rows are fresh leaves");
            row
        })
        .collect();

    tree.validate(column);
    print_rows(&tree, column);

    tree.move_to_index(column, rows[2], 0)
        .expect("row is a child of the column");
    tree.validate(column);
    print_rows(&tree, column);

    println!("notifications:");
    for note in tree.drain_notifications() {
        println!("  {note:?}");
    }
}

fn print_rows(tree: &Tree, column: NodeId) {
    println!("column (valid: {}):", tree.is_valid(column));
    for child in tree.children_top_to_bottom(column) {
        println!("  {child:?} -> {:?}", tree.bounds(child));
    }
}
