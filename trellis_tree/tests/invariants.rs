// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural invariants under long mutation sequences.

use trellis_tree::{Bounds, Component, EventMask, NodeId, TargetFilter, Tree, TreeError};

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }

    fn mask(&mut self) -> EventMask {
        EventMask::from_bits_truncate(self.next() as u16 & 0b11_1111)
    }
}

fn populate(tree: &mut Tree, rng: &mut Lcg) -> Vec<NodeId> {
    let mut ids = Vec::new();
    for i in 0..48 {
        let local = Component::with_bounds(Bounds::new(0, 0, 10, 10)).listening(rng.mask());
        let id = if i % 3 == 0 {
            tree.insert_leaf(local)
        } else {
            tree.insert_container(local, None)
        };
        ids.push(id);
    }
    ids
}

fn roots(tree: &Tree, ids: &[NodeId]) -> Vec<NodeId> {
    ids.iter()
        .copied()
        .filter(|&id| tree.is_alive(id) && tree.parent_of(id).is_none())
        .collect()
}

#[test]
fn counters_match_recount_after_random_mutations() {
    let mut tree = Tree::new();
    let mut rng = Lcg(0x5eed);
    let ids = populate(&mut tree, &mut rng);

    for step in 0..2_000 {
        let a = ids[rng.below(ids.len())];
        let b = ids[rng.below(ids.len())];
        match rng.below(6) {
            0 | 1 => {
                let len = tree.component_count(a);
                let index = (rng.below(3) == 0).then(|| rng.below(len + 2));
                let _ = tree.add(a, b, index);
            }
            2 => {
                if let Some(parent) = tree.parent_of(b) {
                    tree.remove_child(parent, b).unwrap();
                }
            }
            3 => {
                let len = tree.component_count(a);
                let _ = tree.move_to_index(a, b, rng.below(len + 1));
            }
            4 => {
                tree.set_event_mask(b, rng.mask());
            }
            _ => {
                if rng.below(8) == 0 {
                    let _ = tree.remove_all(a);
                }
            }
        }
        if step % 50 == 0 {
            for root in roots(&tree, &ids) {
                assert!(tree.counters_consistent(root), "step {step}");
            }
        }
        tree.drain_notifications().for_each(drop);
    }

    for root in roots(&tree, &ids) {
        assert!(tree.counters_consistent(root));
        if let Some(counters) = tree.counters(root) {
            assert_eq!(Some(counters), tree.recount(root));
        }
    }
}

#[test]
fn no_component_is_its_own_ancestor() {
    let mut tree = Tree::new();
    let mut rng = Lcg(42);
    let ids = populate(&mut tree, &mut rng);

    for _ in 0..1_000 {
        let a = ids[rng.below(ids.len())];
        let b = ids[rng.below(ids.len())];
        match tree.add(a, b, None) {
            Ok(()) => {}
            Err(TreeError::AddToSelf) => {
                assert!(a == b || tree.is_ancestor_of(b, a));
            }
            Err(TreeError::NotAContainer(_) | TreeError::IndexOutOfRange { .. }) => {}
            Err(other) => panic!("unexpected error {other}"),
        }
    }

    for &id in &ids {
        let mut seen = 0;
        let mut current = tree.parent_of(id);
        while let Some(p) = current {
            assert_ne!(p, id, "cycle through {id:?}");
            seen += 1;
            assert!(seen <= ids.len());
            current = tree.parent_of(p);
        }
    }
}

#[test]
fn z_order_is_deterministic() {
    let mut tree = Tree::new();
    let root = tree.insert_container(Component::with_bounds(Bounds::new(0, 0, 100, 100)), None);
    let mut stack = Vec::new();
    for _ in 0..5 {
        let id = tree.insert_leaf(
            Component::with_bounds(Bounds::new(0, 0, 100, 100)).listening(EventMask::MOUSE),
        );
        tree.add(root, id, None).unwrap();
        stack.push(id);
    }
    let filter = TargetFilter::new();

    for &id in stack.iter().rev() {
        tree.move_to_index(root, id, 0).unwrap();
        assert_eq!(tree.resolve_target(root, 50, 50, true, &filter), Some(id));
        assert_eq!(tree.index_of(root, id), Some(0));
        assert_eq!(tree.children_top_to_bottom(root).next(), Some(id));
        assert_eq!(tree.children_bottom_to_top(root).last(), Some(id));
    }
    // Repeated queries agree.
    let first = tree.resolve_target(root, 50, 50, true, &filter);
    for _ in 0..10 {
        assert_eq!(tree.resolve_target(root, 50, 50, true, &filter), first);
    }
}

#[test]
fn remove_all_is_atomic_for_ancestors() {
    let mut tree = Tree::new();
    let top = tree.insert_container(Component::default(), None);
    let mid = tree.insert_container(Component::default(), None);
    let panel = tree.insert_container(Component::default(), None);
    tree.add(top, mid, None).unwrap();
    tree.add(mid, panel, None).unwrap();

    let mut rng = Lcg(7);
    for _ in 0..6 {
        let sub = tree.insert_container(Component::default().listening(rng.mask()), None);
        for _ in 0..3 {
            let l = tree.insert_leaf(Component::default().listening(rng.mask()));
            tree.add(sub, l, None).unwrap();
        }
        tree.add(panel, sub, None).unwrap();
    }

    let d = tree.counters(panel).unwrap().descendants;
    let before_top = tree.counters(top).unwrap();
    let before_mid = tree.counters(mid).unwrap();

    let removed = tree.remove_all(panel).unwrap();

    assert_eq!(removed.len(), 6);
    assert_eq!(d, 24);
    assert_eq!(before_top.descendants - tree.counters(top).unwrap().descendants, d);
    assert_eq!(before_mid.descendants - tree.counters(mid).unwrap().descendants, d);
    assert_eq!(tree.counters(panel).unwrap().descendants, 0);
    assert!(tree.counters_consistent(top));
    for sub in removed {
        assert!(tree.counters_consistent(sub));
    }
}
