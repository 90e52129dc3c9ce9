// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Enter/exit tracking for a single host.

use smallvec::SmallVec;
use trellis_tree::NodeId;

/// A single enter or exit transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent {
    /// The pointer left this component.
    Exit(NodeId),
    /// The pointer entered this component.
    Enter(NodeId),
}

/// Remembers which component the pointer is over and whether it is inside the host.
///
/// Only the single innermost target is tracked; containers between it and the
/// host are not entered separately.
#[derive(Clone, Debug, Default)]
pub struct HoverTracker {
    last_entered: Option<NodeId>,
    inside_host: bool,
}

impl HoverTracker {
    /// A tracker with the pointer outside the host.
    pub fn new() -> Self {
        Self::default()
    }

    /// The component that last received an enter without a matching exit.
    pub fn current(&self) -> Option<NodeId> {
        self.last_entered
    }

    /// Whether the pointer is inside the host surface.
    pub fn inside_host(&self) -> bool {
        self.inside_host
    }

    /// Compare the newly resolved target with the last one.
    ///
    /// Returns the exit for the old target, if any, followed by the enter for the
    /// new one. Returns nothing if the target did not change.
    pub fn update(
        &mut self,
        inside_host: bool,
        target: Option<NodeId>,
    ) -> SmallVec<[HoverEvent; 2]> {
        self.inside_host = inside_host;
        let target = if inside_host { target } else { None };
        let mut out = SmallVec::new();
        if target == self.last_entered {
            return out;
        }
        if let Some(old) = self.last_entered.take() {
            out.push(HoverEvent::Exit(old));
        }
        if let Some(new) = target {
            out.push(HoverEvent::Enter(new));
        }
        self.last_entered = target;
        out
    }

    /// The pointer left the host: exit the last target and forget it.
    pub fn exit_host(&mut self) -> Option<HoverEvent> {
        self.inside_host = false;
        self.last_entered.take().map(HoverEvent::Exit)
    }

    /// Forget everything without producing transitions.
    pub fn clear(&mut self) {
        self.last_entered = None;
        self.inside_host = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_tree::{Component, Tree};

    #[test]
    fn exit_precedes_enter() {
        let mut tree = Tree::new();
        let a = tree.insert_leaf(Component::default());
        let b = tree.insert_leaf(Component::default());
        let mut hover = HoverTracker::new();

        assert_eq!(hover.update(true, Some(a)).as_slice(), &[HoverEvent::Enter(a)]);
        assert!(hover.update(true, Some(a)).is_empty());
        assert_eq!(
            hover.update(true, Some(b)).as_slice(),
            &[HoverEvent::Exit(a), HoverEvent::Enter(b)]
        );
        assert_eq!(hover.update(true, None).as_slice(), &[HoverEvent::Exit(b)]);
        assert_eq!(hover.current(), None);
    }

    #[test]
    fn outside_host_means_no_target() {
        let mut tree = Tree::new();
        let a = tree.insert_leaf(Component::default());
        let mut hover = HoverTracker::new();
        hover.update(true, Some(a));

        assert_eq!(hover.update(false, Some(a)).as_slice(), &[HoverEvent::Exit(a)]);
        assert!(!hover.inside_host());

        hover.update(true, Some(a));
        assert_eq!(hover.exit_host(), Some(HoverEvent::Exit(a)));
        assert_eq!(hover.exit_host(), None);
    }
}
