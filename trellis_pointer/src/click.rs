// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click synthesis from press/release pairs.
//!
//! A click is produced when a button is released over the component it was
//! pressed on. Optionally, a release over a different component can still count
//! when the pointer stayed within a distance and time tolerance, which keeps
//! clicks working on components that move or resize while pressed.
//!
//! ```
//! use kurbo::Point;
//! use trellis_pointer::{ClickResult, ClickTracker, PointerButton};
//! # use trellis_tree::{Component, Tree};
//! # let mut tree = Tree::new();
//! # let button = tree.insert_leaf(Component::default());
//!
//! let mut clicks = ClickTracker::new();
//! clicks.on_down(PointerButton::Primary, Some(button), Point::new(4.0, 4.0), 1_000);
//! let result = clicks.on_up(PointerButton::Primary, Some(button), Point::new(5.0, 4.0), 1_080);
//! assert_eq!(result, ClickResult::Click { target: button, count: 1 });
//! ```
//!
//! ## Rules
//!
//! 1. Same target on press and release: always a click.
//! 2. Different targets: a click on the press target only if a tolerance is
//!    configured, the pointer never strayed beyond the distance tolerance, and
//!    the press did not last longer than the time tolerance.
//! 3. No tolerance configured: different targets never click.
//! 4. Press over nothing, or release without a press: no click.
//!
//! Each button is tracked on its own. Consecutive clicks of the same button on
//! the same target, each pressed within the multi-click interval of the
//! previous click, count up.

use alloc::collections::BTreeMap;

use kurbo::Point;
use trellis_tree::NodeId;

use crate::event::PointerButton;

/// Default multi-click interval in milliseconds.
pub const DEFAULT_MULTI_CLICK_INTERVAL: u64 = 500;

/// Outcome of a release.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClickResult {
    /// Deliver a click to `target`.
    Click {
        /// The press target.
        target: NodeId,
        /// Position in a run of consecutive clicks, starting at 1.
        count: u32,
    },
    /// No click; carries the press target, if there was one.
    Suppressed(Option<NodeId>),
}

#[derive(Copy, Clone, Debug)]
struct Press {
    target: Option<NodeId>,
    down_position: Point,
    down_time: u64,
    distance_exceeded: bool,
}

#[derive(Copy, Clone, Debug)]
struct LastClick {
    target: NodeId,
    button: PointerButton,
    up_time: u64,
    count: u32,
}

/// Per-button press tracking and click counting.
#[derive(Clone, Debug)]
pub struct ClickTracker {
    presses: BTreeMap<PointerButton, Press>,
    /// Distance in pixels a press may travel and still click a different target.
    pub distance_threshold: Option<f64>,
    /// Milliseconds a press may last and still click a different target.
    pub time_threshold: Option<u64>,
    /// Maximum gap in milliseconds between a click and the next press for the
    /// click count to keep growing.
    pub multi_click_interval: u64,
    last_click: Option<LastClick>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ClickTracker {
    /// Strict tracker: only same-target clicks, default multi-click interval.
    pub fn new() -> Self {
        Self::with_thresholds(None, None)
    }

    /// Tracker with tolerance for releases over a different target.
    pub fn with_thresholds(distance_threshold: Option<f64>, time_threshold: Option<u64>) -> Self {
        Self {
            presses: BTreeMap::new(),
            distance_threshold,
            time_threshold,
            multi_click_interval: DEFAULT_MULTI_CLICK_INTERVAL,
            last_click: None,
        }
    }

    /// Record a press. A second press of the same button replaces the first.
    pub fn on_down(
        &mut self,
        button: PointerButton,
        target: Option<NodeId>,
        position: Point,
        time: u64,
    ) {
        self.presses.insert(
            button,
            Press {
                target,
                down_position: position,
                down_time: time,
                distance_exceeded: false,
            },
        );
    }

    /// Record pointer travel for every held button.
    pub fn on_move(&mut self, position: Point) {
        let Some(threshold) = self.distance_threshold else {
            return;
        };
        for press in self.presses.values_mut() {
            if press.down_position.distance(position) > threshold {
                press.distance_exceeded = true;
            }
        }
    }

    /// Resolve a release into a click or a suppression.
    pub fn on_up(
        &mut self,
        button: PointerButton,
        current: Option<NodeId>,
        position: Point,
        time: u64,
    ) -> ClickResult {
        let Some(press) = self.presses.remove(&button) else {
            return ClickResult::Suppressed(None);
        };
        let Some(target) = press.target else {
            return ClickResult::Suppressed(None);
        };

        let same_target = current == Some(target);
        if !same_target && !self.within_tolerance(&press, position, time) {
            return ClickResult::Suppressed(Some(target));
        }

        let count = match self.last_click {
            Some(last)
                if last.target == target
                    && last.button == button
                    && press.down_time.saturating_sub(last.up_time) <= self.multi_click_interval =>
            {
                last.count.saturating_add(1)
            }
            _ => 1,
        };
        self.last_click = Some(LastClick {
            target,
            button,
            up_time: time,
            count,
        });
        ClickResult::Click { target, count }
    }

    fn within_tolerance(&self, press: &Press, position: Point, time: u64) -> bool {
        if self.distance_threshold.is_none() && self.time_threshold.is_none() {
            return false;
        }
        if press.distance_exceeded {
            return false;
        }
        let distance_ok = self
            .distance_threshold
            .is_none_or(|t| press.down_position.distance(position) <= t);
        let time_ok = self
            .time_threshold
            .is_none_or(|t| time.saturating_sub(press.down_time) <= t);
        distance_ok && time_ok
    }

    /// Whether `button` is currently pressed.
    pub fn is_pressed(&self, button: PointerButton) -> bool {
        self.presses.contains_key(&button)
    }

    /// Target of the most recent click.
    pub fn last_click_target(&self) -> Option<NodeId> {
        self.last_click.map(|c| c.target)
    }

    /// Forget every active press. The click count history is kept.
    pub fn clear(&mut self) {
        self.presses.clear();
    }

    /// Forget everything, including the click count history.
    pub fn reset(&mut self) {
        self.presses.clear();
        self.last_click = None;
    }
}
