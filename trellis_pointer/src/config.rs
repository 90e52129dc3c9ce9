// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher configuration.

use trellis_tree::TargetFilter;

use crate::click::DEFAULT_MULTI_CLICK_INTERVAL;

/// Tunables for a [`PointerDispatcher`](crate::PointerDispatcher).
///
/// The default resolves targets among pointer subscribers, synthesizes clicks
/// only when press and release land on the same component, and counts clicks
/// pressed within 500 ms of the previous one.
#[derive(Clone, Copy, Debug)]
pub struct DispatcherConfig {
    /// Which components may become targets.
    pub filter: TargetFilter,
    /// Distance tolerance for clicks released over a different component.
    pub click_distance: Option<f64>,
    /// Time tolerance (ms) for clicks released over a different component.
    pub click_time: Option<u64>,
    /// Maximum gap (ms) between consecutive clicks to count as a multi-click.
    pub multi_click_interval: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            filter: TargetFilter::default(),
            click_distance: None,
            click_time: None,
            multi_click_interval: DEFAULT_MULTI_CLICK_INTERVAL,
        }
    }
}

impl DispatcherConfig {
    /// Builder-style helper to replace the target filter.
    pub fn with_filter(mut self, filter: TargetFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Builder-style helper to set click tolerances.
    pub fn with_click_tolerance(mut self, distance: Option<f64>, time: Option<u64>) -> Self {
        self.click_distance = distance;
        self.click_time = time;
        self
    }
}
