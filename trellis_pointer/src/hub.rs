// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag broadcast channel between the dispatchers of one session.
//!
//! While a dispatcher holds a grab, the pointer may travel over other hosts.
//! Those hosts never see the native motion, so the grabbing dispatcher
//! publishes each drag position here in screen coordinates and every other
//! subscriber updates its enter/exit state from it.

use alloc::collections::VecDeque;

use smallvec::SmallVec;
use tracing::trace;
use trellis_tree::NodeId;

/// A drag position published by the host holding the grab.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DragOver {
    /// Host whose dispatcher is grabbed.
    pub source: NodeId,
    /// Horizontal position in screen coordinates.
    pub screen_x: i32,
    /// Vertical position in screen coordinates.
    pub screen_y: i32,
    /// Timestamp in milliseconds.
    pub time: u64,
}

/// Subscriber list and pending message queue, processed in arrival order.
#[derive(Clone, Debug, Default)]
pub struct DragBroadcastHub {
    subscribers: SmallVec<[NodeId; 4]>,
    pending: VecDeque<DragOver>,
}

impl DragBroadcastHub {
    /// An empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a host. Returns `false` if it already was.
    pub fn subscribe(&mut self, host: NodeId) -> bool {
        if self.subscribers.contains(&host) {
            return false;
        }
        self.subscribers.push(host);
        true
    }

    /// Unsubscribe a host and drop the messages it published but nobody
    /// received yet. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, host: NodeId) -> bool {
        let Some(pos) = self.subscribers.iter().position(|&h| h == host) else {
            return false;
        };
        self.subscribers.remove(pos);
        self.pending.retain(|m| m.source != host);
        true
    }

    /// Whether `host` is subscribed.
    pub fn is_subscribed(&self, host: NodeId) -> bool {
        self.subscribers.contains(&host)
    }

    /// Subscribed hosts in subscription order.
    pub fn subscribers(&self) -> &[NodeId] {
        &self.subscribers
    }

    /// Queue a message. Messages from unsubscribed hosts are dropped.
    pub fn publish(&mut self, message: DragOver) {
        if !self.is_subscribed(message.source) {
            trace!(source = ?message.source, "drag from unsubscribed host dropped");
            return;
        }
        self.pending.push_back(message);
    }

    /// Take the oldest pending message.
    pub fn next_pending(&mut self) -> Option<DragOver> {
        self.pending.pop_front()
    }

    /// Subscribers that should receive `message`: everyone except its source.
    pub fn recipients(&self, message: &DragOver) -> SmallVec<[NodeId; 4]> {
        self.subscribers
            .iter()
            .copied()
            .filter(|&h| h != message.source)
            .collect()
    }
}
