// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A set of hosts sharing one pointer.

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};
use trellis_tree::{NodeId, Tree, TreeError};

use crate::config::DispatcherConfig;
use crate::dispatcher::{DispatchState, PointerDispatcher};
use crate::event::{InputKind, PointerEvent, PointerInput};
use crate::hub::{DragBroadcastHub, DragOver};

/// Owns one [`PointerDispatcher`] per host and the [`DragBroadcastHub`] that
/// connects them.
///
/// Raw input is routed to the dispatcher of the host it arrived on. While that
/// dispatcher holds a grab, each motion is republished in screen coordinates,
/// and every other host runs its enter/exit comparison against it.
#[derive(Debug, Default)]
pub struct Session {
    hub: DragBroadcastHub,
    dispatchers: HashMap<NodeId, PointerDispatcher>,
}

impl Session {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher for `host` and subscribe it to drag broadcasts.
    ///
    /// Re-attaching a host replaces its dispatcher with a fresh one.
    pub fn attach_host(
        &mut self,
        tree: &Tree,
        host: NodeId,
        config: DispatcherConfig,
    ) -> Result<(), TreeError> {
        if !tree.is_alive(host) {
            return Err(TreeError::StaleNode(host));
        }
        if !tree.is_container(host) {
            return Err(TreeError::NotAContainer(host));
        }
        self.dispatchers
            .insert(host, PointerDispatcher::new(host, config));
        self.hub.subscribe(host);
        debug!(?host, "host attached");
        Ok(())
    }

    /// Dispose the dispatcher of `host` and unsubscribe it.
    ///
    /// Returns `false` if the host was not attached.
    pub fn detach_host(&mut self, host: NodeId) -> bool {
        let Some(mut dispatcher) = self.dispatchers.remove(&host) else {
            return false;
        };
        dispatcher.on_host_disposed();
        self.hub.unsubscribe(host);
        debug!(?host, "host detached");
        true
    }

    /// The dispatcher of `host`.
    pub fn dispatcher(&self, host: NodeId) -> Option<&PointerDispatcher> {
        self.dispatchers.get(&host)
    }

    /// The broadcast hub.
    pub fn hub(&self) -> &DragBroadcastHub {
        &self.hub
    }

    /// Attached hosts, in attachment order.
    pub fn hosts(&self) -> &[NodeId] {
        self.hub.subscribers()
    }

    /// Route raw input that arrived on `host`.
    ///
    /// `handler` sees the events of `host` first, then the enter/exit events
    /// other hosts derive from the broadcast drag.
    pub fn dispatch<H>(
        &mut self,
        tree: &mut Tree,
        host: NodeId,
        input: PointerInput,
        mut handler: H,
    ) where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        let Some(dispatcher) = self.dispatchers.get_mut(&host) else {
            trace!(?host, "input for unknown host dropped");
            return;
        };
        dispatcher.dispatch(tree, input, &mut handler);

        if input.kind == InputKind::Moved && dispatcher.state() == DispatchState::Grabbed {
            if let Some((ox, oy)) = dispatcher.screen_origin(tree) {
                self.hub.publish(DragOver {
                    source: host,
                    screen_x: input.x.saturating_add(ox),
                    screen_y: input.y.saturating_add(oy),
                    time: input.time,
                });
            }
        }
        self.pump(tree, &mut handler);
        self.prune(tree);
    }

    /// `host` changed size or position.
    pub fn on_host_resized<H>(&mut self, tree: &mut Tree, host: NodeId, time: u64, handler: H)
    where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        if let Some(dispatcher) = self.dispatchers.get_mut(&host) {
            dispatcher.on_host_resized(tree, time, handler);
        }
    }

    /// Detach every host that is no longer alive in `tree`.
    pub fn prune(&mut self, tree: &Tree) {
        let gone: SmallVec<[NodeId; 4]> = self
            .dispatchers
            .iter()
            .filter(|(host, d)| d.is_disposed() || !tree.is_alive(**host))
            .map(|(host, _)| *host)
            .collect();
        for host in gone {
            self.detach_host(host);
        }
    }

    /// Deliver pending drag broadcasts in arrival order.
    fn pump<H>(&mut self, tree: &mut Tree, handler: &mut H)
    where
        H: FnMut(&mut Tree, &PointerEvent),
    {
        while let Some(message) = self.hub.next_pending() {
            for host in self.hub.recipients(&message) {
                if let Some(dispatcher) = self.dispatchers.get_mut(&host) {
                    dispatcher.on_foreign_drag(tree, &message, &mut *handler);
                }
            }
        }
    }
}
