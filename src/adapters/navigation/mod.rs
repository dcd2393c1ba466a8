//! Navigation adapter backed by a tokio broadcast channel.
//!
//! The host router calls [`BroadcastNavigation::publish`] on every route
//! change; each subscribed controller gets its own receiver.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::models::RouteChange;
use crate::domain::ports::NavigationService;

/// Route changes buffered per subscriber before the slowest one lags.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct BroadcastNavigation {
    sender: broadcast::Sender<RouteChange>,
}

impl Default for BroadcastNavigation {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BroadcastNavigation {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Announce a route change. Returns how many subscribers received it.
    pub fn publish(&self, route: RouteChange) -> usize {
        trace!(route = %route.name, "route changed");
        self.sender.send(route).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NavigationService for BroadcastNavigation {
    fn subscribe(&self) -> broadcast::Receiver<RouteChange> {
        self.sender.subscribe()
    }
}
