//! Host navigation port.

use tokio::sync::broadcast;

use crate::domain::models::RouteChange;

/// Source of route-change notifications.
///
/// Subscribing returns a receiver; dropping it unsubscribes.
pub trait NavigationService: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<RouteChange>;
}
