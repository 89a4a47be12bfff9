//! Auth-state-change channel.
//!
//! DESIGN
//! ======
//! The auth provider's sign-in/out/refresh notifications are fanned out over
//! a `tokio::sync::broadcast` channel. Consumers hold a [`Subscription`]
//! guard; dropping it is the unsubscribe, so a torn-down watcher can never
//! leave a dangling listener behind.

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Change in the provider's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// Publisher side of the auth-state-change channel. Cheap to clone.
#[derive(Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
    next_id: Arc<AtomicU64>,
}

impl AuthEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, next_id: Arc::new(AtomicU64::new(1)) }
    }

    /// Deliver `event` to every live subscription. Returns how many received it.
    pub fn publish(&self, event: AuthEvent) -> usize {
        let delivered = self.tx.send(event).unwrap_or(0);
        debug!(?event, delivered, "auth event published");
        delivered
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(subscription = id, "auth events subscribed");
        Subscription { id, rx: self.tx.subscribe() }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// A live registration on [`AuthEvents`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    rx: broadcast::Receiver<AuthEvent>,
}

impl Subscription {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event. Returns `None` once the publisher is gone.
    ///
    /// A subscriber that fell behind skips the missed events and receives
    /// the next one; since every event triggers a full re-evaluation, only
    /// the latest matters.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(subscription = self.id, skipped, "auth event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(subscription = self.id, "auth events unsubscribed");
    }
}
