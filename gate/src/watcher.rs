//! Session watcher: keeps a `GateState` current across auth events.
//!
//! DESIGN
//! ======
//! One task per mount. It subscribes to [`AuthEvents`] before the first
//! evaluation (so no event is missed), publishes `Loading`, then re-runs
//! [`SessionResolver::evaluate`] on every event or explicit retry. Events
//! are processed one at a time on that task, so the published state is
//! always the latest completed evaluation.
//!
//! Dropping the [`GateHandle`] aborts the task, which drops its
//! [`crate::events::Subscription`] and unsubscribes.

#[cfg(test)]
#[path = "watcher_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::admin_gate;
use crate::error::GateError;
use crate::events::AuthEvents;
use crate::model::{GateDecision, GateState};
use crate::resolver::SessionResolver;
use crate::store::CachedFlags;
use crate::user_gate;
use crate::verdict::Verdict;

pub struct SessionWatcher;

impl SessionWatcher {
    /// Start watching. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(resolver: SessionResolver, events: &AuthEvents) -> GateHandle {
        let optimistic = CachedFlags::load(resolver.store());
        let mut subscription = events.subscribe();
        let (tx, rx) = watch::channel(GateState::Loading);
        let retry = Arc::new(Notify::new());
        let retry_signal = retry.clone();

        let task = tokio::spawn(async move {
            publish(&tx, resolver.evaluate().await);
            loop {
                tokio::select! {
                    event = subscription.next() => {
                        let Some(event) = event else { break };
                        debug!(?event, "auth event; re-evaluating session");
                    }
                    () = retry_signal.notified() => {
                        debug!("retry requested; re-evaluating session");
                    }
                }
                publish(&tx, resolver.evaluate().await);
            }
            debug!("auth event channel closed; session watcher stopping");
        });

        GateHandle { rx, task, retry, optimistic }
    }
}

fn publish(tx: &watch::Sender<GateState>, result: Result<GateDecision, GateError>) {
    let state = match result {
        Ok(decision) => GateState::Ready(decision),
        Err(e) => {
            error!(error = %e, "session evaluation failed");
            GateState::Unavailable { reason: e.to_string() }
        }
    };
    tx.send_replace(state);
}

/// Owner of a running watcher. Dropping it stops the watcher.
pub struct GateHandle {
    rx: watch::Receiver<GateState>,
    task: JoinHandle<()>,
    retry: Arc<Notify>,
    optimistic: CachedFlags,
}

impl GateHandle {
    #[must_use]
    pub fn state(&self) -> GateState {
        self.rx.borrow().clone()
    }

    /// Cache contents read at spawn time, before any resolution.
    #[must_use]
    pub fn optimistic(&self) -> &CachedFlags {
        &self.optimistic
    }

    /// A receiver that observes every published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.rx.clone()
    }

    /// Wait until the state is no longer `Loading` and return it.
    pub async fn settled(&mut self) -> GateState {
        if let Ok(state) = self.rx.wait_for(|state| !matches!(state, GateState::Loading)).await {
            return state.clone();
        }
        self.rx.borrow().clone()
    }

    /// Wait for the next published state after the current one.
    pub async fn changed(&mut self) -> Option<GateState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Ask the watcher to evaluate again, e.g. from an "unavailable" screen.
    pub fn retry(&self) {
        self.retry.notify_one();
    }

    #[must_use]
    pub fn user_verdict(&self, path: &str) -> Verdict {
        user_gate::evaluate(&self.rx.borrow(), path)
    }

    #[must_use]
    pub fn admin_verdict(&self, path: &str) -> Verdict {
        admin_gate::evaluate(&self.rx.borrow(), path)
    }
}

impl Drop for GateHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
