//! Durable cache of the last known session flags.
//!
//! SYSTEM CONTEXT
//! ==============
//! Hosts persist three flags between page loads so the next load can render
//! optimistically before the first resolution arrives. In a browser this is
//! local storage; on the server it is a set of cookies. Tests use
//! [`MemoryStore`].
//!
//! TRADE-OFFS
//! ==========
//! Writes are best-effort. A failed write leaves a stale cache, which the
//! next resolution corrects, so failures are logged and never propagated.
//! Concurrent tabs are not coordinated.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;

use crate::error::StoreError;
use crate::model::GateDecision;

pub const AUTHENTICATED_KEY: &str = "authenticated";
pub const HAS_PROFILE_KEY: &str = "hasProfile";
pub const PROFILE_ID_KEY: &str = "profileId";

/// All keys owned by the cache.
pub const CACHE_KEYS: [&str; 3] = [AUTHENTICATED_KEY, HAS_PROFILE_KEY, PROFILE_ID_KEY];

/// Injectable key/value store backing the optimistic cache.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the backing storage refuses the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str);

    /// Drop every cache key.
    fn clear(&self) {
        for key in CACHE_KEYS {
            self.remove(key);
        }
    }
}

// =============================================================================
// CACHED FLAGS
// =============================================================================

/// Snapshot of the cache, read back for optimistic rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedFlags {
    pub authenticated: bool,
    pub has_profile: Option<bool>,
    pub profile_id: Option<String>,
}

impl CachedFlags {
    #[must_use]
    pub fn load(store: &dyn SessionStore) -> Self {
        let has_profile = match store.get(HAS_PROFILE_KEY).as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };
        Self {
            authenticated: store.get(AUTHENTICATED_KEY).as_deref() == Some("true"),
            has_profile,
            profile_id: store.get(PROFILE_ID_KEY),
        }
    }

    /// Whether the cache suggests the visitor can see user pages right away.
    #[must_use]
    pub fn looks_ready(&self) -> bool {
        self.authenticated && self.has_profile == Some(true)
    }
}

/// Mirror a resolved decision into the cache.
///
/// A signed-out decision clears the cache. An unknown profile state leaves
/// the existing `hasProfile` entry alone rather than recording `false`.
pub fn write_decision(store: &dyn SessionStore, decision: &GateDecision) {
    if !decision.authenticated {
        store.clear();
        return;
    }

    best_effort(store, AUTHENTICATED_KEY, "true");
    match decision.has_profile {
        Some(true) => {
            best_effort(store, HAS_PROFILE_KEY, "true");
            match &decision.profile_id {
                Some(id) => best_effort(store, PROFILE_ID_KEY, id),
                None => store.remove(PROFILE_ID_KEY),
            }
        }
        Some(false) => {
            best_effort(store, HAS_PROFILE_KEY, "false");
            store.remove(PROFILE_ID_KEY);
        }
        None => {}
    }
}

fn best_effort(store: &dyn SessionStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        warn!(error = %e, key, "session cache write failed");
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process store, used by tests and by hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().map_or(true, |entries| entries.is_empty())
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Write { key: key.to_owned(), reason: "store lock poisoned".to_owned() })?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}
