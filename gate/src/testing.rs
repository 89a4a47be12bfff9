//! In-memory backends for exercising the resolver and gates without a network.
//!
//! Each fake can be primed with a queue of failures that are returned before
//! normal answers resume, which is how retry and `Unavailable` paths are
//! tested. Built for the crate's own tests and behind the `testing`
//! feature for downstream ones.
//!
//! ```ignore
//! use std::sync::Arc;
//! use gate::testing::{FakeAuth, FakeBans, FakeProfiles, profile, session};
//! use gate::{MemoryStore, SessionResolver};
//!
//! let auth = Arc::new(FakeAuth::signed_in(session("u1", "a@example.com")));
//! let profiles = Arc::new(FakeProfiles::default());
//! profiles.insert(profile("abc", "u1", None, false));
//! let resolver = SessionResolver::new(auth, profiles, Arc::new(FakeBans::default()), Arc::new(MemoryStore::new()));
//! # let _ = resolver;
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{LookupError, StoreError};
use crate::model::{Profile, Session};
use crate::provider::{AuthProvider, BanList, ProfileDirectory};
use crate::store::SessionStore;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[must_use]
pub fn session(user_id: &str, email: &str) -> Session {
    Session { user_id: user_id.to_owned(), email: email.to_owned(), role_claim: None }
}

#[must_use]
pub fn profile(id: &str, user_id: &str, role: Option<&str>, is_author: bool) -> Profile {
    Profile { id: id.to_owned(), user_id: user_id.to_owned(), is_author, role: role.map(str::to_owned) }
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Default)]
pub struct FakeAuth {
    session: Mutex<Option<Session>>,
    failures: Mutex<VecDeque<LookupError>>,
    delay: Mutex<Option<Duration>>,
    lookups: AtomicUsize,
    sign_outs: AtomicUsize,
}

impl FakeAuth {
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        let auth = Self::default();
        auth.set_session(Some(session));
        auth
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn set_session(&self, session: Option<Session>) {
        *lock(&self.session) = session;
    }

    /// Queue an error for the next `current_session` call.
    pub fn fail_next(&self, err: LookupError) {
        lock(&self.failures).push_back(err);
    }

    /// Delay every `current_session` call, simulating a slow provider.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *lock(&self.delay) = delay;
    }

    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthProvider for FakeAuth {
    async fn current_session(&self) -> Result<Option<Session>, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = lock(&self.failures).pop_front() {
            return Err(err);
        }
        Ok(lock(&self.session).clone())
    }

    async fn sign_out(&self) -> Result<(), LookupError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.set_session(None);
        Ok(())
    }
}

// =============================================================================
// PROFILES
// =============================================================================

#[derive(Default)]
pub struct FakeProfiles {
    rows: Mutex<HashMap<String, Profile>>,
    failures: Mutex<VecDeque<LookupError>>,
    lookups: AtomicUsize,
}

impl FakeProfiles {
    pub fn insert(&self, profile: Profile) {
        lock(&self.rows).insert(profile.user_id.clone(), profile);
    }

    pub fn remove(&self, user_id: &str) {
        lock(&self.rows).remove(user_id);
    }

    pub fn fail_next(&self, err: LookupError) {
        lock(&self.failures).push_back(err);
    }

    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProfileDirectory for FakeProfiles {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<Profile>, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.failures).pop_front() {
            return Err(err);
        }
        Ok(lock(&self.rows).get(user_id).cloned())
    }
}

// =============================================================================
// BANS
// =============================================================================

#[derive(Default)]
pub struct FakeBans {
    emails: Mutex<HashSet<String>>,
    failures: Mutex<VecDeque<LookupError>>,
    lookups: AtomicUsize,
}

impl FakeBans {
    /// Ban an email. Stored lowercased, as the real table is.
    pub fn ban(&self, email: &str) {
        lock(&self.emails).insert(email.to_lowercase());
    }

    pub fn fail_next(&self, err: LookupError) {
        lock(&self.failures).push_back(err);
    }

    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BanList for FakeBans {
    async fn is_banned(&self, email_lower: &str) -> Result<bool, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.failures).pop_front() {
            return Err(err);
        }
        Ok(lock(&self.emails).contains(email_lower))
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Store whose writes always fail, e.g. storage quota exhausted.
#[derive(Default)]
pub struct FailingStore;

impl SessionStore for FailingStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Write { key: key.to_owned(), reason: "quota exceeded".to_owned() })
    }

    fn remove(&self, _key: &str) {}
}
