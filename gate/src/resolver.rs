//! Session resolver: ambient session to `GateDecision`.
//!
//! DESIGN
//! ======
//! Lookups are awaited in a fixed order: session first, then the profile
//! (and, for route evaluation, the ban list alongside it). Every backend call
//! goes through the configured [`RetryPolicy`], and a failure that survives
//! retries surfaces as a [`GateError`] rather than an endless wait.
//!
//! The durable cache is written after each successful resolution and cleared
//! on sign-out, ban, or a missing session. Cache writes never fail a
//! resolution.

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::GateError;
use crate::model::{BanNotice, GateDecision, Profile, Session};
use crate::provider::{AuthProvider, BanList, ProfileDirectory};
use crate::retry::RetryPolicy;
use crate::store::{self, SessionStore};

pub const DEFAULT_SUPPORT_CONTACT: &str = "support@toolhub.app";

/// Result of the post-login callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Signed in and allowed; continue with this decision.
    Proceed(GateDecision),
    /// The account is blocked. The session has been ended and redirection
    /// must stop here.
    Banned(BanNotice),
    /// The provider reported no session after the callback.
    SignedOut,
}

/// Derives gate decisions from the auth provider and profile/ban lookups.
#[derive(Clone)]
pub struct SessionResolver {
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileDirectory>,
    bans: Arc<dyn BanList>,
    store: Arc<dyn SessionStore>,
    retry: RetryPolicy,
    support_contact: String,
}

impl SessionResolver {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileDirectory>,
        bans: Arc<dyn BanList>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            auth,
            profiles,
            bans,
            store,
            retry: RetryPolicy::default(),
            support_contact: DEFAULT_SUPPORT_CONTACT.to_owned(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_support_contact(mut self, contact: impl Into<String>) -> Self {
        self.support_contact = contact.into();
        self
    }

    #[must_use]
    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn ban_notice(&self) -> BanNotice {
        BanNotice::new(self.support_contact.clone())
    }

    /// Resolve the current session and profile. Does not consult the ban list.
    ///
    /// # Errors
    ///
    /// Returns a [`GateError`] if the session or profile lookup fails after retries.
    pub async fn resolve(&self) -> Result<GateDecision, GateError> {
        let Some(session) = self.current_session().await? else {
            return Ok(self.signed_out());
        };
        let profile = self.lookup_profile(&session).await?;
        let decision = GateDecision::signed_in(profile.as_ref());
        store::write_decision(self.store.as_ref(), &decision);
        info!(user_id = %session.user_id, has_profile = ?decision.has_profile, "session resolved");
        Ok(decision)
    }

    /// Resolve for a protected-route entry: profile and ban lookups run
    /// concurrently and both must finish before a decision exists.
    ///
    /// # Errors
    ///
    /// Returns a [`GateError`] if any lookup fails after retries.
    pub async fn evaluate(&self) -> Result<GateDecision, GateError> {
        let Some(session) = self.current_session().await? else {
            return Ok(self.signed_out());
        };

        let (profile, banned) = tokio::join!(self.lookup_profile(&session), self.lookup_ban(&session));
        let banned = banned?;
        let decision = GateDecision::signed_in(profile?.as_ref()).with_ban(banned);

        if banned {
            warn!(user_id = %session.user_id, "banned account reached a protected route");
            self.store.clear();
        } else {
            store::write_decision(self.store.as_ref(), &decision);
        }
        Ok(decision)
    }

    /// Post-login callback: check the ban list before anything else and end
    /// the session of a blocked account.
    ///
    /// # Errors
    ///
    /// Returns a [`GateError`] if the session, ban, or profile lookup fails.
    pub async fn complete_sign_in(&self) -> Result<SignInOutcome, GateError> {
        let Some(session) = self.current_session().await? else {
            self.store.clear();
            return Ok(SignInOutcome::SignedOut);
        };

        if self.lookup_ban(&session).await? {
            warn!(user_id = %session.user_id, "banned account signed in; ending session");
            if let Err(e) = self.auth.sign_out().await {
                error!(error = %e, user_id = %session.user_id, "sign-out of banned account failed");
            }
            self.store.clear();
            return Ok(SignInOutcome::Banned(self.ban_notice()));
        }

        let profile = self.lookup_profile(&session).await?;
        let decision = GateDecision::signed_in(profile.as_ref());
        store::write_decision(self.store.as_ref(), &decision);
        info!(user_id = %session.user_id, has_profile = ?decision.has_profile, "sign-in completed");
        Ok(SignInOutcome::Proceed(decision))
    }

    /// End the session and clear the cache. The cache is cleared even when
    /// the provider call fails.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::SignOut`] if the provider rejected the sign-out.
    pub async fn sign_out(&self) -> Result<(), GateError> {
        self.store.clear();
        self.retry
            .run("sign_out", || self.auth.sign_out())
            .await
            .map_err(GateError::SignOut)?;
        info!("signed out");
        Ok(())
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    async fn current_session(&self) -> Result<Option<Session>, GateError> {
        self.retry
            .run("session", || self.auth.current_session())
            .await
            .map_err(GateError::Session)
    }

    async fn lookup_profile(&self, session: &Session) -> Result<Option<Profile>, GateError> {
        let user_id = session.user_id.as_str();
        self.retry
            .run("profile", || self.profiles.find_by_user(user_id))
            .await
            .map_err(GateError::Profile)
    }

    async fn lookup_ban(&self, session: &Session) -> Result<bool, GateError> {
        let key = session.ban_key();
        self.retry
            .run("ban", || self.bans.is_banned(&key))
            .await
            .map_err(GateError::Ban)
    }

    fn signed_out(&self) -> GateDecision {
        self.store.clear();
        GateDecision::signed_out()
    }
}
