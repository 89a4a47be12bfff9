//! Backend seams: auth provider, profile directory, ban list.
//!
//! Hosts implement these against the real backend; [`crate::testing`] has
//! in-memory versions for tests.

use crate::error::LookupError;
use crate::model::{Profile, Session};

/// Source of the ambient session.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current identity, or `None` if nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if the provider could not be reached.
    async fn current_session(&self) -> Result<Option<Session>, LookupError>;

    /// End the current session at the provider.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if the provider rejected the request.
    async fn sign_out(&self) -> Result<(), LookupError>;
}

/// Lookup of onboarded profiles by user id.
#[async_trait::async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// The first profile row for `user_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] on backend failure. A missing row is `Ok(None)`.
    async fn find_by_user(&self, user_id: &str) -> Result<Option<Profile>, LookupError>;
}

/// Lookup of blocked accounts by lowercased email.
#[async_trait::async_trait]
pub trait BanList: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`LookupError`] on backend failure.
    async fn is_banned(&self, email_lower: &str) -> Result<bool, LookupError>;
}
