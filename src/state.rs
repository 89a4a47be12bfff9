//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the long-lived backends; every request gets its own
//! `SessionResolver` bound to the visitor's access token and cookie jar.

use std::sync::Arc;

use gate::{BanList, ProfileDirectory, SessionResolver};

use crate::config::GateSettings;
use crate::services::auth_client::AuthBackend;
use crate::services::cookie_cache::CookieCache;

/// Clone is required by Axum; every backend is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthBackend>,
    pub profiles: Arc<dyn ProfileDirectory>,
    pub bans: Arc<dyn BanList>,
    pub settings: GateSettings,
}

impl AppState {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        profiles: Arc<dyn ProfileDirectory>,
        bans: Arc<dyn BanList>,
        settings: GateSettings,
    ) -> Self {
        Self { auth, profiles, bans, settings }
    }

    /// Resolver for one request. Cache writes land in `cache`, whose jar the
    /// handler returns with its response.
    #[must_use]
    pub fn resolver(&self, token: Option<String>, cache: Arc<CookieCache>) -> SessionResolver {
        SessionResolver::new(self.auth.for_token(token), self.profiles.clone(), self.bans.clone(), cache)
            .with_retry(self.settings.retry)
            .with_support_contact(self.settings.support_contact.clone())
    }
}
