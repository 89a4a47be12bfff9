//! Hosted auth service client: user lookup and logout over REST.
//!
//! The service issues bearer access tokens to the browser. The server never
//! mints or refreshes them; it only asks the service who a token belongs to
//! and revokes it on sign-out. Pure parsing lives in `parse_user` for
//! testability.

#[cfg(test)]
#[path = "auth_client_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use gate::{AuthProvider, LookupError, Session};
use serde::Deserialize;

use crate::config::AuthConfig;

/// Produces a per-request [`AuthProvider`] bound to the visitor's token.
pub trait AuthBackend: Send + Sync {
    fn for_token(&self, token: Option<String>) -> Arc<dyn AuthProvider>;
}

// =============================================================================
// CLIENT
// =============================================================================

/// Cheap to clone: the HTTP pool is shared between clones.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    /// # Errors
    ///
    /// Returns the underlying error if the HTTP client cannot be built.
    pub fn new(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        Ok(Self { http, base_url: config.base_url.clone(), api_key: config.api_key.clone() })
    }

    /// `GET /auth/v1/user` returns the identity behind `token`, `None` if the token is
    /// expired or revoked.
    pub async fn fetch_user(&self, token: &str) -> Result<Option<Session>, LookupError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        match status {
            200 => parse_user(&body).map(Some),
            401 | 403 => Ok(None),
            _ => Err(LookupError::Status { status, body }),
        }
    }

    /// `POST /auth/v1/logout` revokes `token`. Already-invalid tokens count
    /// as signed out.
    pub async fn logout(&self, token: &str) -> Result<(), LookupError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        if matches!(status, 200..=299 | 401 | 403 | 404) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(LookupError::Status { status, body })
    }
}

impl AuthBackend for AuthClient {
    fn for_token(&self, token: Option<String>) -> Arc<dyn AuthProvider> {
        Arc::new(BearerSession { client: self.clone(), token })
    }
}

fn transport_error(e: reqwest::Error) -> LookupError {
    if e.is_timeout() { LookupError::Timeout } else { LookupError::Transport(e.to_string()) }
}

// =============================================================================
// PER-REQUEST PROVIDER
// =============================================================================

/// The ambient session of one request: whatever its access token resolves to.
pub struct BearerSession {
    client: AuthClient,
    token: Option<String>,
}

#[async_trait::async_trait]
impl AuthProvider for BearerSession {
    async fn current_session(&self) -> Result<Option<Session>, LookupError> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => self.client.fetch_user(token).await,
            _ => Ok(None),
        }
    }

    async fn sign_out(&self) -> Result<(), LookupError> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => self.client.logout(token).await,
            _ => Ok(()),
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    app_metadata: AppMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct AppMetadata {
    #[serde(default)]
    role: Option<String>,
}

pub(crate) fn parse_user(body: &str) -> Result<Session, LookupError> {
    let user: UserResponse = serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    let email = user
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| LookupError::Decode(format!("user {} has no email", user.id)))?;
    Ok(Session { user_id: user.id, email, role_claim: user.app_metadata.role })
}
