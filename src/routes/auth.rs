//! Auth routes: sign-in pages, post-login callback, sign-out, session probe.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use std::sync::Arc;

use axum::Form;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use gate::verdict::path_within;
use gate::{ADMIN_PATH, ONBOARDING_PATH, Redirect as GateRedirect, SignInOutcome};
use serde::Deserialize;
use time::Duration;

use super::access::{location, safe_admin_return_to, safe_return_to};
use crate::services::cookie_cache::CookieCache;
use crate::state::AppState;
use crate::views;

/// HttpOnly cookie holding the hosted auth service's access token.
pub const SESSION_COOKIE: &str = "sb-access-token";

pub(crate) fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()).filter(|t| !t.is_empty())
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// SIGN-IN PAGES
// =============================================================================

#[derive(Deserialize)]
pub struct SigninQuery {
    redirect: Option<String>,
}

/// `GET /signin` renders the sign-in form, preserving `?redirect=`.
pub async fn signin_page(Query(query): Query<SigninQuery>) -> impl IntoResponse {
    views::signin(&safe_return_to(query.redirect.as_deref()))
}

/// `GET /admin/signin` renders the back-office form, preserving an admin
/// `?redirect=`.
pub async fn admin_signin_page(Query(query): Query<SigninQuery>) -> impl IntoResponse {
    views::admin_signin(&safe_admin_return_to(query.redirect.as_deref()))
}

// =============================================================================
// CALLBACK
// =============================================================================

#[derive(Deserialize)]
pub struct CallbackForm {
    access_token: String,
    #[serde(default)]
    redirect: Option<String>,
}

/// `POST /auth/callback` runs the post-login checks for a fresh access
/// token. Banned accounts are signed out and shown the ban screen; everyone
/// else gets the session cookie and continues to their destination.
pub async fn callback(State(state): State<AppState>, jar: CookieJar, Form(form): Form<CallbackForm>) -> Response {
    let secure = state.settings.cookie_secure;
    let destination = safe_return_to(form.redirect.as_deref());
    let back_office = path_within(&destination, ADMIN_PATH);
    let token = form.access_token.trim().to_owned();

    let cache = Arc::new(CookieCache::new(jar, secure));
    let resolver = state.resolver(Some(token.clone()), cache.clone());

    match resolver.complete_sign_in().await {
        Ok(SignInOutcome::Proceed(decision)) => {
            let jar = cache.jar().add(session_cookie(token, secure));
            // New user accounts finish onboarding first. Back-office accounts are
            // provisioned elsewhere; the admin gate handles a missing profile.
            let target = if decision.has_profile == Some(false) && !back_office {
                ONBOARDING_PATH.to_owned()
            } else {
                destination
            };
            (jar, Redirect::to(&target)).into_response()
        }
        Ok(SignInOutcome::Banned(notice)) => {
            let jar = cache.jar().add(expired_session_cookie(secure));
            (StatusCode::FORBIDDEN, jar, views::banned(&notice)).into_response()
        }
        Ok(SignInOutcome::SignedOut) => {
            tracing::warn!("callback token rejected by auth service");
            let jar = cache.jar().add(expired_session_cookie(secure));
            let retry = if back_office {
                GateRedirect::AdminSignIn { return_to: Some(destination) }
            } else {
                GateRedirect::SignIn { return_to: Some(destination) }
            };
            (jar, Redirect::to(&location(&retry))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "sign-in completion failed");
            let retry_page = if back_office { gate::ADMIN_SIGNIN_PATH } else { gate::SIGNIN_PATH };
            (StatusCode::SERVICE_UNAVAILABLE, cache.jar(), views::unavailable(retry_page)).into_response()
        }
    }
}

// =============================================================================
// SIGN-OUT
// =============================================================================

/// `POST /auth/signout` ends the session and clears every gate cookie. The
/// local session is cleared even if the auth service call fails.
pub async fn signout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let secure = state.settings.cookie_secure;
    let token = session_token(&jar);
    let cache = Arc::new(CookieCache::new(jar, secure));

    if let Err(e) = state.resolver(token, cache.clone()).sign_out().await {
        tracing::warn!(error = %e, "auth service sign-out failed");
    }

    let jar = cache.jar().add(expired_session_cookie(secure));
    (jar, Redirect::to(gate::SIGNIN_PATH)).into_response()
}

// =============================================================================
// SESSION PROBE
// =============================================================================

/// `GET /api/session` returns the current gate decision so the browser
/// bundle can hydrate its optimistic cache. 401 when signed out.
pub async fn api_session(State(state): State<AppState>, jar: CookieJar) -> Response {
    let token = session_token(&jar);
    let cache = Arc::new(CookieCache::new(jar, state.settings.cookie_secure));

    match state.resolver(token, cache.clone()).evaluate().await {
        Ok(decision) if decision.authenticated => (cache.jar(), Json(decision)).into_response(),
        Ok(_) => (StatusCode::UNAUTHORIZED, cache.jar()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "session probe failed");
            let body = Json(serde_json::json!({ "error": "session lookup unavailable" }));
            (StatusCode::SERVICE_UNAVAILABLE, cache.jar(), body).into_response()
        }
    }
}
