//! Route-gate extractors.
//!
//! `UserAccess` and `AdminAccess` run a full gate evaluation (session,
//! profile and ban lookups) before the handler body executes. Any verdict
//! other than "render" becomes the rejection response: a redirect, the ban
//! screen, a loading screen, or the unavailable screen.

#[cfg(test)]
#[path = "access_test.rs"]
mod tests;

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::RETRY_AFTER;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect as HttpRedirect, Response};
use axum_extra::extract::cookie::CookieJar;
use gate::verdict::path_within;
use gate::{
    ADMIN_PATH, ADMIN_SIGNIN_PATH, BanNotice, DASHBOARD_PATH, GateDecision, GateState, Redirect, Verdict, admin_gate,
    user_gate,
};
use reqwest::Url;

use super::auth::session_token;
use crate::services::cookie_cache::CookieCache;
use crate::state::AppState;
use crate::views;

/// Base used only to borrow `Url`'s query encoder for relative locations.
const LOCAL_ORIGIN: &str = "http://gatehouse.local";

/// A visitor the user gate lets through.
pub struct UserAccess {
    pub decision: GateDecision,
    /// Carries the refreshed cache cookies; return it with the response.
    pub jar: CookieJar,
}

/// A visitor the admin gate lets through.
pub struct AdminAccess {
    pub decision: GateDecision,
    pub jar: CookieJar,
}

impl<S> FromRequestParts<S> for UserAccess
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (decision, jar) = run_gate(parts, &AppState::from_ref(state), user_gate::evaluate).await?;
        Ok(Self { decision, jar })
    }
}

impl<S> FromRequestParts<S> for AdminAccess
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (decision, jar) = run_gate(parts, &AppState::from_ref(state), admin_gate::evaluate).await?;
        Ok(Self { decision, jar })
    }
}

async fn run_gate(
    parts: &Parts,
    state: &AppState,
    evaluate: fn(&GateState, &str) -> Verdict,
) -> Result<(GateDecision, CookieJar), Response> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = session_token(&jar);
    let cache = Arc::new(CookieCache::new(jar, state.settings.cookie_secure));
    let resolver = state.resolver(token, cache.clone());

    let path = parts.uri.path();
    let requested = parts.uri.path_and_query().map_or(path, |pq| pq.as_str());

    let gate_state = match resolver.evaluate().await {
        Ok(decision) => GateState::Ready(decision),
        Err(e) => {
            tracing::error!(error = %e, path, "gate evaluation failed");
            GateState::Unavailable { reason: e.to_string() }
        }
    };

    // Redirects carry the full requested location, query included.
    let return_to = Some(requested.to_owned());
    let verdict = match evaluate(&gate_state, path) {
        Verdict::Redirect(Redirect::SignIn { .. }) => Verdict::Redirect(Redirect::SignIn { return_to }),
        Verdict::Redirect(Redirect::AdminSignIn { .. }) => Verdict::Redirect(Redirect::AdminSignIn { return_to }),
        other => other,
    };
    tracing::debug!(path, ?verdict, "gate verdict");

    match (verdict, gate_state) {
        (Verdict::Render, GateState::Ready(decision)) => Ok((decision, cache.jar())),
        (verdict, _) => Err(verdict_response(&verdict, &resolver.ban_notice(), requested, cache.jar())),
    }
}

/// Response for every verdict that does not render the requested page.
pub(crate) fn verdict_response(verdict: &Verdict, notice: &BanNotice, requested: &str, jar: CookieJar) -> Response {
    match verdict {
        Verdict::Redirect(redirect) => (jar, HttpRedirect::temporary(&location(redirect))).into_response(),
        Verdict::Banned => (StatusCode::FORBIDDEN, jar, views::banned(notice)).into_response(),
        Verdict::Loading => {
            let retry_after = [(RETRY_AFTER, HeaderValue::from(views::LOADING_REFRESH_SECS))];
            (StatusCode::SERVICE_UNAVAILABLE, jar, retry_after, views::loading(requested)).into_response()
        }
        // Render only reaches here without a resolved decision.
        Verdict::Unavailable { .. } | Verdict::Render => {
            (StatusCode::SERVICE_UNAVAILABLE, jar, views::unavailable(requested)).into_response()
        }
    }
}

/// Relative `Location` for a redirect, with the return path as `?redirect=`.
pub(crate) fn location(redirect: &Redirect) -> String {
    let path = redirect.path();
    let Some(return_to) = redirect.return_to() else {
        return path.to_owned();
    };
    let Ok(mut url) = Url::parse(LOCAL_ORIGIN).and_then(|base| base.join(path)) else {
        return path.to_owned();
    };
    url.query_pairs_mut().append_pair("redirect", return_to);
    match url.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_owned(),
    }
}

/// Accept only site-relative return paths; anything else lands on the dashboard.
pub(crate) fn safe_return_to(raw: Option<&str>) -> String {
    safe_return_to_or(raw, DASHBOARD_PATH)
}

/// Back-office sign-in only returns to back-office pages, `/admin` otherwise.
pub(crate) fn safe_admin_return_to(raw: Option<&str>) -> String {
    let path = safe_return_to_or(raw, ADMIN_PATH);
    if path_within(&path, ADMIN_PATH) && !path_within(&path, ADMIN_SIGNIN_PATH) {
        path
    } else {
        ADMIN_PATH.to_owned()
    }
}

fn safe_return_to_or(raw: Option<&str>, fallback: &str) -> String {
    match raw.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_owned()
        }
        _ => fallback.to_owned(),
    }
}
