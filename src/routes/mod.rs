//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public sign-in routes, the auth callback endpoints, and the protected page
//! shells share one Axum router. Protected pages sit behind the gate
//! extractors in [`access`].

pub mod access;
pub mod auth;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/signin", get(auth::signin_page))
        .route("/admin/signin", get(auth::admin_signin_page))
        .route("/auth/callback", post(auth::callback))
        .route("/auth/signout", post(auth::signout))
        .route("/api/session", get(auth::api_session))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/{*rest}", get(pages::dashboard))
        .route("/onboarding", get(pages::onboarding))
        .route("/admin", get(pages::admin))
        .route("/admin/{*rest}", get(pages::admin))
        .route("/unauthorized", get(pages::unauthorized))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
