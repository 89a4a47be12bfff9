//! Protected page shells. Each handler only runs once its gate extractor
//! has let the visitor through.

use axum::http::Uri;
use axum::response::IntoResponse;

use super::access::{AdminAccess, UserAccess};
use crate::views;

/// `GET /dashboard` and everything under it.
pub async fn dashboard(access: UserAccess, uri: Uri) -> impl IntoResponse {
    (access.jar, views::dashboard(&access.decision, uri.path()))
}

/// `GET /onboarding`
pub async fn onboarding(access: UserAccess) -> impl IntoResponse {
    (access.jar, views::onboarding())
}

/// `GET /admin` and everything under it.
pub async fn admin(access: AdminAccess, uri: Uri) -> impl IntoResponse {
    (access.jar, views::admin(&access.decision, uri.path()))
}

/// `GET /unauthorized`
pub async fn unauthorized() -> impl IntoResponse {
    views::unauthorized()
}
