//! Outcome of a route-gate evaluation.

#[cfg(test)]
#[path = "verdict_test.rs"]
mod tests;

use serde::Serialize;

use crate::{ADMIN_SIGNIN_PATH, DASHBOARD_PATH, ONBOARDING_PATH, SIGNIN_PATH, UNAUTHORIZED_PATH};

/// Where a gate sends the visitor instead of the requested page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum Redirect {
    /// User sign-in, remembering the page to return to afterwards.
    SignIn { return_to: Option<String> },
    /// Back-office sign-in, remembering the admin page to return to.
    AdminSignIn { return_to: Option<String> },
    Onboarding,
    Dashboard,
    Unauthorized,
}

impl Redirect {
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::SignIn { .. } => SIGNIN_PATH,
            Self::AdminSignIn { .. } => ADMIN_SIGNIN_PATH,
            Self::Onboarding => ONBOARDING_PATH,
            Self::Dashboard => DASHBOARD_PATH,
            Self::Unauthorized => UNAUTHORIZED_PATH,
        }
    }

    #[must_use]
    pub fn return_to(&self) -> Option<&str> {
        match self {
            Self::SignIn { return_to } | Self::AdminSignIn { return_to } => return_to.as_deref(),
            _ => None,
        }
    }
}

/// What the host should show for the requested path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Neutral loading indicator. No redirect has been decided.
    Loading,
    /// Show the requested page.
    Render,
    Redirect(Redirect),
    /// Static ban screen. Terminal for this page load; never auto-redirects.
    Banned,
    /// Backend unreachable; offer a retry.
    Unavailable { reason: String },
}

impl Verdict {
    #[must_use]
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Redirect(r) => Some(r),
            _ => None,
        }
    }
}

/// `path` equals `base` or lies underneath it (`base/...`). A trailing
/// slash and any query string on `path` are ignored.
#[must_use]
pub fn path_within(path: &str, base: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    path == base || path.strip_prefix(base).is_some_and(|rest| rest.starts_with('/'))
}
