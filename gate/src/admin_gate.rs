//! Route gate for the back-office.
//!
//! Two hard-coded capabilities, checked in order: the `admin` role reaches
//! every admin path; an author reaches only the blog-management paths.
//! Admins are provisioned out of band, so a missing profile means "not
//! entitled" here, not "needs onboarding".

#[cfg(test)]
#[path = "admin_gate_test.rs"]
mod tests;

use crate::BLOG_ADMIN_PREFIX;
use crate::model::{GateDecision, GateState};
use crate::verdict::{Redirect, Verdict, path_within};

#[must_use]
pub fn evaluate(state: &GateState, path: &str) -> Verdict {
    match state {
        GateState::Loading => Verdict::Loading,
        GateState::Unavailable { reason } => Verdict::Unavailable { reason: reason.clone() },
        GateState::Ready(decision) => decide(decision, path),
    }
}

fn decide(decision: &GateDecision, path: &str) -> Verdict {
    if decision.is_banned {
        return Verdict::Banned;
    }
    if !decision.authenticated {
        return Verdict::Redirect(Redirect::AdminSignIn { return_to: Some(path.to_owned()) });
    }

    match decision.has_profile {
        None => Verdict::Loading,
        Some(false) => Verdict::Redirect(Redirect::Unauthorized),
        Some(true) if decision.is_admin() => Verdict::Render,
        Some(true) if decision.is_author && path_within(path, BLOG_ADMIN_PREFIX) => Verdict::Render,
        Some(true) => Verdict::Redirect(Redirect::Unauthorized),
    }
}
