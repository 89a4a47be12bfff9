//! Route gate for the signed-in user area.
//!
//! Decision table, first match wins:
//!
//! | state                                   | verdict                     |
//! |-----------------------------------------|-----------------------------|
//! | loading                                 | loading                     |
//! | unavailable                             | unavailable                 |
//! | banned                                  | ban screen                  |
//! | not authenticated                       | `/signin` (keeps the path)  |
//! | profile unknown                         | loading                     |
//! | no profile, not on `/onboarding`        | `/onboarding`               |
//! | profile, on `/onboarding`               | `/dashboard`                |
//! | otherwise                               | render                      |

#[cfg(test)]
#[path = "user_gate_test.rs"]
mod tests;

use crate::ONBOARDING_PATH;
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
        return Verdict::Redirect(Redirect::SignIn { return_to: Some(path.to_owned()) });
    }

    let on_onboarding = path_within(path, ONBOARDING_PATH);
    match decision.has_profile {
        None => Verdict::Loading,
        Some(false) if !on_onboarding => Verdict::Redirect(Redirect::Onboarding),
        Some(true) if on_onboarding => Verdict::Redirect(Redirect::Dashboard),
        Some(_) => Verdict::Render,
    }
}
