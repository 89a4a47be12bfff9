//! Identity, profile, and derived gate types.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` and `Profile` mirror rows owned by the auth provider and the
//! profile directory. `GateDecision` is derived on every evaluation and is
//! never persisted; only three of its flags reach the durable cache.

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

/// Role value that grants access to every admin path.
pub const ADMIN_ROLE: &str = "admin";

/// Fixed message shown to a blocked account.
pub const BAN_MESSAGE: &str =
    "Your account has been suspended. If you believe this is a mistake, please contact our support team.";

// =============================================================================
// SESSION / PROFILE
// =============================================================================

/// Identity of the signed-in visitor, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    /// Role claim carried in the token, if the provider sets one.
    pub role_claim: Option<String>,
}

impl Session {
    /// Key used against the ban table.
    #[must_use]
    pub fn ban_key(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Onboarded user profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub is_author: bool,
    pub role: Option<String>,
}

// =============================================================================
// GATE DECISION
// =============================================================================

/// Everything the route gates need to know about the current visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub authenticated: bool,
    /// `None` means not yet known. Never read it as `false`.
    pub has_profile: Option<bool>,
    pub is_banned: bool,
    pub role: Option<String>,
    pub is_author: bool,
    pub profile_id: Option<String>,
}

impl GateDecision {
    /// Decision for a visitor with no active session.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Decision for a signed-in visitor given the result of the profile lookup.
    #[must_use]
    pub fn signed_in(profile: Option<&Profile>) -> Self {
        match profile {
            Some(p) => Self {
                authenticated: true,
                has_profile: Some(true),
                is_banned: false,
                role: p.role.clone(),
                is_author: p.is_author,
                profile_id: Some(p.id.clone()),
            },
            None => Self { authenticated: true, has_profile: Some(false), ..Self::default() },
        }
    }

    #[must_use]
    pub fn with_ban(mut self, is_banned: bool) -> Self {
        self.is_banned = is_banned;
        self
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

// =============================================================================
// GATE STATE
// =============================================================================

/// Lifecycle of a gate evaluation as seen by a rendering host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateState {
    /// No resolution has completed yet.
    Loading,
    /// The latest evaluation finished.
    Ready(GateDecision),
    /// A backend lookup failed after retries. Distinct from loading so hosts
    /// can offer a retry instead of spinning forever.
    Unavailable { reason: String },
}

impl GateState {
    #[must_use]
    pub fn decision(&self) -> Option<&GateDecision> {
        match self {
            Self::Ready(decision) => Some(decision),
            Self::Loading | Self::Unavailable { .. } => None,
        }
    }
}

/// User-facing payload for a blocked account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanNotice {
    pub message: String,
    pub support_contact: String,
}

impl BanNotice {
    #[must_use]
    pub fn new(support_contact: impl Into<String>) -> Self {
        Self { message: BAN_MESSAGE.to_owned(), support_contact: support_contact.into() }
    }
}
