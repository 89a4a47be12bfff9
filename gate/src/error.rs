//! Error types for backend lookups, cache writes, and gate evaluation.
//!
//! ERROR HANDLING
//! ==============
//! None of these reach the visitor as a crash. Hosts map `GateError` to the
//! `Unavailable` gate state; `StoreError` is logged and dropped because the
//! cache is an optimization only.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Failure talking to the auth provider, profile directory, or ban list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The backing database rejected the query.
    #[error("database error: {0}")]
    Database(String),

    /// The request exceeded its deadline.
    #[error("request timed out")]
    Timeout,
}

impl LookupError {
    /// Whether another attempt could plausibly succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Database(_) | Self::Timeout | Self::Status { status: 429 | 500..=599, .. }
        )
    }
}

/// A gate evaluation that could not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("session lookup failed: {0}")]
    Session(#[source] LookupError),

    #[error("profile lookup failed: {0}")]
    Profile(#[source] LookupError),

    #[error("ban lookup failed: {0}")]
    Ban(#[source] LookupError),

    #[error("sign-out failed: {0}")]
    SignOut(#[source] LookupError),
}

impl GateError {
    /// The backend failure underneath this error.
    #[must_use]
    pub fn lookup(&self) -> &LookupError {
        match self {
            Self::Session(e) | Self::Profile(e) | Self::Ban(e) | Self::SignOut(e) => e,
        }
    }
}

/// Durable cache write failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("cache write rejected for {key}: {reason}")]
    Write { key: String, reason: String },
}
