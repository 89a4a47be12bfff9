//! Session gating for protected pages.
//!
//! This crate owns the decision of what a visitor sees when they navigate to
//! a protected page: the page itself, a redirect, a loading indicator, or an
//! error screen. It knows nothing about HTTP or the DOM; hosts plug in the
//! auth provider, profile directory, ban list, and durable cache through the
//! traits in [`provider`] and [`store`].
//!
//! ARCHITECTURE
//! ============
//! - [`resolver::SessionResolver`] turns the ambient session into a
//!   [`model::GateDecision`], writing the optimistic cache as it goes.
//! - [`watcher::SessionWatcher`] re-runs the resolver on every
//!   [`events::AuthEvent`] and publishes the latest [`model::GateState`].
//! - [`user_gate`] and [`admin_gate`] are pure decision tables from a
//!   `GateState` and a path to a [`verdict::Verdict`].

pub mod admin_gate;
pub mod error;
pub mod events;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod retry;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod user_gate;
pub mod verdict;
pub mod watcher;

pub use error::{GateError, LookupError, StoreError};
pub use events::{AuthEvent, AuthEvents, Subscription};
pub use model::{BanNotice, GateDecision, GateState, Profile, Session};
pub use provider::{AuthProvider, BanList, ProfileDirectory};
pub use resolver::{SessionResolver, SignInOutcome};
pub use retry::RetryPolicy;
pub use store::{CachedFlags, MemoryStore, SessionStore};
pub use verdict::{Redirect, Verdict};
pub use watcher::{GateHandle, SessionWatcher};

/// Sign-in page for the user-facing site.
pub const SIGNIN_PATH: &str = "/signin";
/// Sign-in page for the back-office.
pub const ADMIN_SIGNIN_PATH: &str = "/admin/signin";
/// First-run profile setup.
pub const ONBOARDING_PATH: &str = "/onboarding";
/// Root of the signed-in user area.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Landing page for authenticated users without the required capability.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
/// Root of the back-office.
pub const ADMIN_PATH: &str = "/admin";
/// Admin paths an author may reach without the admin role.
pub const BLOG_ADMIN_PREFIX: &str = "/admin/blog";
