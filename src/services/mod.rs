//! Adapters that plug the hosted auth service, Postgres, and browser
//! cookies into the `gate` traits.
//!
//! ARCHITECTURE
//! ============
//! Each adapter owns one backend concern so route handlers only translate
//! between HTTP and gate verdicts.

pub mod auth_client;
pub mod cookie_cache;
pub mod directory;
