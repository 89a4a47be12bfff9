//! Cookie-backed session cache.
//!
//! DESIGN
//! ======
//! The browser's durable cache travels as three plain cookies so the page
//! bundle can read them for optimistic rendering. A `CookieCache` wraps the
//! request's jar; every write becomes a `Set-Cookie` on the response once the
//! handler returns [`CookieCache::jar`].

#[cfg(test)]
#[path = "cookie_cache_test.rs"]
mod tests;

use std::sync::{Mutex, MutexGuard, PoisonError};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use gate::{SessionStore, StoreError};
use time::Duration;

const CACHE_MAX_AGE_DAYS: i64 = 30;

pub struct CookieCache {
    jar: Mutex<CookieJar>,
    secure: bool,
}

impl CookieCache {
    #[must_use]
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar: Mutex::new(jar), secure }
    }

    /// Snapshot of the jar including every pending change.
    #[must_use]
    pub fn jar(&self) -> CookieJar {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for CookieCache {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).map(|c| c.value().to_owned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if value.contains([';', ',', '"']) || value.chars().any(char::is_whitespace) {
            return Err(StoreError::Write { key: key.to_owned(), reason: "value not cookie-safe".to_owned() });
        }
        let cookie = Cookie::build((key.to_owned(), value.to_owned()))
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::days(CACHE_MAX_AGE_DAYS));
        let mut jar = self.lock();
        *jar = std::mem::take(&mut *jar).add(cookie);
        Ok(())
    }

    fn remove(&self, key: &str) {
        let mut jar = self.lock();
        *jar = std::mem::take(&mut *jar).remove(Cookie::build(key.to_owned()).path("/"));
    }
}
