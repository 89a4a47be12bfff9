use std::time::Duration;

use super::*;
use crate::error::LookupError;
use crate::store::{AUTHENTICATED_KEY, CACHE_KEYS, HAS_PROFILE_KEY, MemoryStore, PROFILE_ID_KEY};
use crate::testing::{FakeAuth, FakeBans, FakeProfiles, profile, session};

struct Fixture {
    auth: Arc<FakeAuth>,
    profiles: Arc<FakeProfiles>,
    bans: Arc<FakeBans>,
    store: Arc<MemoryStore>,
    resolver: SessionResolver,
}

fn fixture(auth: FakeAuth) -> Fixture {
    let auth = Arc::new(auth);
    let profiles = Arc::new(FakeProfiles::default());
    let bans = Arc::new(FakeBans::default());
    let store = Arc::new(MemoryStore::new());
    let resolver = SessionResolver::new(auth.clone(), profiles.clone(), bans.clone(), store.clone())
        .with_retry(RetryPolicy { retries: 2, base_delay: Duration::from_millis(5) })
        .with_support_contact("help@toolhub.test");
    Fixture { auth, profiles, bans, store, resolver }
}

fn alice() -> Session {
    session("u1", "Alice@Example.com")
}

// =============================================================================
// resolve
// =============================================================================

#[tokio::test]
async fn resolve_without_session_is_signed_out_and_clears_cache() {
    let f = fixture(FakeAuth::signed_out());
    f.store.set(AUTHENTICATED_KEY, "true").unwrap();
    f.store.set(PROFILE_ID_KEY, "stale").unwrap();

    let decision = f.resolver.resolve().await.unwrap();

    assert_eq!(decision, GateDecision::signed_out());
    assert_eq!(decision.has_profile, None);
    for key in CACHE_KEYS {
        assert!(f.store.get(key).is_none());
    }
    assert_eq!(f.profiles.lookups(), 0);
}

#[tokio::test]
async fn resolve_without_profile_row_reports_false() {
    let f = fixture(FakeAuth::signed_in(alice()));
    let decision = f.resolver.resolve().await.unwrap();
    assert!(decision.authenticated);
    assert_eq!(decision.has_profile, Some(false));
    assert_eq!(f.store.get(HAS_PROFILE_KEY).as_deref(), Some("false"));
}

#[tokio::test]
async fn resolve_with_profile_captures_role_and_author_flag() {
    let f = fixture(FakeAuth::signed_in(alice()));
    f.profiles.insert(profile("abc", "u1", Some("admin"), true));

    let decision = f.resolver.resolve().await.unwrap();

    assert_eq!(decision.has_profile, Some(true));
    assert_eq!(decision.role.as_deref(), Some("admin"));
    assert!(decision.is_author);
    assert_eq!(decision.profile_id.as_deref(), Some("abc"));
}

#[tokio::test]
async fn resolve_does_not_consult_ban_list() {
    let f = fixture(FakeAuth::signed_in(alice()));
    f.bans.ban("alice@example.com");
    let decision = f.resolver.resolve().await.unwrap();
    assert!(!decision.is_banned);
    assert_eq!(f.bans.lookups(), 0);
}

#[tokio::test]
async fn cache_round_trip_then_sign_out_clears_all_keys() {
    let f = fixture(FakeAuth::signed_in(alice()));
    f.profiles.insert(profile("abc", "u1", None, false));

    f.resolver.resolve().await.unwrap();
    assert_eq!(f.store.get(AUTHENTICATED_KEY).as_deref(), Some("true"));
    assert_eq!(f.store.get(HAS_PROFILE_KEY).as_deref(), Some("true"));
    assert_eq!(f.store.get(PROFILE_ID_KEY).as_deref(), Some("abc"));

    f.resolver.sign_out().await.unwrap();
    for key in CACHE_KEYS {
        assert!(f.store.get(key).is_none(), "{key} should be absent after sign-out");
    }
    assert_eq!(f.auth.sign_outs(), 1);
}

#[tokio::test(start_paused = true)]
async fn resolve_retries_transient_session_failure() {
    let f = fixture(FakeAuth::signed_in(alice()));
    f.auth.fail_next(LookupError::Timeout);
    let decision = f.resolver.resolve().await.unwrap();
    assert!(decision.authenticated);
    assert_eq!(f.auth.lookups(), 2);
}

#[tokio::test(start_paused = true)]
async fn resolve_surfaces_profile_failure_after_retries() {
    let f = fixture(FakeAuth::signed_in(alice()));
    for _ in 0..3 {
        f.profiles.fail_next(LookupError::Database("connection reset".into()));
    }
    let err = f.resolver.resolve().await.unwrap_err();
    assert!(matches!(err, GateError::Profile(LookupError::Database(_))));
    assert_eq!(f.profiles.lookups(), 3);
}

// =============================================================================
// evaluate
// =============================================================================

#[tokio::test]
async fn evaluate_flags_ban_and_clears_cache() {
    let f = fixture(FakeAuth::signed_in(alice()));
    f.bans.ban("alice@example.com");
    f.store.set(AUTHENTICATED_KEY, "true").unwrap();

    let decision = f.resolver.evaluate().await.unwrap();

    assert!(decision.is_banned);
    assert_eq!(decision.has_profile, Some(false));
    assert!(f.store.get(AUTHENTICATED_KEY).is_none());
    assert_eq!(f.bans.lookups(), 1);
    assert_eq!(f.profiles.lookups(), 1);
}

#[tokio::test]
async fn evaluate_unbanned_writes_cache() {
    let f = fixture(FakeAuth::signed_in(alice()));
    f.profiles.insert(profile("abc", "u1", None, false));
    let decision = f.resolver.evaluate().await.unwrap();
    assert!(!decision.is_banned);
    assert_eq!(f.store.get(PROFILE_ID_KEY).as_deref(), Some("abc"));
}

#[tokio::test]
async fn evaluate_signed_out_skips_lookups() {
    let f = fixture(FakeAuth::signed_out());
    let decision = f.resolver.evaluate().await.unwrap();
    assert!(!decision.authenticated);
    assert_eq!(f.bans.lookups(), 0);
    assert_eq!(f.profiles.lookups(), 0);
}

#[tokio::test]
async fn evaluate_ban_lookup_failure_is_an_error_not_a_pass() {
    let f = fixture(FakeAuth::signed_in(alice()));
    f.bans.fail_next(LookupError::Status { status: 400, body: "bad filter".into() });
    let err = f.resolver.evaluate().await.unwrap_err();
    assert!(matches!(err, GateError::Ban(_)));
}

// =============================================================================
// complete_sign_in
// =============================================================================

#[tokio::test]
async fn complete_sign_in_banned_signs_out_and_halts() {
    let f = fixture(FakeAuth::signed_in(alice()));
    f.bans.ban("ALICE@example.com");
    f.store.set(HAS_PROFILE_KEY, "true").unwrap();

    let outcome = f.resolver.complete_sign_in().await.unwrap();

    let SignInOutcome::Banned(notice) = outcome else {
        panic!("expected ban, got {outcome:?}");
    };
    assert_eq!(notice.support_contact, "help@toolhub.test");
    assert_eq!(notice.message, crate::model::BAN_MESSAGE);
    assert_eq!(f.auth.sign_outs(), 1);
    assert!(f.store.get(HAS_PROFILE_KEY).is_none());
    assert_eq!(f.profiles.lookups(), 0);

    // The provider now reports no session, so the next check sees a signed-out visitor.
    let decision = f.resolver.resolve().await.unwrap();
    assert!(!decision.authenticated);
}

#[tokio::test]
async fn complete_sign_in_proceeds_with_decision() {
    let f = fixture(FakeAuth::signed_in(alice()));
    f.profiles.insert(profile("abc", "u1", None, true));
    let outcome = f.resolver.complete_sign_in().await.unwrap();
    let SignInOutcome::Proceed(decision) = outcome else {
        panic!("expected proceed, got {outcome:?}");
    };
    assert_eq!(decision.has_profile, Some(true));
    assert!(decision.is_author);
    assert_eq!(f.store.get(PROFILE_ID_KEY).as_deref(), Some("abc"));
    assert_eq!(f.auth.sign_outs(), 0);
}

#[tokio::test]
async fn complete_sign_in_without_session_reports_signed_out() {
    let f = fixture(FakeAuth::signed_out());
    assert_eq!(f.resolver.complete_sign_in().await.unwrap(), SignInOutcome::SignedOut);
    assert_eq!(f.bans.lookups(), 0);
}

#[tokio::test]
async fn resolver_uses_default_support_contact() {
    let resolver = SessionResolver::new(
        Arc::new(FakeAuth::signed_out()),
        Arc::new(FakeProfiles::default()),
        Arc::new(FakeBans::default()),
        Arc::new(MemoryStore::new()),
    );
    assert_eq!(resolver.ban_notice().support_contact, DEFAULT_SUPPORT_CONTACT);
}
