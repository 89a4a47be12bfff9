use super::*;

fn profile(role: Option<&str>, is_author: bool) -> Profile {
    Profile { id: "abc".into(), user_id: "u1".into(), is_author, role: role.map(str::to_owned) }
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn ban_key_lowercases_and_trims_email() {
    let session = Session { user_id: "u1".into(), email: "  Alice@Example.COM ".into(), role_claim: None };
    assert_eq!(session.ban_key(), "alice@example.com");
}

// =============================================================================
// GateDecision
// =============================================================================

#[test]
fn signed_out_leaves_profile_unknown() {
    let decision = GateDecision::signed_out();
    assert!(!decision.authenticated);
    assert_eq!(decision.has_profile, None);
    assert!(!decision.is_banned);
}

#[test]
fn signed_in_without_profile_is_explicit_false() {
    let decision = GateDecision::signed_in(None);
    assert!(decision.authenticated);
    assert_eq!(decision.has_profile, Some(false));
    assert!(decision.profile_id.is_none());
}

#[test]
fn signed_in_with_profile_copies_capabilities() {
    let p = profile(Some("admin"), true);
    let decision = GateDecision::signed_in(Some(&p));
    assert_eq!(decision.has_profile, Some(true));
    assert_eq!(decision.profile_id.as_deref(), Some("abc"));
    assert!(decision.is_author);
    assert!(decision.is_admin());
}

#[test]
fn is_admin_requires_exact_role() {
    let p = profile(Some("Admin"), false);
    assert!(!GateDecision::signed_in(Some(&p)).is_admin());
    let p = profile(None, false);
    assert!(!GateDecision::signed_in(Some(&p)).is_admin());
}

#[test]
fn with_ban_sets_flag_only() {
    let decision = GateDecision::signed_in(None).with_ban(true);
    assert!(decision.is_banned);
    assert_eq!(decision.has_profile, Some(false));
}

// =============================================================================
// GateState
// =============================================================================

#[test]
fn decision_only_available_when_ready() {
    assert!(GateState::Loading.decision().is_none());
    assert!(GateState::Unavailable { reason: "down".into() }.decision().is_none());
    let ready = GateState::Ready(GateDecision::signed_out());
    assert_eq!(ready.decision(), Some(&GateDecision::signed_out()));
}

#[test]
fn gate_state_serializes_with_tag() {
    let json = serde_json::to_value(GateState::Unavailable { reason: "timeout".into() }).unwrap();
    assert_eq!(json["state"], "unavailable");
    assert_eq!(json["reason"], "timeout");

    let json = serde_json::to_value(GateState::Loading).unwrap();
    assert_eq!(json["state"], "loading");
}

#[test]
fn ban_notice_uses_fixed_message() {
    let notice = BanNotice::new("help@example.com");
    assert_eq!(notice.message, BAN_MESSAGE);
    assert_eq!(notice.support_contact, "help@example.com");
}
