use super::*;
use crate::model::Profile;

fn staff(role: Option<&str>, is_author: bool) -> GateState {
    let p = Profile { id: "p1".into(), user_id: "u1".into(), is_author, role: role.map(str::to_owned) };
    GateState::Ready(GateDecision::signed_in(Some(&p)))
}

const UNAUTHORIZED: Verdict = Verdict::Redirect(Redirect::Unauthorized);

#[test]
fn loading_never_redirects() {
    assert_eq!(evaluate(&GateState::Loading, "/admin/analytics"), Verdict::Loading);
}

#[test]
fn unauthenticated_goes_to_admin_signin_regardless_of_flags() {
    for has_profile in [None, Some(false), Some(true)] {
        let decision = GateDecision {
            authenticated: false,
            has_profile,
            role: Some("admin".into()),
            is_author: true,
            ..GateDecision::default()
        };
        assert_eq!(
            evaluate(&GateState::Ready(decision), "/admin/blog"),
            Verdict::Redirect(Redirect::AdminSignIn { return_to: Some("/admin/blog".into()) })
        );
    }
}

#[test]
fn missing_profile_is_unauthorized_not_onboarding() {
    let state = GateState::Ready(GateDecision::signed_in(None));
    assert_eq!(evaluate(&state, "/admin/analytics"), UNAUTHORIZED);
}

#[test]
fn admin_reaches_every_admin_path() {
    let state = staff(Some("admin"), false);
    for path in ["/admin", "/admin/user-management", "/admin/blog/new", "/admin/broadcast"] {
        assert_eq!(evaluate(&state, path), Verdict::Render, "{path}");
    }
}

#[test]
fn author_scoped_to_blog_management() {
    let state = staff(None, true);
    assert_eq!(evaluate(&state, "/admin/blog/edit/123"), Verdict::Render);
    assert_eq!(evaluate(&state, "/admin/blog"), Verdict::Render);
    assert_eq!(evaluate(&state, "/admin/user-management"), UNAUTHORIZED);
    assert_eq!(evaluate(&state, "/admin"), UNAUTHORIZED);
}

#[test]
fn author_role_string_is_not_admin() {
    let state = staff(Some("author"), true);
    assert_eq!(evaluate(&state, "/admin/analytics"), UNAUTHORIZED);
    assert_eq!(evaluate(&state, "/admin/blog/edit/9"), Verdict::Render);
}

#[test]
fn author_prefix_match_is_segment_aware() {
    let state = staff(None, true);
    assert_eq!(evaluate(&state, "/admin/blogroll"), UNAUTHORIZED);
}

#[test]
fn plain_user_is_unauthorized_everywhere() {
    let state = staff(Some("member"), false);
    assert_eq!(evaluate(&state, "/admin/blog/edit/1"), UNAUTHORIZED);
    assert_eq!(evaluate(&state, "/admin"), UNAUTHORIZED);
}

#[test]
fn banned_staff_sees_ban_screen() {
    let p = Profile { id: "p1".into(), user_id: "u1".into(), is_author: false, role: Some("admin".into()) };
    let state = GateState::Ready(GateDecision::signed_in(Some(&p)).with_ban(true));
    assert_eq!(evaluate(&state, "/admin"), Verdict::Banned);
}
