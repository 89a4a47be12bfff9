//! Server-rendered HTML for the gate's own screens and the page shells the
//! browser bundle mounts into.

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;

use axum::response::Html;
use gate::{ADMIN_SIGNIN_PATH, BanNotice, DASHBOARD_PATH, GateDecision, SIGNIN_PATH};

/// Seconds before the loading screen asks the browser to try again.
pub const LOADING_REFRESH_SECS: u32 = 1;

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, head: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title>{head}</head><body>{body}</body></html>",
        escape_html(title)
    ))
}

fn signin_form(heading: &str, redirect: &str) -> String {
    format!(
        "<main class=\"signin\"><h1>{heading}</h1>\
         <form method=\"post\" action=\"/auth/callback\">\
         <input type=\"hidden\" name=\"redirect\" value=\"{}\">\
         <input type=\"hidden\" name=\"access_token\" id=\"access_token\">\
         <div id=\"auth-widget\"></div>\
         </form></main>",
        escape_html(redirect)
    )
}

// =============================================================================
// SIGN-IN
// =============================================================================

/// User sign-in. The hosted auth widget fills `access_token` and submits.
#[must_use]
pub fn signin(redirect: &str) -> Html<String> {
    layout("Sign in", "", &signin_form("Sign in", redirect))
}

#[must_use]
pub fn admin_signin(redirect: &str) -> Html<String> {
    layout("Admin sign in", "", &signin_form("Admin sign in", redirect))
}

// =============================================================================
// GATE SCREENS
// =============================================================================

/// Terminal ban screen. Carries no redirect or refresh.
#[must_use]
pub fn banned(notice: &BanNotice) -> Html<String> {
    let contact = escape_html(&notice.support_contact);
    let body = format!(
        "<main class=\"banned\" role=\"alert\"><h1>Account blocked</h1><p>{}</p>\
         <p><a href=\"mailto:{contact}\">{contact}</a></p></main>",
        escape_html(&notice.message)
    );
    layout("Account blocked", "", &body)
}

#[must_use]
pub fn loading(path: &str) -> Html<String> {
    let head = format!(
        "<meta http-equiv=\"refresh\" content=\"{LOADING_REFRESH_SECS};url={}\">",
        escape_html(path)
    );
    layout("Loading", &head, "<main class=\"loading\" aria-busy=\"true\"><div class=\"spinner\"></div></main>")
}

/// Backend unreachable. Offers a manual retry of the same page.
#[must_use]
pub fn unavailable(retry_path: &str) -> Html<String> {
    let body = format!(
        "<main class=\"unavailable\"><h1>We can't reach our servers</h1>\
         <p>Your session could not be checked right now.</p>\
         <p><a href=\"{}\">Try again</a></p></main>",
        escape_html(retry_path)
    );
    layout("Temporarily unavailable", "", &body)
}

#[must_use]
pub fn unauthorized() -> Html<String> {
    let body = format!(
        "<main class=\"unauthorized\"><h1>Not authorized</h1>\
         <p>Your account cannot open this page.</p>\
         <p><a href=\"{DASHBOARD_PATH}\">Back to dashboard</a> or \
         <a href=\"{ADMIN_SIGNIN_PATH}\">sign in as another user</a>.</p></main>"
    );
    layout("Not authorized", "", &body)
}

// =============================================================================
// PAGE SHELLS
// =============================================================================

fn shell(title: &str, app: &str, decision: &GateDecision, path: &str) -> Html<String> {
    let body = format!(
        "<div id=\"app\" data-app=\"{app}\" data-path=\"{}\" data-profile-id=\"{}\" \
         data-role=\"{}\" data-author=\"{}\"></div>\
         <form method=\"post\" action=\"/auth/signout\"><button>Sign out</button></form>\
         <script type=\"module\" src=\"/assets/{app}.js\"></script>",
        escape_html(path),
        escape_html(decision.profile_id.as_deref().unwrap_or_default()),
        escape_html(decision.role.as_deref().unwrap_or_default()),
        decision.is_author,
    );
    layout(title, "", &body)
}

#[must_use]
pub fn dashboard(decision: &GateDecision, path: &str) -> Html<String> {
    shell("Dashboard", "dashboard", decision, path)
}

#[must_use]
pub fn onboarding() -> Html<String> {
    let body = format!(
        "<div id=\"app\" data-app=\"onboarding\"></div>\
         <p class=\"hint\">Already have an account? <a href=\"{SIGNIN_PATH}\">Sign in</a></p>\
         <script type=\"module\" src=\"/assets/onboarding.js\"></script>"
    );
    layout("Welcome", "", &body)
}

#[must_use]
pub fn admin(decision: &GateDecision, path: &str) -> Html<String> {
    shell("Admin", "admin", decision, path)
}
