//! Builders for the JavaScript injected into the dashboard page.

use std::time::Duration;

use zeroize::Zeroizing;

const PAGE_SETUP_JS: &str = include_str!("../../resources/scripts/page_setup.js");
const IDLE_OVERLAY_SHOW_JS: &str = include_str!("../../resources/scripts/idle_overlay_show.js");
const IDLE_OVERLAY_HIDE_JS: &str = include_str!("../../resources/scripts/idle_overlay_hide.js");
const EXIT_ZOOMED_JS: &str = include_str!("../../resources/scripts/exit_zoomed.js");
const LOGIN_FILL_JS: &str = include_str!("../../resources/scripts/login_fill.js");

/// Activity watcher, zoom watcher, URL-change hook and page defaults.
/// Safe to run more than once per document.
pub fn page_setup() -> &'static str {
    PAGE_SETUP_JS
}

/// Creates (or refreshes) the countdown overlay for `remaining` time.
pub fn show_idle_overlay(remaining: Duration) -> String {
    IDLE_OVERLAY_SHOW_JS.replace("__KV_REMAINING_MS__", &remaining.as_millis().to_string())
}

pub fn hide_idle_overlay() -> &'static str {
    IDLE_OVERLAY_HIDE_JS
}

/// Clicks the enlarged tile to collapse it. Evaluates to `true` when one was found.
pub fn exit_zoomed_view() -> &'static str {
    EXIT_ZOOMED_JS
}

/// One fill-and-submit try. Evaluates to `true` once the form was found and
/// submitted, `false` while it has not rendered yet.
pub fn login_fill(username: &str, password: &str) -> Zeroizing<String> {
    let user_literal = js_string(username);
    let pass_literal = Zeroizing::new(js_string(password));
    let with_user = LOGIN_FILL_JS.replace("__KV_USERNAME__", &user_literal);
    Zeroizing::new(with_user.replace("__KV_PASSWORD__", &pass_literal))
}

fn js_string(value: &str) -> String {
    // serde_json string literals are valid JavaScript string literals
    serde_json::Value::String(value.to_string()).to_string()
}
