// KioskView URL Classifier
// Maps a URL to the categories the session logic cares about: dashboard, login
// page, idle-exempt "home", and same-host checks. Pure and stateless; anything
// that does not parse classifies as false.

use url::Url;

/// Default path prefix of the dashboard page.
pub const DEFAULT_DASHBOARD_PREFIX: &str = "/protect/dashboard";

/// Default path prefix of the login page.
pub const DEFAULT_LOGIN_PREFIX: &str = "/login";

/// Trait defining the URL classification interface.
pub trait UrlClassifierTrait {
    fn is_home(&self, url: &str) -> bool;
    fn is_dashboard(&self, url: &str) -> bool;
    fn is_login_page(&self, url: &str) -> bool;
}

/// Path-prefix based classifier for one dashboard's URL conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlClassifier {
    dashboard_prefix: String,
    login_prefix: String,
}

impl UrlClassifier {
    pub fn new(dashboard_prefix: &str, login_prefix: &str) -> Self {
        Self {
            dashboard_prefix: dashboard_prefix.to_string(),
            login_prefix: login_prefix.to_string(),
        }
    }

    fn path_starts_with(url: &str, prefix: &str) -> bool {
        Url::parse(url)
            .map(|parsed| parsed.path().starts_with(prefix))
            .unwrap_or(false)
    }
}

impl Default for UrlClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DASHBOARD_PREFIX, DEFAULT_LOGIN_PREFIX)
    }
}

impl UrlClassifierTrait for UrlClassifier {
    /// True for idle-exempt locations: the dashboard and the login page.
    fn is_home(&self, url: &str) -> bool {
        self.is_dashboard(url) || self.is_login_page(url)
    }

    fn is_dashboard(&self, url: &str) -> bool {
        Self::path_starts_with(url, &self.dashboard_prefix)
    }

    fn is_login_page(&self, url: &str) -> bool {
        Self::path_starts_with(url, &self.login_prefix)
    }
}

/// True when both URLs name the same host (case-insensitive) and effective port.
///
/// A missing port is inferred from the scheme (`https` → 443, anything else → 80).
pub fn same_host(a: &str, b: &str) -> bool {
    let (Ok(a), Ok(b)) = (Url::parse(a), Url::parse(b)) else {
        return false;
    };
    let (Some(host_a), Some(host_b)) = (a.host_str(), b.host_str()) else {
        return false;
    };
    host_a.eq_ignore_ascii_case(host_b) && effective_port(&a) == effective_port(&b)
}

/// True for an absolute http(s) URL with a host, the only kind handed to the
/// system browser.
pub fn is_web_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

fn effective_port(url: &Url) -> u16 {
    url.port()
        .unwrap_or(if url.scheme() == "https" { 443 } else { 80 })
}
