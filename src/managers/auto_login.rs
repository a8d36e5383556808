//! Auto-Login Driver for KioskView.
//!
//! When the view lands on the dashboard's login page it decrypts the stored
//! credential and injects a fill-and-submit script. The script is single-shot;
//! the driver re-injects it every [`POLL_INTERVAL`] until it reports success or
//! [`FILL_TIMEOUT`] elapses.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::page::scripts;
use crate::services::credential_vault::{Credential, CredentialVaultTrait};
use crate::services::url_classifier::{same_host, UrlClassifier, UrlClassifierTrait};
use crate::timing::{earliest, OneShotTimer};
use crate::types::config::SessionConfig;
use crate::types::view::{EmbeddedViewTrait, ScriptOutcome, ScriptPurpose};

/// A second load of the same URL within this window does not re-attempt.
pub const DEDUP_WINDOW: Duration = Duration::from_secs(5);

/// Pause between fill tries while the login form has not rendered yet.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// An attempt that has not submitted by then is abandoned.
pub const FILL_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait defining the auto-login interface.
pub trait AutoLoginDriverTrait {
    /// A page finished loading. Returns true when a new attempt was started.
    fn on_page_loaded(
        &mut self,
        url: &str,
        config: &SessionConfig,
        vault: &dyn CredentialVaultTrait,
        now: Instant,
        view: &mut dyn EmbeddedViewTrait,
    ) -> bool;
    /// The view is leaving for `url`; an attempt bound to another URL stops.
    fn on_navigation_started(&mut self, url: &str);
    fn on_script_completed(
        &mut self,
        attempt: u64,
        outcome: &ScriptOutcome,
        now: Instant,
        view: &mut dyn EmbeddedViewTrait,
    );
    fn poll(&mut self, now: Instant, view: &mut dyn EmbeddedViewTrait);
    fn next_deadline(&self) -> Option<Instant>;
    fn is_attempt_active(&self) -> bool;
}

struct LoginAttempt {
    id: u64,
    url: String,
    started: Instant,
    retry: OneShotTimer,
    credential: Credential,
}

impl LoginAttempt {
    fn expires_at(&self) -> Instant {
        self.started + FILL_TIMEOUT
    }

    fn inject(&self, view: &mut dyn EmbeddedViewTrait) {
        let source = scripts::login_fill(&self.credential.username, &self.credential.password);
        view.execute_script(ScriptPurpose::LoginFill { attempt: self.id }, &source);
    }
}

/// Drives at most one login attempt at a time.
pub struct AutoLoginDriver {
    classifier: UrlClassifier,
    last_attempt: Option<(String, Instant)>,
    active: Option<LoginAttempt>,
    next_id: u64,
}

impl AutoLoginDriver {
    pub fn new(classifier: UrlClassifier) -> Self {
        Self {
            classifier,
            last_attempt: None,
            active: None,
            next_id: 1,
        }
    }

    fn is_duplicate(&self, url: &str, now: Instant) -> bool {
        match &self.last_attempt {
            Some((last_url, at)) => last_url == url && now.duration_since(*at) < DEDUP_WINDOW,
            None => false,
        }
    }
}

impl AutoLoginDriverTrait for AutoLoginDriver {
    fn on_page_loaded(
        &mut self,
        url: &str,
        config: &SessionConfig,
        vault: &dyn CredentialVaultTrait,
        now: Instant,
        view: &mut dyn EmbeddedViewTrait,
    ) -> bool {
        if !self.classifier.is_login_page(url) {
            return false;
        }
        if config.start_url.is_empty() || !same_host(url, &config.start_url) {
            debug!(url, "login page on a foreign host, not filling");
            return false;
        }
        if !config.has_credentials() {
            debug!("no stored credential, skipping auto-login");
            return false;
        }
        if !vault.is_available() {
            warn!("credential storage unavailable, skipping auto-login");
            return false;
        }
        if self.is_duplicate(url, now) {
            debug!(url, "auto-login already attempted recently");
            return false;
        }

        self.last_attempt = Some((url.to_string(), now));

        let credential = match vault.retrieve(config) {
            Ok(credential) => credential,
            Err(e) => {
                warn!("auto-login skipped: {}", e);
                return false;
            }
        };

        let id = self.next_id;
        self.next_id += 1;
        let attempt = LoginAttempt {
            id,
            url: url.to_string(),
            started: now,
            retry: OneShotTimer::new(),
            credential,
        };
        info!(url, attempt = id, "starting auto-login");
        attempt.inject(view);
        self.active = Some(attempt);
        true
    }

    fn on_navigation_started(&mut self, url: &str) {
        let leaving = self.active.as_ref().map(|a| a.url != url).unwrap_or(false);
        if leaving {
            if let Some(attempt) = self.active.take() {
                debug!(attempt = attempt.id, url, "auto-login attempt cancelled by navigation");
            }
        }
    }

    fn on_script_completed(
        &mut self,
        attempt: u64,
        outcome: &ScriptOutcome,
        now: Instant,
        _view: &mut dyn EmbeddedViewTrait,
    ) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.id != attempt {
            return;
        }

        if outcome.is_true() {
            info!(attempt, "auto-login form submitted");
            self.active = None;
            return;
        }
        if let ScriptOutcome::Failed(reason) = outcome {
            debug!(attempt, "login fill try failed: {}", reason);
        }
        if now >= active.expires_at() {
            warn!(attempt, "auto-login timed out waiting for the login form");
            self.active = None;
            return;
        }
        active.retry.start(now, POLL_INTERVAL);
    }

    fn poll(&mut self, now: Instant, view: &mut dyn EmbeddedViewTrait) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if now >= active.expires_at() {
            warn!(attempt = active.id, "auto-login timed out waiting for the login form");
            self.active = None;
            return;
        }
        if active.retry.fire_if_due(now) {
            active.inject(view);
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.active
            .as_ref()
            .and_then(|a| earliest([a.retry.deadline(), Some(a.expires_at())]))
    }

    fn is_attempt_active(&self) -> bool {
        self.active.is_some()
    }
}
