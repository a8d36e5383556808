//! Idle/Session Controller for KioskView.
//!
//! Decides whether the view is "home" or "away", runs the single inactivity
//! countdown, keeps the on-page countdown overlay in step with it and returns
//! the view home (or collapses an enlarged video view) when it expires.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::page::scripts;
use crate::services::url_classifier::{UrlClassifier, UrlClassifierTrait};
use crate::timing::{earliest, Debouncer, OneShotTimer};
use crate::types::view::{EmbeddedViewTrait, ScriptPurpose};

/// Quiet period after the last activity signal before the countdown is re-armed.
pub const RESUME_DEBOUNCE: Duration = Duration::from_secs(1);

/// Where the controller stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    /// Timeout not positive; nothing ever starts.
    Disabled,
    /// On an exempt URL (or waiting out an activity burst); no countdown.
    Home,
    /// Countdown running.
    Away,
    /// Countdown running on an exempt URL because a zoomed view is open.
    ZoomedOverride,
}

/// Trait defining the idle controller interface.
pub trait IdleControllerTrait {
    fn state(&self) -> IdleState;
    /// A navigation start, finish or in-page change to `url`.
    fn on_navigation(&mut self, url: &str, now: Instant, view: &mut dyn EmbeddedViewTrait);
    fn on_activity(&mut self, now: Instant, view: &mut dyn EmbeddedViewTrait);
    fn on_zoom_changed(&mut self, zoomed: bool, now: Instant, view: &mut dyn EmbeddedViewTrait);
    /// The document was rebuilt; the overlay has to be put back if still counting.
    fn on_dom_ready(&mut self, now: Instant, view: &mut dyn EmbeddedViewTrait);
    /// Fires whatever is due at `now`.
    fn poll(&mut self, now: Instant, home_url: &str, view: &mut dyn EmbeddedViewTrait);
    fn next_deadline(&self) -> Option<Instant>;
}

/// One controller per embedded view.
pub struct IdleController {
    classifier: UrlClassifier,
    timeout: Option<Duration>,
    countdown: OneShotTimer,
    resume: Debouncer,
    last_observed_url: Option<String>,
    zoomed: bool,
}

impl IdleController {
    /// `timeout_secs <= 0` yields a permanently disabled controller.
    pub fn new(timeout_secs: i64, classifier: UrlClassifier) -> Self {
        let timeout = if timeout_secs > 0 {
            Some(Duration::from_secs(timeout_secs as u64))
        } else {
            None
        };
        if timeout.is_none() {
            info!("idle timeout disabled");
        }
        Self {
            classifier,
            timeout,
            countdown: OneShotTimer::new(),
            resume: Debouncer::new(RESUME_DEBOUNCE),
            last_observed_url: None,
            zoomed: false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.countdown.deadline()
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn is_resume_pending(&self) -> bool {
        self.resume.is_pending()
    }

    pub fn last_observed_url(&self) -> Option<&str> {
        self.last_observed_url.as_deref()
    }

    fn is_disabled(&self) -> bool {
        self.timeout.is_none()
    }

    /// The view's own idea of its URL wins over the last event we saw.
    fn current_url(&self, view: &dyn EmbeddedViewTrait) -> Option<String> {
        view.current_url().or_else(|| self.last_observed_url.clone())
    }

    fn is_exempt(&self, url: Option<&str>) -> bool {
        url.map(|u| self.classifier.is_home(u)).unwrap_or(false)
    }

    fn start_countdown(&mut self, now: Instant, view: &mut dyn EmbeddedViewTrait) {
        let Some(timeout) = self.timeout else {
            return;
        };
        self.resume.cancel();
        self.countdown.start(now, timeout);
        view.execute_script(ScriptPurpose::IdleOverlay, &scripts::show_idle_overlay(timeout));
        info!(
            secs = timeout.as_secs(),
            url = self.last_observed_url.as_deref().unwrap_or(""),
            zoomed = self.zoomed,
            "idle countdown started"
        );
    }

    fn clear_countdown(&mut self, view: &mut dyn EmbeddedViewTrait) {
        self.resume.cancel();
        if self.countdown.cancel() {
            view.execute_script(ScriptPurpose::IdleOverlay, scripts::hide_idle_overlay());
            debug!("idle countdown cleared");
        }
    }

    fn expire(&mut self, home_url: &str, view: &mut dyn EmbeddedViewTrait) {
        let current = self.current_url(view);
        if self.zoomed && self.is_exempt(current.as_deref()) {
            info!("idle timeout reached while zoomed on dashboard, exiting zoomed view");
            view.execute_script(ScriptPurpose::IdleOverlay, scripts::hide_idle_overlay());
            view.execute_script(ScriptPurpose::ExitZoomedView, scripts::exit_zoomed_view());
        } else {
            // The overlay goes away with the document
            info!(home = home_url, "idle timeout reached, returning home");
            view.navigate_to(home_url);
        }
    }
}

impl IdleControllerTrait for IdleController {
    fn state(&self) -> IdleState {
        if self.is_disabled() {
            IdleState::Disabled
        } else if !self.countdown.is_running() {
            IdleState::Home
        } else if self.zoomed && self.is_exempt(self.last_observed_url.as_deref()) {
            IdleState::ZoomedOverride
        } else {
            IdleState::Away
        }
    }

    fn on_navigation(&mut self, url: &str, now: Instant, view: &mut dyn EmbeddedViewTrait) {
        self.last_observed_url = Some(url.to_string());
        if self.is_disabled() {
            return;
        }
        if self.classifier.is_home(url) && !self.zoomed {
            debug!(url, "navigation to idle-exempt URL");
            self.clear_countdown(view);
        } else {
            self.start_countdown(now, view);
        }
    }

    fn on_activity(&mut self, now: Instant, view: &mut dyn EmbeddedViewTrait) {
        if self.is_disabled() {
            return;
        }
        self.clear_countdown(view);
        self.resume.schedule(now, ());
    }

    fn on_zoom_changed(&mut self, zoomed: bool, now: Instant, view: &mut dyn EmbeddedViewTrait) {
        self.zoomed = zoomed;
        if self.is_disabled() {
            return;
        }
        if zoomed {
            self.start_countdown(now, view);
        } else {
            let current = self.current_url(view);
            if self.is_exempt(current.as_deref()) {
                self.clear_countdown(view);
            }
        }
    }

    fn on_dom_ready(&mut self, now: Instant, view: &mut dyn EmbeddedViewTrait) {
        if let Some(remaining) = self.countdown.remaining(now) {
            if !remaining.is_zero() {
                view.execute_script(
                    ScriptPurpose::IdleOverlay,
                    &scripts::show_idle_overlay(remaining),
                );
            }
        }
    }

    fn poll(&mut self, now: Instant, home_url: &str, view: &mut dyn EmbeddedViewTrait) {
        if self.resume.fire_if_due(now).is_some() {
            let current = self.current_url(view);
            if !self.is_exempt(current.as_deref()) || self.zoomed {
                self.start_countdown(now, view);
            }
        }
        if self.countdown.fire_if_due(now) {
            self.expire(home_url, view);
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        earliest([self.countdown.deadline(), self.resume.deadline()])
    }
}
