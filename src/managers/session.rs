//! Kiosk session: routes view events and page signals to the idle controller,
//! the auto-login driver and the window state mirror, and owns the
//! configuration they share.

use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::managers::auto_login::{AutoLoginDriver, AutoLoginDriverTrait};
use crate::managers::idle_controller::{IdleController, IdleControllerTrait, IdleState};
use crate::managers::window_state::{WindowChange, WindowStateMirror, WindowStateMirrorTrait};
use crate::page::{self, PageSignal, ZoomCommand};
use crate::services::config_store::{ConfigStore, ConfigStoreTrait};
use crate::services::credential_vault::{CredentialVault, CredentialVaultTrait};
use crate::services::url_classifier::{same_host, UrlClassifier, UrlClassifierTrait};
use crate::timing::{earliest, Clock};
use crate::types::config::SessionConfig;
use crate::types::errors::{ConfigError, CredentialError};
use crate::types::geometry::WindowGeometry;
use crate::types::view::{EmbeddedViewTrait, ScriptOutcome, ScriptPurpose, ViewEvent};

pub const ZOOM_STEP: f64 = 0.1;
pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 5.0;

/// One kiosk session bound to one embedded view.
pub struct KioskSession {
    store: ConfigStore,
    vault: CredentialVault,
    classifier: UrlClassifier,
    idle: IdleController,
    login: AutoLoginDriver,
    window: WindowStateMirror,
    clock: Rc<dyn Clock>,
}

impl KioskSession {
    /// `store` must already hold a loaded configuration.
    pub fn new(
        store: ConfigStore,
        vault: CredentialVault,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let config = store
            .get()
            .ok_or_else(|| ConfigError::InvalidValue("No configuration loaded".to_string()))?;
        if !config.validate_ssl {
            warn!("validateSSL is off but certificate checks cannot be relaxed in this view");
        }

        let classifier = UrlClassifier::default();
        let idle = IdleController::new(config.idle_timeout_seconds, classifier.clone());
        let login = AutoLoginDriver::new(classifier.clone());
        let window = WindowStateMirror::new(config.window_state.as_ref());

        Ok(Self {
            store,
            vault,
            classifier,
            idle,
            login,
            window,
            clock,
        })
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.store.get()
    }

    pub fn home_url(&self) -> &str {
        self.store.get().map(|c| c.start_url.as_str()).unwrap_or_default()
    }

    pub fn idle_state(&self) -> IdleState {
        self.idle.state()
    }

    pub fn idle(&self) -> &IdleController {
        &self.idle
    }

    pub fn is_login_active(&self) -> bool {
        self.login.is_attempt_active()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Encrypts and saves a credential. `password` of `None` keeps the stored secret.
    pub fn set_credentials(
        &mut self,
        username: &str,
        password: Option<&str>,
    ) -> Result<(), CredentialError> {
        let mut updated = self
            .store
            .get()
            .cloned()
            .ok_or(CredentialError::MissingCredential)?;
        self.vault.store(&mut updated, username, password)?;
        self.store.replace(updated)?;
        Ok(())
    }

    pub fn handle_event(&mut self, event: ViewEvent, view: &mut dyn EmbeddedViewTrait) {
        let now = self.clock.now();
        match event {
            ViewEvent::NavigationStarted(url) => {
                debug!(url = %url, "navigation started");
                self.login.on_navigation_started(&url);
                self.idle.on_navigation(&url, now, view);
            }
            ViewEvent::NavigationFinished { url, status } => {
                debug!(url = %url, status, "navigation finished");
                // A late finish for an earlier page must not outvote a newer navigation
                let latest = view.current_url().unwrap_or(url);
                self.idle.on_navigation(&latest, now, view);
                self.adopt_home_url(&latest);
                self.try_auto_login(&latest, now, view);
            }
            ViewEvent::InPageNavigation(url) => self.on_in_page_navigation(&url, now, view),
            ViewEvent::DomReady => {
                view.execute_script(ScriptPurpose::PageSetup, page::scripts::page_setup());
                self.idle.on_dom_ready(now, view);
                if let Some(url) = view.current_url() {
                    self.try_auto_login(&url, now, view);
                }
            }
            ViewEvent::ConsoleMessage(text) => match page::decode(&text) {
                Some(signal) => self.handle_signal(signal, now, view),
                None => trace!("ignoring page message"),
            },
            ViewEvent::ViewCrashed => {
                let home = self.home_url().to_string();
                warn!(home = %home, "web view crashed, reloading home");
                view.navigate_to(&home);
            }
            ViewEvent::ScriptCompleted { purpose, outcome } => {
                self.on_script_completed(purpose, outcome, now, view)
            }
        }
    }

    pub fn handle_window_change(&mut self, change: WindowChange, snapshot: WindowGeometry) {
        let now = self.clock.now();
        self.window.on_window_change(change, snapshot, now);
    }

    /// Fires every timer that is due.
    pub fn poll_timers(&mut self, view: &mut dyn EmbeddedViewTrait) {
        let now = self.clock.now();
        let home = self.home_url().to_string();
        self.idle.poll(now, &home, view);
        self.login.poll(now, view);
        self.window.poll(now, &mut self.store);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.idle.next_deadline(),
            self.login.next_deadline(),
            self.window.next_deadline(),
        ])
    }

    /// Writes state that is still waiting on a debounce.
    pub fn shutdown(&mut self) {
        if self.window.flush(&mut self.store) {
            debug!("flushed pending window state");
        }
    }

    fn handle_signal(&mut self, signal: PageSignal, now: Instant, view: &mut dyn EmbeddedViewTrait) {
        match signal {
            PageSignal::ActivityDetected => self.idle.on_activity(now, view),
            PageSignal::ZoomStateChanged(zoomed) => {
                debug!(zoomed, "zoomed view state changed");
                self.idle.on_zoom_changed(zoomed, now, view);
            }
            PageSignal::PageZoom(command) => apply_zoom(command, view),
            PageSignal::UrlChanged(url) => self.on_in_page_navigation(&url, now, view),
        }
    }

    fn on_in_page_navigation(&mut self, url: &str, now: Instant, view: &mut dyn EmbeddedViewTrait) {
        debug!(url, "in-page navigation");
        self.idle.on_navigation(url, now, view);
        self.adopt_home_url(url);
    }

    fn on_script_completed(
        &mut self,
        purpose: ScriptPurpose,
        outcome: ScriptOutcome,
        now: Instant,
        view: &mut dyn EmbeddedViewTrait,
    ) {
        match purpose {
            ScriptPurpose::LoginFill { attempt } => {
                self.login.on_script_completed(attempt, &outcome, now, view)
            }
            ScriptPurpose::ExitZoomedView => {
                if outcome.is_true() {
                    info!("exited zoomed view");
                } else {
                    debug!(?outcome, "no zoomed view to exit");
                }
            }
            ScriptPurpose::PageSetup | ScriptPurpose::IdleOverlay => {
                if let ScriptOutcome::Failed(reason) = outcome {
                    debug!(?purpose, "script failed: {}", reason);
                }
            }
        }
    }

    fn try_auto_login(&mut self, url: &str, now: Instant, view: &mut dyn EmbeddedViewTrait) {
        let Some(config) = self.store.get() else {
            return;
        };
        self.login.on_page_loaded(url, config, &self.vault, now, view);
    }

    /// Remembers a dashboard URL on the home host as the new home URL.
    fn adopt_home_url(&mut self, url: &str) {
        if !self.classifier.is_dashboard(url) {
            return;
        }
        let home = self.home_url();
        if url == home || !same_host(url, home) {
            return;
        }
        let adopted = url.to_string();
        match self.store.mutate(|mut config| {
            config.start_url = adopted;
            config
        }) {
            Ok(()) => info!(url, "home URL updated"),
            Err(e) => warn!("failed to persist home URL: {}", e),
        }
    }
}

fn apply_zoom(command: ZoomCommand, view: &mut dyn EmbeddedViewTrait) {
    let current = view.zoom_level();
    let level = match command {
        ZoomCommand::In => current + ZOOM_STEP,
        ZoomCommand::Out => current - ZOOM_STEP,
        ZoomCommand::Reset => 1.0,
    };
    let level = level.clamp(MIN_ZOOM, MAX_ZOOM);
    debug!(level, "page zoom");
    view.set_zoom_level(level);
}
