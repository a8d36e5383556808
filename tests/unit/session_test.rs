use std::rc::Rc;
use std::time::Duration;

use kioskview::app::App;
use kioskview::headless::{HeadlessView, ViewCommand};
use kioskview::managers::idle_controller::IdleState;
use kioskview::managers::session::{KioskSession, MAX_ZOOM};
use kioskview::managers::window_state::{WindowChange, SAVE_DEBOUNCE};
use kioskview::services::config_store::{ConfigStore, ConfigStoreTrait};
use kioskview::services::credential_vault::CredentialVault;
use kioskview::services::safe_storage::{LocalKeySafeStorage, UnavailableSafeStorage, KEY_FILE_NAME};
use kioskview::timing::ManualClock;
use kioskview::types::config::{SessionConfig, DEFAULT_HOME_URL};
use kioskview::types::errors::{ConfigError, CredentialError};
use kioskview::types::geometry::WindowGeometry;
use kioskview::types::view::{EmbeddedViewTrait, ScriptOutcome, ScriptPurpose, ViewEvent};
use serde_json::Value;

const HOME: &str = "https://nvr.local/protect/dashboard";
const AWAY: &str = "https://nvr.local/protect/devices";
const LOGIN: &str = "https://nvr.local/login";
const TIMEOUT_SECS: i64 = 30;

struct Harness {
    _dir: tempfile::TempDir,
    config_path: String,
    clock: Rc<ManualClock>,
    session: KioskSession,
    view: HeadlessView,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json").to_string_lossy().to_string();
    let mut store = ConfigStore::new(Some(config_path.clone()));
    let mut config = SessionConfig::new(HOME).unwrap();
    config.idle_timeout_seconds = TIMEOUT_SECS;
    store.replace(config).unwrap();

    let vault = CredentialVault::new(Box::new(LocalKeySafeStorage::open(
        dir.path().join(KEY_FILE_NAME),
    )));
    let clock = Rc::new(ManualClock::new());
    let session = KioskSession::new(store, vault, clock.clone()).unwrap();
    Harness {
        _dir: dir,
        config_path,
        clock,
        session,
        view: HeadlessView::at(HOME),
    }
}

impl Harness {
    fn send(&mut self, event: ViewEvent) {
        self.session.handle_event(event, &mut self.view);
    }

    fn navigate(&mut self, url: &str) {
        self.view.set_current_url(url);
        self.send(ViewEvent::NavigationStarted(url.to_string()));
        self.send(ViewEvent::NavigationFinished {
            url: url.to_string(),
            status: Some(200),
        });
    }

    fn page_says(&mut self, text: &str) {
        self.send(ViewEvent::ConsoleMessage(text.to_string()));
    }

    fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
        self.session.poll_timers(&mut self.view);
    }

    fn persisted(&self) -> SessionConfig {
        let mut store = ConfigStore::new(Some(self.config_path.clone()));
        store.load().unwrap().unwrap()
    }
}

#[test]
fn test_idle_timeout_returns_home() {
    let mut h = harness();
    h.navigate(AWAY);
    assert_eq!(h.session.idle_state(), IdleState::Away);

    h.advance(Duration::from_secs(TIMEOUT_SECS as u64));

    assert_eq!(h.view.navigations(), vec![HOME]);
    assert_eq!(h.session.idle_state(), IdleState::Home);
}

#[test]
fn test_page_activity_postpones_timeout() {
    let mut h = harness();
    h.navigate(AWAY);

    h.advance(Duration::from_secs(20));
    h.page_says("kioskview:activity");
    h.advance(Duration::from_secs(20));
    assert!(h.view.navigations().is_empty());

    h.advance(Duration::from_secs(TIMEOUT_SECS as u64));
    assert_eq!(h.view.navigations(), vec![HOME]);
}

#[test]
fn test_unrecognised_page_messages_are_ignored() {
    let mut h = harness();
    h.navigate(AWAY);
    h.view.clear();
    h.page_says("console noise");
    assert!(h.view.commands().is_empty());
}

#[test]
fn test_dom_ready_installs_page_setup() {
    let mut h = harness();
    h.send(ViewEvent::DomReady);
    assert_eq!(
        h.view
            .scripts(|p| *p == ScriptPurpose::PageSetup)
            .len(),
        1
    );
}

#[test]
fn test_zoomed_dashboard_counts_down_and_exits_zoom() {
    let mut h = harness();
    h.navigate(HOME);
    h.page_says("kioskview:zoomed-on");
    assert_eq!(h.session.idle_state(), IdleState::ZoomedOverride);

    h.advance(Duration::from_secs(TIMEOUT_SECS as u64));

    assert!(h.view.navigations().is_empty());
    assert_eq!(
        h.view.scripts(|p| *p == ScriptPurpose::ExitZoomedView).len(),
        1
    );
}

#[test]
fn test_spa_url_change_is_treated_as_navigation() {
    let mut h = harness();
    h.navigate(HOME);
    h.page_says(&format!("kioskview:url-changed:{}", AWAY));
    assert_eq!(h.session.idle_state(), IdleState::Away);
}

#[test]
fn test_dashboard_url_on_home_host_becomes_home() {
    let mut h = harness();
    let camera = "https://nvr.local/protect/dashboard/front-door";
    h.navigate(camera);

    assert_eq!(h.session.home_url(), camera);
    assert_eq!(h.persisted().start_url, camera);
}

#[test]
fn test_home_url_adopted_even_when_idle_disabled() {
    let mut h = harness();
    let mut store = ConfigStore::new(Some(h.config_path.clone()));
    store.load().unwrap();
    store
        .mutate(|mut c| {
            c.idle_timeout_seconds = 0;
            c
        })
        .unwrap();
    let vault = CredentialVault::new(Box::new(UnavailableSafeStorage));
    h.session = KioskSession::new(store, vault, h.clock.clone()).unwrap();

    let camera = "https://nvr.local/protect/dashboard/yard";
    h.navigate(camera);
    assert_eq!(h.session.idle_state(), IdleState::Disabled);
    assert_eq!(h.session.home_url(), camera);
}

#[test]
fn test_login_and_foreign_urls_do_not_become_home() {
    let mut h = harness();
    h.navigate(LOGIN);
    h.navigate("https://other.local/protect/dashboard");
    h.navigate(AWAY);
    assert_eq!(h.session.home_url(), HOME);
    assert_eq!(h.persisted().start_url, HOME);
}

#[test]
fn test_crash_reloads_home() {
    let mut h = harness();
    h.navigate(AWAY);
    h.send(ViewEvent::ViewCrashed);
    assert_eq!(h.view.navigations(), vec![HOME]);
}

#[test]
fn test_zoom_shortcuts_step_and_clamp() {
    let mut h = harness();
    h.page_says("kioskview:zoom-in");
    assert!((h.view.zoom_level() - 1.1).abs() < 1e-9);

    for _ in 0..100 {
        h.page_says("kioskview:zoom-in");
    }
    assert_eq!(h.view.zoom_level(), MAX_ZOOM);

    h.page_says("kioskview:zoom-reset");
    assert_eq!(h.view.zoom_level(), 1.0);

    for _ in 0..100 {
        h.page_says("kioskview:zoom-out");
    }
    assert_eq!(h.view.zoom_level(), 0.25);
}

#[test]
fn test_login_page_triggers_single_auto_login() {
    let mut h = harness();
    h.session
        .set_credentials("operator", Some("hunter2"))
        .unwrap();
    assert!(h.persisted().has_credentials());

    h.navigate(LOGIN);
    h.send(ViewEvent::DomReady);

    let attempts = h.view.login_attempts();
    assert_eq!(attempts.len(), 1);
    assert!(h.session.is_login_active());

    h.send(ViewEvent::ScriptCompleted {
        purpose: ScriptPurpose::LoginFill {
            attempt: attempts[0],
        },
        outcome: ScriptOutcome::Value(Value::Bool(true)),
    });
    assert!(!h.session.is_login_active());
}

#[test]
fn test_login_attempt_is_bounded_in_time() {
    let mut h = harness();
    h.session
        .set_credentials("operator", Some("hunter2"))
        .unwrap();
    h.navigate(LOGIN);

    for _ in 0..50 {
        if h.session.next_deadline().is_none() {
            break;
        }
        h.advance(Duration::from_millis(500));
    }
    assert!(!h.session.is_login_active());
}

#[test]
fn test_window_changes_are_persisted_after_debounce() {
    let mut h = harness();
    let geometry = WindowGeometry {
        width: 1280,
        height: 720,
        x: Some(10),
        y: Some(20),
        ..WindowGeometry::default()
    };
    h.session
        .handle_window_change(WindowChange::Resized, geometry.clone());
    assert!(h.persisted().window_state.is_none());

    h.advance(SAVE_DEBOUNCE);
    assert_eq!(h.persisted().window_state, Some(geometry));
}

#[test]
fn test_shutdown_flushes_pending_window_state() {
    let mut h = harness();
    let geometry = WindowGeometry {
        always_on_top: true,
        dev_tools_open: true,
        ..WindowGeometry::default()
    };
    h.session
        .handle_window_change(WindowChange::DevToolsOpened, geometry.clone());
    h.session.shutdown();
    assert_eq!(h.persisted().window_state, Some(geometry));
}

#[test]
fn test_next_deadline_reflects_countdown() {
    let mut h = harness();
    assert!(h.session.next_deadline().is_none());
    h.navigate(AWAY);
    assert!(h.session.next_deadline().is_some());
}

#[test]
fn test_overlay_commands_accompany_countdown() {
    let mut h = harness();
    h.navigate(AWAY);
    h.navigate(HOME);
    let overlays = h
        .view
        .commands()
        .iter()
        .filter(|c| {
            matches!(
                c,
                ViewCommand::Script {
                    purpose: ScriptPurpose::IdleOverlay,
                    ..
                }
            )
        })
        .count();
    // One show per away navigation event, one hide on return
    assert_eq!(overlays, 3);
}

#[test]
fn test_app_seeds_default_config_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json").to_string_lossy().to_string();

    let app = App::with_parts(
        ConfigStore::new(Some(path.clone())),
        Box::new(UnavailableSafeStorage),
        None,
        Rc::new(ManualClock::new()),
    )
    .unwrap();
    assert_eq!(app.session.home_url(), DEFAULT_HOME_URL);

    let mut store = ConfigStore::new(Some(path));
    let saved = store.load().unwrap().unwrap();
    assert_eq!(saved.start_url, DEFAULT_HOME_URL);
    assert_eq!(saved.idle_timeout_seconds, 300);
}

#[test]
fn test_app_home_override_only_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json").to_string_lossy().to_string();
    let clock = Rc::new(ManualClock::new());

    let first = App::with_parts(
        ConfigStore::new(Some(path.clone())),
        Box::new(UnavailableSafeStorage),
        Some(HOME),
        clock.clone(),
    )
    .unwrap();
    assert_eq!(first.session.home_url(), HOME);

    let second = App::with_parts(
        ConfigStore::new(Some(path)),
        Box::new(UnavailableSafeStorage),
        Some("https://elsewhere.local/protect/dashboard"),
        clock,
    )
    .unwrap();
    assert_eq!(second.session.home_url(), HOME);
}

#[test]
fn test_app_keeps_user_fields_when_idle_timeout_is_fractional() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json").to_string_lossy().to_string();
    std::fs::write(
        &path,
        r#"{"startUrl":"https://nvr.local/protect/dashboard/abc","idleTimeoutSeconds":90.5,"username":"alice","passwordEnc":"AAAA","theme":"dark"}"#,
    )
    .unwrap();

    let app = App::with_parts(
        ConfigStore::new(Some(path.clone())),
        Box::new(UnavailableSafeStorage),
        None,
        Rc::new(ManualClock::new()),
    )
    .unwrap();

    assert_eq!(app.session.home_url(), "https://nvr.local/protect/dashboard/abc");
    let config = app.session.config().unwrap();
    assert_eq!(config.idle_timeout_seconds, 90);
    assert_eq!(config.username.as_deref(), Some("alice"));
    assert_eq!(config.password_enc.as_deref(), Some("AAAA"));

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["username"], "alice");
    assert_eq!(on_disk["passwordEnc"], "AAAA");
    assert_eq!(on_disk["theme"], "dark");
}

#[test]
fn test_app_moves_unreadable_config_aside_before_seeding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json").to_string_lossy().to_string();
    let original = r#"{"startUrl":"https://nvr.local/protect/dashboard/abc","username":"alice","passwordEnc":"AAAA","windowState":{"height":600}}"#;
    std::fs::write(&path, original).unwrap();

    let app = App::with_parts(
        ConfigStore::new(Some(path.clone())),
        Box::new(UnavailableSafeStorage),
        None,
        Rc::new(ManualClock::new()),
    )
    .unwrap();

    assert_eq!(app.session.home_url(), DEFAULT_HOME_URL);
    let backup = format!("{}.bak", path);
    assert_eq!(std::fs::read_to_string(&backup).unwrap(), original);

    let mut store = ConfigStore::new(Some(path));
    assert_eq!(store.load().unwrap().unwrap().start_url, DEFAULT_HOME_URL);
}

#[test]
fn test_late_finish_for_earlier_page_uses_latest_url() {
    let mut h = harness();
    h.navigate(HOME);
    h.view.set_current_url(AWAY);
    h.send(ViewEvent::NavigationStarted(AWAY.to_string()));

    h.send(ViewEvent::NavigationFinished {
        url: HOME.to_string(),
        status: Some(200),
    });

    assert_eq!(h.session.idle_state(), IdleState::Away);
    assert!(h.session.next_deadline().is_some());
}

#[test]
fn test_credential_save_failure_is_a_storage_error() {
    let mut h = harness();
    std::fs::remove_file(&h.config_path).unwrap();
    std::fs::create_dir(&h.config_path).unwrap();

    let result = h.session.set_credentials("operator", Some("hunter2"));

    assert!(matches!(
        result,
        Err(CredentialError::Storage(ConfigError::IoError(_)))
    ));
    assert!(h.session.config().unwrap().has_credentials());
}
