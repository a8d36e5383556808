//! KioskView: single-window kiosk browser for a video-surveillance dashboard.
//!
//! Entry point: opens the kiosk window on the configured dashboard.
//! `kioskview set-credentials <username>` stores a login read from stdin.
//! When built without the `gui` feature, runs a console demo instead.

use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn set_credentials(username: &str) -> Result<(), Box<dyn std::error::Error>> {
    use std::io::BufRead;

    use kioskview::services::config_store::ConfigStoreTrait;
    use zeroize::Zeroizing;

    eprintln!("Password for {} (one line on stdin):", username);
    let mut line = Zeroizing::new(String::new());
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);

    let mut app = kioskview::app::App::new(None, None)?;
    let password = if password.is_empty() {
        None
    } else {
        Some(password)
    };
    app.session.set_credentials(username, password)?;
    eprintln!("Credentials saved to {}", app.session.store().get_config_path());
    Ok(())
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("set-credentials") {
        let Some(username) = args.get(1) else {
            eprintln!("usage: kioskview set-credentials <username>");
            std::process::exit(2);
        };
        if let Err(e) = set_credentials(username) {
            eprintln!("Failed to store credentials: {}", e);
            std::process::exit(1);
        }
        return;
    }

    run(args.first().map(String::as_str));
}

#[cfg(feature = "gui")]
fn run(home_override: Option<&str>) {
    kioskview::ui::kiosk_app::run(home_override);
}

#[cfg(not(feature = "gui"))]
fn run(home_override: Option<&str>) {
    demo::run(home_override);
}

#[cfg(not(feature = "gui"))]
mod demo {
    use std::rc::Rc;
    use std::time::Duration;

    use kioskview::app::App;
    use kioskview::headless::HeadlessView;
    use kioskview::services::config_store::ConfigStore;
    use kioskview::services::safe_storage::UnavailableSafeStorage;
    use kioskview::timing::ManualClock;
    use kioskview::types::view::{EmbeddedViewTrait, ViewEvent};

    fn section(name: &str) {
        println!("───────────────────────────────────────────────────────────────");
        println!("  {}", name);
        println!("───────────────────────────────────────────────────────────────");
    }

    pub fn run(home_override: Option<&str>) {
        println!();
        println!("KioskView v{} (demo mode, no window)", env!("CARGO_PKG_VERSION"));
        println!();

        let dir = std::env::temp_dir().join("kioskview-demo");
        let config_path = dir.join("config.json").to_string_lossy().to_string();
        let clock = Rc::new(ManualClock::new());
        let mut app = match App::with_parts(
            ConfigStore::new(Some(config_path)),
            Box::new(UnavailableSafeStorage),
            home_override,
            clock.clone(),
        ) {
            Ok(app) => app,
            Err(e) => {
                eprintln!("Failed to start: {}", e);
                return;
            }
        };
        app.startup();

        let home = app.session.home_url().to_string();
        let away = match url::Url::parse(&home).and_then(|u| u.join("/protect/devices")) {
            Ok(u) => u.to_string(),
            Err(_) => home.clone(),
        };
        let mut view = HeadlessView::at(&home);

        section("Home");
        app.session.handle_event(
            ViewEvent::NavigationFinished {
                url: home.clone(),
                status: Some(200),
            },
            &mut view,
        );
        println!("  {} -> {:?}", home, app.session.idle_state());

        section("Away");
        view.set_current_url(&away);
        app.session
            .handle_event(ViewEvent::NavigationStarted(away.clone()), &mut view);
        println!("  {} -> {:?}", away, app.session.idle_state());

        section("Activity");
        app.session.handle_event(
            ViewEvent::ConsoleMessage("kioskview:activity".to_string()),
            &mut view,
        );
        println!("  after activity -> {:?}", app.session.idle_state());
        clock.advance(Duration::from_secs(1));
        app.session.poll_timers(&mut view);
        println!("  after 1 s quiet -> {:?}", app.session.idle_state());

        section("Timeout");
        let timeout = app
            .session
            .config()
            .map(|c| c.idle_timeout_seconds)
            .unwrap_or_default();
        if timeout > 0 {
            clock.advance(Duration::from_secs(timeout as u64));
            app.session.poll_timers(&mut view);
        }
        println!(
            "  navigations issued: {:?}, now at {}",
            view.navigations(),
            view.current_url().unwrap_or_default()
        );

        println!("  idle state: {:?}", app.session.idle_state());

        app.shutdown();
        println!();
    }
}
