//! Kiosk window using `wry` + `tao`.
//!
//! Architecture:
//! - One `tao` window holding one `wry` web view on the dashboard.
//! - Every web view callback (navigation, page load, IPC, script results) is
//!   turned into a [`ViewEvent`] and sent through the event loop proxy, so the
//!   session is only ever touched from the event loop closure.
//! - The page bootstrap is registered with `with_initialization_script` and
//!   talks back through `window.ipc.postMessage()`.
//! - Timers are deadlines; the loop sleeps with `ControlFlow::WaitUntil`.
//! - wry reports no dev tools events, so their open state is sampled on every
//!   loop wake-up. Always-on-top is only ever set from the saved state.

use std::path::PathBuf;

use tao::dpi::{PhysicalPosition, PhysicalSize};
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::{Fullscreen, Window, WindowBuilder};
use tracing::{debug, error, info, warn};
use wry::{NewWindowResponse, PageLoadEvent, WebContext, WebView, WebViewBuilder};

use crate::app::App;
use crate::managers::window_state::{initial_placement, WindowChange};
use crate::page::scripts;
use crate::platform;
use crate::services::url_classifier::is_web_url;
use crate::types::geometry::{Rect, WindowGeometry};
use crate::types::view::{EmbeddedViewTrait, ScriptOutcome, ScriptPurpose, ViewEvent};

const WINDOW_TITLE: &str = "KioskView";

#[derive(Debug)]
enum UserEvent {
    View(ViewEvent),
}

/// The `wry` web view behind [`EmbeddedViewTrait`].
struct WryView {
    webview: WebView,
    proxy: EventLoopProxy<UserEvent>,
    zoom: f64,
}

impl EmbeddedViewTrait for WryView {
    fn navigate_to(&mut self, url: &str) {
        if let Err(e) = self.webview.load_url(url) {
            warn!(url, "failed to load url: {}", e);
        }
    }

    fn current_url(&self) -> Option<String> {
        self.webview.url().ok()
    }

    fn execute_script(&mut self, purpose: ScriptPurpose, source: &str) {
        let result = if purpose.wants_result() {
            let proxy = self.proxy.clone();
            self.webview
                .evaluate_script_with_callback(source, move |raw: String| {
                    let outcome = ScriptOutcome::from_raw(&raw);
                    let _ = proxy.send_event(UserEvent::View(ViewEvent::ScriptCompleted {
                        purpose,
                        outcome,
                    }));
                })
        } else {
            self.webview.evaluate_script(source)
        };
        // The page may have navigated away mid-injection
        if let Err(e) = result {
            debug!(?purpose, "script injection failed: {}", e);
        }
    }

    fn zoom_level(&self) -> f64 {
        self.zoom
    }

    fn set_zoom_level(&mut self, level: f64) {
        match self.webview.zoom(level) {
            Ok(()) => self.zoom = level,
            Err(e) => warn!(level, "failed to set zoom: {}", e),
        }
    }
}

/// Window-side flags that the platform does not report back as events.
struct WindowFlags {
    maximized: bool,
    full_screen: bool,
    always_on_top: bool,
    dev_tools_open: bool,
}

fn snapshot(window: &Window, flags: &WindowFlags) -> WindowGeometry {
    let size = window.inner_size();
    let position = window.outer_position().ok();
    WindowGeometry {
        width: size.width,
        height: size.height,
        x: position.map(|p| p.x),
        y: position.map(|p| p.y),
        maximized: flags.maximized,
        full_screen: flags.full_screen,
        dev_tools_open: flags.dev_tools_open,
        always_on_top: flags.always_on_top,
    }
}

/// Works out which change a resize stands for and updates `flags`.
fn classify_resize(window: &Window, flags: &mut WindowFlags) -> WindowChange {
    let maximized = window.is_maximized();
    let full_screen = window.fullscreen().is_some();
    let change = if full_screen != flags.full_screen {
        if full_screen {
            WindowChange::EnteredFullScreen
        } else {
            WindowChange::LeftFullScreen
        }
    } else if maximized != flags.maximized {
        if maximized {
            WindowChange::Maximized
        } else {
            WindowChange::Unmaximized
        }
    } else {
        WindowChange::Resized
    };
    flags.maximized = maximized;
    flags.full_screen = full_screen;
    change
}

/// Reports a dev tools open/close seen since the last call.
fn sample_dev_tools(webview: &WebView, flags: &mut WindowFlags) -> Option<WindowChange> {
    let open = webview.is_devtools_open();
    if open == flags.dev_tools_open {
        return None;
    }
    flags.dev_tools_open = open;
    Some(if open {
        WindowChange::DevToolsOpened
    } else {
        WindowChange::DevToolsClosed
    })
}

fn displays<T>(event_loop: &EventLoop<T>) -> Vec<Rect> {
    event_loop
        .available_monitors()
        .map(|monitor| {
            let position = monitor.position();
            let size = monitor.size();
            Rect::new(position.x, position.y, size.width, size.height)
        })
        .collect()
}

/// Pop-ups never open inside the kiosk; web links go to the system browser.
fn open_externally(url: &str) {
    if !is_web_url(url) {
        info!(url, "pop-up window denied");
        return;
    }
    match open::that_detached(url) {
        Ok(()) => info!(url, "pop-up opened in system browser"),
        Err(e) => warn!(url, "failed to open pop-up externally: {}", e),
    }
}

fn webview_data_dir() -> PathBuf {
    platform::get_data_dir().join("webview")
}

// ─── Main entry point ───

pub fn run(home_override: Option<&str>) {
    let mut app = match App::new(None, home_override) {
        Ok(app) => app,
        Err(e) => {
            error!("failed to initialize KioskView: {}", e);
            return;
        }
    };
    app.startup();

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let saved = app.session.config().and_then(|c| c.window_state.clone());
    let placement = initial_placement(saved.as_ref(), &displays(&event_loop));
    let saved = saved.unwrap_or_default();

    let mut builder = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(PhysicalSize::new(placement.width, placement.height))
        .with_maximized(saved.maximized)
        .with_always_on_top(saved.always_on_top);
    if let Some((x, y)) = placement.position {
        builder = builder.with_position(PhysicalPosition::new(x, y));
    }
    if saved.full_screen {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = match builder.build(&event_loop) {
        Ok(window) => window,
        Err(e) => {
            error!("failed to create window: {}", e);
            return;
        }
    };

    let mut flags = WindowFlags {
        maximized: window.is_maximized(),
        full_screen: window.fullscreen().is_some(),
        always_on_top: saved.always_on_top,
        dev_tools_open: saved.dev_tools_open,
    };

    let mut web_context = WebContext::new(Some(webview_data_dir()));
    let nav_proxy = proxy.clone();
    let load_proxy = proxy.clone();
    let ipc_proxy = proxy.clone();

    let builder = WebViewBuilder::new_with_web_context(&mut web_context)
        .with_url(app.session.home_url())
        .with_initialization_script(scripts::page_setup())
        .with_navigation_handler(move |url| {
            let _ = nav_proxy.send_event(UserEvent::View(ViewEvent::NavigationStarted(url)));
            true
        })
        .with_on_page_load_handler(move |event, url| {
            let view_event = match event {
                PageLoadEvent::Started => return,
                PageLoadEvent::Finished => ViewEvent::NavigationFinished { url, status: None },
            };
            let _ = load_proxy.send_event(UserEvent::View(view_event));
            let _ = load_proxy.send_event(UserEvent::View(ViewEvent::DomReady));
        })
        .with_ipc_handler(move |msg: wry::http::Request<String>| {
            let _ = ipc_proxy.send_event(UserEvent::View(ViewEvent::ConsoleMessage(
                msg.body().clone(),
            )));
        })
        .with_new_window_req_handler(|url, _features| {
            open_externally(&url);
            NewWindowResponse::Deny
        })
        .with_devtools(true);

    #[cfg(target_os = "linux")]
    let built = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        match window.default_vbox() {
            Some(vbox) => builder.build_gtk(vbox),
            None => {
                error!("window has no GTK container for the web view");
                return;
            }
        }
    };

    #[cfg(not(target_os = "linux"))]
    let built = builder.build(&window);

    let webview = match built {
        Ok(webview) => webview,
        Err(e) => {
            error!("failed to create web view: {}", e);
            return;
        }
    };
    if flags.dev_tools_open {
        webview.open_devtools();
    }

    let mut view = WryView {
        webview,
        proxy,
        zoom: 1.0,
    };

    event_loop.run(move |event, _, control_flow| {
        // Keeps the profile alive for the lifetime of the view
        let _ = &web_context;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                if let Some(change) = sample_dev_tools(&view.webview, &mut flags) {
                    app.session
                        .handle_window_change(change, snapshot(&window, &flags));
                }
                app.shutdown();
                *control_flow = ControlFlow::Exit;
                return;
            }

            Event::WindowEvent {
                event: WindowEvent::Resized(_),
                ..
            } => {
                let change = classify_resize(&window, &mut flags);
                app.session
                    .handle_window_change(change, snapshot(&window, &flags));
            }

            Event::WindowEvent {
                event: WindowEvent::Moved(_),
                ..
            } => {
                app.session
                    .handle_window_change(WindowChange::Moved, snapshot(&window, &flags));
            }

            Event::UserEvent(UserEvent::View(view_event)) => {
                app.session.handle_event(view_event, &mut view);
            }

            _ => {}
        }

        if let Some(change) = sample_dev_tools(&view.webview, &mut flags) {
            app.session
                .handle_window_change(change, snapshot(&window, &flags));
        }
        app.session.poll_timers(&mut view);
        *control_flow = match app.session.next_deadline() {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        };
    });
}
