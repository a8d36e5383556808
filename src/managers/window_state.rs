//! Window State Persistence for KioskView.
//!
//! Mirrors the window's geometry into the configuration with a one second
//! debounce, and decides where the window goes at launch.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::services::config_store::ConfigStoreTrait;
use crate::timing::Debouncer;
use crate::types::geometry::{
    Placement, Rect, WindowGeometry, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH,
};

/// Quiet period before a geometry change is written.
pub const SAVE_DEBOUNCE: Duration = Duration::from_secs(1);

/// Share of the saved bounds that must land on some display to be restored.
pub const MIN_VISIBLE_FRACTION: f64 = 0.5;

/// Window changes that trigger a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowChange {
    Resized,
    Moved,
    Maximized,
    Unmaximized,
    EnteredFullScreen,
    LeftFullScreen,
    DevToolsOpened,
    DevToolsClosed,
}

impl WindowChange {
    fn is_bounds_change(&self) -> bool {
        matches!(self, WindowChange::Resized | WindowChange::Moved)
    }
}

/// Trait defining the window state mirror interface.
pub trait WindowStateMirrorTrait {
    /// Records a change. `snapshot` is the window as it is right now.
    fn on_window_change(&mut self, change: WindowChange, snapshot: WindowGeometry, now: Instant);
    /// Writes the pending snapshot once the debounce has elapsed.
    /// Returns true when a write was attempted.
    fn poll<S: ConfigStoreTrait>(&mut self, now: Instant, store: &mut S) -> bool;
    /// Writes any pending snapshot immediately.
    fn flush<S: ConfigStoreTrait>(&mut self, store: &mut S) -> bool;
    fn next_deadline(&self) -> Option<Instant>;
}

/// Debounced mirror of the window geometry.
pub struct WindowStateMirror {
    writer: Debouncer<WindowGeometry>,
    /// Last bounds seen while neither maximized nor fullscreen.
    normal_bounds: Option<(u32, u32, Option<i32>, Option<i32>)>,
}

impl WindowStateMirror {
    /// `launch` seeds the normal bounds so that a window starting maximized
    /// still remembers where it was before.
    pub fn new(launch: Option<&WindowGeometry>) -> Self {
        Self {
            writer: Debouncer::new(SAVE_DEBOUNCE),
            normal_bounds: launch.map(|g| (g.width, g.height, g.x, g.y)),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.writer.is_pending()
    }

    fn write<S: ConfigStoreTrait>(store: &mut S, geometry: WindowGeometry) -> bool {
        match store.mutate(|mut config| {
            config.window_state = Some(geometry);
            config
        }) {
            Ok(()) => debug!("window state saved"),
            Err(e) => warn!("failed to save window state: {}", e),
        }
        true
    }
}

impl WindowStateMirrorTrait for WindowStateMirror {
    fn on_window_change(
        &mut self,
        change: WindowChange,
        mut snapshot: WindowGeometry,
        now: Instant,
    ) {
        let restored = !snapshot.maximized && !snapshot.full_screen;
        if restored {
            self.normal_bounds = Some((snapshot.width, snapshot.height, snapshot.x, snapshot.y));
        } else if change.is_bounds_change() {
            // Size changes driven by maximize/fullscreen are not the user's bounds
            return;
        } else if let Some((width, height, x, y)) = self.normal_bounds {
            snapshot.width = width;
            snapshot.height = height;
            snapshot.x = x;
            snapshot.y = y;
        }
        self.writer.schedule(now, snapshot);
    }

    fn poll<S: ConfigStoreTrait>(&mut self, now: Instant, store: &mut S) -> bool {
        match self.writer.fire_if_due(now) {
            Some(geometry) => Self::write(store, geometry),
            None => false,
        }
    }

    fn flush<S: ConfigStoreTrait>(&mut self, store: &mut S) -> bool {
        let Some(deadline) = self.writer.deadline() else {
            return false;
        };
        match self.writer.fire_if_due(deadline) {
            Some(geometry) => Self::write(store, geometry),
            None => false,
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.writer.deadline()
    }
}

/// True when at least half of `bounds` overlaps a single display.
pub fn validate_bounds(bounds: &Rect, displays: &[Rect]) -> bool {
    let area = bounds.area();
    if area == 0 {
        return false;
    }
    displays
        .iter()
        .any(|display| bounds.overlap_area(display) as f64 >= area as f64 * MIN_VISIBLE_FRACTION)
}

/// Launch placement for the window.
///
/// Saved size is used when present. The saved position only when it is
/// complete and passes [`validate_bounds`]; otherwise the platform places it.
pub fn initial_placement(saved: Option<&WindowGeometry>, displays: &[Rect]) -> Placement {
    let Some(saved) = saved else {
        return Placement {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            position: None,
        };
    };

    let width = if saved.width > 0 {
        saved.width
    } else {
        DEFAULT_WINDOW_WIDTH
    };
    let height = if saved.height > 0 {
        saved.height
    } else {
        DEFAULT_WINDOW_HEIGHT
    };

    let position = match (saved.x, saved.y) {
        (Some(x), Some(y)) => {
            if validate_bounds(&Rect::new(x, y, width, height), displays) {
                Some((x, y))
            } else {
                info!(x, y, width, height, "saved window position is off-screen, ignoring");
                None
            }
        }
        _ => None,
    };

    Placement {
        width,
        height,
        position,
    }
}
