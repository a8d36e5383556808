use serde::{Deserialize, Serialize};

/// Default window width when no usable geometry is saved.
pub const DEFAULT_WINDOW_WIDTH: u32 = 800;

/// Default window height when no usable geometry is saved.
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;

/// Snapshot of the main window's geometry and mode, as persisted in the config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    /// Absent means "let the platform place the window".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default)]
    pub maximized: bool,
    #[serde(default, rename = "fullscreen")]
    pub full_screen: bool,
    #[serde(default)]
    pub dev_tools_open: bool,
    #[serde(default)]
    pub always_on_top: bool,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            x: None,
            y: None,
            maximized: false,
            full_screen: false,
            dev_tools_open: false,
            always_on_top: false,
        }
    }
}

/// An axis-aligned rectangle in physical screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Area shared by `self` and `other`, zero when they do not touch.
    pub fn overlap_area(&self, other: &Rect) -> u64 {
        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = (self.x as i64 + self.width as i64).min(other.x as i64 + other.width as i64);
        let bottom =
            (self.y as i64 + self.height as i64).min(other.y as i64 + other.height as i64);
        let w = (right - left).max(0) as u64;
        let h = (bottom - top).max(0) as u64;
        w * h
    }
}

/// Where and how large the window should be created at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    /// `None` means default platform placement.
    pub position: Option<(i32, i32)>,
}
