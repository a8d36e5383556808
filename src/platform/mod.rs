// KioskView platform abstraction
// Provides the per-user directories for the config file, the safe storage key
// and the web view profile on Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory for KioskView.
///
/// - **Linux**: `~/.config/kioskview` (or `$XDG_CONFIG_HOME/kioskview`)
/// - **macOS**: `~/Library/Application Support/KioskView`
/// - **Windows**: `%APPDATA%/KioskView`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory for KioskView.
///
/// Holds the safe storage key and the web view profile (cookies, local storage).
///
/// - **Linux**: `~/.local/share/kioskview` (or `$XDG_DATA_HOME/kioskview`)
/// - **macOS**: `~/Library/Application Support/KioskView`
/// - **Windows**: `%LOCALAPPDATA%/KioskView`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
