// KioskView platform paths for Linux
// Config: ~/.config/kioskview
// Data:   ~/.local/share/kioskview

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "kioskview";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/kioskview` if set, otherwise `~/.config/kioskview`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
        _ => home_dir().join(".config").join(APP_DIR),
    }
}

/// Uses `$XDG_DATA_HOME/kioskview` if set, otherwise `~/.local/share/kioskview`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
        _ => home_dir().join(".local").join("share").join(APP_DIR),
    }
}
