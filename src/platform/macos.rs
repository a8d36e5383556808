// KioskView platform paths for macOS
// Config: ~/Library/Application Support/KioskView
// Data:   ~/Library/Application Support/KioskView

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `~/Library/Application Support/KioskView`
pub fn get_config_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join("KioskView")
}

/// Same directory as the config on macOS.
pub fn get_data_dir() -> PathBuf {
    get_config_dir()
}
