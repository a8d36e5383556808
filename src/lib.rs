//! KioskView: a single-window kiosk browser for a self-hosted video-surveillance
//! dashboard.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod headless;
pub mod managers;
pub mod page;
pub mod platform;
pub mod services;
pub mod timing;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
