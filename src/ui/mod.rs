//! KioskView UI layer.
//!
//! Uses `wry` for cross-platform WebView rendering:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! The dashboard is the only page. Communication from its scripts back to the
//! Rust side uses wry IPC.

pub mod kiosk_app;
