//! Everything that crosses the page boundary.
//!
//! [`scripts`] builds the JavaScript injected into the dashboard and
//! [`signal`] turns the raw text the page sends back into typed signals.

pub mod scripts;
pub mod signal;

pub use signal::{decode, PageSignal, ZoomCommand};
