// KioskView shared type definitions
// Each submodule defines types used across the application.

pub mod config;
pub mod errors;
pub mod geometry;
pub mod view;
