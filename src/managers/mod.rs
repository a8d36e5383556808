// KioskView state managers
// Managers hold the session's timed state: idle countdown, auto-login attempts, window geometry.

pub mod auto_login;
pub mod idle_controller;
pub mod session;
pub mod window_state;
