//! A view with no renderer behind it.
//!
//! Records every command the session issues so tests and the console demo can
//! drive a [`KioskSession`](crate::managers::session::KioskSession) without a
//! window. Navigation updates the current URL immediately; scripts never
//! produce results on their own.

use crate::types::view::{EmbeddedViewTrait, ScriptPurpose};

/// One command issued to the view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    Navigate(String),
    Script {
        purpose: ScriptPurpose,
        source: String,
    },
    SetZoom(f64),
}

#[derive(Debug, Clone)]
pub struct HeadlessView {
    url: Option<String>,
    zoom: f64,
    commands: Vec<ViewCommand>,
}

impl HeadlessView {
    pub fn new() -> Self {
        Self {
            url: None,
            zoom: 1.0,
            commands: Vec::new(),
        }
    }

    pub fn at(url: &str) -> Self {
        let mut view = Self::new();
        view.url = Some(url.to_string());
        view
    }

    /// Moves the view without recording a command, as a user click would.
    pub fn set_current_url(&mut self, url: &str) {
        self.url = Some(url.to_string());
    }

    pub fn commands(&self) -> &[ViewCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<ViewCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn navigations(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                ViewCommand::Navigate(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Sources of the scripts injected for purposes matching `filter`.
    pub fn scripts<F>(&self, filter: F) -> Vec<&str>
    where
        F: Fn(&ScriptPurpose) -> bool,
    {
        self.commands
            .iter()
            .filter_map(|c| match c {
                ViewCommand::Script { purpose, source } if filter(purpose) => {
                    Some(source.as_str())
                }
                _ => None,
            })
            .collect()
    }

    pub fn login_attempts(&self) -> Vec<u64> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                ViewCommand::Script {
                    purpose: ScriptPurpose::LoginFill { attempt },
                    ..
                } => Some(*attempt),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddedViewTrait for HeadlessView {
    fn navigate_to(&mut self, url: &str) {
        self.url = Some(url.to_string());
        self.commands.push(ViewCommand::Navigate(url.to_string()));
    }

    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }

    fn execute_script(&mut self, purpose: ScriptPurpose, source: &str) {
        self.commands.push(ViewCommand::Script {
            purpose,
            source: source.to_string(),
        });
    }

    fn zoom_level(&self) -> f64 {
        self.zoom
    }

    fn set_zoom_level(&mut self, level: f64) {
        self.zoom = level;
        self.commands.push(ViewCommand::SetZoom(level));
    }
}
