//! The embedded web view as seen by the session core: the commands it accepts
//! and the lifecycle events it reports.

use serde_json::Value;

/// Why a script was injected. Echoed back in [`ViewEvent::ScriptCompleted`] so
/// results can be routed to whoever asked for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPurpose {
    /// Activity/zoom watchers and page defaults installed on DOM ready.
    PageSetup,
    /// Show or hide the idle countdown overlay.
    IdleOverlay,
    /// Collapse an enlarged video view.
    ExitZoomedView,
    /// One fill-and-submit try of an auto-login attempt.
    LoginFill { attempt: u64 },
}

impl ScriptPurpose {
    /// Whether the caller cares about the script's return value.
    pub fn wants_result(&self) -> bool {
        matches!(
            self,
            ScriptPurpose::ExitZoomedView | ScriptPurpose::LoginFill { .. }
        )
    }
}

/// Result of an injected script as delivered by the view.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptOutcome {
    /// The script's completion value, decoded from JSON.
    Value(Value),
    /// The script threw, or the page went away before it finished.
    Failed(String),
}

impl ScriptOutcome {
    /// Decodes the raw JSON text a web view hands back for a completed script.
    pub fn from_raw(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => ScriptOutcome::Value(value),
            Err(e) => ScriptOutcome::Failed(format!("unreadable script result: {}", e)),
        }
    }

    /// True only for a boolean `true` completion value.
    pub fn is_true(&self) -> bool {
        matches!(self, ScriptOutcome::Value(Value::Bool(true)))
    }
}

/// Lifecycle events reported by the embedded view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    NavigationStarted(String),
    NavigationFinished { url: String, status: Option<u16> },
    InPageNavigation(String),
    DomReady,
    /// Raw text crossing from page script to the shell.
    ConsoleMessage(String),
    ViewCrashed,
    ScriptCompleted {
        purpose: ScriptPurpose,
        outcome: ScriptOutcome,
    },
}

/// Capability contract the session core drives.
///
/// Script execution is asynchronous: results, when wanted, come back later as
/// [`ViewEvent::ScriptCompleted`]. Implementations swallow failures caused by
/// the page navigating away mid-injection.
pub trait EmbeddedViewTrait {
    fn navigate_to(&mut self, url: &str);
    fn current_url(&self) -> Option<String>;
    fn execute_script(&mut self, purpose: ScriptPurpose, source: &str);
    fn zoom_level(&self) -> f64;
    fn set_zoom_level(&mut self, level: f64);
}
