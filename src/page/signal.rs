// KioskView page signals
// The injected page script can only talk back through plain text messages.
// This is the one place those messages are recognised; anything else is noise.

/// Prefix shared by every message the injected scripts send.
pub const TOKEN_PREFIX: &str = "kioskview:";

pub const TOKEN_ACTIVITY: &str = "kioskview:activity";
pub const TOKEN_ZOOMED_ON: &str = "kioskview:zoomed-on";
pub const TOKEN_ZOOMED_OFF: &str = "kioskview:zoomed-off";
pub const TOKEN_ZOOM_IN: &str = "kioskview:zoom-in";
pub const TOKEN_ZOOM_OUT: &str = "kioskview:zoom-out";
pub const TOKEN_ZOOM_RESET: &str = "kioskview:zoom-reset";
pub const TOKEN_URL_CHANGED: &str = "kioskview:url-changed:";

/// A page zoom shortcut pressed inside the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomCommand {
    In,
    Out,
    Reset,
}

/// Typed form of the messages sent by the injected page script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSignal {
    /// Mouse or keyboard input inside the page.
    ActivityDetected,
    /// An enlarged video view appeared (`true`) or went away (`false`).
    ZoomStateChanged(bool),
    PageZoom(ZoomCommand),
    /// The page changed its URL without a navigation (history API, hash).
    UrlChanged(String),
}

/// Decodes one raw page message. Unrecognised text yields `None`.
pub fn decode(raw: &str) -> Option<PageSignal> {
    let msg = raw.trim();
    if !msg.starts_with(TOKEN_PREFIX) {
        return None;
    }
    if let Some(url) = msg.strip_prefix(TOKEN_URL_CHANGED) {
        return if url.is_empty() {
            None
        } else {
            Some(PageSignal::UrlChanged(url.to_string()))
        };
    }
    match msg {
        TOKEN_ACTIVITY => Some(PageSignal::ActivityDetected),
        TOKEN_ZOOMED_ON => Some(PageSignal::ZoomStateChanged(true)),
        TOKEN_ZOOMED_OFF => Some(PageSignal::ZoomStateChanged(false)),
        TOKEN_ZOOM_IN => Some(PageSignal::PageZoom(ZoomCommand::In)),
        TOKEN_ZOOM_OUT => Some(PageSignal::PageZoom(ZoomCommand::Out)),
        TOKEN_ZOOM_RESET => Some(PageSignal::PageZoom(ZoomCommand::Reset)),
        _ => None,
    }
}
