//! Browser-display capability for the interactive login flow.
//!
//! The implicit OAuth grant needs a user-facing surface that can show the
//! authorize URL and report where the user navigates. The session drives a
//! [`BrowserSurface`] supplied by the caller (a webview, a system browser
//! bridge, a test script) and watches its event stream for the redirect.

use tokio::sync::mpsc::UnboundedReceiver;

/// Page-load phase of a navigation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPhase {
    BeforeLoad,
    Load,
}

/// Event emitted by a browser surface.
#[derive(Debug, Clone)]
pub enum BrowserEvent {
    /// The surface navigated to a URL.
    Navigated { url: String, phase: NavigationPhase },
    /// The surface was closed, by the user or by a `close()` call.
    Closed,
}

/// An injected surface that can display a URL and report navigation.
///
/// The event stream returned by `display` must end, or emit
/// [`BrowserEvent::Closed`], once the surface goes away; `close` must be
/// idempotent.
pub trait BrowserSurface: Send {
    /// Show the given URL and start reporting navigation events.
    fn display(&mut self, url: &str) -> UnboundedReceiver<BrowserEvent>;

    /// Dismiss the surface.
    fn close(&mut self);
}

/// Build the implicit-grant authorize URL.
pub(crate) fn authorize_url(login_url: &str, client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?display=touch&response_type=token&client_id={}&redirect_uri={}",
        login_url,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri)
    )
}

/// Percent-decode a URL, passing it through unchanged if decoding fails.
pub(crate) fn percent_decode(url: &str) -> String {
    match urlencoding::decode(url) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => url.to_string(),
    }
}

/// Decode a redirect fragment of `&`-joined `key=value` pairs, URL-decoding
/// the values.
pub(crate) fn decode_fragment(fragment: &str) -> Vec<(String, String)> {
    fragment
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key.to_string(), percent_decode(value))
        })
        .collect()
}
