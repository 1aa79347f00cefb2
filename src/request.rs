//! Per-call request specification and override options.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::transport::TransportRequest;

/// HTTP request method.
///
/// Mutating endpoints tunnel PATCH through POST with `?_HttpMethod=PATCH`,
/// so only the methods the wire actually carries are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    /// Convert to reqwest::Method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request body content.
#[derive(Debug, Clone)]
pub enum Body {
    /// JSON body, serialized when the request is dispatched.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` body (OAuth grants).
    Form(Vec<(String, String)>),
}

/// Ephemeral request partial built fresh for every call.
///
/// `None` fields participate in default merging at dispatch time:
/// request partial first, then per-call [`CallOptions`], then session
/// defaults.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Option<Vec<(String, String)>>,
    pub body: Option<Body>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    /// Create a request spec with the given method and URL.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: None,
            body: None,
            content_type: None,
            accept: None,
            timeout: None,
        }
    }

    /// Create a GET request spec.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Create a POST request spec.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Create a DELETE request spec.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Set a JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    /// Set a form-encoded body.
    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Some(Body::Form(pairs));
        self
    }

    /// Set the Content-Type header.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Hook invoked with the fully assembled transport request just before it is
/// sent.
pub type BeforeSend = Box<dyn FnOnce(&mut TransportRequest) + Send>;

/// Per-call overrides and notification channels.
///
/// Every exposed operation accepts one of these; `Default` means "use the
/// session's defaults for everything".
#[derive(Default)]
pub struct CallOptions {
    /// Replacement request headers.
    pub headers: Option<Vec<(String, String)>>,
    /// Per-call timeout override.
    pub timeout: Option<Duration>,
    /// Per-call Content-Type override.
    pub content_type: Option<String>,
    /// Per-call Accept override.
    pub accept: Option<String>,
    /// Multi-shot progress notifications, fractions in `0.0..=1.0`,
    /// non-decreasing.
    pub progress: Option<UnboundedSender<f64>>,
    /// Invoked with the assembled request right before dispatch.
    pub before_send: Option<BeforeSend>,
}

impl std::fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallOptions")
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("content_type", &self.content_type)
            .field("accept", &self.accept)
            .field("progress", &self.progress.is_some())
            .field("before_send", &self.before_send.is_some())
            .finish()
    }
}

impl CallOptions {
    /// Create empty call options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the request headers for this call.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Override the timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the Content-Type for this call.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Override the Accept header for this call.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Receive progress fractions while the exchange is in flight.
    pub fn with_progress(mut self, sender: UnboundedSender<f64>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Inspect or adjust the assembled request right before it is sent.
    pub fn with_before_send(mut self, hook: impl FnOnce(&mut TransportRequest) + Send + 'static) -> Self {
        self.before_send = Some(Box::new(hook));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_spec_builders() {
        let spec = RequestSpec::post("https://example.com/token")
            .form(vec![("grant_type".to_string(), "password".to_string())])
            .content_type("application/x-www-form-urlencoded; charset=utf-8");

        assert_eq!(spec.method, Method::Post);
        assert_eq!(spec.url, "https://example.com/token");
        assert!(matches!(spec.body, Some(Body::Form(_))));
        assert!(spec.content_type.unwrap().starts_with("application/x-www-form-urlencoded"));
        assert!(spec.headers.is_none());
        assert!(spec.timeout.is_none());
    }

    #[test]
    fn test_call_options_builders() {
        let opts = CallOptions::new()
            .with_timeout(Duration::from_millis(250))
            .with_accept("application/xml");

        assert_eq!(opts.timeout, Some(Duration::from_millis(250)));
        assert_eq!(opts.accept.as_deref(), Some("application/xml"));
        assert!(opts.headers.is_none());
        assert!(opts.progress.is_none());
    }
}
