//! HTTP transport adapter.
//!
//! The session talks to the network exclusively through the [`Transport`]
//! capability: one exchange per call, resolving with a structured response
//! (any HTTP status) or a structured failure (network, timeout, DNS), with
//! optional progress notifications during the transfer. [`HttpTransport`]
//! is the reqwest-backed default.

use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::error::{Error, ErrorKind};
use crate::request::Method;

/// Fully assembled request handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub timeout: Duration,
}

/// Outcome of a completed HTTP exchange, successful or not.
///
/// Non-2xx statuses resolve here too; classifying them is the envelope
/// builder's job, not the transport's.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// Status line, e.g. `HTTP/1.1 200 OK`.
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// A transport-level failure: the exchange produced no complete response.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    /// Short failure code, e.g. `timeout` or `connect`.
    pub code: Option<String>,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub message: String,
    /// Whatever body bytes arrived before the failure.
    pub partial_body: Option<Bytes>,
}

/// The injected HTTP transport capability.
pub trait Transport: Send + Sync {
    /// Perform one HTTP exchange. Progress fractions, when a sender is
    /// supplied, are non-decreasing and fire zero or more times before the
    /// terminal resolution.
    fn send(
        &self,
        request: TransportRequest,
        progress: Option<UnboundedSender<f64>>,
    ) -> BoxFuture<'_, std::result::Result<TransportResponse, TransportFailure>>;
}

/// Default transport backed by reqwest with gzip/deflate response
/// decompression and per-request timeouts.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new() -> crate::Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| {
                let mut err = Error::new(ErrorKind::Config(e.to_string()));
                err.source = Some(Box::new(e));
                err
            })?;
        Ok(Self { inner })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: TransportRequest,
        progress: Option<UnboundedSender<f64>>,
    ) -> BoxFuture<'_, std::result::Result<TransportResponse, TransportFailure>> {
        let client = self.inner.clone();
        Box::pin(async move {
            let mut req = client
                .request(request.method.to_reqwest(), &request.url)
                .timeout(request.timeout);

            for (name, value) in &request.headers {
                req = req.header(name.as_str(), value.as_str());
            }
            if let Some(ref content_type) = request.content_type {
                req = req.header("Content-Type", content_type.as_str());
            }
            if let Some(ref accept) = request.accept {
                req = req.header("Accept", accept.as_str());
            }
            if let Some(ref body) = request.body {
                req = req.body(body.clone());
            }

            debug!(method = ?request.method, url = %request.url, "sending request");

            let response = req.send().await.map_err(failure_from_reqwest)?;

            let status = response.status().as_u16();
            let status_text = status_line(response.status());
            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            // Stream the body so progress can be reported as bytes arrive.
            let total = response.content_length();
            let mut body: Vec<u8> = Vec::new();
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(failure_from_reqwest)?;
                body.extend_from_slice(&chunk);
                if let Some(ref tx) = progress {
                    let fraction = total
                        .filter(|t| *t > 0)
                        .map(|t| (body.len() as f64 / t as f64).min(1.0))
                        .unwrap_or(0.0);
                    let _ = tx.send(fraction);
                }
            }
            if let Some(ref tx) = progress {
                let _ = tx.send(1.0);
            }

            debug!(status, bytes = body.len(), "response received");

            Ok(TransportResponse {
                status,
                status_text,
                content_type,
                body: Bytes::from(body),
            })
        })
    }
}

fn failure_from_reqwest(err: reqwest::Error) -> TransportFailure {
    let code = if err.is_timeout() {
        Some("timeout".to_string())
    } else if err.is_connect() {
        Some("connect".to_string())
    } else {
        None
    };

    TransportFailure {
        code,
        status: err.status().map(|s| s.as_u16()),
        status_text: err.status().map(status_line),
        message: err.to_string(),
        partial_body: None,
    }
}

/// Format a status line like `HTTP/1.1 200 OK`.
pub(crate) fn status_line(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP/1.1 {} {}", status.as_u16(), reason),
        None => format!("HTTP/1.1 {}", status.as_u16()),
    }
}
