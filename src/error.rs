//! Error types for sf-connected-app.
//!
//! Every failed call resolves through exactly one [`Error`], carrying the
//! parsed error payload and the response metadata alongside the error kind.
//! Error messages avoid including credential values.

use serde::{Deserialize, Serialize};

use crate::response::ResponseMeta;

/// Result type alias for sf-connected-app operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-connected-app operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Parsed error payload, as delivered to the caller's error channel.
    pub payload: ErrorPayload,
    /// Response metadata. Empty (status 0) for validation failures.
    pub meta: ResponseMeta,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind and an empty payload/meta.
    pub fn new(kind: ErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            payload: ErrorPayload::from_message(message),
            meta: ResponseMeta::default(),
            source: None,
        }
    }

    /// Create a validation error. Never touches the network, so the
    /// metadata is left empty.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::Validation(message.clone()),
            payload: ErrorPayload::from_message(message),
            meta: ResponseMeta::default(),
            source: None,
        }
    }

    /// Create an error carrying a parsed payload and response metadata.
    pub(crate) fn with_payload(kind: ErrorKind, payload: ErrorPayload, meta: ResponseMeta) -> Self {
        Self {
            kind,
            payload,
            meta,
            source: None,
        }
    }

    /// Create a serialization error with its source.
    pub(crate) fn serialization(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        let mut err = Self::new(ErrorKind::Serialization(message.into()));
        err.source = Some(Box::new(source));
        err
    }

    /// The human-readable message delivered on the error channel.
    pub fn message(&self) -> &str {
        &self.payload.message
    }

    /// Returns true if this error was raised before any network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation(_))
    }

    /// Returns true if the interactive login was cancelled by the user.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// A precondition failed before any I/O.
    #[error("{0}")]
    Validation(String),

    /// Network failure, timeout, or non-2xx HTTP status.
    #[error("HTTP error: {status} {message}")]
    Transport { status: u16, message: String },

    /// The OAuth redirect response could not be parsed into a token.
    #[error("OAuth error: {0}")]
    OAuthParse(String),

    /// The interactive login surface was closed without completing the
    /// redirect.
    #[error("Login cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Error payload delivered to the caller: a best-effort `message` plus
/// whatever the server returned (`errorCode`, extra fields).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable error message. Always present.
    #[serde(default)]
    pub message: String,

    /// Salesforce error code, or the transport failure code.
    #[serde(rename = "errorCode", default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    /// Static description for the HTTP status, where one is documented.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Remaining fields of the server's error body.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ErrorPayload {
    /// Create a payload carrying only a message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Static per-status descriptions for the error codes Salesforce documents
/// for the REST API.
pub fn status_description(status: u16) -> Option<&'static str> {
    Some(match status {
        400 => "The request could not be understood, usually because the JSON or XML body has an error.",
        401 => "The account used has expired or is invalid.",
        403 => "The request has been refused. Verify that the logged-in user has appropriate permissions.",
        404 => "404: Resource not found.",
        405 => "The method specified in the Request-Line is not allowed for the resource specified in the URI.",
        415 => "The entity specified in the request is in a format that is not supported by specified resource for the specified method.",
        500 => "An error has occurred within Force.com, so the request could not be completed.",
        _ => return None,
    })
}
