//! # sf-connected-app
//!
//! A Salesforce connected-app REST client: OAuth session lifecycle plus the
//! sobjects, query, and search endpoint families.
//!
//! The crate is organized around one stateful [`ConnectedApp`] session:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ConnectedApp                           │
//! │  - OAuth lifecycle (password grant, implicit grant,         │
//! │    refresh, logout)                                         │
//! │  - One method per REST capability                           │
//! │  - validate → prepare → dispatch pipeline per call          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Transport                             │
//! │  - One HTTP exchange per call (reqwest by default)          │
//! │  - Structured response or structured failure                │
//! │  - Progress notifications while the body streams            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call resolves to exactly one outcome: an [`Envelope`] carrying the
//! parsed payload and response metadata, or an [`Error`] carrying the
//! normalized error payload and the same metadata. Validation failures
//! (missing parameters, not logged in) short-circuit before any request is
//! built, so no network traffic happens for them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sf_connected_app::{AppConfig, CallOptions, ConnectedApp, QueryArgs};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sf_connected_app::Error> {
//!     let config = AppConfig::new(consumer_key, consumer_secret)
//!         .with_security_token(security_token);
//!     let mut app = ConnectedApp::new(config)?;
//!
//!     app.login_api("user@example.com", "password", CallOptions::new())
//!         .await?;
//!
//!     let accounts = app
//!         .query(&QueryArgs::soql("SELECT Id, Name FROM Account"), CallOptions::new())
//!         .await?;
//!     println!("{:?}", accounts.payload.as_json());
//!
//!     app.logout();
//!     Ok(())
//! }
//! ```

mod browser;
mod config;
mod error;
mod pipeline;
mod request;
mod response;
mod session;
mod token;
mod transport;

pub use browser::{BrowserEvent, BrowserSurface, NavigationPhase};
pub use config::AppConfig;
pub use error::{status_description, Error, ErrorKind, ErrorPayload, Result};
pub use request::{BeforeSend, Body, CallOptions, Method, RequestSpec};
pub use response::{parse_xml, Envelope, Payload, ResponseMeta, XmlElement};
pub use session::{ConnectedApp, QueryArgs, UpsertBlobArgs};
pub use token::TokenPayload;
pub use transport::{
    HttpTransport, Transport, TransportFailure, TransportRequest, TransportResponse,
};

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "62.0";

/// Instance URL used for unauthenticated calls when the session has none.
pub const DEFAULT_INSTANCE_URL: &str = "https://na1.salesforce.com";

/// Token endpoint used when no login URL is configured.
pub const DEFAULT_TOKEN_URL: &str = "https://login.salesforce.com/services/oauth2/token";

/// Authorize endpoint used when no login URL is configured.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://login.salesforce.com/services/oauth2/authorize";

/// Redirect URI watched for during the interactive login flow.
pub const DEFAULT_REDIRECT_URI: &str = "https://login.salesforce.com/services/oauth2/success";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(5000);

/// Status line reported for synthesized successes (interactive login,
/// logout).
pub(crate) const STATUS_OK: &str = "HTTP/1.1 200 OK";

/// Status text reported for failures with no HTTP status line.
pub(crate) const STATUS_ERROR: &str = "ERROR";

/// User agent sent by the default transport.
pub(crate) const USER_AGENT: &str = concat!("sf-connected-app/", env!("CARGO_PKG_VERSION"));
