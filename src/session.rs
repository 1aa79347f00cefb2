//! The connected app session.
//!
//! [`ConnectedApp`] owns the OAuth token lifecycle (password grant,
//! interactive redirect grant, refresh, logout) and exposes one thin method
//! per Salesforce REST capability. Every method runs the same path:
//! validate preconditions, build a request spec, merge session defaults,
//! dispatch through the transport, and normalize the outcome into an
//! [`Envelope`] or an [`Error`].
//!
//! Auth-mutating methods take `&mut self`, so two authentication calls can
//! never interleave partial header updates on one session. Data calls take
//! `&self`.

use std::sync::Arc;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use tracing::{debug, error, instrument, warn};

use crate::browser::{authorize_url, decode_fragment, percent_decode, BrowserEvent, BrowserSurface};
use crate::config::AppConfig;
use crate::error::{Error, ErrorKind, ErrorPayload, Result};
use crate::pipeline::{Chain, Rule};
use crate::request::{Body, CallOptions, Method, RequestSpec};
use crate::response::{failure_error, http_error, success_envelope, Envelope, Payload, ResponseMeta};
use crate::token::TokenPayload;
use crate::transport::{HttpTransport, Transport, TransportRequest};
use crate::{DEFAULT_AUTHORIZE_URL, DEFAULT_INSTANCE_URL, DEFAULT_TOKEN_URL, STATUS_ERROR, STATUS_OK};

const DEFAULT_POST_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Mutable authentication state. Written only by `apply_token_response`
/// and `logout`.
#[derive(Debug, Clone, Default)]
struct SessionState {
    instance_url: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    current_user: Option<String>,
    logged_in: bool,
    headers: Option<Vec<(String, String)>>,
}

/// A connected app session: credentials, token state, and one method per
/// Salesforce REST capability.
///
/// Tokens are never persisted internally; callers that need persistence
/// read them back through the accessors and seed a new session through
/// [`AppConfig`].
pub struct ConnectedApp {
    config: AppConfig,
    state: SessionState,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ConnectedApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectedApp")
            .field("config", &self.config)
            .field("instance_url", &self.state.instance_url)
            .field("logged_in", &self.state.logged_in)
            .field(
                "access_token",
                &self.state.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

impl ConnectedApp {
    /// Create a session backed by the default HTTP transport.
    pub fn new(config: AppConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a session with an injected transport.
    pub fn with_transport(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        if config.client_id.is_empty() {
            warn!("client_id is missing");
        }
        if config.client_secret().is_empty() {
            warn!("client_secret is missing");
        }
        let state = SessionState {
            access_token: config.access_token.clone(),
            refresh_token: config.refresh_token.clone(),
            ..SessionState::default()
        };
        Self {
            config,
            state,
            transport,
        }
    }

    /// Whether the session holds a usable access token.
    pub fn is_logged_in(&self) -> bool {
        self.state.logged_in
    }

    /// The current access token, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.state.access_token.as_deref()
    }

    /// The current refresh token, if any.
    pub fn refresh_token(&self) -> Option<&str> {
        self.state.refresh_token.as_deref()
    }

    /// The instance URL all authorized calls are directed at.
    pub fn instance_url(&self) -> Option<&str> {
        self.state.instance_url.as_deref()
    }

    /// The user identifier extracted from the token identity URL.
    pub fn current_user(&self) -> Option<&str> {
        self.state.current_user.as_deref()
    }

    /// The cached authorization headers attached to authorized calls.
    pub fn headers(&self) -> Option<&[(String, String)]> {
        self.state.headers.as_deref()
    }

    /// The configured API version.
    pub fn api_version(&self) -> &str {
        &self.config.api_version
    }

    /// Set the security token appended to the password grant password.
    pub fn set_security_token(&mut self, token: impl Into<String>) {
        self.config.security_token = token.into();
    }

    fn token_url(&self) -> String {
        self.config
            .login_url
            .clone()
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string())
    }

    fn authorize_endpoint(&self) -> String {
        self.config
            .login_url
            .clone()
            .unwrap_or_else(|| DEFAULT_AUTHORIZE_URL.to_string())
    }

    /// Build a `/services/data/v{version}/{path}` URL on the instance.
    fn data_url(&self, path: &str) -> String {
        format!(
            "{}/services/data/v{}/{}",
            self.state
                .instance_url
                .as_deref()
                .unwrap_or_default()
                .trim_end_matches('/'),
            self.config.api_version,
            path
        )
    }

    /// Apply a token response to the session state.
    ///
    /// Sole writer of the cached headers. Absent `access_token` and
    /// `instance_url` clear the stored values; an absent `refresh_token`
    /// never clears the stored one, because refresh responses omit it.
    fn apply_token_response(&mut self, token: &TokenPayload) {
        self.state.access_token = token.access_token.clone();
        self.state.instance_url = token.instance_url.clone();
        self.state.current_user = token.user_id();
        if token.refresh_token.is_some() {
            self.state.refresh_token = token.refresh_token.clone();
        }
        self.state.logged_in = true;
        let access = self.state.access_token.clone().unwrap_or_default();
        self.state.headers = Some(vec![
            ("Authorization".to_string(), format!("OAuth {access}")),
            (
                "X-User-Agent".to_string(),
                format!(
                    "salesforce-toolkit-rest-rust/v{}",
                    self.config.api_version
                ),
            ),
        ]);
        debug!(user = ?self.state.current_user, "session authenticated");
    }

    /// Merge defaults into a request spec and dispatch it, unless the chain
    /// halted during validation.
    ///
    /// Fallback priority: request partial, then per-call options, then
    /// session defaults. POST bodies default to a JSON content type.
    async fn dispatch(
        &self,
        chain: Chain,
        request: RequestSpec,
        opts: CallOptions,
    ) -> Result<Envelope> {
        if let Chain::Halted(message) = chain {
            error!(%message, "request validation failed");
            return Err(Error::validation(message));
        }

        let CallOptions {
            headers,
            timeout,
            content_type,
            accept,
            progress,
            before_send,
        } = opts;

        let merged_headers = request
            .headers
            .or(headers)
            .or_else(|| self.state.headers.clone())
            .unwrap_or_default();
        let merged_timeout = request.timeout.or(timeout).unwrap_or(self.config.timeout);
        let mut merged_content_type = request.content_type.or(content_type);
        if merged_content_type.is_none() && request.method == Method::Post {
            merged_content_type = Some(DEFAULT_POST_CONTENT_TYPE.to_string());
        }
        let merged_accept = request.accept.or(accept).or_else(|| self.config.accept.clone());

        let body = match &request.body {
            None => None,
            Some(Body::Json(value)) => Some(Bytes::from(
                serde_json::to_vec(value).map_err(|e| Error::serialization(e.to_string(), e))?,
            )),
            Some(Body::Form(pairs)) => Some(Bytes::from(
                serde_urlencoded::to_string(pairs)
                    .map_err(|e| Error::serialization(e.to_string(), e))?
                    .into_bytes(),
            )),
        };
        let bytes_sent = body.as_ref().map(|b| b.len()).unwrap_or(0);

        let mut transport_request = TransportRequest {
            method: request.method,
            url: request.url.clone(),
            headers: merged_headers,
            body,
            content_type: merged_content_type,
            accept: merged_accept,
            timeout: merged_timeout,
        };

        if let Some(hook) = before_send {
            hook(&mut transport_request);
        }

        debug!(
            method = ?transport_request.method,
            url = %transport_request.url,
            bytes_sent,
            "dispatching request"
        );

        let started = Instant::now();
        let outcome = self.transport.send(transport_request, progress).await;
        let time_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(response) if (200..300).contains(&response.status) => {
                Ok(success_envelope(&request.url, bytes_sent, time_ms, response))
            }
            Ok(response) => Err(http_error(&request.url, bytes_sent, time_ms, response)),
            Err(failure) => Err(failure_error(&request.url, bytes_sent, time_ms, failure)),
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in with the username-password (API) flow.
    ///
    /// The configured security token is appended to the password. On
    /// success the token response is applied to the session; on failure no
    /// state is mutated.
    #[instrument(skip(self, password, opts))]
    pub async fn login_api(
        &mut self,
        username: &str,
        password: &str,
        opts: CallOptions,
    ) -> Result<Envelope> {
        let chain = Chain::start().validate(
            self.state.logged_in,
            &[Rule::Required(vec![
                ("username", !username.is_empty()),
                ("password", !password.is_empty()),
            ])],
        );

        let form = vec![
            ("grant_type".to_string(), "password".to_string()),
            ("username".to_string(), username.to_string()),
            (
                "password".to_string(),
                format!("{}{}", password, self.config.security_token),
            ),
            ("client_id".to_string(), self.config.client_id.clone()),
            (
                "client_secret".to_string(),
                self.config.client_secret().to_string(),
            ),
        ];
        let spec = RequestSpec::post(self.token_url())
            .form(form)
            .content_type(FORM_CONTENT_TYPE);

        let envelope = self.dispatch(chain, spec, opts).await?;
        if let Some(value) = envelope.payload.as_json() {
            let token = TokenPayload::from_value(value);
            self.apply_token_response(&token);
        }
        Ok(envelope)
    }

    /// Log in with the interactive user-agent (implicit) flow.
    ///
    /// Displays the authorize URL on the injected surface and waits for
    /// either a navigation to the redirect URI or the surface closing.
    /// Exactly one terminal outcome is produced: the token envelope when
    /// the redirect delivered an access token, otherwise an error (the
    /// user's cancellation or the unparseable redirect).
    #[instrument(skip(self, surface))]
    pub async fn login(&mut self, surface: &mut dyn BrowserSurface) -> Result<Envelope> {
        if self.config.redirect_uri.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "redirect_uri is required for the interactive login".to_string(),
            )));
        }

        let authorize = authorize_url(
            &self.authorize_endpoint(),
            &self.config.client_id,
            &self.config.redirect_uri,
        );
        let redirect_prefix = format!("{}#", self.config.redirect_uri);

        let mut events = surface.display(&authorize);
        let mut logged_in = false;
        let mut response: Option<serde_json::Value> = None;
        let mut parse_failure: Option<String> = None;

        loop {
            let Some(event) = events.recv().await else {
                // The surface went away without reporting Closed.
                break;
            };
            match event {
                BrowserEvent::Navigated { url, .. } => {
                    let url = percent_decode(&url);
                    if let Some(fragment) = url.strip_prefix(redirect_prefix.as_str()) {
                        if !fragment.is_empty() {
                            let pairs = decode_fragment(fragment);
                            let map: serde_json::Map<String, serde_json::Value> = pairs
                                .into_iter()
                                .map(|(k, v)| (k, serde_json::Value::String(v)))
                                .collect();
                            let value = serde_json::Value::Object(map);
                            let token = TokenPayload::from_value(&value);
                            if token.access_token.is_none() {
                                parse_failure =
                                    Some("OAuth access token is undefined".to_string());
                            } else {
                                self.apply_token_response(&token);
                                logged_in = true;
                            }
                            response = Some(value);
                        }
                        surface.close();
                    }
                }
                BrowserEvent::Closed => break,
            }
        }

        if logged_in {
            debug!("interactive login completed");
            Ok(Envelope {
                payload: Payload::Json(response.unwrap_or_default()),
                meta: ResponseMeta {
                    url: authorize,
                    status: 200,
                    status_text: STATUS_OK.to_string(),
                    ..ResponseMeta::default()
                },
            })
        } else {
            let mut payload: ErrorPayload = response
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default();
            let kind = match parse_failure {
                Some(message) => {
                    payload.message = message.clone();
                    ErrorKind::OAuthParse(message)
                }
                None => {
                    if payload.message.is_empty() {
                        payload.message = "Login cancelled".to_string();
                    }
                    ErrorKind::Cancelled
                }
            };
            error!(message = %payload.message, "interactive login failed");
            Err(Error::with_payload(
                kind,
                payload,
                ResponseMeta {
                    url: authorize,
                    status: 401,
                    status_text: STATUS_ERROR.to_string(),
                    ..ResponseMeta::default()
                },
            ))
        }
    }

    /// Exchange the stored (or supplied) refresh token for a new access
    /// token.
    ///
    /// Deliberately not gated on the login state: refresh must work even
    /// after the local session was reset. Refresh responses omit the
    /// refresh token, so the stored one survives.
    #[instrument(skip(self, refresh_token, opts))]
    pub async fn refresh(
        &mut self,
        refresh_token: Option<&str>,
        opts: CallOptions,
    ) -> Result<Envelope> {
        let token = refresh_token
            .map(str::to_string)
            .or_else(|| self.state.refresh_token.clone())
            .unwrap_or_default();

        let form = vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), token),
            ("client_id".to_string(), self.config.client_id.clone()),
            (
                "client_secret".to_string(),
                self.config.client_secret().to_string(),
            ),
        ];
        let spec = RequestSpec::post(self.token_url())
            .form(form)
            .content_type(FORM_CONTENT_TYPE);

        let envelope = self.dispatch(Chain::start(), spec, opts).await?;
        if let Some(value) = envelope.payload.as_json() {
            let token = TokenPayload::from_value(value);
            self.apply_token_response(&token);
        }
        Ok(envelope)
    }

    /// Log out. Synchronous, never fails, and performs no network call:
    /// it only resets the local token state.
    pub fn logout(&mut self) -> Envelope {
        self.state.instance_url = None;
        self.state.access_token = None;
        self.state.refresh_token = None;
        self.state.logged_in = false;
        debug!("session logged out");
        Envelope {
            payload: Payload::Json(serde_json::Value::Object(Default::default())),
            meta: ResponseMeta {
                status: 200,
                status_text: STATUS_OK.to_string(),
                ..ResponseMeta::default()
            },
        }
    }

    // =========================================================================
    // Organization
    // =========================================================================

    /// List available API versions. Does not require authentication; falls
    /// back to the default instance URL when the session has none.
    pub async fn versions(&self, instance_url: Option<&str>, opts: CallOptions) -> Result<Envelope> {
        let base = instance_url
            .map(str::to_string)
            .or_else(|| self.state.instance_url.clone())
            .unwrap_or_else(|| DEFAULT_INSTANCE_URL.to_string());
        let url = format!("{}/services/data/", base.trim_end_matches('/'));
        self.dispatch(Chain::start(), RequestSpec::get(url), opts).await
    }

    // =========================================================================
    // SObjects
    // =========================================================================

    /// List the sobjects available in the org.
    #[instrument(skip(self, opts))]
    pub async fn sobjects(&self, opts: CallOptions) -> Result<Envelope> {
        let chain = Chain::start().validate(self.state.logged_in, &[Rule::Authorized]);
        let url = self.data_url("sobjects/");
        self.dispatch(chain, RequestSpec::get(url), opts).await
    }

    /// Get basic metadata for an sobject type.
    #[instrument(skip(self, opts))]
    pub async fn metadata(&self, name: &str, opts: CallOptions) -> Result<Envelope> {
        let chain = Chain::start().validate(
            self.state.logged_in,
            &[
                Rule::Authorized,
                Rule::Required(vec![("name", !name.is_empty())]),
            ],
        );
        let url = self.data_url(&format!("sobjects/{name}"));
        self.dispatch(chain, RequestSpec::get(url), opts).await
    }

    /// Get the full describe result for an sobject type.
    #[instrument(skip(self, opts))]
    pub async fn describe(&self, name: &str, opts: CallOptions) -> Result<Envelope> {
        let chain = Chain::start().validate(
            self.state.logged_in,
            &[
                Rule::Authorized,
                Rule::Required(vec![("name", !name.is_empty())]),
            ],
        );
        let url = self.data_url(&format!("sobjects/{name}/describe"));
        self.dispatch(chain, RequestSpec::get(url), opts).await
    }

    /// Create a record.
    #[instrument(skip(self, data, opts))]
    pub async fn create(
        &self,
        name: &str,
        data: &serde_json::Value,
        opts: CallOptions,
    ) -> Result<Envelope> {
        let chain = Chain::start().validate(
            self.state.logged_in,
            &[
                Rule::Authorized,
                Rule::Required(vec![("name", !name.is_empty()), ("data", !data.is_null())]),
            ],
        );
        let url = self.data_url(&format!("sobjects/{name}"));
        self.dispatch(chain, RequestSpec::post(url).json(data.clone()), opts)
            .await
    }

    /// Retrieve a record by id, optionally limiting the returned fields.
    #[instrument(skip(self, opts))]
    pub async fn retrieve(
        &self,
        name: &str,
        id: &str,
        fields: Option<&[&str]>,
        opts: CallOptions,
    ) -> Result<Envelope> {
        let mut url = String::new();
        let chain = Chain::start()
            .validate(
                self.state.logged_in,
                &[
                    Rule::Authorized,
                    Rule::Required(vec![("name", !name.is_empty()), ("id", !id.is_empty())]),
                ],
            )
            .then(|| {
                url = self.data_url(&format!("sobjects/{name}/{id}"));
                if let Some(fields) = fields {
                    if !fields.is_empty() {
                        url.push_str("?fields=");
                        url.push_str(&fields.join(","));
                    }
                }
            });
        self.dispatch(chain, RequestSpec::get(url), opts).await
    }

    /// Update a record. PATCH is tunneled through POST via
    /// `?_HttpMethod=PATCH`.
    #[instrument(skip(self, data, opts))]
    pub async fn update(
        &self,
        name: &str,
        id: &str,
        data: &serde_json::Value,
        opts: CallOptions,
    ) -> Result<Envelope> {
        let chain = Chain::start().validate(
            self.state.logged_in,
            &[
                Rule::Authorized,
                Rule::Required(vec![
                    ("name", !name.is_empty()),
                    ("id", !id.is_empty()),
                    ("data", !data.is_null()),
                ]),
            ],
        );
        let url = self.data_url(&format!("sobjects/{name}/{id}?_HttpMethod=PATCH"));
        self.dispatch(chain, RequestSpec::post(url).json(data.clone()), opts)
            .await
    }

    /// Delete a record.
    #[instrument(skip(self, opts))]
    pub async fn remove(&self, name: &str, id: &str, opts: CallOptions) -> Result<Envelope> {
        let chain = Chain::start().validate(
            self.state.logged_in,
            &[
                Rule::Authorized,
                Rule::Required(vec![("name", !name.is_empty()), ("id", !id.is_empty())]),
            ],
        );
        let url = self.data_url(&format!("sobjects/{name}/{id}"));
        self.dispatch(chain, RequestSpec::delete(url), opts).await
    }

    /// Create or update a record carrying a blob field.
    ///
    /// The blob is base64-encoded into a copy of the caller's data; the
    /// caller's value itself is never modified.
    #[instrument(skip(self, args, opts))]
    pub async fn upsert_blob(&self, args: &UpsertBlobArgs, opts: CallOptions) -> Result<Envelope> {
        let mut url = String::new();
        let mut body = serde_json::Value::Null;
        let chain = Chain::start()
            .validate(
                self.state.logged_in,
                &[
                    Rule::Authorized,
                    Rule::Required(vec![
                        ("name", !args.name.is_empty()),
                        ("data", !args.data.is_null()),
                        ("blob_field", !args.blob_field.is_empty()),
                    ]),
                ],
            )
            .then(|| {
                url = self.data_url(&format!("sobjects/{}", args.name));
                // An id makes this an update request.
                if let Some(ref id) = args.id {
                    url.push_str(&format!("/{id}?_HttpMethod=PATCH"));
                }

                body = args.data.clone();
                if let serde_json::Value::Object(ref mut map) = body {
                    if !map.contains_key("ContentType") {
                        if let Some(ref content_type) = args.content_type {
                            map.insert(
                                "ContentType".to_string(),
                                serde_json::Value::String(content_type.clone()),
                            );
                        }
                    }
                    map.insert(
                        args.blob_field.clone(),
                        serde_json::Value::String(BASE64.encode(&args.blob)),
                    );
                }
            });
        self.dispatch(chain, RequestSpec::post(url).json(body), opts)
            .await
    }

    /// Retrieve the raw content of a record's blob field.
    #[instrument(skip(self, opts))]
    pub async fn retrieve_blob(
        &self,
        name: &str,
        id: &str,
        blob_field: &str,
        opts: CallOptions,
    ) -> Result<Envelope> {
        let chain = Chain::start().validate(
            self.state.logged_in,
            &[
                Rule::Authorized,
                Rule::Required(vec![
                    ("name", !name.is_empty()),
                    ("id", !id.is_empty()),
                    ("blob_field", !blob_field.is_empty()),
                ]),
            ],
        );
        let url = self.data_url(&format!("sobjects/{name}/{id}/{blob_field}"));
        self.dispatch(chain, RequestSpec::get(url), opts).await
    }

    /// Retrieve a record by external id field value.
    #[instrument(skip(self, opts))]
    pub async fn retrieve_external(
        &self,
        name: &str,
        field_name: &str,
        field_value: &str,
        opts: CallOptions,
    ) -> Result<Envelope> {
        let chain = Chain::start().validate(
            self.state.logged_in,
            &[
                Rule::Authorized,
                Rule::Required(vec![
                    ("name", !name.is_empty()),
                    ("field_name", !field_name.is_empty()),
                    ("field_value", !field_value.is_empty()),
                ]),
            ],
        );
        let url = self.data_url(&format!("sobjects/{name}/{field_name}/{field_value}"));
        self.dispatch(chain, RequestSpec::get(url), opts).await
    }

    /// Create or update a record addressed by external id field value.
    #[instrument(skip(self, data, opts))]
    pub async fn upsert_external(
        &self,
        name: &str,
        field_name: &str,
        field_value: &str,
        data: &serde_json::Value,
        opts: CallOptions,
    ) -> Result<Envelope> {
        let chain = Chain::start().validate(
            self.state.logged_in,
            &[
                Rule::Authorized,
                Rule::Required(vec![
                    ("name", !name.is_empty()),
                    ("field_name", !field_name.is_empty()),
                    ("field_value", !field_value.is_empty()),
                    ("data", !data.is_null()),
                ]),
            ],
        );
        let url = self.data_url(&format!(
            "sobjects/{name}/{field_name}/{field_value}?_HttpMethod=PATCH"
        ));
        self.dispatch(chain, RequestSpec::post(url).json(data.clone()), opts)
            .await
    }

    // =========================================================================
    // Query & Search
    // =========================================================================

    /// Execute a SOQL query, or fetch a further page of a previous query.
    ///
    /// When `next_records_url` is set it is appended to the instance URL
    /// verbatim, bypassing query-string construction; the caller loops
    /// until the response carries no further page token.
    #[instrument(skip(self, args, opts))]
    pub async fn query(&self, args: &QueryArgs, opts: CallOptions) -> Result<Envelope> {
        let mut url = String::new();
        let chain = Chain::start()
            .validate(
                self.state.logged_in,
                &[
                    Rule::Authorized,
                    Rule::Required(vec![("soql", !args.soql.is_empty())]),
                ],
            )
            .then(|| {
                url = match args.next_records_url {
                    Some(ref next) => format!(
                        "{}{}",
                        self.state.instance_url.as_deref().unwrap_or_default(),
                        next
                    ),
                    None => self.data_url(&format!("query?q={}", urlencoding::encode(&args.soql))),
                };
            });
        self.dispatch(chain, RequestSpec::get(url), opts).await
    }

    /// Execute a SOSL search.
    #[instrument(skip(self, opts))]
    pub async fn search_query(&self, sosl: &str, opts: CallOptions) -> Result<Envelope> {
        let mut url = String::new();
        let chain = Chain::start()
            .validate(
                self.state.logged_in,
                &[
                    Rule::Authorized,
                    Rule::Required(vec![("sosl", !sosl.is_empty())]),
                ],
            )
            .then(|| {
                url = self.data_url(&format!("search?q={}", urlencoding::encode(sosl)));
            });
        self.dispatch(chain, RequestSpec::get(url), opts).await
    }

    /// Get the global search scope order for the current user.
    #[instrument(skip(self, opts))]
    pub async fn search_scope_order(&self, opts: CallOptions) -> Result<Envelope> {
        let chain = Chain::start().validate(self.state.logged_in, &[Rule::Authorized]);
        let url = self.data_url("search/scopeOrder");
        self.dispatch(chain, RequestSpec::get(url), opts).await
    }
}

/// Arguments for [`ConnectedApp::query`].
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    /// The SOQL query string.
    pub soql: String,
    /// Pagination URL from a previous query result, used verbatim.
    pub next_records_url: Option<String>,
}

impl QueryArgs {
    /// Query with the given SOQL string.
    pub fn soql(soql: impl Into<String>) -> Self {
        Self {
            soql: soql.into(),
            next_records_url: None,
        }
    }

    /// Fetch the page behind a `nextRecordsUrl` from a previous result.
    pub fn with_next_records_url(mut self, url: impl Into<String>) -> Self {
        self.next_records_url = Some(url.into());
        self
    }
}

/// Arguments for [`ConnectedApp::upsert_blob`].
#[derive(Debug, Clone)]
pub struct UpsertBlobArgs {
    /// SObject type name.
    pub name: String,
    /// Record id; present for updates, absent for creates.
    pub id: Option<String>,
    /// Name of the blob field the payload is written into.
    pub blob_field: String,
    /// Record fields. Left untouched by the call.
    pub data: serde_json::Value,
    /// Binary payload, base64-encoded into the request body.
    pub blob: Bytes,
    /// Mime type recorded as `ContentType` when `data` does not set one.
    pub content_type: Option<String>,
}
