//! The request primitive, split into its two pure halves.
//!
//! # Design
//! `RequestContext::build` turns an endpoint plus `RequestOptions` into an
//! `HttpRequest` with every header the auth strategy calls for.
//! `RequestContext::interpret` turns the matching `HttpResponse` into an
//! `Outcome`. Nothing in between touches the network, so a host can run the
//! round-trip however it likes; `CrmClient` is the in-process host.
//!
//! An auth failure is reported as `Outcome::AuthRequired` carrying the login
//! page. Navigating there is the UI's job.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{AuthStrategy, ClientConfig};
use crate::cookie::{get_cookie, Document, MemoryDocument};
use crate::error::ApiResult;
use crate::http::{Credentials, HttpMethod, HttpRequest, HttpResponse};
use crate::storage::{MemoryStorage, Storage};
use crate::token::TokenStore;

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
const JSON: &str = "application/json";

/// Caller-side knobs for a single request. `method` defaults to GET.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub credentials: Credentials,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    /// Options carrying `body` encoded as JSON.
    pub fn json<B: Serialize + ?Sized>(method: HttpMethod, body: &B) -> ApiResult<Self> {
        Ok(Self {
            method: Some(method),
            body: Some(serde_json::to_string(body)?),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }
}

/// A page the UI layer must navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
}

impl Navigation {
    pub fn to(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// The uniform result of a completed round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub response: HttpResponse,
    /// Parsed JSON body, or `{}` when the body is empty or not JSON.
    pub data: Value,
    /// Set when the status is outside 200..=299.
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Envelope),
    /// The server rejected the credentials. No body was parsed.
    AuthRequired(Navigation),
}

impl Outcome {
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            Outcome::Completed(envelope) => Some(envelope),
            Outcome::AuthRequired(_) => None,
        }
    }

    pub fn into_envelope(self) -> Option<Envelope> {
        match self {
            Outcome::Completed(envelope) => Some(envelope),
            Outcome::AuthRequired(_) => None,
        }
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, Outcome::AuthRequired(_))
    }
}

/// Parse a response body, substituting `{}` for anything that is not JSON.
pub fn parse_body(body: &str) -> Value {
    match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            if !body.is_empty() {
                debug!(error = %err, "response body is not JSON, using {{}}");
            }
            Value::Object(serde_json::Map::new())
        }
    }
}

/// Configuration plus the host's cookie jar and storage.
#[derive(Clone)]
pub struct RequestContext {
    config: ClientConfig,
    document: Arc<dyn Document>,
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RequestContext {
    pub fn new(
        config: ClientConfig,
        document: Arc<dyn Document>,
        storage: Arc<dyn Storage>,
    ) -> ApiResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            document,
            storage,
        })
    }

    /// Context over a fresh `MemoryDocument` and `MemoryStorage`.
    pub fn in_memory(config: ClientConfig) -> ApiResult<Self> {
        Self::new(
            config,
            Arc::new(MemoryDocument::new()),
            Arc::new(MemoryStorage::new()),
        )
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn document(&self) -> &dyn Document {
        self.document.as_ref()
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        get_cookie(&self.document.cookie(), name)
    }

    pub fn tokens(&self) -> TokenStore<'_> {
        TokenStore::new(self.document.as_ref(), self.storage.as_ref())
    }

    /// Absolute URLs and root-relative paths pass through; anything else is
    /// appended to `base_url`.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/')
            || endpoint.starts_with("http://")
            || endpoint.starts_with("https://")
        {
            endpoint.to_string()
        } else {
            format!("{}{endpoint}", self.config.base_url)
        }
    }

    pub fn build(&self, endpoint: &str, options: RequestOptions) -> HttpRequest {
        let method = options.method.unwrap_or(HttpMethod::Get);
        let url = self.resolve_url(endpoint);
        let strategy = self.config.auth_strategy;

        let mut headers = vec![(CONTENT_TYPE.to_string(), JSON.to_string())];
        for (name, value) in options.headers {
            set_header(&mut headers, name, value);
        }

        let wants_csrf = match strategy {
            AuthStrategy::Session => method.is_mutating(),
            AuthStrategy::Bearer => true,
        };
        if wants_csrf {
            match self.cookie(CSRF_COOKIE) {
                Some(token) => set_header(&mut headers, CSRF_HEADER.to_string(), token),
                None if method.is_mutating() => {
                    warn!(%method, %url, "no CSRF cookie for mutating request");
                }
                None => {}
            }
        }

        if strategy == AuthStrategy::Bearer {
            if let Some(token) = self.tokens().get_token() {
                set_header(&mut headers, AUTHORIZATION.to_string(), format!("Bearer {token}"));
            }
        }

        debug!(
            %method,
            %url,
            headers = ?headers.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            "built API request"
        );

        HttpRequest {
            method,
            url,
            headers,
            body: options.body,
            credentials: options.credentials,
        }
    }

    pub fn interpret(&self, response: HttpResponse) -> Outcome {
        let strategy = self.config.auth_strategy;
        if strategy.is_auth_failure(response.status) {
            warn!(
                status = response.status,
                login = %self.config.login_url,
                "authentication failed, login required"
            );
            if strategy == AuthStrategy::Bearer {
                self.tokens().clear_token();
            }
            return Outcome::AuthRequired(Navigation::to(self.config.login_url.clone()));
        }

        let error = !response.is_success();
        if error {
            warn!(status = response.status, "API error response");
        }
        let data = parse_body(&response.body);
        Outcome::Completed(Envelope {
            response,
            data,
            error,
        })
    }
}

/// Insert or replace a header, matching names case-insensitively.
fn set_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
        Some(slot) => *slot = (name, value),
        None => headers.push((name, value)),
    }
}
