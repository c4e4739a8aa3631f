//! Login, logout, registration and profile.
//!
//! # Design
//! Under `AuthStrategy::Session` the server owns the login form, so `login`
//! only tells the UI where to go. Under `AuthStrategy::Bearer` it exchanges
//! credentials at `/api/token/` and keeps the returned tokens.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::CrmClient;
use crate::config::AuthStrategy;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::request::{Navigation, Outcome, RequestOptions, CSRF_HEADER};

const TOKEN_ENDPOINT: &str = "/api/token/";
const REGISTER_ENDPOINT: &str = "/accounts/register/";
const PROFILE_ENDPOINT: &str = "/accounts/profile/";
const FORM_CSRF_FIELD: &str = "csrfmiddlewaretoken";

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Send the user to the server-rendered login page.
    Redirect(Navigation),
    /// The token endpoint answered. `data` is its parsed body.
    Completed { success: bool, data: Value },
}

pub struct AuthApi<'a, T> {
    client: &'a CrmClient<T>,
}

impl<'a, T: Transport> AuthApi<'a, T> {
    pub(crate) fn new(client: &'a CrmClient<T>) -> Self {
        Self { client }
    }

    pub fn login(
        &self,
        username: &str,
        password: &str,
        csrf_token: Option<&str>,
    ) -> ApiResult<LoginOutcome> {
        let config = self.client.config();
        if config.auth_strategy == AuthStrategy::Session {
            return Ok(LoginOutcome::Redirect(Navigation::to(config.login_url.clone())));
        }

        let credentials = json!({ "username": username, "password": password });
        let mut options = RequestOptions::json(HttpMethod::Post, &credentials)?;
        if let Some(token) = csrf_token {
            options = options.with_header(CSRF_HEADER, token);
        }

        let envelope = match self.client.request(TOKEN_ENDPOINT, options)? {
            Outcome::Completed(envelope) => envelope,
            Outcome::AuthRequired(_) => {
                warn!(%username, "login rejected");
                return Ok(LoginOutcome::Completed {
                    success: false,
                    data: json!({}),
                });
            }
        };

        if envelope.error {
            warn!(%username, status = envelope.response.status, "login failed");
        } else {
            let tokens = self.client.tokens();
            if let Some(access) = envelope.data.get("access").and_then(Value::as_str) {
                tokens.set_token(access);
            }
            if let Some(refresh) = envelope.data.get("refresh").and_then(Value::as_str) {
                tokens.set_refresh_token(refresh);
            }
            info!(%username, "logged in");
        }
        Ok(LoginOutcome::Completed {
            success: !envelope.error,
            data: envelope.data,
        })
    }

    /// POST /accounts/register/. A `csrfmiddlewaretoken` field in the payload
    /// is moved into the `X-CSRFToken` header.
    pub fn register<B: Serialize + ?Sized>(&self, user_data: &B) -> ApiResult<Outcome> {
        let mut payload = serde_json::to_value(user_data)?;
        let mut options = RequestOptions::new(HttpMethod::Post);

        if let Some(fields) = payload.as_object_mut() {
            let form_token = fields
                .get(FORM_CSRF_FIELD)
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if let Some(token) = form_token {
                fields.remove(FORM_CSRF_FIELD);
                options = options.with_header(CSRF_HEADER, token);
            }
        }

        options.body = Some(serde_json::to_string(&payload)?);
        self.client.request(REGISTER_ENDPOINT, options)
    }

    /// Forget local credentials where the strategy keeps any and return the
    /// page to navigate to.
    pub fn logout(&self) -> Navigation {
        let config = self.client.config();
        match config.auth_strategy {
            AuthStrategy::Session => Navigation::to(config.logout_url.clone()),
            AuthStrategy::Bearer => {
                self.client.tokens().clear_all();
                Navigation::to(config.post_logout_url.clone())
            }
        }
    }

    pub fn profile(&self) -> ApiResult<Outcome> {
        self.client.get(PROFILE_ENDPOINT)
    }

    pub fn update_profile<B: Serialize + ?Sized>(&self, profile: &B) -> ApiResult<Outcome> {
        self.client.send_json(HttpMethod::Put, PROFILE_ENDPOINT, profile)
    }
}
