//! Client configuration.
//!
//! Defaults match a dashboard served from the same origin as the CRM, using
//! Django session cookies.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// How the client proves who the user is. Chosen once per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategy {
    /// Session cookie only. CSRF header on mutating requests; 401 and 403 are
    /// auth failures.
    #[default]
    Session,
    /// `Authorization: Bearer` from the token store. CSRF header whenever the
    /// cookie exists; only 401 is an auth failure and it clears the token.
    Bearer,
}

impl AuthStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Some(Self::Session),
            "bearer" => Some(Self::Bearer),
            _ => None,
        }
    }

    pub fn is_auth_failure(self, status: u16) -> bool {
        match self {
            Self::Session => status == 401 || status == 403,
            Self::Bearer => status == 401,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for endpoints that are neither absolute URLs nor root-relative.
    pub base_url: String,
    pub auth_strategy: AuthStrategy,
    /// Where the UI goes when the server rejects the credentials.
    pub login_url: String,
    /// Server logout route (session strategy).
    pub logout_url: String,
    /// Landing page after a bearer logout.
    pub post_logout_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_strategy: AuthStrategy::default(),
            login_url: "/accounts/login/".to_string(),
            logout_url: "/accounts/logout/".to_string(),
            post_logout_url: "/".to_string(),
        }
    }
}

impl ClientConfig {
    /// Read overrides from the environment:
    /// - `CRM_BASE_URL`
    /// - `CRM_AUTH_STRATEGY` (`session` or `bearer`)
    /// - `CRM_LOGIN_URL`
    pub fn from_env() -> ApiResult<Self> {
        let mut config = Self::default();
        if let Ok(url) = env::var("CRM_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(raw) = env::var("CRM_AUTH_STRATEGY") {
            config.auth_strategy = AuthStrategy::parse(&raw)
                .ok_or_else(|| ApiError::config(format!("unknown CRM_AUTH_STRATEGY: {raw}")))?;
        }
        if let Ok(url) = env::var("CRM_LOGIN_URL") {
            config.login_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_auth_strategy(mut self, strategy: AuthStrategy) -> Self {
        self.auth_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    #[must_use]
    pub fn with_logout_url(mut self, url: impl Into<String>) -> Self {
        self.logout_url = url.into();
        self
    }

    #[must_use]
    pub fn with_post_logout_url(mut self, url: impl Into<String>) -> Self {
        self.post_logout_url = url.into();
        self
    }

    pub fn validate(&self) -> ApiResult<()> {
        let base = self.base_url.as_str();
        if !(base.is_empty()
            || base.starts_with('/')
            || base.starts_with("http://")
            || base.starts_with("https://"))
        {
            return Err(ApiError::config(
                "base_url must be empty, root-relative, or start with http:// or https://",
            ));
        }
        for (name, url) in [
            ("login_url", &self.login_url),
            ("logout_url", &self.logout_url),
            ("post_logout_url", &self.post_logout_url),
        ] {
            if url.is_empty() {
                return Err(ApiError::config(format!("{name} cannot be empty")));
            }
        }
        Ok(())
    }
}
