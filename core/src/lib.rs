//! Client core for the email CRM API.
//!
//! # Overview
//! Attaches CSRF and auth headers to outgoing requests, turns responses into
//! a uniform `Envelope`, and exposes one namespace per CRM resource
//! (contacts, email templates, emails, campaigns, dashboard, auth).
//!
//! # Design
//! - The core never touches the network, cookies or disk directly. The host
//!   supplies a `Transport`, a `Document` (cookie jar) and a `Storage`.
//! - `RequestContext` holds the two pure halves of a request: `build` and
//!   `interpret`. `CrmClient` runs them around `Transport::send`.
//! - Auth failures are a value (`Outcome::AuthRequired`), not a side effect;
//!   the UI decides how to navigate.
//! - `AuthStrategy` is fixed per client: session cookies or bearer tokens.

pub mod client;
pub mod config;
pub mod cookie;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod request;
pub mod storage;
pub mod token;

#[cfg(test)]
mod testing;

pub use client::CrmClient;
pub use config::{AuthStrategy, ClientConfig};
pub use cookie::{get_cookie, Document, MemoryDocument};
pub use endpoints::{AnalyticsOutcome, EmailAnalytics, LoginOutcome};
pub use error::{ApiError, ApiResult};
pub use http::{Credentials, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use request::{parse_body, Envelope, Navigation, Outcome, RequestContext, RequestOptions};
pub use storage::{MemoryStorage, Storage};
pub use token::TokenStore;
