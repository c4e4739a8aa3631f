//! `CrmClient`: the request primitive wired to a transport.
//!
//! Constructed once at application start and handed to whatever needs to
//! talk to the CRM. Resource namespaces borrow it.

use std::sync::Arc;

use serde::Serialize;
use tracing::error;

use crate::config::ClientConfig;
use crate::cookie::Document;
use crate::endpoints::{
    AuthApi, CampaignsApi, ContactsApi, DashboardApi, EmailTemplatesApi, EmailsApi,
};
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::request::{Outcome, RequestContext, RequestOptions};
use crate::storage::Storage;
use crate::token::TokenStore;

#[derive(Debug)]
pub struct CrmClient<T> {
    context: RequestContext,
    transport: T,
}

impl<T: Transport> CrmClient<T> {
    pub fn new(
        config: ClientConfig,
        document: Arc<dyn Document>,
        storage: Arc<dyn Storage>,
        transport: T,
    ) -> ApiResult<Self> {
        let context = RequestContext::new(config, document, storage)?;
        Ok(Self::from_context(context, transport))
    }

    pub fn from_context(context: RequestContext, transport: T) -> Self {
        Self { context, transport }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn config(&self) -> &ClientConfig {
        self.context.config()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn tokens(&self) -> TokenStore<'_> {
        self.context.tokens()
    }

    /// Build, send and interpret one request.
    ///
    /// Transport failures are returned as `Err` untouched.
    pub fn request(&self, endpoint: &str, options: RequestOptions) -> ApiResult<Outcome> {
        let request = self.context.build(endpoint, options);
        let (method, url) = (request.method, request.url.clone());
        let response = self.transport.send(request).inspect_err(|err| {
            error!(%method, %url, error = %err, "API request failed");
        })?;
        Ok(self.context.interpret(response))
    }

    pub(crate) fn get(&self, endpoint: &str) -> ApiResult<Outcome> {
        self.request(endpoint, RequestOptions::new(HttpMethod::Get))
    }

    pub(crate) fn delete(&self, endpoint: &str) -> ApiResult<Outcome> {
        self.request(endpoint, RequestOptions::new(HttpMethod::Delete))
    }

    pub(crate) fn send_json<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<Outcome> {
        self.request(endpoint, RequestOptions::json(method, body)?)
    }

    pub fn auth(&self) -> AuthApi<'_, T> {
        AuthApi::new(self)
    }

    pub fn contacts(&self) -> ContactsApi<'_, T> {
        ContactsApi::new(self)
    }

    pub fn email_templates(&self) -> EmailTemplatesApi<'_, T> {
        EmailTemplatesApi::new(self)
    }

    pub fn emails(&self) -> EmailsApi<'_, T> {
        EmailsApi::new(self)
    }

    pub fn dashboard(&self) -> DashboardApi<'_, T> {
        DashboardApi::new(self)
    }

    pub fn campaigns(&self) -> CampaignsApi<'_, T> {
        CampaignsApi::new(self)
    }
}
