//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::client::CrmClient;
use crate::config::{AuthStrategy, ClientConfig};
use crate::cookie::MemoryDocument;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::storage::MemoryStorage;

/// Records every request and replays queued responses in order. Once the
/// queue is empty it answers `200 {}`.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    requests: RefCell<Vec<HttpRequest>>,
    responses: RefCell<VecDeque<Result<HttpResponse, String>>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, status: u16, body: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
        self
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.responses.borrow_mut().push_back(Err(message.to_string()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn last(&self) -> HttpRequest {
        self.requests.borrow().last().cloned().expect("no request was sent")
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request);
        match self.responses.borrow_mut().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ApiError::Transport(message)),
            None => Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: "{}".to_string(),
            }),
        }
    }
}

pub(crate) fn client_with<'a>(
    transport: &'a RecordingTransport,
    strategy: AuthStrategy,
    cookies: &str,
) -> CrmClient<&'a RecordingTransport> {
    CrmClient::new(
        ClientConfig::default().with_auth_strategy(strategy),
        Arc::new(MemoryDocument::with_cookies(cookies)),
        Arc::new(MemoryStorage::new()),
        transport,
    )
    .expect("default config is valid")
}

pub(crate) fn client<'a>(
    transport: &'a RecordingTransport,
    cookies: &str,
) -> CrmClient<&'a RecordingTransport> {
    client_with(transport, AuthStrategy::Session, cookies)
}
