//! Contacts endpoints under `/contacts/`.

use serde::Serialize;

use crate::client::CrmClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::request::Outcome;

pub struct ContactsApi<'a, T> {
    client: &'a CrmClient<T>,
}

impl<'a, T: Transport> ContactsApi<'a, T> {
    pub(crate) fn new(client: &'a CrmClient<T>) -> Self {
        Self { client }
    }

    /// GET /contacts/
    pub fn get_all(&self) -> ApiResult<Outcome> {
        self.client.get("/contacts/")
    }

    /// GET /contacts/{id}/
    pub fn get(&self, id: u64) -> ApiResult<Outcome> {
        self.client.get(&format!("/contacts/{id}/"))
    }

    /// POST /contacts/
    pub fn create<B: Serialize + ?Sized>(&self, contact: &B) -> ApiResult<Outcome> {
        self.client.send_json(HttpMethod::Post, "/contacts/", contact)
    }

    /// PUT /contacts/{id}/
    pub fn update<B: Serialize + ?Sized>(&self, id: u64, contact: &B) -> ApiResult<Outcome> {
        self.client.send_json(HttpMethod::Put, &format!("/contacts/{id}/"), contact)
    }

    /// DELETE /contacts/{id}/
    pub fn delete(&self, id: u64) -> ApiResult<Outcome> {
        self.client.delete(&format!("/contacts/{id}/"))
    }

    /// GET /contacts/search/?q=..., query percent-encoded.
    pub fn search(&self, query: &str) -> ApiResult<Outcome> {
        let query = urlencoding::encode(query);
        self.client.get(&format!("/contacts/search/?q={query}"))
    }

    /// GET /contacts/{id}/emails/: emails sent to one contact.
    pub fn emails(&self, id: u64) -> ApiResult<Outcome> {
        self.client.get(&format!("/contacts/{id}/emails/"))
    }
}
