//! Campaign endpoints under `/campaigns/api/`.

use serde::Serialize;

use crate::client::CrmClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::request::Outcome;

pub struct CampaignsApi<'a, T> {
    client: &'a CrmClient<T>,
}

impl<'a, T: Transport> CampaignsApi<'a, T> {
    pub(crate) fn new(client: &'a CrmClient<T>) -> Self {
        Self { client }
    }

    pub fn get_all(&self) -> ApiResult<Outcome> {
        self.client.get("/campaigns/api/")
    }

    pub fn get(&self, id: u64) -> ApiResult<Outcome> {
        self.client.get(&format!("/campaigns/api/{id}/"))
    }

    pub fn create<B: Serialize + ?Sized>(&self, campaign: &B) -> ApiResult<Outcome> {
        self.client.send_json(HttpMethod::Post, "/campaigns/api/", campaign)
    }

    pub fn update<B: Serialize + ?Sized>(&self, id: u64, campaign: &B) -> ApiResult<Outcome> {
        self.client.send_json(HttpMethod::Put, &format!("/campaigns/api/{id}/"), campaign)
    }

    pub fn delete(&self, id: u64) -> ApiResult<Outcome> {
        self.client.delete(&format!("/campaigns/api/{id}/"))
    }

    /// The most recent campaigns, newest first, for the dashboard.
    pub fn recent(&self) -> ApiResult<Outcome> {
        self.client.get("/campaigns/api/recent/")
    }

    /// Size of a contact list.
    pub fn list_contacts(&self, list_id: u64) -> ApiResult<Outcome> {
        self.client
            .get(&format!("/campaigns/api/list-contacts/?list_id={list_id}"))
    }

    /// Count contacts matching company/position filters, e.g.
    /// `{"companies": ["Acme"], "positions": []}`.
    pub fn filter_contacts<B: Serialize + ?Sized>(&self, filters: &B) -> ApiResult<Outcome> {
        self.client.send_json(HttpMethod::Post, "/campaigns/api/filter-contacts/", filters)
    }
}
