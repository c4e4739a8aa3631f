use crate::client::CrmClient;
use crate::error::ApiResult;
use crate::http::Transport;
use crate::request::Outcome;

pub struct DashboardApi<'a, T> {
    client: &'a CrmClient<T>,
}

impl<'a, T: Transport> DashboardApi<'a, T> {
    pub(crate) fn new(client: &'a CrmClient<T>) -> Self {
        Self { client }
    }

    pub fn summary(&self) -> ApiResult<Outcome> {
        self.client.get("/dashboard/data/")
    }

    pub fn stats(&self) -> ApiResult<Outcome> {
        self.client.get("/dashboard/stats/")
    }

    pub fn recent_activities(&self) -> ApiResult<Outcome> {
        self.client.get("/dashboard/recent-activities/")
    }
}
