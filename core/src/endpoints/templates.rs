//! Email template endpoints under `/emails/templates/`.

use serde::Serialize;

use crate::client::CrmClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::request::Outcome;

pub struct EmailTemplatesApi<'a, T> {
    client: &'a CrmClient<T>,
}

impl<'a, T: Transport> EmailTemplatesApi<'a, T> {
    pub(crate) fn new(client: &'a CrmClient<T>) -> Self {
        Self { client }
    }

    pub fn get_all(&self) -> ApiResult<Outcome> {
        self.client.get("/emails/templates/")
    }

    pub fn get(&self, id: u64) -> ApiResult<Outcome> {
        self.client.get(&format!("/emails/templates/{id}/"))
    }

    pub fn create<B: Serialize + ?Sized>(&self, template: &B) -> ApiResult<Outcome> {
        self.client.send_json(HttpMethod::Post, "/emails/templates/", template)
    }

    pub fn update<B: Serialize + ?Sized>(&self, id: u64, template: &B) -> ApiResult<Outcome> {
        self.client.send_json(HttpMethod::Put, &format!("/emails/templates/{id}/"), template)
    }

    pub fn delete(&self, id: u64) -> ApiResult<Outcome> {
        self.client.delete(&format!("/emails/templates/{id}/"))
    }
}

#[cfg(test)]
mod tests {
    use crate::http::HttpMethod;
    use crate::testing::{client, RecordingTransport};
    use serde_json::json;

    #[test]
    fn update_puts_json_to_detail_path() {
        let transport = RecordingTransport::new();
        let body = json!({"name": "Welcome", "subject": "Hi {{first_name}}"});
        client(&transport, "").email_templates().update(3, &body).unwrap();
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "/emails/templates/3/");
        let sent: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn list_and_get() {
        let transport = RecordingTransport::new();
        let client = client(&transport, "");
        client.email_templates().get_all().unwrap();
        client.email_templates().get(8).unwrap();
        let urls: Vec<_> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["/emails/templates/", "/emails/templates/8/"]);
    }
}
