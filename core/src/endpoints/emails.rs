//! Email sending and analytics endpoints.
//!
//! `get_analytics` normalizes the analytics payload so the UI always sees
//! every field: counts default to 0, rates to 0.0, lists to empty. Failures
//! of any kind other than an auth failure collapse into
//! `AnalyticsOutcome::Failed`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::client::CrmClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::request::{Navigation, Outcome};

const ANALYTICS_FAILED: &str = "Failed to fetch analytics data";

#[derive(Serialize)]
struct BulkSend<'a> {
    contact_ids: &'a [u64],
    template_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailAnalytics {
    pub total_sent: u64,
    pub total_opened: u64,
    pub total_clicked: u64,
    /// Percentage, 0..=100.
    pub open_rate: f64,
    pub click_rate: f64,
    pub template_stats: Vec<Value>,
    pub recent_emails: Vec<Value>,
}

/// Integer counts may arrive as whole floats (`10.0`). Negative or
/// non-numeric values count as 0.
fn as_count(value: &Value) -> u64 {
    value.as_u64().unwrap_or_else(|| match value.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 => f as u64,
        _ => 0,
    })
}

impl EmailAnalytics {
    /// Pull the known fields out of a server payload. Missing, null or
    /// mistyped fields take their default.
    pub fn from_data(data: &Value) -> Self {
        let count = |key: &str| data.get(key).map_or(0, as_count);
        let rate = |key: &str| data.get(key).and_then(Value::as_f64).unwrap_or(0.0);
        let list = |key: &str| {
            data.get(key)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
        };
        Self {
            total_sent: count("total_sent"),
            total_opened: count("total_opened"),
            total_clicked: count("total_clicked"),
            open_rate: rate("open_rate"),
            click_rate: rate("click_rate"),
            template_stats: list("template_stats"),
            recent_emails: list("recent_emails"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsOutcome {
    Ready(EmailAnalytics),
    Failed {
        message: String,
        /// Parsed error body, when the server answered at all.
        details: Option<Value>,
    },
    AuthRequired(Navigation),
}

pub struct EmailsApi<'a, T> {
    client: &'a CrmClient<T>,
}

impl<'a, T: Transport> EmailsApi<'a, T> {
    pub(crate) fn new(client: &'a CrmClient<T>) -> Self {
        Self { client }
    }

    /// POST /emails/send/{contact_id}/
    pub fn send<B: Serialize + ?Sized>(&self, contact_id: u64, email: &B) -> ApiResult<Outcome> {
        self.client.send_json(HttpMethod::Post, &format!("/emails/send/{contact_id}/"), email)
    }

    /// POST /emails/bulk-send/ with `{"contact_ids": [...], "template_id": n}`.
    pub fn bulk_send(&self, contact_ids: &[u64], template_id: u64) -> ApiResult<Outcome> {
        let body = BulkSend {
            contact_ids,
            template_id,
        };
        self.client.send_json(HttpMethod::Post, "/emails/bulk-send/", &body)
    }

    /// GET /emails/analytics/, unmodified.
    pub fn get_analytics_raw(&self) -> ApiResult<Outcome> {
        self.client.get("/emails/analytics/")
    }

    pub fn get_analytics(&self) -> AnalyticsOutcome {
        match self.get_analytics_raw() {
            Ok(Outcome::Completed(envelope)) if !envelope.error => {
                AnalyticsOutcome::Ready(EmailAnalytics::from_data(&envelope.data))
            }
            Ok(Outcome::Completed(envelope)) => {
                error!(status = envelope.response.status, "error fetching analytics");
                AnalyticsOutcome::Failed {
                    message: ANALYTICS_FAILED.to_string(),
                    details: Some(envelope.data),
                }
            }
            Ok(Outcome::AuthRequired(nav)) => AnalyticsOutcome::AuthRequired(nav),
            Err(err) => {
                error!(error = %err, "analytics request failed");
                AnalyticsOutcome::Failed {
                    message: err.to_string(),
                    details: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, RecordingTransport};
    use serde_json::json;

    #[test]
    fn bulk_send_body_shape() {
        let transport = RecordingTransport::new();
        client(&transport, "csrftoken=c")
            .emails()
            .bulk_send(&[1, 2, 3], 7)
            .unwrap();
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "/emails/bulk-send/");
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"contact_ids":[1,2,3],"template_id":7}"#)
        );
        assert_eq!(req.header("X-CSRFToken"), Some("c"));
    }

    #[test]
    fn send_targets_contact() {
        let transport = RecordingTransport::new();
        client(&transport, "")
            .emails()
            .send(12, &json!({"subject": "Hi", "body": "Hello"}))
            .unwrap();
        assert_eq!(transport.last().url, "/emails/send/12/");
    }

    #[test]
    fn analytics_fills_defaults() {
        let transport = RecordingTransport::new()
            .respond(200, r#"{"total_sent":10,"open_rate":42.5,"click_rate":null,"template_stats":"bogus"}"#);
        let outcome = client(&transport, "").emails().get_analytics();
        assert_eq!(
            outcome,
            AnalyticsOutcome::Ready(EmailAnalytics {
                total_sent: 10,
                open_rate: 42.5,
                ..EmailAnalytics::default()
            })
        );
    }

    #[test]
    fn analytics_integer_rate_is_accepted() {
        let data = json!({"open_rate": 50, "recent_emails": [{"id": 1}]});
        let analytics = EmailAnalytics::from_data(&data);
        assert_eq!(analytics.open_rate, 50.0);
        assert_eq!(analytics.recent_emails.len(), 1);
    }

    #[test]
    fn analytics_whole_float_counts_are_accepted() {
        let data = json!({"total_sent": 10.0, "total_opened": 3.0, "total_clicked": -1.0});
        let analytics = EmailAnalytics::from_data(&data);
        assert_eq!(analytics.total_sent, 10);
        assert_eq!(analytics.total_opened, 3);
        assert_eq!(analytics.total_clicked, 0);
    }

    #[test]
    fn analytics_error_envelope_is_normalized() {
        let transport = RecordingTransport::new().respond(500, r#"{"detail":"boom"}"#);
        let outcome = client(&transport, "").emails().get_analytics();
        assert_eq!(
            outcome,
            AnalyticsOutcome::Failed {
                message: "Failed to fetch analytics data".to_string(),
                details: Some(json!({"detail": "boom"})),
            }
        );
    }

    #[test]
    fn analytics_transport_error_is_normalized() {
        let transport = RecordingTransport::new().fail("offline");
        let outcome = client(&transport, "").emails().get_analytics();
        assert!(matches!(
            outcome,
            AnalyticsOutcome::Failed { ref message, details: None } if message.contains("offline")
        ));
    }

    #[test]
    fn analytics_auth_failure_is_passed_through() {
        let transport = RecordingTransport::new().respond(403, "");
        let outcome = client(&transport, "").emails().get_analytics();
        assert_eq!(
            outcome,
            AnalyticsOutcome::AuthRequired(Navigation::to("/accounts/login/"))
        );
    }

    #[test]
    fn raw_analytics_is_unmodified() {
        let transport = RecordingTransport::new().respond(200, r#"{"total_sent":1,"extra":true}"#);
        let outcome = client(&transport, "").emails().get_analytics_raw().unwrap();
        assert_eq!(
            outcome.envelope().unwrap().data,
            json!({"total_sent": 1, "extra": true})
        );
    }
}
