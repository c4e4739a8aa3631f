//! Resource namespaces.
//!
//! Each namespace borrows a `CrmClient` and binds fixed paths and verbs onto
//! the request primitive. Payloads are anything `Serialize` and are sent
//! as-is.

mod auth;
mod campaigns;
mod contacts;
mod dashboard;
mod emails;
mod templates;

pub use auth::{AuthApi, LoginOutcome};
pub use campaigns::CampaignsApi;
pub use contacts::ContactsApi;
pub use dashboard::DashboardApi;
pub use emails::{AnalyticsOutcome, EmailAnalytics, EmailsApi};
pub use templates::EmailTemplatesApi;
