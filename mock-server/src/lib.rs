//! In-memory stand-in for the email CRM API.
//!
//! Serves every route the client knows about with Django-like auth rules:
//! a `sessionid` cookie or a bearer token authenticates, and mutating
//! requests authenticated by session must echo the `csrftoken` cookie in
//! `X-CSRFToken`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo-password";
/// Contact list seeded at startup.
pub const SEED_LIST_ID: u64 = 1;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub position: String,
}

#[derive(Deserialize)]
pub struct ContactInput {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmailTemplate {
    pub id: u64,
    pub name: String,
    pub subject: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct TemplateInput {
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: u64,
    pub name: String,
    pub email_template: Option<u64>,
    pub contact_list: Option<u64>,
    pub is_sent: bool,
}

#[derive(Deserialize)]
pub struct CampaignInput {
    pub name: String,
    #[serde(default)]
    pub email_template: Option<u64>,
    #[serde(default)]
    pub contact_list: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SentEmail {
    pub id: u64,
    pub contact_id: u64,
    pub template_id: Option<u64>,
    pub subject: String,
    pub opened: bool,
    pub clicked: bool,
}

#[derive(Deserialize)]
pub struct SendInput {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub template_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct BulkSendInput {
    pub contact_ids: Vec<u64>,
    pub template_id: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Registration {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub list_id: Option<u64>,
}

#[derive(Deserialize, Default)]
pub struct ContactFilters {
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub positions: Vec<String>,
}

struct Account {
    password: String,
    profile: Profile,
}

struct ContactList {
    name: String,
    contacts: Vec<u64>,
}

/// Username of the authenticated caller, set by the auth middleware.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

#[derive(Default)]
pub struct Store {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, String>,
    tokens: HashMap<String, String>,
    contacts: BTreeMap<u64, Contact>,
    templates: BTreeMap<u64, EmailTemplate>,
    campaigns: BTreeMap<u64, Campaign>,
    lists: BTreeMap<u64, ContactList>,
    sent: Vec<SentEmail>,
    next_id: u64,
}

impl Store {
    fn seeded() -> Self {
        let mut store = Self::default();
        store.accounts.insert(
            DEMO_USERNAME.to_string(),
            Account {
                password: DEMO_PASSWORD.to_string(),
                profile: Profile {
                    username: DEMO_USERNAME.to_string(),
                    email: "demo@example.com".to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                },
            },
        );
        store.lists.insert(
            SEED_LIST_ID,
            ContactList {
                name: "Newsletter".to_string(),
                contacts: Vec::new(),
            },
        );
        store.next_id = 1;
        store
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn record_send(
        &mut self,
        contact_id: u64,
        template_id: Option<u64>,
        subject: String,
    ) -> SentEmail {
        let sent = SentEmail {
            id: self.next_id(),
            contact_id,
            template_id,
            subject,
            opened: false,
            clicked: false,
        };
        self.sent.push(sent.clone());
        sent
    }
}

pub type Db = Arc<RwLock<Store>>;

type Rejection = (StatusCode, Json<Value>);

fn reject(status: StatusCode, detail: &str) -> Rejection {
    (status, Json(json!({ "detail": detail })))
}

fn not_found() -> Rejection {
    reject(StatusCode::NOT_FOUND, "Not found.")
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));

    let protected = Router::new()
        .route("/contacts/", get(list_contacts).post(create_contact))
        .route("/contacts/search/", get(search_contacts))
        .route(
            "/contacts/{id}/",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/contacts/{id}/emails/", get(contact_emails))
        .route("/emails/templates/", get(list_templates).post(create_template))
        .route(
            "/emails/templates/{id}/",
            get(get_template).put(update_template).delete(delete_template),
        )
        .route("/emails/send/{contact_id}/", post(send_email))
        .route("/emails/bulk-send/", post(bulk_send))
        .route("/emails/analytics/", get(analytics))
        .route("/dashboard/data/", get(dashboard_data))
        .route("/dashboard/stats/", get(dashboard_stats))
        .route("/dashboard/recent-activities/", get(recent_activities))
        .route("/campaigns/api/", get(list_campaigns).post(create_campaign))
        .route("/campaigns/api/recent/", get(recent_campaigns))
        .route("/campaigns/api/list-contacts/", get(list_contact_count))
        .route("/campaigns/api/filter-contacts/", post(filter_contact_count))
        .route(
            "/campaigns/api/{id}/",
            get(get_campaign).put(update_campaign).delete(delete_campaign),
        )
        .route("/accounts/profile/", get(get_profile).put(update_profile))
        .route_layer(middleware::from_fn_with_state(db.clone(), require_auth));

    Router::new()
        .route("/accounts/login/", post(login))
        .route("/accounts/logout/", get(logout))
        .route("/accounts/register/", post(register))
        .route("/api/token/", post(issue_token))
        .merge(protected)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

async fn require_auth(State(db): State<Db>, mut request: Request, next: Next) -> Response {
    let user = {
        let store = db.read().await;
        let headers = request.headers();

        if let Some(user) = bearer(headers).and_then(|t| store.tokens.get(t)) {
            user.clone()
        } else if let Some(user) =
            cookie(headers, "sessionid").and_then(|s| store.sessions.get(s))
        {
            if is_mutating(request.method()) {
                let expected = cookie(headers, "csrftoken");
                let sent = headers.get("x-csrftoken").and_then(|v| v.to_str().ok());
                if expected.is_none() || expected != sent {
                    warn!(path = %request.uri().path(), "CSRF check failed");
                    return reject(
                        StatusCode::FORBIDDEN,
                        "CSRF Failed: CSRF token missing or incorrect.",
                    )
                    .into_response();
                }
            }
            user.clone()
        } else if let Some(user) =
            cookie(headers, "access_token").and_then(|t| store.tokens.get(t))
        {
            user.clone()
        } else {
            debug!(path = %request.uri().path(), "unauthenticated request");
            return reject(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            )
            .into_response();
        }
    };
    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

// --- accounts ---

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> Response {
    let mut store = db.write().await;
    let valid = store
        .accounts
        .get(&input.username)
        .is_some_and(|a| a.password == input.password);
    if !valid {
        warn!(username = %input.username, "login failed");
        return reject(StatusCode::BAD_REQUEST, "Invalid username or password.").into_response();
    }
    let session = Uuid::new_v4().to_string();
    let csrf = Uuid::new_v4().simple().to_string();
    store.sessions.insert(session.clone(), input.username.clone());
    info!(username = %input.username, "session login");
    (
        AppendHeaders([
            (header::SET_COOKIE, format!("sessionid={session}; Path=/; HttpOnly")),
            (header::SET_COOKIE, format!("csrftoken={csrf}; Path=/")),
        ]),
        Json(json!({ "username": input.username })),
    )
        .into_response()
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(session) = cookie(&headers, "sessionid") {
        db.write().await.sessions.remove(session);
    }
    (
        AppendHeaders([(
            header::SET_COOKIE,
            "sessionid=; expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/".to_string(),
        )]),
        Json(json!({ "detail": "Logged out." })),
    )
}

async fn issue_token(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<Value>, Rejection> {
    let mut store = db.write().await;
    let valid = store
        .accounts
        .get(&input.username)
        .is_some_and(|a| a.password == input.password);
    if !valid {
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "No active account found with the given credentials",
        ));
    }
    let access = Uuid::new_v4().to_string();
    let refresh = Uuid::new_v4().to_string();
    store.tokens.insert(access.clone(), input.username);
    Ok(Json(json!({ "access": access, "refresh": refresh })))
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<Registration>,
) -> Result<(StatusCode, Json<Profile>), Rejection> {
    let mut missing = serde_json::Map::new();
    for (field, value) in [
        ("username", &input.username),
        ("email", &input.email),
        ("password", &input.password),
    ] {
        if value.as_deref().unwrap_or("").is_empty() {
            missing.insert(field.to_string(), json!(["This field is required."]));
        }
    }
    let (Some(username), Some(email), Some(password)) =
        (input.username, input.email, input.password)
    else {
        return Err((StatusCode::BAD_REQUEST, Json(Value::Object(missing))));
    };
    if !missing.is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(Value::Object(missing))));
    }

    let mut store = db.write().await;
    if store.accounts.contains_key(&username) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "username": ["A user with that username already exists."] })),
        ));
    }
    let profile = Profile {
        username: username.clone(),
        email,
        first_name: String::new(),
        last_name: String::new(),
    };
    store.accounts.insert(
        username,
        Account {
            password,
            profile: profile.clone(),
        },
    );
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn get_profile(
    State(db): State<Db>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Profile>, Rejection> {
    let store = db.read().await;
    store
        .accounts
        .get(&user)
        .map(|a| Json(a.profile.clone()))
        .ok_or_else(not_found)
}

async fn update_profile(
    State(db): State<Db>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<ProfileUpdate>,
) -> Result<Json<Profile>, Rejection> {
    let mut store = db.write().await;
    let account = store.accounts.get_mut(&user).ok_or_else(not_found)?;
    if let Some(email) = input.email {
        account.profile.email = email;
    }
    if let Some(first_name) = input.first_name {
        account.profile.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        account.profile.last_name = last_name;
    }
    Ok(Json(account.profile.clone()))
}

// --- contacts ---

async fn list_contacts(State(db): State<Db>) -> Json<Vec<Contact>> {
    Json(db.read().await.contacts.values().cloned().collect())
}

async fn create_contact(
    State(db): State<Db>,
    Json(input): Json<ContactInput>,
) -> (StatusCode, Json<Contact>) {
    let mut store = db.write().await;
    let contact = Contact {
        id: store.next_id(),
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        company: input.company,
        position: input.position,
    };
    store.contacts.insert(contact.id, contact.clone());
    (StatusCode::CREATED, Json(contact))
}

async fn get_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Contact>, Rejection> {
    db.read().await.contacts.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<ContactInput>,
) -> Result<Json<Contact>, Rejection> {
    let mut store = db.write().await;
    let contact = store.contacts.get_mut(&id).ok_or_else(not_found)?;
    contact.first_name = input.first_name;
    contact.last_name = input.last_name;
    contact.email = input.email;
    contact.company = input.company;
    contact.position = input.position;
    Ok(Json(contact.clone()))
}

async fn delete_contact(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    store
        .contacts
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

async fn search_contacts(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Contact>> {
    let needle = params.q.to_lowercase();
    let store = db.read().await;
    Json(
        store
            .contacts
            .values()
            .filter(|c| {
                let full_name = format!("{} {}", c.first_name, c.last_name).to_lowercase();
                full_name.contains(&needle)
                    || c.email.to_lowercase().contains(&needle)
                    || c.company.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect(),
    )
}

async fn contact_emails(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<SentEmail>>, Rejection> {
    let store = db.read().await;
    if !store.contacts.contains_key(&id) {
        return Err(not_found());
    }
    Ok(Json(
        store.sent.iter().filter(|e| e.contact_id == id).cloned().collect(),
    ))
}

// --- templates ---

async fn list_templates(State(db): State<Db>) -> Json<Vec<EmailTemplate>> {
    Json(db.read().await.templates.values().cloned().collect())
}

async fn create_template(
    State(db): State<Db>,
    Json(input): Json<TemplateInput>,
) -> (StatusCode, Json<EmailTemplate>) {
    let mut store = db.write().await;
    let template = EmailTemplate {
        id: store.next_id(),
        name: input.name,
        subject: input.subject,
        body: input.body,
    };
    store.templates.insert(template.id, template.clone());
    (StatusCode::CREATED, Json(template))
}

async fn get_template(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<EmailTemplate>, Rejection> {
    db.read().await.templates.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_template(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<TemplateInput>,
) -> Result<Json<EmailTemplate>, Rejection> {
    let mut store = db.write().await;
    let template = store.templates.get_mut(&id).ok_or_else(not_found)?;
    template.name = input.name;
    template.subject = input.subject;
    template.body = input.body;
    Ok(Json(template.clone()))
}

async fn delete_template(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    store
        .templates
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

// --- sending & analytics ---

async fn send_email(
    State(db): State<Db>,
    Path(contact_id): Path<u64>,
    Json(input): Json<SendInput>,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    let mut store = db.write().await;
    if !store.contacts.contains_key(&contact_id) {
        return Err(reject(StatusCode::NOT_FOUND, "Contact not found."));
    }
    let subject = match (input.subject, input.template_id) {
        (Some(subject), _) => subject,
        (None, Some(template_id)) => store
            .templates
            .get(&template_id)
            .map(|t| t.subject.clone())
            .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Template not found."))?,
        (None, None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Either subject or template_id is required" })),
            ))
        }
    };
    let sent = store.record_send(contact_id, input.template_id, subject);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Email sent successfully", "sent_email": sent })),
    ))
}

async fn bulk_send(
    State(db): State<Db>,
    Json(input): Json<BulkSendInput>,
) -> Result<Json<Value>, Rejection> {
    let mut store = db.write().await;
    let subject = store
        .templates
        .get(&input.template_id)
        .map(|t| t.subject.clone())
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Template not found."))?;

    let (mut sent, mut failed) = (0u64, 0u64);
    for contact_id in input.contact_ids {
        if store.contacts.contains_key(&contact_id) {
            store.record_send(contact_id, Some(input.template_id), subject.clone());
            sent += 1;
        } else {
            failed += 1;
        }
    }
    Ok(Json(json!({ "sent": sent, "failed": failed })))
}

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = part as f64 / total as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

async fn analytics(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let total_sent = store.sent.len();
    let total_opened = store.sent.iter().filter(|e| e.opened).count();
    let total_clicked = store.sent.iter().filter(|e| e.clicked).count();

    let mut per_template: BTreeMap<u64, (usize, usize, usize)> = BTreeMap::new();
    for email in &store.sent {
        if let Some(template_id) = email.template_id {
            let entry = per_template.entry(template_id).or_default();
            entry.0 += 1;
            entry.1 += usize::from(email.opened);
            entry.2 += usize::from(email.clicked);
        }
    }
    let template_stats: Vec<Value> = per_template
        .into_iter()
        .map(|(id, (sent, opened, clicked))| {
            let name = store.templates.get(&id).map(|t| t.name.clone());
            json!({
                "template__name": name,
                "sent_count": sent,
                "opened_count": opened,
                "clicked_count": clicked,
            })
        })
        .collect();
    let recent_emails: Vec<&SentEmail> = store.sent.iter().rev().take(10).collect();

    Json(json!({
        "total_sent": total_sent,
        "total_opened": total_opened,
        "total_clicked": total_clicked,
        "open_rate": rate(total_opened, total_sent),
        "click_rate": rate(total_clicked, total_sent),
        "template_stats": template_stats,
        "recent_emails": recent_emails,
    }))
}

// --- dashboard ---

async fn dashboard_data(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    Json(json!({
        "contacts_count": store.contacts.len(),
        "templates_count": store.templates.len(),
        "campaigns_count": store.campaigns.len(),
        "emails_sent": store.sent.len(),
    }))
}

async fn dashboard_stats(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let opened = store.sent.iter().filter(|e| e.opened).count();
    Json(json!({
        "total_contacts": store.contacts.len(),
        "total_emails_sent": store.sent.len(),
        "open_rate": rate(opened, store.sent.len()),
    }))
}

async fn recent_activities(State(db): State<Db>) -> Json<Vec<Value>> {
    let store = db.read().await;
    Json(
        store
            .sent
            .iter()
            .rev()
            .take(10)
            .map(|e| {
                json!({
                    "type": "email_sent",
                    "contact_id": e.contact_id,
                    "description": e.subject,
                })
            })
            .collect(),
    )
}

// --- campaigns ---

async fn list_campaigns(State(db): State<Db>) -> Json<Vec<Campaign>> {
    Json(db.read().await.campaigns.values().cloned().collect())
}

async fn create_campaign(
    State(db): State<Db>,
    Json(input): Json<CampaignInput>,
) -> (StatusCode, Json<Campaign>) {
    let mut store = db.write().await;
    let campaign = Campaign {
        id: store.next_id(),
        name: input.name,
        email_template: input.email_template,
        contact_list: input.contact_list,
        is_sent: false,
    };
    store.campaigns.insert(campaign.id, campaign.clone());
    (StatusCode::CREATED, Json(campaign))
}

async fn get_campaign(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Campaign>, Rejection> {
    db.read().await.campaigns.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_campaign(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<CampaignInput>,
) -> Result<Json<Campaign>, Rejection> {
    let mut store = db.write().await;
    let campaign = store.campaigns.get_mut(&id).ok_or_else(not_found)?;
    campaign.name = input.name;
    campaign.email_template = input.email_template;
    campaign.contact_list = input.contact_list;
    Ok(Json(campaign.clone()))
}

async fn delete_campaign(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    store
        .campaigns
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

async fn recent_campaigns(State(db): State<Db>) -> Json<Vec<Value>> {
    let store = db.read().await;
    Json(
        store
            .campaigns
            .values()
            .rev()
            .take(5)
            .map(|c| {
                let template_name = c
                    .email_template
                    .and_then(|id| store.templates.get(&id))
                    .map(|t| t.name.clone());
                json!({
                    "id": c.id,
                    "name": c.name,
                    "template_name": template_name,
                    "is_sent": c.is_sent,
                })
            })
            .collect(),
    )
}

async fn list_contact_count(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, Rejection> {
    let Some(list_id) = params.list_id else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "List ID is required" })),
        ));
    };
    let store = db.read().await;
    let list = store.lists.get(&list_id).ok_or_else(|| {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "List not found" })))
    })?;
    Ok(Json(json!({
        "count": list.contacts.len(),
        "list_id": list_id,
        "list_name": list.name,
    })))
}

async fn filter_contact_count(
    State(db): State<Db>,
    Json(filters): Json<ContactFilters>,
) -> Json<Value> {
    let store = db.read().await;
    let count = store
        .contacts
        .values()
        .filter(|c| filters.companies.is_empty() || filters.companies.contains(&c.company))
        .filter(|c| filters.positions.is_empty() || filters.positions.contains(&c.position))
        .count();
    Json(json!({
        "count": count,
        "filters": { "companies": filters.companies, "positions": filters.positions },
    }))
}
