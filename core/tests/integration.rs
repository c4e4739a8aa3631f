//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and drives `CrmClient` over real
//! HTTP with a ureq-backed `Transport`. The transport plays the browser: it
//! sends the cookie jar on every request and stores `Set-Cookie` answers, so
//! the session and CSRF handling run exactly as they would in a page.

use std::net::SocketAddr;
use std::sync::Arc;

use crm_core::{
    get_cookie, AnalyticsOutcome, ApiError, AuthStrategy, ClientConfig, CrmClient, Document,
    HttpMethod, HttpRequest, HttpResponse, LoginOutcome, MemoryDocument, MemoryStorage, Outcome,
    RequestOptions, Transport,
};
use serde_json::{json, Value};

struct UreqTransport {
    origin: String,
    agent: ureq::Agent,
    document: Arc<MemoryDocument>,
}

impl UreqTransport {
    fn new(addr: SocketAddr, document: Arc<MemoryDocument>) -> Self {
        // 4xx/5xx come back as data so the client can interpret them.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            origin: format!("http://{addr}"),
            agent,
            document,
        }
    }

    fn with_headers<B>(
        &self,
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let cookies = self.document.cookie();
        if !cookies.is_empty() {
            builder = builder.header("Cookie", cookies.as_str());
        }
        builder
    }
}

impl Transport for UreqTransport {
    fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = if req.url.starts_with('/') {
            format!("{}{}", self.origin, req.url)
        } else {
            req.url.clone()
        };
        let body = req.body.unwrap_or_default();

        let result = match req.method {
            HttpMethod::Get => self.with_headers(self.agent.get(&url), &req.headers).call(),
            HttpMethod::Delete => self.with_headers(self.agent.delete(&url), &req.headers).call(),
            HttpMethod::Post => self
                .with_headers(self.agent.post(&url), &req.headers)
                .send(body.as_bytes()),
            HttpMethod::Put => self
                .with_headers(self.agent.put(&url), &req.headers)
                .send(body.as_bytes()),
            HttpMethod::Patch => self
                .with_headers(self.agent.patch(&url), &req.headers)
                .send(body.as_bytes()),
        };
        let mut response = result.map_err(|e| ApiError::transport(e.to_string()))?;

        for value in response.headers().get_all("set-cookie") {
            if let Ok(cookie) = value.to_str() {
                self.document.set_cookie(cookie);
            }
        }
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn connect(
    addr: SocketAddr,
    strategy: AuthStrategy,
    document: Arc<MemoryDocument>,
) -> CrmClient<UreqTransport> {
    CrmClient::new(
        ClientConfig::default().with_auth_strategy(strategy),
        document.clone(),
        Arc::new(MemoryStorage::new()),
        UreqTransport::new(addr, document),
    )
    .unwrap()
}

fn completed(outcome: Outcome) -> (u16, Value) {
    match outcome {
        Outcome::Completed(envelope) => (envelope.response.status, envelope.data),
        Outcome::AuthRequired(nav) => panic!("unexpected auth redirect to {}", nav.url),
    }
}

fn credentials() -> Value {
    json!({ "username": mock_server::DEMO_USERNAME, "password": mock_server::DEMO_PASSWORD })
}

#[test]
fn session_flow() {
    let addr = start_server();
    let document = Arc::new(MemoryDocument::new());
    let client = connect(addr, AuthStrategy::Session, document.clone());

    // Step 1: nothing works before logging in.
    let outcome = client.contacts().get_all().unwrap();
    match outcome {
        Outcome::AuthRequired(nav) => assert_eq!(nav.url, "/accounts/login/"),
        other => panic!("expected AuthRequired, got {other:?}"),
    }
    match client.auth().login("demo", "x", None).unwrap() {
        LoginOutcome::Redirect(nav) => assert_eq!(nav.url, "/accounts/login/"),
        other => panic!("expected redirect, got {other:?}"),
    }

    // Step 2: submit the login form; the cookies land in the jar.
    let options = RequestOptions::json(HttpMethod::Post, &credentials()).unwrap();
    let (status, _) = completed(client.request("/accounts/login/", options).unwrap());
    assert_eq!(status, 200);
    assert!(client.context().cookie("csrftoken").is_some());
    let session = client.context().cookie("sessionid").expect("sessionid cookie");

    // Step 3: contact lifecycle.
    let (status, contacts) = completed(client.contacts().get_all().unwrap());
    assert_eq!(status, 200);
    assert_eq!(contacts, json!([]));

    let (status, created) = completed(
        client
            .contacts()
            .create(&json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "company": "Analytical Engines",
            }))
            .unwrap(),
    );
    assert_eq!(status, 201);
    let contact_id = created["id"].as_u64().unwrap();

    let (_, found) = completed(client.contacts().search("ada love").unwrap());
    assert_eq!(found.as_array().unwrap().len(), 1);
    let (_, found) = completed(client.contacts().search("nobody").unwrap());
    assert_eq!(found, json!([]));

    let (status, updated) = completed(
        client
            .contacts()
            .update(
                contact_id,
                &json!({
                    "first_name": "Ada",
                    "last_name": "King",
                    "email": "ada@example.com",
                    "company": "Analytical Engines",
                }),
            )
            .unwrap(),
    );
    assert_eq!(status, 200);
    assert_eq!(updated["last_name"], "King");

    // Step 4: templates, sending and analytics.
    let (status, template) = completed(
        client
            .email_templates()
            .create(&json!({ "name": "Welcome", "subject": "Hello", "body": "Hi {{first_name}}" }))
            .unwrap(),
    );
    assert_eq!(status, 201);
    let template_id = template["id"].as_u64().unwrap();

    let (status, sent) = completed(
        client
            .emails()
            .send(contact_id, &json!({ "template_id": template_id }))
            .unwrap(),
    );
    assert_eq!(status, 201);
    assert_eq!(sent["message"], "Email sent successfully");

    let (_, result) = completed(
        client
            .emails()
            .bulk_send(&[contact_id, 9999], template_id)
            .unwrap(),
    );
    assert_eq!(result, json!({ "sent": 1, "failed": 1 }));

    match client.emails().get_analytics() {
        AnalyticsOutcome::Ready(analytics) => {
            assert_eq!(analytics.total_sent, 2);
            assert_eq!(analytics.open_rate, 0.0);
            assert_eq!(analytics.template_stats.len(), 1);
            assert_eq!(analytics.recent_emails.len(), 2);
        }
        other => panic!("expected analytics, got {other:?}"),
    }

    let (_, history) = completed(client.contacts().emails(contact_id).unwrap());
    assert_eq!(history.as_array().unwrap().len(), 2);

    // Step 5: dashboard and campaigns.
    let (_, summary) = completed(client.dashboard().summary().unwrap());
    assert_eq!(summary["contacts_count"], 1);
    assert_eq!(summary["emails_sent"], 2);
    let (_, activities) = completed(client.dashboard().recent_activities().unwrap());
    assert_eq!(activities.as_array().unwrap().len(), 2);

    let (status, campaign) = completed(
        client
            .campaigns()
            .create(&json!({ "name": "Launch", "email_template": template_id }))
            .unwrap(),
    );
    assert_eq!(status, 201);
    let (_, recent) = completed(client.campaigns().recent().unwrap());
    assert_eq!(recent[0]["id"], campaign["id"]);
    assert_eq!(recent[0]["template_name"], "Welcome");

    let (_, count) = completed(
        client
            .campaigns()
            .list_contacts(mock_server::SEED_LIST_ID)
            .unwrap(),
    );
    assert_eq!(count["list_name"], "Newsletter");
    let (_, count) = completed(
        client
            .campaigns()
            .filter_contacts(&json!({ "companies": ["Analytical Engines"] }))
            .unwrap(),
    );
    assert_eq!(count["count"], 1);

    // Step 6: a missing resource is an error envelope, not a redirect.
    let outcome = client.contacts().get(9999).unwrap();
    let envelope = outcome.envelope().unwrap();
    assert!(envelope.error);
    assert_eq!(envelope.response.status, 404);

    // Step 7: a page that lost its csrftoken cookie is bounced to login.
    let stale = Arc::new(MemoryDocument::with_cookies(&format!("sessionid={session}")));
    let stale_client = connect(addr, AuthStrategy::Session, stale);
    assert!(stale_client.contacts().get_all().unwrap().envelope().is_some());
    assert!(stale_client
        .contacts()
        .delete(contact_id)
        .unwrap()
        .is_auth_required());

    // Step 8: delete, then log out.
    let (status, _) = completed(client.contacts().delete(contact_id).unwrap());
    assert_eq!(status, 204);

    let nav = client.auth().logout();
    assert_eq!(nav.url, "/accounts/logout/");
    completed(client.request(&nav.url, RequestOptions::new(HttpMethod::Get)).unwrap());
    assert_eq!(get_cookie(&document.cookie(), "sessionid"), None);
    assert!(client.contacts().get_all().unwrap().is_auth_required());
}

#[test]
fn bearer_flow() {
    let addr = start_server();
    let client = connect(addr, AuthStrategy::Bearer, Arc::new(MemoryDocument::new()));

    // Wrong password: the token endpoint's 401 never escapes as an error.
    match client.auth().login("demo", "wrong", None).unwrap() {
        LoginOutcome::Completed { success, .. } => assert!(!success),
        other => panic!("expected completed login, got {other:?}"),
    }
    assert_eq!(client.tokens().get_token(), None);

    match client
        .auth()
        .login(mock_server::DEMO_USERNAME, mock_server::DEMO_PASSWORD, None)
        .unwrap()
    {
        LoginOutcome::Completed { success, data } => {
            assert!(success);
            assert!(data["access"].is_string());
        }
        other => panic!("expected completed login, got {other:?}"),
    }
    assert!(client.tokens().get_token().is_some());
    assert!(client.tokens().refresh_token().is_some());

    let (status, profile) = completed(client.auth().profile().unwrap());
    assert_eq!(status, 200);
    assert_eq!(profile["username"], mock_server::DEMO_USERNAME);

    let (_, profile) = completed(
        client
            .auth()
            .update_profile(&json!({ "first_name": "Demo" }))
            .unwrap(),
    );
    assert_eq!(profile["first_name"], "Demo");

    let (status, _) = completed(
        client
            .contacts()
            .create(&json!({ "first_name": "Grace", "email": "grace@example.com" }))
            .unwrap(),
    );
    assert_eq!(status, 201);
    let (_, stats) = completed(client.dashboard().stats().unwrap());
    assert_eq!(stats["total_contacts"], 1);

    let nav = client.auth().logout();
    assert_eq!(nav.url, "/");
    assert_eq!(client.tokens().get_token(), None);
    assert_eq!(client.tokens().refresh_token(), None);

    match client.contacts().get_all().unwrap() {
        Outcome::AuthRequired(nav) => assert_eq!(nav.url, "/accounts/login/"),
        other => panic!("expected AuthRequired, got {other:?}"),
    }
}

#[test]
fn register_reports_field_errors() {
    let addr = start_server();
    let client = connect(addr, AuthStrategy::Session, Arc::new(MemoryDocument::new()));

    let (status, errors) = completed(
        client
            .auth()
            .register(&json!({ "username": "newbie", "csrfmiddlewaretoken": "" }))
            .unwrap(),
    );
    assert_eq!(status, 400);
    assert!(errors.get("email").is_some());

    let (status, profile) = completed(
        client
            .auth()
            .register(&json!({
                "username": "newbie",
                "email": "newbie@example.com",
                "password": "secret",
            }))
            .unwrap(),
    );
    assert_eq!(status, 201);
    assert_eq!(profile["username"], "newbie");
}

#[test]
fn connection_refused_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = connect(addr, AuthStrategy::Session, Arc::new(MemoryDocument::new()));

    let err = client.contacts().get_all().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");

    match client.emails().get_analytics() {
        AnalyticsOutcome::Failed { details, .. } => assert_eq!(details, None),
        other => panic!("expected failure, got {other:?}"),
    }
}
