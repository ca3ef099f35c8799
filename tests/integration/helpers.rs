//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use helpdesk_auth::{JwtEncoder, PasswordHasher};
use helpdesk_core::config::AppConfig;
use helpdesk_database::{MemoryStore, Stores};
use helpdesk_entity::company::Company;
use helpdesk_entity::user::User;
use helpdesk_storage::providers::local::LocalStorageProvider;

/// Password shared by every seeded user.
pub const PASSWORD: &str = "password123";

const BOUNDARY: &str = "helpdesk-test-boundary";

/// Test application over the in-memory store and a temporary attachment
/// directory.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
    _dir: tempfile::TempDir,
    pub acme: Company,
    pub globex: Company,
    pub admin: User,
    pub support: User,
    pub other_support: User,
    pub customer: User,
    pub outsider: User,
}

impl TestApp {
    /// Create a new test application with rate limiting disabled.
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.rate_limit.enabled = false;
        Self::with_config(config).await
    }

    pub async fn with_config(mut config: AppConfig) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        config.attachments.root_path = dir.path().to_string_lossy().into_owned();

        let store = Arc::new(MemoryStore::new());
        let hash = PasswordHasher::new()
            .hash_password(PASSWORD)
            .expect("Failed to hash password");

        let acme = store.seed_company("Acme").await;
        let globex = store.seed_company("Globex").await;
        let admin = store.seed_user("Ada Admin", "ada", &hash, "Admin", None).await;
        let support = store.seed_user("Sam Support", "sam", &hash, "Destek", None).await;
        let other_support = store.seed_user("Sue Support", "sue", &hash, "Destek", None).await;
        let customer = store
            .seed_user("Can Customer", "can", &hash, "Müşteri", Some(acme.id))
            .await;
        let outsider = store
            .seed_user("Oz Outsider", "oz", &hash, "Müşteri", Some(globex.id))
            .await;

        let storage = LocalStorageProvider::new(dir.path())
            .await
            .expect("Failed to init storage");
        let state = helpdesk_api::build_state(
            config.clone(),
            Stores::memory(store.clone()),
            Arc::new(storage),
        );
        let router = helpdesk_api::build_app(state);

        Self {
            router,
            store,
            config,
            _dir: dir,
            acme,
            globex,
            admin,
            support,
            other_support,
            customer,
            outsider,
        }
    }

    /// Mint a bearer token for a seeded user without going through login.
    pub fn token(&self, user: &User) -> String {
        JwtEncoder::new(&self.config.auth)
            .issue(user)
            .expect("Failed to issue token")
            .token
    }

    /// Make a JSON request to the test app.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Upload `(file name, content type, content)` triples as the `files`
    /// multipart field.
    pub async fn upload(
        &self,
        ticket_id: i64,
        files: &[(&str, &str, &[u8])],
        token: &str,
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, content_type, content) in files {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri(format!("/api/tickets/{ticket_id}/files"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Create a ticket as `token` and return its id.
    pub async fn create_ticket(&self, token: &str, body: Value) -> i64 {
        let response = self.request("POST", "/api/tickets", Some(body), Some(token)).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Ticket create failed: {:?}",
            response.body
        );
        response.data()["id"].as_i64().expect("No ticket id")
    }

    /// A minimal valid create body for the given company.
    pub fn ticket_body(&self, company_id: i64, subject: &str) -> Value {
        serde_json::json!({
            "companyId": company_id,
            "moduleId": 1,
            "subject": subject,
            "description": "Something is broken",
        })
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub raw: Bytes,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// Field names listed under `details` of a validation error.
    pub fn violation_fields(&self) -> Vec<String> {
        self.body["details"]
            .as_array()
            .map(|details| {
                details
                    .iter()
                    .filter_map(|d| d["field"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}
