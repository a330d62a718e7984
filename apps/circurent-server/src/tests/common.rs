//! Common test helpers and utilities for server tests.
//!
//! Provides a fully wired [`AppState`] backed by in-memory stores and a
//! capturing fake email provider, plus helpers for driving the router
//! with `tower::ServiceExt::oneshot`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use tower::ServiceExt;

use circurent_auth::SessionIssuer;
use circurent_store_memory::MemoryUserStore;
use circurent_verification::MemoryCodeStore;

use crate::email::{EmailError, EmailProvider};
use crate::server::{app, AppState, EmailSender};

/// Session secret shared by all test states.
pub const TEST_SESSION_SECRET: &[u8] = b"test-session-secret";

/// Email provider that records every send and can be told to fail.
pub struct FakeEmailProvider {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl FakeEmailProvider {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// All (recipient, code) pairs sent so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// The most recently sent code, if any.
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, code)| code.clone())
    }
}

#[async_trait::async_trait]
impl EmailProvider for FakeEmailProvider {
    async fn send_verification(
        &self,
        to: &str,
        code: &str,
        _from_address: &str,
        _from_name: Option<&str>,
    ) -> Result<(), EmailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::SendFailed("injected failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), code.to_string()));
        Ok(())
    }
}

/// Handles to the pieces behind a test [`AppState`].
pub struct TestContext {
    pub state: AppState,
    pub users: Arc<MemoryUserStore>,
    pub codes: Arc<MemoryCodeStore>,
    pub mailer: Arc<FakeEmailProvider>,
}

impl TestContext {
    pub fn app(&self) -> Router {
        app(self.state.clone())
    }
}

/// Build a test state with an in-memory user store, code store and the
/// capturing fake provider.
pub fn create_test_context() -> TestContext {
    let users = Arc::new(MemoryUserStore::new());
    let codes = Arc::new(MemoryCodeStore::new());
    let mailer = Arc::new(FakeEmailProvider::new());

    let state = AppState {
        users: users.clone(),
        codes: codes.clone(),
        email: Some(EmailSender {
            provider: mailer.clone(),
            from_address: "test@circurent.dev".to_string(),
            from_name: Some("CircuRent".to_string()),
        }),
        sessions: Arc::new(SessionIssuer::new(
            TEST_SESSION_SECRET.to_vec(),
            Duration::days(SessionIssuer::DEFAULT_TTL_DAYS),
        )),
    };

    TestContext {
        state,
        users,
        codes,
        mailer,
    }
}

/// Build a test state with no email provider configured.
pub fn create_test_context_without_email() -> TestContext {
    let mut ctx = create_test_context();
    ctx.state.email = None;
    ctx
}

/// POST a JSON body and return (status, parsed JSON body).
pub async fn post_json(
    app: Router,
    path: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// POST a JSON body and return the raw response for header assertions.
pub async fn post_json_raw(
    app: Router,
    path: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// A register payload that passes every validation step.
pub fn valid_register_payload(username: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "Test User",
        "username": username,
        "email": email,
        "password": "hunter22",
        "confirmPassword": "hunter22",
        "address": {
            "street": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "postalCode": "62701",
            "country": "US"
        },
        "emailVerified": true
    })
}
