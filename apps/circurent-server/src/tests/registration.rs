//! Registration finalization tests.

use std::sync::Arc;

use axum::http::{header, StatusCode};
use chrono::Duration;
use circurent_auth::SessionIssuer;
use circurent_storage::{MockUserStore, StoreError, UserStore};
use circurent_verification::MemoryCodeStore;
use http_body_util::BodyExt;
use serde_json::json;

use super::common::{
    create_test_context, post_json, post_json_raw, valid_register_payload, TEST_SESSION_SECRET,
};
use crate::server::{app, AppState};

#[tokio::test]
async fn register_creates_user_and_sets_session_cookie() {
    let ctx = create_test_context();

    let response = post_json_raw(
        ctx.app(),
        "/api/auth/register",
        valid_register_payload("ada_l", "Ada@Example.com"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie must be set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=604800"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["user"]["username"], "ada_l");
    assert_eq!(body["user"]["email"], "ada@example.com");

    // The stored record is normalized and carries an Argon2 hash, not
    // the plaintext.
    let user = ctx.users.get_user_by_email("ada@example.com").await.unwrap();
    assert_eq!(user.username, "ada_l");
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert_ne!(user.password_hash, "hunter22");
    assert!(user.address.is_some());

    // The cookie token verifies against the issuing secret and is
    // bound to the new user.
    let token = cookie
        .split(';')
        .next()
        .unwrap()
        .trim_start_matches("token=")
        .to_string();
    let issuer = SessionIssuer::new(TEST_SESSION_SECRET.to_vec(), Duration::days(7));
    let claims = issuer.verify(&token).unwrap();
    assert_eq!(claims.sub, user.id.0.to_string());
    assert_eq!(claims.email, "ada@example.com");
}

#[tokio::test]
async fn register_rejects_unverified_email() {
    let ctx = create_test_context();

    let mut payload = valid_register_payload("ada_l", "ada@example.com");
    payload["emailVerified"] = json!(false);

    let (status, body) = post_json(ctx.app(), "/api/auth/register", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(body["error"]["message"], "Please verify your email first");

    // No account was created.
    assert!(matches!(
        ctx.users.get_user_by_email("ada@example.com").await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn register_rejects_invalid_username() {
    let ctx = create_test_context();

    let (status, body) = post_json(
        ctx.app(),
        "/api/auth/register",
        valid_register_payload("Bad Name!", "ada@example.com"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(
        body["error"]["message"],
        "Username must be 3-20 characters, only lowercase letters, numbers, and underscores allowed"
    );
}

#[tokio::test]
async fn register_rejects_password_mismatch() {
    let ctx = create_test_context();

    let mut payload = valid_register_payload("ada_l", "ada@example.com");
    payload["confirmPassword"] = json!("different1");

    let (status, body) = post_json(ctx.app(), "/api/auth/register", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Passwords do not match");
}

#[tokio::test]
async fn register_rejects_incomplete_address() {
    let ctx = create_test_context();

    let mut payload = valid_register_payload("ada_l", "ada@example.com");
    payload["address"]["city"] = json!("  ");

    let (status, body) = post_json(ctx.app(), "/api/auth/register", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Please fill in all address fields");
}

#[tokio::test]
async fn register_rejects_already_registered_email() {
    let ctx = create_test_context();

    let (status, _) = post_json(
        ctx.app(),
        "/api/auth/register",
        valid_register_payload("first_user", "ada@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // A taken email is a conflict, same category as the username path.
    let (status, body) = post_json(
        ctx.app(),
        "/api/auth/register",
        valid_register_payload("second_user", "ada@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_EMAIL");
    assert_eq!(body["error"]["message"], "Email already registered");
}

#[tokio::test]
async fn register_rejects_taken_username_at_finalize() {
    let ctx = create_test_context();

    let (status, _) = post_json(
        ctx.app(),
        "/api/auth/register",
        valid_register_payload("ada_l", "first@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(
        ctx.app(),
        "/api/auth/register",
        valid_register_payload("ada_l", "second@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_USERNAME");
}

fn state_with_users(users: Arc<dyn UserStore>) -> AppState {
    AppState {
        users,
        codes: Arc::new(MemoryCodeStore::new()),
        email: None,
        sessions: Arc::new(SessionIssuer::new(
            TEST_SESSION_SECRET.to_vec(),
            Duration::days(7),
        )),
    }
}

#[tokio::test]
async fn store_level_duplicate_wins_over_stale_prechecks() {
    // Both pre-checks report the email free, then the insert itself
    // collides. The store error must surface as a conflict, proving
    // the create call is the authoritative check.
    let mut mock = MockUserStore::new();
    mock.expect_get_user_by_email()
        .returning(|_| Err(StoreError::NotFound));
    mock.expect_get_user_by_username()
        .returning(|_| Err(StoreError::NotFound));
    mock.expect_create_user()
        .returning(|_| Err(StoreError::DuplicateEmail));

    let state = state_with_users(Arc::new(mock));
    let (status, body) = post_json(
        app(state),
        "/api/auth/register",
        valid_register_payload("ada_l", "ada@example.com"),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn backend_failure_is_an_internal_error() {
    let mut mock = MockUserStore::new();
    mock.expect_get_user_by_email()
        .returning(|_| Err(StoreError::Backend("connection reset".to_string())));

    let state = state_with_users(Arc::new(mock));
    let (status, body) = post_json(
        app(state),
        "/api/auth/register",
        valid_register_payload("ada_l", "ada@example.com"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"]["message"], "An internal error occurred");
}

#[tokio::test]
async fn concurrent_registrations_have_exactly_one_winner() {
    let ctx = create_test_context();

    let app_a = ctx.app();
    let app_b = ctx.app();
    let (a, b) = tokio::join!(
        tokio::spawn(async move {
            post_json(
                app_a,
                "/api/auth/register",
                valid_register_payload("racer_one", "race@example.com"),
            )
            .await
        }),
        tokio::spawn(async move {
            post_json(
                app_b,
                "/api/auth/register",
                valid_register_payload("racer_two", "race@example.com"),
            )
            .await
        }),
    );

    let (status_a, body_a) = a.unwrap();
    let (status_b, body_b) = b.unwrap();

    let created = [status_a, status_b]
        .iter()
        .filter(|s| **s == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1, "got {status_a} and {status_b}");

    // Whether the loser is turned away by the replayed pre-check or by
    // the store's unique constraint, the category is the same conflict.
    let (loser, loser_body) = if status_a == StatusCode::CREATED {
        (status_b, body_b)
    } else {
        (status_a, body_a)
    };
    assert_eq!(loser, StatusCode::CONFLICT);
    assert_eq!(loser_body["error"]["code"], "DUPLICATE_EMAIL");

    assert_eq!(ctx.users.len(), 1);
}
