//! Registration finalization.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use circurent_storage::{Address, CreateUserParams, StoreError};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::registration::{
    normalize, AvailabilitySignal, IdentityInput, RegistrationFlow, ValidationError,
};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub address: AddressPayload,
    /// Set by the client after the verify-email step succeeded. The
    /// flow refuses to complete while it is false.
    pub email_verified: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl From<AddressPayload> for Address {
    fn from(p: AddressPayload) -> Self {
        Address {
            street: p.street,
            city: p.city,
            state: p.state,
            postal_code: p.postal_code,
            country: p.country,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub username: String,
}

/// POST /api/auth/register
///
/// Replays the whole flow over the submitted payload, then finalizes:
/// re-checks uniqueness against the store (the advisory checks the
/// client ran earlier are not trusted), hashes the password, creates
/// the account and sets the session cookie.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let mut flow = RegistrationFlow::new();

    // The advisory signal for the identity step comes from the store,
    // so a fresh submission never sees a stale "available".
    let email_availability = match state.users.get_user_by_email(&normalize(&req.email)).await {
        Ok(_) => AvailabilitySignal::Taken,
        Err(StoreError::NotFound) => AvailabilitySignal::Available,
        Err(other) => return Err(AppError::Internal(other.to_string())),
    };

    flow.submit_identity(
        IdentityInput {
            name: req.name,
            username: req.username,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        },
        email_availability,
    )
    .map_err(|e| match e {
        // A taken email is a uniqueness conflict, not bad input.
        ValidationError::EmailTaken => AppError::DuplicateEmail,
        other => AppError::Validation(other.to_string()),
    })?;

    flow.submit_address(req.address.into(), true)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    flow.record_verification(req.email_verified)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let draft = flow.draft();
    let email = normalize(&draft.email);

    // Authoritative uniqueness checks at creation time.
    match state.users.get_user_by_email(&email).await {
        Ok(_) => return Err(AppError::DuplicateEmail),
        Err(StoreError::NotFound) => {}
        Err(other) => return Err(AppError::Internal(other.to_string())),
    }
    match state.users.get_user_by_username(&draft.username).await {
        Ok(_) => return Err(AppError::DuplicateUsername),
        Err(StoreError::NotFound) => {}
        Err(other) => return Err(AppError::Internal(other.to_string())),
    }

    let password_hash =
        circurent_auth::hash_password(&draft.password).map_err(|e| AppError::Internal(e.to_string()))?;

    let params = CreateUserParams {
        username: draft.username.clone(),
        email: email.clone(),
        password_hash,
        name: Some(draft.name.clone()),
        address: draft.address.clone(),
    };

    // The store itself rejects duplicates, which closes the race two
    // concurrent registrations can open between the checks above and
    // this insert.
    let user_id = state.users.create_user(&params).await?;

    let token = state
        .sessions
        .issue(&user_id.0.to_string(), &email)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user_id.0, username = %params.username, "user registered");

    let body = RegisterResponse {
        message: "Registration successful".to_string(),
        user: RegisteredUser {
            id: user_id.0.to_string(),
            email,
            username: params.username,
        },
    };

    let max_age = state.sessions.ttl().num_seconds();
    let cookie = format!("token={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(body),
    )
        .into_response())
}
