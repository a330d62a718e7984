//! Verification code issuance and consumption, plus advisory
//! availability checks.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use circurent_storage::StoreError;
use circurent_verification::{verify_code, VerifyOutcome};
use serde::{Deserialize, Serialize};

use crate::email::generate_verification_code;
use crate::error::AppError;
use crate::registration::{is_plausible_email, is_valid_username, normalize};
use crate::server::AppState;

/// Lifetime of an issued verification code.
pub const CODE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/auth/send-verification
///
/// Issues a fresh code for the submitted email, overwriting any code
/// issued earlier for the same address. The code is stored before the
/// dispatch attempt so a slow provider cannot leave a delivered code
/// unverifiable.
pub async fn send_verification(
    State(state): State<AppState>,
    Json(req): Json<SendVerificationRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim().to_string();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    let code = generate_verification_code();
    let expires_at = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);
    state.codes.put(&email, &code, expires_at).await;

    let Some(sender) = &state.email else {
        return Err(AppError::Delivery("no email provider configured".to_string()));
    };

    sender
        .provider
        .send_verification(
            &email,
            &code,
            &sender.from_address,
            sender.from_name.as_deref(),
        )
        .await
        .map_err(|e| AppError::Delivery(e.to_string()))?;

    tracing::info!(recipient = %email, "verification code issued");

    Ok(Json(MessageResponse {
        message: "Verification code sent successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

/// POST /api/auth/verify-email
///
/// Consumes the pending code on a match. A wrong code leaves the entry
/// in place so the user may retry within the issuance window.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim().to_string();
    if email.is_empty() || req.code.is_empty() {
        return Err(AppError::Validation("Email and code are required".to_string()));
    }

    match verify_code(state.codes.as_ref(), Utc::now(), &email, &req.code).await {
        VerifyOutcome::Valid => Ok(Json(MessageResponse {
            message: "Email verified successfully".to_string(),
        })),
        VerifyOutcome::Invalid => Err(AppError::InvalidOrExpiredCode),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckUsernameRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub available: bool,
    pub message: String,
}

impl AvailabilityResponse {
    fn unavailable(message: &str) -> Json<Self> {
        Json(Self {
            available: false,
            message: message.to_string(),
        })
    }

    fn available(message: &str) -> Json<Self> {
        Json(Self {
            available: true,
            message: message.to_string(),
        })
    }
}

/// POST /api/auth/check-username
///
/// Advisory only. A username reported available here may still be taken
/// by the time registration finalizes.
pub async fn check_username(
    State(state): State<AppState>,
    Json(req): Json<CheckUsernameRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    if req.username.trim().is_empty() {
        return Ok(AvailabilityResponse::unavailable("Username is required"));
    }

    let username = normalize(&req.username);
    if !is_valid_username(&username) {
        return Ok(AvailabilityResponse::unavailable(
            "Username must be 3-20 characters, only lowercase letters, numbers, and underscores allowed",
        ));
    }

    match state.users.get_user_by_username(&username).await {
        Ok(_) => Ok(AvailabilityResponse::unavailable("Username already taken")),
        Err(StoreError::NotFound) => Ok(AvailabilityResponse::available("Username is available")),
        Err(other) => Err(AppError::Internal(other.to_string())),
    }
}

/// POST /api/auth/check-email
///
/// Advisory only, like the username check.
pub async fn check_email(
    State(state): State<AppState>,
    Json(req): Json<CheckEmailRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    if req.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    let email = normalize(&req.email);
    if !is_plausible_email(&email) {
        return Ok(AvailabilityResponse::unavailable("Invalid email format"));
    }

    match state.users.get_user_by_email(&email).await {
        Ok(_) => Ok(AvailabilityResponse::unavailable("Email already registered")),
        Err(StoreError::NotFound) => Ok(AvailabilityResponse::available("Email is available")),
        Err(other) => Err(AppError::Internal(other.to_string())),
    }
}
