//! Router assembly and shared application state.

use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use circurent_auth::SessionIssuer;
use circurent_storage::UserStore;
use circurent_verification::CodeStore;
use tower_http::trace::TraceLayer;

use crate::email::EmailProvider;
use crate::handlers;

/// Configured sender for verification emails.
#[derive(Clone)]
pub struct EmailSender {
    pub provider: Arc<dyn EmailProvider>,
    pub from_address: String,
    pub from_name: Option<String>,
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub codes: Arc<dyn CodeStore>,
    /// None when no email provider is configured. Sending then fails
    /// with a delivery error rather than silently succeeding.
    pub email: Option<EmailSender>,
    pub sessions: Arc<SessionIssuer>,
}

/// Build the API router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/auth/send-verification",
            post(handlers::send_verification),
        )
        .route("/api/auth/verify-email", post(handlers::verify_email))
        .route("/api/auth/check-username", post(handlers::check_username))
        .route("/api/auth/check-email", post(handlers::check_email))
        .route("/api/auth/register", post(handlers::register))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
