//! Verification email delivery through the Resend API.
//!
//! The production delivery path: CircuRent sends from a verified domain
//! via Resend's HTTP API, so no SMTP relay needs to be reachable from
//! the server.

use super::{EmailError, EmailProvider, VerificationEmailContent};
use async_trait::async_trait;
use resend_rs::{types::CreateEmailBaseOptions, Resend};

/// [`EmailProvider`] backed by a Resend API client.
pub struct ResendProvider {
    client: Resend,
}

impl ResendProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Resend::new(&api_key),
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn send_verification(
        &self,
        to: &str,
        code: &str,
        from_address: &str,
        from_name: Option<&str>,
    ) -> Result<(), EmailError> {
        let content = VerificationEmailContent::new(code);

        // "CircuRent <noreply@...>" when a display name is configured.
        let from = match from_name {
            Some(name) => format!("{} <{}>", name, from_address),
            None => from_address.to_string(),
        };

        let email = CreateEmailBaseOptions::new(from, vec![to.to_string()], content.subject)
            .with_text(&content.text)
            .with_html(&content.html);

        self.client
            .emails
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }
}
