//! Console email provider for local development.
//!
//! Logs the verification code instead of delivering mail, so the flow
//! can be exercised without any provider credentials.

use super::{EmailError, EmailProvider};
use async_trait::async_trait;

pub struct ConsoleProvider;

#[async_trait]
impl EmailProvider for ConsoleProvider {
    async fn send_verification(
        &self,
        to: &str,
        code: &str,
        _from_address: &str,
        _from_name: Option<&str>,
    ) -> Result<(), EmailError> {
        tracing::info!(recipient = %to, code = %code, "verification code (console provider)");
        Ok(())
    }
}
