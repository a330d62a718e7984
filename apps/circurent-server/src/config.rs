//! Server configuration module.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! # Provider: Resend
//! CIRCURENT_EMAIL_PROVIDER=resend
//! RESEND_API_KEY=re_...
//!
//! # Provider: SMTP
//! CIRCURENT_EMAIL_PROVIDER=smtp
//! SMTP_HOST=smtp.gmail.com
//! SMTP_PORT=587
//! SMTP_USERNAME=user@example.com
//! SMTP_PASSWORD=app_password
//! SMTP_USE_TLS=true
//!
//! # Provider: Console (logs codes, for local development)
//! CIRCURENT_EMAIL_PROVIDER=console
//!
//! # Sender config
//! CIRCURENT_EMAIL_FROM=noreply@circurent.dev
//! CIRCURENT_EMAIL_FROM_NAME="CircuRent"
//!
//! # Session config
//! CIRCURENT_SESSION_SECRET=...      # required
//! CIRCURENT_SESSION_TTL_DAYS=7
//! ```

use std::env;
use thiserror::Error;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub email: Option<EmailConfig>,
    pub session: SessionConfig,
}

/// Email configuration for verification
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email provider configuration
    pub provider: EmailProviderConfig,
    /// From email address
    pub from_address: String,
    /// Optional from name
    pub from_name: Option<String>,
}

/// Email provider configuration
#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    /// Resend email provider
    Resend {
        /// Resend API key
        #[allow(dead_code)] // Used when email-resend feature is enabled
        api_key: String,
    },
    /// SMTP email provider
    Smtp {
        /// SMTP host
        host: String,
        /// SMTP port
        port: u16,
        /// Optional username
        username: Option<String>,
        /// Optional password
        password: Option<String>,
        /// Whether to use TLS
        use_tls: bool,
    },
    /// Console provider, logs codes instead of sending
    Console,
}

/// Session token configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC signing secret for session tokens
    pub secret: String,
    /// Session lifetime in days
    pub ttl_days: i64,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid email provider: {0}. Expected 'resend', 'smtp' or 'console'")]
    InvalidProvider(String),

    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("Missing from address: CIRCURENT_EMAIL_FROM is required when email is configured")]
    MissingFromAddress,

    #[error("SMTP provider requires SMTP_HOST")]
    SmtpMissingHost,

    #[error("Invalid session TTL: {0}")]
    InvalidSessionTtl(String),
}

const DEFAULT_FROM_ADDRESS: &str = "noreply@circurent.dev";

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let session = SessionConfig::from_env()?;

        let provider_type = match env::var("CIRCURENT_EMAIL_PROVIDER") {
            Ok(v) => v,
            Err(_) => return Ok(Self { email: None, session }),
        };

        let provider = match provider_type.to_lowercase().as_str() {
            "resend" => {
                let api_key = env::var("RESEND_API_KEY")
                    .map_err(|_| ConfigError::MissingEnvVar("RESEND_API_KEY".to_string()))?;
                EmailProviderConfig::Resend { api_key }
            }
            "smtp" => {
                let host = env::var("SMTP_HOST").map_err(|_| ConfigError::SmtpMissingHost)?;
                let port = env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse::<u16>()
                    .map_err(|_| {
                        ConfigError::InvalidPort(
                            env::var("SMTP_PORT").unwrap_or_else(|_| "invalid".to_string()),
                        )
                    })?;
                let username = env::var("SMTP_USERNAME").ok();
                let password = env::var("SMTP_PASSWORD").ok();
                let use_tls = env::var("SMTP_USE_TLS")
                    .map(|v| v.to_lowercase() == "true" || v == "1")
                    .unwrap_or(true); // TLS by default

                EmailProviderConfig::Smtp {
                    host,
                    port,
                    username,
                    password,
                    use_tls,
                }
            }
            "console" => EmailProviderConfig::Console,
            other => return Err(ConfigError::InvalidProvider(other.to_string())),
        };

        // The console provider never delivers mail, so the from address
        // may be left unset for it.
        let from_address = match env::var("CIRCURENT_EMAIL_FROM") {
            Ok(addr) => addr,
            Err(_) if matches!(provider, EmailProviderConfig::Console) => {
                DEFAULT_FROM_ADDRESS.to_string()
            }
            Err(_) => return Err(ConfigError::MissingFromAddress),
        };
        let from_name = env::var("CIRCURENT_EMAIL_FROM_NAME").ok();

        Ok(Self {
            email: Some(EmailConfig {
                provider,
                from_address,
                from_name,
            }),
            session,
        })
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("CIRCURENT_SESSION_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("CIRCURENT_SESSION_SECRET".to_string()))?;
        let ttl_days = match env::var("CIRCURENT_SESSION_TTL_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or(ConfigError::InvalidSessionTtl(raw))?,
            Err(_) => circurent_auth::SessionIssuer::DEFAULT_TTL_DAYS,
        };
        Ok(Self { secret, ttl_days })
    }
}
