//! Credential primitives: password hashing and session tokens.
//!
//! Passwords are hashed with Argon2id into PHC strings; the plaintext is
//! consumed at registration time and never stored. Session tokens are
//! minimal HS256 JWTs (base64url without padding) carrying the user id and
//! email, signed with a server-held secret.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("invalid signing key")]
    InvalidKey,

    #[error("failed to encode token: {0}")]
    Encode(String),

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,
}

/// Hash a plaintext password into an Argon2id PHC string with a fresh
/// random salt. One-way; registration never needs to compare plaintexts.
pub fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id the session is bound to.
    pub sub: String,
    pub email: String,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Issues and verifies HS256 session tokens with a fixed lifetime.
pub struct SessionIssuer {
    secret: Vec<u8>,
    ttl: Duration,
}

impl SessionIssuer {
    /// Recommended session lifetime: 7 days.
    pub const DEFAULT_TTL_DAYS: i64 = 7;

    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token bound to `user_id`/`email`, expiring after the
    /// configured lifetime. The caller treats the result as opaque.
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.encode(&claims)
    }

    /// Decode a token, verifying the signature and expiry.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = self.decode(token)?;
        if claims.exp < Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    fn encode(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        let header = TokenHeader {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let header_json =
            serde_json::to_vec(&header).map_err(|e| AuthError::Encode(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(claims).map_err(|e| AuthError::Encode(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );

        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.secret).map_err(|_| AuthError::InvalidKey)?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        let signing_input = format!("{header_b64}.{claims_b64}");
        let signature = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| AuthError::InvalidToken)?;

        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.secret).map_err(|_| AuthError::InvalidKey)?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let claims_json = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        serde_json::from_slice(&claims_json).map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(
            b"test-secret-key".to_vec(),
            Duration::days(SessionIssuer::DEFAULT_TTL_DAYS),
        )
    }

    #[test]
    fn password_hash_is_phc_and_salted() {
        let a = hash_password("hunter22").unwrap();
        let b = hash_password("hunter22").unwrap();
        assert!(a.starts_with("$argon2id$"));
        // Fresh salts make identical passwords hash differently.
        assert_ne!(a, b);
    }

    #[test]
    fn issued_token_round_trips() {
        let issuer = issuer();
        let token = issuer.issue("user-1", "a@b.com").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@b.com");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = issuer();
        let token = issuer.issue("user-1", "a@b.com").unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(matches!(issuer.verify(&tampered), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issuer().issue("user-1", "a@b.com").unwrap();
        let other = SessionIssuer::new(b"different-secret".to_vec(), Duration::days(7));
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = SessionIssuer::new(b"test-secret-key".to_vec(), Duration::seconds(-1));
        let token = issuer.issue("user-1", "a@b.com").unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            issuer().verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
