//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::crypto::random_bytes;
use platform::token::TokenSigner;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing key for access tokens
    pub token_secret: Vec<u8>,
    /// Access token lifetime
    pub token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: vec![0u8; 32],
            token_ttl: Duration::from_secs(60 * 60), // 1 hour
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: random_bytes(32),
            ..Default::default()
        }
    }

    /// Create config for development (random secret, day-long tokens)
    pub fn development() -> Self {
        Self {
            token_ttl: Duration::from_secs(24 * 3600),
            ..Self::with_random_secret()
        }
    }

    pub fn signer(&self) -> TokenSigner {
        TokenSigner::new(self.token_secret.clone())
    }

    /// Get token TTL in seconds
    pub fn token_ttl_secs(&self) -> i64 {
        i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
