//! Login Use Case
//!
//! Authenticates by email and password and mints an access token.

use std::sync::Arc;

use chrono::Utc;
use kernel::query::{Filter, Query};
use platform::password::ClearTextPassword;
use platform::token::TokenClaims;

use crate::application::config::AuthConfig;
use crate::domain::repository::{UserField, UserRepository};
use crate::error::{AuthError, AuthResult};

pub const TOKEN_TYPE: &str = "bearer";

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Token bundle returned on success
#[derive(Debug)]
pub struct LoginOutput {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Login use case
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Unknown email, wrong password and policy-violating input all
    /// fail with the same `InvalidCredentials`.
    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let email = input.email.trim();

        let user = self
            .user_repo
            .get_one(Query::new().filter(Filter::new().eq(UserField::Email, email)))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        if !user.password_hash.verify(&password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        let ttl = self.config.token_ttl_secs();
        let claims = TokenClaims::new(
            user.id.to_string(),
            user.role.code(),
            Utc::now().timestamp(),
            ttl,
        );
        let access_token = self
            .config
            .signer()
            .sign(&claims)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginOutput {
            access_token,
            token_type: TOKEN_TYPE,
            expires_in: ttl,
        })
    }
}
