//! Access Control
//!
//! Resolves a bearer token to a [`Principal`] and checks role membership.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Principal {
    /// `Forbidden` unless the role is one of `allowed`
    pub fn require_roles(&self, allowed: &[UserRole]) -> AuthResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.user_id, role = %self.role, "Role not allowed");
            Err(AuthError::Forbidden)
        }
    }
}

pub struct AccessControl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> AccessControl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Verify the token and confirm the subject still exists
    ///
    /// The role comes from the token's claim, so a promotion takes effect
    /// at the next login.
    pub async fn authenticate(&self, token: &str) -> AuthResult<Principal> {
        let claims = self
            .config
            .signer()
            .verify(token, Utc::now().timestamp())
            .map_err(|e| {
                tracing::debug!(reason = %e, "Token verification failed");
                AuthError::Unauthorized
            })?;

        let user_id: UserId = claims.sub.parse().map_err(|_| AuthError::Unauthorized)?;
        let role = UserRole::from_code(&claims.role).ok_or(AuthError::Unauthorized)?;

        if self.user_repo.get_by_id(&user_id).await?.is_none() {
            tracing::debug!(user_id = %user_id, "Token subject no longer exists");
            return Err(AuthError::Unauthorized);
        }

        Ok(Principal { user_id, role })
    }

    /// Authenticate, then require one of `allowed`
    pub async fn authorize(&self, token: &str, allowed: &[UserRole]) -> AuthResult<Principal> {
        let principal = self.authenticate(token).await?;
        principal.require_roles(allowed)?;
        Ok(principal)
    }
}
