//! Auth Middleware
//!
//! Bearer-token role guard for protected routers.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use platform::bearer::extract_bearer;

use crate::application::access::{AccessControl, Principal};
use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AccessState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub allowed: &'static [UserRole],
}

impl<R> AccessState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, allowed: &'static [UserRole]) -> Self {
        Self {
            repo,
            config,
            allowed,
        }
    }
}

/// Middleware that requires a valid bearer token whose account holds one
/// of `state.allowed`
///
/// On success the [`Principal`] is available to handlers as an extractor.
pub async fn require_roles<R>(
    State(state): State<AccessState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    // Owned so no borrow of the request is held across the await
    let token = extract_bearer(req.headers())
        .ok_or(AuthError::Unauthorized)?
        .to_owned();

    let access = AccessControl::new(state.repo.clone(), state.config.clone());
    let principal = access.authorize(&token, state.allowed).await?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .ok_or(AuthError::Unauthorized)
    }
}
