//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AccessState, require_roles};

const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Public routes: registration and login
pub fn auth_router<R>(repo: Arc<R>, config: Arc<AuthConfig>) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState { repo, config };

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .with_state(state)
}

/// Account management, ADMIN only
pub fn admin_router<R>(repo: Arc<R>, config: Arc<AuthConfig>) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let access = AccessState::new(repo.clone(), config.clone(), ADMIN_ONLY);
    let state = AuthAppState { repo, config };

    Router::new()
        .route(
            "/staff",
            get(handlers::list_staff::<R>).post(handlers::create_staff::<R>),
        )
        .route("/staff/{user_id}/promote", post(handlers::promote_to_staff::<R>))
        .route("/users", get(handlers::list_users::<R>))
        .route_layer(middleware::from_fn_with_state(access, require_roles::<R>))
        .with_state(state)
}
