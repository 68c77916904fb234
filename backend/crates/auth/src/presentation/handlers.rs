//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::{AdminUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    CreateStaffRequest, LoginRequest, RegisterRequest, TokenResponse, UserShort, UsersPageQuery,
    UsersPageResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Register / Login
// ============================================================================

/// POST /auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<UserShort>)>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let input = RegisterInput {
        email: req.email,
        password: req.password,
        inn: req.inn,
        phone: req.phone,
        first_name: req.first_name,
        last_name: req.last_name,
        middle_name: req.middle_name,
        birth_date: req.birth_date,
    };

    let output = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

/// POST /auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /admin/staff
pub async fn list_staff<R>(State(state): State<AuthAppState<R>>) -> AuthResult<Json<Vec<UserShort>>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = AdminUseCase::new(state.repo.clone(), state.config.clone());
    let staff = use_case.list_staff().await?;

    Ok(Json(staff.iter().map(UserShort::from).collect()))
}

/// POST /admin/staff
pub async fn create_staff<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<CreateStaffRequest>,
) -> AuthResult<(StatusCode, Json<UserShort>)>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = AdminUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case.create_staff(req.email, req.password).await?;

    Ok((StatusCode::CREATED, Json(UserShort::from(&user))))
}

/// POST /admin/staff/{user_id}/promote
pub async fn promote_to_staff<R>(
    State(state): State<AuthAppState<R>>,
    Path(user_id): Path<String>,
) -> AuthResult<Json<UserShort>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    // A malformed id cannot name an account
    let user_id: UserId = user_id.parse().map_err(|_| AuthError::UserNotFound)?;

    let use_case = AdminUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case.promote_to_staff(&user_id).await?;

    Ok(Json(UserShort::from(&user)))
}

/// GET /admin/users?page=&size=
pub async fn list_users<R>(
    State(state): State<AuthAppState<R>>,
    Query(query): Query<UsersPageQuery>,
) -> AuthResult<Json<UsersPageResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = AdminUseCase::new(state.repo.clone(), state.config.clone());
    let page = use_case.list_users_paginated(query.page, query.size).await?;

    Ok(Json(page.into()))
}
