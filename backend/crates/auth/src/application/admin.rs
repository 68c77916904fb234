//! Admin Account Management Use Case
//!
//! Staff listing and creation, USER pagination and promotion.

use std::sync::Arc;

use kernel::id::UserId;
use kernel::query::{Filter, Order, Query};
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::{UserField, UserRepository};
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

pub const MAX_PAGE_SIZE: i64 = 100;

/// One page of USER accounts
#[derive(Debug)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

pub struct AdminUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> AdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// STAFF accounts, oldest first
    pub async fn list_staff(&self) -> AuthResult<Vec<User>> {
        self.user_repo
            .list(
                Query::new()
                    .filter(Filter::new().eq(UserField::Role, UserRole::Staff.code()))
                    .order_by(Order::asc(UserField::CreatedAt)),
            )
            .await
    }

    pub async fn create_staff(&self, email: String, password: String) -> AuthResult<User> {
        self.create_account(email, password, UserRole::Staff).await
    }

    /// ADMIN accounts are only created by operators
    pub async fn create_admin(&self, email: String, password: String) -> AuthResult<User> {
        self.create_account(email, password, UserRole::Admin).await
    }

    async fn create_account(
        &self,
        email: String,
        password: String,
        role: UserRole,
    ) -> AuthResult<User> {
        let email = Email::new(email)?;
        let password = ClearTextPassword::new(password)?;

        if self
            .user_repo
            .exists(Filter::new().eq(UserField::Email, email.as_str()))
            .await?
        {
            return Err(AuthError::DuplicateEmail);
        }

        let user = User::new(email, password.hash(self.config.pepper())?, role);
        self.user_repo.create(&user).await?;

        tracing::info!(user_id = %user.id, role = %role, "Account created");

        Ok(user)
    }

    /// USER accounts, oldest first; `page` is 1-based
    pub async fn list_users_paginated(&self, page: i64, size: i64) -> AuthResult<UserPage> {
        if page < 1 {
            return Err(AuthError::Validation("page must be at least 1".into()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(AuthError::Validation(format!(
                "size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let filter = Filter::new().eq(UserField::Role, UserRole::User.code());
        let total = self.user_repo.count(filter.clone()).await?;
        let items = self
            .user_repo
            .list(
                Query::new()
                    .filter(filter)
                    .order_by(Order::asc(UserField::CreatedAt))
                    .offset((page - 1).saturating_mul(size))
                    .limit(size),
            )
            .await?;

        Ok(UserPage {
            items,
            total,
            page,
            size,
        })
    }

    /// Roles only move USER -> STAFF
    pub async fn promote_to_staff(&self, user_id: &UserId) -> AuthResult<User> {
        let user = self
            .user_repo
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.role != UserRole::User {
            return Err(AuthError::Validation(format!(
                "Only USER accounts can be promoted (account is {})",
                user.role
            )));
        }

        let promoted = self
            .user_repo
            .update_role(user_id, UserRole::Staff)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(user_id = %promoted.id, "User promoted to staff");

        Ok(promoted)
    }
}
