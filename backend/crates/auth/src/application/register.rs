//! Register Use Case
//!
//! Creates a USER account together with its citizen profile.

use std::sync::Arc;

use chrono::NaiveDate;
use kernel::id::UserId;
use kernel::query::Filter;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::{
    citizen_profile::{CitizenProfile, ProfileDetails},
    user::User,
};
use crate::domain::repository::{UserField, UserRepository};
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub inn: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub birth_date: NaiveDate,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub user_id: UserId,
    pub email: Email,
    pub role: UserRole,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let email = Email::new(input.email)?;
        let details = ProfileDetails::new(
            input.inn,
            input.phone,
            input.first_name,
            input.last_name,
            input.middle_name,
            input.birth_date,
        )?;
        let password = ClearTextPassword::new(input.password)?;

        // Friendly error for the common case; the unique index settles races
        if self
            .user_repo
            .exists(Filter::new().eq(UserField::Email, email.as_str()))
            .await?
        {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = password.hash(self.config.pepper())?;
        let user = User::new(email, password_hash, UserRole::User);
        let profile = CitizenProfile::new(user.id, details);

        self.user_repo.create_with_profile(&user, &profile).await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(RegisterOutput {
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}
