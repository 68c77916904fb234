//! User Entity
//!
//! Account record: credentials and role. Citizen details live in
//! [`CitizenProfile`](super::citizen_profile::CitizenProfile).

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;
use serde::Serialize;

use crate::domain::value_object::{email::Email, user_role::UserRole};

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    /// Unique, case-sensitive as stored
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: Email, password_hash: HashedPassword, role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::new(),
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Public projection of a user, used for listings and relation preloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
}
