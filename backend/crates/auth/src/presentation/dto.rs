//! API DTOs (Data Transfer Objects)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::{LoginOutput, RegisterOutput, UserPage};
use crate::domain::entity::user::User;
use crate::domain::value_object::user_role::UserRole;

// ============================================================================
// Shared
// ============================================================================

/// Minimal account view
#[derive(Debug, Clone, Serialize)]
pub struct UserShort {
    pub id: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserShort {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            role: user.role,
        }
    }
}

impl From<RegisterOutput> for UserShort {
    fn from(output: RegisterOutput) -> Self {
        Self {
            id: output.user_id.to_string(),
            email: output.email.as_str().to_string(),
            role: output.role,
        }
    }
}

// ============================================================================
// Register / Login
// ============================================================================

/// Registration payload: account plus citizen profile
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub inn: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
}

impl From<LoginOutput> for TokenResponse {
    fn from(output: LoginOutput) -> Self {
        Self {
            access_token: output.access_token,
            token_type: output.token_type,
            expires_in: output.expires_in,
        }
    }
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStaffRequest {
    pub email: String,
    pub password: String,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    20
}

/// `?page=&size=`
#[derive(Debug, Clone, Deserialize)]
pub struct UsersPageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersPageResponse {
    pub items: Vec<UserShort>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

impl From<UserPage> for UsersPageResponse {
    fn from(page: UserPage) -> Self {
        Self {
            items: page.items.iter().map(UserShort::from).collect(),
            total: page.total,
            page: page.page,
            size: page.size,
        }
    }
}
