//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Citizen registration (account + profile in one transaction)
//! - Email/password login issuing HS256 bearer tokens
//! - Role-based access (User, Staff, Admin) with a router-level guard
//! - Admin account management: staff listing, creation and promotion
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional application pepper
//! - Login failures never reveal whether the email exists
//! - The role comes from the token; the subject must still exist

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::access::{AccessControl, Principal};
pub use application::config::AuthConfig;
pub use domain::{UserRepository, UserRole, UserSummary};
pub use error::{AuthError, AuthResult};
pub use infra::{memory::InMemoryUserStore, postgres::PgAuthRepository};
pub use presentation::router::{admin_router, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
