//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infrastructure layer.

use kernel::id::UserId;
use kernel::query::{Field, Filter, Query};

use crate::domain::entity::{citizen_profile::CitizenProfile, user::User};
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthResult;

/// Filterable user attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Id,
    Email,
    Role,
    CreatedAt,
}

impl Field for UserField {
    fn column(self) -> &'static str {
        match self {
            UserField::Id => "u.id",
            UserField::Email => "u.email",
            UserField::Role => "u.role",
            UserField::CreatedAt => "u.created_at",
        }
    }
}

/// User repository trait
///
/// Inserts fail with `AuthError::DuplicateEmail` when the email is taken,
/// whether the store detects it up front or through its unique index.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a single account
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Insert an account and its profile atomically
    async fn create_with_profile(&self, user: &User, profile: &CitizenProfile) -> AuthResult<()>;

    async fn get_by_id(&self, id: &UserId) -> AuthResult<Option<User>>;

    /// First match in query order
    async fn get_one(&self, query: Query<UserField>) -> AuthResult<Option<User>>;

    async fn list(&self, query: Query<UserField>) -> AuthResult<Vec<User>>;

    async fn count(&self, filter: Filter<UserField>) -> AuthResult<i64>;

    async fn exists(&self, filter: Filter<UserField>) -> AuthResult<bool>;

    /// Change the role of an account; `None` if it does not exist
    async fn update_role(&self, id: &UserId, role: UserRole) -> AuthResult<Option<User>>;

    async fn get_profile(&self, user_id: &UserId) -> AuthResult<Option<CitizenProfile>>;
}
