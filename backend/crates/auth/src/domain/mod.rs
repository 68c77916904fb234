//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    citizen_profile::{CitizenProfile, ProfileDetails},
    user::{User, UserSummary},
};
pub use repository::{UserField, UserRepository};
pub use value_object::{email::Email, user_role::UserRole};
