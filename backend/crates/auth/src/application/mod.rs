//! Application Layer
//!
//! Use cases and application services.

pub mod access;
pub mod admin;
pub mod config;
pub mod login;
pub mod register;

// Re-exports
pub use access::{AccessControl, Principal};
pub use admin::{AdminUseCase, UserPage};
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
