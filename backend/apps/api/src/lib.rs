//! API Application
//!
//! Configuration and router assembly shared by the `api` server and the
//! `manage` operator binary.

pub mod app;
pub mod config;

pub use app::{build_router, connect_database};
pub use config::{ApiConfig, ConfigError, DatabaseConfig};
