//! Infrastructure Layer
//!
//! Database implementations and an in-memory store for tests and tooling.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgAuthRepository;
