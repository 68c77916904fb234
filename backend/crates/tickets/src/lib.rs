//! Tickets Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Ticket entity, value objects, repository trait
//! - `application/` - User, staff and analytics use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Rules
//! - Citizens see only their own tickets; staff and admins see all
//! - Every staff-driven write stamps who made it and when
//! - Status changes are unrestricted; the lifecycle is advisory

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use domain::{Ticket, TicketRepository, TicketStatus};
pub use error::{TicketError, TicketResult};
pub use infra::{memory::InMemoryTicketStore, postgres::PgTicketRepository};
pub use presentation::router::{analytics_router, staff_ticket_router, ticket_router};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
