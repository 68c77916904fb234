//! Presentation Layer
//!
//! HTTP handlers, DTOs and routers.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::TicketAppState;
pub use router::{analytics_router, staff_ticket_router, ticket_router};
