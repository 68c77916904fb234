//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::ticket::{AuditStamp, Ticket, TicketRelations};
pub use repository::{
    ModificationGroup, StatusCount, TicketChanges, TicketField, TicketPreload, TicketRepository,
};
pub use value_object::{
    date_window::DateWindow, ticket_status::TicketStatus, ticket_text::TicketText,
};
