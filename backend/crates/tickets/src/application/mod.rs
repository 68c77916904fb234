pub mod analytics;
pub mod staff_tickets;
pub mod user_tickets;

pub use analytics::{AnalyticsUseCase, Overview, PerformanceRecord};
pub use staff_tickets::{StaffTicketsUseCase, TicketUpdate};
pub use user_tickets::UserTicketsUseCase;
