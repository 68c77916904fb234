//! API DTOs (Data Transfer Objects)

use auth::UserSummary;
use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{TicketId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::PerformanceRecord;
use crate::domain::entity::ticket::Ticket;
use crate::domain::value_object::{date_window::DateWindow, ticket_status::TicketStatus};
use crate::error::{TicketError, TicketResult};

// ============================================================================
// Tickets
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketRequest {
    pub text: String,
}

/// Listing item, kept small
#[derive(Debug, Clone, Serialize)]
pub struct TicketListItem {
    pub id: TicketId,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Ticket> for TicketListItem {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            status: ticket.status,
            created_at: ticket.created_at,
        }
    }
}

/// Full ticket view; related accounts appear when loaded
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    pub id: TicketId,
    pub text: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub staff_assignee_id: Option<UserId>,
    pub staff_comment: Option<String>,
    pub last_modified_by_id: Option<UserId>,
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_assignee: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<UserSummary>,
}

impl From<Ticket> for TicketDetail {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            status: ticket.status,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
            staff_assignee_id: ticket.staff_assignee_id,
            staff_comment: ticket.staff_comment,
            last_modified_by_id: ticket.last_modified.map(|stamp| stamp.by),
            last_modified_at: ticket.last_modified.map(|stamp| stamp.at),
            owner: ticket.relations.owner,
            staff_assignee: ticket.relations.staff_assignee,
            last_modified_by: ticket.relations.last_modified_by,
            text: ticket.text,
        }
    }
}

// ============================================================================
// Staff
// ============================================================================

/// `?only_my=&status=NEW,IN_PROGRESS`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffQueueQuery {
    #[serde(default)]
    pub only_my: bool,
    /// Comma-separated status codes
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffUpdateTicketRequest {
    pub status: Option<TicketStatus>,
    pub staff_comment: Option<String>,
    pub assign_to_self: Option<bool>,
}

// ============================================================================
// Analytics
// ============================================================================

/// `?date_from=YYYY-MM-DD&date_to=YYYY-MM-DD`, both inclusive
///
/// Dates arrive as text so a blank parameter reads as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRangeQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl DateRangeQuery {
    pub fn window(&self) -> TicketResult<DateWindow> {
        date_window(self.date_from.as_deref(), self.date_to.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffPerformanceQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub staff_id: Option<String>,
}

impl StaffPerformanceQuery {
    pub fn window(&self) -> TicketResult<DateWindow> {
        date_window(self.date_from.as_deref(), self.date_to.as_deref())
    }
}

fn date_window(from: Option<&str>, to: Option<&str>) -> TicketResult<DateWindow> {
    Ok(DateWindow::new(
        parse_date("date_from", from)?,
        parse_date("date_to", to)?,
    ))
}

fn parse_date(name: &str, raw: Option<&str>) -> TicketResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| TicketError::Validation(format!("Invalid {name}: {raw}"))),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffPerformanceResponse {
    pub items: Vec<PerformanceRecord>,
}
