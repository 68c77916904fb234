//! Staff Ticket Use Case
//!
//! Queue listing and audited updates. Every write made here carries an
//! [`AuditStamp`] for the acting staff member.

use std::sync::Arc;

use kernel::id::{TicketId, UserId};
use kernel::query::{Filter, Order, Query};

use crate::domain::entity::ticket::{AuditStamp, Ticket};
use crate::domain::repository::{TicketChanges, TicketField, TicketPreload, TicketRepository};
use crate::domain::value_object::ticket_status::TicketStatus;
use crate::error::{TicketError, TicketResult};

/// Staff edits; all-absent means "no change"
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub status: Option<TicketStatus>,
    pub staff_comment: Option<String>,
    pub assign_to_self: bool,
}

impl TicketUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.staff_comment.is_none() && !self.assign_to_self
    }
}

pub struct StaffTicketsUseCase<T>
where
    T: TicketRepository,
{
    ticket_repo: Arc<T>,
}

impl<T> StaffTicketsUseCase<T>
where
    T: TicketRepository,
{
    pub fn new(ticket_repo: Arc<T>) -> Self {
        Self { ticket_repo }
    }

    /// Ordered by status code, then creation time
    ///
    /// `statuses` defaults to NEW and IN_PROGRESS when absent or empty;
    /// `assignee_id` narrows to one staff member's tickets.
    pub async fn list_queue(
        &self,
        statuses: Option<Vec<TicketStatus>>,
        assignee_id: Option<UserId>,
    ) -> TicketResult<Vec<Ticket>> {
        let statuses = statuses
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| TicketStatus::OPEN.to_vec());

        let mut filter = Filter::new().is_in(
            TicketField::Status,
            statuses.iter().map(TicketStatus::code),
        );
        if let Some(assignee_id) = assignee_id {
            filter = filter.eq(TicketField::StaffAssigneeId, assignee_id);
        }

        self.ticket_repo
            .list(
                Query::new()
                    .filter(filter)
                    .order_by(Order::asc(TicketField::Status))
                    .order_by(Order::asc(TicketField::CreatedAt)),
                TicketPreload::ALL,
            )
            .await
    }

    /// Any ticket, regardless of owner
    pub async fn get_ticket(&self, ticket_id: &TicketId) -> TicketResult<Ticket> {
        self.ticket_repo
            .get_by_id(ticket_id, TicketPreload::ALL)
            .await?
            .ok_or(TicketError::NotFound)
    }

    /// Returns the number of rows written (0 or 1)
    ///
    /// An empty update writes nothing. Otherwise the status falls back to
    /// IN_PROGRESS and the audit stamp is always set. Any status may follow
    /// any other.
    pub async fn update_ticket(
        &self,
        ticket_id: &TicketId,
        staff_id: UserId,
        update: TicketUpdate,
    ) -> TicketResult<u64> {
        if update.is_empty() {
            return Ok(0);
        }

        let changes = TicketChanges {
            status: Some(update.status.unwrap_or(TicketStatus::InProgress)),
            staff_comment: update.staff_comment,
            staff_assignee_id: update.assign_to_self.then_some(staff_id),
            audit: Some(AuditStamp::now(staff_id)),
        };

        let affected = self.ticket_repo.update_by_id(ticket_id, &changes).await?;

        if affected > 0 {
            tracing::info!(
                ticket_id = %ticket_id,
                staff_id = %staff_id,
                status = ?changes.status,
                "Ticket updated"
            );
        }

        Ok(affected)
    }

    /// Take the ticket without touching its status
    pub async fn assign_to_self(&self, ticket_id: &TicketId, staff_id: UserId) -> TicketResult<u64> {
        let changes = TicketChanges {
            staff_assignee_id: Some(staff_id),
            audit: Some(AuditStamp::now(staff_id)),
            ..Default::default()
        };

        let affected = self.ticket_repo.update_by_id(ticket_id, &changes).await?;

        if affected > 0 {
            tracing::info!(ticket_id = %ticket_id, staff_id = %staff_id, "Ticket assigned");
        }

        Ok(affected)
    }
}
