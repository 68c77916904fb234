//! User Ticket Use Case
//!
//! A citizen's own tickets: create, list, read.

use std::sync::Arc;

use kernel::id::{TicketId, UserId};
use kernel::query::{Filter, Order, Query};

use crate::domain::entity::ticket::Ticket;
use crate::domain::repository::{TicketField, TicketPreload, TicketRepository};
use crate::domain::value_object::ticket_text::TicketText;
use crate::error::{TicketError, TicketResult};

pub struct UserTicketsUseCase<T>
where
    T: TicketRepository,
{
    ticket_repo: Arc<T>,
}

impl<T> UserTicketsUseCase<T>
where
    T: TicketRepository,
{
    pub fn new(ticket_repo: Arc<T>) -> Self {
        Self { ticket_repo }
    }

    /// Insert a NEW ticket owned by `owner_id`
    pub async fn create_ticket(&self, owner_id: UserId, text: String) -> TicketResult<Ticket> {
        let ticket = Ticket::new(owner_id, TicketText::new(text)?);
        self.ticket_repo.create(&ticket).await?;

        tracing::info!(ticket_id = %ticket.id, owner_id = %owner_id, "Ticket created");

        Ok(ticket)
    }

    /// Newest first
    pub async fn list_my_tickets(&self, owner_id: UserId) -> TicketResult<Vec<Ticket>> {
        self.ticket_repo
            .list(
                Query::new()
                    .filter(Filter::new().eq(TicketField::OwnerId, owner_id))
                    .order_by(Order::desc(TicketField::CreatedAt)),
                TicketPreload::RELATED_STAFF,
            )
            .await
    }

    /// Someone else's ticket is reported exactly like a missing one
    pub async fn get_my_ticket(
        &self,
        owner_id: UserId,
        ticket_id: &TicketId,
    ) -> TicketResult<Ticket> {
        self.ticket_repo
            .get_by_id(ticket_id, TicketPreload::RELATED_STAFF)
            .await?
            .filter(|ticket| ticket.is_owned_by(&owner_id))
            .ok_or(TicketError::NotFound)
    }
}
