//! Repository Traits
//!
//! Interfaces for ticket persistence. Implementations are in the infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::{TicketId, UserId};
use kernel::query::{Field, Filter, Query};

use crate::domain::entity::ticket::{AuditStamp, Ticket};
use crate::domain::value_object::ticket_status::TicketStatus;
use crate::error::TicketResult;

/// Filterable ticket attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketField {
    Id,
    OwnerId,
    Status,
    StaffAssigneeId,
    LastModifiedById,
    LastModifiedAt,
    CreatedAt,
}

impl Field for TicketField {
    fn column(self) -> &'static str {
        match self {
            TicketField::Id => "t.id",
            TicketField::OwnerId => "t.owner_id",
            TicketField::Status => "t.status",
            TicketField::StaffAssigneeId => "t.staff_assignee_id",
            TicketField::LastModifiedById => "t.last_modified_by_id",
            TicketField::LastModifiedAt => "t.last_modified_at",
            TicketField::CreatedAt => "t.created_at",
        }
    }
}

/// Which related accounts to load alongside each ticket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketPreload {
    pub owner: bool,
    pub staff_assignee: bool,
    pub last_modified_by: bool,
}

impl TicketPreload {
    pub const NONE: Self = Self {
        owner: false,
        staff_assignee: false,
        last_modified_by: false,
    };

    pub const ALL: Self = Self {
        owner: true,
        staff_assignee: true,
        last_modified_by: true,
    };

    /// Assignee and last modifier, for views where the caller is the owner
    pub const RELATED_STAFF: Self = Self {
        owner: false,
        staff_assignee: true,
        last_modified_by: true,
    };
}

/// Column writes for an update; `None` leaves the column untouched
///
/// Setting `audit` writes both audit columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketChanges {
    pub status: Option<TicketStatus>,
    pub staff_comment: Option<String>,
    pub staff_assignee_id: Option<UserId>,
    pub audit: Option<AuditStamp>,
}

impl TicketChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.staff_comment.is_none()
            && self.staff_assignee_id.is_none()
            && self.audit.is_none()
    }

    /// Apply to an in-memory ticket
    pub fn apply_to(&self, ticket: &mut Ticket, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            ticket.status = status;
        }
        if let Some(comment) = &self.staff_comment {
            ticket.staff_comment = Some(comment.clone());
        }
        if let Some(assignee) = self.staff_assignee_id {
            ticket.staff_assignee_id = Some(assignee);
        }
        if let Some(audit) = self.audit {
            ticket.last_modified = Some(audit);
        }
        ticket.updated_at = now;
    }
}

/// Ticket count for one status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    pub status: TicketStatus,
    pub count: i64,
}

/// Tickets grouped by `(last_modified_by, status)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModificationGroup {
    pub last_modified_by: Option<UserId>,
    pub status: TicketStatus,
    pub count: i64,
    pub last_modified_at_max: Option<DateTime<Utc>>,
}

/// Ticket repository trait
///
/// Updates return the number of rows written; an empty
/// [`TicketChanges`] writes nothing and returns 0.
#[trait_variant::make(TicketRepository: Send)]
pub trait LocalTicketRepository {
    async fn create(&self, ticket: &Ticket) -> TicketResult<()>;

    /// Insert all tickets or none
    async fn bulk_create(&self, tickets: &[Ticket]) -> TicketResult<u64>;

    async fn get_by_id(&self, id: &TicketId, preload: TicketPreload) -> TicketResult<Option<Ticket>>;

    /// First match in query order
    async fn get_one(
        &self,
        query: Query<TicketField>,
        preload: TicketPreload,
    ) -> TicketResult<Option<Ticket>>;

    async fn list(&self, query: Query<TicketField>, preload: TicketPreload)
    -> TicketResult<Vec<Ticket>>;

    async fn count(&self, filter: Filter<TicketField>) -> TicketResult<i64>;

    async fn exists(&self, filter: Filter<TicketField>) -> TicketResult<bool>;

    /// Single-row update by primary key; 0 or 1
    async fn update_by_id(&self, id: &TicketId, changes: &TicketChanges) -> TicketResult<u64>;

    async fn update_where(
        &self,
        filter: Filter<TicketField>,
        changes: &TicketChanges,
    ) -> TicketResult<u64>;

    /// Only statuses with at least one matching ticket appear
    async fn count_by_status(&self, filter: Filter<TicketField>) -> TicketResult<Vec<StatusCount>>;

    async fn modification_summary(
        &self,
        filter: Filter<TicketField>,
    ) -> TicketResult<Vec<ModificationGroup>>;
}
