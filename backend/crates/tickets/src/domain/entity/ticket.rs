//! Ticket Entity

use auth::UserSummary;
use chrono::{DateTime, Utc};
use kernel::id::{TicketId, UserId};

use crate::domain::value_object::{ticket_status::TicketStatus, ticket_text::TicketText};

/// Who made the latest staff-driven change, and when
///
/// Always written as a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditStamp {
    pub by: UserId,
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    pub fn now(by: UserId) -> Self {
        Self { by, at: Utc::now() }
    }
}

/// Related accounts, filled only when preloaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketRelations {
    pub owner: Option<UserSummary>,
    pub staff_assignee: Option<UserSummary>,
    pub last_modified_by: Option<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: TicketId,
    /// Never rewritten after creation
    pub owner_id: UserId,
    pub text: String,
    pub status: TicketStatus,
    pub staff_assignee_id: Option<UserId>,
    pub staff_comment: Option<String>,
    pub last_modified: Option<AuditStamp>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub relations: TicketRelations,
}

impl Ticket {
    /// A fresh NEW ticket: no assignee, no audit stamp
    pub fn new(owner_id: UserId, text: TicketText) -> Self {
        let now = Utc::now();

        Self {
            id: TicketId::new(),
            owner_id,
            text: text.into_inner(),
            status: TicketStatus::New,
            staff_assignee_id: None,
            staff_comment: None,
            last_modified: None,
            created_at: now,
            updated_at: now,
            relations: TicketRelations::default(),
        }
    }

    pub fn last_modified_by(&self) -> Option<UserId> {
        self.last_modified.map(|stamp| stamp.by)
    }

    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        self.last_modified.map(|stamp| stamp.at)
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner_id == *user_id
    }
}
