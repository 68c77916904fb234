use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket lifecycle state
///
/// `NEW -> IN_PROGRESS -> RESOLVED | REJECTED` is the intended flow, but
/// staff may set any state at any time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[default]
    New,
    InProgress,
    Resolved,
    Rejected,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::New,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Rejected,
    ];

    /// What the staff queue shows unless asked otherwise
    pub const OPEN: [TicketStatus; 2] = [TicketStatus::New, TicketStatus::InProgress];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use TicketStatus::*;
        match self {
            New => "NEW",
            InProgress => "IN_PROGRESS",
            Resolved => "RESOLVED",
            Rejected => "REJECTED",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
