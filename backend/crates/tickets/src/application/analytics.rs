//! Analytics Use Case
//!
//! Ticket totals per status and per-staff performance over a day window.

use std::collections::BTreeMap;
use std::sync::Arc;

use auth::domain::UserField;
use auth::{UserRepository, UserRole};
use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::query::{Filter, Order, Query};
use serde::Serialize;

use crate::domain::repository::{TicketField, TicketRepository};
use crate::domain::value_object::{date_window::DateWindow, ticket_status::TicketStatus};
use crate::error::TicketResult;

/// Tickets created in the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total_created: i64,
    /// Every status is present, zero when unused
    pub by_status: BTreeMap<TicketStatus, i64>,
}

/// Activity of one staff member, by the status their tickets were left in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceRecord {
    pub staff_id: UserId,
    pub resolved_count: i64,
    pub rejected_count: i64,
    pub in_progress_count: i64,
    pub last_modified_at_max: Option<DateTime<Utc>>,
}

impl PerformanceRecord {
    pub fn empty(staff_id: UserId) -> Self {
        Self {
            staff_id,
            resolved_count: 0,
            rejected_count: 0,
            in_progress_count: 0,
            last_modified_at_max: None,
        }
    }
}

pub struct AnalyticsUseCase<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    ticket_repo: Arc<T>,
    user_repo: Arc<U>,
}

impl<T, U> AnalyticsUseCase<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    pub fn new(ticket_repo: Arc<T>, user_repo: Arc<U>) -> Self {
        Self {
            ticket_repo,
            user_repo,
        }
    }

    /// Windowed on `created_at`
    pub async fn overview(&self, window: DateWindow) -> TicketResult<Overview> {
        let filter = window.restrict(Filter::new(), TicketField::CreatedAt);

        let total_created = self.ticket_repo.count(filter.clone()).await?;

        let mut by_status: BTreeMap<TicketStatus, i64> =
            TicketStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for row in self.ticket_repo.count_by_status(filter).await? {
            *by_status.entry(row.status).or_default() += row.count;
        }

        Ok(Overview {
            total_created,
            by_status,
        })
    }

    /// Windowed on `last_modified_at`, sorted by staff id
    ///
    /// Without `staff_id` every STAFF account is listed, zero-filled. With
    /// it, only that modifier is counted, and a zero record appears only
    /// if the id belongs to a STAFF account.
    pub async fn staff_performance(
        &self,
        window: DateWindow,
        staff_id: Option<UserId>,
    ) -> TicketResult<Vec<PerformanceRecord>> {
        let filter = match staff_id {
            Some(id) => Filter::new().eq(TicketField::LastModifiedById, id),
            None => Filter::new().is_not_null(TicketField::LastModifiedById),
        };
        let filter = window.restrict(filter, TicketField::LastModifiedAt);

        let mut records: BTreeMap<UserId, PerformanceRecord> = BTreeMap::new();

        for group in self.ticket_repo.modification_summary(filter).await? {
            let Some(modifier) = group.last_modified_by else {
                continue;
            };
            let record = records
                .entry(modifier)
                .or_insert_with(|| PerformanceRecord::empty(modifier));

            match group.status {
                TicketStatus::Resolved => record.resolved_count += group.count,
                TicketStatus::Rejected => record.rejected_count += group.count,
                TicketStatus::InProgress => record.in_progress_count += group.count,
                TicketStatus::New => {}
            }

            record.last_modified_at_max =
                record.last_modified_at_max.max(group.last_modified_at_max);
        }

        let staff_role = Filter::new().eq(UserField::Role, UserRole::Staff.code());
        match staff_id {
            Some(id) => {
                if self
                    .user_repo
                    .exists(staff_role.eq(UserField::Id, id))
                    .await?
                {
                    records.entry(id).or_insert_with(|| PerformanceRecord::empty(id));
                }
            }
            None => {
                let staff = self
                    .user_repo
                    .list(
                        Query::new()
                            .filter(staff_role)
                            .order_by(Order::asc(UserField::CreatedAt)),
                    )
                    .await?;
                for user in staff {
                    records
                        .entry(user.id)
                        .or_insert_with(|| PerformanceRecord::empty(user.id));
                }
            }
        }

        Ok(records.into_values().collect())
    }
}
