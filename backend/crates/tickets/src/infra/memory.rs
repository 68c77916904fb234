//! In-Memory Repository
//!
//! Process-local ticket store for tests and local tooling. Relations are
//! resolved against a shared [`InMemoryUserStore`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use auth::InMemoryUserStore;
use chrono::{DateTime, Utc};
use kernel::id::{TicketId, UserId};
use kernel::query::{Filter, Query, Value};

use crate::domain::entity::ticket::{Ticket, TicketRelations};
use crate::domain::repository::{
    ModificationGroup, StatusCount, TicketChanges, TicketField, TicketPreload, TicketRepository,
};
use crate::domain::value_object::ticket_status::TicketStatus;
use crate::error::{TicketError, TicketResult};

/// Thread-safe in-memory ticket store
#[derive(Debug, Clone)]
pub struct InMemoryTicketStore {
    tickets: Arc<Mutex<Vec<Ticket>>>,
    users: InMemoryUserStore,
}

impl InMemoryTicketStore {
    pub fn new(users: InMemoryUserStore) -> Self {
        Self {
            tickets: Arc::new(Mutex::new(Vec::new())),
            users,
        }
    }

    fn lock(&self) -> TicketResult<MutexGuard<'_, Vec<Ticket>>> {
        self.tickets
            .lock()
            .map_err(|_| TicketError::Internal("ticket store lock poisoned".into()))
    }

    fn summary(&self, id: Option<UserId>) -> TicketResult<Option<auth::UserSummary>> {
        match id {
            Some(id) => Ok(self.users.find_summary(&id)?),
            None => Ok(None),
        }
    }

    fn with_relations(&self, mut ticket: Ticket, preload: TicketPreload) -> TicketResult<Ticket> {
        ticket.relations = TicketRelations {
            owner: if preload.owner {
                self.summary(Some(ticket.owner_id))?
            } else {
                None
            },
            staff_assignee: if preload.staff_assignee {
                self.summary(ticket.staff_assignee_id)?
            } else {
                None
            },
            last_modified_by: if preload.last_modified_by {
                self.summary(ticket.last_modified_by())?
            } else {
                None
            },
        };
        Ok(ticket)
    }

    fn matching(&self, filter: &Filter<TicketField>) -> TicketResult<Vec<Ticket>> {
        let tickets = self.lock()?;
        Ok(tickets
            .iter()
            .filter(|ticket| filter.matches(|field| read_field(ticket, field)))
            .cloned()
            .collect())
    }
}

fn read_field(ticket: &Ticket, field: TicketField) -> Value {
    match field {
        TicketField::Id => ticket.id.into(),
        TicketField::OwnerId => ticket.owner_id.into(),
        TicketField::Status => ticket.status.code().into(),
        TicketField::StaffAssigneeId => ticket.staff_assignee_id.into(),
        TicketField::LastModifiedById => ticket.last_modified_by().into(),
        TicketField::LastModifiedAt => ticket.last_modified_at().into(),
        TicketField::CreatedAt => ticket.created_at.into(),
    }
}

impl TicketRepository for InMemoryTicketStore {
    async fn create(&self, ticket: &Ticket) -> TicketResult<()> {
        let mut tickets = self.lock()?;
        tickets.push(Ticket {
            relations: TicketRelations::default(),
            ..ticket.clone()
        });
        Ok(())
    }

    async fn bulk_create(&self, new_tickets: &[Ticket]) -> TicketResult<u64> {
        let mut tickets = self.lock()?;
        tickets.extend(new_tickets.iter().map(|ticket| Ticket {
            relations: TicketRelations::default(),
            ..ticket.clone()
        }));
        Ok(new_tickets.len() as u64)
    }

    async fn get_by_id(&self, id: &TicketId, preload: TicketPreload) -> TicketResult<Option<Ticket>> {
        let ticket = self.lock()?.iter().find(|ticket| ticket.id == *id).cloned();
        ticket
            .map(|ticket| self.with_relations(ticket, preload))
            .transpose()
    }

    async fn get_one(
        &self,
        query: Query<TicketField>,
        preload: TicketPreload,
    ) -> TicketResult<Option<Ticket>> {
        let rows = self.list(query.limit(1), preload).await?;
        Ok(rows.into_iter().next())
    }

    async fn list(
        &self,
        query: Query<TicketField>,
        preload: TicketPreload,
    ) -> TicketResult<Vec<Ticket>> {
        let rows = {
            let tickets = self.lock()?;
            query.apply(tickets.iter().cloned(), read_field)
        };
        rows.into_iter()
            .map(|ticket| self.with_relations(ticket, preload))
            .collect()
    }

    async fn count(&self, filter: Filter<TicketField>) -> TicketResult<i64> {
        Ok(self.matching(&filter)?.len() as i64)
    }

    async fn exists(&self, filter: Filter<TicketField>) -> TicketResult<bool> {
        Ok(!self.matching(&filter)?.is_empty())
    }

    async fn update_by_id(&self, id: &TicketId, changes: &TicketChanges) -> TicketResult<u64> {
        self.update_where(Filter::new().eq(TicketField::Id, *id), changes)
            .await
    }

    async fn update_where(
        &self,
        filter: Filter<TicketField>,
        changes: &TicketChanges,
    ) -> TicketResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut tickets = self.lock()?;
        let mut affected = 0;
        for ticket in tickets
            .iter_mut()
            .filter(|ticket| filter.matches(|field| read_field(ticket, field)))
        {
            changes.apply_to(ticket, now);
            affected += 1;
        }
        Ok(affected)
    }

    async fn count_by_status(&self, filter: Filter<TicketField>) -> TicketResult<Vec<StatusCount>> {
        let mut counts: BTreeMap<TicketStatus, i64> = BTreeMap::new();
        for ticket in self.matching(&filter)? {
            *counts.entry(ticket.status).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn modification_summary(
        &self,
        filter: Filter<TicketField>,
    ) -> TicketResult<Vec<ModificationGroup>> {
        type Group = (i64, Option<DateTime<Utc>>);

        let mut groups: BTreeMap<(Option<UserId>, TicketStatus), Group> = BTreeMap::new();
        for ticket in self.matching(&filter)? {
            let group = groups
                .entry((ticket.last_modified_by(), ticket.status))
                .or_default();
            group.0 += 1;
            group.1 = group.1.max(ticket.last_modified_at());
        }

        Ok(groups
            .into_iter()
            .map(|((last_modified_by, status), (count, max_at))| ModificationGroup {
                last_modified_by,
                status,
                count,
                last_modified_at_max: max_at,
            })
            .collect())
    }
}
