//! PostgreSQL Repository Implementations

use auth::UserSummary;
use auth::domain::{Email, UserRole};
use chrono::{DateTime, Utc};
use kernel::id::{TicketId, UserId};
use kernel::query::{Filter, Query, sql};
use sqlx::postgres::PgArguments;
use sqlx::query::Query as SqlQuery;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::ticket::{AuditStamp, Ticket, TicketRelations};
use crate::domain::repository::{
    ModificationGroup, StatusCount, TicketChanges, TicketField, TicketPreload, TicketRepository,
};
use crate::domain::value_object::ticket_status::TicketStatus;
use crate::error::{TicketError, TicketResult};

const TICKET_COLUMNS: &str = "t.id, t.owner_id, t.text, t.status, t.staff_assignee_id, \
     t.staff_comment, t.last_modified_by_id, t.last_modified_at, t.created_at, t.updated_at";

/// PostgreSQL-backed ticket repository
#[derive(Clone)]
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `SELECT ... FROM tickets t` with one `users` join per preloaded relation
///
/// Relations that are not preloaded still yield their columns, as NULL,
/// so every query maps onto [`TicketRow`].
fn select_tickets(preload: TicketPreload) -> QueryBuilder<'static, Postgres> {
    let mut columns = String::from(TICKET_COLUMNS);
    let mut joins = String::new();

    for (enabled, alias, prefix, fk) in [
        (preload.owner, "o", "owner", "owner_id"),
        (preload.staff_assignee, "a", "assignee", "staff_assignee_id"),
        (preload.last_modified_by, "m", "modifier", "last_modified_by_id"),
    ] {
        if enabled {
            columns.push_str(&format!(
                ", {alias}.email AS {prefix}_email, {alias}.role AS {prefix}_role"
            ));
            joins.push_str(&format!(" LEFT JOIN users {alias} ON {alias}.id = t.{fk}"));
        } else {
            columns.push_str(&format!(
                ", NULL::text AS {prefix}_email, NULL::text AS {prefix}_role"
            ));
        }
    }

    QueryBuilder::new(format!("SELECT {columns} FROM tickets t{joins}"))
}

/// `UPDATE ... SET` head; `false` when there is nothing to write
fn push_update(
    qb: &mut QueryBuilder<'_, Postgres>,
    changes: &TicketChanges,
    now: DateTime<Utc>,
) -> bool {
    if changes.is_empty() {
        return false;
    }

    qb.push("UPDATE tickets AS t SET updated_at = ").push_bind(now);
    if let Some(status) = changes.status {
        qb.push(", status = ").push_bind(status.code());
    }
    if let Some(comment) = &changes.staff_comment {
        qb.push(", staff_comment = ").push_bind(comment.clone());
    }
    if let Some(assignee) = changes.staff_assignee_id {
        qb.push(", staff_assignee_id = ").push_bind(assignee.into_uuid());
    }
    if let Some(audit) = changes.audit {
        qb.push(", last_modified_by_id = ")
            .push_bind(audit.by.into_uuid())
            .push(", last_modified_at = ")
            .push_bind(audit.at);
    }

    true
}

const INSERT_TICKET: &str = r#"
    INSERT INTO tickets (
        id,
        owner_id,
        text,
        status,
        staff_assignee_id,
        staff_comment,
        last_modified_by_id,
        last_modified_at,
        created_at,
        updated_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

fn insert_ticket(ticket: &Ticket) -> SqlQuery<'_, Postgres, PgArguments> {
    sqlx::query(INSERT_TICKET)
        .bind(ticket.id.as_uuid())
        .bind(ticket.owner_id.as_uuid())
        .bind(&ticket.text)
        .bind(ticket.status.code())
        .bind(ticket.staff_assignee_id.map(UserId::into_uuid))
        .bind(&ticket.staff_comment)
        .bind(ticket.last_modified_by().map(UserId::into_uuid))
        .bind(ticket.last_modified_at())
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
}

// ============================================================================
// Ticket Repository Implementation
// ============================================================================

impl TicketRepository for PgTicketRepository {
    async fn create(&self, ticket: &Ticket) -> TicketResult<()> {
        insert_ticket(ticket).execute(&self.pool).await?;
        Ok(())
    }

    async fn bulk_create(&self, tickets: &[Ticket]) -> TicketResult<u64> {
        let mut tx = self.pool.begin().await?;

        let mut inserted = 0;
        for ticket in tickets {
            inserted += insert_ticket(ticket).execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;

        Ok(inserted)
    }

    async fn get_by_id(&self, id: &TicketId, preload: TicketPreload) -> TicketResult<Option<Ticket>> {
        self.get_one(
            Query::new().filter(Filter::new().eq(TicketField::Id, *id)),
            preload,
        )
        .await
    }

    async fn get_one(
        &self,
        query: Query<TicketField>,
        preload: TicketPreload,
    ) -> TicketResult<Option<Ticket>> {
        let mut qb = select_tickets(preload);
        sql::push_query(&mut qb, &query.limit(1));

        let row = qb
            .build_query_as::<TicketRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(TicketRow::into_ticket).transpose()
    }

    async fn list(
        &self,
        query: Query<TicketField>,
        preload: TicketPreload,
    ) -> TicketResult<Vec<Ticket>> {
        let mut qb = select_tickets(preload);
        sql::push_query(&mut qb, &query);

        let rows = qb
            .build_query_as::<TicketRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    async fn count(&self, filter: Filter<TicketField>) -> TicketResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tickets t");
        sql::push_filter(&mut qb, &filter);

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn exists(&self, filter: Filter<TicketField>) -> TicketResult<bool> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT EXISTS(SELECT 1 FROM tickets t");
        sql::push_filter(&mut qb, &filter);
        qb.push(")");

        let exists = qb
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
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
        let mut qb = QueryBuilder::<Postgres>::new("");
        if !push_update(&mut qb, changes, Utc::now()) {
            return Ok(0);
        }
        sql::push_filter(&mut qb, &filter);

        let result = qb.build().execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn count_by_status(&self, filter: Filter<TicketField>) -> TicketResult<Vec<StatusCount>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT t.status, COUNT(*) FROM tickets t");
        sql::push_filter(&mut qb, &filter);
        qb.push(" GROUP BY t.status");

        let rows = qb
            .build_query_as::<(String, i64)>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(status, count)| {
                Ok(StatusCount {
                    status: parse_status(&status)?,
                    count,
                })
            })
            .collect()
    }

    async fn modification_summary(
        &self,
        filter: Filter<TicketField>,
    ) -> TicketResult<Vec<ModificationGroup>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT t.last_modified_by_id, t.status, COUNT(*), MAX(t.last_modified_at) \
             FROM tickets t",
        );
        sql::push_filter(&mut qb, &filter);
        qb.push(" GROUP BY t.last_modified_by_id, t.status");

        let rows = qb
            .build_query_as::<(Option<Uuid>, String, i64, Option<DateTime<Utc>>)>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(by, status, count, max_at)| {
                Ok(ModificationGroup {
                    last_modified_by: by.map(UserId::from_uuid),
                    status: parse_status(&status)?,
                    count,
                    last_modified_at_max: max_at,
                })
            })
            .collect()
    }
}

fn parse_status(code: &str) -> TicketResult<TicketStatus> {
    TicketStatus::from_code(code)
        .ok_or_else(|| TicketError::Internal(format!("Invalid ticket status: {code}")))
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    owner_id: Uuid,
    text: String,
    status: String,
    staff_assignee_id: Option<Uuid>,
    staff_comment: Option<String>,
    last_modified_by_id: Option<Uuid>,
    last_modified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_email: Option<String>,
    owner_role: Option<String>,
    assignee_email: Option<String>,
    assignee_role: Option<String>,
    modifier_email: Option<String>,
    modifier_role: Option<String>,
}

/// A joined account, if the join produced one
fn summary(
    id: Option<Uuid>,
    email: Option<String>,
    role: Option<String>,
) -> TicketResult<Option<UserSummary>> {
    let (Some(id), Some(email), Some(role)) = (id, email, role) else {
        return Ok(None);
    };

    let role = UserRole::from_code(&role)
        .ok_or_else(|| TicketError::Internal(format!("Invalid role code: {role}")))?;

    Ok(Some(UserSummary {
        id: UserId::from_uuid(id),
        email: Email::from_db(email),
        role,
    }))
}

impl TicketRow {
    fn into_ticket(self) -> TicketResult<Ticket> {
        let relations = TicketRelations {
            owner: summary(Some(self.owner_id), self.owner_email, self.owner_role)?,
            staff_assignee: summary(
                self.staff_assignee_id,
                self.assignee_email,
                self.assignee_role,
            )?,
            last_modified_by: summary(
                self.last_modified_by_id,
                self.modifier_email,
                self.modifier_role,
            )?,
        };

        // A stamp whose modifier was deleted (SET NULL) is no longer a pair
        let last_modified = match (self.last_modified_by_id, self.last_modified_at) {
            (Some(by), Some(at)) => Some(AuditStamp {
                by: UserId::from_uuid(by),
                at,
            }),
            _ => None,
        };

        Ok(Ticket {
            id: TicketId::from_uuid(self.id),
            owner_id: UserId::from_uuid(self.owner_id),
            text: self.text,
            status: parse_status(&self.status)?,
            staff_assignee_id: self.staff_assignee_id.map(UserId::from_uuid),
            staff_comment: self.staff_comment,
            last_modified,
            created_at: self.created_at,
            updated_at: self.updated_at,
            relations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_writes_every_column_in_one_statement() {
        let changes = TicketChanges {
            status: Some(TicketStatus::Resolved),
            staff_comment: Some("Fixed on site.".into()),
            staff_assignee_id: Some(UserId::new()),
            audit: Some(AuditStamp::now(UserId::new())),
        };

        let mut qb = QueryBuilder::<Postgres>::new("");
        assert!(push_update(&mut qb, &changes, Utc::now()));
        sql::push_filter(&mut qb, &Filter::new().eq(TicketField::Id, TicketId::new()));

        assert_eq!(
            qb.sql(),
            "UPDATE tickets AS t SET updated_at = $1, status = $2, staff_comment = $3, \
             staff_assignee_id = $4, last_modified_by_id = $5, last_modified_at = $6 \
             WHERE t.id = $7"
        );
    }

    #[test]
    fn test_update_writes_only_given_columns() {
        let changes = TicketChanges {
            status: Some(TicketStatus::InProgress),
            ..TicketChanges::default()
        };

        let mut qb = QueryBuilder::<Postgres>::new("");
        assert!(push_update(&mut qb, &changes, Utc::now()));
        sql::push_filter(&mut qb, &Filter::new().eq(TicketField::Id, TicketId::new()));

        assert_eq!(
            qb.sql(),
            "UPDATE tickets AS t SET updated_at = $1, status = $2 WHERE t.id = $3"
        );
    }

    #[test]
    fn test_empty_update_pushes_nothing() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        assert!(!push_update(&mut qb, &TicketChanges::default(), Utc::now()));
        assert_eq!(qb.sql(), "");
    }

    #[test]
    fn test_select_without_preload_yields_null_relations() {
        let qb = select_tickets(TicketPreload::NONE);
        let sql = qb.sql();

        for prefix in ["owner", "assignee", "modifier"] {
            assert!(sql.contains(&format!("NULL::text AS {prefix}_email")));
            assert!(sql.contains(&format!("NULL::text AS {prefix}_role")));
        }
        assert!(!sql.contains("LEFT JOIN"));
        assert!(sql.ends_with("FROM tickets t"));
    }

    #[test]
    fn test_select_joins_only_preloaded_relations() {
        let all = select_tickets(TicketPreload::ALL);
        assert!(all.sql().contains("LEFT JOIN users o ON o.id = t.owner_id"));
        assert!(all.sql().contains("LEFT JOIN users a ON a.id = t.staff_assignee_id"));
        assert!(all.sql().contains("LEFT JOIN users m ON m.id = t.last_modified_by_id"));
        assert!(!all.sql().contains("NULL::text"));

        let staff = select_tickets(TicketPreload::RELATED_STAFF);
        assert!(staff.sql().contains("NULL::text AS owner_email"));
        assert!(!staff.sql().contains("LEFT JOIN users o"));
        assert!(staff.sql().contains("a.email AS assignee_email, a.role AS assignee_role"));
        assert!(staff.sql().contains("m.email AS modifier_email, m.role AS modifier_role"));
    }
}
