//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

use auth::{Principal, UserRepository, UserRole};
use kernel::id::{TicketId, UserId};

use crate::application::{
    AnalyticsUseCase, Overview, StaffTicketsUseCase, TicketUpdate, UserTicketsUseCase,
};
use crate::domain::repository::TicketRepository;
use crate::domain::value_object::ticket_status::TicketStatus;
use crate::error::{TicketError, TicketResult};
use crate::presentation::dto::{
    CreateTicketRequest, DateRangeQuery, StaffPerformanceQuery, StaffPerformanceResponse,
    StaffQueueQuery, StaffUpdateTicketRequest, TicketDetail, TicketListItem,
};

/// Shared state for ticket handlers
#[derive(Clone)]
pub struct TicketAppState<T, U>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    pub tickets: Arc<T>,
    pub users: Arc<U>,
}

/// Unparseable ids cannot name a ticket
fn parse_ticket_id(raw: &str) -> TicketResult<TicketId> {
    raw.parse().map_err(|_| TicketError::NotFound)
}

/// `NEW,IN_PROGRESS` -> statuses; blank entries are skipped
fn parse_statuses(raw: &str) -> TicketResult<Vec<TicketStatus>> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            TicketStatus::from_code(code)
                .ok_or_else(|| TicketError::Validation(format!("Unknown ticket status: {code}")))
        })
        .collect()
}

// ============================================================================
// User tickets
// ============================================================================

/// POST /tickets
pub async fn create_ticket<T, U>(
    State(state): State<TicketAppState<T, U>>,
    principal: Principal,
    Json(req): Json<CreateTicketRequest>,
) -> TicketResult<(StatusCode, Json<TicketDetail>)>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = UserTicketsUseCase::new(state.tickets.clone());
    let ticket = use_case.create_ticket(principal.user_id, req.text).await?;

    Ok((StatusCode::CREATED, Json(ticket.into())))
}

/// GET /tickets/my
pub async fn list_my_tickets<T, U>(
    State(state): State<TicketAppState<T, U>>,
    principal: Principal,
) -> TicketResult<Json<Vec<TicketListItem>>>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = UserTicketsUseCase::new(state.tickets.clone());
    let tickets = use_case.list_my_tickets(principal.user_id).await?;

    Ok(Json(tickets.iter().map(TicketListItem::from).collect()))
}

/// GET /tickets/my/{ticket_id}
pub async fn get_my_ticket<T, U>(
    State(state): State<TicketAppState<T, U>>,
    principal: Principal,
    Path(ticket_id): Path<String>,
) -> TicketResult<Json<TicketDetail>>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let ticket_id = parse_ticket_id(&ticket_id)?;

    let use_case = UserTicketsUseCase::new(state.tickets.clone());
    let ticket = use_case.get_my_ticket(principal.user_id, &ticket_id).await?;

    Ok(Json(ticket.into()))
}

// ============================================================================
// Staff tickets
// ============================================================================

/// GET /staff/tickets?only_my=&status=
pub async fn staff_queue<T, U>(
    State(state): State<TicketAppState<T, U>>,
    principal: Principal,
    Query(query): Query<StaffQueueQuery>,
) -> TicketResult<Json<Vec<TicketListItem>>>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let statuses = query.status.as_deref().map(parse_statuses).transpose()?;
    let assignee = query.only_my.then_some(principal.user_id);

    let use_case = StaffTicketsUseCase::new(state.tickets.clone());
    let tickets = use_case.list_queue(statuses, assignee).await?;

    Ok(Json(tickets.iter().map(TicketListItem::from).collect()))
}

/// GET /staff/tickets/{ticket_id}
pub async fn staff_get_ticket<T, U>(
    State(state): State<TicketAppState<T, U>>,
    Path(ticket_id): Path<String>,
) -> TicketResult<Json<TicketDetail>>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let ticket_id = parse_ticket_id(&ticket_id)?;

    let use_case = StaffTicketsUseCase::new(state.tickets.clone());
    let ticket = use_case.get_ticket(&ticket_id).await?;

    Ok(Json(ticket.into()))
}

/// PATCH /staff/tickets/{ticket_id}
///
/// Readable by ADMIN through the router guard, writable by STAFF only.
pub async fn staff_update_ticket<T, U>(
    State(state): State<TicketAppState<T, U>>,
    principal: Principal,
    Path(ticket_id): Path<String>,
    Json(req): Json<StaffUpdateTicketRequest>,
) -> TicketResult<StatusCode>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    principal.require_roles(&[UserRole::Staff])?;
    let ticket_id = parse_ticket_id(&ticket_id)?;

    let update = TicketUpdate {
        status: req.status,
        staff_comment: req.staff_comment,
        assign_to_self: req.assign_to_self.unwrap_or(false),
    };

    let use_case = StaffTicketsUseCase::new(state.tickets.clone());
    match use_case
        .update_ticket(&ticket_id, principal.user_id, update)
        .await?
    {
        0 => Err(TicketError::NothingChanged),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

/// POST /staff/tickets/{ticket_id}/assign
pub async fn staff_assign_ticket<T, U>(
    State(state): State<TicketAppState<T, U>>,
    principal: Principal,
    Path(ticket_id): Path<String>,
) -> TicketResult<StatusCode>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    principal.require_roles(&[UserRole::Staff])?;
    let ticket_id = parse_ticket_id(&ticket_id)?;

    let use_case = StaffTicketsUseCase::new(state.tickets.clone());
    match use_case.assign_to_self(&ticket_id, principal.user_id).await? {
        0 => Err(TicketError::NothingChanged),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

// ============================================================================
// Analytics
// ============================================================================

/// GET /admin/analytics/overview?date_from=&date_to=
pub async fn analytics_overview<T, U>(
    State(state): State<TicketAppState<T, U>>,
    Query(query): Query<DateRangeQuery>,
) -> TicketResult<Json<Overview>>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = AnalyticsUseCase::new(state.tickets.clone(), state.users.clone());
    let overview = use_case.overview(query.window()?).await?;

    Ok(Json(overview))
}

/// GET /admin/analytics/staff-performance?date_from=&date_to=&staff_id=
pub async fn analytics_staff_performance<T, U>(
    State(state): State<TicketAppState<T, U>>,
    Query(query): Query<StaffPerformanceQuery>,
) -> TicketResult<Json<StaffPerformanceResponse>>
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let staff_id = query
        .staff_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<UserId>()
                .map_err(|_| TicketError::Validation(format!("Invalid staff_id: {id}")))
        })
        .transpose()?;
    let window = query.window()?;

    let use_case = AnalyticsUseCase::new(state.tickets.clone(), state.users.clone());
    let items = use_case.staff_performance(window, staff_id).await?;

    Ok(Json(StaffPerformanceResponse { items }))
}
