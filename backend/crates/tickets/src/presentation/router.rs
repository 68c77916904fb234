//! Ticket Routers
//!
//! Each router carries its own role guard from the auth crate.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use auth::middleware::{AccessState, require_roles};
use auth::{AuthConfig, UserRepository, UserRole};

use crate::domain::repository::TicketRepository;
use crate::presentation::handlers::{self, TicketAppState};

const USER_ONLY: &[UserRole] = &[UserRole::User];
/// Mutating handlers narrow this to STAFF
const STAFF_OR_ADMIN: &[UserRole] = &[UserRole::Staff, UserRole::Admin];
const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// `/tickets`: a citizen's own tickets
pub fn ticket_router<T, U>(tickets: Arc<T>, users: Arc<U>, config: Arc<AuthConfig>) -> Router
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let access = AccessState::new(users.clone(), config, USER_ONLY);
    let state = TicketAppState { tickets, users };

    Router::new()
        .route("/", post(handlers::create_ticket::<T, U>))
        .route("/my", get(handlers::list_my_tickets::<T, U>))
        .route("/my/{ticket_id}", get(handlers::get_my_ticket::<T, U>))
        .route_layer(middleware::from_fn_with_state(access, require_roles::<U>))
        .with_state(state)
}

/// `/staff/tickets`: queue, detail and audited updates
pub fn staff_ticket_router<T, U>(tickets: Arc<T>, users: Arc<U>, config: Arc<AuthConfig>) -> Router
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let access = AccessState::new(users.clone(), config, STAFF_OR_ADMIN);
    let state = TicketAppState { tickets, users };

    Router::new()
        .route("/", get(handlers::staff_queue::<T, U>))
        .route(
            "/{ticket_id}",
            get(handlers::staff_get_ticket::<T, U>).patch(handlers::staff_update_ticket::<T, U>),
        )
        .route("/{ticket_id}/assign", post(handlers::staff_assign_ticket::<T, U>))
        .route_layer(middleware::from_fn_with_state(access, require_roles::<U>))
        .with_state(state)
}

/// `/admin/analytics`: aggregate reports, ADMIN only
pub fn analytics_router<T, U>(tickets: Arc<T>, users: Arc<U>, config: Arc<AuthConfig>) -> Router
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let access = AccessState::new(users.clone(), config, ADMIN_ONLY);
    let state = TicketAppState { tickets, users };

    Router::new()
        .route("/overview", get(handlers::analytics_overview::<T, U>))
        .route(
            "/staff-performance",
            get(handlers::analytics_staff_performance::<T, U>),
        )
        .route_layer(middleware::from_fn_with_state(access, require_roles::<U>))
        .with_state(state)
}
