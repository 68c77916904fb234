//! Router Assembly

use std::sync::Arc;

use auth::{AuthConfig, UserRepository, admin_router, auth_router};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tickets::{TicketRepository, analytics_router, staff_ticket_router, ticket_router};

use crate::config::DatabaseConfig;

/// GET /
async fn health() -> Json<Value> {
    Json(json!({ "message": "OK" }))
}

/// All routes, without the transport layers added by the server
pub fn build_router<T, U>(tickets: Arc<T>, users: Arc<U>, config: Arc<AuthConfig>) -> Router
where
    T: TicketRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let admin = admin_router(users.clone(), config.clone()).nest(
        "/analytics",
        analytics_router(tickets.clone(), users.clone(), config.clone()),
    );

    Router::new()
        .route("/", get(health))
        .nest("/auth", auth_router(users.clone(), config.clone()))
        .nest("/admin", admin)
        .nest(
            "/tickets",
            ticket_router(tickets.clone(), users.clone(), config.clone()),
        )
        .nest("/staff/tickets", staff_ticket_router(tickets, users, config))
}

/// Open the pool and bring the schema up to date
pub async fn connect_database(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    Ok(pool)
}
