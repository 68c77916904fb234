//! Ticket Error Types
//!
//! Ticket-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Access failures arrive wrapped
//! from the auth crate.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Ticket-specific result type alias
pub type TicketResult<T> = Result<T, TicketError>;

#[derive(Debug, Error)]
pub enum TicketError {
    /// Absent, or owned by someone else
    #[error("Ticket not found")]
    NotFound,

    /// The update wrote no rows
    #[error("Nothing changed")]
    NothingChanged,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TicketError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            TicketError::NotFound => StatusCode::NOT_FOUND,
            TicketError::NothingChanged | TicketError::Validation(_) => StatusCode::BAD_REQUEST,
            TicketError::Auth(e) => e.status_code(),
            TicketError::Database(_) | TicketError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TicketError::NotFound => ErrorKind::NotFound,
            TicketError::NothingChanged | TicketError::Validation(_) => ErrorKind::BadRequest,
            TicketError::Auth(e) => e.kind(),
            TicketError::Database(_) | TicketError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            TicketError::Auth(e) => e.to_app_error(),
            TicketError::Database(_) | TicketError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            TicketError::Database(e) => {
                tracing::error!(error = %e, "Ticket database error");
            }
            TicketError::Internal(msg) => {
                tracing::error!(message = %msg, "Ticket internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Ticket error");
            }
        }
    }
}

impl IntoResponse for TicketError {
    fn into_response(self) -> Response {
        match self {
            // Keeps the auth crate's own log levels
            TicketError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

/// Value-object validation failures surface as `Validation`
impl From<AppError> for TicketError {
    fn from(err: AppError) -> Self {
        if err.is_server_error() {
            TicketError::Internal(err.to_string())
        } else {
            TicketError::Validation(err.message().to_string())
        }
    }
}
