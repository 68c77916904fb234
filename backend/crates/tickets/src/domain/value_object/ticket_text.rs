use kernel::error::app_error::{AppError, AppResult};

pub const TICKET_TEXT_MAX_LENGTH: usize = 10_000;

/// Ticket body as submitted by its owner
///
/// Stored verbatim; only the trimmed form is checked for blankness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketText(String);

impl TicketText {
    pub fn new(text: impl Into<String>) -> AppResult<Self> {
        let text = text.into();

        if text.trim().is_empty() {
            return Err(AppError::bad_request("Ticket text cannot be empty"));
        }

        if text.chars().count() > TICKET_TEXT_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Ticket text must be at most {TICKET_TEXT_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
