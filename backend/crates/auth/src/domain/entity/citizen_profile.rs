//! Citizen Profile Entity
//!
//! Personal details owned 1:1 by a USER account. Only registration
//! creates one, together with its account.

use chrono::{DateTime, NaiveDate, Utc};
use kernel::error::app_error::{AppError, AppResult};
use kernel::id::{CitizenProfileId, UserId};

const INN_MAX_LENGTH: usize = 32;
const PHONE_MAX_LENGTH: usize = 32;
const NAME_MAX_LENGTH: usize = 80;

/// Validated profile fields supplied at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDetails {
    pub inn: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub birth_date: NaiveDate,
}

impl ProfileDetails {
    pub fn new(
        inn: String,
        phone: String,
        first_name: String,
        last_name: String,
        middle_name: Option<String>,
        birth_date: NaiveDate,
    ) -> AppResult<Self> {
        Ok(Self {
            inn: required("inn", inn, INN_MAX_LENGTH)?,
            phone: required("phone", phone, PHONE_MAX_LENGTH)?,
            first_name: required("first_name", first_name, NAME_MAX_LENGTH)?,
            last_name: required("last_name", last_name, NAME_MAX_LENGTH)?,
            middle_name: optional("middle_name", middle_name, NAME_MAX_LENGTH)?,
            birth_date,
        })
    }
}

fn required(field: &'static str, value: String, max: usize) -> AppResult<String> {
    optional(field, Some(value), max)?
        .ok_or_else(|| AppError::bad_request(format!("{field} cannot be empty")))
}

/// Blank optional values become `None`
fn optional(field: &'static str, value: Option<String>, max: usize) -> AppResult<Option<String>> {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.chars().count() > max {
        return Err(AppError::bad_request(format!(
            "{field} must be at most {max} characters"
        )));
    }

    Ok(Some(value))
}

#[derive(Debug, Clone)]
pub struct CitizenProfile {
    pub id: CitizenProfileId,
    pub user_id: UserId,
    pub details: ProfileDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CitizenProfile {
    pub fn new(user_id: UserId, details: ProfileDetails) -> Self {
        let now = Utc::now();

        Self {
            id: CitizenProfileId::new(),
            user_id,
            details,
            created_at: now,
            updated_at: now,
        }
    }
}
