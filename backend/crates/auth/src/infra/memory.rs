//! In-Memory Repository
//!
//! Process-local store used by tests and local tooling. Accounts are kept
//! in insertion order so equal timestamps still list oldest first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use kernel::id::UserId;
use kernel::query::{Filter, Query, Value};

use crate::domain::entity::{
    citizen_profile::CitizenProfile,
    user::{User, UserSummary},
};
use crate::domain::repository::{UserField, UserRepository};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    profiles: HashMap<UserId, CitizenProfile>,
}

/// Thread-safe in-memory user store
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AuthError::Internal("user store lock poisoned".into()))
    }

    /// Synchronous lookup for stores that preload user relations
    pub fn find_summary(&self, id: &UserId) -> AuthResult<Option<UserSummary>> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .find(|user| user.id == *id)
            .map(User::summary))
    }

    fn insert(state: &mut State, user: &User) -> AuthResult<()> {
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::DuplicateEmail);
        }
        state.users.push(user.clone());
        Ok(())
    }
}

fn read_field(user: &User, field: UserField) -> Value {
    match field {
        UserField::Id => user.id.into(),
        UserField::Email => user.email.as_str().into(),
        UserField::Role => user.role.code().into(),
        UserField::CreatedAt => user.created_at.into(),
    }
}

impl UserRepository for InMemoryUserStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = self.lock()?;
        Self::insert(&mut state, user)
    }

    async fn create_with_profile(&self, user: &User, profile: &CitizenProfile) -> AuthResult<()> {
        let mut state = self.lock()?;
        Self::insert(&mut state, user)?;
        state.profiles.insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &UserId) -> AuthResult<Option<User>> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|user| user.id == *id).cloned())
    }

    async fn get_one(&self, query: Query<UserField>) -> AuthResult<Option<User>> {
        let state = self.lock()?;
        Ok(query
            .limit(1)
            .apply(state.users.iter().cloned(), read_field)
            .into_iter()
            .next())
    }

    async fn list(&self, query: Query<UserField>) -> AuthResult<Vec<User>> {
        let state = self.lock()?;
        Ok(query.apply(state.users.iter().cloned(), read_field))
    }

    async fn count(&self, filter: Filter<UserField>) -> AuthResult<i64> {
        let state = self.lock()?;
        let count = state
            .users
            .iter()
            .filter(|user| filter.matches(|field| read_field(user, field)))
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn exists(&self, filter: Filter<UserField>) -> AuthResult<bool> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .any(|user| filter.matches(|field| read_field(user, field))))
    }

    async fn update_role(&self, id: &UserId, role: UserRole) -> AuthResult<Option<User>> {
        let mut state = self.lock()?;
        Ok(state.users.iter_mut().find(|user| user.id == *id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn get_profile(&self, user_id: &UserId) -> AuthResult<Option<CitizenProfile>> {
        let state = self.lock()?;
        Ok(state.profiles.get(user_id).cloned())
    }
}
