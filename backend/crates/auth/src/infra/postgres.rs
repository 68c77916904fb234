//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveDate, Utc};
use kernel::error::conversions::is_unique_violation;
use kernel::id::{CitizenProfileId, UserId};
use kernel::query::{Filter, Query, sql};
use platform::password::HashedPassword;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::{
    citizen_profile::{CitizenProfile, ProfileDetails},
    user::User,
};
use crate::domain::repository::{UserField, UserRepository};
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = "u.id, u.email, u.password_hash, u.role, u.created_at, u.updated_at";

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A lost race on `users.email` reads the same as the pre-check
fn insert_error(err: sqlx::Error) -> AuthError {
    if is_unique_violation(&err) {
        AuthError::DuplicateEmail
    } else {
        AuthError::Database(err)
    }
}

const INSERT_USER: &str = r#"
    INSERT INTO users (
        id,
        email,
        password_hash,
        role,
        created_at,
        updated_at
    ) VALUES ($1, $2, $3, $4, $5, $6)
"#;

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(INSERT_USER)
            .bind(user.id.as_uuid())
            .bind(user.email.as_str())
            .bind(user.password_hash.as_phc_string())
            .bind(user.role.code())
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(insert_error)?;

        Ok(())
    }

    async fn create_with_profile(&self, user: &User, profile: &CitizenProfile) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(INSERT_USER)
            .bind(user.id.as_uuid())
            .bind(user.email.as_str())
            .bind(user.password_hash.as_phc_string())
            .bind(user.role.code())
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(insert_error)?;

        sqlx::query(
            r#"
            INSERT INTO citizen_profiles (
                id,
                user_id,
                inn,
                phone,
                first_name,
                last_name,
                middle_name,
                birth_date,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(profile.user_id.as_uuid())
        .bind(&profile.details.inn)
        .bind(&profile.details.phone)
        .bind(&profile.details.first_name)
        .bind(&profile.details.last_name)
        .bind(&profile.details.middle_name)
        .bind(profile.details.birth_date)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await?;

        // Dropping `tx` on any error above rolls both inserts back
        tx.commit().await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &UserId) -> AuthResult<Option<User>> {
        self.get_one(Query::new().filter(Filter::new().eq(UserField::Id, *id)))
            .await
    }

    async fn get_one(&self, query: Query<UserField>) -> AuthResult<Option<User>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users u"));
        sql::push_query(&mut qb, &query.limit(1));

        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list(&self, query: Query<UserField>) -> AuthResult<Vec<User>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users u"));
        sql::push_query(&mut qb, &query);

        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn count(&self, filter: Filter<UserField>) -> AuthResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u");
        sql::push_filter(&mut qb, &filter);

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn exists(&self, filter: Filter<UserField>) -> AuthResult<bool> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT EXISTS(SELECT 1 FROM users u");
        sql::push_filter(&mut qb, &filter);
        qb.push(")");

        let exists = qb
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn update_role(&self, id: &UserId, role: UserRole) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users AS u SET
                role = $2,
                updated_at = $3
            WHERE u.id = $1
            RETURNING u.id, u.email, u.password_hash, u.role, u.created_at, u.updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(role.code())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_profile(&self, user_id: &UserId) -> AuthResult<Option<CitizenProfile>> {
        let row = sqlx::query_as::<_, CitizenProfileRow>(
            r#"
            SELECT
                id,
                user_id,
                inn,
                phone,
                first_name,
                last_name,
                middle_name,
                birth_date,
                created_at,
                updated_at
            FROM citizen_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CitizenProfileRow::into_profile))
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role code: {}", self.role)))?;

        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(User {
            id: UserId::from_uuid(self.id),
            email: Email::from_db(self.email),
            password_hash,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CitizenProfileRow {
    id: Uuid,
    user_id: Uuid,
    inn: String,
    phone: String,
    first_name: String,
    last_name: String,
    middle_name: Option<String>,
    birth_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CitizenProfileRow {
    fn into_profile(self) -> CitizenProfile {
        CitizenProfile {
            id: CitizenProfileId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            details: ProfileDetails {
                inn: self.inn,
                phone: self.phone,
                first_name: self.first_name,
                last_name: self.last_name,
                middle_name: self.middle_name,
                birth_date: self.birth_date,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
