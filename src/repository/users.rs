//! Users repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{unique_violation_as_conflict, AppError, AppResult},
    models::user::{AccountStatus, Role, User},
};

/// Lookup of the stored standing of an account, consulted on every
/// authenticated request
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// `None` when the account no longer exists
    async fn account_status(&self, user_id: i32) -> AppResult<Option<AccountStatus>>;
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Current role and active flag
    pub async fn status_by_id(&self, id: i32) -> AppResult<Option<AccountStatus>> {
        let status = sqlx::query_as::<_, AccountStatus>("SELECT role, active FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(status)
    }

    /// Get user by email (login name)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// List all users ordered by name
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY full_name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Count users holding a role
    pub async fn count_by_role(&self, role: Role) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a user with an already hashed password
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, role)
            VALUES (LOWER($1), $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation_as_conflict(e, format!("Email {} is already registered", email)))
    }

    /// Change a user's role
    pub async fn update_role(&self, id: i32, role: Role) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $1, modif_date = $2 WHERE id = $3 RETURNING *",
        )
        .bind(role)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Enable or disable an account
    pub async fn update_active(&self, id: i32, active: bool) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET active = $1, modif_date = $2 WHERE id = $3 RETURNING *",
        )
        .bind(active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}

#[async_trait]
impl AccountDirectory for UsersRepository {
    async fn account_status(&self, user_id: i32) -> AppResult<Option<AccountStatus>> {
        self.status_by_id(user_id).await
    }
}
