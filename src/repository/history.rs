//! Request history repository

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::history::HistoryEntry};

#[derive(Clone)]
pub struct HistoryRepository {
    pool: Pool<Postgres>,
}

impl HistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// History of one request, oldest first
    pub async fn list_for_request(&self, request_id: i32) -> AppResult<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryEntry>(
            "SELECT * FROM request_history WHERE request_id = $1 ORDER BY changed_at, id",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// History of every request owned by a user, newest first
    pub async fn list_for_owner(&self, user_id: i32) -> AppResult<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT h.*
            FROM request_history h
            JOIN requests r ON r.id = h.request_id
            WHERE r.user_id = $1
            ORDER BY h.changed_at DESC, h.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Full history, newest first
    pub async fn list_all(&self) -> AppResult<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryEntry>(
            "SELECT * FROM request_history ORDER BY changed_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
