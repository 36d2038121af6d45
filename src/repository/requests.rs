//! Requests repository: CRUD plus the transactional status workflows

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{unique_violation_as_conflict, AppError, AppResult},
    models::{
        equipment::EquipmentStatus,
        request::{validate_window, CreateRequest, Request, RequestStatus, UpdateRequest},
        reservation::Reservation,
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

/// Outcome of a successful approval
#[derive(Debug, Clone)]
pub struct Approval {
    pub request: Request,
    pub reservation: Reservation,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Request> {
        sqlx::query_as::<_, Request>("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Requests owned by a user, newest first
    pub async fn list_by_owner(&self, user_id: i32) -> AppResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, Request>(
            "SELECT * FROM requests WHERE user_id = $1 ORDER BY crea_date DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every request, newest first
    pub async fn list_all(&self) -> AppResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, Request>(
            "SELECT * FROM requests ORDER BY crea_date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Number of requests per status
    pub async fn count_by_status(&self) -> AppResult<Vec<(RequestStatus, i64)>> {
        let rows: Vec<(RequestStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*)::bigint FROM requests GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a pending request and its first history entry
    pub async fn create(&self, user_id: i32, data: &CreateRequest) -> AppResult<Request> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, Request>(
            r#"
            INSERT INTO requests (user_id, equipment_id, purpose, start_at, end_at, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(data.equipment_id)
        .bind(&data.purpose)
        .bind(data.start_at)
        .bind(data.end_at)
        .bind(&data.notes)
        .bind(RequestStatus::Pendiente)
        .fetch_one(&mut *tx)
        .await?;

        record_history(&mut tx, request.id, None, RequestStatus::Pendiente, Some(user_id), None).await?;

        tx.commit().await?;
        Ok(request)
    }

    /// Merge a partial update into a pending request
    pub async fn update(&self, id: i32, data: &UpdateRequest) -> AppResult<Request> {
        let mut tx = self.pool.begin().await?;

        let current = lock_request(&mut tx, id).await?;
        if current.status != RequestStatus::Pendiente {
            return Err(AppError::Conflict(format!(
                "Request {} is {} and can no longer be modified",
                id, current.status
            )));
        }

        let start_at = data.start_at.unwrap_or(current.start_at);
        let end_at = data.end_at.unwrap_or(current.end_at);
        validate_window(start_at, end_at)?;

        let updated = sqlx::query_as::<_, Request>(
            r#"
            UPDATE requests
            SET equipment_id = $1, purpose = $2, start_at = $3, end_at = $4,
                notes = $5, modif_date = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(data.equipment_id.unwrap_or(current.equipment_id))
        .bind(data.purpose.as_ref().unwrap_or(&current.purpose))
        .bind(start_at)
        .bind(end_at)
        .bind(data.notes.as_ref().or(current.notes.as_ref()))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a request. When `pending_only` is set, only pending
    /// requests are removed.
    pub async fn delete(&self, id: i32, pending_only: bool) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let current = lock_request(&mut tx, id).await?;
        if pending_only && current.status != RequestStatus::Pendiente {
            return Err(AppError::Conflict(format!(
                "Request {} is {} and can no longer be deleted",
                id, current.status
            )));
        }

        sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Manual status change. Leaving `aprobada` releases the reservation.
    pub async fn set_status(
        &self,
        id: i32,
        next: RequestStatus,
        changed_by: i32,
        comment: Option<&str>,
    ) -> AppResult<Request> {
        let mut tx = self.pool.begin().await?;

        let current = lock_request(&mut tx, id).await?;
        current.status.check_manual_transition(next)?;

        if current.status == RequestStatus::Aprobada && next == RequestStatus::Cancelada {
            sqlx::query("DELETE FROM reservations WHERE request_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let updated = write_status(&mut tx, id, next, changed_by).await?;
        record_history(&mut tx, id, Some(current.status), next, Some(changed_by), comment).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Approve a pending request and reserve its equipment in one unit of work.
    ///
    /// The request row is locked first, so concurrent approvals of the same
    /// request run one after the other and the later one sees `aprobada`.
    /// The equipment row is locked next, so approvals competing for the same
    /// equipment cannot both pass the overlap check.
    pub async fn approve(&self, id: i32, approved_by: i32) -> AppResult<Approval> {
        let mut tx = self.pool.begin().await?;

        let current = lock_request(&mut tx, id).await?;
        if current.status != RequestStatus::Pendiente {
            return Err(AppError::Conflict(format!(
                "Request {} is already {}",
                id, current.status
            )));
        }

        let equipment_status: EquipmentStatus = sqlx::query_scalar(
            "SELECT status FROM equipment WHERE id = $1 FOR UPDATE",
        )
        .bind(current.equipment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", current.equipment_id)))?;

        if !equipment_status.is_reservable() {
            return Err(AppError::Conflict(format!(
                "Equipment {} is {} and cannot be reserved",
                current.equipment_id, equipment_status
            )));
        }

        if has_overlap(&mut tx, current.equipment_id, current.start_at, current.end_at).await? {
            return Err(AppError::Conflict(format!(
                "Equipment {} is already reserved in that time window",
                current.equipment_id
            )));
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (request_id, equipment_id, start_at, end_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(current.equipment_id)
        .bind(current.start_at)
        .bind(current.end_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation_as_conflict(e, format!("Request {} already has a reservation", id)))?;

        let request = write_status(&mut tx, id, RequestStatus::Aprobada, approved_by).await?;
        record_history(
            &mut tx,
            id,
            Some(current.status),
            RequestStatus::Aprobada,
            Some(approved_by),
            None,
        )
        .await?;

        tx.commit().await?;
        Ok(Approval { request, reservation })
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Request {} not found", id))
}

async fn lock_request(tx: &mut Transaction<'_, Postgres>, id: i32) -> AppResult<Request> {
    sqlx::query_as::<_, Request>("SELECT * FROM requests WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn has_overlap(
    tx: &mut Transaction<'_, Postgres>,
    equipment_id: i32,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM reservations
            WHERE equipment_id = $1 AND start_at < $3 AND end_at > $2
        )
        "#,
    )
    .bind(equipment_id)
    .bind(start_at)
    .bind(end_at)
    .fetch_one(&mut **tx)
    .await?;
    Ok(exists)
}

async fn write_status(
    tx: &mut Transaction<'_, Postgres>,
    id: i32,
    status: RequestStatus,
    reviewed_by: i32,
) -> AppResult<Request> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, Request>(
        r#"
        UPDATE requests
        SET status = $1, reviewed_by = $2, reviewed_at = $3, modif_date = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(status)
    .bind(reviewed_by)
    .bind(now)
    .bind(id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

async fn record_history(
    tx: &mut Transaction<'_, Postgres>,
    request_id: i32,
    from_status: Option<RequestStatus>,
    to_status: RequestStatus,
    changed_by: Option<i32>,
    comment: Option<&str>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO request_history (request_id, from_status, to_status, changed_by, comment)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(request_id)
    .bind(from_status)
    .bind(to_status)
    .bind(changed_by)
    .bind(comment)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
