//! Labs repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{unique_violation_as_conflict, AppError, AppResult},
    models::lab::{CreateLab, Lab, UpdateLab},
};

#[derive(Clone)]
pub struct LabsRepository {
    pool: Pool<Postgres>,
}

impl LabsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all labs
    pub async fn list(&self) -> AppResult<Vec<Lab>> {
        let rows = sqlx::query_as::<_, Lab>("SELECT * FROM labs ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get lab by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Lab> {
        sqlx::query_as::<_, Lab>("SELECT * FROM labs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lab {} not found", id)))
    }

    /// Create lab
    pub async fn create(&self, data: &CreateLab) -> AppResult<Lab> {
        sqlx::query_as::<_, Lab>(
            r#"
            INSERT INTO labs (name, location, capacity, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.location)
        .bind(data.capacity)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation_as_conflict(e, format!("Lab {} already exists", data.name)))
    }

    /// Update lab, only touching the provided fields
    pub async fn update(&self, id: i32, data: &UpdateLab) -> AppResult<Lab> {
        let mut sets = vec!["modif_date = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.location, "location");
        add_field!(data.capacity, "capacity");
        add_field!(data.description, "description");

        let query = format!("UPDATE labs SET {} WHERE id = ${} RETURNING *", sets.join(", "), idx);

        let mut builder = sqlx::query_as::<_, Lab>(&query).bind(Utc::now());

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.location);
        bind_field!(data.capacity);
        bind_field!(data.description);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unique_violation_as_conflict(e, "Another lab already uses that name"))?
            .ok_or_else(|| AppError::NotFound(format!("Lab {} not found", id)))
    }

    /// Delete lab (cascades to its equipment)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM labs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::Conflict(
                    format!("Lab {} has equipment referenced by requests", id),
                ),
                _ => AppError::Database(e),
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lab {} not found", id)));
        }
        Ok(())
    }

    /// Reservations per lab, for reports
    pub async fn reservations_per_lab(&self) -> AppResult<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT l.name, COUNT(r.id)::bigint
            FROM labs l
            LEFT JOIN equipment e ON e.lab_id = l.id
            LEFT JOIN reservations r ON r.equipment_id = e.id
            GROUP BY l.id, l.name
            ORDER BY l.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
