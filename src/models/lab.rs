//! Laboratory model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Laboratory record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Lab {
    pub id: i32,
    pub name: String,
    /// Building / room
    pub location: Option<String>,
    /// Number of seats
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Create lab request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLab {
    #[validate(length(min = 1, max = 255, message = "Lab name is required"))]
    pub name: String,
    pub location: Option<String>,
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: Option<i32>,
    pub description: Option<String>,
}

/// Update lab request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLab {
    #[validate(length(min = 1, max = 255, message = "Lab name cannot be empty"))]
    pub name: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: Option<i32>,
    pub description: Option<String>,
}
