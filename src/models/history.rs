//! Request status history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::request::RequestStatus;

/// One status change of a request
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HistoryEntry {
    pub id: i32,
    /// None once the request has been deleted
    pub request_id: Option<i32>,
    /// None for the creation entry
    pub from_status: Option<RequestStatus>,
    pub to_status: RequestStatus,
    pub changed_by: Option<i32>,
    pub comment: Option<String>,
    pub changed_at: DateTime<Utc>,
}
