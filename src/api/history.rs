//! Request history endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, models::history::HistoryEntry};

use super::{extract::AppPath, AuthenticatedUser};

/// Status changes of the caller's requests
#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "History entries, newest first", body = Vec<HistoryEntry>)
    )
)]
pub async fn list_mine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let entries = state.services.history.list_mine(&claims).await?;
    Ok(Json(entries))
}

/// Status changes of one request
#[utoipa::path(
    get,
    path = "/history/requests/{id}",
    tag = "history",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "History entries in order", body = Vec<HistoryEntry>),
        (status = 404, description = "Request not found")
    )
)]
pub async fn list_for_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let entries = state.services.history.list_for_request(&claims, id).await?;
    Ok(Json(entries))
}

/// Every status change (staff)
#[utoipa::path(
    get,
    path = "/history/admin/all",
    tag = "history",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All history entries", body = Vec<HistoryEntry>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_all(State(state): State<crate::AppState>) -> AppResult<Json<Vec<HistoryEntry>>> {
    let entries = state.services.history.list_all().await?;
    Ok(Json(entries))
}
