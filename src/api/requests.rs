//! Reservation request endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        request::{CreateRequest, Request, SetStatus, UpdateRequest},
        reservation::Reservation,
    },
    repository::requests::Approval,
};

use super::{
    extract::{AppJson, AppPath},
    AuthenticatedUser,
};

/// Approved request together with the reservation created for it
#[derive(Serialize, ToSchema)]
pub struct ApprovalResponse {
    pub request: Request,
    pub reservation: Reservation,
}

impl From<Approval> for ApprovalResponse {
    fn from(approval: Approval) -> Self {
        Self {
            request: approval.request,
            reservation: approval.reservation,
        }
    }
}

/// File a reservation request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = Request),
        (status = 400, description = "Invalid payload or time window", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(data): AppJson<CreateRequest>,
) -> AppResult<(StatusCode, Json<Request>)> {
    let request = state.services.requests.create(&claims, &data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List the caller's own requests
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Requests owned by the caller", body = Vec<Request>)
    )
)]
pub async fn list_mine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Request>>> {
    let requests = state.services.requests.list_mine(&claims).await?;
    Ok(Json(requests))
}

/// List every request (staff)
#[utoipa::path(
    get,
    path = "/requests/admin/all",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All requests, newest first", body = Vec<Request>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_all(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Request>>> {
    let requests = state.services.requests.list_all().await?;
    Ok(Json(requests))
}

/// Get a request by ID
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = Request),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Request>> {
    let request = state.services.requests.get(&claims, id).await?;
    Ok(Json(request))
}

/// Edit a pending request
#[utoipa::path(
    patch,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Request updated", body = Request),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    )
)]
pub async fn update_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
    AppJson(data): AppJson<UpdateRequest>,
) -> AppResult<Json<Request>> {
    let request = state.services.requests.update(&claims, id, &data).await?;
    Ok(Json(request))
}

/// Delete a request
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Only pending requests can be deleted by their owner")
    )
)]
pub async fn delete_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.services.requests.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change the status of a request (staff)
#[utoipa::path(
    patch,
    path = "/requests/{id}/status",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = SetStatus,
    responses(
        (status = 200, description = "Status changed", body = Request),
        (status = 400, description = "Unknown status, or approval requested through this endpoint"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
pub async fn set_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
    AppJson(data): AppJson<SetStatus>,
) -> AppResult<Json<Request>> {
    let request = state.services.requests.set_status(&claims, id, &data).await?;
    Ok(Json(request))
}

/// Approve a request and reserve its equipment (staff)
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request approved", body = ApprovalResponse),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request not pending, equipment unavailable or slot taken")
    )
)]
pub async fn approve(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ApprovalResponse>> {
    let approval = state.services.requests.approve(&claims, id).await?;
    Ok(Json(approval.into()))
}
