//! Laboratory and equipment endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        lab::{CreateLab, Lab, UpdateLab},
    },
};

use super::{
    extract::{AppJson, AppPath},
    AuthenticatedUser,
};

/// List laboratories
#[utoipa::path(
    get,
    path = "/labs",
    tag = "labs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Laboratory list", body = Vec<Lab>)
    )
)]
pub async fn list_labs(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Lab>>> {
    let labs = state.services.labs.list().await?;
    Ok(Json(labs))
}

/// Get a laboratory by ID
#[utoipa::path(
    get,
    path = "/labs/{id}",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Laboratory ID")),
    responses(
        (status = 200, description = "Laboratory details", body = Lab),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn get_lab(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Lab>> {
    let lab = state.services.labs.get_by_id(id).await?;
    Ok(Json(lab))
}

/// Create a laboratory
#[utoipa::path(
    post,
    path = "/labs",
    tag = "labs",
    security(("bearer_auth" = [])),
    request_body = CreateLab,
    responses(
        (status = 201, description = "Laboratory created", body = Lab),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn create_lab(
    State(state): State<crate::AppState>,
    AppJson(data): AppJson<CreateLab>,
) -> AppResult<(StatusCode, Json<Lab>)> {
    let lab = state.services.labs.create(&data).await?;
    Ok((StatusCode::CREATED, Json(lab)))
}

/// Update a laboratory
#[utoipa::path(
    put,
    path = "/labs/{id}",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Laboratory ID")),
    request_body = UpdateLab,
    responses(
        (status = 200, description = "Laboratory updated", body = Lab),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn update_lab(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(data): AppJson<UpdateLab>,
) -> AppResult<Json<Lab>> {
    let lab = state.services.labs.update(id, &data).await?;
    Ok(Json(lab))
}

/// Delete a laboratory and its equipment
#[utoipa::path(
    delete,
    path = "/labs/{id}",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Laboratory ID")),
    responses(
        (status = 204, description = "Laboratory deleted"),
        (status = 409, description = "Laboratory equipment is referenced by requests")
    )
)]
pub async fn delete_lab(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.services.labs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the equipment of a laboratory
#[utoipa::path(
    get,
    path = "/labs/{id}/equipment",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Laboratory ID")),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.labs.list_equipment(id).await?;
    Ok(Json(equipment))
}

/// Add equipment to a laboratory
#[utoipa::path(
    post,
    path = "/labs/{id}/equipment",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Laboratory ID")),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 409, description = "Serial number already registered")
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(data): AppJson<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    let equipment = state.services.labs.create_equipment(id, &data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/labs/equipment/{id}",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment)
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(data): AppJson<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.labs.update_equipment(id, &data).await?;
    Ok(Json(equipment))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/labs/equipment/{id}",
    tag = "labs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 409, description = "Equipment is referenced by requests")
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.services.labs.delete_equipment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
