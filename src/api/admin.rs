//! User administration endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateActive, UpdateRole, User},
};

use super::{
    extract::{AppJson, AppPath},
    AuthenticatedUser,
};

/// List user accounts
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User list", body = Vec<User>),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn list_users(State(state): State<crate::AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Create a user account
#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AppJson(data): AppJson<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.users.create_user(data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Role changed", body = User),
        (status = 409, description = "Administrators cannot demote themselves")
    )
)]
pub async fn update_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
    AppJson(data): AppJson<UpdateRole>,
) -> AppResult<Json<User>> {
    let user = state.services.users.update_role(&claims, id, data.role).await?;
    Ok(Json(user))
}

/// Enable or disable a user account
#[utoipa::path(
    put,
    path = "/admin/users/{id}/active",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateActive,
    responses(
        (status = 200, description = "Account updated", body = User),
        (status = 409, description = "Administrators cannot disable themselves")
    )
)]
pub async fn update_active(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i32>,
    AppJson(data): AppJson<UpdateActive>,
) -> AppResult<Json<User>> {
    let user = state.services.users.update_active(&claims, id, data.active).await?;
    Ok(Json(user))
}
