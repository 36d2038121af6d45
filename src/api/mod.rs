//! API handlers for LabReserva REST endpoints

pub mod admin;
pub mod auth;
pub mod extract;
pub mod guard;
pub mod health;
pub mod history;
pub mod labs;
pub mod navigation;
pub mod openapi;
pub mod reports;
pub mod requests;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
    Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

use self::guard::{require_role, RoleGuard};

/// Extractor for the caller resolved by [`resolve_identity`]
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserClaims>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))
    }
}

/// Decode the bearer token, if any, and attach the claims to the request.
///
/// Requests without an Authorization header continue anonymously; a header
/// that is malformed, carries an invalid token, or belongs to a disabled
/// account is rejected with 401. The role comes from the stored account.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_try_get::<Authorization<Bearer>>()
        .map_err(|_| AppError::Authentication("Invalid authorization header format".to_string()))?;

    if let Some(Authorization(bearer)) = bearer {
        let claims = UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;
        let claims = state.services.current_caller(claims).await?;
        tracing::debug!(user_id = claims.user_id, role = %claims.role, "Caller identified");
        request.extensions_mut().insert(claims);
    }

    Ok(next.run(request).await)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

fn labs_routes() -> Router<AppState> {
    let admin_only = Router::new()
        .route("/", post(labs::create_lab))
        .route("/:id", put(labs::update_lab).delete(labs::delete_lab))
        .route_layer(middleware::from_fn_with_state(RoleGuard::admin(), require_role));

    let staff = Router::new()
        .route("/:id/equipment", post(labs::create_equipment))
        .route(
            "/equipment/:id",
            put(labs::update_equipment).delete(labs::delete_equipment),
        )
        .route_layer(middleware::from_fn_with_state(RoleGuard::staff(), require_role));

    let readers = Router::new()
        .route("/", get(labs::list_labs))
        .route("/:id", get(labs::get_lab))
        .route("/:id/equipment", get(labs::list_equipment));

    readers.merge(admin_only).merge(staff)
}

/// Static paths are registered ahead of the `/:id` routes so that
/// `/requests/admin/all` is never read as an id.
fn requests_routes() -> Router<AppState> {
    let staff = Router::new()
        .route("/admin/all", get(requests::list_all))
        .route("/:id/status", patch(requests::set_status))
        .route("/:id/approve", post(requests::approve))
        .route_layer(middleware::from_fn_with_state(RoleGuard::staff(), require_role));

    let callers = Router::new()
        .route("/", post(requests::create_request).get(requests::list_mine))
        .route(
            "/:id",
            get(requests::get_request)
                .patch(requests::update_request)
                .delete(requests::delete_request),
        );

    staff.merge(callers)
}

fn history_routes() -> Router<AppState> {
    let staff = Router::new()
        .route("/admin/all", get(history::list_all))
        .route_layer(middleware::from_fn_with_state(RoleGuard::staff(), require_role));

    Router::new()
        .route("/", get(history::list_mine))
        .route("/requests/:id", get(history::list_for_request))
        .merge(staff)
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/:id/role", put(admin::update_role))
        .route("/users/:id/active", put(admin::update_active))
        .route_layer(middleware::from_fn_with_state(RoleGuard::admin(), require_role))
}

fn reports_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(reports::summary))
        .route("/requests.xlsx", get(reports::export_requests))
        .route_layer(middleware::from_fn_with_state(RoleGuard::staff(), require_role))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health::health_check))
        .route("/navigation", get(navigation::sidebar))
        .route("/app", get(navigation::app_shell))
        .route("/app/*path", get(navigation::app_shell))
        .nest("/auth", auth_routes())
        .nest("/labs", labs_routes())
        .nest("/requests", requests_routes())
        .nest("/history", history_routes())
        // Reports are open to technicians, the rest of /admin is admin-only
        .nest("/admin/reports", reports_routes())
        .nest("/admin", admin_routes())
        .layer(middleware::from_fn_with_state(state.clone(), resolve_identity))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
