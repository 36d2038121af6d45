//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, health, history, labs, navigation, reports, requests};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabReserva API",
        version = "0.3.0",
        description = "Laboratory and equipment reservation REST API"
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::me,
        // Navigation
        navigation::sidebar,
        // Labs
        labs::list_labs,
        labs::get_lab,
        labs::create_lab,
        labs::update_lab,
        labs::delete_lab,
        labs::list_equipment,
        labs::create_equipment,
        labs::update_equipment,
        labs::delete_equipment,
        // Requests
        requests::create_request,
        requests::list_mine,
        requests::list_all,
        requests::get_request,
        requests::update_request,
        requests::delete_request,
        requests::set_status,
        requests::approve,
        // History
        history::list_mine,
        history::list_for_request,
        history::list_all,
        // Admin
        admin::list_users,
        admin::create_user,
        admin::update_role,
        admin::update_active,
        // Reports
        reports::summary,
        reports::export_requests,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::CreateUser,
            crate::models::user::UpdateRole,
            crate::models::user::UpdateActive,
            // Labs
            crate::models::lab::Lab,
            crate::models::lab::CreateLab,
            crate::models::lab::UpdateLab,
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentStatus,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Requests
            crate::models::request::Request,
            crate::models::request::RequestStatus,
            crate::models::request::CreateRequest,
            crate::models::request::UpdateRequest,
            crate::models::request::SetStatus,
            crate::models::reservation::Reservation,
            requests::ApprovalResponse,
            // History
            crate::models::history::HistoryEntry,
            // Reports
            crate::services::reports::ReportSummary,
            crate::services::reports::StatEntry,
            // Navigation
            crate::ui::nav::NavLink,
            crate::ui::nav::NavItem,
            crate::ui::nav::NavIcon,
            crate::ui::nav::NavTarget,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "navigation", description = "Sidebar navigation"),
        (name = "labs", description = "Laboratories and equipment"),
        (name = "requests", description = "Reservation requests"),
        (name = "history", description = "Request status history"),
        (name = "admin", description = "User administration"),
        (name = "reports", description = "Reports and exports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
