//! Sidebar navigation and application shell

use axum::{
    extract::Path,
    response::Html,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::ui::{
    layout::FullLayout,
    nav::{resolve_sidebar, sidebar_items, NavLink},
};

use super::{extract::AppQuery, AuthenticatedUser};

const APP_TITLE: &str = "LabReserva";

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NavigationQuery {
    /// Current client-side path, used to mark the active entry
    pub path: Option<String>,
}

/// Sidebar entries for the caller's role
#[utoipa::path(
    get,
    path = "/navigation",
    tag = "navigation",
    security(("bearer_auth" = [])),
    params(NavigationQuery),
    responses(
        (status = 200, description = "Resolved sidebar entries", body = Vec<NavLink>)
    )
)]
pub async fn sidebar(
    AuthenticatedUser(claims): AuthenticatedUser,
    AppQuery(query): AppQuery<NavigationQuery>,
) -> Json<Vec<NavLink>> {
    let current = query.path.as_deref().unwrap_or("/");
    Json(resolve_sidebar(&sidebar_items(), Some(claims.role), current))
}

/// Application shell around the client router outlet. Only public entries
/// are rendered server side; the client replaces the sidebar once signed in.
pub async fn app_shell(path: Option<Path<String>>) -> Html<String> {
    let current = match path {
        Some(Path(path)) => format!("/{}", path.trim_start_matches('/')),
        None => "/".to_string(),
    };
    let layout = FullLayout::new(APP_TITLE, resolve_sidebar(&sidebar_items(), None, &current))
        .with_topbar("Reserva de laboratorios y equipos");
    Html(layout.render(""))
}
