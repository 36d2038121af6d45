//! Report endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::AppResult, export::Spreadsheet, services::reports::ReportSummary};

use super::extract::AppQuery;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Download name; `.xlsx` is appended when missing
    pub filename: Option<String>,
}

/// Request and reservation summary (staff)
#[utoipa::path(
    get,
    path = "/admin/reports/summary",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Summary", body = ReportSummary),
        (status = 403, description = "Staff only")
    )
)]
pub async fn summary(State(state): State<crate::AppState>) -> AppResult<Json<ReportSummary>> {
    let summary = state.services.reports.summary().await?;
    Ok(Json(summary))
}

/// Download every request as a spreadsheet (staff)
#[utoipa::path(
    get,
    path = "/admin/reports/requests.xlsx",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(ExportQuery),
    responses(
        (status = 200, description = "Workbook download",
         content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn export_requests(
    State(state): State<crate::AppState>,
    AppQuery(query): AppQuery<ExportQuery>,
) -> AppResult<Spreadsheet> {
    let rows = state.services.reports.request_rows().await?;
    let export = &state.config.export;
    let spreadsheet = Spreadsheet::download(
        &rows,
        query.filename.as_deref(),
        &export.default_filename,
        &export.sheet_name,
    )?;
    tracing::info!(rows = rows.len(), filename = %spreadsheet.filename, "Requests exported");
    Ok(spreadsheet)
}
