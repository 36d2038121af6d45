//! Administrative reports

use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    export::Row,
    models::request::{Request, RequestStatus},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatEntry {
    pub label: String,
    pub value: i64,
}

/// Request and reservation summary
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportSummary {
    pub total_requests: i64,
    /// One entry per status, zero counts included
    pub requests_by_status: Vec<StatEntry>,
    pub reservations_by_lab: Vec<StatEntry>,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn summary(&self) -> AppResult<ReportSummary> {
        let counts = self.repository.requests.count_by_status().await?;
        let requests_by_status = status_breakdown(&counts);
        let total_requests = requests_by_status.iter().map(|e| e.value).sum();

        let reservations_by_lab = self
            .repository
            .labs
            .reservations_per_lab()
            .await?
            .into_iter()
            .map(|(label, value)| StatEntry { label, value })
            .collect();

        Ok(ReportSummary {
            total_requests,
            requests_by_status,
            reservations_by_lab,
        })
    }

    /// Every request as spreadsheet rows
    pub async fn request_rows(&self) -> AppResult<Vec<Row>> {
        let requests = self.repository.requests.list_all().await?;
        Ok(requests.iter().map(request_row).collect())
    }
}

fn status_breakdown(counts: &[(RequestStatus, i64)]) -> Vec<StatEntry> {
    RequestStatus::ALL
        .iter()
        .map(|status| StatEntry {
            label: status.to_string(),
            value: counts
                .iter()
                .find(|(s, _)| s == status)
                .map(|(_, n)| *n)
                .unwrap_or(0),
        })
        .collect()
}

fn request_row(request: &Request) -> Row {
    let mut row = Row::new();
    row.insert("id".to_string(), json!(request.id));
    row.insert("usuario".to_string(), json!(request.user_id));
    row.insert("equipo".to_string(), json!(request.equipment_id));
    row.insert("motivo".to_string(), json!(request.purpose));
    row.insert("inicio".to_string(), json!(request.start_at.to_rfc3339()));
    row.insert("fin".to_string(), json!(request.end_at.to_rfc3339()));
    row.insert("estado".to_string(), json!(request.status.as_str()));
    row.insert("revisado_por".to_string(), json!(request.reviewed_by));
    row.insert("notas".to_string(), json!(request.notes));
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn breakdown_lists_every_status() {
        let counts = vec![(RequestStatus::Aprobada, 3), (RequestStatus::Pendiente, 2)];
        let entries = status_breakdown(&counts);
        assert_eq!(entries.len(), RequestStatus::ALL.len());
        assert_eq!(entries[0].label, "pendiente");
        assert_eq!(entries[0].value, 2);
        assert_eq!(entries[1].value, 3);
        assert_eq!(entries[4].value, 0);
    }

    #[test]
    fn request_rows_keep_a_fixed_column_order() {
        let now = Utc::now();
        let request = Request {
            id: 9,
            user_id: 4,
            equipment_id: 2,
            purpose: "Práctica de óptica".to_string(),
            start_at: now,
            end_at: now + Duration::hours(2),
            status: RequestStatus::Pendiente,
            notes: None,
            reviewed_by: None,
            reviewed_at: None,
            crea_date: now,
            modif_date: None,
        };
        let row = request_row(&request);
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["id", "usuario", "equipo", "motivo", "inicio", "fin", "estado", "revisado_por", "notas"]
        );
        assert!(row["notas"].is_null());
    }
}
