//! Reservation request ("solicitud") model and its status machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::text_enum_sqlx;
use crate::error::{AppError, AppResult};

/// Lifecycle of a request.
///
/// ```text
/// pendiente --approve--> aprobada --> completada
///     |                      |
///     +--> rechazada         +--> cancelada
///     +--> cancelada
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pendiente,
    Aprobada,
    Rechazada,
    Cancelada,
    Completada,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Pendiente,
        RequestStatus::Aprobada,
        RequestStatus::Rechazada,
        RequestStatus::Cancelada,
        RequestStatus::Completada,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pendiente => "pendiente",
            RequestStatus::Aprobada => "aprobada",
            RequestStatus::Rechazada => "rechazada",
            RequestStatus::Cancelada => "cancelada",
            RequestStatus::Completada => "completada",
        }
    }

    /// Transition table. `Pendiente -> Aprobada` is listed here but only
    /// the approval workflow may take it, since it must reserve equipment.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pendiente, Aprobada)
                | (Pendiente, Rechazada)
                | (Pendiente, Cancelada)
                | (Aprobada, Cancelada)
                | (Aprobada, Completada)
        )
    }

    pub fn is_terminal(&self) -> bool {
        RequestStatus::ALL
            .iter()
            .all(|next| !self.can_transition_to(*next))
    }

    /// Validate a manual status change (the `setStatus` operation)
    pub fn check_manual_transition(&self, next: RequestStatus) -> AppResult<()> {
        if next == RequestStatus::Aprobada {
            return Err(AppError::Validation(
                "Requests are approved through the approve action".to_string(),
            ));
        }
        if !self.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Cannot change request status from {} to {}",
                self, next
            )));
        }
        Ok(())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Ok(RequestStatus::Pendiente),
            "aprobada" => Ok(RequestStatus::Aprobada),
            "rechazada" => Ok(RequestStatus::Rechazada),
            "cancelada" => Ok(RequestStatus::Cancelada),
            "completada" => Ok(RequestStatus::Completada),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

text_enum_sqlx!(RequestStatus);

/// Request record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Request {
    pub id: i32,
    /// Owner
    pub user_id: i32,
    pub equipment_id: i32,
    pub purpose: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: RequestStatus,
    pub notes: Option<String>,
    pub reviewed_by: Option<i32>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Create request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    pub equipment_id: i32,
    #[validate(length(min = 3, max = 500, message = "Purpose must be 3 to 500 characters"))]
    pub purpose: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Partial update payload
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRequest {
    pub equipment_id: Option<i32>,
    #[validate(length(min = 3, max = 500, message = "Purpose must be 3 to 500 characters"))]
    pub purpose: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl UpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.equipment_id.is_none()
            && self.purpose.is_none()
            && self.start_at.is_none()
            && self.end_at.is_none()
            && self.notes.is_none()
    }
}

/// Status change payload. The status is taken as free text so that
/// unknown values surface as a validation error rather than a body
/// rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatus {
    pub status: String,
    pub comment: Option<String>,
}

impl SetStatus {
    pub fn parsed_status(&self) -> AppResult<RequestStatus> {
        self.status.parse().map_err(AppError::Validation)
    }
}

/// Ensure a reservation window is well formed
pub fn validate_window(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> AppResult<()> {
    if start_at >= end_at {
        return Err(AppError::Validation(
            "start_at must be earlier than end_at".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use RequestStatus::*;

    #[test]
    fn pending_requests_can_be_approved_rejected_or_cancelled() {
        assert!(Pendiente.can_transition_to(Aprobada));
        assert!(Pendiente.can_transition_to(Rechazada));
        assert!(Pendiente.can_transition_to(Cancelada));
        assert!(!Pendiente.can_transition_to(Completada));
    }

    #[test]
    fn finished_states_are_terminal() {
        assert!(Rechazada.is_terminal());
        assert!(Cancelada.is_terminal());
        assert!(Completada.is_terminal());
        assert!(!Pendiente.is_terminal());
        assert!(!Aprobada.is_terminal());
    }

    #[test]
    fn manual_approval_is_refused() {
        let err = Pendiente.check_manual_transition(Aprobada).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn illegal_transitions_are_conflicts() {
        let err = Rechazada.check_manual_transition(Pendiente).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(Aprobada.check_manual_transition(Completada).is_ok());
    }

    #[test]
    fn unknown_status_text_is_a_validation_error() {
        let payload = SetStatus {
            status: "archivada".to_string(),
            comment: None,
        };
        assert!(matches!(payload.parsed_status(), Err(AppError::Validation(_))));

        let payload = SetStatus {
            status: "Rechazada".to_string(),
            comment: None,
        };
        assert_eq!(payload.parsed_status().unwrap(), Rechazada);
    }

    #[test]
    fn window_must_be_ordered() {
        let now = Utc::now();
        assert!(validate_window(now, now + Duration::hours(1)).is_ok());
        assert!(validate_window(now, now).is_err());
        assert!(validate_window(now + Duration::hours(1), now).is_err());
    }
}
