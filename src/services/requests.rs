//! Reservation request service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        request::{validate_window, CreateRequest, Request, SetStatus, UpdateRequest},
        user::UserClaims,
    },
    repository::{requests::Approval, Repository},
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

/// Load a request the caller may see. Requests owned by someone else are
/// reported as missing to plain users, so their existence does not leak.
pub(crate) async fn visible_request(
    repository: &Repository,
    caller: &UserClaims,
    id: i32,
) -> AppResult<Request> {
    let request = repository.requests.get_by_id(id).await?;
    if !caller.can_view(request.user_id) {
        return Err(AppError::NotFound(format!("Request {} not found", id)));
    }
    Ok(request)
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// File a new request owned by the caller
    pub async fn create(&self, caller: &UserClaims, data: &CreateRequest) -> AppResult<Request> {
        data.validate()?;
        validate_window(data.start_at, data.end_at)?;
        self.repository.equipment.get_by_id(data.equipment_id).await?;

        let request = self.repository.requests.create(caller.user_id, data).await?;
        tracing::info!(request_id = request.id, user_id = caller.user_id, "Request created");
        Ok(request)
    }

    pub async fn list_mine(&self, caller: &UserClaims) -> AppResult<Vec<Request>> {
        self.repository.requests.list_by_owner(caller.user_id).await
    }

    pub async fn list_all(&self) -> AppResult<Vec<Request>> {
        self.repository.requests.list_all().await
    }

    pub async fn get(&self, caller: &UserClaims, id: i32) -> AppResult<Request> {
        visible_request(&self.repository, caller, id).await
    }

    pub async fn update(&self, caller: &UserClaims, id: i32, data: &UpdateRequest) -> AppResult<Request> {
        data.validate()?;
        if data.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        visible_request(&self.repository, caller, id).await?;
        if let Some(equipment_id) = data.equipment_id {
            self.repository.equipment.get_by_id(equipment_id).await?;
        }
        self.repository.requests.update(id, data).await
    }

    /// Owners may delete their pending requests; staff may delete any request
    pub async fn delete(&self, caller: &UserClaims, id: i32) -> AppResult<()> {
        visible_request(&self.repository, caller, id).await?;
        self.repository.requests.delete(id, !caller.is_staff()).await?;
        tracing::info!(request_id = id, deleted_by = caller.user_id, "Request deleted");
        Ok(())
    }

    pub async fn set_status(&self, caller: &UserClaims, id: i32, data: &SetStatus) -> AppResult<Request> {
        caller.require_staff()?;
        let next = data.parsed_status()?;
        let request = self
            .repository
            .requests
            .set_status(id, next, caller.user_id, data.comment.as_deref())
            .await?;
        tracing::info!(request_id = id, status = %next, changed_by = caller.user_id, "Request status changed");
        Ok(request)
    }

    /// Approve a request and reserve its equipment atomically
    pub async fn approve(&self, caller: &UserClaims, id: i32) -> AppResult<Approval> {
        caller.require_staff()?;
        let approval = self.repository.requests.approve(id, caller.user_id).await?;
        tracing::info!(
            request_id = id,
            reservation_id = approval.reservation.id,
            equipment_id = approval.reservation.equipment_id,
            approved_by = caller.user_id,
            "Request approved"
        );
        Ok(approval)
    }
}
