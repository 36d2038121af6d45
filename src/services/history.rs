//! Request history service

use crate::{
    error::AppResult,
    models::{history::HistoryEntry, user::UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct HistoryService {
    repository: Repository,
}

impl HistoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Status changes of the caller's own requests
    pub async fn list_mine(&self, caller: &UserClaims) -> AppResult<Vec<HistoryEntry>> {
        self.repository.history.list_for_owner(caller.user_id).await
    }

    /// Status changes of one request visible to the caller
    pub async fn list_for_request(&self, caller: &UserClaims, request_id: i32) -> AppResult<Vec<HistoryEntry>> {
        // Reuses the request visibility rule
        super::requests::visible_request(&self.repository, caller, request_id).await?;
        self.repository.history.list_for_request(request_id).await
    }

    pub async fn list_all(&self) -> AppResult<Vec<HistoryEntry>> {
        self.repository.history.list_all().await
    }
}
