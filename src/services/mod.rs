//! Business logic services

pub mod history;
pub mod labs;
pub mod reports;
pub mod requests;
pub mod users;

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::UserClaims,
    repository::{users::AccountDirectory, Repository},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub labs: labs::LabsService,
    pub requests: requests::RequestsService,
    pub history: history::HistoryService,
    pub reports: reports::ReportsService,
    accounts: Arc<dyn AccountDirectory>,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            labs: labs::LabsService::new(repository.clone()),
            requests: requests::RequestsService::new(repository.clone()),
            history: history::HistoryService::new(repository.clone()),
            reports: reports::ReportsService::new(repository.clone()),
            accounts: Arc::new(repository.users.clone()),
            repository,
        }
    }

    /// Replace the account lookup used by [`Services::current_caller`]
    pub fn with_accounts(mut self, accounts: Arc<dyn AccountDirectory>) -> Self {
        self.accounts = accounts;
        self
    }

    /// Check decoded token claims against the stored account. Disabled or
    /// deleted accounts are rejected; the stored role replaces the one
    /// carried by the token.
    pub async fn current_caller(&self, mut claims: UserClaims) -> AppResult<UserClaims> {
        let status = self
            .accounts
            .account_status(claims.user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("Account no longer exists".to_string()))?;

        if !status.active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        claims.role = status.role;
        Ok(claims)
    }

    /// Database round trip used by the health endpoint
    pub async fn ping_database(&self) -> AppResult<std::time::Duration> {
        self.repository.ping().await
    }
}
