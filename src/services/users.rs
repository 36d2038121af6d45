//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate a user by email and password and return a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        if !user.active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = user.id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    /// Create JWT token for a user
    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Create a user account (admin)
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;
        let hash = self.hash_password(&data.password)?;
        let role = data.role.unwrap_or(Role::Estudiante);
        let user = self
            .repository
            .users
            .create(&data.email, &hash, data.full_name.trim(), role)
            .await?;
        tracing::info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Change a user's role. Admins cannot demote themselves.
    pub async fn update_role(&self, actor: &UserClaims, id: i32, role: Role) -> AppResult<User> {
        if actor.user_id == id && role != Role::Admin {
            return Err(AppError::Conflict(
                "Administrators cannot remove their own admin role".to_string(),
            ));
        }
        let user = self.repository.users.update_role(id, role).await?;
        tracing::info!(user_id = id, role = %role, changed_by = actor.user_id, "User role changed");
        Ok(user)
    }

    /// Enable or disable an account. Admins cannot disable themselves.
    pub async fn update_active(&self, actor: &UserClaims, id: i32, active: bool) -> AppResult<User> {
        if actor.user_id == id && !active {
            return Err(AppError::Conflict(
                "Administrators cannot disable their own account".to_string(),
            ));
        }
        self.repository.users.update_active(id, active).await
    }

    /// Create the configured bootstrap administrator when no admin exists yet
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (
            self.config.bootstrap_admin_email.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.users.count_by_role(Role::Admin).await? > 0 {
            return Ok(());
        }

        let hash = self.hash_password(password)?;
        let user = self
            .repository
            .users
            .create(email, &hash, "Administrador", Role::Admin)
            .await?;
        tracing::warn!(user_id = user.id, email = %user.email, "Bootstrap administrator created");
        Ok(())
    }
}
