//! User model, roles and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::text_enum_sqlx;
use crate::error::AppError;

/// Caller role. Staff roles (`tecnico`, `admin`) review requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Estudiante,
    Docente,
    Tecnico,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Estudiante, Role::Docente, Role::Tecnico, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Estudiante => "estudiante",
            Role::Docente => "docente",
            Role::Tecnico => "tecnico",
            Role::Admin => "admin",
        }
    }

    /// Technicians and administrators
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Tecnico | Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "estudiante" => Ok(Role::Estudiante),
            "docente" => Ok(Role::Docente),
            "tecnico" => Ok(Role::Tecnico),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

text_enum_sqlx!(Role);

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub active: bool,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Create user request (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,
    /// Defaults to `estudiante`
    pub role: Option<Role>,
}

/// Change a user's role (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRole {
    pub role: Role,
}

/// Enable or disable a user account (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateActive {
    pub active: bool,
}

/// Role and active flag of an account as currently stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct AccountStatus {
    pub role: Role,
    pub active: bool,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Whether the caller may see a resource owned by `owner_id`
    pub fn can_view(&self, owner_id: i32) -> bool {
        self.user_id == owner_id || self.is_staff()
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization("Technician or administrator role required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, user_id: i32) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: format!("user{}@lab.test", user_id),
            user_id,
            role,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("TECNICO".parse::<Role>(), Ok(Role::Tecnico));
        assert_eq!(" admin ".parse::<Role>(), Ok(Role::Admin));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn token_round_trip_keeps_role() {
        let original = claims(Role::Tecnico, 7);
        let token = original.create_token("secret").unwrap();
        let decoded = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.role, Role::Tecnico);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn plain_users_only_view_their_own_resources() {
        let student = claims(Role::Estudiante, 1);
        assert!(student.can_view(1));
        assert!(!student.can_view(2));
        assert!(claims(Role::Tecnico, 3).can_view(2));
        assert!(student.require_staff().is_err());
    }
}
