//! Role-based access guard

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, UserClaims},
};

/// Set of roles allowed through a group of routes.
///
/// Each guard is independent; attach it with
/// `middleware::from_fn_with_state(guard, require_role)`.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Arc<HashSet<Role>>,
}

impl RoleGuard {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: Arc::new(roles.into_iter().collect()),
        }
    }

    /// Technicians and administrators
    pub fn staff() -> Self {
        Self::new([Role::Tecnico, Role::Admin])
    }

    pub fn admin() -> Self {
        Self::new([Role::Admin])
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// 401 without an identity, 403 with a role outside the set
    pub fn check(&self, caller: Option<&UserClaims>) -> AppResult<()> {
        let caller = caller
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        if self.allows(caller.role) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Role {} is not allowed to perform this action",
                caller.role
            )))
        }
    }
}

/// Middleware rejecting callers whose resolved role is not in the guard's set
pub async fn require_role(
    State(guard): State<RoleGuard>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(err) = guard.check(request.extensions().get::<UserClaims>()) {
        tracing::debug!(path = %request.uri().path(), error = %err, "Request rejected by role guard");
        return Err(err);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role) -> UserClaims {
        UserClaims {
            sub: "someone@lab.test".to_string(),
            user_id: 1,
            role,
            exp: i64::MAX,
            iat: 0,
        }
    }

    #[test]
    fn missing_identity_is_an_authentication_error() {
        let err = RoleGuard::staff().check(None).unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[test]
    fn roles_outside_the_set_are_forbidden() {
        let guard = RoleGuard::staff();
        for role in [Role::Estudiante, Role::Docente] {
            let err = guard.check(Some(&caller(role))).unwrap_err();
            assert!(matches!(err, AppError::Authorization(_)));
        }
        for role in [Role::Tecnico, Role::Admin] {
            assert!(guard.check(Some(&caller(role))).is_ok());
        }
    }

    #[test]
    fn guards_are_independent() {
        let admin = RoleGuard::admin();
        let docentes = RoleGuard::new([Role::Docente]);
        assert!(!admin.allows(Role::Tecnico));
        assert!(docentes.allows(Role::Docente));
        assert!(!docentes.allows(Role::Admin));
    }
}
