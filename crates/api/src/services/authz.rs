//! Authorization evaluator.
//!
//! The single place where permission checks are decided. The superuser
//! bypass lives only here; handlers never consult the flag themselves.

use persistence::repositories::{RoleRepository, UserRepository};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::PermissionCode;

use crate::error::ApiError;

/// Evaluates whether a user may perform a permission-gated action.
#[derive(Clone)]
pub struct AuthzService {
    users: UserRepository,
    roles: RoleRepository,
}

impl AuthzService {
    /// Create a new evaluator over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            roles: RoleRepository::new(pool),
        }
    }

    /// Decide allow/deny for a user and permission code.
    ///
    /// Superusers pass unconditionally. Otherwise the user's role
    /// assignments are checked for a link to the permission. Lookup faults
    /// are logged and treated as deny (fail-closed). No side effects, no
    /// caching: every call re-queries the join tables.
    pub async fn has_permission(&self, user_id: Uuid, code: PermissionCode) -> bool {
        let user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Authorization lookup failed, denying");
                return false;
            }
        };

        if !user.is_active {
            return false;
        }

        if user.is_superuser {
            return true;
        }

        match self.roles.user_has_permission(user_id, code).await {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!(user_id = %user_id, code = %code, error = %e, "Authorization lookup failed, denying");
                false
            }
        }
    }

    /// Require a permission; returns `ApiError::Forbidden` on deny.
    ///
    /// The denied code is carried in the error for logging; the response
    /// body never exposes it.
    pub async fn require(&self, user_id: Uuid, code: PermissionCode) -> Result<(), ApiError> {
        if self.has_permission(user_id, code).await {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "Missing permission: {}",
                code
            )))
        }
    }
}
