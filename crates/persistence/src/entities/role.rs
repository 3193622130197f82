//! Role, permission and assignment entities.

use chrono::{DateTime, Utc};
use domain::models::{Permission, PermissionCode, Role};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for roles.
#[derive(Debug, Clone, FromRow)]
pub struct RoleEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<RoleEntity> for Role {
    fn from(entity: RoleEntity) -> Self {
        Role {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}

/// Database entity for permissions. The code column holds one of the
/// closed permission codes.
#[derive(Debug, Clone, FromRow)]
pub struct PermissionEntity {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<PermissionEntity> for Permission {
    fn from(entity: PermissionEntity) -> Self {
        Permission {
            id: entity.id,
            // Rows are written from the closed set; an unknown value can only
            // come from manual edits and is surfaced as view_permissions
            code: entity
                .code
                .parse::<PermissionCode>()
                .unwrap_or(PermissionCode::ViewPermissions),
            name: entity.name,
            description: entity.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_entity_parses_code() {
        let entity = PermissionEntity {
            id: Uuid::new_v4(),
            code: "manage_roles".to_string(),
            name: "Gestionar Roles".to_string(),
            description: None,
        };

        let permission: Permission = entity.into();
        assert_eq!(permission.code, PermissionCode::ManageRoles);
    }

    #[test]
    fn test_role_entity_to_domain() {
        let entity = RoleEntity {
            id: Uuid::new_v4(),
            name: "Instructor".to_string(),
            description: Some("Dicta clases".to_string()),
            is_active: true,
            created_at: Utc::now(),
        };

        let role: Role = entity.into();
        assert_eq!(role.name, "Instructor");
        assert!(role.is_active);
    }
}
