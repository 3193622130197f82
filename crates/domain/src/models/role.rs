//! Role domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::permission::Permission;

/// A role groups permissions and is assigned to users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A role together with its permissions and assignment count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub permissions: Vec<Permission>,
    pub users_count: i64,
}

/// Request body for creating a role.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// Permissions linked to the role; every id must exist
    #[serde(default)]
    pub permissions: Vec<Uuid>,
}

/// Request body for updating a role.
///
/// When `permissions` is present the whole permission set is replaced.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub is_active: Option<bool>,

    pub permissions: Option<Vec<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_role_request_validation() {
        let request = CreateRoleRequest {
            name: "Recepcionista".to_string(),
            description: Some("Atiende el mostrador".to_string()),
            permissions: vec![Uuid::new_v4()],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_role_request_empty_name() {
        let request = CreateRoleRequest {
            name: String::new(),
            description: None,
            permissions: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_role_request_long_name() {
        let request = CreateRoleRequest {
            name: "R".repeat(51),
            description: None,
            permissions: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_role_serializes_camel_case() {
        let role = Role {
            id: Uuid::new_v4(),
            name: "Instructor".to_string(),
            description: None,
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&role).unwrap();
        assert!(json.contains("isActive"));
        assert!(json.contains("createdAt"));
    }
}
