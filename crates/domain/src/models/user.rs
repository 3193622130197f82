//! User account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::{validate_password_strength, validate_username};

/// A staff user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)] // Never serialize password hash to API responses
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Display name: full name when available, otherwise the username.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) if !first.is_empty() => format!("{} {}", first, last),
            (Some(first), None) if !first.is_empty() => first.clone(),
            _ => self.username.clone(),
        }
    }
}

/// Compact role reference attached to user responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub id: Uuid,
    pub name: String,
}

/// A user together with their assigned roles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<RoleRef>,
}

/// Request body for creating a user. Role assignment is part of creation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    /// Role to assign on creation
    pub rol: Uuid,
}

/// Request body for updating a user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    pub is_active: Option<bool>,

    /// Replacement role assignment
    pub rol: Option<Uuid>,
}

/// Request body for updating the caller's own profile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "cmendoza".to_string(),
            email: "cmendoza@example.com".to_string(),
            password_hash: Some("secret_hash".to_string()),
            first_name: Some("Carlos".to_string()),
            last_name: Some("Mendoza".to_string()),
            is_active: true,
            is_superuser: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let user = sample_user();
        assert_eq!(user.display_name(), "Carlos Mendoza");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = sample_user();
        user.first_name = None;
        user.last_name = None;
        assert_eq!(user.display_name(), "cmendoza");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret_hash"));
        assert!(!json.contains("passwordHash"));
    }

    #[test]
    fn test_create_user_request_validation() {
        let request = CreateUserRequest {
            username: "recepcion1".to_string(),
            email: "recepcion@example.com".to_string(),
            password: "Segura123".to_string(),
            first_name: Some("Ana".to_string()),
            last_name: None,
            rol: Uuid::new_v4(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_user_request_weak_password() {
        let request = CreateUserRequest {
            username: "recepcion1".to_string(),
            email: "recepcion@example.com".to_string(),
            password: "débil".to_string(),
            first_name: None,
            last_name: None,
            rol: Uuid::new_v4(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_user_request_bad_username() {
        let request = CreateUserRequest {
            username: "a b".to_string(),
            email: "x@example.com".to_string(),
            password: "Segura123".to_string(),
            first_name: None,
            last_name: None,
            rol: Uuid::new_v4(),
        };
        assert!(request.validate().is_err());
    }
}
