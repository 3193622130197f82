//! User entity.

use chrono::{DateTime, Utc};
use domain::models::User;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for staff user accounts.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        User {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            password_hash: entity.password_hash,
            first_name: entity.first_name,
            last_name: entity.last_name,
            is_active: entity.is_active,
            is_superuser: entity.is_superuser,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            last_login_at: entity.last_login_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let now = Utc::now();
        let entity = UserEntity {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: Some("hash".to_string()),
            first_name: None,
            last_name: None,
            is_active: true,
            is_superuser: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        let user: User = entity.into();
        assert_eq!(user.username, "admin");
        assert!(user.is_superuser);
    }
}
