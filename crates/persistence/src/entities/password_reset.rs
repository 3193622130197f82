//! Password reset token entity.

use chrono::{DateTime, Utc};
use domain::models::PasswordResetToken;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for password reset tokens. Only the token hash is stored.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetTokenEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl From<PasswordResetTokenEntity> for PasswordResetToken {
    fn from(entity: PasswordResetTokenEntity) -> Self {
        PasswordResetToken {
            id: entity.id,
            user_id: entity.user_id,
            token_hash: entity.token_hash,
            created_at: entity.created_at,
            expires_at: entity.expires_at,
            used: entity.used,
            ip_address: entity.ip_address,
            user_agent: entity.user_agent,
        }
    }
}
