//! Password reset token domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_password_strength;

/// A single-use password reset token.
///
/// Only the SHA-256 hash of the opaque token value is stored. Expiry is
/// derived from the clock, not a stored state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl PasswordResetToken {
    /// A token is valid while unused and before its expiry.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.used && now < self.expires_at
    }
}

/// Validity window for reset tokens.
pub const RESET_TOKEN_TTL_SECS: i64 = 3600;

/// Request body for the forgot-password endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Request body for the reset-password endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

/// Request body for the authenticated change-password endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_token(created: DateTime<Utc>) -> PasswordResetToken {
        PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "a".repeat(64),
            created_at: created,
            expires_at: created + Duration::seconds(RESET_TOKEN_TTL_SECS),
            used: false,
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: None,
        }
    }

    #[test]
    fn test_token_valid_within_window() {
        let now = Utc::now();
        let token = sample_token(now);
        assert!(token.is_valid(now + Duration::minutes(30)));
    }

    #[test]
    fn test_token_invalid_after_expiry() {
        let now = Utc::now();
        let token = sample_token(now);
        assert!(!token.is_valid(now + Duration::minutes(61)));
    }

    #[test]
    fn test_token_invalid_once_used() {
        let now = Utc::now();
        let mut token = sample_token(now);
        token.used = true;
        assert!(!token.is_valid(now));
    }

    #[test]
    fn test_token_hash_not_serialized() {
        let token = sample_token(Utc::now());
        let json = serde_json::to_string(&token).unwrap();
        assert!(!json.contains("tokenHash"));
    }

    #[test]
    fn test_reset_request_requires_strong_password() {
        let request = ResetPasswordRequest {
            token: "abc".to_string(),
            new_password: "weak".to_string(),
        };
        assert!(request.validate().is_err());

        let request = ResetPasswordRequest {
            token: "abc".to_string(),
            new_password: "Fuerte123".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
