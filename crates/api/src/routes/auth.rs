//! Authentication routes: token issuance and refresh, logout, user info,
//! profile, and the password flows.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use domain::models::{
    AuditActionKind, ChangePasswordRequest, ForgotPasswordRequest, RecordActivityInput,
    ResetPasswordRequest, RoleRef, Severity, UpdateProfileRequest, User,
};
use persistence::repositories::{RoleRepository, UserRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};
use crate::services::auth::{AuthError, AuthService};

/// Request body for the token endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response body for token issuance and refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Request body carrying a refresh token.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh: String,
}

/// User info response with roles and the effective permission set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<RoleRef>,
    pub permissions: Vec<String>,
}

fn map_auth_error(e: AuthError) -> ApiError {
    match e {
        AuthError::InvalidCredentials => {
            ApiError::Unauthorized("Invalid username or password".to_string())
        }
        AuthError::UserDisabled => ApiError::Unauthorized("Account is disabled".to_string()),
        AuthError::InvalidRefreshToken | AuthError::SessionNotFound => {
            ApiError::Unauthorized("Invalid or expired refresh token".to_string())
        }
        AuthError::InvalidResetToken => {
            ApiError::Validation("Invalid or already used reset token".to_string())
        }
        AuthError::ExpiredResetToken => {
            ApiError::Validation("Reset token has expired".to_string())
        }
        AuthError::UserNotFound => ApiError::NotFound("User not found".to_string()),
        AuthError::DatabaseError(db_err) => ApiError::from(db_err),
        AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
        AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
        AuthError::Internal(msg) => ApiError::Internal(msg),
    }
}

/// Issue an access/refresh token pair.
///
/// POST /api/token/
#[axum::debug_handler]
pub async fn token(
    State(state): State<AppState>,
    context: RequestContext,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)
        .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))?;

    let result = auth_service
        .login(&request.username, &request.password)
        .await
        .map_err(map_auth_error)?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(AuditActionKind::Login, "Inicio de sesión")
                .with_user(result.user.id)
                .with_request_context(context.ip_address, context.user_agent),
        )
        .await;

    Ok(Json(TokenResponse {
        access: result.access_token,
        refresh: result.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: result.access_token_expires_in,
    }))
}

/// Rotate a refresh token.
///
/// POST /api/token/refresh/
#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)
        .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))?;

    let result = auth_service
        .refresh(&request.refresh)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(TokenResponse {
        access: result.access_token,
        refresh: result.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: result.expires_in,
    }))
}

/// End the current session.
///
/// POST /api/logout/
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    context: RequestContext,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)
        .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))?;

    let user_id = auth_service
        .logout(&request.refresh)
        .await
        .map_err(map_auth_error)?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(AuditActionKind::Logout, "Cierre de sesión")
                .with_user(user_id)
                .with_request_context(context.ip_address, context.user_agent),
        )
        .await;

    Ok(Json(json!({"detail": "Sesión cerrada"})))
}

/// Information about the authenticated user, including roles and the
/// deduplicated permission-code set across them.
///
/// GET /api/user-info/
#[axum::debug_handler]
pub async fn user_info(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<UserInfoResponse>, ApiError> {
    let user_repo = UserRepository::new(state.pool.clone());
    let role_repo = RoleRepository::new(state.pool.clone());

    let user = user_repo
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let roles = user_repo.roles_of(user.id).await?;
    let permissions = role_repo.permission_codes_of_user(user.id).await?;

    Ok(Json(UserInfoResponse {
        user,
        roles,
        permissions,
    }))
}

/// The caller's own profile.
///
/// GET /api/profile/
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<User>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update the caller's own profile.
///
/// PUT /api/profile/
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;

    let user = UserRepository::new(state.pool.clone())
        .update(
            auth.user_id,
            request.email.as_deref(),
            request.first_name.as_deref(),
            request.last_name.as_deref(),
            None,
            None,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(AuditActionKind::UpdateUser, "Actualizó su perfil")
                .with_user(auth.user_id)
                .with_request_context(context.ip_address, context.user_agent),
        )
        .await;

    Ok(Json(user))
}

/// Change the caller's password.
///
/// POST /api/change-password/
#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)
        .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))?;

    let user = auth_service
        .change_password(
            auth.user_id,
            &request.current_password,
            &request.new_password,
            &auth.jti,
        )
        .await
        .map_err(map_auth_error)?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(AuditActionKind::ChangePassword, "Cambio de contraseña")
                .with_user(user.id)
                .with_request_context(context.ip_address.clone(), context.user_agent),
        )
        .await;

    // Notification failure must not fail the response
    if let Err(e) = state
        .email
        .send_password_changed_email(&user.email, user.first_name.as_deref(), context.ip_address.as_deref())
        .await
    {
        tracing::error!(user_id = %user.id, error = %e, "Failed to send password changed email");
    }

    Ok(Json(json!({"detail": "Contraseña actualizada"})))
}

/// Request a password reset email.
///
/// POST /api/forgot-password/ (unauthenticated)
///
/// Returns the same success message whether or not the email exists, to
/// avoid user enumeration. The unknown-email path still records an audit
/// entry for security monitoring.
#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    context: RequestContext,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)
        .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))?;

    let issued = auth_service
        .forgot_password(
            &request.email,
            context.ip_address.as_deref(),
            context.user_agent.as_deref(),
        )
        .await
        .map_err(map_auth_error)?;

    match issued {
        Some((user, reset_token)) => {
            // Delivery failure must not fail the response, and must not
            // change the body either
            if let Err(e) = state
                .email
                .send_password_reset_email(&user.email, user.first_name.as_deref(), &reset_token)
                .await
            {
                tracing::error!(user_id = %user.id, error = %e, "Failed to send password reset email");
            }

            state
                .audit
                .record_or_log(
                    RecordActivityInput::new(
                        AuditActionKind::ForgotPassword,
                        "Solicitud de recuperación de contraseña",
                    )
                    .with_user(user.id)
                    .with_request_context(context.ip_address, context.user_agent),
                )
                .await;
        }
        None => {
            state
                .audit
                .record_or_log(
                    RecordActivityInput::new(
                        AuditActionKind::ForgotPassword,
                        "Solicitud de recuperación para correo desconocido",
                    )
                    .with_severity(Severity::Warning)
                    .with_description(format!("Correo: {}", request.email))
                    .with_request_context(context.ip_address, context.user_agent),
                )
                .await;
        }
    }

    Ok(Json(json!({
        "detail": "Si el correo está registrado, recibirás un enlace de recuperación"
    })))
}

/// Consume a reset token and set a new password.
///
/// POST /api/reset-password/ (unauthenticated)
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    context: RequestContext,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)
        .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))?;

    let user = auth_service
        .reset_password(&request.token, &request.new_password)
        .await
        .map_err(map_auth_error)?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::ResetPassword,
                "Contraseña restablecida con token de recuperación",
            )
            .with_user(user.id)
            .with_request_context(context.ip_address.clone(), context.user_agent),
        )
        .await;

    if let Err(e) = state
        .email
        .send_password_changed_email(&user.email, user.first_name.as_deref(), context.ip_address.as_deref())
        .await
    {
        tracing::error!(user_id = %user.id, error = %e, "Failed to send password changed email");
    }

    Ok(Json(json!({"detail": "Contraseña restablecida"})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_validation() {
        let request = TokenRequest {
            username: "admin".to_string(),
            password: "Segura123".to_string(),
        };
        assert!(request.validate().is_ok());

        let empty = TokenRequest {
            username: String::new(),
            password: String::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_map_auth_error_status_kinds() {
        assert!(matches!(
            map_auth_error(AuthError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            map_auth_error(AuthError::InvalidResetToken),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            map_auth_error(AuthError::ExpiredResetToken),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            map_auth_error(AuthError::SessionNotFound),
            ApiError::Unauthorized(_)
        ));
    }
}
