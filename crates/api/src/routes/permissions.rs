//! Permission management route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    Action, AuditActionKind, CreatePermissionRequest, PermissionCode, RecordActivityInput,
    Resource, UpdatePermissionRequest,
};
use persistence::repositories::PermissionRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};

/// Create permission routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_permissions).post(create_permission))
        .route(
            "/:permission_id",
            get(get_permission)
                .put(update_permission)
                .delete(delete_permission),
        )
}

/// List permissions.
///
/// GET /api/permisos/
#[axum::debug_handler]
async fn list_permissions(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Permission, Action::View),
        )
        .await?;

    let permissions = PermissionRepository::new(state.pool.clone()).list().await?;

    Ok((StatusCode::OK, Json(permissions)))
}

/// Get one permission.
///
/// GET /api/permisos/{id}/
#[axum::debug_handler]
async fn get_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<Uuid>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Permission, Action::View),
        )
        .await?;

    let permission = PermissionRepository::new(state.pool.clone())
        .find_by_id(permission_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Permission not found".to_string()))?;

    Ok((StatusCode::OK, Json(permission)))
}

/// Create a permission for one of the closed codes.
///
/// POST /api/permisos/
#[axum::debug_handler]
async fn create_permission(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<CreatePermissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Permission, Action::Create),
        )
        .await?;

    // The code set is closed; unknown codes are rejected here
    let code = PermissionCode::from_str(&request.code).map_err(ApiError::Validation)?;

    let repo = PermissionRepository::new(state.pool.clone());
    if repo.find_by_code(code).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Permission with code '{}' already exists",
            code
        )));
    }

    let permission = repo
        .create(code, &request.name, request.description.as_deref())
        .await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::CreatePermission,
                format!("Creó permiso {}", permission.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"permissionId": permission.id, "code": request.code})),
        )
        .await;

    Ok((StatusCode::CREATED, Json(permission)))
}

/// Update a permission's display fields. The code is immutable.
///
/// PUT /api/permisos/{id}/
#[axum::debug_handler]
async fn update_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<UpdatePermissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Permission, Action::Update),
        )
        .await?;

    let permission = PermissionRepository::new(state.pool.clone())
        .update(
            permission_id,
            request.name.as_deref(),
            request.description.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Permission not found".to_string()))?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::UpdatePermission,
                format!("Actualizó permiso {}", permission.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"permissionId": permission.id})),
        )
        .await;

    Ok((StatusCode::OK, Json(permission)))
}

/// Delete a permission. Rejected while any role still references it.
///
/// DELETE /api/permisos/{id}/
#[axum::debug_handler]
async fn delete_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Permission, Action::Delete),
        )
        .await?;

    let repo = PermissionRepository::new(state.pool.clone());
    let permission = repo
        .find_by_id(permission_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Permission not found".to_string()))?;

    let referencing = repo.roles_referencing(permission_id).await?;
    if referencing > 0 {
        return Err(ApiError::Conflict(format!(
            "Cannot delete permission: {} role(s) still reference it",
            referencing
        )));
    }

    if !repo.delete(permission_id).await? {
        return Err(ApiError::NotFound("Permission not found".to_string()));
    }

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::DeletePermission,
                format!("Eliminó permiso {}", permission.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"permissionId": permission_id})),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_creation() {
        let _router: Router<AppState> = router();
    }
}
