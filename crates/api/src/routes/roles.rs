//! Role management route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    Action, AuditActionKind, CreateRoleRequest, PermissionCode, RecordActivityInput, Resource,
    Role, RoleResponse, UpdateRoleRequest,
};
use persistence::repositories::{PermissionRepository, RoleRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};

/// Create role routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route(
            "/:role_id",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/:role_id/toggle_status", post(toggle_status))
}

async fn role_response(repo: &RoleRepository, role: Role) -> Result<RoleResponse, ApiError> {
    let permissions = repo.permissions_of(role.id).await?;
    let users_count = repo.users_count(role.id).await?;

    Ok(RoleResponse {
        id: role.id,
        name: role.name,
        description: role.description,
        is_active: role.is_active,
        created_at: role.created_at,
        permissions,
        users_count,
    })
}

/// Verify every given permission id exists.
async fn check_permissions_exist(
    repo: &PermissionRepository,
    ids: &[Uuid],
) -> Result<(), ApiError> {
    if ids.is_empty() {
        return Ok(());
    }
    let existing = repo.count_existing(ids).await?;
    if existing != ids.len() as i64 {
        return Err(ApiError::Validation(
            "One or more permission ids do not exist".to_string(),
        ));
    }
    Ok(())
}

/// List roles with permissions and assignment counts.
///
/// GET /api/roles/
#[axum::debug_handler]
async fn list_roles(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(auth.user_id, PermissionCode::for_action(Resource::Role, Action::View))
        .await?;

    let repo = RoleRepository::new(state.pool.clone());
    let roles = repo.list().await?;

    let mut responses = Vec::with_capacity(roles.len());
    for role in roles {
        responses.push(role_response(&repo, role).await?);
    }

    Ok((StatusCode::OK, Json(responses)))
}

/// Get one role.
///
/// GET /api/roles/{id}/
#[axum::debug_handler]
async fn get_role(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(auth.user_id, PermissionCode::for_action(Resource::Role, Action::View))
        .await?;

    let repo = RoleRepository::new(state.pool.clone());
    let role = repo
        .find_by_id(role_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;

    Ok((StatusCode::OK, Json(role_response(&repo, role).await?)))
}

/// Create a role with its permission set.
///
/// POST /api/roles/
#[axum::debug_handler]
async fn create_role(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(auth.user_id, PermissionCode::for_action(Resource::Role, Action::Create))
        .await?;

    let role_repo = RoleRepository::new(state.pool.clone());
    let permission_repo = PermissionRepository::new(state.pool.clone());

    check_permissions_exist(&permission_repo, &request.permissions).await?;

    if role_repo.find_by_name(&request.name).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Role with name '{}' already exists",
            request.name
        )));
    }

    let role = role_repo
        .create(
            &request.name,
            request.description.as_deref(),
            &request.permissions,
        )
        .await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::CreateRole,
                format!("Creó rol {}", role.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({
                "roleId": role.id,
                "permissions": request.permissions,
            })),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(role_response(&role_repo, role).await?),
    ))
}

/// Update a role; a present permission list replaces the whole set.
///
/// PUT /api/roles/{id}/
#[axum::debug_handler]
async fn update_role(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(auth.user_id, PermissionCode::for_action(Resource::Role, Action::Update))
        .await?;

    let role_repo = RoleRepository::new(state.pool.clone());
    let permission_repo = PermissionRepository::new(state.pool.clone());

    if let Some(ref ids) = request.permissions {
        check_permissions_exist(&permission_repo, ids).await?;
    }

    if let Some(ref name) = request.name {
        if let Some(existing) = role_repo.find_by_name(name).await? {
            if existing.id != role_id {
                return Err(ApiError::Conflict(format!(
                    "Role with name '{}' already exists",
                    name
                )));
            }
        }
    }

    // Captured before the update so the audit entry can carry the old set
    let old_permissions: Vec<Uuid> = role_repo
        .permissions_of(role_id)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    let role = role_repo
        .update(
            role_id,
            request.name.as_deref(),
            request.description.as_deref(),
            request.is_active,
            request.permissions.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::UpdateRole,
                format!("Actualizó rol {}", role.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({
                "roleId": role.id,
                "oldPermissions": old_permissions,
                "newPermissions": request.permissions,
            })),
        )
        .await;

    Ok((
        StatusCode::OK,
        Json(role_response(&role_repo, role).await?),
    ))
}

/// Flip a role's active flag.
///
/// POST /api/roles/{id}/toggle_status/
#[axum::debug_handler]
async fn toggle_status(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(auth.user_id, PermissionCode::for_action(Resource::Role, Action::Update))
        .await?;

    let repo = RoleRepository::new(state.pool.clone());
    let role = repo
        .toggle_status(role_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::UpdateRole,
                format!(
                    "{} rol {}",
                    if role.is_active { "Activó" } else { "Desactivó" },
                    role.name
                ),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"roleId": role.id, "isActive": role.is_active})),
        )
        .await;

    Ok((StatusCode::OK, Json(role_response(&repo, role).await?)))
}

/// Delete a role. Rejected while any user is still assigned to it.
///
/// DELETE /api/roles/{id}/
#[axum::debug_handler]
async fn delete_role(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(auth.user_id, PermissionCode::for_action(Resource::Role, Action::Delete))
        .await?;

    let repo = RoleRepository::new(state.pool.clone());
    let role = repo
        .find_by_id(role_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;

    let assigned = repo.users_count(role_id).await?;
    if assigned > 0 {
        return Err(ApiError::Conflict(format!(
            "Cannot delete role: {} user(s) are currently assigned to it",
            assigned
        )));
    }

    if !repo.delete(role_id).await? {
        return Err(ApiError::NotFound("Role not found".to_string()));
    }

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::DeleteRole,
                format!("Eliminó rol {}", role.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"roleId": role_id})),
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
