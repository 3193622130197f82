//! User management route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    Action, AuditActionKind, CreateUserRequest, PermissionCode, RecordActivityInput, Resource,
    UpdateUserRequest, UserWithRoles,
};
use persistence::repositories::{RoleRepository, UserRepository};
use shared::password::hash_password;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};

/// Create user routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// The permission gating management of a user with the given target role.
///
/// Managing an "Administrador" requires `manage_admins` and an "Instructor"
/// requires `manage_instructors`; any other role falls back to the generic
/// user permission. Resolved through the permission table, not string
/// literals scattered per handler.
async fn management_permission(
    role_repo: &RoleRepository,
    role_id: Uuid,
    fallback: PermissionCode,
) -> Result<PermissionCode, ApiError> {
    let role = role_repo.find_by_id(role_id).await?;
    Ok(match role.as_ref().map(|r| r.name.as_str()) {
        Some("Administrador") => PermissionCode::ManageAdmins,
        Some("Instructor") => PermissionCode::ManageInstructors,
        _ => fallback,
    })
}

/// List users with their roles.
///
/// GET /api/usuarios/
#[axum::debug_handler]
async fn list_users(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(auth.user_id, PermissionCode::for_action(Resource::User, Action::View))
        .await?;

    let users = UserRepository::new(state.pool.clone())
        .list_with_roles()
        .await?;

    Ok((StatusCode::OK, Json(users)))
}

/// Get one user with roles.
///
/// GET /api/usuarios/{id}/
#[axum::debug_handler]
async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(auth.user_id, PermissionCode::for_action(Resource::User, Action::View))
        .await?;

    let user_repo = UserRepository::new(state.pool.clone());
    let user = user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let roles = user_repo.roles_of(user.id).await?;

    Ok((StatusCode::OK, Json(UserWithRoles { user, roles })))
}

/// Create a user with an initial role.
///
/// POST /api/usuarios/
#[axum::debug_handler]
async fn create_user(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let user_repo = UserRepository::new(state.pool.clone());
    let role_repo = RoleRepository::new(state.pool.clone());

    let required = management_permission(
        &role_repo,
        request.rol,
        PermissionCode::for_action(Resource::User, Action::Create),
    )
    .await?;
    state.authz.require(auth.user_id, required).await?;

    let role = role_repo
        .find_by_id(request.rol)
        .await?
        .ok_or_else(|| ApiError::Validation("The given role does not exist".to_string()))?;

    if user_repo.find_by_username(&request.username).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Username '{}' is already taken",
            request.username
        )));
    }

    let password_hash = hash_password(&request.password)
        .map_err(|e| ApiError::Internal(format!("Password error: {}", e)))?;

    let user = user_repo
        .create_with_role(
            &request.username,
            &request.email,
            &password_hash,
            request.first_name.as_deref(),
            request.last_name.as_deref(),
            role.id,
        )
        .await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::CreateUser,
                format!("Creó usuario {} con rol {}", user.username, role.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({
                "userId": user.id,
                "roleId": role.id,
            })),
        )
        .await;

    let roles = user_repo.roles_of(user.id).await?;

    Ok((StatusCode::CREATED, Json(UserWithRoles { user, roles })))
}

/// Update a user, optionally re-assigning their role.
///
/// PUT /api/usuarios/{id}/
#[axum::debug_handler]
async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let user_repo = UserRepository::new(state.pool.clone());
    let role_repo = RoleRepository::new(state.pool.clone());

    let required = match request.rol {
        Some(role_id) => {
            management_permission(
                &role_repo,
                role_id,
                PermissionCode::for_action(Resource::User, Action::Update),
            )
            .await?
        }
        None => PermissionCode::for_action(Resource::User, Action::Update),
    };
    state.authz.require(auth.user_id, required).await?;

    if let Some(role_id) = request.rol {
        if role_repo.find_by_id(role_id).await?.is_none() {
            return Err(ApiError::Validation(
                "The given role does not exist".to_string(),
            ));
        }
    }

    let user = user_repo
        .update(
            user_id,
            request.email.as_deref(),
            request.first_name.as_deref(),
            request.last_name.as_deref(),
            request.is_active,
            request.rol,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::UpdateUser,
                format!("Actualizó usuario {}", user.username),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"userId": user.id})),
        )
        .await;

    let roles = user_repo.roles_of(user.id).await?;

    Ok((StatusCode::OK, Json(UserWithRoles { user, roles })))
}

/// Delete a user.
///
/// DELETE /api/usuarios/{id}/
#[axum::debug_handler]
async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(auth.user_id, PermissionCode::for_action(Resource::User, Action::Delete))
        .await?;

    let user_repo = UserRepository::new(state.pool.clone());
    let user = user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !user_repo.delete(user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::DeleteUser,
                format!("Eliminó usuario {}", user.username),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"userId": user_id})),
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
