//! Client management route handlers.

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
    Action, AuditActionKind, ClientDetailResponse, ClientResponse, CreateClientRequest,
    PermissionCode, RecordActivityInput, Resource, UpdateClientRequest,
};
use persistence::repositories::ClientRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};

/// Create client routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:client_id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

/// List clients.
///
/// GET /api/clientes/
#[axum::debug_handler]
async fn list_clients(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Client, Action::View),
        )
        .await?;

    let clients = ClientRepository::new(state.pool.clone()).list().await?;
    let responses: Vec<ClientResponse> = clients.into_iter().map(Into::into).collect();

    Ok((StatusCode::OK, Json(responses)))
}

/// Get one client with membership details.
///
/// GET /api/clientes/{id}/
#[axum::debug_handler]
async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Client, Action::View),
        )
        .await?;

    let repo = ClientRepository::new(state.pool.clone());
    let client = repo
        .find_by_id(client_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    let active_memberships = repo.active_memberships(client_id).await?;
    let total_enrollments = repo.enrollments_count(client_id).await?;

    Ok((
        StatusCode::OK,
        Json(ClientDetailResponse {
            client: client.into(),
            active_memberships,
            total_enrollments,
        }),
    ))
}

/// Register a client.
///
/// POST /api/clientes/
#[axum::debug_handler]
async fn create_client(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Client, Action::Create),
        )
        .await?;

    let client = ClientRepository::new(state.pool.clone())
        .create(
            &request.first_name,
            &request.last_name,
            request.phone.as_deref(),
            request.weight_kg,
            request.height_m,
            request.experience,
        )
        .await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::CreateClient,
                format!("Registró cliente {}", client.full_name()),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"clientId": client.id})),
        )
        .await;

    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

/// Update a client.
///
/// PUT /api/clientes/{id}/
#[axum::debug_handler]
async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<UpdateClientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Client, Action::Update),
        )
        .await?;

    let client = ClientRepository::new(state.pool.clone())
        .update(
            client_id,
            request.first_name.as_deref(),
            request.last_name.as_deref(),
            request.phone.as_deref(),
            request.weight_kg,
            request.height_m,
            request.experience,
            request.is_active,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::UpdateClient,
                format!("Actualizó cliente {}", client.full_name()),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"clientId": client.id})),
        )
        .await;

    Ok((StatusCode::OK, Json(ClientResponse::from(client))))
}

/// Soft-delete a client: the active flag is cleared, the row stays.
///
/// DELETE /api/clientes/{id}/
#[axum::debug_handler]
async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Client, Action::Delete),
        )
        .await?;

    let repo = ClientRepository::new(state.pool.clone());
    let client = repo
        .find_by_id(client_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    repo.soft_delete(client_id).await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::DeleteClient,
                format!("Dio de baja al cliente {}", client.full_name()),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"clientId": client_id})),
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
