//! Promotion route handlers.

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
    Action, AuditActionKind, CreatePromotionRequest, PermissionCode, PromotionResponse,
    RecordActivityInput, Resource, UpdatePromotionRequest,
};
use persistence::repositories::PromotionRepository;
use shared::validation::validate_date_range;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};

/// Create promotion routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_promotions).post(create_promotion))
        .route(
            "/:promotion_id",
            get(get_promotion)
                .put(update_promotion)
                .delete(delete_promotion),
        )
}

/// List promotions.
///
/// GET /api/promociones/
#[axum::debug_handler]
async fn list_promotions(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Promotion, Action::View),
        )
        .await?;

    let promotions = PromotionRepository::new(state.pool.clone()).list().await?;
    let responses: Vec<PromotionResponse> = promotions.into_iter().map(Into::into).collect();

    Ok((StatusCode::OK, Json(responses)))
}

/// Get one promotion.
///
/// GET /api/promociones/{id}/
#[axum::debug_handler]
async fn get_promotion(
    State(state): State<AppState>,
    Path(promotion_id): Path<Uuid>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Promotion, Action::View),
        )
        .await?;

    let promotion = PromotionRepository::new(state.pool.clone())
        .find_by_id(promotion_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Promotion not found".to_string()))?;

    Ok((StatusCode::OK, Json(PromotionResponse::from(promotion))))
}

/// Create a promotion.
///
/// POST /api/promociones/
#[axum::debug_handler]
async fn create_promotion(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<CreatePromotionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Promotion, Action::Create),
        )
        .await?;

    let promotion = PromotionRepository::new(state.pool.clone())
        .create(
            &request.name,
            request.duration_months,
            request.discount_percent,
            request.starts_on,
            request.ends_on,
            request.status,
        )
        .await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::CreatePromotion,
                format!("Creó promoción {}", promotion.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"promotionId": promotion.id})),
        )
        .await;

    Ok((StatusCode::CREATED, Json(PromotionResponse::from(promotion))))
}

/// Update a promotion; the resulting date window must stay ordered.
///
/// PUT /api/promociones/{id}/
#[axum::debug_handler]
async fn update_promotion(
    State(state): State<AppState>,
    Path(promotion_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<UpdatePromotionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Promotion, Action::Update),
        )
        .await?;

    let repo = PromotionRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(promotion_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Promotion not found".to_string()))?;

    let starts_on = request.starts_on.unwrap_or(current.starts_on);
    let ends_on = request.ends_on.unwrap_or(current.ends_on);
    validate_date_range(starts_on, ends_on)
        .map_err(|e| ApiError::Validation(e.message.map(|m| m.to_string()).unwrap_or_default()))?;

    let promotion = repo
        .update(
            promotion_id,
            request.name.as_deref(),
            request.duration_months,
            request.discount_percent,
            request.starts_on,
            request.ends_on,
            request.status,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Promotion not found".to_string()))?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::UpdatePromotion,
                format!("Actualizó promoción {}", promotion.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"promotionId": promotion.id})),
        )
        .await;

    Ok((StatusCode::OK, Json(PromotionResponse::from(promotion))))
}

/// Delete a promotion.
///
/// DELETE /api/promociones/{id}/
#[axum::debug_handler]
async fn delete_promotion(
    State(state): State<AppState>,
    Path(promotion_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Promotion, Action::Delete),
        )
        .await?;

    let repo = PromotionRepository::new(state.pool.clone());
    let promotion = repo
        .find_by_id(promotion_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Promotion not found".to_string()))?;

    if !repo.delete(promotion_id).await? {
        return Err(ApiError::NotFound("Promotion not found".to_string()));
    }

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::DeletePromotion,
                format!("Eliminó promoción {}", promotion.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"promotionId": promotion_id})),
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
