//! Membership route handlers.

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
    Action, ApplyPromotionRequest, AuditActionKind, CreateMembershipRequest, Membership,
    MembershipResponse, PermissionCode, RecordActivityInput, Resource, UpdateMembershipRequest,
};
use persistence::repositories::{MembershipRepository, PlanRepository, PromotionRepository};
use shared::validation::validate_date_range;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};

/// Create membership routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_memberships).post(create_membership))
        .route("/:membership_id", get(get_membership).put(update_membership))
        .route("/:membership_id/aplicar_promocion", post(apply_promotion))
}

async fn membership_response(
    repo: &MembershipRepository,
    membership: Membership,
) -> Result<MembershipResponse, ApiError> {
    let (client_name, plan_name, registered_by_username) = repo
        .display_names(membership.id)
        .await?
        .unwrap_or((String::new(), String::new(), None));
    let promotions = repo.applied_promotions(membership.id).await?;

    Ok(MembershipResponse {
        status_display: membership.status.display().to_string(),
        is_active_now: membership.is_active_now(),
        days_remaining: membership.days_remaining(),
        membership,
        client_name,
        plan_name,
        registered_by_username,
        promotions,
    })
}

/// List memberships.
///
/// GET /api/membresias/
#[axum::debug_handler]
async fn list_memberships(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Membership, Action::View),
        )
        .await?;

    let repo = MembershipRepository::new(state.pool.clone());
    let memberships = repo.list().await?;

    let mut responses = Vec::with_capacity(memberships.len());
    for membership in memberships {
        responses.push(membership_response(&repo, membership).await?);
    }

    Ok((StatusCode::OK, Json(responses)))
}

/// Get one membership.
///
/// GET /api/membresias/{id}/
#[axum::debug_handler]
async fn get_membership(
    State(state): State<AppState>,
    Path(membership_id): Path<Uuid>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Membership, Action::View),
        )
        .await?;

    let repo = MembershipRepository::new(state.pool.clone());
    let membership = repo
        .find_by_id(membership_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    Ok((
        StatusCode::OK,
        Json(membership_response(&repo, membership).await?),
    ))
}

/// Create a membership consuming an enrollment.
///
/// POST /api/membresias/
#[axum::debug_handler]
async fn create_membership(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<CreateMembershipRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Membership, Action::Create),
        )
        .await?;

    let repo = MembershipRepository::new(state.pool.clone());
    let plan_repo = PlanRepository::new(state.pool.clone());

    repo.find_enrollment(request.inscripcion)
        .await?
        .ok_or_else(|| ApiError::Validation("The given enrollment does not exist".to_string()))?;

    if repo.enrollment_consumed(request.inscripcion).await? {
        return Err(ApiError::Conflict(
            "The enrollment already backs a membership".to_string(),
        ));
    }

    let plan = plan_repo
        .find_by_id(request.plan)
        .await?
        .ok_or_else(|| ApiError::Validation("The given plan does not exist".to_string()))?;
    if !plan.is_active {
        return Err(ApiError::Validation(
            "The given plan is not active".to_string(),
        ));
    }

    let membership = repo
        .create_membership(
            request.inscripcion,
            plan.id,
            auth.user_id,
            request.starts_on,
            request.ends_on,
        )
        .await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::CreateMembership,
                format!("Creó membresía con plan {}", plan.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({
                "membershipId": membership.id,
                "enrollmentId": membership.enrollment_id,
                "planId": plan.id,
            })),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(membership_response(&repo, membership).await?),
    ))
}

/// Update a membership's status or window.
///
/// PUT /api/membresias/{id}/
#[axum::debug_handler]
async fn update_membership(
    State(state): State<AppState>,
    Path(membership_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<UpdateMembershipRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Membership, Action::Update),
        )
        .await?;

    let repo = MembershipRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(membership_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    let starts_on = request.starts_on.unwrap_or(current.starts_on);
    let ends_on = request.ends_on.unwrap_or(current.ends_on);
    validate_date_range(starts_on, ends_on)
        .map_err(|e| ApiError::Validation(e.message.map(|m| m.to_string()).unwrap_or_default()))?;

    let membership = repo
        .update(membership_id, request.status, request.starts_on, request.ends_on)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::UpdateMembership,
                "Actualizó membresía".to_string(),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({
                "membershipId": membership.id,
                "status": membership.status,
            })),
        )
        .await;

    Ok((
        StatusCode::OK,
        Json(membership_response(&repo, membership).await?),
    ))
}

/// Apply an active, in-window promotion to a membership.
///
/// POST /api/membresias/{id}/aplicar_promocion/
#[axum::debug_handler]
async fn apply_promotion(
    State(state): State<AppState>,
    Path(membership_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<ApplyPromotionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Membership, Action::Update),
        )
        .await?;

    let repo = MembershipRepository::new(state.pool.clone());
    let promotion_repo = PromotionRepository::new(state.pool.clone());

    let membership = repo
        .find_by_id(membership_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    let promotion = promotion_repo
        .find_by_id(request.promocion)
        .await?
        .ok_or_else(|| ApiError::Validation("The given promotion does not exist".to_string()))?;

    if !promotion.is_active_now() {
        return Err(ApiError::Validation(
            "The promotion is not currently active".to_string(),
        ));
    }

    if !repo.apply_promotion(membership.id, promotion.id).await? {
        return Err(ApiError::Conflict(
            "The promotion is already applied to this membership".to_string(),
        ));
    }

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::ApplyPromotion,
                format!("Aplicó promoción {} a una membresía", promotion.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({
                "membershipId": membership.id,
                "promotionId": promotion.id,
            })),
        )
        .await;

    Ok((
        StatusCode::OK,
        Json(membership_response(&repo, membership).await?),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_creation() {
        let _router: Router<AppState> = router();
    }
}
