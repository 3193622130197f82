//! Membership plan route handlers.

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
    Action, AuditActionKind, CreatePlanRequest, MembershipPlan, PermissionCode, PlanResponse,
    RecordActivityInput, Resource, UpdatePlanRequest,
};
use persistence::repositories::PlanRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};

/// Create plan routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route(
            "/:plan_id",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
}

async fn plan_response(
    repo: &PlanRepository,
    plan: MembershipPlan,
) -> Result<PlanResponse, ApiError> {
    let memberships_count = repo.active_memberships_count(plan.id).await?;
    Ok(PlanResponse {
        plan,
        memberships_count,
    })
}

/// List plans with their active membership counts.
///
/// GET /api/planes/
#[axum::debug_handler]
async fn list_plans(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Plan, Action::View),
        )
        .await?;

    let repo = PlanRepository::new(state.pool.clone());
    let plans = repo.list().await?;

    let mut responses = Vec::with_capacity(plans.len());
    for plan in plans {
        responses.push(plan_response(&repo, plan).await?);
    }

    Ok((StatusCode::OK, Json(responses)))
}

/// Get one plan.
///
/// GET /api/planes/{id}/
#[axum::debug_handler]
async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Plan, Action::View),
        )
        .await?;

    let repo = PlanRepository::new(state.pool.clone());
    let plan = repo
        .find_by_id(plan_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))?;

    Ok((StatusCode::OK, Json(plan_response(&repo, plan).await?)))
}

/// Create a plan.
///
/// POST /api/planes/
#[axum::debug_handler]
async fn create_plan(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<CreatePlanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Plan, Action::Create),
        )
        .await?;

    let repo = PlanRepository::new(state.pool.clone());
    let plan = repo
        .create(
            &request.name,
            request.duration_days,
            request.base_price,
            request.description.as_deref(),
        )
        .await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::CreatePlan,
                format!("Creó plan {}", plan.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"planId": plan.id})),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(plan_response(&repo, plan).await?),
    ))
}

/// Update a plan.
///
/// PUT /api/planes/{id}/
#[axum::debug_handler]
async fn update_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<UpdatePlanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Plan, Action::Update),
        )
        .await?;

    let repo = PlanRepository::new(state.pool.clone());
    let plan = repo
        .update(
            plan_id,
            request.name.as_deref(),
            request.duration_days,
            request.base_price,
            request.description.as_deref(),
            request.is_active,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::UpdatePlan,
                format!("Actualizó plan {}", plan.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"planId": plan.id})),
        )
        .await;

    Ok((StatusCode::OK, Json(plan_response(&repo, plan).await?)))
}

/// Soft-delete a plan; existing memberships keep their plan reference.
///
/// DELETE /api/planes/{id}/
#[axum::debug_handler]
async fn delete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    auth: UserAuth,
    context: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Plan, Action::Delete),
        )
        .await?;

    let repo = PlanRepository::new(state.pool.clone());
    let plan = repo
        .find_by_id(plan_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))?;

    repo.soft_delete(plan_id).await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::DeletePlan,
                format!("Desactivó plan {}", plan.name),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({"planId": plan_id})),
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
