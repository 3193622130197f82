//! Enrollment route handlers.

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
    Action, AuditActionKind, CreateEnrollmentRequest, Enrollment, EnrollmentResponse,
    PermissionCode, RecordActivityInput, Resource,
};
use persistence::repositories::{ClientRepository, MembershipRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};

/// Create enrollment routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_enrollments).post(create_enrollment))
        .route("/:enrollment_id", get(get_enrollment))
}

async fn enrollment_response(
    repo: &MembershipRepository,
    enrollment: Enrollment,
) -> Result<EnrollmentResponse, ApiError> {
    let client_name = repo
        .enrollment_client_name(enrollment.id)
        .await?
        .unwrap_or_default();
    let payment_method_display = enrollment.payment_method.display().to_string();

    Ok(EnrollmentResponse {
        enrollment,
        client_name,
        payment_method_display,
    })
}

/// List enrollments.
///
/// GET /api/inscripciones/
#[axum::debug_handler]
async fn list_enrollments(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Enrollment, Action::View),
        )
        .await?;

    let repo = MembershipRepository::new(state.pool.clone());
    let enrollments = repo.list_enrollments().await?;

    let mut responses = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        responses.push(enrollment_response(&repo, enrollment).await?);
    }

    Ok((StatusCode::OK, Json(responses)))
}

/// Get one enrollment.
///
/// GET /api/inscripciones/{id}/
#[axum::debug_handler]
async fn get_enrollment(
    State(state): State<AppState>,
    Path(enrollment_id): Path<Uuid>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Enrollment, Action::View),
        )
        .await?;

    let repo = MembershipRepository::new(state.pool.clone());
    let enrollment = repo
        .find_enrollment(enrollment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;

    Ok((
        StatusCode::OK,
        Json(enrollment_response(&repo, enrollment).await?),
    ))
}

/// Register an enrollment payment for a client.
///
/// POST /api/inscripciones/
#[axum::debug_handler]
async fn create_enrollment(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<CreateEnrollmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Enrollment, Action::Create),
        )
        .await?;

    let client = ClientRepository::new(state.pool.clone())
        .find_by_id(request.cliente)
        .await?
        .ok_or_else(|| ApiError::Validation("The given client does not exist".to_string()))?;

    if !client.is_active {
        return Err(ApiError::Validation(
            "Cannot enroll an inactive client".to_string(),
        ));
    }

    let repo = MembershipRepository::new(state.pool.clone());
    let enrollment = repo
        .create_enrollment(client.id, request.amount, request.payment_method)
        .await?;

    state
        .audit
        .record_or_log(
            RecordActivityInput::new(
                AuditActionKind::CreateEnrollment,
                format!("Registró inscripción de {}", client.full_name()),
            )
            .with_user(auth.user_id)
            .with_request_context(context.ip_address, context.user_agent)
            .with_extra(serde_json::json!({
                "enrollmentId": enrollment.id,
                "clientId": client.id,
                "amount": enrollment.amount,
            })),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(enrollment_response(&repo, enrollment).await?),
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
