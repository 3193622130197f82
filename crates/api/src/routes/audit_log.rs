//! Audit log (bitácora) route handlers.
//!
//! Entries are append-only: besides the explicit recording endpoint, the
//! surface is read-only.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::str::FromStr;
use validator::Validate;

use domain::models::{
    Action, AuditActionKind, AuditEntryResponse, AuditStatsResponse, ListAuditQuery,
    ListAuditResponse, Pagination, PermissionCode, RecordActivityInput, Resource, Severity,
};
use persistence::repositories::AuditRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{RequestContext, UserAuth};

/// Create audit log routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries))
        .route("/estadisticas", get(stats))
}

/// Request body for explicitly recording an activity.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntryRequest {
    /// Action kind; must be one of the closed set
    pub tipo_accion: String,

    #[validate(length(min = 1, max = 200, message = "Action text must be 1-200 characters"))]
    pub accion: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub descripcion: Option<String>,

    /// Severity; defaults to info
    pub nivel: Option<String>,

    pub datos_adicionales: Option<serde_json::Value>,
}

/// Record an activity on behalf of the authenticated user.
///
/// POST /api/registrar-bitacora/
///
/// This is a primary write: a failing insert propagates instead of being
/// logged away.
#[axum::debug_handler]
pub async fn record_entry(
    State(state): State<AppState>,
    auth: UserAuth,
    context: RequestContext,
    Json(request): Json<RecordEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let action_kind =
        AuditActionKind::from_str(&request.tipo_accion).map_err(ApiError::Validation)?;
    let severity = match request.nivel.as_deref() {
        Some(value) => Severity::from_str(value).map_err(ApiError::Validation)?,
        None => Severity::Info,
    };

    let mut input = RecordActivityInput::new(action_kind, request.accion)
        .with_user(auth.user_id)
        .with_severity(severity)
        .with_request_context(context.ip_address, context.user_agent);
    if let Some(description) = request.descripcion {
        input = input.with_description(description);
    }
    if let Some(extra) = request.datos_adicionales {
        input = input.with_extra(extra);
    }

    let entry = state.audit.record(input).await?;

    Ok((StatusCode::CREATED, Json(AuditEntryResponse::from(entry))))
}

/// Reject filter values outside the closed enumerations.
fn validate_filters(query: &ListAuditQuery) -> Result<(), ApiError> {
    if let Some(ref kind) = query.tipo_accion {
        AuditActionKind::from_str(kind).map_err(ApiError::Validation)?;
    }
    if let Some(ref severity) = query.nivel {
        Severity::from_str(severity).map_err(ApiError::Validation)?;
    }
    Ok(())
}

/// List audit entries newest-first, filterable by user, action kind,
/// severity, date range, action text, and ip substring.
///
/// GET /api/bitacora/
#[axum::debug_handler]
async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListAuditQuery>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::AuditLog, Action::View),
        )
        .await?;

    validate_filters(&query)?;

    let repo = AuditRepository::new(state.pool.clone());
    let (entries, total) = repo.list(&query).await?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
    let total_pages = ((total as f64) / (per_page as f64)).ceil() as i32;

    let response = ListAuditResponse {
        data: entries.into_iter().map(AuditEntryResponse::from).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Aggregate statistics: totals by kind and severity, 7-day activity,
/// top-5 active users.
///
/// GET /api/bitacora/estadisticas/
#[axum::debug_handler]
async fn stats(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::AuditLog, Action::View),
        )
        .await?;

    let repo = AuditRepository::new(state.pool.clone());

    let total = repo.count().await?;
    let by_action_kind = repo.counts_by_kind().await?;
    let by_severity = repo.counts_by_severity().await?;
    let last_seven_days = repo.daily_activity_last_week().await?;
    let top_users = repo.top_active_users().await?;

    Ok((
        StatusCode::OK,
        Json(AuditStatsResponse {
            total,
            by_action_kind,
            by_severity,
            last_seven_days,
            top_users,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_creation() {
        let _router: Router<AppState> = router();
    }

    #[test]
    fn test_validate_filters_accepts_known_values() {
        let query = ListAuditQuery {
            tipo_accion: Some("create_role".to_string()),
            nivel: Some("warning".to_string()),
            ..Default::default()
        };
        assert!(validate_filters(&query).is_ok());
    }

    #[test]
    fn test_validate_filters_rejects_unknown_kind() {
        let query = ListAuditQuery {
            tipo_accion: Some("teleport".to_string()),
            ..Default::default()
        };
        assert!(validate_filters(&query).is_err());
    }

    #[test]
    fn test_validate_filters_rejects_unknown_severity() {
        let query = ListAuditQuery {
            nivel: Some("fatal".to_string()),
            ..Default::default()
        };
        assert!(validate_filters(&query).is_err());
    }
}
