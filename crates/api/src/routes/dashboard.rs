//! Dashboard statistics endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use domain::models::{Action, PermissionCode, Resource};
use persistence::repositories::DashboardRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Dashboard counts response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsResponse {
    pub active_users: i64,
    pub roles: i64,
    pub active_clients: i64,
    pub active_memberships: i64,
    pub plans: i64,
    pub active_promotions: i64,
}

/// Aggregate counts for the admin dashboard.
///
/// GET /api/dashboard/stats/
#[axum::debug_handler]
pub async fn stats(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<impl IntoResponse, ApiError> {
    state
        .authz
        .require(
            auth.user_id,
            PermissionCode::for_action(Resource::Dashboard, Action::View),
        )
        .await?;

    let counts = DashboardRepository::new(state.pool.clone()).counts().await?;

    Ok((
        StatusCode::OK,
        Json(DashboardStatsResponse {
            active_users: counts.active_users,
            roles: counts.roles,
            active_clients: counts.active_clients,
            active_memberships: counts.active_memberships,
            plans: counts.plans,
            active_promotions: counts.active_promotions,
        }),
    ))
}
