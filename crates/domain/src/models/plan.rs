//! Membership plan domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A membership plan (duration + base price).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    pub id: Uuid,
    pub name: String,
    pub duration_days: i32,
    pub base_price: f64,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// External representation including the active-membership count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    #[serde(flatten)]
    pub plan: MembershipPlan,
    pub memberships_count: i64,
}

/// Request body for creating a plan.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(range(min = 1, message = "Duration must be greater than 0 days"))]
    pub duration_days: i32,

    #[validate(range(exclusive_min = 0.0, message = "Base price must be greater than 0"))]
    pub base_price: f64,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Request body for updating a plan.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "Duration must be greater than 0 days"))]
    pub duration_days: Option<i32>,

    #[validate(range(exclusive_min = 0.0, message = "Base price must be greater than 0"))]
    pub base_price: Option<f64>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_plan_request_valid() {
        let request = CreatePlanRequest {
            name: "Plan Mensual".to_string(),
            duration_days: 30,
            base_price: 250.0,
            description: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_plan_zero_duration_rejected() {
        let request = CreatePlanRequest {
            name: "Plan Vacío".to_string(),
            duration_days: 0,
            base_price: 250.0,
            description: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_plan_zero_price_rejected() {
        let request = CreatePlanRequest {
            name: "Plan Gratis".to_string(),
            duration_days: 30,
            base_price: 0.0,
            description: None,
        };
        assert!(request.validate().is_err());
    }
}
