//! Membership plan entity.

use chrono::{DateTime, Utc};
use domain::models::MembershipPlan;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for membership plans.
#[derive(Debug, Clone, FromRow)]
pub struct PlanEntity {
    pub id: Uuid,
    pub name: String,
    pub duration_days: i32,
    pub base_price: f64,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PlanEntity> for MembershipPlan {
    fn from(entity: PlanEntity) -> Self {
        MembershipPlan {
            id: entity.id,
            name: entity.name,
            duration_days: entity.duration_days,
            base_price: entity.base_price,
            description: entity.description,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}
