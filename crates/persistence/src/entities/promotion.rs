//! Promotion entity.

use chrono::NaiveDate;
use domain::models::{Promotion, PromotionStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for promotions.
#[derive(Debug, Clone, FromRow)]
pub struct PromotionEntity {
    pub id: Uuid,
    pub name: String,
    pub duration_months: i32,
    pub discount_percent: f64,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub status: String,
}

impl From<PromotionEntity> for Promotion {
    fn from(entity: PromotionEntity) -> Self {
        Promotion {
            id: entity.id,
            name: entity.name,
            duration_months: entity.duration_months,
            discount_percent: entity.discount_percent,
            starts_on: entity.starts_on,
            ends_on: entity.ends_on,
            status: entity
                .status
                .parse::<PromotionStatus>()
                .unwrap_or(PromotionStatus::Inactive),
        }
    }
}
