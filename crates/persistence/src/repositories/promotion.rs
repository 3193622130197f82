//! Promotion repository for database operations.

use chrono::NaiveDate;
use domain::models::{Promotion, PromotionStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PromotionEntity;

const PROMOTION_COLUMNS: &str =
    "id, name, duration_months, discount_percent, starts_on, ends_on, status";

/// Repository for promotion database operations.
#[derive(Clone)]
pub struct PromotionRepository {
    pool: PgPool,
}

impl PromotionRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a promotion.
    pub async fn create(
        &self,
        name: &str,
        duration_months: i32,
        discount_percent: f64,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        status: PromotionStatus,
    ) -> Result<Promotion, sqlx::Error> {
        let entity = sqlx::query_as::<_, PromotionEntity>(&format!(
            r#"
            INSERT INTO promotions
                (name, duration_months, discount_percent, starts_on, ends_on, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROMOTION_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(duration_months)
        .bind(discount_percent)
        .bind(starts_on)
        .bind(ends_on)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a promotion by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Promotion>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PromotionEntity>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List promotions, most recent window first.
    pub async fn list(&self) -> Result<Vec<Promotion>, sqlx::Error> {
        let entities = sqlx::query_as::<_, PromotionEntity>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions ORDER BY starts_on DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update a promotion's fields.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        duration_months: Option<i32>,
        discount_percent: Option<f64>,
        starts_on: Option<NaiveDate>,
        ends_on: Option<NaiveDate>,
        status: Option<PromotionStatus>,
    ) -> Result<Option<Promotion>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PromotionEntity>(&format!(
            r#"
            UPDATE promotions
            SET name = COALESCE($2, name),
                duration_months = COALESCE($3, duration_months),
                discount_percent = COALESCE($4, discount_percent),
                starts_on = COALESCE($5, starts_on),
                ends_on = COALESCE($6, ends_on),
                status = COALESCE($7, status)
            WHERE id = $1
            RETURNING {PROMOTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(duration_months)
        .bind(discount_percent)
        .bind(starts_on)
        .bind(ends_on)
        .bind(status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Delete a promotion. Application rows cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
