//! Membership plan repository for database operations.

use domain::models::MembershipPlan;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PlanEntity;

const PLAN_COLUMNS: &str =
    "id, name, duration_days, base_price, description, is_active, created_at";

/// Repository for membership plan database operations.
#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a plan.
    pub async fn create(
        &self,
        name: &str,
        duration_days: i32,
        base_price: f64,
        description: Option<&str>,
    ) -> Result<MembershipPlan, sqlx::Error> {
        let entity = sqlx::query_as::<_, PlanEntity>(&format!(
            r#"
            INSERT INTO membership_plans (name, duration_days, base_price, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {PLAN_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(duration_days)
        .bind(base_price)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a plan by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MembershipPlan>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PlanEntity>(&format!(
            "SELECT {PLAN_COLUMNS} FROM membership_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List plans ordered by name.
    pub async fn list(&self) -> Result<Vec<MembershipPlan>, sqlx::Error> {
        let entities = sqlx::query_as::<_, PlanEntity>(&format!(
            "SELECT {PLAN_COLUMNS} FROM membership_plans ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update a plan's fields.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        duration_days: Option<i32>,
        base_price: Option<f64>,
        description: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Option<MembershipPlan>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PlanEntity>(&format!(
            r#"
            UPDATE membership_plans
            SET name = COALESCE($2, name),
                duration_days = COALESCE($3, duration_days),
                base_price = COALESCE($4, base_price),
                description = COALESCE($5, description),
                is_active = COALESCE($6, is_active)
            WHERE id = $1
            RETURNING {PLAN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(duration_days)
        .bind(base_price)
        .bind(description)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Soft-delete a plan; memberships keep their plan reference.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE membership_plans SET is_active = false WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count of currently-active memberships on a plan.
    pub async fn active_memberships_count(&self, plan_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM memberships WHERE plan_id = $1 AND status = 'active'",
        )
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await
    }
}
