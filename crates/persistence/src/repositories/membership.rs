//! Enrollment and membership repository for database operations.

use chrono::NaiveDate;
use domain::models::{AppliedPromotion, Enrollment, Membership, MembershipStatus, PaymentMethod};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::entities::{AppliedPromotionEntity, EnrollmentEntity, MembershipEntity};

const ENROLLMENT_COLUMNS: &str = "id, client_id, amount, payment_method, created_at";
const MEMBERSHIP_COLUMNS: &str =
    "id, enrollment_id, plan_id, registered_by, status, starts_on, ends_on";

/// Repository for enrollment and membership database operations.
#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ===========================================
    // Enrollments
    // ===========================================

    /// Create an enrollment.
    pub async fn create_enrollment(
        &self,
        client_id: Uuid,
        amount: f64,
        payment_method: PaymentMethod,
    ) -> Result<Enrollment, sqlx::Error> {
        let entity = sqlx::query_as::<_, EnrollmentEntity>(&format!(
            r#"
            INSERT INTO enrollments (client_id, amount, payment_method)
            VALUES ($1, $2, $3)
            RETURNING {ENROLLMENT_COLUMNS}
            "#
        ))
        .bind(client_id)
        .bind(amount)
        .bind(payment_method.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find an enrollment by ID.
    pub async fn find_enrollment(&self, id: Uuid) -> Result<Option<Enrollment>, sqlx::Error> {
        let entity = sqlx::query_as::<_, EnrollmentEntity>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List enrollments, newest first.
    pub async fn list_enrollments(&self) -> Result<Vec<Enrollment>, sqlx::Error> {
        let entities = sqlx::query_as::<_, EnrollmentEntity>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Whether an enrollment already backs a membership (1:1 link).
    pub async fn enrollment_consumed(&self, enrollment_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM memberships WHERE enrollment_id = $1)")
            .bind(enrollment_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Client full name for an enrollment, used by response assembly.
    pub async fn enrollment_client_name(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT c.first_name || ' ' || c.last_name
            FROM enrollments e
            JOIN clients c ON c.id = e.client_id
            WHERE e.id = $1
            "#,
        )
        .bind(enrollment_id)
        .fetch_optional(&self.pool)
        .await
    }

    // ===========================================
    // Memberships
    // ===========================================

    /// Create a membership consuming an enrollment.
    pub async fn create_membership(
        &self,
        enrollment_id: Uuid,
        plan_id: Uuid,
        registered_by: Uuid,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    ) -> Result<Membership, sqlx::Error> {
        let entity = sqlx::query_as::<_, MembershipEntity>(&format!(
            r#"
            INSERT INTO memberships (enrollment_id, plan_id, registered_by, starts_on, ends_on)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(enrollment_id)
        .bind(plan_id)
        .bind(registered_by)
        .bind(starts_on)
        .bind(ends_on)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a membership by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Membership>, sqlx::Error> {
        let entity = sqlx::query_as::<_, MembershipEntity>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List memberships, latest window first.
    pub async fn list(&self) -> Result<Vec<Membership>, sqlx::Error> {
        let entities = sqlx::query_as::<_, MembershipEntity>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships ORDER BY starts_on DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update a membership's status and window.
    pub async fn update(
        &self,
        id: Uuid,
        status: Option<MembershipStatus>,
        starts_on: Option<NaiveDate>,
        ends_on: Option<NaiveDate>,
    ) -> Result<Option<Membership>, sqlx::Error> {
        let entity = sqlx::query_as::<_, MembershipEntity>(&format!(
            r#"
            UPDATE memberships
            SET status = COALESCE($2, status),
                starts_on = COALESCE($3, starts_on),
                ends_on = COALESCE($4, ends_on)
            WHERE id = $1
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.map(|s| s.as_str()))
        .bind(starts_on)
        .bind(ends_on)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Names joined onto a membership for response assembly:
    /// `(client_name, plan_name, registered_by_username)`.
    pub async fn display_names(
        &self,
        membership_id: Uuid,
    ) -> Result<Option<(String, String, Option<String>)>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT c.first_name || ' ' || c.last_name AS client_name,
                   p.name AS plan_name,
                   u.username AS registered_by_username
            FROM memberships m
            JOIN enrollments e ON e.id = m.enrollment_id
            JOIN clients c ON c.id = e.client_id
            JOIN membership_plans p ON p.id = m.plan_id
            LEFT JOIN users u ON u.id = m.registered_by
            WHERE m.id = $1
            "#,
        )
        .bind(membership_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            (
                row.get("client_name"),
                row.get("plan_name"),
                row.get("registered_by_username"),
            )
        }))
    }

    /// Promotions applied to a membership.
    pub async fn applied_promotions(
        &self,
        membership_id: Uuid,
    ) -> Result<Vec<AppliedPromotion>, sqlx::Error> {
        let entities = sqlx::query_as::<_, AppliedPromotionEntity>(
            r#"
            SELECT p.id, p.name, p.discount_percent, mp.applied_at
            FROM membership_promotions mp
            JOIN promotions p ON p.id = mp.promotion_id
            WHERE mp.membership_id = $1
            ORDER BY mp.applied_at
            "#,
        )
        .bind(membership_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Link a promotion to a membership. Returns false when the pair was
    /// already linked.
    pub async fn apply_promotion(
        &self,
        membership_id: Uuid,
        promotion_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO membership_promotions (membership_id, promotion_id)
            VALUES ($1, $2)
            ON CONFLICT (membership_id, promotion_id) DO NOTHING
            "#,
        )
        .bind(membership_id)
        .bind(promotion_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
