//! Client repository for database operations.

use domain::models::{Client, ClientMembershipSummary, ExperienceLevel};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::entities::ClientEntity;

const CLIENT_COLUMNS: &str =
    "id, first_name, last_name, phone, weight_kg, height_m, experience, registered_at, is_active";

/// Repository for gym client database operations.
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a client.
    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        weight_kg: Option<f64>,
        height_m: Option<f64>,
        experience: ExperienceLevel,
    ) -> Result<Client, sqlx::Error> {
        let entity = sqlx::query_as::<_, ClientEntity>(&format!(
            r#"
            INSERT INTO clients (first_name, last_name, phone, weight_kg, height_m, experience)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .bind(weight_kg)
        .bind(height_m)
        .bind(experience.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a client by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ClientEntity>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List clients, newest first.
    pub async fn list(&self) -> Result<Vec<Client>, sqlx::Error> {
        let entities = sqlx::query_as::<_, ClientEntity>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY registered_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update a client's fields.
    pub async fn update(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        phone: Option<&str>,
        weight_kg: Option<f64>,
        height_m: Option<f64>,
        experience: Option<ExperienceLevel>,
        is_active: Option<bool>,
    ) -> Result<Option<Client>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ClientEntity>(&format!(
            r#"
            UPDATE clients
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                weight_kg = COALESCE($5, weight_kg),
                height_m = COALESCE($6, height_m),
                experience = COALESCE($7, experience),
                is_active = COALESCE($8, is_active)
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .bind(weight_kg)
        .bind(height_m)
        .bind(experience.map(|e| e.as_str()))
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Soft-delete a client by clearing the active flag. The row is kept.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE clients SET is_active = false WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active membership summaries for the client detail view.
    pub async fn active_memberships(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<ClientMembershipSummary>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, p.name AS plan, m.starts_on, m.ends_on
            FROM memberships m
            JOIN enrollments e ON e.id = m.enrollment_id
            JOIN membership_plans p ON p.id = m.plan_id
            WHERE e.client_id = $1
              AND m.status = 'active'
              AND m.starts_on <= CURRENT_DATE
              AND m.ends_on >= CURRENT_DATE
            ORDER BY m.ends_on
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        let today = chrono::Utc::now().date_naive();
        Ok(rows
            .into_iter()
            .map(|row| {
                let ends_on: chrono::NaiveDate = row.get("ends_on");
                ClientMembershipSummary {
                    id: row.get("id"),
                    plan: row.get("plan"),
                    starts_on: row.get("starts_on"),
                    ends_on,
                    days_remaining: (ends_on - today).num_days().max(0),
                }
            })
            .collect())
    }

    /// Total number of enrollments for a client.
    pub async fn enrollments_count(&self, client_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE client_id = $1")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await
    }
}
