//! Permission repository for database operations.

use domain::models::{Permission, PermissionCode};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PermissionEntity;

/// Repository for permission database operations.
#[derive(Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a permission row for one of the closed codes.
    pub async fn create(
        &self,
        code: PermissionCode,
        name: &str,
        description: Option<&str>,
    ) -> Result<Permission, sqlx::Error> {
        let entity = sqlx::query_as::<_, PermissionEntity>(
            r#"
            INSERT INTO permissions (code, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, code, name, description
            "#,
        )
        .bind(code.as_str())
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a permission by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PermissionEntity>(
            "SELECT id, code, name, description FROM permissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Find a permission by its code.
    pub async fn find_by_code(
        &self,
        code: PermissionCode,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PermissionEntity>(
            "SELECT id, code, name, description FROM permissions WHERE code = $1",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List all permissions ordered by code.
    pub async fn list(&self) -> Result<Vec<Permission>, sqlx::Error> {
        let entities = sqlx::query_as::<_, PermissionEntity>(
            "SELECT id, code, name, description FROM permissions ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Count how many of the given permission ids exist.
    pub async fn count_existing(&self, ids: &[Uuid]) -> Result<i64, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM permissions WHERE id = ANY($1)")
                .bind(ids)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Update a permission's display fields.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PermissionEntity>(
            r#"
            UPDATE permissions
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, code, name, description
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Delete a permission. The caller must have verified no role references it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count roles that reference a permission.
    pub async fn roles_referencing(&self, id: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM role_permissions WHERE permission_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
