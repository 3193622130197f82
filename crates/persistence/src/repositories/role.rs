//! Role repository for database operations.

use domain::models::{Permission, PermissionCode, Role};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PermissionEntity, RoleEntity};

/// Repository for role and role-permission database operations.
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a role and link its permission set atomically.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        permission_ids: &[Uuid],
    ) -> Result<Role, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, RoleEntity>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, is_active, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        for permission_id in permission_ids {
            sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, permission_id)
                VALUES ($1, $2)
                ON CONFLICT (role_id, permission_id) DO NOTHING
                "#,
            )
            .bind(entity.id)
            .bind(permission_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(entity.into())
    }

    /// Find a role by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, sqlx::Error> {
        let entity = sqlx::query_as::<_, RoleEntity>(
            "SELECT id, name, description, is_active, created_at FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Find a role by its unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let entity = sqlx::query_as::<_, RoleEntity>(
            "SELECT id, name, description, is_active, created_at FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List all roles ordered by name.
    pub async fn list(&self) -> Result<Vec<Role>, sqlx::Error> {
        let entities = sqlx::query_as::<_, RoleEntity>(
            "SELECT id, name, description, is_active, created_at FROM roles ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update a role's fields and, when a new permission set is given,
    /// replace the old set atomically.
    ///
    /// The diff-and-replace runs inside one transaction so a concurrent
    /// permission check never observes a partial set.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        is_active: Option<bool>,
        permission_ids: Option<&[Uuid]>,
    ) -> Result<Option<Role>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, RoleEntity>(
            r#"
            UPDATE roles
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active)
            WHERE id = $1
            RETURNING id, name, description, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(is_active)
        .fetch_optional(&mut *tx)
        .await?;

        let entity = match entity {
            Some(e) => e,
            None => return Ok(None),
        };

        if let Some(new_set) = permission_ids {
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id != ALL($2)")
                .bind(id)
                .bind(new_set)
                .execute(&mut *tx)
                .await?;

            for permission_id in new_set {
                sqlx::query(
                    r#"
                    INSERT INTO role_permissions (role_id, permission_id)
                    VALUES ($1, $2)
                    ON CONFLICT (role_id, permission_id) DO NOTHING
                    "#,
                )
                .bind(id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(Some(entity.into()))
    }

    /// Flip a role's active flag. Returns the updated role.
    pub async fn toggle_status(&self, id: Uuid) -> Result<Option<Role>, sqlx::Error> {
        let entity = sqlx::query_as::<_, RoleEntity>(
            r#"
            UPDATE roles
            SET is_active = NOT is_active
            WHERE id = $1
            RETURNING id, name, description, is_active, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Delete a role. The caller must have verified no user is assigned.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Permissions linked to a role.
    pub async fn permissions_of(&self, role_id: Uuid) -> Result<Vec<Permission>, sqlx::Error> {
        let entities = sqlx::query_as::<_, PermissionEntity>(
            r#"
            SELECT p.id, p.code, p.name, p.description
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = $1
            ORDER BY p.code
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Count users assigned to a role.
    pub async fn users_count(&self, role_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role_id = $1")
                .bind(role_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Check whether any role assigned to the user carries the permission.
    pub async fn user_has_permission(
        &self,
        user_id: Uuid,
        code: PermissionCode,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM user_roles ur
                JOIN role_permissions rp ON rp.role_id = ur.role_id
                JOIN permissions p ON p.id = rp.permission_id
                WHERE ur.user_id = $1 AND p.code = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(code.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Distinct permission codes granted to a user across all roles.
    pub async fn permission_codes_of_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        let codes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT p.code
            FROM user_roles ur
            JOIN role_permissions rp ON rp.role_id = ur.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1
            ORDER BY p.code
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    /// Roles assigned to a user.
    pub async fn roles_of_user(&self, user_id: Uuid) -> Result<Vec<Role>, sqlx::Error> {
        let entities = sqlx::query_as::<_, RoleEntity>(
            r#"
            SELECT r.id, r.name, r.description, r.is_active, r.created_at
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

}
