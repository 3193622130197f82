//! Audit log repository for database operations.

use chrono::{Duration, Utc};
use domain::models::{
    ActiveUser, AuditEntry, DailyActivity, KindCount, ListAuditQuery, RecordActivityInput,
    SeverityCount,
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::entities::AuditEntryEntity;

const AUDIT_COLUMNS: &str = "a.id, a.user_id, u.username AS user_display_name, a.action_kind, \
                             a.action, a.description, a.severity, a.ip_address, a.user_agent, \
                             a.recorded_at, a.extra_data";

/// Helper for building dynamic WHERE clauses from audit log filters.
/// Tracks conditions and parameter positions.
struct AuditFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl AuditFilterBuilder {
    fn build(query: &ListAuditQuery) -> Self {
        let mut conditions = vec!["TRUE".to_string()];
        let mut param_count = 0;

        if query.usuario.is_some() {
            param_count += 1;
            conditions.push(format!("u.username ILIKE '%' || ${} || '%'", param_count));
        }

        if query.tipo_accion.is_some() {
            param_count += 1;
            conditions.push(format!("a.action_kind = ${}", param_count));
        }

        if query.nivel.is_some() {
            param_count += 1;
            conditions.push(format!("a.severity = ${}", param_count));
        }

        if query.fecha_inicio.is_some() {
            param_count += 1;
            conditions.push(format!("a.recorded_at >= ${}", param_count));
        }

        if query.fecha_fin.is_some() {
            param_count += 1;
            conditions.push(format!("a.recorded_at <= ${}", param_count));
        }

        if query.accion.is_some() {
            param_count += 1;
            conditions.push(format!("a.action ILIKE '%' || ${} || '%'", param_count));
        }

        if query.ip.is_some() {
            param_count += 1;
            conditions.push(format!("a.ip_address LIKE '%' || ${} || '%'", param_count));
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Macro to bind audit filter parameters to a SQLx builder in the same
/// order the conditions were added.
macro_rules! bind_audit_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref usuario) = $query.usuario {
            b = b.bind(usuario);
        }
        if let Some(ref tipo_accion) = $query.tipo_accion {
            b = b.bind(tipo_accion);
        }
        if let Some(ref nivel) = $query.nivel {
            b = b.bind(nivel);
        }
        if let Some(ref fecha_inicio) = $query.fecha_inicio {
            b = b.bind(fecha_inicio);
        }
        if let Some(ref fecha_fin) = $query.fecha_fin {
            b = b.bind(fecha_fin);
        }
        if let Some(ref accion) = $query.accion {
            b = b.bind(accion);
        }
        if let Some(ref ip) = $query.ip {
            b = b.bind(ip);
        }
        b
    }};
}

/// Repository for audit entry database operations. Entries are append-only.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one audit entry. The timestamp is assigned by the database.
    pub async fn insert(&self, input: RecordActivityInput) -> Result<AuditEntry, sqlx::Error> {
        let user_display_name: Option<String> = match input.user_id {
            Some(user_id) => {
                sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let row = sqlx::query(
            r#"
            INSERT INTO audit_entries
                (user_id, action_kind, action, description, severity,
                 ip_address, user_agent, extra_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, recorded_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.action_kind.as_str())
        .bind(&input.action)
        .bind(&input.description)
        .bind(input.severity.as_str())
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .bind(&input.extra_data)
        .fetch_one(&self.pool)
        .await?;

        Ok(AuditEntry {
            id: row.get("id"),
            user_id: input.user_id,
            user_display_name,
            action_kind: input.action_kind,
            action: input.action,
            description: input.description,
            severity: input.severity,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
            recorded_at: row.get("recorded_at"),
            extra_data: input.extra_data,
        })
    }

    /// List audit entries newest-first with pagination and filtering.
    /// Returns the page and the total row count.
    pub async fn list(
        &self,
        query: &ListAuditQuery,
    ) -> Result<(Vec<AuditEntry>, i64), sqlx::Error> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;

        let filter = AuditFilterBuilder::build(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!(
            r#"
            SELECT COUNT(*)
            FROM audit_entries a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE {}
            "#,
            where_clause
        );

        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_audit_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        // Ties inside one clock tick fall back to insertion (id) order
        let list_query = format!(
            r#"
            SELECT {}
            FROM audit_entries a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE {}
            ORDER BY a.recorded_at DESC, a.id DESC
            LIMIT ${} OFFSET ${}
            "#,
            AUDIT_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );

        let list_builder = sqlx::query_as::<_, AuditEntryEntity>(&list_query);
        let list_builder = bind_audit_filters!(list_builder, query);
        let entities = list_builder
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let entries = entities.into_iter().map(Into::into).collect();

        Ok((entries, total))
    }

    /// Find one entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditEntry>, sqlx::Error> {
        let entity = sqlx::query_as::<_, AuditEntryEntity>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS}
            FROM audit_entries a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE a.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Total entry count.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_entries")
            .fetch_one(&self.pool)
            .await
    }

    /// Entry counts grouped by action kind.
    pub async fn counts_by_kind(&self) -> Result<Vec<KindCount>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT action_kind, COUNT(*) AS count
            FROM audit_entries
            GROUP BY action_kind
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| KindCount {
                action_kind: row.get("action_kind"),
                count: row.get("count"),
            })
            .collect())
    }

    /// Entry counts grouped by severity.
    pub async fn counts_by_severity(&self) -> Result<Vec<SeverityCount>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT severity, COUNT(*) AS count
            FROM audit_entries
            GROUP BY severity
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SeverityCount {
                severity: row.get("severity"),
                count: row.get("count"),
            })
            .collect())
    }

    /// Per-day entry counts for the trailing 7 days, oldest day first.
    /// Days without activity appear with a zero count.
    pub async fn daily_activity_last_week(&self) -> Result<Vec<DailyActivity>, sqlx::Error> {
        let since = Utc::now() - Duration::days(6);

        let rows = sqlx::query(
            r#"
            SELECT recorded_at::date AS day, COUNT(*) AS count
            FROM audit_entries
            WHERE recorded_at >= $1::date
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let mut by_day: std::collections::HashMap<chrono::NaiveDate, i64> = rows
            .into_iter()
            .map(|row| (row.get("day"), row.get("count")))
            .collect();

        let today = Utc::now().date_naive();
        let mut days = Vec::with_capacity(7);
        for offset in (0..7).rev() {
            let date = today - Duration::days(offset);
            days.push(DailyActivity {
                date,
                count: by_day.remove(&date).unwrap_or(0),
            });
        }

        Ok(days)
    }

    /// The five users with the most recorded entries.
    pub async fn top_active_users(&self) -> Result<Vec<ActiveUser>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT a.user_id, u.username, COUNT(*) AS count
            FROM audit_entries a
            JOIN users u ON u.id = a.user_id
            WHERE a.user_id IS NOT NULL
            GROUP BY a.user_id, u.username
            ORDER BY count DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ActiveUser {
                user_id: row.get("user_id"),
                username: row.get("username"),
                count: row.get("count"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_query() -> ListAuditQuery {
        ListAuditQuery::default()
    }

    #[test]
    fn test_filter_builder_no_filters() {
        let filter = AuditFilterBuilder::build(&base_query());
        assert_eq!(filter.where_clause(), "TRUE");
        assert_eq!(filter.param_count(), 0);
    }

    #[test]
    fn test_filter_builder_counts_params_in_order() {
        let query = ListAuditQuery {
            usuario: Some("carlos".to_string()),
            nivel: Some("warning".to_string()),
            ip: Some("192.168".to_string()),
            ..base_query()
        };

        let filter = AuditFilterBuilder::build(&query);
        assert_eq!(filter.param_count(), 3);
        let clause = filter.where_clause();
        assert!(clause.contains("u.username ILIKE '%' || $1 || '%'"));
        assert!(clause.contains("a.severity = $2"));
        assert!(clause.contains("a.ip_address LIKE '%' || $3 || '%'"));
    }

    #[test]
    fn test_filter_builder_date_range() {
        let query = ListAuditQuery {
            fecha_inicio: Some(Utc::now()),
            fecha_fin: Some(Utc::now()),
            ..base_query()
        };

        let filter = AuditFilterBuilder::build(&query);
        assert_eq!(filter.param_count(), 2);
        assert!(filter.where_clause().contains("a.recorded_at >= $1"));
        assert!(filter.where_clause().contains("a.recorded_at <= $2"));
    }
}
