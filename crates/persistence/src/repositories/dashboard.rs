//! Dashboard statistics repository.

use sqlx::{PgPool, Row};

/// Aggregate counts shown on the admin dashboard.
#[derive(Debug, Clone)]
pub struct DashboardCounts {
    pub active_users: i64,
    pub roles: i64,
    pub active_clients: i64,
    pub active_memberships: i64,
    pub plans: i64,
    pub active_promotions: i64,
}

/// Repository for dashboard statistics.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gather all dashboard counts in one round trip.
    pub async fn counts(&self) -> Result<DashboardCounts, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE is_active = true) AS active_users,
                (SELECT COUNT(*) FROM roles) AS roles,
                (SELECT COUNT(*) FROM clients WHERE is_active = true) AS active_clients,
                (SELECT COUNT(*) FROM memberships
                 WHERE status = 'active'
                   AND starts_on <= CURRENT_DATE
                   AND ends_on >= CURRENT_DATE) AS active_memberships,
                (SELECT COUNT(*) FROM membership_plans WHERE is_active = true) AS plans,
                (SELECT COUNT(*) FROM promotions
                 WHERE status = 'active'
                   AND starts_on <= CURRENT_DATE
                   AND ends_on >= CURRENT_DATE) AS active_promotions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardCounts {
            active_users: row.get("active_users"),
            roles: row.get("roles"),
            active_clients: row.get("active_clients"),
            active_memberships: row.get("active_memberships"),
            plans: row.get("plans"),
            active_promotions: row.get("active_promotions"),
        })
    }
}
