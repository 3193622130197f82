//! Audit recorder.
//!
//! Thin service over the audit repository implementing the two-tier
//! failure policy: `record` propagates write errors to the caller;
//! `record_or_log` logs them on the operational channel and continues, so
//! a secondary audit failure never masks a primary result and is never
//! silently dropped.

use persistence::repositories::AuditRepository;
use sqlx::PgPool;

use domain::models::{AuditEntry, RecordActivityInput};

/// Records audit entries describing who did what, when, from where.
#[derive(Clone)]
pub struct AuditRecorder {
    repo: AuditRepository,
}

impl AuditRecorder {
    /// Create a new recorder over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: AuditRepository::new(pool),
        }
    }

    /// Record one entry. The timestamp is assigned at insertion time by the
    /// database, never by the caller. Errors propagate.
    pub async fn record(&self, input: RecordActivityInput) -> Result<AuditEntry, sqlx::Error> {
        self.repo.insert(input).await
    }

    /// Record one entry on a non-critical path: a write failure is logged
    /// and the primary operation continues.
    pub async fn record_or_log(&self, input: RecordActivityInput) {
        let kind = input.action_kind;
        if let Err(e) = self.repo.insert(input).await {
            tracing::error!(action_kind = %kind, error = %e, "Failed to record audit entry");
        }
    }
}
