//! Admin bootstrap service for initial setup.
//!
//! Creates the first superuser account on startup if configured via
//! environment variables. Idempotent: if the account already exists it does
//! nothing. The `is_superuser` flag set here is the only superuser source
//! of truth; no bypass role exists.

use shared::password::{hash_password, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// Bootstrap the superuser account if configured and not already present.
///
/// Called after migrations on startup.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<(), BootstrapError> {
    if config.bootstrap_username.is_empty() {
        return Ok(());
    }

    if config.bootstrap_password.is_empty() {
        warn!("GYM__ADMIN__BOOTSTRAP_USERNAME is set but GYM__ADMIN__BOOTSTRAP_PASSWORD is empty - skipping bootstrap");
        return Ok(());
    }

    let superuser_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users WHERE username = $1 OR is_superuser = true
        )
        "#,
    )
    .bind(&config.bootstrap_username)
    .fetch_one(pool)
    .await?;

    if superuser_exists {
        info!("Superuser already exists - skipping bootstrap");
        return Ok(());
    }

    let password_hash = hash_password(&config.bootstrap_password)?;

    sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, is_active, is_superuser)
        VALUES ($1, $2, $3, true, true)
        "#,
    )
    .bind(&config.bootstrap_username)
    .bind(&config.bootstrap_email)
    .bind(&password_hash)
    .execute(pool)
    .await?;

    info!(username = %config.bootstrap_username, "Bootstrap superuser created");

    Ok(())
}
