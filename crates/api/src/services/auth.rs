//! Authentication service: login, token refresh, logout, and the
//! password-reset state machine.

use chrono::Utc;
use shared::crypto::{generate_secure_token, sha256_hex};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use domain::models::{User, RESET_TOKEN_TTL_SECS};
use persistence::repositories::UserRepository;

use crate::config::JwtAuthConfig;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("User is disabled")]
    UserDisabled,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Invalid or already used reset token")]
    InvalidResetToken,

    #[error("Reset token has expired")]
    ExpiredResetToken,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_in: i64,
}

/// Token pair with the session-tracking identifiers.
#[derive(Debug, Clone)]
struct TokenPair {
    access_token: String,
    access_token_jti: String,
    refresh_token: String,
    refresh_token_jti: String,
}

/// Result of a successful token refresh.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Database row for session queries.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    expires_at: chrono::DateTime<Utc>,
}

/// Database row for reset token queries.
#[derive(Debug, sqlx::FromRow)]
struct ResetTokenRow {
    id: Uuid,
    user_id: Uuid,
    expires_at: chrono::DateTime<Utc>,
}

/// Authentication service.
pub struct AuthService {
    pool: PgPool,
    users: UserRepository,
    jwt_config: JwtConfig,
    access_token_expiry: i64,
}

impl AuthService {
    /// Creates a new AuthService with the given database pool and JWT
    /// configuration.
    pub fn new(pool: PgPool, jwt_config: &JwtAuthConfig) -> Result<Self, AuthError> {
        let jwt = JwtConfig::with_leeway(
            &jwt_config.private_key,
            &jwt_config.public_key,
            jwt_config.access_token_expiry_secs,
            jwt_config.refresh_token_expiry_secs,
            jwt_config.leeway_secs,
        )
        .map_err(|e| AuthError::Internal(format!("Failed to initialize JWT: {}", e)))?;

        Ok(Self {
            users: UserRepository::new(pool.clone()),
            pool,
            jwt_config: jwt,
            access_token_expiry: jwt_config.access_token_expiry_secs,
        })
    }

    /// Authenticate a user by username and password, returning a token pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResult, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let password_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.users.touch_last_login(user.id).await?;

        let tokens = self.generate_tokens(user.id)?;
        self.create_session(user.id, &tokens).await?;

        Ok(AuthResult {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_token_expires_in: self.access_token_expiry,
        })
    }

    /// Rotate a refresh token into a fresh access/refresh pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResult, AuthError> {
        let claims = self
            .jwt_config
            .validate_refresh_token(refresh_token)
            .map_err(|e| match e {
                JwtError::TokenExpired | JwtError::InvalidToken => AuthError::InvalidRefreshToken,
                _ => AuthError::TokenError(e),
            })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;
        let jti_hash = sha256_hex(&claims.jti);

        let session: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, expires_at
            FROM user_sessions
            WHERE refresh_token_hash = $1 AND user_id = $2
            "#,
        )
        .bind(&jti_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let session = session.ok_or(AuthError::SessionNotFound)?;

        if session.expires_at < Utc::now() {
            sqlx::query("DELETE FROM user_sessions WHERE id = $1")
                .bind(session.id)
                .execute(&self.pool)
                .await?;
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let new_tokens = self.generate_tokens(user_id)?;
        let new_expires_at =
            Utc::now() + chrono::Duration::seconds(self.jwt_config.refresh_token_expiry_secs);

        sqlx::query(
            r#"
            UPDATE user_sessions
            SET token_hash = $1, refresh_token_hash = $2, expires_at = $3, last_used_at = now()
            WHERE id = $4
            "#,
        )
        .bind(sha256_hex(&new_tokens.access_token_jti))
        .bind(sha256_hex(&new_tokens.refresh_token_jti))
        .bind(new_expires_at)
        .bind(session.id)
        .execute(&self.pool)
        .await?;

        Ok(RefreshResult {
            access_token: new_tokens.access_token,
            refresh_token: new_tokens.refresh_token,
            expires_in: self.access_token_expiry,
        })
    }

    /// End the session behind a refresh token. Already-missing sessions are
    /// treated as logged out, not as an error.
    pub async fn logout(&self, refresh_token: &str) -> Result<Uuid, AuthError> {
        let claims = self
            .jwt_config
            .validate_refresh_token(refresh_token)
            .map_err(|e| match e {
                JwtError::TokenExpired | JwtError::InvalidToken => AuthError::InvalidRefreshToken,
                _ => AuthError::TokenError(e),
            })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;
        let jti_hash = sha256_hex(&claims.jti);

        let result =
            sqlx::query("DELETE FROM user_sessions WHERE refresh_token_hash = $1 AND user_id = $2")
                .bind(&jti_hash)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(user_id = %user_id, "Session not found during logout, may already be logged out");
        }

        Ok(user_id)
    }

    /// Issue a password reset token for a known, active email.
    ///
    /// Invalidates all still-valid tokens for the user and creates the new
    /// one inside a single transaction, so two concurrent requests cannot
    /// leave two simultaneously valid tokens. Returns the user and the
    /// opaque token value for the reset email, or `None` for an unknown or
    /// inactive email (the endpoint reports success either way).
    pub async fn forgot_password(
        &self,
        email: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Option<(User, String)>, AuthError> {
        let user = match self.users.find_active_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::debug!(email = %email, "Password reset requested for unknown email");
                return Ok(None);
            }
        };

        let reset_token = generate_secure_token();
        let token_hash = sha256_hex(&reset_token);
        let expires_at = Utc::now() + chrono::Duration::seconds(RESET_TOKEN_TTL_SECS);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET used = true
            WHERE user_id = $1 AND used = false AND expires_at > now()
            "#,
        )
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens
                (user_id, token_hash, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&token_hash)
        .bind(expires_at)
        .bind(ip_address)
        .bind(user_agent)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, "Password reset token generated");

        Ok(Some((user, reset_token)))
    }

    /// Consume a reset token and apply the new password.
    ///
    /// Rejects unknown or already-used tokens as invalid and timed-out ones
    /// as expired. On success the token is marked used, every other
    /// still-valid token for the user is invalidated, the password is
    /// replaced and all sessions are dropped - in one transaction.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<User, AuthError> {
        let token_hash = sha256_hex(token);

        let row: Option<ResetTokenRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, expires_at
            FROM password_reset_tokens
            WHERE token_hash = $1 AND used = false
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(AuthError::InvalidResetToken)?;

        if row.expires_at < Utc::now() {
            return Err(AuthError::ExpiredResetToken);
        }

        let user = self
            .users
            .find_by_id(row.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let password_hash = hash_password(new_password)?;

        let mut tx = self.pool.begin().await?;

        // Guards against a concurrent consumption of the same token
        let marked = sqlx::query(
            "UPDATE password_reset_tokens SET used = true WHERE id = $1 AND used = false",
        )
        .bind(row.id)
        .execute(&mut *tx)
        .await?;
        if marked.rows_affected() == 0 {
            return Err(AuthError::InvalidResetToken);
        }

        sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET used = true
            WHERE user_id = $1 AND used = false AND expires_at > now()
            "#,
        )
        .bind(row.user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(&password_hash)
            .bind(row.user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(row.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %row.user_id, "Password reset applied, sessions invalidated");

        Ok(user)
    }

    /// Change the password of an authenticated user after verifying the
    /// current one. Other sessions are dropped.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
        current_jti: &str,
    ) -> Result<User, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(current_password, password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let new_hash = hash_password(new_password)?;
        self.users.set_password_hash(user_id, &new_hash).await?;

        // Keep the session that made the change, drop the rest
        sqlx::query("DELETE FROM user_sessions WHERE user_id = $1 AND token_hash != $2")
            .bind(user_id)
            .bind(sha256_hex(current_jti))
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    fn generate_tokens(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let (access_token, access_token_jti) = self.jwt_config.generate_access_token(user_id)?;
        let (refresh_token, refresh_token_jti) = self.jwt_config.generate_refresh_token(user_id)?;

        Ok(TokenPair {
            access_token,
            access_token_jti,
            refresh_token,
            refresh_token_jti,
        })
    }

    async fn create_session(&self, user_id: Uuid, tokens: &TokenPair) -> Result<(), AuthError> {
        let expires_at =
            Utc::now() + chrono::Duration::seconds(self.jwt_config.refresh_token_expiry_secs);

        sqlx::query(
            r#"
            INSERT INTO user_sessions (user_id, token_hash, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(sha256_hex(&tokens.access_token_jti))
        .bind(sha256_hex(&tokens.refresh_token_jti))
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
