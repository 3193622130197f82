use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_user_auth, security_headers_middleware, trace_id,
};
use crate::routes::{
    audit_log, auth, clients, dashboard, enrollments, health, memberships, permissions, plans,
    promotions, roles, users,
};
use crate::services::{AuditRecorder, AuthzService, EmailService};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub authz: AuthzService,
    pub audit: AuditRecorder,
    pub email: EmailService,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let email = EmailService::new(config.email.clone());
    let config = Arc::new(config);

    let state = AppState {
        authz: AuthzService::new(pool.clone()),
        audit: AuditRecorder::new(pool.clone()),
        email,
        pool,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Protected routes (require a valid bearer access token)
    let protected_routes = Router::new()
        .nest("/api/usuarios", users::router())
        .nest("/api/roles", roles::router())
        .nest("/api/permisos", permissions::router())
        .nest("/api/bitacora", audit_log::router())
        .nest("/api/clientes", clients::router())
        .nest("/api/planes", plans::router())
        .nest("/api/promociones", promotions::router())
        .nest("/api/inscripciones", enrollments::router())
        .nest("/api/membresias", memberships::router())
        .route("/api/registrar-bitacora", post(audit_log::record_entry))
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/logout", post(auth::logout))
        .route("/api/user-info", get(auth::user_info))
        .route(
            "/api/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route("/api/change-password", post(auth::change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/token", post(auth::token))
        .route("/api/token/refresh", post(auth::refresh))
        .route("/api/forgot-password", post(auth::forgot_password))
        .route("/api/reset-password", post(auth::reset_password))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
