//! Custom Axum extractors.

pub mod request_context;
pub mod user_auth;

#[allow(unused_imports)] // Re-exports for downstream use
pub use request_context::RequestContext;
#[allow(unused_imports)] // Re-exports for downstream use
pub use user_auth::UserAuth;
