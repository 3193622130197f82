//! Application services.

pub mod admin_bootstrap;
pub mod audit;
pub mod auth;
pub mod authz;
pub mod email;

#[allow(unused_imports)] // Re-exports for downstream use
pub use audit::AuditRecorder;
#[allow(unused_imports)] // Re-exports for downstream use
pub use auth::{AuthError, AuthService};
#[allow(unused_imports)] // Re-exports for downstream use
pub use authz::AuthzService;
#[allow(unused_imports)] // Re-exports for downstream use
pub use email::{EmailMessage, EmailService};
