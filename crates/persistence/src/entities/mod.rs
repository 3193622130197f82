//! Database entities (row mappings).

pub mod audit;
pub mod client;
pub mod membership;
pub mod password_reset;
pub mod plan;
pub mod promotion;
pub mod role;
pub mod user;

pub use audit::AuditEntryEntity;
pub use client::ClientEntity;
pub use membership::{AppliedPromotionEntity, EnrollmentEntity, MembershipEntity};
pub use password_reset::PasswordResetTokenEntity;
pub use plan::PlanEntity;
pub use promotion::PromotionEntity;
pub use role::{PermissionEntity, RoleEntity};
pub use user::UserEntity;
