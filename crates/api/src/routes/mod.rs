//! HTTP route handlers.

pub mod audit_log;
pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod enrollments;
pub mod health;
pub mod memberships;
pub mod permissions;
pub mod plans;
pub mod promotions;
pub mod roles;
pub mod users;
