//! Domain layer for the gym admin backend.
//!
//! This crate contains:
//! - Domain models (users, roles, permissions, audit entries, clients,
//!   plans, promotions, enrollments, memberships)
//! - Request/response types with validation
//! - The closed permission-code table used by the authorization evaluator

pub mod models;
