//! Shared utilities and common types for the gym admin backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (hashing, opaque token generation)
//! - Password hashing with Argon2id
//! - JWT access/refresh token handling
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
