//! Shared types, errors, and configuration for Bonusmart.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT issuing and validation
//! - Authentication request/response types

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use config::{AppConfig, JwtConfig};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
