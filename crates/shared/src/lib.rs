//! Shared types, errors, and configuration for the meal card ledger.
//!
//! This crate provides common types used across all other crates:
//! - Integer credit amounts
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Identity claims and token verification

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, Role};
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorKind};
pub use jwt::{JwtConfig, JwtError, JwtService};
