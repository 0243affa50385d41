//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Verimail backend,
//! following Clean Architecture principles. It provides concrete
//! implementations of the repository and notifier traits defined in
//! `vm_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis client and the Redis-backed verification record store
//! - **Database**: MySQL connection pool, verification record store and identity repository
//! - **Email**: HTTP email API notifier and a development log notifier
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

use vm_core::errors::DomainError;

/// Cache module - Redis client and verification record store
pub mod cache;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Email module - verification code delivery
pub mod email;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Store {
            message: err.to_string(),
        }
    }
}
