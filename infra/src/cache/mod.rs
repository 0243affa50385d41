//! Cache module for Redis-backed storage
//!
//! This module provides the Redis client with connection retry logic and the
//! Redis implementation of the verification record store.

pub mod redis_client;
pub mod verification_store;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;
pub use verification_store::RedisVerificationStore;

// Re-export commonly used types
pub use vm_shared::config::CacheConfig;
