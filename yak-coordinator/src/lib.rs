//! Typed wrapper over the external atomic key/value coordinator.

mod client;
mod error;
mod mock;
mod redis_backend;

pub use client::Coordinator;
pub use error::{Error, Result};
pub use mock::InMemoryCoordinator;
pub use redis_backend::RedisCoordinator;
