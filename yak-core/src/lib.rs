//! Shared data model for the YAK broker.
//!
//! This crate has no knowledge of HTTP, the coordinator wire protocol, or the
//! filesystem — it only defines the types that flow between them, and the
//! coordinator key layout both sides must agree on.

mod constants;
pub mod keys;
mod lease;
mod log_error;
mod message;
mod topic;

pub use constants::{
    CATCHUP_TIMEOUT, DISCOVER_TIMEOUT, LEASE_TTL, MAX_MESSAGE_BYTES, REGISTRY_TTL, RENEW_INTERVAL,
    REPLICATE_TIMEOUT,
};
pub use lease::{BrokerRecord, LeaseRecord};
pub use log_error::LogError;
pub use message::{Message, Offset};
pub use topic::{InvalidTopicName, TopicName};
