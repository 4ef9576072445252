//! Coordinator key layout.
//!
//! Every key the broker ever touches in the coordinator is built here, so the
//! literal `yak:` prefix and per-key shape only need to be right in one place.

use crate::TopicName;

pub const LEASE: &str = "yak:leader_lease";
pub const EPOCH: &str = "yak:epoch";

pub fn broker(id: u64) -> String {
    format!("yak:broker:{id}")
}

pub fn broker_prefix() -> &'static str {
    "yak:broker:"
}

pub fn hwm(topic: &TopicName) -> String {
    format!("yak:hwm:{topic}")
}

pub fn offset(topic: &TopicName) -> String {
    format!("yak:offset:{topic}")
}

pub fn follower_hwm(broker_id: u64, topic: &TopicName) -> String {
    format!("yak:follower_hwm:{broker_id}:{topic}")
}
