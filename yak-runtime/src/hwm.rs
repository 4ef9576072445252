use std::sync::Arc;

use yak_core::{keys, Offset, TopicName};
use yak_coordinator::Coordinator;

use crate::Result;

/// Offset allocation and high-water-mark bookkeeping.
///
/// A thin wrapper over the coordinator's atomic `incr`/`get`/`set` — all the
/// ordering guarantees live in the caller's per-topic mutex, not here.
pub struct HwmService {
    coordinator: Arc<dyn Coordinator>,
}

impl HwmService {
    pub fn new(coordinator: Arc<dyn Coordinator>) -> Self {
        Self { coordinator }
    }

    /// Atomically allocate the next offset for `topic` across the cluster.
    pub async fn next_offset(&self, topic: &TopicName) -> Result<Offset> {
        let value = self.coordinator.incr(&keys::offset(topic)).await?;
        Ok(Offset::from(value))
    }

    /// Unconditionally advance the high-water mark for `topic` to `offset`.
    ///
    /// Assumes the caller is the leader and that calls for a given topic are
    /// issued in offset order — no compare-and-swap here.
    pub async fn advance_hwm(&self, topic: &TopicName, offset: Offset) -> Result<()> {
        self.coordinator.set(&keys::hwm(topic), &offset.get().to_string()).await?;
        Ok(())
    }

    /// Read the current high-water mark for `topic`, defaulting to 0.
    pub async fn hwm(&self, topic: &TopicName) -> Result<Offset> {
        let raw = self.coordinator.get(&keys::hwm(topic)).await?;
        Ok(Offset(raw.and_then(|s| s.parse().ok()).unwrap_or(0)))
    }

    /// Initialize a freshly registered topic's counters to zero.
    pub async fn init_topic(&self, topic: &TopicName) -> Result<()> {
        self.coordinator.set(&keys::offset(topic), "0").await?;
        self.coordinator.set(&keys::hwm(topic), "0").await?;
        Ok(())
    }
}
