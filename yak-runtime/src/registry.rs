use std::sync::Arc;

use chrono::Utc;
use yak_core::{keys, BrokerRecord, REGISTRY_TTL};
use yak_coordinator::Coordinator;

use crate::Result;

/// Peer address as returned by [`BrokerRegistry::live_peers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddr {
    pub broker_id: u64,
    pub host: String,
    pub port: u16,
}

/// Self-registration and peer discovery over `yak:broker:<id>`.
pub struct BrokerRegistry {
    coordinator: Arc<dyn Coordinator>,
    my_id: u64,
    my_host: String,
    my_port: u16,
}

impl BrokerRegistry {
    pub fn new(coordinator: Arc<dyn Coordinator>, my_id: u64, my_host: String, my_port: u16) -> Self {
        Self {
            coordinator,
            my_id,
            my_host,
            my_port,
        }
    }

    /// Write this broker's heartbeat record with the full registry TTL.
    pub async fn register(&self) -> Result<()> {
        self.write_record().await
    }

    /// Refresh `last_seen` and the TTL. Called every `LEASE_TTL / 2` by the
    /// heartbeat loop.
    pub async fn heartbeat(&self) -> Result<()> {
        self.write_record().await
    }

    async fn write_record(&self) -> Result<()> {
        let record = BrokerRecord::now(self.my_id, self.my_host.clone(), self.my_port);
        let fields = record.to_fields();
        let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.coordinator
            .hset_many_with_ttl(&keys::broker(self.my_id), &fields, REGISTRY_TTL)
            .await?;
        Ok(())
    }

    /// Enumerate peers that have heartbeat within `2 * LEASE_TTL`, excluding self.
    ///
    /// The coordinator's own TTL already evicts stale entries, but a crashed
    /// write can leave one lingering at its old TTL; the explicit staleness
    /// check below is the belt to that braces.
    pub async fn live_peers(&self) -> Result<Vec<PeerAddr>> {
        let now_ms = Utc::now().timestamp_millis();
        let staleness_ms = 2 * yak_core::LEASE_TTL.as_millis() as i64;
        let mut peers = Vec::new();
        for key in self.coordinator.keys(keys::broker_prefix()).await? {
            let raw = self.coordinator.hgetall(&key).await?;
            let Some(record) = BrokerRecord::from_fields(&raw) else {
                tracing::warn!(key, "broker registry entry failed to decode, skipping");
                continue;
            };
            if record.broker_id == self.my_id {
                continue;
            }
            if now_ms - record.last_seen_unix_ms > staleness_ms {
                continue;
            }
            peers.push(PeerAddr {
                broker_id: record.broker_id,
                host: record.host,
                port: record.port,
            });
        }
        Ok(peers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yak_coordinator::InMemoryCoordinator;

    #[tokio::test]
    async fn registration_is_visible_to_peers_but_not_to_self() {
        let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
        let r1 = BrokerRegistry::new(coordinator.clone(), 1, "h1".into(), 1);
        let r2 = BrokerRegistry::new(coordinator, 2, "h2".into(), 2);
        r1.register().await.unwrap();
        r2.register().await.unwrap();

        let peers_of_1 = r1.live_peers().await.unwrap();
        assert_eq!(peers_of_1.len(), 1);
        assert_eq!(peers_of_1[0].broker_id, 2);

        let peers_of_2 = r2.live_peers().await.unwrap();
        assert_eq!(peers_of_2.len(), 1);
        assert_eq!(peers_of_2[0].broker_id, 1);
    }

    #[tokio::test]
    async fn heartbeat_keeps_registration_alive() {
        let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
        let r1 = BrokerRegistry::new(coordinator.clone(), 1, "h1".into(), 1);
        let r2 = BrokerRegistry::new(coordinator, 2, "h2".into(), 2);
        r1.register().await.unwrap();
        r1.heartbeat().await.unwrap();
        assert_eq!(r2.live_peers().await.unwrap().len(), 1);
    }
}
