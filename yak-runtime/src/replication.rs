use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use yak_core::{keys, LeaseRecord, LogError, Message, Offset, TopicName};
use yak_coordinator::Coordinator;

use crate::peer::PeerClient;
use crate::registry::PeerAddr;
use crate::Result;

/// The slice of the on-disk log that the replication engine needs, supplied
/// by whatever owns the real files (`yak-broker::log_store`).
///
/// Kept as a trait here, rather than a concrete type, for the same reason
/// `kube-runtime`'s controller machinery takes a `Store` trait instead of a
/// concrete cache: the engine only ever needs to ask "do I have this offset"
/// and "append this", never how the bytes get to disk.
#[async_trait]
pub trait LocalLog: Send + Sync {
    /// Create the topic locally if it is not already known. A no-op if it is.
    async fn ensure_topic(&self, topic: &TopicName) -> std::result::Result<(), LogError>;
    async fn has_offset(&self, topic: &TopicName, offset: Offset) -> std::result::Result<bool, LogError>;
    async fn append(&self, topic: &TopicName, message: &Message) -> std::result::Result<(), LogError>;
    async fn known_topics(&self) -> Vec<TopicName>;
}

/// Leader-side fanout and follower-side catch-up.
pub struct ReplicationEngine {
    coordinator: Arc<dyn Coordinator>,
    peers: PeerClient,
    log: Arc<dyn LocalLog>,
    my_id: u64,
}

impl ReplicationEngine {
    pub fn new(coordinator: Arc<dyn Coordinator>, log: Arc<dyn LocalLog>, my_id: u64) -> Self {
        Self {
            coordinator,
            peers: PeerClient::new(),
            log,
            my_id,
        }
    }

    /// Replicate one just-appended message to every live peer.
    ///
    /// Invoked inline during produce, after the local append and before the
    /// high-water mark is advanced. Runs all peer calls concurrently; a
    /// failure against any one peer is logged and otherwise ignored — the
    /// peer recovers via catch-up on its own next tick.
    pub async fn fanout(&self, topic: &TopicName, message: &Message, live_peers: &[PeerAddr]) {
        let calls = live_peers.iter().map(|peer| {
            let topic = topic.clone();
            let message = message.clone();
            async move {
                if let Err(err) = self.peers.replicate(&peer.host, peer.port, &topic, &message).await {
                    tracing::warn!(peer = peer.broker_id, topic = %topic, error = %err, "replication to peer failed");
                }
            }
        });
        join_all(calls).await;
    }

    /// Run one follower catch-up pass against `leader`.
    ///
    /// No-op if `leader.broker_id == self.my_id`. Callers are expected to
    /// have already checked "leader is self or absent" before invoking this,
    /// but the check is repeated here defensively.
    #[tracing::instrument(skip(self, leader), fields(leader = leader.broker_id))]
    pub async fn catch_up(&self, leader: &LeaseRecord) -> Result<()> {
        if leader.broker_id == self.my_id {
            return Ok(());
        }

        let remote_topics = self.peers.discover_topics(&leader.host, leader.port).await?;
        let mut topics = self.log.known_topics().await;
        for t in remote_topics {
            if !topics.contains(&t) {
                topics.push(t);
            }
        }

        for topic in topics {
            self.catch_up_topic(leader, &topic).await?;
        }
        Ok(())
    }

    async fn catch_up_topic(&self, leader: &LeaseRecord, topic: &TopicName) -> Result<()> {
        // A freshly restarted or newly joined follower may be catching up on a
        // topic it has no local directory for yet; the leader is the source
        // of truth for topic existence during catch-up (unlike /internal/replicate,
        // which never auto-creates — see spec §4.5 vs §4.1).
        self.log.ensure_topic(topic).await?;

        let key = keys::follower_hwm(self.my_id, topic);
        let from_offset = Offset(
            self.coordinator
                .get(&key)
                .await?
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        );

        let messages = self.fetch_catchup_batch(leader, topic, from_offset).await?;
        for message in messages {
            if self.log.has_offset(topic, message.offset).await? {
                continue;
            }
            self.log.append(topic, &message).await?;
            self.coordinator.set(&key, &message.offset.get().to_string()).await?;
        }
        Ok(())
    }

    /// Fetch one topic's catch-up batch, retrying transient peer failures a
    /// few times within the current tick rather than waiting a full
    /// `RENEW_INTERVAL` for the next one.
    async fn fetch_catchup_batch(&self, leader: &LeaseRecord, topic: &TopicName, from_offset: Offset) -> Result<Vec<Message>> {
        let backoff = backoff::ExponentialBackoffBuilder::new()
            .with_initial_interval(std::time::Duration::from_millis(50))
            .with_max_elapsed_time(Some(std::time::Duration::from_secs(2)))
            .build();
        backoff::future::retry(backoff, || async {
            self.peers
                .catchup(&leader.host, leader.port, topic, from_offset)
                .await
                .map_err(backoff::Error::transient)
        })
        .await
    }
}
