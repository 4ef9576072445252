use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tokio::sync::Mutex;
use yak_core::{LeaseRecord, TopicName};
use yak_coordinator::Coordinator;
use yak_runtime::{BrokerRegistry, HwmService, LeaseManager, ReplicationEngine, Role, RoleController};

use crate::log_store::LogStore;

/// This broker's identity, as given on the CLI and advertised to peers.
#[derive(Debug, Clone)]
pub struct SelfInfo {
    pub broker_id: u64,
    pub host: String,
    pub port: u16,
}

/// Everything an HTTP handler needs, shared across the whole process.
///
/// `produce_locks` holds one `tokio::sync::Mutex` per topic guarding the
/// `next_offset → append → advance_hwm` sequence end to end, including the
/// replication fanout RPCs — an async-aware mutex, unlike the log store's own
/// `parking_lot::Mutex<File>`, because this critical section spans `.await`
/// points.
pub struct AppState {
    pub me: SelfInfo,
    pub coordinator: Arc<dyn Coordinator>,
    pub log_store: Arc<LogStore>,
    pub hwm: Arc<HwmService>,
    pub registry: Arc<BrokerRegistry>,
    pub lease: Arc<LeaseManager>,
    pub replication: Arc<ReplicationEngine>,
    pub role_controller: Arc<RoleController>,
    produce_locks: DashMap<TopicName, Arc<Mutex<()>>>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        me: SelfInfo,
        coordinator: Arc<dyn Coordinator>,
        log_store: Arc<LogStore>,
        hwm: Arc<HwmService>,
        registry: Arc<BrokerRegistry>,
        lease: Arc<LeaseManager>,
        replication: Arc<ReplicationEngine>,
        role_controller: Arc<RoleController>,
    ) -> Self {
        Self {
            me,
            coordinator,
            log_store,
            hwm,
            registry,
            lease,
            replication,
            role_controller,
            produce_locks: DashMap::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role_controller.current()
    }

    pub fn role_handle(&self) -> Arc<ArcSwap<Role>> {
        self.role_controller.role_handle()
    }

    /// The per-topic produce mutex, created lazily on first use.
    pub fn produce_lock(&self, topic: &TopicName) -> Arc<Mutex<()>> {
        self.produce_locks.entry(topic.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    pub async fn current_leader(&self) -> yak_runtime::Result<Option<LeaseRecord>> {
        self.lease.current_leader().await
    }
}
