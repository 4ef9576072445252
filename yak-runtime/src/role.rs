use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use yak_core::RENEW_INTERVAL;

use crate::lease::LeaseManager;
use crate::replication::ReplicationEngine;

/// This broker's current position in the leader/follower state machine.
///
/// Never read as a raw `bool` anywhere downstream — a redirect response to a
/// follower-hit leader-only endpoint also needs the leader's identity, which
/// callers get from [`LeaseManager::current_leader`] rather than from `Role`
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Follower,
}

/// Drives the two-state machine in [`Role`]: a single background
/// tick loop that attempts acquisition or renewal every `RENEW_INTERVAL`, and
/// publishes the result through an [`ArcSwap`] so HTTP handlers can take a
/// cheap snapshot without blocking on the tick.
pub struct RoleController {
    lease: Arc<LeaseManager>,
    replication: Arc<ReplicationEngine>,
    role: Arc<ArcSwap<Role>>,
}

impl RoleController {
    pub fn new(lease: Arc<LeaseManager>, replication: Arc<ReplicationEngine>) -> Self {
        Self {
            lease,
            replication,
            role: Arc::new(ArcSwap::from_pointee(Role::Follower)),
        }
    }

    /// A cheap, shareable handle HTTP handlers can snapshot per request.
    pub fn role_handle(&self) -> Arc<ArcSwap<Role>> {
        self.role.clone()
    }

    pub fn current(&self) -> Role {
        **self.role.load()
    }

    /// Run the tick loop until `shutdown` is cancelled.
    ///
    /// Waits out a small random jitter before the first tick so that a batch
    /// of brokers started at the same instant don't all hit the coordinator
    /// in lockstep on every `RENEW_INTERVAL`.
    pub async fn run(&self, shutdown: CancellationToken) {
        let jitter = rand::thread_rng().gen_range(Duration::ZERO..RENEW_INTERVAL / 5);
        tokio::select! {
            _ = tokio::time::sleep(jitter) => {}
            _ = shutdown.cancelled() => return,
        }

        let mut interval = tokio::time::interval(RENEW_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick().await,
                _ = shutdown.cancelled() => {
                    tracing::info!("role controller shutting down");
                    return;
                }
            }
        }
    }

    /// Run a single tick in isolation (used directly by tests).
    #[tracing::instrument(skip(self))]
    pub async fn tick(&self) {
        match self.current() {
            Role::Follower => self.tick_as_follower().await,
            Role::Leader => self.tick_as_leader().await,
        }
    }

    async fn tick_as_follower(&self) {
        match self.lease.try_acquire().await {
            Ok(true) => {
                self.role.store(Arc::new(Role::Leader));
                tracing::info!("acquired leadership");
            }
            Ok(false) => match self.lease.current_leader().await {
                Ok(Some(leader)) => {
                    if let Err(err) = self.replication.catch_up(&leader).await {
                        tracing::warn!(error = %err, "catch-up pass failed");
                    }
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(error = %err, "coordinator unavailable while resolving leader"),
            },
            Err(err) => tracing::warn!(error = %err, "coordinator unavailable during acquisition attempt"),
        }
    }

    async fn tick_as_leader(&self) {
        match self.lease.renew().await {
            Ok(true) => {}
            Ok(false) => {
                self.role.store(Arc::new(Role::Follower));
                tracing::warn!("lost leadership");
            }
            Err(err) => {
                // A coordinator outage is indistinguishable from lease loss
                // from here on: treat it as lease loss.
                self.role.store(Arc::new(Role::Follower));
                tracing::warn!(error = %err, "coordinator unavailable during renewal, stepping down");
            }
        }
    }
}
