use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use yak_broker::{http, AppState, LogStore, Opts, SelfInfo};
use yak_coordinator::{Coordinator, RedisCoordinator};
use yak_runtime::{BrokerRegistry, HwmService, LeaseManager, ReplicationEngine, RoleController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    if yak_core::RENEW_INTERVAL >= yak_core::LEASE_TTL / 2 {
        anyhow::bail!("RENEW_INTERVAL must be strictly less than LEASE_TTL / 2");
    }

    let advertise_host = opts.advertise_host();
    if opts.advertise_host.is_none() {
        tracing::warn!("--advertise-host not set, defaulting to 127.0.0.1; set it explicitly in multi-host deployments");
    }

    let coordinator: Arc<dyn Coordinator> = Arc::new(RedisCoordinator::connect(&opts.redis_host, opts.redis_port).await?);

    let log_store = Arc::new(LogStore::new(opts.data_root.clone(), opts.broker_id));
    log_store.discover_existing_topics()?;

    let me = SelfInfo {
        broker_id: opts.broker_id,
        host: advertise_host.clone(),
        port: opts.port,
    };

    let hwm = Arc::new(HwmService::new(coordinator.clone()));
    let registry = Arc::new(BrokerRegistry::new(coordinator.clone(), me.broker_id, me.host.clone(), me.port));
    let lease = Arc::new(LeaseManager::new(coordinator.clone(), yak_core::LEASE_TTL, me.broker_id, me.host.clone(), me.port));
    let replication = Arc::new(ReplicationEngine::new(coordinator.clone(), log_store.clone(), me.broker_id));
    let role_controller = Arc::new(RoleController::new(lease.clone(), replication.clone()));

    registry.register().await?;

    let state = Arc::new(AppState::new(me, coordinator, log_store, hwm, registry.clone(), lease, replication, role_controller.clone()));

    let shutdown = CancellationToken::new();

    let role_loop = tokio::spawn({
        let role_controller = role_controller.clone();
        let shutdown = shutdown.clone();
        async move { role_controller.run(shutdown).await }
    });

    let heartbeat_loop = tokio::spawn({
        let registry = registry.clone();
        let shutdown = shutdown.clone();
        async move {
            let mut interval = tokio::time::interval(yak_core::LEASE_TTL / 2);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(err) = registry.heartbeat().await {
                            tracing::warn!(error = %err, "heartbeat failed");
                        }
                    }
                    _ = shutdown.cancelled() => return,
                }
            }
        }
    });

    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", opts.port)).await?;
    tracing::info!(broker_id = opts.broker_id, port = opts.port, "yak-broker listening");

    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "HTTP server exited");
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    shutdown.cancel();
    let _ = role_loop.await;
    let _ = heartbeat_loop.await;

    Ok(())
}
