//! End-to-end tests against the real HTTP surface: a broker is bound to a
//! loopback port and driven with `reqwest`, the same way the demo producer
//! and consumer binaries talk to a broker in the field.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use yak_broker::{http, AppState, LogStore, SelfInfo};
use yak_coordinator::{Coordinator, InMemoryCoordinator};
use yak_runtime::{BrokerRegistry, HwmService, LeaseManager, ReplicationEngine, Role, RoleController};

struct TestBroker {
    addr: SocketAddr,
    state: Arc<AppState>,
    _data_dir: TempDir,
}

impl TestBroker {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn make_leader(&self) {
        self.state.role_handle().store(Arc::new(Role::Leader));
    }
}

/// Spin up one broker against a fresh `InMemoryCoordinator` and a temp data
/// root, with its HTTP surface bound to an ephemeral loopback port. Returns
/// once the listener is accepting connections.
///
/// Binds the listener first so that this broker's advertised port (used in
/// its lease/registry records, and so dialed by peers during replication and
/// catch-up) matches the port it is actually serving on.
async fn spawn_broker(broker_id: u64, coordinator: Arc<dyn Coordinator>) -> TestBroker {
    let data_dir = tempfile::tempdir().expect("tempdir");
    let log_store = Arc::new(LogStore::new(data_dir.path().to_path_buf(), broker_id));

    let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local_addr");

    let me = SelfInfo {
        broker_id,
        host: "127.0.0.1".to_string(),
        port: addr.port(),
    };

    let hwm = Arc::new(HwmService::new(coordinator.clone()));
    let registry = Arc::new(BrokerRegistry::new(coordinator.clone(), me.broker_id, me.host.clone(), me.port));
    let lease = Arc::new(LeaseManager::new(coordinator.clone(), Duration::from_secs(10), me.broker_id, me.host.clone(), me.port));
    let replication = Arc::new(ReplicationEngine::new(coordinator.clone(), log_store.clone(), me.broker_id));
    let role_controller = Arc::new(RoleController::new(lease.clone(), replication.clone()));

    let state = Arc::new(AppState::new(me, coordinator, log_store, hwm, registry, lease, replication, role_controller));

    let app = http::router(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });

    // give the accept loop a moment to actually start serving.
    tokio::time::sleep(Duration::from_millis(20)).await;

    TestBroker { addr, state, _data_dir: data_dir }
}

#[tokio::test]
async fn produce_then_consume_round_trips_a_message() {
    let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
    let broker = spawn_broker(1, coordinator).await;
    broker.make_leader();

    let client = reqwest::Client::new();

    let resp: Value = client
        .post(broker.url("/register_topic"))
        .json(&json!({"topic": "orders"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["status"], "ok");

    let resp: Value = client
        .post(broker.url("/produce"))
        .json(&json!({"topic": "orders", "msg": "first"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["status"], "ok");
    assert_eq!(resp["offset"], 1);
    assert_eq!(resp["hwm"], 1);

    let resp: Value = client
        .get(broker.url("/consume?topic=orders&offset=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["hwm"], 1);
    assert_eq!(resp["total_available"], 1);
    let messages = resp["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["offset"], 1);
    assert_eq!(messages[0]["topic"], "orders");
    assert_eq!(messages[0]["msg"], "first");
}

#[tokio::test]
async fn re_registering_an_existing_topic_is_idempotent() {
    let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
    let broker = spawn_broker(1, coordinator).await;
    broker.make_leader();
    let client = reqwest::Client::new();

    let first: Value = client
        .post(broker.url("/register_topic"))
        .json(&json!({"topic": "orders"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["status"], "ok");

    let second: Value = client
        .post(broker.url("/register_topic"))
        .json(&json!({"topic": "orders"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["status"], "exists");
}

#[tokio::test]
async fn producing_to_an_unregistered_topic_is_rejected() {
    let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
    let broker = spawn_broker(1, coordinator).await;
    broker.make_leader();
    let client = reqwest::Client::new();

    let resp = client
        .post(broker.url("/produce"))
        .json(&json!({"topic": "missing", "msg": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn a_follower_redirects_produce_and_register_to_the_leader() {
    let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
    let leader = spawn_broker(1, coordinator.clone()).await;
    leader.make_leader();
    leader.state.lease.try_acquire().await.unwrap();

    let follower = spawn_broker(2, coordinator).await;
    let client = reqwest::Client::new();

    let resp: Value = client
        .post(follower.url("/produce"))
        .json(&json!({"topic": "orders", "msg": "x"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["status"], "redirect");
    assert_eq!(resp["leader"]["broker_id"], 1);
}

#[tokio::test]
async fn consuming_an_unknown_topic_reports_a_wire_level_error() {
    let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
    let broker = spawn_broker(1, coordinator).await;
    let client = reqwest::Client::new();

    let resp = client.get(broker.url("/consume?topic=nope")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn metadata_endpoints_report_topics_and_leader() {
    let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
    let broker = spawn_broker(1, coordinator).await;
    broker.make_leader();
    let client = reqwest::Client::new();

    let leader_before: Value = client.get(broker.url("/metadata/leader")).send().await.unwrap().json().await.unwrap();
    assert!(leader_before["leader"].is_null());

    broker.state.lease.try_acquire().await.unwrap();
    let leader_after: Value = client.get(broker.url("/metadata/leader")).send().await.unwrap().json().await.unwrap();
    assert_eq!(leader_after["leader"]["broker_id"], 1);

    client
        .post(broker.url("/register_topic"))
        .json(&json!({"topic": "orders"}))
        .send()
        .await
        .unwrap();
    let topics: Value = client.get(broker.url("/metadata/topics")).send().await.unwrap().json().await.unwrap();
    assert_eq!(topics["count"], 1);
    assert_eq!(topics["topics"][0], "orders");
}

#[tokio::test]
async fn internal_replicate_is_idempotent_by_offset() {
    let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
    let broker = spawn_broker(2, coordinator).await;
    broker.state.log_store.ensure_topic(&yak_core::TopicName::parse("orders").unwrap()).unwrap();
    let client = reqwest::Client::new();

    let payload = json!({
        "topic": "orders",
        "message": {"offset": 1, "msg": "hello"},
    });

    for _ in 0..2 {
        let resp: Value = client
            .post(broker.url("/internal/replicate"))
            .json(&payload)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(resp["status"], "replicated");
    }

    let messages = broker.state.log_store.read_all(&yak_core::TopicName::parse("orders").unwrap()).unwrap();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn produce_fans_out_to_live_peers_before_acking() {
    let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
    let leader = spawn_broker(1, coordinator.clone()).await;
    leader.make_leader();
    let follower = spawn_broker(2, coordinator).await;

    leader.state.registry.register().await.unwrap();
    follower.state.registry.register().await.unwrap();
    follower.state.log_store.ensure_topic(&yak_core::TopicName::parse("orders").unwrap()).unwrap();

    let client = reqwest::Client::new();
    client
        .post(leader.url("/register_topic"))
        .json(&json!({"topic": "orders"}))
        .send()
        .await
        .unwrap();
    let resp: Value = client
        .post(leader.url("/produce"))
        .json(&json!({"topic": "orders", "msg": "fanned-out"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["status"], "ok");

    // Fanout is synchronous relative to the ack: by the time /produce has
    // returned, the follower has already been sent the message.
    let topic = yak_core::TopicName::parse("orders").unwrap();
    let follower_messages = follower.state.log_store.read_all(&topic).unwrap();
    assert_eq!(follower_messages.len(), 1);
    assert_eq!(follower_messages[0].offset, yak_core::Offset(1));
}

#[tokio::test]
async fn follower_catch_up_converges_on_a_topic_it_never_saw_live() {
    let coordinator: Arc<dyn Coordinator> = Arc::new(InMemoryCoordinator::new());
    let leader = spawn_broker(1, coordinator.clone()).await;
    leader.make_leader();
    leader.state.lease.try_acquire().await.unwrap();
    leader.state.registry.register().await.unwrap();

    let client = reqwest::Client::new();
    client
        .post(leader.url("/register_topic"))
        .json(&json!({"topic": "orders"}))
        .send()
        .await
        .unwrap();
    for i in 1..=5 {
        let resp: Value = client
            .post(leader.url("/produce"))
            .json(&json!({"topic": "orders", "msg": format!("m{i}")}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(resp["offset"], i);
    }

    // A follower that starts with an empty log and no knowledge of "orders"
    // at all — simulating a brand-new broker joining, or a restart after
    // losing its data directory's topic but not the coordinator's checkpoint.
    let follower = spawn_broker(2, coordinator.clone()).await;
    let topic = yak_core::TopicName::parse("orders").unwrap();
    assert!(!follower.state.log_store.has_topic(&topic));

    let leader_record = follower.state.current_leader().await.unwrap().unwrap();
    assert_eq!(leader_record.broker_id, 1);
    follower.state.replication.catch_up(&leader_record).await.unwrap();

    let caught_up = follower.state.log_store.read_all(&topic).unwrap();
    assert_eq!(caught_up.len(), 5);
    for (i, m) in caught_up.iter().enumerate() {
        assert_eq!(m.offset, yak_core::Offset((i + 1) as u64));
    }

    let follower_hwm_key = yak_core::keys::follower_hwm(2, &topic);
    let stored = coordinator.get(&follower_hwm_key).await.unwrap();
    assert_eq!(stored, Some("5".to_string()));
}
