use std::time::Duration;

/// How long a held leader lease survives without renewal.
pub const LEASE_TTL: Duration = Duration::from_secs(10);

/// Period of the role controller tick (acquire/renew/catch-up).
///
/// Must be strictly less than `LEASE_TTL / 2`; enforced at broker startup.
pub const RENEW_INTERVAL: Duration = Duration::from_secs(4);

/// TTL for a broker's heartbeat record in the coordinator: `3 * LEASE_TTL`.
pub const REGISTRY_TTL: Duration = Duration::from_secs(LEASE_TTL.as_secs() * 3);

/// Per-call timeout for `GET /metadata/topics` against a peer.
pub const DISCOVER_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-call timeout for `POST /internal/catchup` against the leader.
pub const CATCHUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-call timeout for `POST /internal/replicate` fanout to a peer.
pub const REPLICATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on a single produced message body, rejected as `MalformedRequest` above this.
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;
