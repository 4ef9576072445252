/// The lease record stored at `yak:leader_lease`.
///
/// Held by at most one broker at a time (subject to the coordinator's own
/// atomicity guarantee).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LeaseRecord {
    pub broker_id: u64,
    pub epoch: u64,
    pub host: String,
    pub port: u16,
}

/// A broker's heartbeat record, stored at `yak:broker:<id>`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BrokerRecord {
    pub broker_id: u64,
    pub host: String,
    pub port: u16,
    pub last_seen_unix_ms: i64,
}

impl BrokerRecord {
    pub fn now(broker_id: u64, host: String, port: u16) -> Self {
        Self {
            broker_id,
            host,
            port,
            last_seen_unix_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Field/value pairs for `Coordinator::hset_many`, matching the hash
    /// shape named by the coordinator key layout (`yak:broker:<id>`).
    pub fn to_fields(&self) -> [(&'static str, String); 4] {
        [
            ("broker_id", self.broker_id.to_string()),
            ("host", self.host.clone()),
            ("port", self.port.to_string()),
            ("last_seen_unix_ms", self.last_seen_unix_ms.to_string()),
        ]
    }

    /// Parse back from a `Coordinator::hgetall` result. `None` if any field
    /// is missing or malformed.
    pub fn from_fields(fields: &std::collections::HashMap<String, String>) -> Option<Self> {
        Some(Self {
            broker_id: fields.get("broker_id")?.parse().ok()?,
            host: fields.get("host")?.clone(),
            port: fields.get("port")?.parse().ok()?,
            last_seen_unix_ms: fields.get("last_seen_unix_ms")?.parse().ok()?,
        })
    }
}
