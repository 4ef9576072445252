use thiserror::Error;

/// I/O failure reading or appending the on-disk log for a topic.
///
/// Shared between the log store implementation (`yak-broker::log_store`) and
/// the replication engine (`yak-runtime::replication`), which needs to name
/// this failure without depending on the broker crate that produces it.
#[derive(Debug, Error)]
#[error("log I/O failure for topic {topic:?}: {source}")]
pub struct LogError {
    pub topic: String,
    #[source]
    pub source: std::io::Error,
}

impl LogError {
    pub fn new(topic: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            topic: topic.into(),
            source,
        }
    }
}
