use std::fmt;

/// A dense, monotonically increasing, 1-based offset within a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Offset(pub u64);

impl Offset {
    /// The first offset ever assigned to a fresh topic's counter.
    pub const FIRST: Offset = Offset(1);

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Offset {
    fn from(value: i64) -> Self {
        Offset(value.max(0) as u64)
    }
}

/// A single on-disk record: an assigned offset plus the producer's payload,
/// verbatim. The broker never interprets `payload`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub offset: Offset,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// Parse one line-delimited log record, skipping records with no `offset`
    /// field or that aren't a JSON object. Malformed lines are skipped, not
    /// fatal.
    pub fn parse_line(line: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(line).ok()?;
        let mut obj = value.as_object()?.clone();
        let offset = obj.remove("offset")?.as_u64()?;
        Some(Message {
            offset: Offset(offset),
            payload: obj,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_malformed_lines() {
        assert!(Message::parse_line("not json").is_none());
        assert!(Message::parse_line("{}").is_none());
        assert!(Message::parse_line("[1,2,3]").is_none());
    }

    #[test]
    fn round_trips_payload_fields() {
        let line = r#"{"offset":3,"topic":"t","msg":"hello"}"#;
        let msg = Message::parse_line(line).unwrap();
        assert_eq!(msg.offset, Offset(3));
        assert_eq!(msg.payload.get("msg").unwrap(), "hello");
    }
}
