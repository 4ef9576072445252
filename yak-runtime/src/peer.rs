use serde::{Deserialize, Serialize};
use yak_core::{Message, Offset, TopicName, CATCHUP_TIMEOUT, DISCOVER_TIMEOUT, REPLICATE_TIMEOUT};

use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct ReplicatePayload<'a> {
    topic: &'a TopicName,
    message: &'a Message,
}

#[derive(Debug, Deserialize)]
struct ReplicateResponse {
    #[allow(dead_code)]
    status: String,
}

#[derive(Debug, Serialize)]
struct CatchupRequest<'a> {
    topic: &'a TopicName,
    from_offset: u64,
}

#[derive(Debug, Deserialize)]
struct CatchupResponse {
    #[allow(dead_code)]
    status: String,
    #[allow(dead_code)]
    topic: String,
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct TopicsResponse {
    topics: Vec<String>,
}

/// Outbound HTTP client for inter-broker calls.
///
/// Each call uses its own fixed per-request timeout — replicate, catch-up,
/// and topic discovery each have different patience — rather than one
/// shared client-wide timeout.
#[derive(Clone)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl Default for PeerClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl PeerClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn base_url(host: &str, port: u16) -> String {
        format!("http://{host}:{port}")
    }

    /// POST `{topic, message}` to a peer's `/internal/replicate`.
    ///
    /// Failures here are never fatal to the caller — they are returned so
    /// the caller can log them, not so it can retry inline.
    pub async fn replicate(&self, host: &str, port: u16, topic: &TopicName, message: &Message) -> Result<()> {
        let url = format!("{}/internal/replicate", Self::base_url(host, port));
        let body = ReplicatePayload { topic, message };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .timeout(REPLICATE_TIMEOUT)
            .send()
            .await
            .map_err(|e| to_peer_error(host, port, e))?;
        resp.error_for_status_ref().map_err(|e| to_peer_error(host, port, e))?;
        let _: ReplicateResponse = resp.json().await.map_err(|e| to_peer_error(host, port, e))?;
        Ok(())
    }

    /// POST `{topic, from_offset}` to the leader's `/internal/catchup`.
    pub async fn catchup(&self, host: &str, port: u16, topic: &TopicName, from_offset: Offset) -> Result<Vec<Message>> {
        let url = format!("{}/internal/catchup", Self::base_url(host, port));
        let body = CatchupRequest {
            topic,
            from_offset: from_offset.get(),
        };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .timeout(CATCHUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| to_peer_error(host, port, e))?;
        resp.error_for_status_ref().map_err(|e| to_peer_error(host, port, e))?;
        let parsed: CatchupResponse = resp.json().await.map_err(|e| to_peer_error(host, port, e))?;
        Ok(parsed.messages)
    }

    /// GET the leader's `/metadata/topics`.
    pub async fn discover_topics(&self, host: &str, port: u16) -> Result<Vec<TopicName>> {
        let url = format!("{}/metadata/topics", Self::base_url(host, port));
        let resp = self
            .http
            .get(url)
            .timeout(DISCOVER_TIMEOUT)
            .send()
            .await
            .map_err(|e| to_peer_error(host, port, e))?;
        resp.error_for_status_ref().map_err(|e| to_peer_error(host, port, e))?;
        let parsed: TopicsResponse = resp.json().await.map_err(|e| to_peer_error(host, port, e))?;
        Ok(parsed
            .topics
            .into_iter()
            .filter_map(|t| TopicName::parse(t).ok())
            .collect())
    }
}

fn to_peer_error(host: &str, port: u16, source: reqwest::Error) -> Error {
    let addr = format!("{host}:{port}");
    if source.is_timeout() {
        Error::PeerTimeout(addr)
    } else {
        Error::PeerUnreachable(addr, source)
    }
}
