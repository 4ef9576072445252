use thiserror::Error;

/// Errors raised by the runtime components (C3–C7).
#[derive(Debug, Error)]
pub enum Error {
    #[error("coordinator unavailable: {0}")]
    Coordinator(#[from] yak_coordinator::Error),

    #[error("peer {0} unreachable: {1}")]
    PeerUnreachable(String, #[source] reqwest::Error),

    #[error("peer {0} timed out")]
    PeerTimeout(String),

    #[error(transparent)]
    Log(#[from] yak_core::LogError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
