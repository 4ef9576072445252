use thiserror::Error;

/// Possible errors when talking to the coordinator.
///
/// The broker is only ever allowed to match on [`Error::Unavailable`];
/// callers that store structured values are responsible for their own
/// decode errors (see `yak_runtime::lease::LeaseManager::current_leader`).
#[derive(Error, Debug)]
pub enum Error {
    /// The coordinator could not be reached, or returned a transport-level
    /// failure. Surfaced to HTTP callers as `CoordinatorUnavailable`.
    #[error("coordinator unavailable: {0}")]
    Unavailable(#[source] redis::RedisError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<redis::RedisError> for Error {
    fn from(source: redis::RedisError) -> Self {
        Error::Unavailable(source)
    }
}
