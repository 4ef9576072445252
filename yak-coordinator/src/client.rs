use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Typed wrapper over the atomic primitives an external key/value coordinator
/// must offer: NX-with-TTL set, TTL refresh, GET/SET, atomic increment,
/// hash-map set/get, and prefix enumeration.
///
/// All methods fail with [`crate::Error::Unavailable`] when the coordinator is
/// unreachable; that is the only variant the rest of the broker is allowed to
/// match on.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Atomically set `key` to `value` with `ttl`, only if `key` does not already exist.
    ///
    /// Returns `true` if the set took effect.
    async fn set_if_absent_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Refresh `key`'s TTL without changing its value.
    ///
    /// Returns `false` if `key` does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Atomically increment `key` (creating it at 0 first if absent) and return the new value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Set multiple fields of the hash at `key`, creating it if absent.
    async fn hset_many(&self, key: &str, fields: &[(&str, &str)]) -> Result<()>;

    /// Set the TTL of an existing hash key (used alongside `hset_many` for the broker registry).
    async fn hset_many_with_ttl(&self, key: &str, fields: &[(&str, &str)], ttl: Duration) -> Result<()> {
        self.hset_many(key, fields).await?;
        self.expire(key, ttl).await?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Enumerate every key with the given prefix (used for `yak:broker:*` scans).
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}
