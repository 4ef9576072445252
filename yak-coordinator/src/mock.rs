use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{Coordinator, Result};

#[derive(Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// An in-process [`Coordinator`] backed by a plain mutex-guarded map.
///
/// Used by the broker's own test suite in place of a live Redis server,
/// mirroring how `kube-runtime::reflector::store` is tested against a bare
/// `DashMap` rather than a live apiserver. TTL expiry is evaluated lazily on
/// access, same as the real thing from the caller's point of view.
#[derive(Clone, Default)]
pub struct InMemoryCoordinator {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
}

impl InMemoryCoordinator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Coordinator for InMemoryCoordinator {
    async fn set_if_absent_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut map = self.inner.lock();
        if map.get(key).is_some_and(|e| e.is_live(now)) {
            return Ok(false);
        }
        map.insert(key.to_string(), Entry {
            value: Value::Str(value.to_string()),
            expires_at: Some(now + ttl),
        });
        Ok(true)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut map = self.inner.lock();
        match map.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let map = self.inner.lock();
        Ok(match map.get(key) {
            Some(entry) if entry.is_live(now) => match &entry.value {
                Value::Str(s) => Some(s.clone()),
                Value::Hash(_) => None,
            },
            _ => None,
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.inner.lock();
        let ttl = map.get(key).and_then(|e| e.expires_at);
        map.insert(key.to_string(), Entry {
            value: Value::Str(value.to_string()),
            expires_at: ttl,
        });
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let mut map = self.inner.lock();
        let current = match map.get(key) {
            Some(entry) if entry.is_live(now) => match &entry.value {
                Value::Str(s) => s.parse::<i64>().unwrap_or(0),
                Value::Hash(_) => 0,
            },
            _ => 0,
        };
        let next = current + 1;
        let ttl = map.get(key).and_then(|e| e.expires_at);
        map.insert(key.to_string(), Entry {
            value: Value::Str(next.to_string()),
            expires_at: ttl,
        });
        Ok(next)
    }

    async fn hset_many(&self, key: &str, fields: &[(&str, &str)]) -> Result<()> {
        let now = Instant::now();
        let mut map = self.inner.lock();
        let ttl = map.get(key).and_then(|e| e.expires_at);
        let mut hash = match map.remove(key) {
            Some(entry) if entry.is_live(now) => match entry.value {
                Value::Hash(h) => h,
                Value::Str(_) => HashMap::new(),
            },
            _ => HashMap::new(),
        };
        for (field, value) in fields {
            hash.insert((*field).to_string(), (*value).to_string());
        }
        map.insert(key.to_string(), Entry {
            value: Value::Hash(hash),
            expires_at: ttl,
        });
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let now = Instant::now();
        let map = self.inner.lock();
        Ok(match map.get(key) {
            Some(entry) if entry.is_live(now) => match &entry.value {
                Value::Hash(h) => h.clone(),
                Value::Str(_) => HashMap::new(),
            },
            _ => HashMap::new(),
        })
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let map = self.inner.lock();
        Ok(map
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect())
    }
}
