use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use footfall_core::store::{KvStore, StoreValue};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory `KvStore` with real expiry semantics.
///
/// Expiry is evaluated against the tokio clock, so tests running under
/// `#[tokio::test(start_paused = true)]` can move time with
/// `tokio::time::advance` and watch markers disappear exactly as they would
/// on the remote store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a non-expiring value directly, bypassing the command path.
    /// Test seeding helper.
    pub async fn seed(&self, key: &str, value: &str) {
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }

    /// Remaining lifetime of `key`, `None` when absent or non-expiring.
    pub async fn expires_in(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .and_then(|e| e.expires_at)
            .map(|at| at.duration_since(now))
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn execute(&self, command: &[&str]) -> Result<StoreValue> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, e| e.expires_at.map_or(true, |at| at > now));

        match command {
            ["GET", key] => Ok(entries
                .get(*key)
                .map(|e| StoreValue::Str(e.value.clone()))
                .unwrap_or(StoreValue::Nil)),
            ["SETEX", key, ttl, value] => {
                let ttl: u64 = ttl.parse()?;
                if ttl == 0 {
                    bail!("invalid expire time in 'setex' command");
                }
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: value.to_string(),
                        expires_at: Some(now + Duration::from_secs(ttl)),
                    },
                );
                Ok(StoreValue::Str("OK".to_string()))
            }
            ["INCR", key] => {
                let entry = entries.entry(key.to_string()).or_insert(Entry {
                    value: "0".to_string(),
                    expires_at: None,
                });
                let Ok(current) = entry.value.parse::<i64>() else {
                    bail!("value is not an integer or out of range");
                };
                let next = current + 1;
                entry.value = next.to_string();
                Ok(StoreValue::Int(next))
            }
            ["KEYS", pattern] => {
                let mut keys: Vec<String> = entries
                    .keys()
                    .filter(|key| matches_pattern(pattern, key))
                    .cloned()
                    .collect();
                keys.sort();
                Ok(StoreValue::Keys(keys))
            }
            _ => bail!("unsupported command: {command:?}"),
        }
    }
}

/// Glob match supporting at most one `*` wildcard, which is all the
/// presence and country patterns need.
fn matches_pattern(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            key.len() >= prefix.len() + suffix.len()
                && key.starts_with(prefix)
                && key.ends_with(suffix)
        }
        None => pattern == key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_of_missing_key_is_nil() {
        let store = MemoryStore::new();
        assert!(store.get("total_visits").await.expect("get").is_nil());
    }

    #[tokio::test]
    async fn incr_starts_at_one_and_counts_up() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("total_visits").await.expect("incr"), 1);
        assert_eq!(store.incr("total_visits").await.expect("incr"), 2);
        let value = store.get("total_visits").await.expect("get");
        assert_eq!(value.as_int(), Some(2));
    }

    #[tokio::test]
    async fn incr_rejects_non_integer_values() {
        let store = MemoryStore::new();
        store.seed("total_visits", "not-a-number").await;
        assert!(store.incr("total_visits").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn setex_entries_expire_on_schedule() {
        let store = MemoryStore::new();
        store
            .setex("visitor:abc", Duration::from_secs(30), "1")
            .await
            .expect("setex");
        assert_eq!(
            store.expires_in("visitor:abc").await,
            Some(Duration::from_secs(30))
        );

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(
            store.keys("visitor:*").await.expect("keys"),
            vec!["visitor:abc".to_string()]
        );

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.keys("visitor:*").await.expect("keys").is_empty());
        assert!(store.get("visitor:abc").await.expect("get").is_nil());
    }

    #[tokio::test]
    async fn keys_matches_prefix_patterns_only() {
        let store = MemoryStore::new();
        store.seed("country:US", "10").await;
        store.seed("country:GB", "7").await;
        store.seed("total_visits", "17").await;

        let mut countries = store.keys("country:*").await.expect("keys");
        countries.sort();
        assert_eq!(countries, vec!["country:GB", "country:US"]);
        assert_eq!(store.keys("total_visits").await.expect("keys"), vec!["total_visits"]);
        assert_eq!(store.keys("*").await.expect("keys").len(), 3);
    }

    #[tokio::test]
    async fn unsupported_commands_are_rejected() {
        let store = MemoryStore::new();
        assert!(store.execute(&["DEL", "total_visits"]).await.is_err());
        assert!(store.execute(&["SETEX", "k", "0", "v"]).await.is_err());
    }
}
