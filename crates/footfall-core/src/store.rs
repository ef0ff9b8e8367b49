//! Key-value store abstraction.
//!
//! The remote store is driven through a single narrow operation (execute
//! one command, decode one result), so the rest of the crate is testable
//! against any backend implementing these semantics, including the
//! in-memory one shipped by `footfall-redis`.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Decoded `result` field of a store reply.
///
/// Integer-valued replies may arrive either as JSON numbers (`INCR`) or as
/// decimal strings (`GET` of a counter); [`StoreValue::as_int`] reads both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Int(i64),
    Str(String),
    Keys(Vec<String>),
    Nil,
}

impl StoreValue {
    /// Integer view of the value, `None` when it has no integer reading.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StoreValue::Int(n) => Some(*n),
            StoreValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Key-list view of the value; non-list replies read as no keys.
    pub fn into_keys(self) -> Vec<String> {
        match self {
            StoreValue::Keys(keys) => keys,
            _ => Vec::new(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, StoreValue::Nil)
    }
}

/// Command execution against the shared key-value store.
///
/// One call is one network round trip: no retries and no caching here,
/// retry policy lives with each caller. The provided helpers cover the four
/// commands the subsystem uses and all delegate to [`execute`].
///
/// [`execute`]: KvStore::execute
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    async fn execute(&self, command: &[&str]) -> Result<StoreValue>;

    async fn get(&self, key: &str) -> Result<StoreValue> {
        self.execute(&["GET", key]).await
    }

    async fn setex(&self, key: &str, ttl: Duration, value: &str) -> Result<StoreValue> {
        let ttl_seconds = ttl.as_secs().max(1).to_string();
        self.execute(&["SETEX", key, ttl_seconds.as_str(), value]).await
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let reply = self.execute(&["INCR", key]).await?;
        reply
            .as_int()
            .ok_or_else(|| anyhow!("INCR {key} returned a non-integer reply"))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        Ok(self.execute(&["KEYS", pattern]).await?.into_keys())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(value: serde_json::Value) -> StoreValue {
        serde_json::from_value(value).expect("store value")
    }

    #[test]
    fn decodes_every_reply_shape() {
        assert_eq!(decode(json!(42)), StoreValue::Int(42));
        assert_eq!(decode(json!("OK")), StoreValue::Str("OK".to_string()));
        assert_eq!(
            decode(json!(["visitor:a", "visitor:b"])),
            StoreValue::Keys(vec!["visitor:a".to_string(), "visitor:b".to_string()])
        );
        assert!(decode(json!(null)).is_nil());
    }

    #[test]
    fn as_int_reads_numbers_and_decimal_strings() {
        assert_eq!(StoreValue::Int(41).as_int(), Some(41));
        assert_eq!(StoreValue::Str("41".to_string()).as_int(), Some(41));
        assert_eq!(StoreValue::Str("n/a".to_string()).as_int(), None);
        assert_eq!(StoreValue::Nil.as_int(), None);
        assert_eq!(StoreValue::Keys(vec![]).as_int(), None);
    }

    #[test]
    fn into_keys_is_empty_for_non_lists() {
        assert!(StoreValue::Nil.into_keys().is_empty());
        assert!(StoreValue::Str("x".to_string()).into_keys().is_empty());
    }
}
