//! Injectable TTL cache for normalized query responses.
//!
//! Keyed by (operation, canonicalized variables). Held by the application
//! state and passed into the orchestrator, never ambient global state.
//! Mutations are never cached; each entity kind gets its own TTL.

use lru::LruCache;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

const DEFAULT_CAPACITY: usize = 512;

/// Per-entity-kind TTLs, zero disables caching for that kind.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub product: Duration,
    pub category: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            product: Duration::from_secs(60),
            category: Duration::from_secs(300),
        }
    }
}

impl CacheTtls {
    /// TTL for a canonical operation, None for uncacheable ones.
    pub fn ttl_for(&self, operation: &str) -> Option<Duration> {
        let ttl = match operation {
            "GetProduct" | "GetProducts" | "ProductsByCategory" => self.product,
            "GetCategories" | "GetCategory" => self.category,
            _ => return None,
        };
        (!ttl.is_zero()).then_some(ttl)
    }
}

struct Entry {
    data: Value,
    stored_at: Instant,
    ttl: Duration,
}

/// LRU + TTL response cache.
pub struct ResponseCache {
    entries: Mutex<LruCache<String, Entry>>,
    ttls: CacheTtls,
}

impl ResponseCache {
    pub fn new(ttls: CacheTtls) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(DEFAULT_CAPACITY).expect("capacity is non-zero"),
            )),
            ttls,
        }
    }

    pub fn cacheable(&self, operation: &str) -> bool {
        self.ttls.ttl_for(operation).is_some()
    }

    pub fn get(&self, operation: &str, variables: &Map<String, Value>) -> Option<Value> {
        self.ttls.ttl_for(operation)?;
        let key = cache_key(operation, variables);
        let mut entries = self.entries.lock();
        let entry = entries.get(&key)?;
        if entry.stored_at.elapsed() > entry.ttl {
            entries.pop(&key);
            return None;
        }
        Some(entry.data.clone())
    }

    pub fn put(&self, operation: &str, variables: &Map<String, Value>, data: Value) {
        let Some(ttl) = self.ttls.ttl_for(operation) else {
            return;
        };
        let key = cache_key(operation, variables);
        self.entries.lock().put(
            key,
            Entry {
                data,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }
}

/// Canonical cache key: operation plus variables with object keys sorted at
/// every level, so key order in the inbound JSON does not split the cache.
fn cache_key(operation: &str, variables: &Map<String, Value>) -> String {
    let normalized = normalize_value(&Value::Object(variables.clone()));
    format!("{operation}:{normalized}")
}

fn normalize_value(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let inner: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", k, normalize_value(&map[k])))
                .collect();
            format!("{{{}}}", inner.join(","))
        }
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(normalize_value).collect();
            format!("[{}]", inner.join(","))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn key_is_order_insensitive() {
        let a = vars(json!({"a": 1, "b": {"x": 1, "y": 2}}));
        let b = vars(json!({"b": {"y": 2, "x": 1}, "a": 1}));
        assert_eq!(cache_key("GetProducts", &a), cache_key("GetProducts", &b));
    }

    #[test]
    fn round_trip_for_cacheable_operations() {
        let cache = ResponseCache::new(CacheTtls::default());
        let variables = vars(json!({"slug": "shirt"}));
        assert!(cache.get("GetProduct", &variables).is_none());
        cache.put("GetProduct", &variables, json!({"product": {"sku": "A"}}));
        assert_eq!(
            cache.get("GetProduct", &variables).unwrap()["product"]["sku"],
            "A"
        );
    }

    #[test]
    fn mutations_are_never_cached() {
        let cache = ResponseCache::new(CacheTtls::default());
        let variables = vars(json!({"sku": "A"}));
        cache.put("AddToCart", &variables, json!({"cart": {}}));
        assert!(cache.get("AddToCart", &variables).is_none());
        cache.put("GetCart", &variables, json!({"cart": {}}));
        assert!(cache.get("GetCart", &variables).is_none());
    }

    #[test]
    fn zero_ttl_disables_kind() {
        let cache = ResponseCache::new(CacheTtls {
            product: Duration::ZERO,
            category: Duration::from_secs(60),
        });
        let variables = Map::new();
        cache.put("GetProduct", &variables, json!({}));
        assert!(cache.get("GetProduct", &variables).is_none());
        cache.put("GetCategories", &variables, json!({"categories": []}));
        assert!(cache.get("GetCategories", &variables).is_some());
    }
}
