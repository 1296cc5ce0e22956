use dashmap::DashMap;
use log::debug;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::models::qr_payload::QrPayload;
use crate::utils::verifier::validate_qr_code_data;

struct CachedValidation {
    result: Option<QrPayload>,
    stored_at: Instant,
}

/// Memoizes [`validate_qr_code_data`] for structurally identical inputs.
///
/// Entries expire after `ttl`; once `capacity` is reached expired entries
/// are purged and then the oldest entry is evicted.
pub struct ValidationCache {
    entries: DashMap<String, CachedValidation>,
    capacity: usize,
    ttl: Duration,
}

impl ValidationCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn validate(&self, value: &Value) -> Option<QrPayload> {
        // serde_json maps are sorted, so this is a canonical key
        let key = value.to_string();

        if let Some(hit) = self.lookup(&key) {
            debug!("Validation cache hit");
            return hit;
        }

        let result = validate_qr_code_data(Some(value));
        self.insert(key, result.clone());
        result
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn lookup(&self, key: &str) -> Option<Option<QrPayload>> {
        let fresh = {
            let entry = self.entries.get(key)?;
            if entry.stored_at.elapsed() <= self.ttl {
                Some(entry.result.clone())
            } else {
                None
            }
        };

        if fresh.is_none() {
            self.entries.remove(key);
        }
        fresh
    }

    fn insert(&self, key: String, result: Option<QrPayload>) {
        if self.entries.len() >= self.capacity {
            let ttl = self.ttl;
            self.entries.retain(|_, entry| entry.stored_at.elapsed() <= ttl);
        }

        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().stored_at)
                .map(|entry| entry.key().clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            key,
            CachedValidation {
                result,
                stored_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeated_validation_is_idempotent() {
        let cache = ValidationCache::new(8, Duration::from_secs(60));
        let value = json!({"type": "customer", "customerId": "1", "timestamp": 2});

        let first = cache.validate(&value);
        let second = cache.validate(&value);

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalid_results_are_cached_too() {
        let cache = ValidationCache::new(8, Duration::from_secs(60));
        let value = json!({"type": "loyaltyCard", "cardId": "7890"});

        assert_eq!(cache.validate(&value), None);
        assert_eq!(cache.validate(&value), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = ValidationCache::new(8, Duration::from_secs(60));
        cache.validate(&json!({"type": "promoCode", "code": "A", "businessId": "1"}));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn capacity_is_bounded() {
        let cache = ValidationCache::new(2, Duration::from_secs(60));
        for id in 0..5 {
            cache.validate(&json!({"type": "customer", "customerId": id.to_string()}));
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn expired_entries_are_recomputed() {
        let cache = ValidationCache::new(4, Duration::ZERO);
        let value = json!({"type": "customer", "customerId": "1"});

        cache.validate(&value);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.validate(&value).is_some());
        assert_eq!(cache.len(), 1);
    }
}
