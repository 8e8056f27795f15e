//! Time-bounded result cache keyed by request parameters.
//!
//! A miss is never an error: expired entries behave exactly like absent ones
//! and are dropped the moment they are seen. Concurrent writers to the same
//! key race and the last write wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::models::config::CacheConfig;
use crate::models::record::ExtractionResult;

/// Deterministic cache key built from named request fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key as `prefix:name=value|name=value`.
    ///
    /// Fields are sorted by name (then value) first, so the insertion order
    /// of the caller's fields never changes the key.
    pub fn from_fields<I, K, V>(prefix: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs: Vec<(String, String)> = fields
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        pairs.sort();

        let body = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
            .collect::<Vec<_>>()
            .join("|");

        Self(format!("{prefix}:{body}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Escape the separators so distinct field sets never render the same.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '|' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }
}

/// In-memory TTL cache.
pub struct ResultCache<V = ExtractionResult> {
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
    ttl: Duration,
    prefix: String,
}

impl<V: Clone> ResultCache<V> {
    /// Default prefix of keys derived from preview requests.
    pub const DEFAULT_PREFIX: &'static str = "ocr-preview";

    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            prefix: Self::DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs)).with_prefix(&config.key_prefix)
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Prefix callers use when building keys for this cache.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry, dropping it if it has expired.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                debug!("Cache entry {} expired", key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Store a value with the default TTL.
    pub fn set(&self, key: CacheKey, value: V) {
        self.set_with_ttl(key, value, self.ttl);
    }

    pub fn set_with_ttl(&self, key: CacheKey, value: V, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries().insert(key, CacheEntry { value, expires_at });
    }

    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.entries().remove(key).map(|entry| entry.value)
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(name: &str) -> CacheKey {
        CacheKey::from_fields("test", [("name", name)])
    }

    #[test]
    fn test_key_is_order_independent() {
        let a = CacheKey::from_fields("ocr-preview", [("file", "a.pdf"), ("engine", "tesseract")]);
        let b = CacheKey::from_fields("ocr-preview", [("engine", "tesseract"), ("file", "a.pdf")]);

        assert_eq!(a, b);
        assert_eq!(a.as_str(), "ocr-preview:engine=tesseract|file=a.pdf");
    }

    #[test]
    fn test_key_escapes_separators() {
        let packed = CacheKey::from_fields("p", [("a", "1|b=2")]);
        let split = CacheKey::from_fields("p", [("a", "1"), ("b", "2")]);

        assert_ne!(packed, split);
        assert_eq!(packed.as_str(), r"p:a=1\|b\=2");
        assert_eq!(
            CacheKey::from_fields("p", [("k", r"x\")]).as_str(),
            r"p:k=x\\"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_ttl_never_expires() {
        let cache: ResultCache<u32> = ResultCache::new(Duration::from_secs(u64::MAX));
        cache.set(key("a"), 1);

        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;
        assert_eq!(cache.get(&key("a")), Some(1));
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_key_without_fields() {
        let key = CacheKey::from_fields("p", Vec::<(String, String)>::new());
        assert_eq!(key.to_string(), "p:");
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_after_set() {
        let cache: ResultCache<String> = ResultCache::new(Duration::from_secs(300));
        cache.set(key("a"), "value".to_string());

        assert_eq!(cache.get(&key("a")), Some("value".to_string()));
        assert_eq!(cache.get(&key("b")), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache: ResultCache<u32> = ResultCache::new(Duration::from_secs(300));
        cache.set(key("a"), 1);

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get(&key("a")), Some(1));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&key("a")), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_write_wins_and_resets_ttl() {
        let cache: ResultCache<u32> = ResultCache::new(Duration::from_secs(10));
        cache.set(key("a"), 1);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set(key("a"), 2);
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get(&key("a")), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_and_remove() {
        let cache: ResultCache<u32> = ResultCache::new(Duration::from_secs(10));
        cache.set(key("short"), 1);
        cache.set_with_ttl(key("long"), 2, Duration::from_secs(60));
        cache.set(key("gone"), 3);

        assert_eq!(cache.remove(&key("gone")), Some(3));
        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("long")), Some(2));
    }

    #[test]
    fn test_from_config() {
        let cache: ResultCache = ResultCache::from_config(&CacheConfig {
            ttl_secs: 42,
            key_prefix: "custom".to_string(),
            ..CacheConfig::default()
        });
        assert_eq!(cache.ttl(), Duration::from_secs(42));
        assert_eq!(cache.prefix(), "custom");
    }
}
