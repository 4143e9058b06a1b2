//! Rendered page caching.
//!
//! # Responsibilities
//! - Remember rendered bytes per (template source, properties) pair
//! - Drop entries older than the TTL when swept
//!
//! # Design Decisions
//! - Key = SHA-256(template)[..16] ++ SHA-256(canonical props)[..16]
//! - One `RwLock` over the map; lookups share the read side
//! - Expiry is lazy: expired entries stay visible until `clear_expired`

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use bytes::Bytes;
use sha2::{Digest, Sha256};

use super::properties::RenderProperties;

/// Fixed-size cache key.
pub type CacheKey = [u8; 32];

#[derive(Debug, Clone)]
struct CacheEntry {
    content: Bytes,
    inserted_at: Instant,
}

/// Cache of rendered pages, safe for concurrent use.
///
/// Call [`RenderedPageCache::clear_expired`] periodically (a bit more often
/// than the TTL) to reclaim memory.
#[derive(Debug)]
pub struct RenderedPageCache {
    ttl: Duration,
    items: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl RenderedPageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Build the key for a template and its properties.
    pub fn key(template: &str, props: &RenderProperties) -> CacheKey {
        let template_hash = Sha256::digest(template.as_bytes());
        let props_hash = Sha256::digest(props.canonical_bytes());

        let mut key = [0u8; 32];
        key[..16].copy_from_slice(&template_hash[..16]);
        key[16..].copy_from_slice(&props_hash[..16]);
        key
    }

    pub fn has(&self, template: &str, props: &RenderProperties) -> bool {
        let key = Self::key(template, props);
        self.read(|items| items.contains_key(&key))
    }

    /// Insert or overwrite the rendered content.
    pub fn put(&self, template: &str, props: &RenderProperties, content: impl Into<Bytes>) {
        let key = Self::key(template, props);
        let entry = CacheEntry {
            content: content.into(),
            inserted_at: Instant::now(),
        };

        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    pub fn get(&self, template: &str, props: &RenderProperties) -> Option<Bytes> {
        let key = Self::key(template, props);
        self.read(|items| items.get(&key).map(|entry| entry.content.clone()))
    }

    /// Remove entries inserted more than one TTL ago. Returns how many were removed.
    pub fn clear_expired(&self) -> usize {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let before = items.len();

        items.retain(|_, entry| now.duration_since(entry.inserted_at) <= self.ttl);

        before - items.len()
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.read(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<T>(&self, f: impl FnOnce(&HashMap<CacheKey, CacheEntry>) -> T) -> T {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        f(&items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn props(code: u16) -> RenderProperties {
        RenderProperties::new(code, "message", "description")
    }

    #[test]
    fn test_put_then_get() {
        let cache = RenderedPageCache::new(Duration::from_secs(60));
        let template = "{{ code }}";

        assert!(!cache.has(template, &props(404)));
        assert!(cache.get(template, &props(404)).is_none());

        cache.put(template, &props(404), "404 page");

        assert!(cache.has(template, &props(404)));
        assert_eq!(cache.get(template, &props(404)).unwrap(), Bytes::from_static(b"404 page"));
        assert!(cache.get(template, &props(500)).is_none());
        assert!(cache.get("{{ message }}", &props(404)).is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = RenderedPageCache::new(Duration::from_secs(60));

        cache.put("t", &props(404), "first");
        cache.put("t", &props(404), "second");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("t", &props(404)).unwrap(), Bytes::from_static(b"second"));
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = RenderedPageCache::key("template", &props(404));
        let b = RenderedPageCache::key("template", &props(404));
        let c = RenderedPageCache::key("template", &props(403));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a[..16], c[..16]); // same template half
    }

    #[test]
    fn test_expiry_is_lazy() {
        let cache = RenderedPageCache::new(Duration::from_millis(20));
        cache.put("t", &props(404), "page");

        thread::sleep(Duration::from_millis(40));

        // still visible until swept
        assert!(cache.get("t", &props(404)).is_some());

        assert_eq!(cache.clear_expired(), 1);
        assert!(cache.get("t", &props(404)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_expired_keeps_fresh_entries() {
        let cache = RenderedPageCache::new(Duration::from_secs(60));
        cache.put("t", &props(404), "page");

        assert_eq!(cache.clear_expired(), 0);
        assert!(cache.has("t", &props(404)));
    }

    #[test]
    fn test_clear() {
        let cache = RenderedPageCache::new(Duration::from_secs(60));
        cache.put("a", &props(404), "a");
        cache.put("b", &props(404), "b");

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(RenderedPageCache::new(Duration::from_millis(1)));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for n in 0..200u16 {
                        let p = props(n % 10 + 400);
                        cache.put("t", &p, format!("{i}-{n}"));
                        let _ = cache.get("t", &p);
                        if n % 50 == 0 {
                            cache.clear_expired();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 10);
    }
}
