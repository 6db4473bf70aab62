//! Per-namespace TTL caching for catalog providers.
//!
//! Conversion of a stored dashboard can fan out into many catalog lookups
//! (one per query, annotation, and variable), so the providers are wrapped
//! with an in-memory cache keyed by namespace. TTL is enforced per entry at
//! read time, not globally.
//!
//! # Invariants
//! - A live entry is served without touching the inner provider.
//! - A TTL of zero makes the wrapper fully transparent.
//! - Entries are never evicted manually; they age out.

use std::time::{Duration, Instant};

use moka::policy::EvictionPolicy;
use moka::sync::Cache as MokaCache;
use tracing::{debug, trace};

use crate::context::ConversionContext;
use crate::error::Result;
use crate::provider::{
    DatasourceIndex, DatasourceIndexProvider, LibraryElementIndex, LibraryElementProvider,
};

/// Default cache size (number of namespaces).
pub const DEFAULT_CACHE_SIZE: u64 = 1000;

/// Default TTL for catalog snapshots (5 minutes).
pub const DEFAULT_CATALOG_TTL_SECONDS: u64 = 300;

fn env_u64_or_default(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

/// A cached catalog snapshot for one namespace.
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    value: T,
    cached_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            cached_at: Instant::now(),
            ttl,
        }
    }

    // An entry expires at cached_at + ttl; a read at that instant misses.
    fn is_expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.cached_at) >= self.ttl
    }
}

/// Namespace-keyed TTL cache shared by both provider wrappers.
#[derive(Clone, Debug)]
struct CatalogCache<T: Clone + Send + Sync + 'static> {
    inner: MokaCache<String, CacheEntry<T>>,
    ttl: Duration,
    enabled: bool,
}

impl<T: Clone + Send + Sync + 'static> CatalogCache<T> {
    fn new(ttl: Duration) -> Self {
        let capacity = env_u64_or_default("DASHGRADE_CACHE_SIZE", DEFAULT_CACHE_SIZE);
        let cache = MokaCache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        if ttl.is_zero() {
            debug!("catalog cache disabled (ttl = 0)");
        }

        Self {
            inner: cache,
            ttl,
            enabled: !ttl.is_zero(),
        }
    }

    fn get(&self, namespace: &str) -> Option<T> {
        self.get_at(namespace, Instant::now())
    }

    fn get_at(&self, namespace: &str, now: Instant) -> Option<T> {
        if !self.enabled {
            return None;
        }

        match self.inner.get(namespace) {
            Some(entry) => {
                if entry.is_expired_at(now) {
                    trace!(namespace, "catalog cache entry expired");
                    None
                } else {
                    trace!(namespace, "catalog cache hit");
                    Some(entry.value)
                }
            }
            None => {
                trace!(namespace, "catalog cache miss");
                None
            }
        }
    }

    fn insert(&self, namespace: String, value: T) {
        if !self.enabled {
            return;
        }
        trace!(namespace, "caching catalog snapshot");
        self.inner.insert(namespace, CacheEntry::new(value, self.ttl));
    }
}

/// Default TTL, overridable through `DASHGRADE_CATALOG_TTL_SECONDS`.
fn default_ttl() -> Duration {
    Duration::from_secs(env_u64_or_default(
        "DASHGRADE_CATALOG_TTL_SECONDS",
        DEFAULT_CATALOG_TTL_SECONDS,
    ))
}

/// Caching wrapper around a [`DatasourceIndexProvider`].
#[derive(Clone, Debug)]
pub struct CachedDatasourceProvider<P> {
    inner: P,
    cache: CatalogCache<DatasourceIndex>,
}

impl<P: DatasourceIndexProvider> CachedDatasourceProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, default_ttl())
    }

    /// A zero `ttl` disables caching entirely.
    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: CatalogCache::new(ttl),
        }
    }
}

impl<P: DatasourceIndexProvider> DatasourceIndexProvider for CachedDatasourceProvider<P> {
    fn index(&self, ctx: &ConversionContext) -> Result<DatasourceIndex> {
        if let Some(cached) = self.cache.get(&ctx.namespace) {
            return Ok(cached);
        }
        let index = self.inner.index(ctx)?;
        self.cache.insert(ctx.namespace.clone(), index.clone());
        Ok(index)
    }
}

/// Caching wrapper around a [`LibraryElementProvider`].
#[derive(Clone, Debug)]
pub struct CachedLibraryElementProvider<P> {
    inner: P,
    cache: CatalogCache<LibraryElementIndex>,
}

impl<P: LibraryElementProvider> CachedLibraryElementProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, default_ttl())
    }

    /// A zero `ttl` disables caching entirely.
    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: CatalogCache::new(ttl),
        }
    }
}

impl<P: LibraryElementProvider> LibraryElementProvider for CachedLibraryElementProvider<P> {
    fn library_elements(&self, ctx: &ConversionContext) -> Result<LibraryElementIndex> {
        if let Some(cached) = self.cache.get(&ctx.namespace) {
            return Ok(cached);
        }
        let index = self.inner.library_elements(ctx)?;
        self.cache.insert(ctx.namespace.clone(), index.clone());
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DatasourceInfo, MockDatasourceIndexProvider};

    fn sample_index() -> DatasourceIndex {
        DatasourceIndex::new(vec![DatasourceInfo {
            uid: "prom-1".into(),
            ds_type: "prometheus".into(),
            name: "Prometheus".into(),
            is_default: true,
        }])
    }

    #[test]
    fn test_live_entry_skips_inner_provider() {
        let mut inner = MockDatasourceIndexProvider::new();
        inner.expect_index().times(1).returning(|_| Ok(sample_index()));

        let cached = CachedDatasourceProvider::with_ttl(inner, Duration::from_secs(60));
        let ctx = ConversionContext::service("org-1");

        let first = cached.index(&ctx).unwrap();
        let second = cached.index(&ctx).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_ttl_is_transparent() {
        let mut inner = MockDatasourceIndexProvider::new();
        inner.expect_index().times(3).returning(|_| Ok(sample_index()));

        let cached = CachedDatasourceProvider::with_ttl(inner, Duration::ZERO);
        let ctx = ConversionContext::service("org-1");

        for _ in 0..3 {
            cached.index(&ctx).unwrap();
        }
    }

    #[test]
    fn test_namespaces_cached_independently() {
        let mut inner = MockDatasourceIndexProvider::new();
        inner.expect_index().times(2).returning(|_| Ok(sample_index()));

        let cached = CachedDatasourceProvider::with_ttl(inner, Duration::from_secs(60));
        cached.index(&ConversionContext::service("org-1")).unwrap();
        cached.index(&ConversionContext::service("org-2")).unwrap();
        // Repeat reads stay within the expectation.
        cached.index(&ConversionContext::service("org-1")).unwrap();
        cached.index(&ConversionContext::service("org-2")).unwrap();
    }

    #[test]
    fn test_entry_expires_exactly_at_ttl() {
        let ttl = Duration::from_secs(60);
        let entry = CacheEntry::new(7u32, ttl);
        assert!(!entry.is_expired_at(entry.cached_at));
        assert!(!entry.is_expired_at(entry.cached_at + ttl - Duration::from_nanos(1)));
        assert!(entry.is_expired_at(entry.cached_at + ttl));
    }

    #[test]
    fn test_expired_entry_refetches() {
        let cache: CatalogCache<u32> = CatalogCache::new(Duration::from_millis(1));
        cache.insert("ns".into(), 7);
        assert_eq!(cache.get("ns"), Some(7));
        let later = Instant::now() + Duration::from_millis(5);
        assert_eq!(cache.get_at("ns", later), None);
    }

    #[test]
    fn test_provider_error_is_not_cached() {
        let mut inner = MockDatasourceIndexProvider::new();
        let mut first = true;
        inner.expect_index().times(2).returning(move |_| {
            if first {
                first = false;
                Err(crate::ConversionError::StructuralConversion(
                    "catalog unavailable".into(),
                ))
            } else {
                Ok(sample_index())
            }
        });

        let cached = CachedDatasourceProvider::with_ttl(inner, Duration::from_secs(60));
        let ctx = ConversionContext::service("org-1");
        assert!(cached.index(&ctx).is_err());
        assert!(cached.index(&ctx).is_ok());
    }
}
