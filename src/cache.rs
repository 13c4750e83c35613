//! Parsed-route caching.
//!
//! This module provides [`RouteCache`], an LRU cache from route strings to
//! their parsed [`RouteData`], so history replays and repeated navigations to
//! the same route skip re-parsing. It is gated behind the `cache` feature flag
//! and uses the [`lru`] crate internally.
//!
//! Only successful parses are cached; a malformed route is re-checked (and
//! rejected) every time.
//!
//! [`CacheStats`] tracks hits, misses, and invalidations so you can monitor
//! cache effectiveness at runtime.
//!
//! # Examples
//!
//! ```
//! use mvc_navigator::cache::RouteCache;
//!
//! let mut cache = RouteCache::new();
//! let route = cache.parse("Home/Detail/42").unwrap();
//! assert_eq!(route.action(), "Detail");
//!
//! cache.parse("Home/Detail/42").unwrap();
//! assert_eq!(cache.stats().hits, 1);
//! assert_eq!(cache.stats().misses, 1);
//! ```

use crate::error::NavigationError;
use crate::route::RouteData;
use crate::{debug_log, trace_log};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Counters tracking cache hit/miss rates and invalidations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups answered from the cache.
    pub hits: usize,
    /// Number of lookups that had to parse.
    pub misses: usize,
    /// Number of full cache invalidations (via [`RouteCache::clear`]).
    pub invalidations: usize,
}

impl CacheStats {
    /// Return the hit rate as a value in `0.0..=1.0`.
    ///
    /// Returns `0.0` if no lookups have been performed.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of parsed routes.
#[derive(Debug)]
pub struct RouteCache {
    routes: LruCache<String, RouteData>,
    stats: CacheStats,
}

impl RouteCache {
    /// Default number of cached routes.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a cache holding at most `capacity` routes. Zero is treated as
    /// one.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            routes: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Look up a previously parsed route.
    ///
    /// Returns `None` on a cache miss. Updates hit/miss stats.
    pub fn get(&mut self, url: &str) -> Option<RouteData> {
        if let Some(route) = self.routes.get(url) {
            self.stats.hits += 1;
            trace_log!("Route cache hit for '{}'", url);
            Some(route.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Route cache miss for '{}'", url);
            None
        }
    }

    /// Insert a parsed route, keyed by its URL.
    pub fn insert(&mut self, route: RouteData) {
        self.routes.push(route.url().to_string(), route);
    }

    /// Return the cached parse of `url`, parsing and caching it on a miss.
    pub fn parse(&mut self, url: &str) -> Result<RouteData, NavigationError> {
        if let Some(route) = self.get(url) {
            return Ok(route);
        }
        let route = RouteData::parse(url)?;
        self.insert(route.clone());
        Ok(route)
    }

    /// Clear the cache and increment the invalidation counter.
    pub fn clear(&mut self) {
        let len = self.routes.len();
        self.routes.clear();
        self.stats.invalidations += 1;
        debug_log!(
            "Route cache cleared: {} entries removed ({} total invalidations, hit rate: {:.1}%)",
            len,
            self.stats.invalidations,
            self.stats.hit_rate() * 100.0
        );
    }

    /// Return a reference to the current cache statistics.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Reset all counters in [`CacheStats`] to zero.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Number of cached routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Maximum number of cached routes.
    pub fn capacity(&self) -> usize {
        self.routes.cap().get()
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}
