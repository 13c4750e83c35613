//! Router configuration.
//!
//! ```
//! use mvc_navigator::{RouterConfig, StaleCommitPolicy};
//!
//! let config = RouterConfig::new()
//!     .history_capacity(50)
//!     .stale_commit_policy(StaleCommitPolicy::Commit);
//! assert_eq!(config.history_capacity, Some(50));
//! ```

/// What happens when a navigation finishes loading after a newer one has
/// started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StaleCommitPolicy {
    /// Destroy the stale result without touching history or the displayed
    /// view.
    #[default]
    Discard,
    /// Commit it anyway, in completion order.
    Commit,
}

/// Settings fixed for a router's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Maximum number of history entries. `None` keeps everything.
    pub history_capacity: Option<usize>,
    /// Handling of navigations superseded while loading.
    pub stale_commit_policy: StaleCommitPolicy,
    /// Parent handed to the presenter for views that do not name one,
    /// typically the layout root.
    pub default_parent: Option<String>,
    /// Number of parsed routes kept in the route cache.
    #[cfg(feature = "cache")]
    pub route_cache_capacity: usize,
}

impl RouterConfig {
    /// Default configuration: unbounded history, stale completions discarded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the history to `capacity` entries.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Set the stale completion policy.
    pub fn stale_commit_policy(mut self, policy: StaleCommitPolicy) -> Self {
        self.stale_commit_policy = policy;
        self
    }

    /// Attach views without an explicit parent to `parent`.
    pub fn default_parent(mut self, parent: impl Into<String>) -> Self {
        self.default_parent = Some(parent.into());
        self
    }

    /// Set the route cache capacity.
    #[cfg(feature = "cache")]
    pub fn route_cache_capacity(mut self, capacity: usize) -> Self {
        self.route_cache_capacity = capacity;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            history_capacity: None,
            stale_commit_policy: StaleCommitPolicy::Discard,
            default_parent: None,
            #[cfg(feature = "cache")]
            route_cache_capacity: crate::cache::RouteCache::DEFAULT_CAPACITY,
        }
    }
}
