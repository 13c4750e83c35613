//! Router context and the public [`Router`] handle.
//!
//! This module contains the types that tie the crate together:
//!
//! - [`Router`]: a cheap, cloneable handle. Every clone drives the same
//!   navigation state. All methods take `&self`.
//! - [`RouterBuilder`]: collects the collaborators, configuration and
//!   controllers before the first navigation.
//! - `RouterContext` (crate-private): the shared state behind the handle.
//!   Controller registry, middleware, history, hooks and the route cache
//!   each sit behind their own lock.
//!
//! # Navigation pipeline
//!
//! `navigate` parses the route, runs before-navigate hooks, then middleware,
//! then dispatches to the controller action. A non-partial result is
//! committed to history once the presenter has instantiated it, and only then
//! is the previously displayed view destroyed.
//!
//! No lock is held while a hook, guard, action handler, loader or presenter
//! runs, so any of them may call back into the router.
//!
//! # Example
//!
//! ```
//! use mvc_navigator::{
//!     AssetHandle, ControllerBuilder, MemoryAssetLoader, Presenter, Router, ViewInstance,
//! };
//! use std::sync::Arc;
//!
//! struct NullPresenter;
//!
//! impl Presenter for NullPresenter {
//!     fn instantiate(&self, _asset: &AssetHandle, _parent: Option<&str>) -> ViewInstance {
//!         ViewInstance::new(())
//!     }
//!
//!     fn destroy(&self, _instance: ViewInstance) {}
//! }
//!
//! struct Home;
//!
//! let loader = Arc::new(MemoryAssetLoader::new().with_asset("Home/Index", ()));
//! let router = Router::builder(loader, Arc::new(NullPresenter))
//!     .controller(ControllerBuilder::new("Home", || Home).action("Index", |_, req| Some(req.view())))
//!     .build();
//!
//! let result = router.navigate("Home/Index").unwrap();
//! assert!(result.is_resolved());
//! assert_eq!(router.history_index(), Some(0));
//! ```

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, RouteCache};
use crate::config::{RouterConfig, StaleCommitPolicy};
use crate::controller::{
    ActionRequest, ControllerDescriptor, ControllerHandle, ControllerRegistry, Instance,
};
use crate::error::NavigationError;
use crate::guards::RouteGuard;
use crate::lifecycle::NavigationHooks;
use crate::loader::AssetLoader;
use crate::middleware::MiddlewarePipeline;
use crate::params::NavigationArgs;
use crate::presenter::Presenter;
use crate::result::{ActionResult, ActionType, Collaborators, InstantiatedCallback};
use crate::route::RouteData;
use crate::state::{CommitKind, HistoryStack, RouterState};
use crate::{debug_log, info_log, warn_log};
use std::any::Any;
use std::fmt;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

// ============================================================================
// NavigateOptions
// ============================================================================

/// Flags for [`Router::navigate_with`].
///
/// ```
/// use mvc_navigator::NavigateOptions;
///
/// let options = NavigateOptions::new().push_to_history(false);
/// assert!(!options.partial);
/// assert!(!options.push_to_history);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavigateOptions {
    /// Show transient partial content: no history, no teardown.
    pub partial: bool,
    /// Append the result to history. When `false`, a full navigation replaces
    /// the history entry under the cursor instead.
    pub push_to_history: bool,
}

impl NavigateOptions {
    /// Full view, pushed to history.
    pub const fn new() -> Self {
        Self {
            partial: false,
            push_to_history: true,
        }
    }

    /// Set the partial flag.
    pub const fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// Set whether the result is pushed to history.
    pub const fn push_to_history(mut self, push: bool) -> Self {
        self.push_to_history = push;
        self
    }
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HistoryEntry
// ============================================================================

/// One line of [`Router::history_snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Position in history.
    pub index: usize,
    /// Route of the entry.
    pub route: String,
    /// Number of navigation arguments remembered for the route.
    pub args: usize,
    /// Full or partial view.
    pub action_type: ActionType,
    /// `true` for the entry under the cursor.
    pub is_current: bool,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_current { ">" } else { " " };
        write!(
            f,
            "{} {:>3}  {}  (args: {}, {:?})",
            marker, self.index, self.route, self.args, self.action_type
        )
    }
}

// ============================================================================
// RouterContext
// ============================================================================

/// Shared state behind every [`Router`] clone.
pub(crate) struct RouterContext {
    config: RouterConfig,
    collaborators: Collaborators,
    controllers: Mutex<ControllerRegistry>,
    middleware: RwLock<MiddlewarePipeline>,
    state: Mutex<RouterState>,
    hooks: RwLock<NavigationHooks>,
    #[cfg(feature = "cache")]
    route_cache: Mutex<RouteCache>,
}

impl RouterContext {
    fn lock_state(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_controllers(&self) -> MutexGuard<'_, ControllerRegistry> {
        self.controllers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_middleware(&self) -> RwLockReadGuard<'_, MiddlewarePipeline> {
        self.middleware
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_middleware(&self) -> RwLockWriteGuard<'_, MiddlewarePipeline> {
        self.middleware
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_hooks(&self) -> RwLockReadGuard<'_, NavigationHooks> {
        self.hooks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_hooks(&self) -> RwLockWriteGuard<'_, NavigationHooks> {
        self.hooks.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(feature = "cache")]
    fn lock_route_cache(&self) -> MutexGuard<'_, RouteCache> {
        self.route_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(feature = "cache")]
    fn parse_route(&self, route: &str) -> Result<RouteData, NavigationError> {
        self.lock_route_cache().parse(route)
    }

    #[cfg(not(feature = "cache"))]
    fn parse_route(&self, route: &str) -> Result<RouteData, NavigationError> {
        RouteData::parse(route)
    }

    /// Turn a registry lookup into a live controller. The factory runs with
    /// no lock held.
    fn materialize(&self, controller: &str, instance: Instance) -> ControllerHandle {
        match instance {
            Instance::Live(handle) => handle,
            Instance::Missing(factory) => {
                let created = factory();
                self.lock_controllers().adopt(controller, created)
            }
        }
    }

    /// Record a resolved result, then tear down what it displaced.
    fn commit(
        &self,
        result: &ActionResult,
        generation: usize,
        kind: CommitKind,
        args: NavigationArgs,
    ) {
        let outcome = {
            let mut state = self.lock_state();
            let stale = !state.is_navigation_current(generation);
            if stale && self.config.stale_commit_policy == StaleCommitPolicy::Discard {
                None
            } else {
                Some(state.commit(result.clone(), kind, args))
            }
        };

        let Some(outcome) = outcome else {
            debug_log!(
                "Discarding stale navigation to '{}' (generation {})",
                result.route_url(),
                generation
            );
            result.destroy();
            return;
        };

        info_log!("Navigation complete: '{}'", result.route_url());
        if let Some(previous) = outcome.previous {
            debug_log!("Tearing down previous view '{}'", previous.route_url());
            previous.destroy();
        }
        for evicted in outcome.evicted {
            evicted.destroy();
        }
    }
}

fn commit_continuation(
    context: Weak<RouterContext>,
    generation: usize,
    kind: CommitKind,
    args: NavigationArgs,
) -> InstantiatedCallback {
    Box::new(move |result: &ActionResult| {
        if let Some(context) = context.upgrade() {
            context.commit(result, generation, kind, args);
        } else {
            debug_log!(
                "Router dropped before '{}' finished loading",
                result.route_url()
            );
        }
    })
}

// ============================================================================
// RouterBuilder
// ============================================================================

/// Builder for [`Router`].
#[must_use]
pub struct RouterBuilder {
    loader: Arc<dyn AssetLoader>,
    presenter: Arc<dyn Presenter>,
    config: RouterConfig,
    controllers: ControllerRegistry,
}

impl RouterBuilder {
    /// Use `config` instead of [`RouterConfig::default`].
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a controller.
    pub fn controller(mut self, descriptor: impl Into<ControllerDescriptor>) -> Self {
        self.controllers.register(descriptor);
        self
    }

    /// Build the router.
    pub fn build(self) -> Router {
        info_log!(
            "Router created (loader: {}, presenter: {})",
            self.loader.name(),
            self.presenter.name()
        );
        Router {
            context: Arc::new(RouterContext {
                state: Mutex::new(RouterState::new(self.config.history_capacity)),
                #[cfg(feature = "cache")]
                route_cache: Mutex::new(RouteCache::with_capacity(
                    self.config.route_cache_capacity,
                )),
                config: self.config,
                collaborators: Collaborators {
                    loader: self.loader,
                    presenter: self.presenter,
                },
                controllers: Mutex::new(self.controllers),
                middleware: RwLock::new(MiddlewarePipeline::new()),
                hooks: RwLock::new(NavigationHooks::default()),
            }),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Controller/action view router.
#[derive(Clone)]
pub struct Router {
    context: Arc<RouterContext>,
}

impl Router {
    /// Create a router with the default configuration and no controllers.
    pub fn new<L: AssetLoader, P: Presenter>(loader: Arc<L>, presenter: Arc<P>) -> Self {
        Self::builder(loader, presenter).build()
    }

    /// Start building a router around a loader and a presenter.
    pub fn builder<L: AssetLoader, P: Presenter>(loader: Arc<L>, presenter: Arc<P>) -> RouterBuilder {
        RouterBuilder {
            loader,
            presenter,
            config: RouterConfig::default(),
            controllers: ControllerRegistry::new(),
        }
    }

    /// The router's configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.context.config
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a controller. Replaces a controller of the same name and
    /// drops its live instance.
    pub fn register_controller(&self, descriptor: impl Into<ControllerDescriptor>) {
        self.context.lock_controllers().register(descriptor);
    }

    /// Check if a controller with this name is registered.
    pub fn has_controller(&self, controller: &str) -> bool {
        self.context.lock_controllers().contains(controller)
    }

    /// Live instance of `controller`, creating it if needed.
    pub fn controller_instance(&self, controller: &str) -> Result<ControllerHandle, NavigationError> {
        let instance = self.context.lock_controllers().lookup_instance(controller)?;
        Ok(self.context.materialize(controller, instance))
    }

    /// Live instance of `controller` as its concrete type.
    pub fn controller<C: Any + Send + Sync>(&self, controller: &str) -> Option<Arc<C>> {
        self.controller_instance(controller)
            .ok()?
            .downcast::<C>()
            .ok()
    }

    /// Register `guard` under `pattern` (`*`, `Controller/*` or an exact
    /// route).
    pub fn on_route<G: RouteGuard>(&self, pattern: &str, guard: G) -> Result<(), NavigationError> {
        self.context.write_middleware().register(pattern, guard)
    }

    /// Remove every guard registered under exactly `pattern`.
    pub fn remove_route_configuration(&self, pattern: &str) -> bool {
        self.context.write_middleware().remove(pattern)
    }

    /// Check if any guard would run for `route`.
    pub fn has_guard(&self, route: &str) -> bool {
        self.context.read_middleware().has_guard(route)
    }

    /// Add a hook that runs before middleware. Returning `false` vetoes the
    /// navigation.
    pub fn on_before_navigate<F>(&self, hook: F)
    where
        F: Fn(&ActionResult, ActionType) -> bool + Send + Sync + 'static,
    {
        self.context.write_hooks().add_before(Arc::new(hook));
    }

    /// Add an observer that runs after every successful dispatch.
    pub fn on_navigated<F>(&self, hook: F)
    where
        F: Fn(&ActionResult, ActionType) + Send + Sync + 'static,
    {
        self.context.write_hooks().add_after(Arc::new(hook));
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigate to `route` as a full view, pushed to history.
    pub fn navigate(&self, route: &str) -> Result<ActionResult, NavigationError> {
        self.navigate_with(route, NavigateOptions::new(), NavigationArgs::new())
    }

    /// Navigate to `route` with arguments for the action.
    pub fn navigate_with_args(
        &self,
        route: &str,
        args: NavigationArgs,
    ) -> Result<ActionResult, NavigationError> {
        self.navigate_with(route, NavigateOptions::new(), args)
    }

    /// Show `route` as partial content. Partial results bypass history and
    /// never tear down the displayed view; the caller destroys them.
    pub fn navigate_partial(
        &self,
        route: &str,
        args: NavigationArgs,
    ) -> Result<ActionResult, NavigationError> {
        self.navigate_with(route, NavigateOptions::new().partial(true), args)
    }

    /// Navigate to `route`.
    ///
    /// Malformed routes, unknown controllers or actions, and data segments
    /// that do not convert are returned as errors without touching any state.
    /// A veto or a handler that returns no view yields a failed result.
    pub fn navigate_with(
        &self,
        route: &str,
        options: NavigateOptions,
        args: NavigationArgs,
    ) -> Result<ActionResult, NavigationError> {
        self.dispatch(route, options, args, None)
    }

    /// Step `steps` entries back in history, clamped to the first entry.
    ///
    /// Returns a failed result with no reason when there is nothing to go
    /// back to.
    pub fn navigate_backward(&self, steps: usize) -> Result<ActionResult, NavigationError> {
        self.replay(|history| history.back_index(steps))
    }

    /// Step `steps` entries forward in history, clamped to the last entry.
    pub fn navigate_forward(&self, steps: usize) -> Result<ActionResult, NavigationError> {
        self.replay(|history| history.forward_index(steps))
    }

    fn replay(
        &self,
        target: impl FnOnce(&HistoryStack) -> Option<usize>,
    ) -> Result<ActionResult, NavigationError> {
        let (index, route, args) = {
            let state = self.context.lock_state();
            let history = state.history();
            let Some(index) = target(history) else {
                debug_log!("History is empty, nothing to replay");
                return Ok(ActionResult::failed("", ActionType::View, None));
            };
            let Some(entry) = history.get(index) else {
                return Ok(ActionResult::failed("", ActionType::View, None));
            };
            let unchanged = match state.active() {
                Some(active) => entry == active,
                None => history.cursor() == Some(index),
            };
            if unchanged {
                let route = state
                    .active()
                    .or_else(|| history.current())
                    .map(ActionResult::route_url)
                    .unwrap_or_default();
                debug_log!("History entry {} ('{}') is already displayed", index, route);
                return Ok(ActionResult::failed(route, ActionType::View, None));
            }
            let route = entry.route_url().to_string();
            let args = history.args_for(&route).cloned().unwrap_or_default();
            (index, route, args)
        };

        debug_log!("Replaying history entry {} ('{}')", index, route);
        self.dispatch(
            &route,
            NavigateOptions::new().push_to_history(false),
            args,
            Some(index),
        )
    }

    fn dispatch(
        &self,
        route: &str,
        options: NavigateOptions,
        args: NavigationArgs,
        replay: Option<usize>,
    ) -> Result<ActionResult, NavigationError> {
        let context = &self.context;
        let route_data = context.parse_route(route)?;
        let action_type = ActionType::from_partial(options.partial);
        info_log!("Navigating to '{}' ({:?})", route, action_type);

        let result = ActionResult::pending(route, action_type);

        let before = context.read_hooks().before();
        if !before.iter().all(|hook| hook(&result, action_type)) {
            warn_log!("Navigation to '{}' vetoed by a before-navigate hook", route);
            result.fail(NavigationError::GuardRejected {
                route: route.to_string(),
            });
            return Ok(result);
        }

        let chain = context.read_middleware().chain(route);
        if !chain.check(&result, action_type) {
            result.fail(NavigationError::GuardRejected {
                route: route.to_string(),
            });
            return Ok(result);
        }

        let (instance, handler) = context.lock_controllers().lookup(&route_data)?;
        let controller = context.materialize(route_data.controller(), instance);
        let request = ActionRequest::new(route_data, args.clone(), action_type);
        let Some(view) = handler.invoke(&controller, request)? else {
            warn_log!("Action for '{}' produced no view", route);
            result.fail(NavigationError::HandlerProducedNoResult {
                route: route.to_string(),
            });
            return Ok(result);
        };
        let view = match &context.config.default_parent {
            Some(parent) if view.parent().is_none() => view.with_parent(parent.clone()),
            _ => view,
        };
        result.fulfill(view);

        let on_instantiated = if action_type.is_partial() {
            None
        } else {
            let generation = context.lock_state().start_navigation();
            let kind = match replay {
                Some(index) => CommitKind::Replay { index },
                None if options.push_to_history => CommitKind::Push,
                None => CommitKind::Replace,
            };
            Some(commit_continuation(
                Arc::downgrade(context),
                generation,
                kind,
                args,
            ))
        };
        result.execute(context.collaborators.clone(), on_instantiated);

        let after = context.read_hooks().after();
        for hook in &after {
            hook(&result, action_type);
        }
        Ok(result)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Every history entry, oldest first.
    pub fn history(&self) -> Vec<ActionResult> {
        self.context.lock_state().history().entries().to_vec()
    }

    /// The entry under the history cursor.
    pub fn current_history(&self) -> Option<ActionResult> {
        self.context.lock_state().history().current().cloned()
    }

    /// The newest history entry.
    pub fn last_history(&self) -> Option<ActionResult> {
        self.context.lock_state().history().last().cloned()
    }

    /// Cursor position. `None` before the first commit and after
    /// [`clear_history`](Self::clear_history).
    pub fn history_index(&self) -> Option<usize> {
        self.context.lock_state().history().cursor()
    }

    /// Number of history entries.
    pub fn history_len(&self) -> usize {
        self.context.lock_state().history().len()
    }

    /// Arguments remembered for `route`.
    pub fn history_args(&self, route: &str) -> Option<NavigationArgs> {
        self.context.lock_state().history().args_for(route).cloned()
    }

    /// Check if [`navigate_backward`](Self::navigate_backward) would move.
    pub fn can_go_back(&self) -> bool {
        self.context.lock_state().history().can_go_back()
    }

    /// Check if [`navigate_forward`](Self::navigate_forward) would move.
    pub fn can_go_forward(&self) -> bool {
        self.context.lock_state().history().can_go_forward()
    }

    /// The displayed full view.
    pub fn active_view(&self) -> Option<ActionResult> {
        self.context.lock_state().active().cloned()
    }

    /// Debug listing of the history.
    pub fn history_snapshot(&self) -> Vec<HistoryEntry> {
        let state = self.context.lock_state();
        let history = state.history();
        history
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| HistoryEntry {
                index,
                route: entry.route_url().to_string(),
                args: history
                    .args_for(entry.route_url())
                    .map_or(0, NavigationArgs::len),
                action_type: entry.action_type(),
                is_current: history.cursor() == Some(index),
            })
            .collect()
    }

    /// Forget every history entry. The displayed view stays up until the
    /// next navigation replaces it.
    pub fn clear_history(&self) {
        let dropped = self.context.lock_state().clear_history();
        debug_log!("History cleared ({} entries)", dropped.len());
        for entry in dropped {
            entry.destroy();
        }
    }

    /// Destroy the displayed view, clear history and drop every controller
    /// instance. Loads still in flight are treated as stale.
    pub fn reset(&self) {
        let dropped = self.context.lock_state().reset();
        for entry in dropped {
            entry.destroy();
        }
        self.context.lock_controllers().clear_instances();
        #[cfg(feature = "cache")]
        self.context.lock_route_cache().clear();
        info_log!("Router reset");
    }

    /// Route cache statistics.
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.context.lock_route_cache().stats().clone()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.context.lock_state();
        f.debug_struct("Router")
            .field("history_len", &state.history().len())
            .field("history_index", &state.history().cursor())
            .field("active", &state.active().map(ActionResult::route_url))
            .field("config", &self.context.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
