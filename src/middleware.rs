//! Route middleware: guards registered under route patterns.
//!
//! The pipeline runs **after** the router's before-navigate hooks and
//! **before** the controller is looked up. It decides whether a navigation may
//! proceed; it never dispatches anything itself.
//!
//! # Patterns
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `*` | every route |
//! | `Controller/*` | every action of `Controller` |
//! | `Controller/Action[/Data]` | exactly that route string |
//!
//! # Execution order
//!
//! Guards run global first, then controller, then exact. Within a pattern they
//! run in registration order. The first guard that returns `false`
//! short-circuits evaluation; a pattern with no guards passes.
//!
//! # Example
//!
//! ```
//! use mvc_navigator::{guard_fn, MiddlewarePipeline};
//!
//! let mut pipeline = MiddlewarePipeline::new();
//! pipeline.register("Admin/*", guard_fn(|_, _| false)).unwrap();
//!
//! assert!(pipeline.has_guard("Admin/Users"));
//! assert!(!pipeline.has_guard("Home/Index"));
//! ```

use crate::error::NavigationError;
use crate::guards::RouteGuard;
use crate::result::{ActionResult, ActionType};
use crate::route::controller_segment;
use crate::{debug_log, trace_log, warn_log};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const WILDCARD: &str = "*";
const CONTROLLER_WILDCARD: &str = "/*";

// ============================================================================
// RoutePattern
// ============================================================================

/// A parsed middleware registration pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutePattern {
    /// `*`
    Global,
    /// `Controller/*`
    Controller(String),
    /// Any other pattern, compared to the route string verbatim.
    Exact(String),
}

impl RoutePattern {
    /// Parse a pattern string.
    ///
    /// An empty pattern, or a controller wildcard without a controller
    /// (`"/*"`), fails with [`NavigationError::InvalidRoute`].
    pub fn parse(pattern: &str) -> Result<Self, NavigationError> {
        let invalid = |reason: &str| NavigationError::InvalidRoute {
            route: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.is_empty() {
            return Err(invalid("middleware pattern is empty"));
        }
        if pattern == WILDCARD {
            return Ok(Self::Global);
        }
        if let Some(controller) = pattern.strip_suffix(CONTROLLER_WILDCARD) {
            if controller.is_empty() {
                return Err(invalid("controller wildcard without a controller"));
            }
            return Ok(Self::Controller(controller.to_string()));
        }
        Ok(Self::Exact(pattern.to_string()))
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str(WILDCARD),
            Self::Controller(controller) => write!(f, "{}{}", controller, CONTROLLER_WILDCARD),
            Self::Exact(route) => f.write_str(route),
        }
    }
}

// ============================================================================
// GuardChain
// ============================================================================

/// The guards that apply to one route, in evaluation order.
///
/// Obtained from [`MiddlewarePipeline::chain`]. Holding a chain does not
/// borrow the pipeline, so guards can be evaluated without holding any lock
/// on it.
#[derive(Clone, Default)]
pub struct GuardChain {
    guards: Vec<Arc<dyn RouteGuard>>,
}

impl GuardChain {
    /// Number of guards in the chain.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Check if no guard applies.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Run the chain. Stops at the first guard that returns `false`.
    pub fn check(&self, result: &ActionResult, action_type: ActionType) -> bool {
        for guard in &self.guards {
            if !guard.check(result, action_type) {
                warn_log!(
                    "Guard '{}' rejected navigation to '{}'",
                    guard.name(),
                    result.route_url()
                );
                return false;
            }
            trace_log!(
                "Guard '{}' allowed navigation to '{}'",
                guard.name(),
                result.route_url()
            );
        }
        true
    }
}

impl fmt::Debug for GuardChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.guards.iter().map(|g| g.name()).collect();
        f.debug_struct("GuardChain").field("guards", &names).finish()
    }
}

// ============================================================================
// MiddlewarePipeline
// ============================================================================

/// Guards keyed by global, controller and exact route patterns.
#[derive(Default, Clone)]
pub struct MiddlewarePipeline {
    global: Vec<Arc<dyn RouteGuard>>,
    controllers: HashMap<String, Vec<Arc<dyn RouteGuard>>>,
    exact: HashMap<String, Vec<Arc<dyn RouteGuard>>>,
}

impl MiddlewarePipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `guard` under `pattern`. Earlier guards for the same pattern are
    /// kept and run first.
    pub fn register<G: RouteGuard>(&mut self, pattern: &str, guard: G) -> Result<(), NavigationError> {
        self.register_arc(pattern, Arc::new(guard))
    }

    /// Add an already shared guard under `pattern`.
    pub fn register_arc(
        &mut self,
        pattern: &str,
        guard: Arc<dyn RouteGuard>,
    ) -> Result<(), NavigationError> {
        let parsed = RoutePattern::parse(pattern)?;
        debug_log!("Registered guard '{}' for '{}'", guard.name(), parsed);
        match parsed {
            RoutePattern::Global => self.global.push(guard),
            RoutePattern::Controller(controller) => {
                self.controllers.entry(controller).or_default().push(guard);
            }
            RoutePattern::Exact(route) => self.exact.entry(route).or_default().push(guard),
        }
        Ok(())
    }

    /// Remove every guard registered under exactly `pattern`.
    ///
    /// Returns `true` if anything was removed. Guards registered under other
    /// patterns that also cover the same routes are untouched.
    pub fn remove(&mut self, pattern: &str) -> bool {
        let Ok(parsed) = RoutePattern::parse(pattern) else {
            return false;
        };
        let removed = match &parsed {
            RoutePattern::Global => !std::mem::take(&mut self.global).is_empty(),
            RoutePattern::Controller(controller) => self.controllers.remove(controller).is_some(),
            RoutePattern::Exact(route) => self.exact.remove(route).is_some(),
        };
        if removed {
            debug_log!("Removed guards for '{}'", parsed);
        }
        removed
    }

    /// Check if any guard would run for `route`.
    pub fn has_guard(&self, route: &str) -> bool {
        !self.global.is_empty()
            || self
                .controllers
                .get(controller_segment(route))
                .is_some_and(|guards| !guards.is_empty())
            || self
                .exact
                .get(route)
                .is_some_and(|guards| !guards.is_empty())
    }

    /// The guards that apply to `route`, in evaluation order.
    pub fn chain(&self, route: &str) -> GuardChain {
        let controller = self
            .controllers
            .get(controller_segment(route))
            .into_iter()
            .flatten();
        let exact = self.exact.get(route).into_iter().flatten();
        GuardChain {
            guards: self
                .global
                .iter()
                .chain(controller)
                .chain(exact)
                .cloned()
                .collect(),
        }
    }

    /// Evaluate every guard that applies to `route` with short-circuit AND.
    ///
    /// Returns `true` when no guard applies.
    pub fn evaluate(&self, route: &str, result: &ActionResult, action_type: ActionType) -> bool {
        self.chain(route).check(result, action_type)
    }

    /// Total number of registered guards.
    pub fn len(&self) -> usize {
        self.global.len()
            + self.controllers.values().map(Vec::len).sum::<usize>()
            + self.exact.values().map(Vec::len).sum::<usize>()
    }

    /// Check if no guard is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("global", &self.global.len())
            .field("controllers", &self.controllers.len())
            .field("exact", &self.exact.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
