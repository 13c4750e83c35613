//! Route guards.
//!
//! A guard looks at the pending [`ActionResult`] of a navigation and decides
//! whether it may proceed. Guards are registered on the
//! [`MiddlewarePipeline`](crate::MiddlewarePipeline) under a route pattern and
//! run after the before-navigate hooks, before the controller is looked up.
//!
//! All guard methods are **synchronous**. A guard that returns `false` ends
//! the navigation with [`NavigationError::GuardRejected`](crate::NavigationError::GuardRejected).
//!
//! # Composition
//!
//! | Combinator | Logic |
//! |------------|-------|
//! | [`Guards`] | AND: all guards must allow |
//! | [`NotGuard`] | Invert: allow becomes deny, deny becomes allow |
//!
//! # Example
//!
//! ```
//! use mvc_navigator::{guard_fn, ActionType, NotGuard, RouteGuard};
//!
//! let no_partials = guard_fn(|_result, action_type| !action_type.is_partial());
//! let only_partials = NotGuard::new(guard_fn(|_result, action_type| !action_type.is_partial()));
//! # let _ = (no_partials, only_partials);
//! ```

use crate::result::{ActionResult, ActionType};

// ============================================================================
// RouteGuard trait
// ============================================================================

/// Trait for guards that control access to routes.
///
/// # Example
///
/// ```
/// use mvc_navigator::{ActionResult, ActionType, RouteGuard};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct SignedIn(AtomicBool);
///
/// impl RouteGuard for SignedIn {
///     fn check(&self, _result: &ActionResult, _action_type: ActionType) -> bool {
///         self.0.load(Ordering::SeqCst)
///     }
///
///     fn name(&self) -> &'static str {
///         "SignedIn"
///     }
/// }
/// ```
pub trait RouteGuard: Send + Sync + 'static {
    /// Return `true` to let the navigation continue.
    ///
    /// `result` is still pending: its route is known, its view is not.
    fn check(&self, result: &ActionResult, action_type: ActionType) -> bool;

    /// Guard name for debugging and logs.
    fn name(&self) -> &'static str {
        "RouteGuard"
    }
}

// ============================================================================
// guard_fn helper
// ============================================================================

/// Create a guard from a function or closure.
pub const fn guard_fn<F>(f: F) -> FnGuard<F>
where
    F: Fn(&ActionResult, ActionType) -> bool + Send + Sync + 'static,
{
    FnGuard { f }
}

/// Guard created from a function or closure.
pub struct FnGuard<F> {
    f: F,
}

impl<F> RouteGuard for FnGuard<F>
where
    F: Fn(&ActionResult, ActionType) -> bool + Send + Sync + 'static,
{
    fn check(&self, result: &ActionResult, action_type: ActionType) -> bool {
        (self.f)(result, action_type)
    }
}

// ============================================================================
// Guard Composition
// ============================================================================

/// Combines multiple guards with AND logic.
///
/// Guards run in insertion order and the first denial short-circuits.
/// An empty composition allows everything.
///
/// ```
/// use mvc_navigator::{guard_fn, Guards};
///
/// let guard = Guards::builder()
///     .guard(guard_fn(|result, _| !result.route_url().is_empty()))
///     .guard(guard_fn(|result, _| result.route_url() != "Admin/Index"))
///     .build();
/// assert_eq!(guard.len(), 2);
/// ```
pub struct Guards {
    guards: Vec<Box<dyn RouteGuard>>,
}

impl Guards {
    /// Create a new AND composition from a vec of boxed guards.
    #[must_use]
    pub fn new(guards: Vec<Box<dyn RouteGuard>>) -> Self {
        Self { guards }
    }

    /// Start building a guard composition.
    pub fn builder() -> GuardBuilder {
        GuardBuilder::new()
    }

    /// Number of composed guards.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Check if the composition is empty.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl RouteGuard for Guards {
    fn check(&self, result: &ActionResult, action_type: ActionType) -> bool {
        self.guards
            .iter()
            .all(|guard| guard.check(result, action_type))
    }

    fn name(&self) -> &'static str {
        "Guards"
    }
}

/// Builder for [`Guards`] with fluent API.
#[must_use]
pub struct GuardBuilder {
    guards: Vec<Box<dyn RouteGuard>>,
}

impl GuardBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self { guards: Vec::new() }
    }

    /// Add a guard to the composition.
    pub fn guard<G: RouteGuard>(mut self, guard: G) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    /// Build the final [`Guards`].
    #[must_use]
    pub fn build(self) -> Guards {
        Guards::new(self.guards)
    }
}

impl Default for GuardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// NotGuard
// ============================================================================

/// Inverts a guard result.
pub struct NotGuard {
    guard: Box<dyn RouteGuard>,
}

impl NotGuard {
    /// Create a new NOT guard wrapping the given guard.
    pub fn new<G: RouteGuard>(guard: G) -> Self {
        Self {
            guard: Box::new(guard),
        }
    }
}

impl RouteGuard for NotGuard {
    fn check(&self, result: &ActionResult, action_type: ActionType) -> bool {
        !self.guard.check(result, action_type)
    }

    fn name(&self) -> &'static str {
        "NotGuard"
    }
}

// ============================================================================
// Tests
// ============================================================================
