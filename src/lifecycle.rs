//! View lifecycle hooks and navigation notifications.
//!
//! - [`ViewLifecycle`]: implemented by the view objects a
//!   [`Presenter`](crate::Presenter) creates. The owning
//!   [`ActionResult`](crate::ActionResult) calls
//!   [`on_show`](ViewLifecycle::on_show) once, right after instantiation, and
//!   [`on_refresh`](ViewLifecycle::on_refresh) whenever
//!   [`ActionResult::refresh`](crate::ActionResult::refresh) is called.
//! - [`BeforeNavigateHook`] / [`NavigatedHook`]: router-level observers.
//!   A before-navigate hook returning `false` vetoes the navigation ahead of
//!   any middleware; navigated hooks only observe.
//!
//! # Navigation pipeline
//!
//! 1. **Route parsing**: malformed routes are returned as errors
//! 2. **Before-navigate hooks**: any `false` rejects the navigation
//! 3. **Middleware**: global, then `Controller/*`, then exact guards
//! 4. **Dispatch**: controller lookup/creation and action invocation
//! 5. **Asset load**: asynchronous, ends in instantiation
//! 6. **`on_show`**: the new view is told it is visible
//! 7. **Commit**: history update, then teardown of the previous view
//!
//! Navigated hooks run once dispatch has finished (after step 5 has started).
//!
//! ```
//! use mvc_navigator::{ViewLifecycle, ViewModel};
//!
//! #[derive(Default)]
//! struct ScoreBoard {
//!     shown_with: Option<u32>,
//!     refreshes: usize,
//! }
//!
//! impl ViewLifecycle for ScoreBoard {
//!     fn on_show(&mut self, model: Option<&ViewModel>) {
//!         self.shown_with = model.and_then(|m| m.downcast_ref::<u32>()).copied();
//!     }
//!
//!     fn on_refresh(&mut self) {
//!         self.refreshes += 1;
//!     }
//! }
//!
//! let mut view = ScoreBoard::default();
//! view.on_show(Some(&ViewModel::new(10_u32)));
//! view.on_refresh();
//! assert_eq!(view.shown_with, Some(10));
//! assert_eq!(view.refreshes, 1);
//! ```

use crate::params::ViewModel;
use crate::result::{ActionResult, ActionType};
use std::sync::Arc;

/// Hooks called on a live view instance.
///
/// Both methods default to doing nothing.
pub trait ViewLifecycle: Send + 'static {
    /// Called once after the view has been instantiated, with the model the
    /// action attached to its result.
    fn on_show(&mut self, model: Option<&ViewModel>) {
        let _ = model;
    }

    /// Called when the owning result is refreshed.
    fn on_refresh(&mut self) {}
}

impl ViewLifecycle for () {}

/// Veto hook run before middleware. Returning `false` rejects the navigation.
pub type BeforeNavigateHook = Arc<dyn Fn(&ActionResult, ActionType) -> bool + Send + Sync>;

/// Observer run after a navigation has been dispatched.
pub type NavigatedHook = Arc<dyn Fn(&ActionResult, ActionType) + Send + Sync>;

/// Registered router hooks.
#[derive(Default, Clone)]
pub(crate) struct NavigationHooks {
    before: Vec<BeforeNavigateHook>,
    after: Vec<NavigatedHook>,
}

impl NavigationHooks {
    pub(crate) fn add_before(&mut self, hook: BeforeNavigateHook) {
        self.before.push(hook);
    }

    pub(crate) fn add_after(&mut self, hook: NavigatedHook) {
        self.after.push(hook);
    }

    pub(crate) fn before(&self) -> Vec<BeforeNavigateHook> {
        self.before.clone()
    }

    pub(crate) fn after(&self) -> Vec<NavigatedHook> {
        self.after.clone()
    }
}
