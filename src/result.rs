//! Navigation results and their lifecycle.
//!
//! Every navigation produces an [`ActionResult`]. It is created **Pending**
//! when the router starts dispatching, and ends in one of two terminal states:
//!
//! ```text
//!            ┌──────────► Resolved ──destroy()──► (destroyed)
//! Pending ───┤
//!            └──────────► Failed
//! ```
//!
//! - **Resolved**: the action returned a [`ViewResult`], its asset was loaded
//!   and the [`Presenter`](crate::Presenter) instantiated it. The
//!   "instantiated" continuation fires exactly once, at this transition.
//! - **Failed**: a hook or guard vetoed the navigation, the action returned
//!   nothing, or the asset could not be found. The reason is available from
//!   [`ActionResult::failure`] and the result keeps the route it was for.
//!
//! `ActionResult` is a cheap, cloneable handle. The router, the history
//! stack and the caller all see the same underlying result. Equality is by
//! `(route_url, controller, view)`, so two results for the same route compare
//! equal even when they are different instances; use
//! [`same_instance`](ActionResult::same_instance) for identity.

use crate::error::NavigationError;
use crate::loader::{AssetHandle, AssetLoader};
use crate::params::ViewModel;
use crate::presenter::{Presenter, ViewInstance};
use crate::{debug_log, error_log, trace_log};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Whether a navigation shows a full view or transient partial content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionType {
    /// A page: recorded in history, replaces the previous view.
    #[default]
    View,
    /// Overlay content: bypasses history and teardown.
    PartialView,
}

impl ActionType {
    /// Map the `partial` navigation flag to an action type.
    pub fn from_partial(partial: bool) -> Self {
        if partial {
            Self::PartialView
        } else {
            Self::View
        }
    }

    /// Check if this is a partial view.
    pub fn is_partial(self) -> bool {
        matches!(self, Self::PartialView)
    }
}

/// Lifecycle state of an [`ActionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultState {
    /// Dispatched, asset not yet loaded and instantiated.
    Pending,
    /// Asset loaded and instantiated.
    Resolved,
    /// The navigation did not produce a view.
    Failed,
}

/// The view an action handler asks the router to show.
///
/// # Example
///
/// ```
/// use mvc_navigator::ViewResult;
///
/// let view = ViewResult::new("Home", "Index")
///     .with_model(42_u32)
///     .with_parent("main");
/// assert_eq!(view.address(), "Home/Index");
/// assert_eq!(view.parent(), Some("main"));
/// ```
#[derive(Debug, Clone)]
pub struct ViewResult {
    controller: String,
    view: String,
    model: Option<ViewModel>,
    parent: Option<String>,
}

impl ViewResult {
    /// Describe the view `view` of controller `controller`.
    pub fn new(controller: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            view: view.into(),
            model: None,
            parent: None,
        }
    }

    /// Attach a model, handed to the view's `on_show` hook.
    pub fn with_model<T: std::any::Any + Send + Sync>(mut self, model: T) -> Self {
        self.model = Some(ViewModel::new(model));
        self
    }

    /// Ask the presenter to attach the view under `parent`.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Controller name.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// View name.
    pub fn view_name(&self) -> &str {
        &self.view
    }

    /// Model attached by the action, if any.
    pub fn model(&self) -> Option<&ViewModel> {
        self.model.as_ref()
    }

    /// Parent slot requested by the action, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Asset address of the view, `"{controller}/{view}"`.
    pub fn address(&self) -> String {
        format!("{}/{}", self.controller, self.view)
    }
}

/// One-shot continuation fired when a result reaches `Resolved`.
pub(crate) type InstantiatedCallback = Box<dyn FnOnce(&ActionResult) + Send + 'static>;

/// The loader and presenter a result uses for its whole life.
#[derive(Clone)]
pub(crate) struct Collaborators {
    pub(crate) loader: Arc<dyn AssetLoader>,
    pub(crate) presenter: Arc<dyn Presenter>,
}

struct ResultSlot {
    state: ResultState,
    failure: Option<NavigationError>,
    asset: Option<AssetHandle>,
    instance: Option<ViewInstance>,
    collaborators: Option<Collaborators>,
    destroyed: bool,
}

struct ResultInner {
    route_url: String,
    action_type: ActionType,
    view: OnceLock<ViewResult>,
    slot: Mutex<ResultSlot>,
}

/// Outcome and lifecycle of one navigation.
#[derive(Clone)]
pub struct ActionResult {
    inner: Arc<ResultInner>,
}

impl ActionResult {
    fn with_state(
        route_url: impl Into<String>,
        action_type: ActionType,
        state: ResultState,
        failure: Option<NavigationError>,
    ) -> Self {
        Self {
            inner: Arc::new(ResultInner {
                route_url: route_url.into(),
                action_type,
                view: OnceLock::new(),
                slot: Mutex::new(ResultSlot {
                    state,
                    failure,
                    asset: None,
                    instance: None,
                    collaborators: None,
                    destroyed: false,
                }),
            }),
        }
    }

    /// A result that is still being dispatched.
    pub(crate) fn pending(route_url: impl Into<String>, action_type: ActionType) -> Self {
        Self::with_state(route_url, action_type, ResultState::Pending, None)
    }

    /// A result that failed before dispatch. `failure` is `None` for
    /// navigations that were a no-op (for example going back past the start
    /// of history).
    pub(crate) fn failed(
        route_url: impl Into<String>,
        action_type: ActionType,
        failure: Option<NavigationError>,
    ) -> Self {
        Self::with_state(route_url, action_type, ResultState::Failed, failure)
    }

    fn lock(&self) -> MutexGuard<'_, ResultSlot> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The route this result was navigated to. Set once, never changes.
    pub fn route_url(&self) -> &str {
        &self.inner.route_url
    }

    /// Full view or partial view.
    pub fn action_type(&self) -> ActionType {
        self.inner.action_type
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ResultState {
        self.lock().state
    }

    /// Check if the result is still pending.
    pub fn is_pending(&self) -> bool {
        self.state() == ResultState::Pending
    }

    /// Check if the view has been instantiated.
    pub fn is_resolved(&self) -> bool {
        self.state() == ResultState::Resolved
    }

    /// Check if the navigation failed.
    pub fn is_failed(&self) -> bool {
        self.state() == ResultState::Failed
    }

    /// Why the navigation failed. `None` while not failed, and for no-op
    /// back/forward navigations.
    pub fn failure(&self) -> Option<NavigationError> {
        self.lock().failure.clone()
    }

    /// The view the action returned, once dispatch has produced one.
    pub fn view(&self) -> Option<&ViewResult> {
        self.inner.view.get()
    }

    /// Controller name of the returned view.
    pub fn controller_name(&self) -> Option<&str> {
        self.view().map(ViewResult::controller)
    }

    /// Name of the returned view.
    pub fn view_name(&self) -> Option<&str> {
        self.view().map(ViewResult::view_name)
    }

    /// Asset address of the returned view.
    pub fn address(&self) -> Option<String> {
        self.view().map(ViewResult::address)
    }

    /// Model attached by the action.
    pub fn model(&self) -> Option<&ViewModel> {
        self.view().and_then(ViewResult::model)
    }

    /// Check if [`destroy`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    /// Check if the result currently owns a live view instance.
    pub fn has_instance(&self) -> bool {
        self.lock().instance.is_some()
    }

    /// Run `f` against the live view instance.
    ///
    /// `f` must not call back into this result.
    pub fn with_instance<R>(&self, f: impl FnOnce(&ViewInstance) -> R) -> Option<R> {
        self.lock().instance.as_ref().map(f)
    }

    /// `true` if both handles point at the same result instance.
    pub fn same_instance(&self, other: &ActionResult) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Attach the view returned by the action. Only the first call wins.
    pub(crate) fn fulfill(&self, view: ViewResult) -> bool {
        self.inner.view.set(view).is_ok()
    }

    /// Move a pending result to `Failed`. No-op in any other state.
    pub(crate) fn fail(&self, error: NavigationError) -> bool {
        let mut slot = self.lock();
        if slot.state != ResultState::Pending {
            return false;
        }
        slot.state = ResultState::Failed;
        slot.failure = Some(error);
        true
    }

    /// Start loading the view's asset. When the presenter has instantiated
    /// it the result becomes `Resolved` and `on_instantiated` runs.
    ///
    /// The loader may complete inline, in which case this returns with the
    /// result already resolved (or failed).
    pub(crate) fn execute(
        &self,
        collaborators: Collaborators,
        on_instantiated: Option<InstantiatedCallback>,
    ) {
        let Some(address) = self.address() else {
            return;
        };

        {
            let mut slot = self.lock();
            if slot.state != ResultState::Pending || slot.destroyed {
                return;
            }
            slot.collaborators = Some(collaborators.clone());
        }

        trace_log!(
            "Loading '{}' for route '{}' via {}",
            address,
            self.route_url(),
            collaborators.loader.name()
        );
        let result = self.clone();
        collaborators.loader.load(
            &address,
            Box::new(move |asset| result.complete_load(asset, on_instantiated)),
        );
    }

    fn complete_load(
        &self,
        asset: Option<AssetHandle>,
        on_instantiated: Option<InstantiatedCallback>,
    ) {
        let Some(asset) = asset else {
            let address = self.address().unwrap_or_default();
            error_log!(
                "Couldn't find view at address '{}' (route '{}')",
                address,
                self.route_url()
            );
            self.fail(NavigationError::AssetNotFound {
                route: self.route_url().to_string(),
                address,
            });
            return;
        };

        let (collaborators, abandoned) = {
            let slot = self.lock();
            (
                slot.collaborators.clone(),
                slot.destroyed || slot.state != ResultState::Pending,
            )
        };
        let Some(collaborators) = collaborators else {
            return;
        };
        if abandoned {
            debug_log!(
                "Route '{}' was destroyed while loading, releasing asset",
                self.route_url()
            );
            collaborators.loader.release(asset);
            return;
        }

        let view = self.view();
        let mut instance = collaborators
            .presenter
            .instantiate(&asset, view.and_then(ViewResult::parent));
        instance.show(view.and_then(ViewResult::model));

        {
            let mut slot = self.lock();
            if slot.destroyed {
                drop(slot);
                collaborators.presenter.destroy(instance);
                collaborators.loader.release(asset);
                return;
            }
            slot.asset = Some(asset);
            slot.instance = Some(instance);
            slot.state = ResultState::Resolved;
        }

        debug_log!("Route '{}' instantiated", self.route_url());
        if let Some(callback) = on_instantiated {
            callback(self);
        }
    }

    /// Call `on_refresh` on the live view. Returns `false` if there is none.
    pub fn refresh(&self) -> bool {
        let Some(mut instance) = self.lock().instance.take() else {
            return false;
        };
        instance.refresh();

        let mut slot = self.lock();
        if slot.destroyed {
            let collaborators = slot.collaborators.clone();
            drop(slot);
            if let Some(collaborators) = collaborators {
                collaborators.presenter.destroy(instance);
            }
        } else {
            slot.instance = Some(instance);
        }
        true
    }

    /// Destroy the view instance and release the asset handle.
    ///
    /// Idempotent: only the first call does anything. Returns `true` if a
    /// live instance was destroyed. A result destroyed while still loading
    /// never instantiates; its asset is released as soon as it arrives.
    pub fn destroy(&self) -> bool {
        let (instance, asset, collaborators) = {
            let mut slot = self.lock();
            if slot.destroyed {
                return false;
            }
            slot.destroyed = true;
            (
                slot.instance.take(),
                slot.asset.take(),
                slot.collaborators.clone(),
            )
        };

        let Some(collaborators) = collaborators else {
            return false;
        };
        let destroyed = instance.is_some();
        if let Some(instance) = instance {
            collaborators.presenter.destroy(instance);
        }
        if let Some(asset) = asset {
            collaborators.loader.release(asset);
        }
        debug_log!("Destroyed view for route '{}'", self.route_url());
        destroyed
    }
}

impl PartialEq for ActionResult {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
            || (self.route_url() == other.route_url()
                && self.controller_name() == other.controller_name()
                && self.view_name() == other.view_name())
    }
}

impl Eq for ActionResult {}

impl Hash for ActionResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.route_url().hash(state);
    }
}

impl fmt::Debug for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionResult")
            .field("route_url", &self.route_url())
            .field("action_type", &self.action_type())
            .field("state", &self.state())
            .field("view", &self.address())
            .finish_non_exhaustive()
    }
}
