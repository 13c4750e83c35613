//! Presentation collaborator.
//!
//! A [`Presenter`] turns a loaded asset into something on screen and takes it
//! down again. The router only sees the opaque [`ViewInstance`] it returns;
//! the presenter gets its own concrete type back in
//! [`destroy`](Presenter::destroy) through [`ViewInstance::into_inner`].

use crate::lifecycle::ViewLifecycle;
use crate::loader::AssetHandle;
use std::any::Any;
use std::fmt;

/// Instantiates loaded assets and destroys the resulting views.
pub trait Presenter: Send + Sync + 'static {
    /// Create a displayed instance of `asset`, attached to `parent` when the
    /// action asked for one.
    fn instantiate(&self, asset: &AssetHandle, parent: Option<&str>) -> ViewInstance;

    /// Tear down an instance previously returned by
    /// [`instantiate`](Self::instantiate).
    fn destroy(&self, instance: ViewInstance);

    /// Presenter name for debugging.
    fn name(&self) -> &'static str {
        "Presenter"
    }
}

trait AnyView: ViewLifecycle {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<V: ViewLifecycle> AnyView for V {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// A displayed view, owned by its [`ActionResult`](crate::ActionResult).
pub struct ViewInstance {
    view: Box<dyn AnyView>,
    type_name: &'static str,
}

impl ViewInstance {
    /// Wrap a presenter-specific view.
    pub fn new<V: ViewLifecycle>(view: V) -> Self {
        Self {
            view: Box::new(view),
            type_name: std::any::type_name::<V>(),
        }
    }

    /// Borrow the view as `V`, if that is its type.
    pub fn downcast_ref<V: ViewLifecycle>(&self) -> Option<&V> {
        self.view.as_any().downcast_ref::<V>()
    }

    /// Unwrap the view as `V`, or give the instance back unchanged.
    pub fn into_inner<V: ViewLifecycle>(self) -> Result<V, Self> {
        if self.downcast_ref::<V>().is_none() {
            return Err(self);
        }
        match self.view.into_any().downcast::<V>() {
            Ok(view) => Ok(*view),
            Err(_) => unreachable!("type checked above"),
        }
    }

    pub(crate) fn show(&mut self, model: Option<&crate::params::ViewModel>) {
        self.view.on_show(model);
    }

    pub(crate) fn refresh(&mut self) {
        self.view.on_refresh();
    }
}

impl fmt::Debug for ViewInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewInstance")
            .field("type", &self.type_name)
            .finish()
    }
}
