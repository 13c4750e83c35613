//! Free-form navigation arguments and view models.
//!
//! - [`NavigationArgs`]: the positional arguments a caller passes along with a
//!   route. They reach the action handler after the route's data segment and
//!   are remembered per route so back/forward replays get the same values.
//! - [`ViewModel`]: a type-erased model a handler attaches to its view. The
//!   presenter and the view's [`on_show`](crate::ViewLifecycle::on_show) hook
//!   read it back with [`downcast_ref`](ViewModel::downcast_ref).
//!
//! # Example
//!
//! ```
//! use mvc_navigator::NavigationArgs;
//!
//! let args = NavigationArgs::new().with(7_u32).with("guest".to_string());
//! assert_eq!(args.len(), 2);
//! assert_eq!(args.get_as::<u32>(0), Some(&7));
//! assert_eq!(args.get_as::<String>(1).map(String::as_str), Some("guest"));
//! assert_eq!(args.get_as::<u32>(1), None);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Value = Arc<dyn Any + Send + Sync>;

/// Ordered, type-erased arguments supplied to a navigation.
///
/// Cloning is cheap; values are shared.
#[derive(Clone, Default)]
pub struct NavigationArgs {
    values: Vec<Value>,
}

impl NavigationArgs {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, builder style.
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Append a value.
    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.push(Arc::new(value));
    }

    /// Get the argument at `index` if it has type `T`.
    pub fn get_as<T: Any>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.downcast_ref::<T>()
    }

    /// Find the first argument of type `T`.
    pub fn first_of<T: Any>(&self) -> Option<&T> {
        self.values.iter().find_map(|value| value.downcast_ref::<T>())
    }

    /// Return `true` if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Debug for NavigationArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationArgs")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Model attached to a view by its action handler.
#[derive(Clone)]
pub struct ViewModel {
    value: Value,
    type_name: &'static str,
}

impl ViewModel {
    /// Wrap a model value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrow the model as `T`, if that is its type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Type name of the wrapped model, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("type", &self.type_name)
            .finish()
    }
}
