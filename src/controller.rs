//! Controllers, actions and the controller registry.
//!
//! Controllers are registered explicitly: a name, a factory, and a table of
//! named actions. The registry creates each controller lazily on first
//! dispatch and keeps that single instance for the rest of the router's life.
//!
//! Actions come in two shapes:
//!
//! | Registration | Handler signature | Route |
//! |---|---|---|
//! | [`action`](ControllerBuilder::action) | `Fn(&C, ActionRequest) -> Option<ViewResult>` | `Controller/Action` |
//! | [`action_with_data`](ControllerBuilder::action_with_data) | `Fn(&C, T, ActionRequest) -> Option<ViewResult>` | `Controller/Action/Data` |
//!
//! For data actions the route's data segment is parsed into `T` with
//! [`FromStr`] before the handler runs.
//!
//! # Example
//!
//! ```
//! use mvc_navigator::{ControllerBuilder, ControllerRegistry};
//!
//! #[derive(Default)]
//! struct HomeController;
//!
//! let mut registry = ControllerRegistry::new();
//! registry.register(
//!     ControllerBuilder::new("Home", HomeController::default)
//!         .action("Index", |_home, request| Some(request.view()))
//!         .action_with_data("Detail", |_home, id: u32, request| {
//!             Some(request.view().with_model(id))
//!         }),
//! );
//!
//! let first = registry.get_or_create("Home").unwrap();
//! let second = registry.get_or_create("Home").unwrap();
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! ```

use crate::error::NavigationError;
use crate::params::NavigationArgs;
use crate::result::{ActionType, ViewResult};
use crate::route::RouteData;
use crate::{debug_log, info_log};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Shared handle to a live controller instance.
pub type ControllerHandle = Arc<dyn Any + Send + Sync>;

type ControllerFactory = Arc<dyn Fn() -> ControllerHandle + Send + Sync>;

type ActionOutcome = Result<Option<ViewResult>, NavigationError>;

type ActionFn = dyn Fn(&ControllerHandle, ActionRequest) -> ActionOutcome + Send + Sync;

// ============================================================================
// ActionRequest
// ============================================================================

/// Everything an action handler gets besides its controller and data.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    route: RouteData,
    args: NavigationArgs,
    action_type: ActionType,
}

impl ActionRequest {
    /// Create a request for `route`.
    pub fn new(route: RouteData, args: NavigationArgs, action_type: ActionType) -> Self {
        Self {
            route,
            args,
            action_type,
        }
    }

    /// The parsed route being dispatched.
    pub fn route(&self) -> &RouteData {
        &self.route
    }

    /// Controller segment of the route.
    pub fn controller(&self) -> &str {
        self.route.controller()
    }

    /// Action segment of the route.
    pub fn action(&self) -> &str {
        self.route.action()
    }

    /// Arguments passed along with the navigation.
    pub fn args(&self) -> &NavigationArgs {
        &self.args
    }

    /// Full or partial view.
    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    /// The view named after this action, on this controller.
    pub fn view(&self) -> ViewResult {
        ViewResult::new(self.route.controller(), self.route.action())
    }

    /// A different view of this controller.
    pub fn view_named(&self, view: impl Into<String>) -> ViewResult {
        ViewResult::new(self.route.controller(), view)
    }
}

// ============================================================================
// Action handlers
// ============================================================================

/// A registered action, type-erased over its controller.
#[derive(Clone)]
pub(crate) struct ActionHandler {
    data_type: Option<&'static str>,
    invoke: Arc<ActionFn>,
}

impl ActionHandler {
    pub(crate) fn invoke(
        &self,
        controller: &ControllerHandle,
        request: ActionRequest,
    ) -> ActionOutcome {
        (self.invoke)(controller, request)
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandler")
            .field("data_type", &self.data_type)
            .finish_non_exhaustive()
    }
}

fn downcast<'a, C: Any>(
    controller: &'a ControllerHandle,
    request: &ActionRequest,
) -> Result<&'a C, NavigationError> {
    let any: &(dyn Any + Send + Sync) = &**controller;
    any.downcast_ref::<C>()
        .ok_or_else(|| NavigationError::UnknownController {
            controller: request.controller().to_string(),
        })
}

// ============================================================================
// ControllerBuilder
// ============================================================================

/// Typed builder for a controller and its actions.
#[must_use]
pub struct ControllerBuilder<C> {
    name: String,
    factory: Arc<dyn Fn() -> C + Send + Sync>,
    actions: HashMap<String, ActionHandler>,
}

impl<C: Send + Sync + 'static> ControllerBuilder<C> {
    /// Start describing controller `name`, created on demand by `factory`.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
            actions: HashMap::new(),
        }
    }

    /// Register an action that takes no data segment.
    ///
    /// Dispatching it with a data segment fails with
    /// [`NavigationError::DataConversion`].
    pub fn action<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&C, ActionRequest) -> Option<ViewResult> + Send + Sync + 'static,
    {
        let invoke = move |controller: &ControllerHandle, request: ActionRequest| -> ActionOutcome {
            if let Some(data) = request.route().data() {
                return Err(NavigationError::DataConversion {
                    route: request.route().url().to_string(),
                    data: Some(data.to_string()),
                    expected: "an action without data",
                });
            }
            let controller = downcast::<C>(controller, &request)?;
            Ok(handler(controller, request))
        };
        self.actions.insert(
            name.into(),
            ActionHandler {
                data_type: None,
                invoke: Arc::new(invoke),
            },
        );
        self
    }

    /// Register an action whose first parameter is the route's data segment,
    /// parsed as `T`.
    ///
    /// A missing or unparsable data segment fails with
    /// [`NavigationError::DataConversion`].
    pub fn action_with_data<T, F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        T: FromStr + 'static,
        F: Fn(&C, T, ActionRequest) -> Option<ViewResult> + Send + Sync + 'static,
    {
        let expected = std::any::type_name::<T>();
        let invoke = move |controller: &ControllerHandle, request: ActionRequest| -> ActionOutcome {
            let conversion_error = |data: Option<&str>| NavigationError::DataConversion {
                route: request.route().url().to_string(),
                data: data.map(str::to_string),
                expected,
            };
            let raw = request.route().data();
            let data = match raw {
                Some(raw) => raw.parse::<T>().map_err(|_| conversion_error(Some(raw)))?,
                None => return Err(conversion_error(None)),
            };
            let controller = downcast::<C>(controller, &request)?;
            Ok(handler(controller, data, request))
        };
        self.actions.insert(
            name.into(),
            ActionHandler {
                data_type: Some(expected),
                invoke: Arc::new(invoke),
            },
        );
        self
    }

    /// Finish the description.
    pub fn build(self) -> ControllerDescriptor {
        let factory = self.factory;
        ControllerDescriptor {
            name: self.name,
            factory: Arc::new(move || Arc::new(factory()) as ControllerHandle),
            actions: self.actions,
        }
    }
}

// ============================================================================
// ControllerDescriptor
// ============================================================================

/// A controller's factory and action table, ready for the registry.
#[derive(Clone)]
pub struct ControllerDescriptor {
    name: String,
    factory: ControllerFactory,
    actions: HashMap<String, ActionHandler>,
}

impl ControllerDescriptor {
    /// Controller name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if an action with this name is registered.
    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    /// Names of the registered actions, sorted.
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<C: Send + Sync + 'static> From<ControllerBuilder<C>> for ControllerDescriptor {
    fn from(builder: ControllerBuilder<C>) -> Self {
        builder.build()
    }
}

impl fmt::Debug for ControllerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerDescriptor")
            .field("name", &self.name)
            .field("actions", &self.action_names())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ControllerRegistry
// ============================================================================

/// A controller that is either live or still has to be created.
pub(crate) enum Instance {
    Live(ControllerHandle),
    Missing(ControllerFactory),
}

/// Controller name → descriptor, plus the lazily created singleton instances.
#[derive(Default)]
pub struct ControllerRegistry {
    descriptors: HashMap<String, ControllerDescriptor>,
    instances: HashMap<String, ControllerHandle>,
}

impl ControllerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller, replacing any previous one with the same name.
    ///
    /// A replaced controller's live instance is dropped; the next dispatch
    /// creates one from the new factory.
    pub fn register(&mut self, descriptor: impl Into<ControllerDescriptor>) {
        let descriptor = descriptor.into();
        let name = descriptor.name.clone();
        if self.instances.remove(&name).is_some() {
            debug_log!("Dropped live instance of re-registered controller '{}'", name);
        }
        info_log!(
            "Registered controller '{}' ({} actions)",
            name,
            descriptor.actions.len()
        );
        self.descriptors.insert(name, descriptor);
    }

    /// Check if a controller with this name is registered.
    pub fn contains(&self, controller: &str) -> bool {
        self.descriptors.contains_key(controller)
    }

    /// Return the live instance of `controller`, creating it on first use.
    pub fn get_or_create(&mut self, controller: &str) -> Result<ControllerHandle, NavigationError> {
        match self.lookup_instance(controller)? {
            Instance::Live(instance) => Ok(instance),
            Instance::Missing(factory) => Ok(self.adopt(controller, factory())),
        }
    }

    /// The live instance of `controller`, without creating one.
    pub fn instance(&self, controller: &str) -> Option<ControllerHandle> {
        self.instances.get(controller).cloned()
    }

    /// Number of controllers created so far.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Drop every live instance. Descriptors stay registered.
    pub fn clear_instances(&mut self) {
        self.instances.clear();
    }

    /// The live instance of `controller`, or the factory that creates it.
    ///
    /// Callers holding the registry behind a lock run the factory after
    /// releasing it, then hand the new instance to [`adopt`](Self::adopt).
    pub(crate) fn lookup_instance(&self, controller: &str) -> Result<Instance, NavigationError> {
        if let Some(instance) = self.instances.get(controller) {
            return Ok(Instance::Live(instance.clone()));
        }
        self.descriptors
            .get(controller)
            .map(|descriptor| Instance::Missing(descriptor.factory.clone()))
            .ok_or_else(|| NavigationError::UnknownController {
                controller: controller.to_string(),
            })
    }

    /// Cache a freshly created instance of `controller`.
    ///
    /// If another caller got there first, its instance wins and `created`
    /// is dropped, so every caller sees the same controller.
    pub(crate) fn adopt(&mut self, controller: &str, created: ControllerHandle) -> ControllerHandle {
        self.instances
            .entry(controller.to_string())
            .or_insert_with(|| {
                debug_log!("Created controller '{}'", controller);
                created
            })
            .clone()
    }

    /// Action handler for `route`, plus its controller or the factory for it.
    ///
    /// The action is looked up before anything else, so an unknown action
    /// never instantiates a controller.
    pub(crate) fn lookup(&self, route: &RouteData) -> Result<(Instance, ActionHandler), NavigationError> {
        let descriptor = self.descriptors.get(route.controller()).ok_or_else(|| {
            NavigationError::UnknownController {
                controller: route.controller().to_string(),
            }
        })?;
        let handler = descriptor
            .actions
            .get(route.action())
            .cloned()
            .ok_or_else(|| NavigationError::UnknownAction {
                controller: route.controller().to_string(),
                action: route.action().to_string(),
            })?;
        Ok((self.lookup_instance(route.controller())?, handler))
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.descriptors.len())
            .field("instances", &self.instances.len())
            .finish()
    }
}
