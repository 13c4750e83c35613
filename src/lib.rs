//! # mvc-navigator
//!
//! A controller/action view router. Routes are symbolic strings of the form
//! `Controller/Action[/Data]`; navigating to one runs the matching action on a
//! lazily created controller, loads the view asset it names, has a
//! [`Presenter`] instantiate it, records it in a back/forward history and
//! only then tears down the view it replaces.
//!
//! ## Features
//!
//! - Typed action registration through [`ControllerBuilder`], with the
//!   route's data segment parsed into the action's parameter type
//! - Guards keyed by `*`, `Controller/*` or exact route, evaluated in a
//!   fixed order with short-circuit AND ([`MiddlewarePipeline`])
//! - Before-navigate veto hooks and navigated observers
//! - History with cursor, forward-branch invalidation and argument replay
//! - Asynchronous asset loading; inline and deferred loaders behave the same
//! - Stale completions discarded by default ([`StaleCommitPolicy`])
//! - Partial views that bypass history and teardown
//! - Optional LRU route cache (`cache` feature)
//!
//! ## Quick start
//!
//! ```
//! use mvc_navigator::{
//!     AssetHandle, ControllerBuilder, MemoryAssetLoader, Presenter, Router, ViewInstance,
//! };
//! use std::sync::Arc;
//!
//! struct Screens;
//!
//! impl Presenter for Screens {
//!     fn instantiate(&self, _asset: &AssetHandle, _parent: Option<&str>) -> ViewInstance {
//!         ViewInstance::new(())
//!     }
//!
//!     fn destroy(&self, _instance: ViewInstance) {}
//! }
//!
//! struct HomeController;
//!
//! let loader = Arc::new(
//!     MemoryAssetLoader::new()
//!         .with_asset("Home/Index", "index")
//!         .with_asset("Home/Detail", "detail"),
//! );
//! let router = Router::builder(loader, Arc::new(Screens))
//!     .controller(
//!         ControllerBuilder::new("Home", || HomeController)
//!             .action("Index", |_, request| Some(request.view()))
//!             .action_with_data("Detail", |_, id: u32, request| {
//!                 Some(request.view().with_model(id))
//!             }),
//!     )
//!     .build();
//!
//! router.navigate("Home/Index").unwrap();
//! let detail = router.navigate("Home/Detail/42").unwrap();
//! assert_eq!(detail.model().and_then(|m| m.downcast_ref::<u32>()), Some(&42));
//!
//! let back = router.navigate_backward(1).unwrap();
//! assert_eq!(back.route_url(), "Home/Index");
//! assert!(detail.is_destroyed());
//! assert_eq!(router.history_len(), 2);
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through the `log` crate by default, or `tracing` with the
//! `tracing` feature. See [`logging`].

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod logging;

#[cfg(feature = "cache")]
pub mod cache;
mod config;
mod context;
mod controller;
mod error;
mod guards;
mod lifecycle;
mod loader;
mod middleware;
mod params;
mod presenter;
mod result;
mod route;
mod state;

pub use config::{RouterConfig, StaleCommitPolicy};
pub use context::{HistoryEntry, NavigateOptions, Router, RouterBuilder};
pub use controller::{
    ActionRequest, ControllerBuilder, ControllerDescriptor, ControllerHandle, ControllerRegistry,
};
pub use error::NavigationError;
pub use guards::{guard_fn, FnGuard, GuardBuilder, Guards, NotGuard, RouteGuard};
pub use lifecycle::{BeforeNavigateHook, NavigatedHook, ViewLifecycle};
pub use loader::{AssetHandle, AssetLoader, LoadCallback, MemoryAssetLoader};
pub use middleware::{GuardChain, MiddlewarePipeline, RoutePattern};
pub use params::{NavigationArgs, ViewModel};
pub use presenter::{Presenter, ViewInstance};
pub use result::{ActionResult, ActionType, ResultState, ViewResult};
pub use route::RouteData;
pub use state::HistoryStack;

#[cfg(feature = "cache")]
pub use cache::{CacheStats, RouteCache};
