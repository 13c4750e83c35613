//! Asset loading collaborator.
//!
//! The router never reads assets itself. Each resolving
//! [`ActionResult`](crate::ActionResult) asks the [`AssetLoader`] for the
//! asset at its view address (`"{controller}/{view}"`) and hands over a
//! one-shot [`LoadCallback`]. The loader calls it exactly once, either inline
//! (platforms without threaded streaming) or later from wherever its I/O
//! completes. The router behaves the same either way.
//!
//! [`MemoryAssetLoader`] is an inline, in-memory implementation.
//!
//! ```
//! use mvc_navigator::{AssetLoader, MemoryAssetLoader};
//! use std::sync::{Arc, Mutex};
//!
//! let loader = MemoryAssetLoader::new().with_asset("Home/Index", "<home/>");
//! let loaded = Arc::new(Mutex::new(None));
//! let slot = loaded.clone();
//! loader.load("Home/Index", Box::new(move |asset| {
//!     *slot.lock().unwrap() = asset;
//! }));
//!
//! let handle = loaded.lock().unwrap().take().unwrap();
//! assert_eq!(handle.payload_as::<&str>(), Some(&"<home/>"));
//! assert_eq!(loader.live_handles(), 1);
//! loader.release(handle);
//! assert_eq!(loader.live_handles(), 0);
//! ```

use crate::{debug_log, trace_log, warn_log};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Continuation handed to [`AssetLoader::load`].
///
/// `Some(handle)` when the asset was found, `None` when the load finished
/// without a payload.
pub type LoadCallback = Box<dyn FnOnce(Option<AssetHandle>) + Send + 'static>;

/// A loaded asset.
///
/// Handles are deliberately not `Clone`: the result that loaded one owns it
/// and gives it back through [`AssetLoader::release`] exactly once.
pub struct AssetHandle {
    id: u64,
    address: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl AssetHandle {
    /// Create a handle. `id` is chosen by the loader and only has to be
    /// unique among its live handles.
    pub fn new<T: Any + Send + Sync>(id: u64, address: impl Into<String>, payload: T) -> Self {
        Self::from_shared(id, address, Arc::new(payload))
    }

    /// Create a handle around an already shared payload.
    pub fn from_shared(
        id: u64,
        address: impl Into<String>,
        payload: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            id,
            address: address.into(),
            payload,
        }
    }

    /// Loader-assigned identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Address the asset was loaded from.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Borrow the payload as `T`, if that is its type.
    pub fn payload_as<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("id", &self.id)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Loads view assets by address.
pub trait AssetLoader: Send + Sync + 'static {
    /// Start loading `address` and call `done` exactly once when finished.
    ///
    /// `done` may run before `load` returns.
    fn load(&self, address: &str, done: LoadCallback);

    /// Give back a handle produced by this loader.
    fn release(&self, handle: AssetHandle);

    /// Loader name for debugging.
    fn name(&self) -> &'static str {
        "AssetLoader"
    }
}

/// In-memory loader that completes every load inline.
///
/// Tracks the handles it has given out so tests and tools can verify that
/// every one was released.
#[derive(Default)]
pub struct MemoryAssetLoader {
    assets: HashMap<String, Arc<dyn Any + Send + Sync>>,
    next_id: AtomicU64,
    live: Mutex<HashSet<u64>>,
}

impl MemoryAssetLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset, builder style.
    pub fn with_asset<T: Any + Send + Sync>(mut self, address: impl Into<String>, payload: T) -> Self {
        self.insert(address, payload);
        self
    }

    /// Register or replace an asset.
    pub fn insert<T: Any + Send + Sync>(&mut self, address: impl Into<String>, payload: T) {
        self.assets.insert(address.into(), Arc::new(payload));
    }

    /// Return `true` if an asset is registered at `address`.
    pub fn contains(&self, address: &str) -> bool {
        self.assets.contains_key(address)
    }

    /// Number of handles given out and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load(&self, address: &str, done: LoadCallback) {
        let Some(payload) = self.assets.get(address) else {
            debug_log!("No asset registered at '{}'", address);
            done(None);
            return;
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        trace_log!("Loaded asset '{}' as handle {}", address, id);
        done(Some(AssetHandle::from_shared(id, address, payload.clone())));
    }

    fn release(&self, handle: AssetHandle) {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.id);
        if removed {
            trace_log!("Released asset handle {} ('{}')", handle.id, handle.address);
        } else {
            warn_log!(
                "Release of unknown asset handle {} ('{}')",
                handle.id,
                handle.address
            );
        }
    }

    fn name(&self) -> &'static str {
        "MemoryAssetLoader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_now(loader: &MemoryAssetLoader, address: &str) -> Option<AssetHandle> {
        let slot = Arc::new(Mutex::new(None));
        let out = slot.clone();
        loader.load(
            address,
            Box::new(move |asset| {
                *out.lock().unwrap() = Some(asset);
            }),
        );
        let loaded = slot.lock().unwrap().take();
        loaded.expect("memory loader completes inline")
    }

    #[test]
    fn test_missing_asset_completes_with_none() {
        let loader = MemoryAssetLoader::new();
        assert!(load_now(&loader, "Home/Index").is_none());
        assert_eq!(loader.live_handles(), 0);
    }

    #[test]
    fn test_handles_are_unique_and_tracked() {
        let loader = MemoryAssetLoader::new().with_asset("Home/Index", 1_u8);
        let a = load_now(&loader, "Home/Index").unwrap();
        let b = load_now(&loader, "Home/Index").unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.address(), "Home/Index");
        assert_eq!(loader.live_handles(), 2);

        loader.release(a);
        loader.release(b);
        assert_eq!(loader.live_handles(), 0);
    }

    #[test]
    fn test_payload_downcast() {
        let loader = MemoryAssetLoader::new().with_asset("Shop/Item", String::from("item"));
        let handle = load_now(&loader, "Shop/Item").unwrap();
        assert_eq!(handle.payload_as::<String>().map(String::as_str), Some("item"));
        assert!(handle.payload_as::<u32>().is_none());
        assert!(loader.contains("Shop/Item"));
        assert_eq!(loader.name(), "MemoryAssetLoader");
    }
}
