//! Test utilities for router tests
//!
//! Provides a recording presenter, an inline-or-deferred loader that shares
//! the presenter's event log, and controller fixtures.

#![allow(dead_code)]

use mvc_navigator::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Route log output to the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Event log
// ============================================================================

/// Ordered record of presenter and loader calls, e.g. `"instantiate:Home/Index"`.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn record(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    /// Position of the first event equal to `event`.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|e| e == event)
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

// ============================================================================
// RecordingPresenter
// ============================================================================

/// View created by [`RecordingPresenter`].
#[derive(Debug)]
pub struct RecordedView {
    pub address: String,
    pub shown: usize,
    pub model: Option<String>,
    pub refreshes: usize,
}

impl ViewLifecycle for RecordedView {
    fn on_show(&mut self, model: Option<&ViewModel>) {
        self.shown += 1;
        self.model = model.map(|m| m.type_name().to_string());
    }

    fn on_refresh(&mut self) {
        self.refreshes += 1;
    }
}

/// Presenter that logs every instantiate and destroy.
pub struct RecordingPresenter {
    log: EventLog,
    live: AtomicUsize,
}

impl RecordingPresenter {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            live: AtomicUsize::new(0),
        }
    }

    /// Instances created and not yet destroyed.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Presenter for RecordingPresenter {
    fn instantiate(&self, asset: &AssetHandle, parent: Option<&str>) -> ViewInstance {
        self.live.fetch_add(1, Ordering::SeqCst);
        match parent {
            Some(parent) => self
                .log
                .record(format!("instantiate:{}@{}", asset.address(), parent)),
            None => self.log.record(format!("instantiate:{}", asset.address())),
        }
        ViewInstance::new(RecordedView {
            address: asset.address().to_string(),
            shown: 0,
            model: None,
            refreshes: 0,
        })
    }

    fn destroy(&self, instance: ViewInstance) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        let view = instance
            .into_inner::<RecordedView>()
            .expect("instances come from this presenter");
        self.log.record(format!("destroy:{}", view.address));
    }

    fn name(&self) -> &'static str {
        "RecordingPresenter"
    }
}

// ============================================================================
// TestLoader
// ============================================================================

/// Loader over a fixed set of addresses that completes inline or parks
/// completions until the test releases them.
pub struct TestLoader {
    assets: HashSet<String>,
    deferred: bool,
    parked: Mutex<Vec<(String, LoadCallback)>>,
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, String>>,
    log: EventLog,
}

impl TestLoader {
    pub fn inline(log: &EventLog) -> Self {
        Self::new(log, false)
    }

    pub fn deferred(log: &EventLog) -> Self {
        Self::new(log, true)
    }

    fn new(log: &EventLog, deferred: bool) -> Self {
        Self {
            assets: HashSet::new(),
            deferred,
            parked: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            live: Mutex::new(HashMap::new()),
            log: log.clone(),
        }
    }

    pub fn with_assets(mut self, addresses: &[&str]) -> Self {
        self.assets
            .extend(addresses.iter().map(|address| address.to_string()));
        self
    }

    fn finish(&self, address: &str, done: LoadCallback) {
        if !self.assets.contains(address) {
            done(None);
            return;
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.live.lock().unwrap().insert(id, address.to_string());
        done(Some(AssetHandle::new(id, address, address.to_string())));
    }

    /// Number of loads waiting for completion.
    pub fn pending(&self) -> usize {
        self.parked.lock().unwrap().len()
    }

    /// Complete the oldest parked load. Returns its address.
    pub fn complete_next(&self) -> Option<String> {
        let (address, done) = {
            let mut parked = self.parked.lock().unwrap();
            if parked.is_empty() {
                return None;
            }
            parked.remove(0)
        };
        self.finish(&address, done);
        Some(address)
    }

    /// Complete the newest parked load. Returns its address.
    pub fn complete_last(&self) -> Option<String> {
        let (address, done) = self.parked.lock().unwrap().pop()?;
        self.finish(&address, done);
        Some(address)
    }

    /// Complete every parked load, oldest first.
    pub fn complete_all(&self) {
        while self.complete_next().is_some() {}
    }

    /// Handles given out and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

impl AssetLoader for TestLoader {
    fn load(&self, address: &str, done: LoadCallback) {
        self.log.record(format!("load:{}", address));
        if self.deferred {
            self.parked.lock().unwrap().push((address.to_string(), done));
        } else {
            self.finish(address, done);
        }
    }

    fn release(&self, handle: AssetHandle) {
        let address = self
            .live
            .lock()
            .unwrap()
            .remove(&handle.id())
            .expect("handle released exactly once");
        self.log.record(format!("release:{}", address));
    }

    fn name(&self) -> &'static str {
        "TestLoader"
    }
}

// ============================================================================
// Controllers
// ============================================================================

pub const ASSETS: &[&str] = &[
    "Home/Index",
    "Home/Detail",
    "Home/About",
    "Shop/Item",
    "Shop/Cart",
    "Shop/Banner",
];

/// Controller factory calls, per controller name.
#[derive(Clone, Default)]
pub struct Creations(Arc<Mutex<HashMap<&'static str, usize>>>);

impl Creations {
    fn bump(&self, name: &'static str) {
        *self.0.lock().unwrap().entry(name).or_default() += 1;
    }

    pub fn get(&self, name: &str) -> usize {
        self.0.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

pub struct HomeController {
    pub visits: AtomicUsize,
}

pub struct ShopController;

pub fn home_controller(creations: &Creations) -> ControllerBuilder<HomeController> {
    let creations = creations.clone();
    ControllerBuilder::new("Home", move || {
        creations.bump("Home");
        HomeController {
            visits: AtomicUsize::new(0),
        }
    })
    .action("Index", |home, request| {
        home.visits.fetch_add(1, Ordering::SeqCst);
        Some(request.view())
    })
    .action_with_data("Detail", |home, id: u32, request| {
        home.visits.fetch_add(1, Ordering::SeqCst);
        Some(request.view().with_model(id))
    })
    .action("About", |_, request| Some(request.view()))
    .action("Missing", |_, request| Some(request.view_named("NoSuchView")))
    .action("Nothing", |_, _| None)
}

pub fn shop_controller(creations: &Creations) -> ControllerBuilder<ShopController> {
    let creations = creations.clone();
    ControllerBuilder::new("Shop", move || {
        creations.bump("Shop");
        ShopController
    })
    .action_with_data("Item", |_, name: String, request| {
        let quantity = request.args().first_of::<u32>().copied().unwrap_or(1);
        Some(request.view().with_model((name, quantity)))
    })
    .action("Cart", |_, request| Some(request.view()))
    .action("Banner", |_, request| Some(request.view().with_parent("overlay")))
}

/// Everything a router test needs to observe.
pub struct Harness {
    pub router: Router,
    pub loader: Arc<TestLoader>,
    pub presenter: Arc<RecordingPresenter>,
    pub log: EventLog,
    pub creations: Creations,
}

impl Harness {
    pub fn inline() -> Self {
        Self::build(false, RouterConfig::default())
    }

    pub fn deferred() -> Self {
        Self::build(true, RouterConfig::default())
    }

    pub fn build(deferred: bool, config: RouterConfig) -> Self {
        init_logging();
        let log = EventLog::default();
        let creations = Creations::default();
        let loader = if deferred {
            TestLoader::deferred(&log)
        } else {
            TestLoader::inline(&log)
        };
        let loader = Arc::new(loader.with_assets(ASSETS));
        let presenter = Arc::new(RecordingPresenter::new(&log));
        let router = Router::builder(loader.clone(), presenter.clone())
            .config(config)
            .controller(home_controller(&creations))
            .controller(shop_controller(&creations))
            .build();
        Self {
            router,
            loader,
            presenter,
            log,
            creations,
        }
    }

    /// Routes in history, oldest first.
    pub fn routes(&self) -> Vec<String> {
        self.router
            .history()
            .iter()
            .map(|result| result.route_url().to_string())
            .collect()
    }
}
