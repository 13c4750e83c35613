//! Navigation pipeline tests: parsing, dispatch, failures and teardown.

mod common;

use common::*;
use mvc_navigator::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn shown_count(result: &ActionResult) -> Option<usize> {
    result
        .with_instance(|instance| instance.downcast_ref::<RecordedView>().map(|v| v.shown))
        .flatten()
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_dispatch_by_segments() {
    let h = Harness::inline();
    let result = h.router.navigate("Home/Detail/42").unwrap();

    assert!(result.is_resolved());
    assert_eq!(result.controller_name(), Some("Home"));
    assert_eq!(result.view_name(), Some("Detail"));
    assert_eq!(result.address().as_deref(), Some("Home/Detail"));
    assert_eq!(result.model().and_then(|m| m.downcast_ref::<u32>()), Some(&42));
    assert_eq!(shown_count(&result), Some(1));
}

#[test]
fn test_home_index_then_detail() {
    let h = Harness::inline();
    let index = h.router.navigate("Home/Index").unwrap();
    let detail = h.router.navigate("Home/Detail/42").unwrap();

    assert_eq!(h.routes(), vec!["Home/Index", "Home/Detail/42"]);
    assert_eq!(h.router.history_index(), Some(1));
    assert!(index.is_destroyed());
    assert!(!detail.is_destroyed());
    assert!(h
        .router
        .active_view()
        .is_some_and(|active| active.same_instance(&detail)));

    assert_eq!(
        h.log.events(),
        vec![
            "load:Home/Index",
            "instantiate:Home/Index",
            "load:Home/Detail",
            "instantiate:Home/Detail",
            "destroy:Home/Index",
            "release:Home/Index",
        ]
    );
    assert_eq!(h.presenter.live(), 1);
    assert_eq!(h.loader.live_handles(), 1);
}

#[test]
fn test_args_follow_data_segment() {
    let h = Harness::inline();
    let result = h
        .router
        .navigate_with_args("Shop/Item/sword", NavigationArgs::new().with(3_u32))
        .unwrap();

    let model = result
        .model()
        .and_then(|m| m.downcast_ref::<(String, u32)>())
        .cloned();
    assert_eq!(model, Some(("sword".to_string(), 3)));
    assert_eq!(
        h.router
            .history_args("Shop/Item/sword")
            .and_then(|args| args.get_as::<u32>(0).copied()),
        Some(3)
    );
}

#[test]
fn test_controller_is_singleton() {
    let h = Harness::inline();
    h.router.navigate("Home/Index").unwrap();
    h.router.navigate("Home/Detail/1").unwrap();
    h.router.navigate("Home/Index").unwrap();
    h.router.navigate("Shop/Cart").unwrap();

    assert_eq!(h.creations.get("Home"), 1);
    assert_eq!(h.creations.get("Shop"), 1);

    let home = h.router.controller::<HomeController>("Home").unwrap();
    assert_eq!(home.visits.load(Ordering::SeqCst), 3);
    let handle = h.router.controller_instance("Home").unwrap();
    assert!(Arc::ptr_eq(
        &(home as Arc<dyn std::any::Any + Send + Sync>),
        &handle
    ));
}

// ============================================================================
// Structural errors
// ============================================================================

#[test]
fn test_invalid_route_leaves_state() {
    let h = Harness::inline();
    h.router.navigate("Home/Index").unwrap();
    let events = h.log.events();

    for bad in ["", "Home", "/Index", "Home/", "Home/Detail/1/2"] {
        let err = h.router.navigate(bad).unwrap_err();
        assert!(
            matches!(err, NavigationError::InvalidRoute { .. }),
            "'{}' should be rejected",
            bad
        );
    }

    assert_eq!(h.routes(), vec!["Home/Index"]);
    assert_eq!(h.router.history_index(), Some(0));
    assert_eq!(h.log.events(), events);
}

#[test]
fn test_unknown_controller_and_action() {
    let h = Harness::inline();

    assert_eq!(
        h.router.navigate("Bank/Index").unwrap_err(),
        NavigationError::UnknownController {
            controller: "Bank".into()
        }
    );
    assert_eq!(
        h.router.navigate("Home/Vault").unwrap_err(),
        NavigationError::UnknownAction {
            controller: "Home".into(),
            action: "Vault".into()
        }
    );
    assert!(h.log.events().is_empty());
    assert_eq!(h.router.history_len(), 0);
}

#[test]
fn test_data_conversion_errors() {
    let h = Harness::inline();

    let err = h.router.navigate("Home/Detail/abc").unwrap_err();
    assert!(matches!(
        err,
        NavigationError::DataConversion { data: Some(ref data), .. } if data == "abc"
    ));
    assert!(err.is_structural());

    let err = h.router.navigate("Home/Detail").unwrap_err();
    assert!(matches!(err, NavigationError::DataConversion { data: None, .. }));

    let err = h.router.navigate("Home/Index/7").unwrap_err();
    assert!(matches!(err, NavigationError::DataConversion { .. }));

    assert_eq!(h.router.history_len(), 0);
    assert!(h.log.events().is_empty());
}

// ============================================================================
// Failed results
// ============================================================================

#[test]
fn test_handler_without_view() {
    let h = Harness::inline();
    let result = h.router.navigate("Home/Nothing").unwrap();

    assert_eq!(result.state(), ResultState::Failed);
    assert_eq!(result.route_url(), "Home/Nothing");
    assert!(matches!(
        result.failure(),
        Some(NavigationError::HandlerProducedNoResult { .. })
    ));
    assert!(h.log.events().is_empty());
}

#[test]
fn test_missing_asset_fails_and_router_continues() {
    let h = Harness::inline();
    let index = h.router.navigate("Home/Index").unwrap();
    let missing = h.router.navigate("Home/Missing").unwrap();

    assert!(missing.is_failed());
    assert!(matches!(
        missing.failure(),
        Some(NavigationError::AssetNotFound { ref address, .. }) if address == "Home/NoSuchView"
    ));
    assert_eq!(h.routes(), vec!["Home/Index"]);
    assert!(!index.is_destroyed());

    assert!(h.router.navigate("Home/About").unwrap().is_resolved());
    assert_eq!(h.routes(), vec!["Home/Index", "Home/About"]);
}

// ============================================================================
// Partial views
// ============================================================================

#[test]
fn test_partial_bypasses_history_and_teardown() {
    let h = Harness::inline();
    let index = h.router.navigate("Home/Index").unwrap();
    let banner = h
        .router
        .navigate_partial("Shop/Banner", NavigationArgs::new())
        .unwrap();

    assert!(banner.is_resolved());
    assert_eq!(banner.action_type(), ActionType::PartialView);
    assert!(h.log.position("instantiate:Shop/Banner@overlay").is_some());
    assert_eq!(h.routes(), vec!["Home/Index"]);
    assert!(!index.is_destroyed());
    assert!(h
        .router
        .active_view()
        .is_some_and(|active| active.same_instance(&index)));
    assert_eq!(h.presenter.live(), 2);

    assert!(banner.destroy());
    assert_eq!(h.presenter.live(), 1);
    assert_eq!(h.log.count("release:Shop/Banner"), 1);
}

#[test]
fn test_default_parent_applies_to_views_without_one() {
    let h = Harness::build(false, RouterConfig::new().default_parent("layout"));
    h.router.navigate("Home/Index").unwrap();
    h.router
        .navigate_partial("Shop/Banner", NavigationArgs::new())
        .unwrap();

    assert!(h.log.position("instantiate:Home/Index@layout").is_some());
    assert!(h.log.position("instantiate:Shop/Banner@overlay").is_some());
    assert!(h.log.position("instantiate:Home/Index").is_none());
}

#[test]
fn test_navigate_with_partial_option() {
    let h = Harness::inline();
    let result = h
        .router
        .navigate_with(
            "Shop/Cart",
            NavigateOptions::new().partial(true),
            NavigationArgs::new(),
        )
        .unwrap();
    assert!(result.action_type().is_partial());
    assert_eq!(h.router.history_len(), 0);
    assert!(h.router.active_view().is_none());
}

// ============================================================================
// Hooks
// ============================================================================

#[test]
fn test_before_navigate_veto_skips_middleware() {
    let h = Harness::inline();
    let guard_calls = Arc::new(AtomicUsize::new(0));
    let calls = guard_calls.clone();
    h.router
        .on_route(
            "*",
            guard_fn(move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            }),
        )
        .unwrap();
    h.router
        .on_before_navigate(|result, _| result.route_url() != "Home/About");

    let result = h.router.navigate("Home/About").unwrap();
    assert!(result.is_failed());
    assert!(matches!(
        result.failure(),
        Some(NavigationError::GuardRejected { ref route }) if route == "Home/About"
    ));
    assert_eq!(guard_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.creations.get("Home"), 0);

    assert!(h.router.navigate("Home/Index").unwrap().is_resolved());
    assert_eq!(guard_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_navigated_hook_fires_on_dispatch() {
    let h = Harness::inline();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    h.router.on_navigated(move |result, action_type| {
        sink.lock()
            .unwrap()
            .push((result.route_url().to_string(), action_type));
    });
    h.router.on_route("Home/Secret", guard_fn(|_, _| false)).unwrap();

    h.router.navigate("Home/Index").unwrap();
    h.router
        .navigate_partial("Shop/Cart", NavigationArgs::new())
        .unwrap();
    h.router.navigate("Home/Nothing").unwrap();
    h.router.navigate("Home/Secret").unwrap();
    let _ = h.router.navigate("Home");

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("Home/Index".to_string(), ActionType::View),
            ("Shop/Cart".to_string(), ActionType::PartialView),
        ]
    );
}

// ============================================================================
// View lifecycle
// ============================================================================

#[test]
fn test_refresh_reaches_live_view() {
    let h = Harness::inline();
    let result = h.router.navigate("Home/Index").unwrap();

    assert!(result.refresh());
    assert!(result.refresh());
    let refreshes = result
        .with_instance(|i| i.downcast_ref::<RecordedView>().map(|v| v.refreshes))
        .flatten();
    assert_eq!(refreshes, Some(2));

    h.router.navigate("Home/About").unwrap();
    assert!(!result.refresh());
}

#[test]
fn test_model_reaches_on_show() {
    let h = Harness::inline();
    let result = h.router.navigate("Home/Detail/7").unwrap();
    let model = result
        .with_instance(|i| i.downcast_ref::<RecordedView>().and_then(|v| v.model.clone()))
        .flatten();
    assert_eq!(model.as_deref(), Some("u32"));
}

#[test]
fn test_results_compare_by_route_and_view() {
    let h = Harness::inline();
    let first = h.router.navigate("Home/Index").unwrap();
    let second = h.router.navigate("Home/Index").unwrap();
    assert_eq!(first, second);
    assert!(!first.same_instance(&second));
    assert_ne!(first, h.router.navigate("Home/About").unwrap());
}
