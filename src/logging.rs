//! Logging abstraction layer.
//!
//! The router never talks to a logging crate directly. Every diagnostic goes
//! through the macros below, which forward to [`log`](https://docs.rs/log) or
//! [`tracing`](https://docs.rs/tracing) depending on the enabled feature.
//! Enable at most one of the two.
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! Levels used by the router:
//!
//! - `trace_log!`: per-guard and per-cache-lookup detail.
//! - `debug_log!`: history commits, controller creation, stale completions.
//! - `info_log!`: navigation start and completion.
//! - `warn_log!`: navigations vetoed by hooks or middleware.
//! - `error_log!`: asset loads that produced nothing.
//!
//! ```ignore
//! use mvc_navigator::{debug_log, error_log, info_log};
//!
//! info_log!("Navigating to '{}'", route);
//! debug_log!("History cursor moved to {}", index);
//! error_log!("Asset '{}' not found", address);
//! ```

/// Emit a **trace**-level log message through the active backend.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
    };
}

/// Emit a **debug**-level log message through the active backend.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    };
}

/// Emit an **info**-level log message through the active backend.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
    };
}

/// Emit a **warn**-level log message through the active backend.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
    };
}

/// Emit an **error**-level log message through the active backend.
///
/// Used when a navigation attempt fails in a way the caller only learns
/// about through the result (for example a missing asset).
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);
        #[cfg(feature = "log")]
        ::log::error!($($arg)*);
    };
}
