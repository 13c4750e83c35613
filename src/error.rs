//! Error handling for the router.
//!
//! Navigation failures fall into two groups:
//!
//! - **Structural errors**: a malformed route string, an unknown controller
//!   or action, a data segment that does not convert to the handler's
//!   parameter type. These are returned as `Err` from
//!   [`Router::navigate`](crate::Router::navigate) and leave the router
//!   untouched.
//! - **Policy failures**: a veto from a hook or guard, a handler that produced
//!   no view, an asset that could not be found. These are *not* raised; the
//!   navigation yields a [`Failed`](crate::ResultState::Failed) result that
//!   carries the error as its [`failure`](crate::ActionResult::failure)
//!   reason, so UI code can render a "navigation blocked" state without
//!   error plumbing.
//!
//! # Examples
//!
//! ```
//! use mvc_navigator::NavigationError;
//!
//! let error = NavigationError::InvalidRoute {
//!     route: "Home".into(),
//!     reason: "expected Controller/Action[/Data]".into(),
//! };
//! assert!(error.is_structural());
//! assert_eq!(
//!     error.to_string(),
//!     "Invalid route 'Home': expected Controller/Action[/Data]"
//! );
//! ```

use std::fmt;

/// Detailed error variants that can occur during navigation.
///
/// Implements [`std::error::Error`] and [`Display`](std::fmt::Display).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Route string is empty or does not have the `Controller/Action[/Data]` shape.
    InvalidRoute { route: String, reason: String },

    /// No controller registered under this name.
    UnknownController { controller: String },

    /// The controller exists but has no action with this name.
    UnknownAction { controller: String, action: String },

    /// The route's data segment could not be converted for the action.
    DataConversion {
        route: String,
        data: Option<String>,
        expected: &'static str,
    },

    /// A pre-navigate hook or middleware guard vetoed the navigation.
    GuardRejected { route: String },

    /// The action handler returned no view.
    HandlerProducedNoResult { route: String },

    /// The asset loader completed without a payload.
    AssetNotFound { route: String, address: String },
}

impl NavigationError {
    /// `true` for errors that are returned to the caller of `navigate`
    /// instead of being folded into a failed result.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidRoute { .. }
                | Self::UnknownController { .. }
                | Self::UnknownAction { .. }
                | Self::DataConversion { .. }
        )
    }

    /// Route the failing navigation targeted, when the error knows it.
    pub fn route(&self) -> Option<&str> {
        match self {
            Self::InvalidRoute { route, .. }
            | Self::DataConversion { route, .. }
            | Self::GuardRejected { route }
            | Self::HandlerProducedNoResult { route }
            | Self::AssetNotFound { route, .. } => Some(route),
            Self::UnknownController { .. } | Self::UnknownAction { .. } => None,
        }
    }
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::InvalidRoute { route, reason } => {
                write!(f, "Invalid route '{}': {}", route, reason)
            }
            NavigationError::UnknownController { controller } => {
                write!(f, "Unknown controller: {}", controller)
            }
            NavigationError::UnknownAction { controller, action } => {
                write!(f, "Unknown action: {}/{}", controller, action)
            }
            NavigationError::DataConversion {
                route,
                data: Some(data),
                expected,
            } => write!(
                f,
                "Cannot convert data '{}' of route '{}' to {}",
                data, route, expected
            ),
            NavigationError::DataConversion {
                route,
                data: None,
                expected,
            } => write!(f, "Route '{}' is missing a data segment ({})", route, expected),
            NavigationError::GuardRejected { route } => {
                write!(f, "Navigation blocked: {}", route)
            }
            NavigationError::HandlerProducedNoResult { route } => {
                write!(f, "Action produced no result: {}", route)
            }
            NavigationError::AssetNotFound { route, address } => {
                write!(f, "Couldn't find view at address '{}' for route '{}'", address, route)
            }
        }
    }
}

impl std::error::Error for NavigationError {}
