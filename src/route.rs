//! Route string parsing.
//!
//! A route has the shape `Controller/Action[/Data]`. Controller and action
//! names are case-sensitive identifiers; the optional data segment is a single
//! positional token handed to the action after conversion to the type it
//! declares.
//!
//! ```
//! use mvc_navigator::RouteData;
//!
//! let route = RouteData::parse("Home/Detail/42").unwrap();
//! assert_eq!(route.controller(), "Home");
//! assert_eq!(route.action(), "Detail");
//! assert_eq!(route.data_as::<u32>(), Some(42));
//!
//! assert!(RouteData::parse("Home").is_err());
//! ```

use crate::error::NavigationError;
use std::fmt;

const SEPARATOR: char = '/';

/// A parsed `Controller/Action[/Data]` route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteData {
    url: String,
    controller: String,
    action: String,
    data: Option<String>,
}

impl RouteData {
    /// Parse a route string.
    ///
    /// Fails with [`NavigationError::InvalidRoute`] when the string is empty,
    /// has fewer than two segments, has an empty controller or action, or has
    /// more than one data segment. A trailing empty data segment
    /// (`"Home/Index/"`) means "no data".
    pub fn parse(route: &str) -> Result<Self, NavigationError> {
        let invalid = |reason: &str| NavigationError::InvalidRoute {
            route: route.to_string(),
            reason: reason.to_string(),
        };

        if route.is_empty() {
            return Err(invalid("route is empty"));
        }

        let segments: Vec<&str> = route.split(SEPARATOR).collect();
        if segments.len() < 2 {
            return Err(invalid("expected Controller/Action[/Data]"));
        }
        if segments.len() > 3 {
            return Err(invalid("only one data segment is allowed"));
        }

        let controller = segments[0];
        let action = segments[1];
        if controller.is_empty() {
            return Err(invalid("controller segment is empty"));
        }
        if action.is_empty() {
            return Err(invalid("action segment is empty"));
        }

        let data = segments
            .get(2)
            .filter(|data| !data.is_empty())
            .map(|data| (*data).to_string());

        Ok(Self {
            url: route.to_string(),
            controller: controller.to_string(),
            action: action.to_string(),
            data,
        })
    }

    /// The route string exactly as it was navigated to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Controller segment.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Action segment.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Raw data segment, if the route has one.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Parse the data segment as `T`.
    ///
    /// Returns `None` if there is no data segment or it does not parse.
    pub fn data_as<T>(&self) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.data.as_deref()?.parse().ok()
    }
}

impl fmt::Display for RouteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Controller name of a route string without full validation.
///
/// Used by the middleware pipeline to look up `Controller/*` guards.
pub(crate) fn controller_segment(route: &str) -> &str {
    route.split(SEPARATOR).next().unwrap_or(route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_segments() {
        let route = RouteData::parse("Home/Index").unwrap();
        assert_eq!(route.controller(), "Home");
        assert_eq!(route.action(), "Index");
        assert_eq!(route.data(), None);
        assert_eq!(route.url(), "Home/Index");
    }

    #[test]
    fn test_parse_with_data() {
        let route = RouteData::parse("Shop/Item/sword").unwrap();
        assert_eq!(route.data(), Some("sword"));
        assert_eq!(route.data_as::<u32>(), None);
    }

    #[test]
    fn test_trailing_separator_means_no_data() {
        let route = RouteData::parse("Home/Index/").unwrap();
        assert_eq!(route.data(), None);
        assert_eq!(route.url(), "Home/Index/");
    }

    #[test]
    fn test_rejects_malformed_routes() {
        for bad in ["", "Home", "/Index", "Home/", "/", "a/b/c/d"] {
            let err = RouteData::parse(bad).unwrap_err();
            assert!(
                matches!(err, NavigationError::InvalidRoute { .. }),
                "'{}' should be invalid",
                bad
            );
        }
    }

    #[test]
    fn test_case_sensitive_segments() {
        let route = RouteData::parse("home/index").unwrap();
        assert_eq!(route.controller(), "home");
        assert_ne!(route, RouteData::parse("Home/Index").unwrap());
    }

    #[test]
    fn test_controller_segment() {
        assert_eq!(controller_segment("Home/Detail/1"), "Home");
        assert_eq!(controller_segment("*"), "*");
    }
}
