//! Resolver interface for absolute-URL and named-route generation.

use crate::error::ResolveError;
use crate::value::{QueryInput, QueryValue};

/// Produces URLs for paths and named routes.
///
/// The resolver is passed to [`Uri::to`](crate::Uri::to) and
/// [`Uri::route`](crate::Uri::route) explicitly; the crate keeps no global
/// resolver. Implementations typically wrap an application's router.
pub trait UrlResolver: Send + Sync {
    /// Generates a URL for a path.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the path cannot be turned into a URL.
    fn to(&self, path: &str) -> Result<String, ResolveError>;

    /// Generates a URL for a named route.
    ///
    /// With `absolute` the result carries scheme and host; otherwise it is a
    /// relative reference starting at the path.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::RouteNotFound` for unknown names and
    /// `ResolveError::InvalidArgument` for missing or malformed parameters.
    fn route(
        &self,
        name: &str,
        parameters: &RouteParameters,
        absolute: bool,
    ) -> Result<String, ResolveError>;
}

/// Positional and keyed parameters for a named route.
///
/// # Examples
///
/// ```
/// use uri_query::{QueryValue, RouteParameters};
///
/// let params = RouteParameters::new().push(42_u32).with("tab", "settings");
/// assert_eq!(params.positional(), vec![QueryValue::scalar("42")]);
/// assert_eq!(params.get("tab"), Some(QueryValue::scalar("settings")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteParameters {
    positional: Vec<QueryInput>,
    keyed: Vec<(String, QueryInput)>,
}

impl RouteParameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a positional parameter.
    #[must_use]
    pub fn push(mut self, value: impl Into<QueryInput>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Adds a keyed parameter, replacing an earlier one with the same key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryInput>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.keyed.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.keyed.push((key, value)),
        }
        self
    }

    /// Returns the positional parameters with route keys resolved.
    #[must_use]
    pub fn positional(&self) -> Vec<QueryValue> {
        self.positional
            .iter()
            .cloned()
            .map(QueryInput::resolve)
            .collect()
    }

    /// Returns the keyed parameters with route keys resolved, in insertion order.
    #[must_use]
    pub fn keyed(&self) -> Vec<(String, QueryValue)> {
        self.keyed
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().resolve()))
            .collect()
    }

    /// Returns the keyed parameter `key` with route keys resolved.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<QueryValue> {
        self.keyed
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone().resolve())
    }

    /// Returns true if no parameters were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyed.is_empty()
    }
}
