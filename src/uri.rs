//! Immutable URI value object.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use url::{Position, Url};

use crate::constants::{RELATIVE_BASE, ROOT_PATH};
use crate::error::{UriError, UriErrorKind};
use crate::html::Htmlable;
use crate::query::{PushMode, QueryView};
use crate::resolver::{RouteParameters, UrlResolver};
use crate::value::QueryInput;

/// An immutable URI with structured query manipulation.
///
/// Absolute URIs and relative references (`/path?query#fragment`) are both
/// accepted. Every `with_*` method returns a new value; the original is
/// never changed.
///
/// # Examples
///
/// ```
/// use uri_query::{QueryInput, Uri};
///
/// let uri = Uri::parse("https://example.com/search?q=rust&filter[lang]=en").unwrap();
/// assert_eq!(uri.host(), Some("example.com"));
/// assert_eq!(uri.query().string("filter.lang"), Some("en"));
///
/// let next = uri
///     .with_query([("filter.year", "2024")], true)
///     .push_onto_query("tag", "async")
///     .without_query(["q"]);
/// assert_eq!(
///     next.to_string(),
///     "https://example.com/search?filter[lang]=en&filter[year]=2024&tag[]=async"
/// );
/// assert_eq!(uri.query().value(), "q=rust&filter[lang]=en");
///
/// let relative = Uri::parse("/users?page=2").unwrap();
/// assert_eq!(relative.scheme(), None);
/// assert_eq!(relative.with_query([("page", "3")], true).to_string(), "/users?page=3");
/// ```
#[derive(Debug, Clone)]
pub struct Uri {
    url: Url,
    /// Relative references are anchored on a placeholder base and render from the path
    relative: bool,
}

impl Uri {
    /// Parses a URI or relative reference.
    ///
    /// Relative references are resolved against the root, so a path-relative
    /// reference reads as absolute-path (`page?x=1` becomes `/page?x=1`) and
    /// dot segments are removed (`a/../b` becomes `/b`).
    ///
    /// # Errors
    ///
    /// Returns `UriError` if:
    /// - The text violates the URI grammar
    /// - The text is a network-path reference (`//host/...`) without a scheme
    pub fn parse(input: &str) -> Result<Self, UriError> {
        match Url::parse(input) {
            Ok(url) => Ok(Self {
                url,
                relative: false,
            }),
            Err(url::ParseError::RelativeUrlWithoutBase) => Self::parse_relative(input),
            Err(e) => Err(UriError::new(input, UriErrorKind::Parse(e))),
        }
    }

    /// Creates a URI for `path` using the resolver.
    ///
    /// # Errors
    ///
    /// Returns `UriError` with the resolver's error unchanged, or if the
    /// resolved text does not parse.
    pub fn to<R>(resolver: &R, path: &str) -> Result<Self, UriError>
    where
        R: UrlResolver + ?Sized,
    {
        tracing::debug!(path, "resolving URL for path");
        let resolved = resolver
            .to(path)
            .map_err(|e| UriError::new(path, UriErrorKind::Resolve(e)))?;
        Self::parse(&resolved)
    }

    /// Creates a URI for the named route using the resolver.
    ///
    /// # Errors
    ///
    /// Returns `UriError` with the resolver's error (unknown route, invalid
    /// parameters) unchanged, or if the resolved text does not parse.
    pub fn route<R>(
        resolver: &R,
        name: &str,
        parameters: &RouteParameters,
        absolute: bool,
    ) -> Result<Self, UriError>
    where
        R: UrlResolver + ?Sized,
    {
        tracing::debug!(name, absolute, "resolving URL for route");
        let resolved = resolver
            .route(name, parameters, absolute)
            .map_err(|e| UriError::new(name, UriErrorKind::Resolve(e)))?;
        Self::parse(&resolved)
    }

    /// Returns the scheme, if this is not a relative reference.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        (!self.relative).then(|| self.url.scheme())
    }

    /// Returns the user name, or `user:password` when `with_password` is set
    /// and a password exists.
    #[must_use]
    pub fn user(&self, with_password: bool) -> Option<String> {
        if self.relative || (self.url.username().is_empty() && self.url.password().is_none()) {
            return None;
        }
        let user = self.url.username();
        match self.url.password() {
            Some(password) if with_password => Some(format!("{user}:{password}")),
            _ => Some(user.to_string()),
        }
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        if self.relative {
            return None;
        }
        self.url.password()
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        if self.relative {
            return None;
        }
        self.url.host_str().filter(|h| !h.is_empty())
    }

    /// Returns the port. Default ports of known schemes read as `None`.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        if self.relative {
            return None;
        }
        self.url.port()
    }

    /// Returns the path; an empty path reads as `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        match self.url.path() {
            "" => ROOT_PATH,
            path => path,
        }
    }

    /// Returns a decoded view of the query string.
    #[must_use]
    pub fn query(&self) -> QueryView<'_> {
        QueryView::new(self.url.query().unwrap_or_default())
    }

    /// Returns the fragment.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment()
    }

    /// Returns true for relative references.
    #[must_use]
    pub const fn is_relative(&self) -> bool {
        self.relative
    }

    /// Returns the underlying parsed URL.
    ///
    /// For relative references this is anchored on a placeholder base.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.url
    }

    /// Returns the serialized URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        if self.relative {
            &self.url[Position::BeforePath..]
        } else {
            self.url.as_str()
        }
    }

    /// Returns a new URI with the given scheme.
    ///
    /// # Errors
    ///
    /// Returns `UriError` if this is a relative reference or the scheme is
    /// invalid or cannot replace the current one (e.g. special to non-special).
    pub fn with_scheme(&self, scheme: &str) -> Result<Self, UriError> {
        let mut url = self.absolute_url(scheme, "scheme")?;
        url.set_scheme(scheme)
            .map_err(|()| UriError::new(scheme, UriErrorKind::InvalidScheme))?;
        Ok(self.rebuilt(url))
    }

    /// Returns a new URI with the given user and password.
    ///
    /// An empty user without password removes the user info.
    ///
    /// # Errors
    ///
    /// Returns `UriError` if this is a relative reference or the URI cannot
    /// carry credentials (no host, or `file:`).
    pub fn with_user(&self, user: &str, password: Option<&str>) -> Result<Self, UriError> {
        let mut url = self.absolute_url(user, "user")?;
        url.set_username(user)
            .and_then(|()| url.set_password(password))
            .map_err(|()| UriError::new(user, UriErrorKind::InvalidUserInfo))?;
        Ok(self.rebuilt(url))
    }

    /// Returns a new URI with the given host.
    ///
    /// # Errors
    ///
    /// Returns `UriError` if this is a relative reference, the host is
    /// invalid, or the URI cannot carry a host.
    pub fn with_host(&self, host: &str) -> Result<Self, UriError> {
        let mut url = self.absolute_url(host, "host")?;
        url.set_host(Some(host))
            .map_err(|e| UriError::new(host, UriErrorKind::InvalidHost(Some(e))))?;
        Ok(self.rebuilt(url))
    }

    /// Returns a new URI with the given port, or without one for `None`.
    ///
    /// # Errors
    ///
    /// Returns `UriError` if this is a relative reference or the URI cannot
    /// carry a port (no host, or `file:`).
    pub fn with_port(&self, port: Option<u16>) -> Result<Self, UriError> {
        let input = port.map(|p| p.to_string()).unwrap_or_default();
        let mut url = self.absolute_url(&input, "port")?;
        url.set_port(port)
            .map_err(|()| UriError::new(input, UriErrorKind::InvalidPort))?;
        Ok(self.rebuilt(url))
    }

    /// Returns a new URI with the given path, forcing a leading `/`.
    #[must_use]
    pub fn with_path(&self, path: &str) -> Self {
        let mut url = self.url.clone();
        if path.starts_with('/') {
            url.set_path(path);
        } else {
            url.set_path(&format!("/{path}"));
        }
        self.rebuilt(url)
    }

    /// Returns a new URI with `updates` applied to the query.
    ///
    /// With `merge` the updates are deep-merged into the current query;
    /// otherwise they replace it.
    #[must_use]
    pub fn with_query<I, K, V>(&self, updates: I, merge: bool) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryInput>,
    {
        let raw = self.query().merge(updates, merge);
        self.with_raw_query(&raw)
    }

    /// Returns a new URI with only the missing keys of `updates` merged in.
    #[must_use]
    pub fn with_query_if_missing<I, K, V>(&self, updates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryInput>,
    {
        let raw = self.query().merge_if_missing(updates);
        self.with_raw_query(&raw)
    }

    /// Returns a new URI with `value` pushed onto the query list at `key`,
    /// dropping repeated values.
    #[must_use]
    pub fn push_onto_query(&self, key: &str, value: impl Into<QueryInput>) -> Self {
        self.push_onto_query_with(key, value, PushMode::Unique)
    }

    /// Returns a new URI with `value` pushed onto the query list at `key`.
    #[must_use]
    pub fn push_onto_query_with(
        &self,
        key: &str,
        value: impl Into<QueryInput>,
        mode: PushMode,
    ) -> Self {
        let raw = self.query().push_onto_list(key, value, mode);
        self.with_raw_query(&raw)
    }

    /// Returns a new URI without the given query keys.
    #[must_use]
    pub fn without_query<I, S>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw = self.query().without(keys);
        self.with_raw_query(&raw)
    }

    /// Returns a new URI whose query is built from `updates` alone.
    #[must_use]
    pub fn replace_query<I, K, V>(&self, updates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryInput>,
    {
        let raw = self.query().replace(updates);
        self.with_raw_query(&raw)
    }

    /// Returns a new URI with the raw query string as given.
    ///
    /// An empty string removes the query.
    #[must_use]
    pub fn with_raw_query(&self, raw: &str) -> Self {
        let mut url = self.url.clone();
        url.set_query((!raw.is_empty()).then_some(raw));
        self.rebuilt(url)
    }

    /// Returns a new URI with the given fragment; an empty one removes it.
    #[must_use]
    pub fn with_fragment(&self, fragment: &str) -> Self {
        let mut url = self.url.clone();
        url.set_fragment((!fragment.is_empty()).then_some(fragment));
        self.rebuilt(url)
    }

    /// Returns a new URI without a fragment.
    #[must_use]
    pub fn without_fragment(&self) -> Self {
        self.with_fragment("")
    }

    fn parse_relative(input: &str) -> Result<Self, UriError> {
        if input.starts_with("//") {
            return Err(UriError::new(input, UriErrorKind::NetworkPathReference));
        }
        let url = Url::parse(RELATIVE_BASE)
            .and_then(|base| base.join(input))
            .map_err(|e| UriError::new(input, UriErrorKind::Parse(e)))?;
        Ok(Self {
            url,
            relative: true,
        })
    }

    fn absolute_url(&self, input: &str, component: &'static str) -> Result<Url, UriError> {
        if self.relative {
            return Err(UriError::new(
                input,
                UriErrorKind::RelativeReference { component },
            ));
        }
        Ok(self.url.clone())
    }

    fn rebuilt(&self, url: Url) -> Self {
        Self {
            url,
            relative: self.relative,
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Htmlable for Uri {
    fn to_html(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = UriError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Url> for Uri {
    fn from(url: Url) -> Self {
        Self {
            url,
            relative: false,
        }
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.relative == other.relative && self.as_str() == other.as_str()
    }
}

impl Eq for Uri {}

impl Hash for Uri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.relative.hash(state);
        self.as_str().hash(state);
    }
}

impl PartialOrd for Uri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Uri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Uri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
