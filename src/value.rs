//! Values stored in and written to a decoded query structure.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// Ordered map of query keys to values.
pub type QueryMap = IndexMap<String, QueryValue>;

/// A decoded query value.
///
/// Leaves are always text: numeric and boolean inputs are stored in their
/// textual form. Lists and maps are distinct tags, so `key[]=v` and
/// `key[0]=v` decode to different shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum QueryValue {
    /// Leaf value
    Scalar(String),
    /// Ordered list, written as repeated `key[]=value` pairs
    List(Vec<QueryValue>),
    /// Ordered map, written as `key[sub]=value` pairs
    Map(QueryMap),
}

impl QueryValue {
    /// Creates a scalar value.
    #[must_use]
    pub fn scalar(s: impl Into<String>) -> Self {
        Self::Scalar(s.into())
    }

    /// Creates a list of scalars.
    #[must_use]
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Creates a map from key/value pairs, keeping their order.
    #[must_use]
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the text of a scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements of a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[QueryValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries of a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&QueryMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns true for an empty scalar, list or map.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Scalar(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<Vec<QueryValue>> for QueryValue {
    fn from(items: Vec<QueryValue>) -> Self {
        Self::List(items)
    }
}

impl From<QueryMap> for QueryValue {
    fn from(map: QueryMap) -> Self {
        Self::Map(map)
    }
}

/// A value that identifies itself by a single scalar key when written into a
/// query string.
///
/// # Examples
///
/// ```
/// use uri_query::{QueryInput, QueryValue, RouteKey};
///
/// struct User {
///     id: u64,
/// }
///
/// impl RouteKey for User {
///     fn route_key(&self) -> String {
///         self.id.to_string()
///     }
/// }
///
/// let input = QueryInput::routable(User { id: 7 });
/// assert_eq!(input.resolve(), QueryValue::scalar("7"));
/// ```
pub trait RouteKey: Send + Sync {
    /// Returns the scalar that stands in for this value.
    fn route_key(&self) -> String;
}

/// A value accepted by query write operations.
///
/// Every input is resolved into a [`QueryValue`] before it is merged;
/// [`QueryInput::Routable`] resolves to the provider's route key.
#[derive(Clone)]
pub enum QueryInput {
    /// Leaf value
    Scalar(String),
    /// Ordered list of inputs
    List(Vec<QueryInput>),
    /// Ordered map of inputs
    Map(Vec<(String, QueryInput)>),
    /// Value substituted by its route key
    Routable(Arc<dyn RouteKey>),
}

impl QueryInput {
    /// Wraps a route-key provider.
    #[must_use]
    pub fn routable(value: impl RouteKey + 'static) -> Self {
        Self::Routable(Arc::new(value))
    }

    /// Creates a list input.
    #[must_use]
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Creates a map input from key/value pairs, keeping their order.
    #[must_use]
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Resolves route keys and produces the stored value.
    #[must_use]
    pub fn resolve(self) -> QueryValue {
        match self {
            Self::Scalar(s) => QueryValue::Scalar(s),
            Self::List(items) => QueryValue::List(items.into_iter().map(Self::resolve).collect()),
            Self::Map(entries) => QueryValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.resolve()))
                    .collect(),
            ),
            Self::Routable(provider) => QueryValue::Scalar(provider.route_key()),
        }
    }
}

impl fmt::Debug for QueryInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => f.debug_tuple("Scalar").field(s).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::Routable(provider) => f
                .debug_tuple("Routable")
                .field(&provider.route_key())
                .finish(),
        }
    }
}

impl From<QueryValue> for QueryInput {
    fn from(value: QueryValue) -> Self {
        match value {
            QueryValue::Scalar(s) => Self::Scalar(s),
            QueryValue::List(items) => Self::List(items.into_iter().map(Self::from).collect()),
            QueryValue::Map(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for QueryInput {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<&String> for QueryInput {
    fn from(s: &String) -> Self {
        Self::Scalar(s.clone())
    }
}

impl From<bool> for QueryInput {
    fn from(b: bool) -> Self {
        Self::Scalar(if b { "1" } else { "0" }.to_string())
    }
}

macro_rules! scalar_input_from_display {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for QueryInput {
                fn from(v: $t) -> Self {
                    Self::Scalar(v.to_string())
                }
            }
        )*
    };
}

scalar_input_from_display!(char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<T: Into<QueryInput>> From<Vec<T>> for QueryInput {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<QueryInput>> From<Option<T>> for QueryInput {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(|| Self::Scalar(String::new()), Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Post(&'static str);

    impl RouteKey for Post {
        fn route_key(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn scalar_inputs_become_text() {
        assert_eq!(QueryInput::from(3_i32).resolve(), QueryValue::scalar("3"));
        assert_eq!(QueryInput::from(true).resolve(), QueryValue::scalar("1"));
        assert_eq!(QueryInput::from(false).resolve(), QueryValue::scalar("0"));
        assert_eq!(QueryInput::from(1.5_f64).resolve(), QueryValue::scalar("1.5"));
    }

    #[test]
    fn routable_resolves_to_route_key() {
        let input = QueryInput::routable(Post("hello-world"));
        assert_eq!(input.resolve(), QueryValue::scalar("hello-world"));
    }

    #[test]
    fn nested_routables_are_resolved() {
        let input = QueryInput::map([
            ("post", QueryInput::routable(Post("a"))),
            ("related", QueryInput::list([QueryInput::routable(Post("b"))])),
        ]);
        assert_eq!(
            input.resolve(),
            QueryValue::map([
                ("post", QueryValue::scalar("a")),
                ("related", QueryValue::list(["b"])),
            ])
        );
    }

    #[test]
    fn value_round_trips_through_input() {
        let value = QueryValue::map([
            ("a", QueryValue::scalar("1")),
            ("b", QueryValue::list(["x", "y"])),
        ]);
        assert_eq!(QueryInput::from(value.clone()).resolve(), value);
    }

    #[test]
    fn none_becomes_empty_scalar() {
        assert_eq!(QueryInput::from(None::<&str>).resolve(), QueryValue::scalar(""));
    }

    #[test]
    fn is_blank() {
        assert!(QueryValue::scalar(" ").is_blank());
        assert!(QueryValue::List(Vec::new()).is_blank());
        assert!(!QueryValue::scalar("0").is_blank());
    }

    #[test]
    fn display_nested() {
        let value = QueryValue::map([("b", QueryValue::list(["x", "y"]))]);
        assert_eq!(value.to_string(), "{b: [x, y]}");
    }
}
