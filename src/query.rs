//! Query view over a URI's raw query string.

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::path_map::{PathMap, next_index};
use crate::value::{QueryInput, QueryMap, QueryValue};

/// How [`QueryView::push_onto_list`] treats values already in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushMode {
    /// Drop repeated values after appending, keeping first occurrences
    #[default]
    Unique,
    /// Keep every pushed value
    AllowDuplicates,
}

/// Decoded, read-only view of a raw query string.
///
/// Every write operation returns a new raw query string and leaves the view
/// untouched; the [`Uri`](crate::Uri) wraps the result in a new value.
///
/// # Examples
///
/// ```
/// use uri_query::{QueryInput, QueryView};
///
/// let query = QueryView::new("a=1&b[x]=2");
/// assert_eq!(query.string("b.x"), Some("2"));
/// assert!(query.missing("c"));
///
/// let merged = query.merge([("b", QueryInput::map([("y", "3")]))], true);
/// assert_eq!(merged, "a=1&b[x]=2&b[y]=3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryView<'a> {
    raw: &'a str,
    decoded: PathMap,
}

impl<'a> QueryView<'a> {
    /// Decodes `raw` (without leading `?`).
    #[must_use]
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            decoded: PathMap::decode(raw),
        }
    }

    /// Returns the raw query string.
    #[must_use]
    pub fn value(&self) -> &'a str {
        self.raw
    }

    /// Returns the raw query string with percent-escapes decoded.
    #[must_use]
    pub fn decode(&self) -> String {
        percent_decode_str(self.raw).decode_utf8_lossy().into_owned()
    }

    /// Returns the fully decoded top-level structure.
    #[must_use]
    pub fn all(&self) -> &QueryMap {
        self.decoded.as_map()
    }

    /// Returns the decoded structure as a [`PathMap`].
    #[must_use]
    pub fn as_path_map(&self) -> &PathMap {
        &self.decoded
    }

    /// Returns only the named paths, rebuilt as nested structure.
    ///
    /// Paths that do not resolve are left out.
    #[must_use]
    pub fn only<I, S>(&self, paths: I) -> QueryMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .fold(PathMap::new(), |acc, path| {
                let path = path.as_ref();
                match self.decoded.get(path) {
                    Some(value) => acc.set(path, value.clone()),
                    None => acc,
                }
            })
            .into_map()
    }

    /// Returns everything except the named paths.
    #[must_use]
    pub fn except<I, S>(&self, paths: I) -> QueryMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.without_paths(paths).into_map()
    }

    /// Returns the value at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&QueryValue> {
        self.decoded.get(path)
    }

    /// Returns the scalar at `path`.
    #[must_use]
    pub fn string(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(QueryValue::as_str)
    }

    /// Returns the scalar at `path` parsed as an integer.
    #[must_use]
    pub fn integer(&self, path: &str) -> Option<i64> {
        self.string(path).and_then(|s| s.trim().parse().ok())
    }

    /// Returns the scalar at `path` read as a boolean flag.
    ///
    /// `1`, `true`, `on` and `yes` are true; `0`, `false`, `off`, `no` and the
    /// empty string are false (case-insensitive). Anything else is `None`.
    #[must_use]
    pub fn boolean(&self, path: &str) -> Option<bool> {
        let s = self.string(path)?.trim().to_ascii_lowercase();
        match s.as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" | "" => Some(false),
            _ => None,
        }
    }

    /// Returns true if `path` resolves to a value.
    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        self.decoded.contains(path)
    }

    /// Returns true if any of the paths resolves to a value.
    #[must_use]
    pub fn has_any<I, S>(&self, paths: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths.into_iter().any(|p| self.has(p.as_ref()))
    }

    /// Returns true if `path` does not resolve to a value.
    #[must_use]
    pub fn missing(&self, path: &str) -> bool {
        !self.has(path)
    }

    /// Returns true if `path` holds a non-blank value.
    #[must_use]
    pub fn filled(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| !v.is_blank())
    }

    /// Returns true if the query has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }

    /// Applies `updates` and returns the new raw query string.
    ///
    /// Route keys are substituted first. With `deep` each key is written as a
    /// path into the current structure and maps are merged recursively, so
    /// sibling keys survive. Without `deep` the current query is discarded and
    /// the result is built from `updates` alone.
    #[must_use]
    pub fn merge<I, K, V>(&self, updates: I, deep: bool) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryInput>,
    {
        let base = if deep {
            self.decoded.clone()
        } else {
            PathMap::new()
        };
        resolve_updates(updates)
            .fold(base, |map, (key, value)| {
                if deep {
                    map.merge(&key, value)
                } else {
                    map.set(&key, value)
                }
            })
            .encode()
    }

    /// Merges only the keys of `updates` that are currently missing.
    ///
    /// A key whose top-level entry already holds any value is dropped whole,
    /// including any nested keys it carries.
    #[must_use]
    pub fn merge_if_missing<I, K, V>(&self, updates: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryInput>,
    {
        let missing: Vec<(String, QueryInput)> = updates
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| self.missing(k))
            .collect();
        self.merge(missing, true)
    }

    /// Pushes `value` onto the list at `path`.
    ///
    /// - absent: the path becomes a list of the pushed values
    /// - list: values are appended; with [`PushMode::Unique`] repeated values
    ///   are then dropped, keeping first occurrences
    /// - map: values are added under the next free integer keys
    /// - scalar: the path becomes `[old, values...]`
    ///
    /// A list input pushes each of its elements.
    #[must_use]
    pub fn push_onto_list(&self, path: &str, value: impl Into<QueryInput>, mode: PushMode) -> String {
        let incoming = match value.into().resolve() {
            QueryValue::List(items) => items,
            other => vec![other],
        };

        let next = match self.decoded.get(path).cloned() {
            Some(QueryValue::List(mut items)) => {
                items.extend(incoming);
                if mode == PushMode::Unique {
                    dedup_keep_first(&mut items);
                }
                QueryValue::List(items)
            }
            Some(QueryValue::Map(mut map)) => {
                for item in incoming {
                    let key = next_index(&map);
                    map.insert(key, item);
                }
                QueryValue::Map(map)
            }
            Some(scalar @ QueryValue::Scalar(_)) => {
                QueryValue::List(std::iter::once(scalar).chain(incoming).collect())
            }
            None => QueryValue::List(incoming),
        };

        self.decoded.clone().set(path, next).encode()
    }

    /// Removes each of `paths` and returns the new raw query string.
    #[must_use]
    pub fn without<I, S>(&self, paths: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.without_paths(paths).encode()
    }

    /// Builds a raw query string from `updates` alone.
    #[must_use]
    pub fn replace<I, K, V>(&self, updates: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryInput>,
    {
        self.merge(updates, false)
    }

    fn without_paths<I, S>(&self, paths: I) -> PathMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .fold(self.decoded.clone(), |map, path| map.delete(path.as_ref()))
    }
}

impl fmt::Display for QueryView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl AsRef<str> for QueryView<'_> {
    fn as_ref(&self) -> &str {
        self.raw
    }
}

fn resolve_updates<I, K, V>(updates: I) -> impl Iterator<Item = (String, QueryValue)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<QueryInput>,
{
    updates
        .into_iter()
        .map(|(k, v)| (k.into(), v.into().resolve()))
}

fn dedup_keep_first(items: &mut Vec<QueryValue>) {
    let mut seen: Vec<QueryValue> = Vec::with_capacity(items.len());
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(item.clone());
            true
        }
    });
}
