//! Nested query structure decoded from a flat list of `key=value` pairs.

use std::fmt;

use url::form_urlencoded;

use crate::constants::{KEY_VALUE_SEPARATOR, PAIR_SEPARATOR};
use crate::path::{Path, Segment};
use crate::value::{QueryMap, QueryValue};

/// How a value lands on the terminal segment of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// Replace the whole subtree
    Replace,
    /// Recursively union maps; anything else replaces
    Merge,
}

/// Ordered nested map of query keys.
///
/// Keys keep first-insertion order; writing an existing key updates it in
/// place. All path-taking methods accept dot or bracket notation, and a
/// top-level key equal to the whole path text is preferred over tokenizing it.
///
/// # Examples
///
/// ```
/// use uri_query::{PathMap, QueryValue};
///
/// let map = PathMap::decode("a=1&b[x]=2&tags[]=p&tags[]=q");
/// assert_eq!(map.get("b.x"), Some(&QueryValue::scalar("2")));
/// assert_eq!(map.get("tags"), Some(&QueryValue::list(["p", "q"])));
///
/// let map = map.set("b.y", QueryValue::scalar("3")).delete("a");
/// assert_eq!(map.encode(), "b[x]=2&b[y]=3&tags[]=p&tags[]=q");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMap {
    entries: QueryMap,
}

impl PathMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a raw query string (without leading `?`).
    ///
    /// Keys and values are percent-decoded (`+` is a space) before the key is
    /// tokenized. Pairs with an empty key are skipped and a bare `key` holds an
    /// empty scalar. Malformed bracket keys are kept as literal keys.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        let mut map = Self::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            let path = Path::from_query_key(&key);
            map.write(&path, QueryValue::Scalar(value.into_owned()), WriteMode::Replace);
        }
        tracing::trace!(raw_len = raw.len(), keys = map.len(), "decoded query");
        map
    }

    /// Returns the top-level entries.
    #[must_use]
    pub fn as_map(&self) -> &QueryMap {
        &self.entries
    }

    /// Consumes the map and returns the top-level entries.
    #[must_use]
    pub fn into_map(self) -> QueryMap {
        self.entries
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the value at `path`, if every segment exists.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&QueryValue> {
        self.get_path(&self.address(path))
    }

    /// Returns the value at an already tokenized path.
    ///
    /// Numeric key segments index into lists; `[]` never resolves.
    #[must_use]
    pub fn get_path(&self, path: &Path) -> Option<&QueryValue> {
        let (first, rest) = path.segments().split_first()?;
        let root = self.entries.get(first.as_key()?)?;
        lookup(root, rest)
    }

    /// Returns true if `path` resolves to a value.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Writes `value` at `path`, replacing whatever subtree was there.
    ///
    /// Missing intermediate segments become maps; a trailing `[]` appends.
    /// A numeric segment inside an existing list writes that element; one past
    /// the end, or a named key, turns the list into a map. An empty path is
    /// ignored.
    #[must_use]
    pub fn set(mut self, path: &str, value: QueryValue) -> Self {
        let path = self.address(path);
        self.write(&path, value, WriteMode::Replace);
        self
    }

    /// Writes `value` at `path`, merging it into an existing map.
    ///
    /// When both the existing and the incoming value are maps their keys are
    /// unioned recursively, so siblings of the written keys survive.
    #[must_use]
    pub fn merge(mut self, path: &str, value: QueryValue) -> Self {
        let path = self.address(path);
        self.write(&path, value, WriteMode::Merge);
        self
    }

    /// Removes the entry at `path`. Absent paths are ignored.
    #[must_use]
    pub fn delete(mut self, path: &str) -> Self {
        let path = self.address(path);
        if let Some((first, rest)) = path.segments().split_first() {
            if let Some(key) = first.as_key() {
                if rest.is_empty() {
                    self.entries.shift_remove(key);
                } else if let Some(child) = self.entries.get_mut(key) {
                    remove(child, rest);
                }
            }
        }
        self
    }

    /// Encodes the map back into a raw query string.
    ///
    /// Entries are emitted depth-first in insertion order. Map children are
    /// written as `parent[key]`, list elements as `parent[]`. Keys and values
    /// are form-urlencoded; the brackets themselves stay literal. Empty lists
    /// and maps produce no pairs.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            flatten(&encode_component(key), value, &mut out);
        }
        tracing::trace!(keys = self.len(), encoded_len = out.len(), "encoded query");
        out
    }

    fn address(&self, path: &str) -> Path {
        if self.entries.contains_key(path) {
            Path::literal(path)
        } else {
            Path::parse(path)
        }
    }

    fn write(&mut self, path: &Path, value: QueryValue, mode: WriteMode) {
        match path.segments().split_first() {
            None => {}
            Some((Segment::Key(key), _)) if key.is_empty() => {}
            Some((Segment::Key(key), rest)) => write_entry(&mut self.entries, key, rest, value, mode),
            Some((Segment::Append, rest)) => {
                let key = next_index(&self.entries);
                write_entry(&mut self.entries, &key, rest, value, mode);
            }
        }
    }
}

impl From<QueryMap> for PathMap {
    fn from(entries: QueryMap) -> Self {
        Self { entries }
    }
}

impl fmt::Display for PathMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// Next free integer key of a map used as a list (`max + 1`, or `0`).
///
/// When `max` is `u64::MAX` the lowest unused index is taken instead.
pub(crate) fn next_index(map: &QueryMap) -> String {
    let max = map
        .keys()
        .filter_map(|k| k.parse::<u64>().ok().filter(|n| n.to_string() == *k))
        .max();
    match max {
        None => "0".to_string(),
        Some(n) => n
            .checked_add(1)
            .map_or_else(|| lowest_free_index(map), |next| next.to_string()),
    }
}

fn lowest_free_index(map: &QueryMap) -> String {
    // len + 1 candidates always include a free one
    (0..=map.len())
        .map(|n| n.to_string())
        .find(|k| !map.contains_key(k))
        .unwrap_or_default()
}

/// Position named by a canonical decimal key (`"1"`, not `"01"` or `"+1"`).
fn list_index(key: &str) -> Option<usize> {
    key.parse::<usize>().ok().filter(|n| n.to_string() == key)
}

fn lookup<'a>(mut current: &'a QueryValue, segments: &[Segment]) -> Option<&'a QueryValue> {
    for segment in segments {
        current = match (current, segment) {
            (QueryValue::Map(map), Segment::Key(key)) => map.get(key)?,
            (QueryValue::List(items), Segment::Key(key)) => items.get(list_index(key)?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn write_entry(map: &mut QueryMap, key: &str, rest: &[Segment], value: QueryValue, mode: WriteMode) {
    let child = map
        .entry(key.to_string())
        .or_insert_with(|| QueryValue::Scalar(String::new()));
    write(child, rest, value, mode);
}

fn write(slot: &mut QueryValue, segments: &[Segment], value: QueryValue, mode: WriteMode) {
    match segments.split_first() {
        None => match mode {
            WriteMode::Replace => *slot = value,
            WriteMode::Merge => merge_into(slot, value),
        },
        Some((Segment::Key(key), rest)) => {
            if let QueryValue::List(items) = slot {
                if let Some(item) = list_index(key).and_then(|i| items.get_mut(i)) {
                    write(item, rest, value, mode);
                    return;
                }
            }
            coerce_to_map(slot);
            if let QueryValue::Map(map) = slot {
                write_entry(map, key, rest, value, mode);
            }
        }
        Some((Segment::Append, rest)) => append(slot, rest, value, mode),
    }
}

fn append(slot: &mut QueryValue, rest: &[Segment], value: QueryValue, mode: WriteMode) {
    match slot {
        QueryValue::Map(map) => {
            let key = next_index(map);
            write_entry(map, &key, rest, value, mode);
        }
        QueryValue::List(items) => {
            if items.last().is_some_and(|last| continues_into(last, rest)) {
                if let Some(last) = items.last_mut() {
                    write(last, rest, value, mode);
                }
            } else {
                items.push(fresh(rest, value, mode));
            }
        }
        QueryValue::Scalar(_) => *slot = QueryValue::List(vec![fresh(rest, value, mode)]),
    }
}

fn fresh(rest: &[Segment], value: QueryValue, mode: WriteMode) -> QueryValue {
    let mut child = QueryValue::Scalar(String::new());
    write(&mut child, rest, value, mode);
    child
}

/// Whether a `[]` followed by `rest` keeps filling the last list element
/// instead of starting a new one: the element must be a container of the
/// shape `rest` addresses and must not already hold that exact path.
fn continues_into(last: &QueryValue, rest: &[Segment]) -> bool {
    let shape_matches = matches!(
        (last, rest.first()),
        (QueryValue::Map(_), Some(Segment::Key(_))) | (QueryValue::List(_), Some(Segment::Append))
    );
    shape_matches && lookup(last, rest).is_none()
}

fn coerce_to_map(slot: &mut QueryValue) {
    match slot {
        QueryValue::Map(_) => {}
        QueryValue::List(items) => {
            let map = std::mem::take(items)
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect();
            *slot = QueryValue::Map(map);
        }
        QueryValue::Scalar(_) => *slot = QueryValue::Map(QueryMap::new()),
    }
}

fn merge_into(slot: &mut QueryValue, value: QueryValue) {
    match (slot, value) {
        (QueryValue::Map(existing), QueryValue::Map(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(child) => merge_into(child, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn remove(current: &mut QueryValue, segments: &[Segment]) {
    let Some((Segment::Key(key), rest)) = segments.split_first() else {
        return;
    };
    match current {
        QueryValue::Map(map) if rest.is_empty() => {
            map.shift_remove(key);
        }
        QueryValue::Map(map) => {
            if let Some(child) = map.get_mut(key) {
                remove(child, rest);
            }
        }
        QueryValue::List(items) => {
            let Some(index) = list_index(key).filter(|&i| i < items.len()) else {
                return;
            };
            if rest.is_empty() {
                items.remove(index);
            } else {
                remove(&mut items[index], rest);
            }
        }
        QueryValue::Scalar(_) => {}
    }
}

fn flatten(prefix: &str, value: &QueryValue, out: &mut String) {
    match value {
        QueryValue::Scalar(s) => {
            if !out.is_empty() {
                out.push(PAIR_SEPARATOR);
            }
            out.push_str(prefix);
            out.push(KEY_VALUE_SEPARATOR);
            out.push_str(&encode_component(s));
        }
        QueryValue::List(items) => {
            let child = format!("{prefix}[]");
            for item in items {
                flatten(&child, item, out);
            }
        }
        QueryValue::Map(map) => {
            for (key, item) in map {
                flatten(&format!("{prefix}[{}]", encode_component(key)), item, out);
            }
        }
    }
}

fn encode_component(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> QueryValue {
        QueryValue::scalar(s)
    }

    #[test]
    fn decode_empty() {
        assert!(PathMap::decode("").is_empty());
    }

    #[test]
    fn decode_flat_pairs_in_order() {
        let map = PathMap::decode("z=1&a=2");
        let keys: Vec<_> = map.as_map().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn decode_bare_key_is_empty_scalar() {
        let map = PathMap::decode("flag&x=");
        assert_eq!(map.get("flag"), Some(&scalar("")));
        assert_eq!(map.get("x"), Some(&scalar("")));
    }

    #[test]
    fn decode_skips_empty_keys() {
        let map = PathMap::decode("=v&&a=1");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn decode_percent_and_plus() {
        let map = PathMap::decode("name=John+Doe&q=%41%26B&k%5Bx%5D=1");
        assert_eq!(map.get("name"), Some(&scalar("John Doe")));
        assert_eq!(map.get("q"), Some(&scalar("A&B")));
        assert_eq!(map.get("k.x"), Some(&scalar("1")));
    }

    #[test]
    fn decode_duplicate_keys_last_wins() {
        let map = PathMap::decode("a=1&b=2&a=3");
        assert_eq!(map.get("a"), Some(&scalar("3")));
        let keys: Vec<_> = map.as_map().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn decode_empty_brackets_accumulate() {
        let map = PathMap::decode("tag[]=x&tag[]=y");
        assert_eq!(map.get("tag"), Some(&QueryValue::list(["x", "y"])));
    }

    #[test]
    fn decode_nested_maps() {
        let map = PathMap::decode("a[b][c]=1&a[b][d]=2&a[e]=3");
        assert_eq!(
            map.get("a"),
            Some(&QueryValue::map([
                ("b", QueryValue::map([("c", "1"), ("d", "2")])),
                ("e", scalar("3")),
            ]))
        );
    }

    #[test]
    fn decode_numeric_brackets_are_map_keys() {
        let list = PathMap::decode("k[]=v");
        let map = PathMap::decode("k[0]=v");
        assert_eq!(list.get("k"), Some(&QueryValue::list(["v"])));
        assert_eq!(map.get("k"), Some(&QueryValue::map([("0", "v")])));
    }

    #[test]
    fn decode_list_of_maps() {
        let map = PathMap::decode("u[][n]=a&u[][r]=x&u[][n]=b");
        assert_eq!(
            map.get("u"),
            Some(&QueryValue::List(vec![
                QueryValue::map([("n", "a"), ("r", "x")]),
                QueryValue::map([("n", "b")]),
            ]))
        );
    }

    #[test]
    fn decode_container_replaces_scalar() {
        let map = PathMap::decode("a=1&a[b]=2");
        assert_eq!(map.get("a"), Some(&QueryValue::map([("b", "2")])));
    }

    #[test]
    fn decode_named_key_turns_list_into_map() {
        let map = PathMap::decode("a[]=x&a[k]=y");
        assert_eq!(map.get("a"), Some(&QueryValue::map([("0", "x"), ("k", "y")])));
    }

    #[test]
    fn decode_append_onto_map_uses_next_index() {
        let map = PathMap::decode("a[3]=x&a[k]=y&a[]=z");
        assert_eq!(map.get("a.4"), Some(&scalar("z")));
    }

    #[test]
    fn decode_malformed_key_is_literal() {
        let map = PathMap::decode("a[b=1&c]d=2&ok[x]=3");
        assert_eq!(map.as_map().get("a[b"), Some(&scalar("1")));
        assert_eq!(map.as_map().get("c]d"), Some(&scalar("2")));
        assert_eq!(map.get("ok.x"), Some(&scalar("3")));
    }

    #[test]
    fn decode_dotted_raw_key_is_literal() {
        let map = PathMap::decode("a.b=1");
        assert_eq!(map.as_map().get("a.b"), Some(&scalar("1")));
        assert_eq!(map.get("a.b"), Some(&scalar("1")));
    }

    #[test]
    fn get_missing_segments() {
        let map = PathMap::decode("a[b]=1&s=x");
        assert_eq!(map.get("a.c"), None);
        assert_eq!(map.get("s.t"), None);
        assert_eq!(map.get("nope"), None);
        assert_eq!(map.get("a[]"), None);
    }

    #[test]
    fn get_indexes_lists() {
        let map = PathMap::decode("tag[]=x&tag[]=y");
        assert_eq!(map.get("tag.1"), Some(&scalar("y")));
        assert_eq!(map.get("tag[0]"), Some(&scalar("x")));
        assert_eq!(map.get("tag.2"), None);
    }

    #[test]
    fn set_creates_intermediate_maps() {
        let map = PathMap::new().set("a.b.c", scalar("1"));
        assert_eq!(map.encode(), "a[b][c]=1");
    }

    #[test]
    fn set_replaces_subtree() {
        let map = PathMap::decode("a[x]=1&a[y]=2").set("a", QueryValue::map([("z", "3")]));
        assert_eq!(map.encode(), "a[z]=3");
    }

    #[test]
    fn set_keeps_position_of_existing_key() {
        let map = PathMap::decode("a=1&b=2&c=3").set("b", scalar("9"));
        assert_eq!(map.encode(), "a=1&b=9&c=3");
    }

    #[test]
    fn set_trailing_append() {
        let map = PathMap::decode("tag[]=x").set("tag[]", scalar("y"));
        assert_eq!(map.get("tag"), Some(&QueryValue::list(["x", "y"])));
    }

    #[test]
    fn merge_preserves_siblings() {
        let map = PathMap::decode("a=1&b[x]=2").merge("b", QueryValue::map([("y", "3")]));
        assert_eq!(map.encode(), "a=1&b[x]=2&b[y]=3");
    }

    #[test]
    fn merge_replaces_non_maps() {
        let map = PathMap::decode("b[x]=2").merge("b", scalar("flat"));
        assert_eq!(map.encode(), "b=flat");
    }

    #[test]
    fn delete_top_level_keeps_order() {
        let map = PathMap::decode("a=1&b=2&c=3").delete("b");
        assert_eq!(map.encode(), "a=1&c=3");
    }

    #[test]
    fn delete_nested_and_absent() {
        let map = PathMap::decode("a[x]=1&a[y]=2")
            .delete("a.x")
            .delete("a.nope")
            .delete("zzz")
            .delete("a.y.deeper");
        assert_eq!(map.encode(), "a[y]=2");
    }

    #[test]
    fn delete_list_element() {
        let map = PathMap::decode("t[]=a&t[]=b&t[]=c").delete("t.1");
        assert_eq!(map.get("t"), Some(&QueryValue::list(["a", "c"])));
    }

    #[test]
    fn delete_literal_dotted_key() {
        let map = PathMap::decode("a.b=1&c=2").delete("a.b");
        assert_eq!(map.encode(), "c=2");
    }

    #[test]
    fn encode_percent_encodes_components() {
        let map = PathMap::new()
            .set("q", scalar("a b&c=d"))
            .set("weird key", scalar("é"));
        assert_eq!(map.encode(), "q=a+b%26c%3Dd&weird+key=%C3%A9");
    }

    #[test]
    fn encode_skips_empty_containers() {
        let map = PathMap::new()
            .set("a", QueryValue::List(Vec::new()))
            .set("b", scalar("1"));
        assert_eq!(map.encode(), "b=1");
    }

    #[test]
    fn round_trip_nested() {
        let raw = "a=1&b[x]=2&b[y][]=3&b[y][]=4&u[][n]=a&u[][n]=b&e=";
        let map = PathMap::decode(raw);
        assert_eq!(map.encode(), raw);
        assert_eq!(PathMap::decode(&map.encode()), map);
    }

    #[test]
    fn set_through_list_index_keeps_list() {
        let map = PathMap::decode("tag[]=x&tag[]=y").set("tag.0", scalar("z"));
        assert_eq!(map.get("tag"), Some(&QueryValue::list(["z", "y"])));
        assert_eq!(map.encode(), "tag[]=z&tag[]=y");

        let map = PathMap::decode("a[]=x&a[0]=y");
        assert_eq!(map.get("a"), Some(&QueryValue::list(["y"])));
    }

    #[test]
    fn merge_through_list_index_keeps_list() {
        let map = PathMap::decode("u[][n]=a&u[][n]=b").merge("u.1", QueryValue::map([("r", "x")]));
        assert_eq!(map.encode(), "u[][n]=a&u[][n]=b&u[][r]=x");
        assert_eq!(map.get("u.1.r"), Some(&scalar("x")));
        assert!(map.get("u").and_then(QueryValue::as_list).is_some());
    }

    #[test]
    fn set_past_list_end_turns_list_into_map() {
        let map = PathMap::decode("tag[]=x").set("tag.5", scalar("z"));
        assert_eq!(map.get("tag"), Some(&QueryValue::map([("0", "x"), ("5", "z")])));

        let map = PathMap::decode("tag[]=x").set("tag.01", scalar("z"));
        assert_eq!(map.get("tag"), Some(&QueryValue::map([("0", "x"), ("01", "z")])));
    }

    #[test]
    fn non_canonical_index_does_not_read_list() {
        let map = PathMap::decode("tag[]=x&tag[]=y");
        assert_eq!(map.get("tag.01"), None);
        assert_eq!(map.clone().delete("tag.+1"), map);
    }

    #[test]
    fn empty_path_writes_nothing() {
        let map = PathMap::decode("a=1")
            .set("", scalar("v"))
            .merge("", QueryValue::map([("k", "v")]));
        assert_eq!(map.encode(), "a=1");
        assert_eq!(PathMap::decode(&map.encode()), map);
        assert_eq!(map.get(""), None);
    }

    #[test]
    fn append_after_max_index_takes_lowest_free_key() {
        let map = PathMap::decode("a[18446744073709551615]=x&a[]=y");
        assert_eq!(
            map.get("a"),
            Some(&QueryValue::map([("18446744073709551615", "x"), ("0", "y")]))
        );

        let map = PathMap::decode("a[0]=z&a[18446744073709551615]=x&a[]=y");
        assert_eq!(map.get("a.0"), Some(&scalar("z")));
        assert_eq!(map.get("a.1"), Some(&scalar("y")));
    }

    #[test]
    fn decode_deep_key_is_bounded() {
        let key = format!("a{}", "[b]".repeat(10_000));
        let map = PathMap::decode(&format!("{key}=x"));
        let path = Path::from_query_key(&key);
        assert_eq!(path.len(), crate::MAX_NESTING_DEPTH);
        assert_eq!(map.get_path(&path), Some(&scalar("x")));
        assert!(map.encode().ends_with("=x"));
    }

    #[test]
    fn next_index_ignores_non_canonical_keys() {
        let map = PathMap::decode("a[007]=x&a[2]=y").into_map();
        let QueryValue::Map(inner) = &map["a"] else {
            panic!("expected a map");
        };
        assert_eq!(next_index(inner), "3");
    }
}
