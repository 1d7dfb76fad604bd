//! Constants shared by the query model and the URI value object.

/// Path returned for URIs whose path component is empty.
pub const ROOT_PATH: &str = "/";

/// Maximum number of segments in a tokenized path.
///
/// Bracket groups or dot segments past this depth stay in the last key as
/// literal text, which bounds the nesting of decoded query structures.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Separator between segments of a dot path (`a.b.c`).
pub const DOT_SEPARATOR: char = '.';

/// Opening delimiter of a bracket segment (`a[b]`).
pub const BRACKET_OPEN: char = '[';

/// Closing delimiter of a bracket segment (`a[b]`).
pub const BRACKET_CLOSE: char = ']';

/// Separator between `key=value` pairs in a raw query string.
pub const PAIR_SEPARATOR: char = '&';

/// Separator between a key and its value in a raw query string.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Base URL used to anchor relative references for the underlying parser.
///
/// It never appears in serialized output: relative references are rendered
/// starting at their path.
pub const RELATIVE_BASE: &str = "relative-ref://relative.invalid/";
