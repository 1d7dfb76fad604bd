//! Addressing paths into a decoded query structure.
//!
//! Two notations are understood:
//!
//! ```text
//! query key : name *( "[" [ segment ] "]" )        a[b][], tags[]
//! path      : query-key *( "." query-key )         a.b[c], filter.tags[]
//! ```
//!
//! Raw query keys only use bracket notation, so a dot inside a raw key is part
//! of the name. Read/write addressing accepts both, which lets `a.b` and
//! `a[b]` name the same location.

use std::fmt;
use std::str::FromStr;

use crate::constants::{BRACKET_CLOSE, BRACKET_OPEN, DOT_SEPARATOR, MAX_NESTING_DEPTH};
use crate::error::PathError;

/// A single step in a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Named step into a map (`a`, `[a]`, `.a`)
    Key(String),
    /// Empty brackets (`[]`): append to a list
    Append,
}

impl Segment {
    /// Creates a key segment.
    #[must_use]
    pub fn key(k: impl Into<String>) -> Self {
        Self::Key(k.into())
    }

    /// Returns the key if this is a key segment.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Append => None,
        }
    }
}

/// A tokenized location inside a query structure.
///
/// # Examples
///
/// ```
/// use uri_query::{Path, Segment};
///
/// let path = Path::parse("filter.tags[]");
/// assert_eq!(
///     path.segments(),
///     &[Segment::key("filter"), Segment::key("tags"), Segment::Append]
/// );
/// assert_eq!(path.to_string(), "filter[tags][]");
///
/// // Malformed brackets fall back to one literal key
/// assert_eq!(Path::parse("a[b").segments(), &[Segment::key("a[b")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    /// Creates an empty path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a dot/bracket path, keeping malformed input as one literal key.
    ///
    /// Empty input yields the root path, which addresses nothing.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::lenient(input, true)
    }

    /// Parses a dot/bracket path, rejecting malformed input.
    ///
    /// # Errors
    ///
    /// Returns `PathError` if:
    /// - The input is empty
    /// - A dot segment or the leading name is empty
    /// - A `[` is never closed, or a `]` appears without an opening `[`
    /// - Text follows a closing `]` without starting a new group
    ///
    /// Segments past [`MAX_NESTING_DEPTH`] are not an error; they stay in the
    /// last key as literal text.
    pub fn parse_strict(input: &str) -> Result<Self, PathError> {
        tokenize(input, true).map(Self)
    }

    /// Parses a raw query key (bracket notation only; dots are literal).
    #[must_use]
    pub fn from_query_key(key: &str) -> Self {
        Self::lenient(key, false)
    }

    /// Path consisting of exactly one key, without any tokenization.
    #[must_use]
    pub fn literal(key: impl Into<String>) -> Self {
        Self(vec![Segment::Key(key.into())])
    }

    /// Appends a key segment.
    #[must_use]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Segment::Key(k.into()));
        self
    }

    /// Appends a list-append segment.
    #[must_use]
    pub fn append(mut self) -> Self {
        self.0.push(Segment::Append);
        self
    }

    /// Returns the segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn lenient(input: &str, dots: bool) -> Self {
        if input.is_empty() {
            return Self::root();
        }
        match tokenize(input, dots) {
            Ok(segments) => Self(segments),
            Err(error) => {
                tracing::debug!(%error, key = input, "treating malformed path as a literal key");
                Self::literal(input)
            }
        }
    }
}

fn tokenize(input: &str, dots: bool) -> Result<Vec<Segment>, PathError> {
    if input.is_empty() {
        return Err(PathError::Empty);
    }

    let mut chars = input.char_indices().peekable();
    let mut segments = Vec::new();

    loop {
        let start = chars.peek().map_or(input.len(), |&(i, _)| i);
        let mut name = String::new();
        while let Some(&(i, c)) = chars.peek() {
            if c == BRACKET_OPEN || (dots && c == DOT_SEPARATOR) {
                break;
            }
            if c == BRACKET_CLOSE {
                return Err(PathError::UnexpectedCloseBracket { position: i });
            }
            name.push(c);
            chars.next();
        }
        if name.is_empty() {
            return Err(PathError::EmptyName { position: start });
        }
        segments.push(Segment::Key(name));
        if let Some(position) = past_limit(&segments, chars.peek()) {
            keep_tail_literal(&mut segments, &input[position..]);
            return Ok(segments);
        }

        while let Some(&(open, BRACKET_OPEN)) = chars.peek() {
            chars.next();
            let mut inner = String::new();
            let mut closed = false;
            for (_, c) in chars.by_ref() {
                if c == BRACKET_CLOSE {
                    closed = true;
                    break;
                }
                if c == BRACKET_OPEN {
                    return Err(PathError::UnclosedBracket { position: open });
                }
                inner.push(c);
            }
            if !closed {
                return Err(PathError::UnclosedBracket { position: open });
            }
            segments.push(if inner.is_empty() {
                Segment::Append
            } else {
                Segment::Key(inner)
            });
            if let Some(position) = past_limit(&segments, chars.peek()) {
                keep_tail_literal(&mut segments, &input[position..]);
                return Ok(segments);
            }
        }

        match chars.next() {
            None => return Ok(segments),
            Some((_, DOT_SEPARATOR)) if dots => {}
            Some((position, _)) => return Err(PathError::TrailingText { position }),
        }
    }
}

/// Byte offset of the remaining input once the path is at its depth limit.
fn past_limit(segments: &[Segment], next: Option<&(usize, char)>) -> Option<usize> {
    if segments.len() < MAX_NESTING_DEPTH {
        return None;
    }
    next.map(|&(position, _)| position)
}

fn keep_tail_literal(segments: &mut [Segment], tail: &str) {
    if let Some(last) = segments.last_mut() {
        tracing::debug!(
            depth = MAX_NESTING_DEPTH,
            tail_len = tail.len(),
            "keeping path segments past the nesting limit as literal text"
        );
        let mut key = last.as_key().unwrap_or_default().to_string();
        key.push_str(tail);
        *last = Segment::Key(key);
    }
}

/// Formats the path in bracket notation, as it appears in a raw query key.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match (i, segment) {
                (0, Segment::Key(k)) => write!(f, "{k}")?,
                (_, Segment::Key(k)) => write!(f, "[{k}]")?,
                (_, Segment::Append) => write!(f, "[]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_strict(s)
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}
