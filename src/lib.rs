//! Immutable URI value object with nested, path-aware query strings.
//!
//! This crate wraps an RFC 3986 / WHATWG URL parser ([`url`]) in an immutable
//! [`Uri`] type and treats the query string as a nested key/value structure
//! instead of an opaque blob.
//!
//! # Overview
//!
//! Query keys use bracket notation on the wire and accept dot notation when
//! addressing values:
//!
//! ```text
//! ?filter[status]=open&filter[tags][]=a&filter[tags][]=b
//!
//! filter.status      -> "open"
//! filter[tags]       -> ["a", "b"]
//! ```
//!
//! Every query operation decodes the current raw query, applies one change
//! and encodes the result into a new [`Uri`]. Nothing is mutated in place.
//!
//! # Quick Start
//!
//! ```rust
//! use uri_query::{QueryInput, Uri};
//!
//! let uri = Uri::parse("https://example.com/posts?page=1&filter[status]=open").unwrap();
//!
//! // Read nested values
//! assert_eq!(uri.query().string("filter.status"), Some("open"));
//! assert_eq!(uri.query().integer("page"), Some(1));
//!
//! // Deep merge keeps sibling keys
//! let uri = uri.with_query([("filter", QueryInput::map([("author", "ann")]))], true);
//! assert_eq!(
//!     uri.query().value(),
//!     "page=1&filter[status]=open&filter[author]=ann"
//! );
//!
//! // Lists
//! let uri = uri.push_onto_query("tag", "rust").push_onto_query("tag", "rust");
//! assert_eq!(uri.query().string("tag.0"), Some("rust"));
//! assert!(uri.query().missing("tag.1"));
//!
//! // Removal and full replacement
//! let uri = uri.without_query(["page", "filter.author"]);
//! assert_eq!(uri.to_string(), "https://example.com/posts?filter[status]=open&tag[]=rust");
//! assert_eq!(uri.replace_query([("q", "x")]).to_string(), "https://example.com/posts?q=x");
//! ```
//!
//! # Malformed Keys
//!
//! Raw query keys with unbalanced brackets (`a[b=1`) are kept as literal
//! keys rather than rejected. [`Path::parse_strict`] exposes the strict
//! tokenizer for callers that want to reject such paths.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod constants;
mod error;
mod html;
#[cfg(kani)]
mod kani_impls;
mod path;
mod path_map;
pub mod prelude;
mod query;
mod resolver;
mod uri;
mod value;

pub use constants::{MAX_NESTING_DEPTH, ROOT_PATH};
pub use error::{PathError, ResolveError, UriError, UriErrorKind};
pub use html::Htmlable;
pub use path::{Path, Segment};
pub use path_map::PathMap;
pub use query::{PushMode, QueryView};
pub use resolver::{RouteParameters, UrlResolver};
pub use uri::Uri;
pub use value::{QueryInput, QueryMap, QueryValue, RouteKey};
