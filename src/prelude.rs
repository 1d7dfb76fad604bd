//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use uri_query::prelude::*;
//!
//! let uri = Uri::parse("https://example.com/?a=1").unwrap();
//! let uri = uri.push_onto_query_with("tag", "x", PushMode::AllowDuplicates);
//! assert_eq!(uri.query().get("tag"), Some(&QueryValue::list(["x"])));
//! ```

pub use crate::{
    // Core types
    Path, PathMap, PushMode, QueryInput, QueryMap, QueryValue, QueryView, Segment, Uri,
    // Capabilities
    Htmlable, RouteKey, RouteParameters, UrlResolver,
    // Errors
    PathError, ResolveError, UriError, UriErrorKind,
};
