//! Error types for URI construction, component rewriting and path parsing.

use std::fmt;

/// Errors that can occur when building or rewriting a [`Uri`](crate::Uri).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriError {
    /// The input that was rejected
    pub input: String,
    /// The specific error that occurred
    pub kind: UriErrorKind,
}

/// Specific URI error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriErrorKind {
    /// The underlying URI grammar rejected the text
    Parse(url::ParseError),
    /// Input starts with `//` and names a host without a scheme
    NetworkPathReference,
    /// Scheme is syntactically invalid or cannot replace the current one
    InvalidScheme,
    /// User or password cannot be set on this URI
    InvalidUserInfo,
    /// Host is invalid or cannot be set on this URI
    InvalidHost(Option<url::ParseError>),
    /// Port cannot be set on this URI
    InvalidPort,
    /// Component requires an absolute URI but this one is a relative reference
    RelativeReference {
        /// Name of the component being rewritten
        component: &'static str,
    },
    /// The resolver failed to produce a URL
    Resolve(ResolveError),
}

impl UriError {
    pub(crate) fn new(input: impl Into<String>, kind: UriErrorKind) -> Self {
        Self {
            input: input.into(),
            kind,
        }
    }
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            UriErrorKind::Parse(e) => write!(f, "failed to parse URI '{}': {e}", self.input),
            UriErrorKind::NetworkPathReference => write!(
                f,
                "'{}' is a network-path reference; a scheme is required when naming a host",
                self.input
            ),
            UriErrorKind::InvalidScheme => write!(f, "cannot use '{}' as scheme", self.input),
            UriErrorKind::InvalidUserInfo => {
                write!(f, "cannot set user info '{}' on a URI without a host", self.input)
            }
            UriErrorKind::InvalidHost(Some(e)) => {
                write!(f, "invalid host '{}': {e}", self.input)
            }
            UriErrorKind::InvalidHost(None) => {
                write!(f, "cannot set host '{}' on this URI", self.input)
            }
            UriErrorKind::InvalidPort => write!(f, "cannot set port '{}' on this URI", self.input),
            UriErrorKind::RelativeReference { component } => write!(
                f,
                "cannot set {component} '{}' on a relative reference",
                self.input
            ),
            UriErrorKind::Resolve(e) => write!(f, "failed to resolve '{}': {e}", self.input),
        }
    }
}

impl std::error::Error for UriError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            UriErrorKind::Parse(e) | UriErrorKind::InvalidHost(Some(e)) => Some(e),
            UriErrorKind::Resolve(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors for strict query path parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path is empty
    Empty,
    /// A bracket group or dot segment has no leading name
    EmptyName {
        /// Position in the input
        position: usize,
    },
    /// `[` without a matching `]`
    UnclosedBracket {
        /// Position of the opening bracket
        position: usize,
    },
    /// `]` without a preceding `[`
    UnexpectedCloseBracket {
        /// Position of the closing bracket
        position: usize,
    },
    /// Text after a closing bracket that does not open another group
    TrailingText {
        /// Position of the first offending character
        position: usize,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "path cannot be empty"),
            Self::EmptyName { position } => {
                write!(f, "missing segment name at position {position}")
            }
            Self::UnclosedBracket { position } => {
                write!(f, "unclosed '[' at position {position}")
            }
            Self::UnexpectedCloseBracket { position } => {
                write!(f, "unexpected ']' at position {position}")
            }
            Self::TrailingText { position } => write!(
                f,
                "unexpected text at position {position}; expected '[' or '.' after ']'"
            ),
        }
    }
}

impl std::error::Error for PathError {}

/// Errors reported by a [`UrlResolver`](crate::UrlResolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No route is registered under the name
    RouteNotFound {
        /// The requested route name
        name: String,
    },
    /// A parameter is missing or has the wrong shape
    InvalidArgument {
        /// Description of the offending argument
        message: String,
    },
    /// Any other resolver failure
    Other(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RouteNotFound { name } => write!(f, "route [{name}] not defined"),
            Self::InvalidArgument { message } => write!(f, "invalid argument: {message}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ResolveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_names_input() {
        let err = UriError::new("::", UriErrorKind::Parse(url::ParseError::EmptyHost));
        assert!(err.to_string().contains("'::'"));
    }

    #[test]
    fn resolve_error_is_source() {
        use std::error::Error;

        let err = UriError::new(
            "users.show",
            UriErrorKind::Resolve(ResolveError::RouteNotFound {
                name: "users.show".to_string(),
            }),
        );
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("route [users.show] not defined"));
    }

    #[test]
    fn path_error_display() {
        assert_eq!(
            PathError::UnclosedBracket { position: 1 }.to_string(),
            "unclosed '[' at position 1"
        );
    }
}
