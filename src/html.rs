//! Rendering hook for templating layers.

/// A value that renders itself as HTML-safe text.
///
/// Templating layers check for this capability to decide whether a value
/// may be emitted without further escaping.
pub trait Htmlable {
    /// Returns the HTML rendering of the value.
    fn to_html(&self) -> String;
}
