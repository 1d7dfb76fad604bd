//! JSON representation of URIs and query values.
#![cfg(feature = "serde")]

use uri_query::{QueryValue, Uri};

#[test]
fn uri_serializes_as_string() {
    let uri = Uri::parse("https://example.com/a?b[c]=1#d").expect("valid");
    let json = serde_json::to_string(&uri).expect("serialize");
    assert_eq!(json, r#""https://example.com/a?b[c]=1#d""#);

    let back: Uri = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, uri);
}

#[test]
fn relative_uri_serializes_without_base() {
    let uri = Uri::parse("/posts?page=2").expect("valid");
    let json = serde_json::to_string(&uri).expect("serialize");
    assert_eq!(json, r#""/posts?page=2""#);

    let back: Uri = serde_json::from_str(&json).expect("deserialize");
    assert!(back.is_relative());
}

#[test]
fn invalid_uri_fails_to_deserialize() {
    let result: Result<Uri, _> = serde_json::from_str(r#""//host-only""#);
    assert!(result.is_err());
}

#[test]
fn query_values_use_plain_json_shapes() {
    let uri = Uri::parse("https://example.com/?a=1&t[]=x&t[]=y&m[k]=v").expect("valid");
    let query = uri.query();
    let json = serde_json::to_value(query.all()).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({ "a": "1", "t": ["x", "y"], "m": { "k": "v" } })
    );

    let value: QueryValue = serde_json::from_value(serde_json::json!({ "k": ["v"] })).expect("deserialize");
    assert_eq!(value, QueryValue::map([("k", QueryValue::list(["v"]))]));
}
