//! Kani proof harnesses for the path tokenizer.
//!
//! # Usage
//!
//! Kani is not a Cargo dependency. Install and run with:
//!
//! ```bash
//! cargo install --locked kani-verifier
//! cargo kani setup
//! cargo kani --features kani
//! ```
//!
//! This module is only compiled when using Kani (`#[cfg(kani)]`).

use crate::{Path, PathMap, QueryValue, Segment};

/// Alphabet that reaches every tokenizer branch
const PATH_CHARS: &[u8] = b"ab.[]";

fn arbitrary_path_char() -> char {
    let idx: usize = kani::any();
    let idx = idx % PATH_CHARS.len();
    PATH_CHARS[idx] as char
}

/// Generate a 0-5 char path over [`PATH_CHARS`]
fn arbitrary_path_text() -> String {
    let len: usize = kani::any();
    let len = len % 6;
    (0..len).map(|_| arbitrary_path_char()).collect()
}

/// Proof: lenient parsing never yields an empty path for non-empty input
#[kani::proof]
#[kani::unwind(8)]
fn proof_lenient_parse_non_empty() {
    let text = arbitrary_path_text();
    kani::assume(!text.is_empty());
    assert!(!Path::parse(&text).is_empty());
    assert!(!Path::from_query_key(&text).is_empty());
}

/// Proof: lenient and strict parsing agree on well-formed input
#[kani::proof]
#[kani::unwind(8)]
fn proof_strict_agrees_with_lenient() {
    let text = arbitrary_path_text();
    if let Ok(strict) = Path::parse_strict(&text) {
        assert_eq!(strict, Path::parse(&text));
    }
}

/// Proof: bracket rendering of a well-formed path reads back as a query key
#[kani::proof]
#[kani::unwind(8)]
fn proof_display_reparses_as_query_key() {
    let text = arbitrary_path_text();
    if let Ok(path) = Path::parse_strict(&text) {
        let rendered = path.to_string();
        assert_eq!(Path::from_query_key(&rendered), path);
    }
}

/// Proof: a written key can always be read back
#[kani::proof]
#[kani::unwind(8)]
fn proof_set_then_get() {
    let text = arbitrary_path_text();
    kani::assume(!text.is_empty());
    let path = Path::parse(&text);
    kani::assume(!path.segments().contains(&Segment::Append));
    let map = PathMap::new().set(&text, QueryValue::scalar("v"));
    assert_eq!(map.get(&text), Some(&QueryValue::scalar("v")));
}
