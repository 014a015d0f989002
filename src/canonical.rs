//! JSON canonicalization.
//!
//! Produces a deterministic byte form of a JSON document: object keys sorted
//! lexicographically at every depth and no insignificant whitespace. The
//! processor signs this form, so two documents that differ only in key order
//! or spacing yield identical bytes.
//!
//! # Design Decisions
//! - Keys are sorted explicitly rather than relying on the map type behind
//!   `serde_json::Value`, so enabling `preserve_order` anywhere in the build
//!   cannot change the output
//! - Array order is significant and preserved
//! - Trailing bytes after the document are rejected
//! - `<`, `>`, `&`, U+2028 and U+2029 inside strings are always written as
//!   `\uXXXX` escapes

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};
use std::io;

/// Error raised when the input is not a JSON document.
#[derive(Debug, thiserror::Error)]
pub enum CanonicalError {
    #[error("malformed JSON input: {0}")]
    MalformedInput(#[from] serde_json::Error),
}

/// Canonicalize a JSON document.
///
/// Returns the compact, key-sorted serialization of `input`. Nothing is
/// produced for input that does not parse.
pub fn canonicalize(input: &[u8]) -> Result<Vec<u8>, CanonicalError> {
    let value: Value = serde_json::from_slice(input)?;

    let mut out = Vec::with_capacity(input.len());
    let mut serializer = Serializer::with_formatter(&mut out, HtmlSafeFormatter);
    sort_keys(value).serialize(&mut serializer)?;
    Ok(out)
}

/// Compact formatter that also escapes HTML-significant characters and the
/// JavaScript line terminators.
struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escaped = match c {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Rebuild `value` with every object's entries inserted in key order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, inner) in entries {
                sorted.insert(key, sort_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(input: &str) -> String {
        String::from_utf8(canonicalize(input.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn sorts_top_level_keys() {
        assert_eq!(canon(r#"{"b":2,"a":1}"#), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn key_order_does_not_matter() {
        assert_eq!(
            canonicalize(br#"{"b":1,"a":2}"#).unwrap(),
            canonicalize(br#"{"a":2,"b":1}"#).unwrap()
        );
    }

    #[test]
    fn sorts_nested_objects_and_objects_inside_arrays() {
        let input = r#"{
            "z": {"y": true, "x": null},
            "list": [{"d": 1, "c": 2}, 3, "s"]
        }"#;
        assert_eq!(
            canon(input),
            r#"{"list":[{"c":2,"d":1},3,"s"],"z":{"x":null,"y":true}}"#
        );
    }

    #[test]
    fn preserves_array_order() {
        assert_eq!(canon("[3, 1, 2]"), "[3,1,2]");
    }

    #[test]
    fn strips_whitespace() {
        assert_eq!(
            canon("  {\n\t\"msg\" :  \"hello world\" ,\r\n \"n\": 7 }  "),
            r#"{"msg":"hello world","n":7}"#
        );
    }

    #[test]
    fn is_idempotent() {
        let once = canonicalize(br#"{"b":{"d":[1,{"f":0,"e":1}],"c":"x"},"a":1.5}"#).unwrap();
        let twice = canonicalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn sorts_keys_bytewise() {
        assert_eq!(canon(r#"{"a":1,"B":2,"_":3}"#), r#"{"B":2,"_":3,"a":1}"#);
    }

    #[test]
    fn accepts_scalar_documents() {
        assert_eq!(canon(" \"text\" "), "\"text\"");
        assert_eq!(canon("42"), "42");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            canonicalize(b"{\"a\":"),
            Err(CanonicalError::MalformedInput(_))
        ));
        assert!(canonicalize(b"").is_err());
        assert!(canonicalize(b"not json").is_err());
    }

    #[test]
    fn escapes_html_characters_in_strings() {
        assert_eq!(
            canon(r#"{"q":"a<b && c>d","<k>":1}"#),
            r#"{"\u003ck\u003e":1,"q":"a\u003cb \u0026\u0026 c\u003ed"}"#
        );
        assert_eq!(canon("\"\u{2028}x\u{2029}\""), r#""\u2028x\u2029""#);
        assert_eq!(canon(r#""\u003c""#), r#""\u003c""#);
    }

    #[test]
    fn escaping_leaves_other_text_alone() {
        let text = r#"{"s":"grüße \"quoted\" \\ / €"}"#;
        assert_eq!(canon(text), text);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(canonicalize(br#"{"a":1} {"b":2}"#).is_err());
    }
}
