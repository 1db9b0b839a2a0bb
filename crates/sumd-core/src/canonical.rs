//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the only byte form that signatures over structured
//! data are produced or checked on. The remote record store signs the JCS
//! rendering of each record; the verifier recomputes the same rendering from
//! the JSON it received, so insignificant whitespace or key order in transit
//! cannot break verification.
//!
//! ## Rules
//!
//! 1. **Reject floats** — JCS number formatting for non-integers differs
//!    between implementations; records carry strings and integers only.
//! 2. **Sorted keys, compact separators** — RFC 8785 via `serde_jcs`.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is [`CanonicalBytes::new()`].
/// - No float values are present.
/// - Object keys are sorted; separators are compact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number,
    /// `SerializationFailed` if JSON serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(v: &Value) -> String {
        let cb = CanonicalBytes::new(v).expect("should canonicalize");
        String::from_utf8(cb.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn sorts_keys_compactly() {
        let data = serde_json::json!({"token": "abc", "metadata": [], "status": 4});
        assert_eq!(canon(&data), r#"{"metadata":[],"status":4,"token":"abc"}"#);
    }

    #[test]
    fn nested_objects_sorted() {
        let data = serde_json::json!({
            "metadata": [{"payload": "{}", "id": 1}],
            "a": {"z": true, "b": null}
        });
        assert_eq!(
            canon(&data),
            r#"{"a":{"b":null,"z":true},"metadata":[{"id":1,"payload":"{}"}]}"#
        );
    }

    #[test]
    fn whitespace_and_order_insensitive() {
        let a: Value = serde_json::from_str(r#"{ "b" : 1,  "a" : "x" }"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a":"x","b":1}"#).unwrap();
        assert_eq!(
            CanonicalBytes::new(&a).unwrap(),
            CanonicalBytes::new(&b).unwrap()
        );
    }

    #[test]
    fn rejects_floats_anywhere() {
        let data = serde_json::json!({"metadata": [{"weight": 0.5}]});
        match CanonicalBytes::new(&data).unwrap_err() {
            CanonicalizationError::FloatRejected(f) => assert_eq!(f, 0.5),
            other => panic!("expected FloatRejected, got: {other}"),
        }
    }

    #[test]
    fn integers_pass() {
        let data = serde_json::json!({"id": 1, "neg": -3});
        assert_eq!(canon(&data), r#"{"id":1,"neg":-3}"#);
    }

    #[test]
    fn empty_values() {
        assert_eq!(CanonicalBytes::new(&serde_json::json!({})).unwrap().as_bytes(), b"{}");
        let arr = CanonicalBytes::new(&serde_json::json!([])).unwrap();
        assert_eq!(arr.as_bytes(), b"[]");
        assert!(!arr.is_empty());
        assert_eq!(arr.len(), 2);
    }
}
