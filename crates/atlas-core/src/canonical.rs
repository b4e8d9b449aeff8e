//! # Canonical Serialization
//!
//! `CanonicalBytes` is the sole construction path for the bytes behind
//! published-document digests (global index, per-country documents,
//! snapshot records). Serialization follows RFC 8785 (JCS): sorted keys,
//! compact separators, UTF-8.
//!
//! ## Invariant
//!
//! The inner buffer is private. The only constructor applies float
//! rejection before JCS serialization, so any function that accepts
//! `&CanonicalBytes` is statically guaranteed canonical input. Fractional
//! quantities (coordinates, scores) must be rendered to strings or
//! integers before they reach a published document.
//!
//! Geometry digests deliberately do NOT use this type: raw coordinate
//! arrays are fractional by nature and have their own canonical text form
//! in `atlas-geo`.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalError;

/// Bytes produced exclusively by JCS canonicalization with float rejection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value tree contains a non-integer number;
    /// `SerializationFailed` if JSON conversion fails.
    pub fn new(value: &impl Serialize) -> Result<Self, CanonicalError> {
        let tree = serde_json::to_value(value)?;
        reject_floats(&tree)?;
        let text = serde_jcs::to_string(&tree)?;
        Ok(Self(text.into_bytes()))
    }

    /// The canonical bytes, for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the JSON tree and reject any number that is not an i64/u64.
fn reject_floats(value: &Value) -> Result<(), CanonicalError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                return Err(CanonicalError::FloatRejected(n.as_f64().unwrap_or(f64::NAN)));
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sorted_and_compact() {
        let v = serde_json::json!({"root": "0xabc", "country": "US", "cells": 3});
        let cb = CanonicalBytes::new(&v).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"cells":3,"country":"US","root":"0xabc"}"#
        );
    }

    #[test]
    fn nested_objects_sort_too() {
        let v = serde_json::json!({"b": {"z": 1, "a": 2}, "a": [3, 2, 1]});
        let cb = CanonicalBytes::new(&v).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"a":[3,2,1],"b":{"a":2,"z":1}}"#
        );
    }

    #[test]
    fn floats_are_rejected_at_any_depth() {
        let v = serde_json::json!({"score": {"geometry": [40.5]}});
        assert!(matches!(
            CanonicalBytes::new(&v),
            Err(CanonicalError::FloatRejected(_))
        ));
    }

    #[test]
    fn integers_and_strings_pass() {
        let v = serde_json::json!({"population": 1523, "score": "70.0"});
        assert!(CanonicalBytes::new(&v).is_ok());
    }

    #[test]
    fn unicode_is_utf8_not_escaped() {
        let v = serde_json::json!({"name": "Ciudad Ju\u{00e1}rez"});
        let cb = CanonicalBytes::new(&v).unwrap();
        assert!(std::str::from_utf8(cb.as_bytes()).unwrap().contains('\u{00e1}'));
    }
}
