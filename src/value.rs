// SPDX-License-Identifier: MIT

//! The recursive [`Value`] tagged union and its wire codec.
//!
//! `Value` is the unit of typed data exchanged with a Kvi server: every
//! record field, every piece of vector metadata, is a `Value`. It is a closed
//! sum type — scalars, byte blobs, ordered arrays, and string-keyed maps,
//! nested to any depth — so encoding dispatches by exhaustive `match` rather
//! than by runtime type inspection, and decoding dispatches on the wire
//! oneof tag.
//!
//! # Round-trip guarantee
//!
//! For any `Value` built from the variants below,
//! `Value::from_wire(v.to_wire()) == v`. The one lossy edge is the dynamic
//! boundary: [`Value::from_serialize`] turns host data that has no
//! representable variant into [`Value::Null`] silently. This degradation is
//! idempotent (`Null` re-encodes as `Null`) but not information-preserving;
//! it is a documented contract, not an error.

use std::collections::HashMap;

use crate::proto;

/// A self-describing storable value.
///
/// Exactly one variant is populated at a time. `Array` is order-significant;
/// `Map` keys are unique and key order carries no meaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value. Also produced when decoding a wire value with no
    /// variant set, or when host data degrades (see module docs).
    #[default]
    Null,
    /// UTF-8 text.
    String(String),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit IEEE float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Opaque byte sequence.
    Bytes(Vec<u8>),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// String-keyed mapping of values.
    Map(HashMap<String, Value>),
}

impl Value {
    /// Encode into the wire representation.
    pub fn to_wire(&self) -> proto::Value {
        use crate::proto::value::Value as Wire;

        let value = match self {
            Value::Null => None,
            Value::String(s) => Some(Wire::StringValue(s.clone())),
            Value::Int(i) => Some(Wire::IntValue(*i)),
            Value::Float(f) => Some(Wire::FloatValue(*f)),
            Value::Bool(b) => Some(Wire::BoolValue(*b)),
            Value::Bytes(b) => Some(Wire::BytesValue(b.clone())),
            Value::Array(items) => Some(Wire::ArrayValue(proto::ValueArray {
                values: items.iter().map(Value::to_wire).collect(),
            })),
            Value::Map(entries) => Some(Wire::MapValue(proto::ValueMap {
                values: map_to_wire(entries),
            })),
        };

        proto::Value { value }
    }

    /// Decode from the wire representation. An unset oneof decodes to
    /// [`Value::Null`].
    pub fn from_wire(wire: proto::Value) -> Value {
        use crate::proto::value::Value as Wire;

        match wire.value {
            None => Value::Null,
            Some(Wire::StringValue(s)) => Value::String(s),
            Some(Wire::IntValue(i)) => Value::Int(i),
            Some(Wire::FloatValue(f)) => Value::Float(f),
            Some(Wire::BoolValue(b)) => Value::Bool(b),
            Some(Wire::BytesValue(b)) => Value::Bytes(b),
            Some(Wire::ArrayValue(arr)) => {
                Value::Array(arr.values.into_iter().map(Value::from_wire).collect())
            }
            Some(Wire::MapValue(map)) => Value::Map(map_from_wire(map.values)),
        }
    }

    /// Convert any serializable host value into a `Value`, degrading
    /// unrepresentable data to [`Value::Null`].
    ///
    /// This is the dynamic boundary of the SDK: a custom type that fails to
    /// serialize (or serializes to something with no variant here, such as a
    /// non-finite float in JSON) becomes `Null` without raising. Callers who
    /// need loss detection should construct `Value` variants directly.
    pub fn from_serialize<T: serde::Serialize>(host: &T) -> Value {
        match serde_json::to_value(host) {
            Ok(json) => Value::from(json),
            Err(_) => {
                tracing::warn!("host value has no Value representation, degrading to null");
                Value::Null
            }
        }
    }

    /// True if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Lift the wire encoding over a field map.
pub fn map_to_wire(data: &HashMap<String, Value>) -> HashMap<String, proto::Value> {
    data.iter()
        .map(|(k, v)| (k.clone(), v.to_wire()))
        .collect()
}

/// Lift the wire decoding over a field map.
pub fn map_from_wire(wire: HashMap<String, proto::Value>) -> HashMap<String, Value> {
    wire.into_iter()
        .map(|(k, v)| (k, Value::from_wire(v)))
        .collect()
}

// ---------------------------------------------------------------------------
// Host-JSON interop
// ---------------------------------------------------------------------------

impl From<serde_json::Value> for Value {
    /// JSON carries no bytes variant, so `Bytes` never arises here. A number
    /// that fits neither `i64` nor `f64` degrades to `Null`.
    fn from(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    /// `Bytes` becomes a JSON array of numbers and a non-finite `Float`
    /// becomes JSON null, since JSON can represent neither.
    fn from(value: Value) -> serde_json::Value {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Bytes(b) => serde_json::Value::Array(
                b.into_iter().map(serde_json::Value::from).collect(),
            ),
            Value::Array(items) => serde_json::Value::Array(
                items.into_iter().map(serde_json::Value::from).collect(),
            ),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Scalar conversions for ergonomic construction
// ---------------------------------------------------------------------------

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: Value) -> Value {
        Value::from_wire(v.to_wire())
    }

    #[test]
    fn scalars_roundtrip() {
        for v in [
            Value::Null,
            Value::String("hello".into()),
            Value::Int(-42),
            Value::Float(3.25),
            Value::Bool(true),
            Value::Bytes(vec![0, 1, 2, 255]),
        ] {
            assert_eq!(roundtrip(v.clone()), v);
        }
    }

    #[test]
    fn nested_structure_roundtrips() {
        let mut inner = HashMap::new();
        inner.insert("depth".to_owned(), Value::Int(3));
        inner.insert(
            "tags".to_owned(),
            Value::Array(vec![Value::from("a"), Value::from("b")]),
        );

        let mut outer = HashMap::new();
        outer.insert("inner".to_owned(), Value::Map(inner));
        outer.insert(
            "mixed".to_owned(),
            Value::Array(vec![
                Value::Null,
                Value::Bool(false),
                Value::Array(vec![Value::Float(1.5)]),
            ]),
        );

        let v = Value::Map(outer);
        assert_eq!(roundtrip(v.clone()), v);
    }

    #[test]
    fn unset_wire_value_decodes_to_null() {
        let wire = proto::Value { value: None };
        assert_eq!(Value::from_wire(wire), Value::Null);
    }

    #[test]
    fn null_reencodes_as_null() {
        // Degraded values stay degraded: null -> wire -> null, twice.
        let once = roundtrip(Value::Null);
        let twice = roundtrip(once.clone());
        assert_eq!(once, Value::Null);
        assert_eq!(twice, Value::Null);
    }

    #[test]
    fn from_serialize_handles_plain_structs() {
        #[derive(serde::Serialize)]
        struct Point {
            x: i64,
            y: i64,
        }

        let v = Value::from_serialize(&Point { x: 1, y: 2 });
        match v {
            Value::Map(m) => {
                assert_eq!(m.get("x"), Some(&Value::Int(1)));
                assert_eq!(m.get("y"), Some(&Value::Int(2)));
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn from_serialize_degrades_nan_to_null() {
        // JSON cannot represent NaN, so it has no Value variant to land in.
        let v = Value::from_serialize(&f64::NAN);
        assert_eq!(v, Value::Null);
        // Idempotent under re-encoding.
        assert_eq!(roundtrip(v), Value::Null);
    }

    #[test]
    fn json_interop_preserves_structure() {
        let json = serde_json::json!({
            "name": "test",
            "count": 7,
            "ratio": 0.5,
            "flags": [true, false],
            "nested": {"deep": [1, 2, 3]}
        });

        let v = Value::from(json.clone());
        let back = serde_json::Value::from(v);
        assert_eq!(back, json);
    }

    #[test]
    fn huge_json_number_degrades_to_float_or_null() {
        let big = serde_json::json!(u64::MAX);
        // u64::MAX exceeds i64; it falls through to the float branch.
        assert_eq!(Value::from(big), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn map_helpers_are_inverses() {
        let mut data = HashMap::new();
        data.insert("a".to_owned(), Value::Int(1));
        data.insert("b".to_owned(), Value::from("two"));

        assert_eq!(map_from_wire(map_to_wire(&data)), data);
    }
}
