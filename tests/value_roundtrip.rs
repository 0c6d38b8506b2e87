// SPDX-License-Identifier: MIT
//! Property-based tests for the Value wire codec.

use std::collections::HashMap;

use proptest::prelude::*;

use kvi_client::proto;
use kvi_client::types::Record;
use kvi_client::Value;

/// Generate arbitrary values of any variant, nested up to four levels deep.
///
/// Floats are kept non-NaN so structural equality holds; NaN is covered by
/// the degradation tests in the value module.
fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>()
            .prop_filter("NaN is not structurally comparable", |f| !f.is_nan())
            .prop_map(Value::Float),
        "[a-zA-Z0-9 _-]{0,24}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
    ];

    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,8}", inner, 0..8).prop_map(Value::Map),
        ]
    })
}

/// Generate field maps as stored in records.
fn arb_data() -> impl Strategy<Value = HashMap<String, Value>> {
    prop::collection::hash_map("[a-z_]{1,12}", arb_value(), 0..6)
}

proptest! {
    #[test]
    fn value_roundtrips_through_the_wire(v in arb_value()) {
        let decoded = Value::from_wire(v.to_wire());
        prop_assert_eq!(decoded, v);
    }

    #[test]
    fn reencoding_is_stable(v in arb_value()) {
        // decode(encode(decode(encode(x)))) == decode(encode(x))
        let once = Value::from_wire(v.to_wire());
        let twice = Value::from_wire(once.to_wire());
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn record_data_survives_the_wire(
        id in "[a-z0-9:-]{1,16}",
        data in arb_data(),
        version in any::<u64>(),
    ) {
        let record = Record {
            id: id.clone(),
            data: data.clone(),
            version,
            ..Record::default()
        };

        let back = Record::from(proto::Record::from(record));
        prop_assert_eq!(back.id, id);
        prop_assert_eq!(back.data, data);
        prop_assert_eq!(back.version, version);
    }

    #[test]
    fn json_values_become_values_without_structure_loss(
        keys in prop::collection::vec("[a-z]{1,6}", 1..5),
        ints in prop::collection::vec(any::<i64>(), 1..5),
    ) {
        // Build a nested JSON object: {"k0": {"k1": {... [ints]}}}
        let mut json = serde_json::json!(ints);
        for key in &keys {
            json = serde_json::json!({ key.as_str(): json });
        }

        let value = Value::from(json.clone());
        let back = serde_json::Value::from(value);
        prop_assert_eq!(back, json);
    }
}
