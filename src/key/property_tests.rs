//! Property-Based Tests for Key Derivation
//!
//! Uses proptest to check determinism, namespace separation and cycle safety
//! over generated argument trees.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::key::{derive_key, Arg, SharedArg, DIGEST_LEN, KEY_SEPARATOR};

// == Strategies ==
fn segment_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,15}".prop_map(|s| s)
}

/// Generates arbitrary JSON trees used as argument content.
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z~\\\\]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn args_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(json_strategy(), 0..4)
}

fn to_args(values: &[Value]) -> Vec<Arg> {
    values.iter().cloned().map(Arg::from).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Equal arguments always derive equal keys.
    #[test]
    fn prop_derivation_is_deterministic(
        entity in segment_strategy(),
        operation in segment_strategy(),
        values in args_strategy()
    ) {
        let first = derive_key(&entity, &operation, &to_args(&values), "cacher");
        let second = derive_key(&entity, &operation, &to_args(&values), "cacher");
        prop_assert_eq!(first, second);
    }

    // Keys carry exactly four segments ending in a fixed-length hex digest.
    #[test]
    fn prop_key_shape(
        entity in segment_strategy(),
        operation in segment_strategy(),
        values in args_strategy()
    ) {
        let key = derive_key(&entity, &operation, &to_args(&values), "cacher");
        let parts: Vec<&str> = key.as_str().split(KEY_SEPARATOR).collect();

        prop_assert_eq!(parts.len(), 4);
        prop_assert_eq!(parts[1], entity.as_str());
        prop_assert_eq!(parts[2], operation.as_str());
        prop_assert_eq!(parts[3].len(), DIGEST_LEN);
    }

    // Different entities or operations never share a key for the same arguments.
    #[test]
    fn prop_namespace_separation(
        e1 in segment_strategy(),
        e2 in segment_strategy(),
        o1 in segment_strategy(),
        o2 in segment_strategy(),
        values in args_strategy()
    ) {
        prop_assume!(e1 != e2 || o1 != o2);
        let args = to_args(&values);
        prop_assert_ne!(
            derive_key(&e1, &o1, &args, "cacher"),
            derive_key(&e2, &o2, &args, "cacher")
        );
    }

    // A self-referencing node yields a finite key, equal for equal structures.
    #[test]
    fn prop_cycle_safety(values in args_strategy(), field in "[a-z]{1,6}") {
        let build = || {
            let node = SharedArg::new(Arg::Map(BTreeMap::new()));
            node.insert("payload", Arg::list(to_args(&values)));
            node.insert(field.clone(), node.clone());
            node
        };
        let a = build();
        let b = build();

        let key_a = derive_key("User", "findAll", &[Arg::Shared(a.clone())], "cacher");
        let key_b = derive_key("User", "findAll", &[Arg::Shared(b.clone())], "cacher");

        a.set(Arg::Null);
        b.set(Arg::Null);
        prop_assert_eq!(key_a, key_b);
    }
}
