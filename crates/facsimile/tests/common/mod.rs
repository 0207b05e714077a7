//! Shared assertions for the integration tests.
#![allow(dead_code)]

use facsimile::Value;

/// Checks that `copy` duplicates `original`: primitives and symbols are
/// identical, traversable containers are fresh and hold equivalent entries
/// under the same keys, everything else has the same category.
pub fn assert_equivalent(original: &Value, copy: &Value) {
    assert_equivalent_at("$", original, copy);
}

fn assert_equivalent_at(path: &str, original: &Value, copy: &Value) {
    assert_eq!(original.category(), copy.category(), "category differs at {path}");
    match (original.own_enumerable_entries(), copy.own_enumerable_entries()) {
        (Some(expected), Some(actual)) => {
            assert!(!original.same_value(copy), "{path} was shared, not copied");
            assert_eq!(keys_of(&expected), keys_of(&actual), "keys differ at {path}");
            for ((key, expected), (_, actual)) in expected.iter().zip(&actual) {
                assert_equivalent_at(&format!("{path}.{key}"), expected, actual);
            }
        }
        _ if original.is_primitive() || matches!(original, Value::Symbol(_)) => {
            assert!(original.same_value(copy), "{path}: {original} became {copy}");
        }
        _ => {}
    }
}

fn keys_of(entries: &[(facsimile::value::PropertyKey, Value)]) -> Vec<String> {
    entries.iter().map(|(key, _)| key.to_string()).collect()
}

/// Follow a dotted path of field names and indices, e.g. `"a.c.e.2"`.
pub fn at(value: &Value, path: &str) -> Value {
    path.split('.').fold(value.clone(), |current, step| {
        let next = match step.parse::<usize>() {
            Ok(index) if current.as_sequence().is_some() => current.get_index(index),
            _ => current.get_field(step),
        };
        next.unwrap_or_else(|| panic!("no `{step}` in path `{path}`"))
    })
}

pub fn record(fields: Vec<(&str, Value)>) -> Value {
    Value::record(fields)
}
