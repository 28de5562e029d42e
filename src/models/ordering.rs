//! AQL value ordering.
//!
//! ArangoDB compares values of different types by a fixed type order:
//!
//! | Rank | Type |
//! |------|------|
//! | 0 | `null` |
//! | 1 | `bool` (`false < true`) |
//! | 2 | number |
//! | 3 | string |
//! | 4 | array |
//! | 5 | object |
//!
//! Values of the same type compare naturally. Strings compare byte-wise, so
//! ISO-8601 timestamps written in one fixed-width format order
//! chronologically. A missing attribute reads as `null`, which sorts below
//! every timestamp: `null <= T` holds for any string `T`.

use serde_json::Value;
use std::cmp::Ordering;

const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Compares two values the way AQL comparison operators do.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        },
        (Value::String(x), Value::String(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Value::Array(x), Value::Array(y)) => {
            // Shorter arrays are padded with null.
            let len = x.len().max(y.len());
            for i in 0..len {
                let left = x.get(i).unwrap_or(&Value::Null);
                let right = y.get(i).unwrap_or(&Value::Null);
                let ord = compare_values(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        },
        (Value::Object(x), Value::Object(y)) => {
            let mut keys: Vec<&String> = x.keys().chain(y.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let left = x.get(key).unwrap_or(&Value::Null);
                let right = y.get(key).unwrap_or(&Value::Null);
                let ord = compare_values(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        },
        _ => Ordering::Equal,
    }
}

/// `a <= b` under AQL ordering.
#[must_use]
pub fn value_le(a: &Value, b: &Value) -> bool {
    compare_values(a, b) != Ordering::Greater
}

/// `a >= b` under AQL ordering.
#[must_use]
pub fn value_ge(a: &Value, b: &Value) -> bool {
    compare_values(a, b) != Ordering::Less
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_order() {
        let ordered = [
            json!(null),
            json!(false),
            json!(true),
            json!(-5),
            json!(3.5),
            json!(""),
            json!("a"),
            json!([]),
            json!({}),
        ];
        for pair in ordered.windows(2) {
            assert_eq!(
                compare_values(&pair[0], &pair[1]),
                Ordering::Less,
                "{} < {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_timestamps_order_chronologically() {
        let earlier = json!("2024-01-15T09:00:00.000000Z");
        let later = json!("2024-01-15T10:00:00.000000Z");
        assert!(value_le(&earlier, &later));
        assert!(!value_ge(&earlier, &later));
        assert!(value_le(&earlier, &earlier));
        assert!(value_ge(&earlier, &earlier));
    }

    #[test]
    fn test_null_below_strings() {
        assert!(value_le(&json!(null), &json!("2024-01-01")));
        assert!(!value_ge(&json!(null), &json!("2024-01-01")));
    }

    #[test]
    fn test_arrays_pad_with_null() {
        assert_eq!(compare_values(&json!([1]), &json!([1, null])), Ordering::Equal);
        assert_eq!(compare_values(&json!([1]), &json!([1, 2])), Ordering::Less);
    }

    #[test]
    fn test_numbers_compare_across_representations() {
        assert_eq!(compare_values(&json!(1), &json!(1.0)), Ordering::Equal);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
    }
}
