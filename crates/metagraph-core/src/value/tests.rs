use crate::value::{Value, ValueTag, canonical_cmp, is_same};
use chrono::{DateTime, NaiveDate};
use std::cmp::Ordering;

fn ts(secs: i64, nanos: u32) -> Value {
    Value::Timestamp(DateTime::from_timestamp(secs, nanos).unwrap())
}

#[test]
fn timestamps_compare_at_second_precision() {
    assert!(is_same(&ts(1_700_000_000, 0), &ts(1_700_000_000, 999_000_000)));
    assert!(!is_same(&ts(1_700_000_000, 0), &ts(1_700_000_001, 0)));
}

#[test]
fn nan_is_same_as_nan() {
    assert!(is_same(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
    assert!(!is_same(&Value::Float(f64::NAN), &Value::Float(0.0)));
}

#[test]
fn cross_variant_is_never_same() {
    assert!(!is_same(&Value::Int(1), &Value::Uint(1)));
    assert!(!is_same(&Value::Null, &Value::Bool(false)));
}

#[test]
fn lists_are_order_sensitive() {
    let a = Value::from_list(vec![1i64, 2, 3]);
    let b = Value::from_list(vec![3i64, 2, 1]);
    assert!(!is_same(&a, &b));
    assert!(is_same(&a, &a.clone()));
}

#[test]
fn sets_ignore_order() {
    let a = Value::from_set(vec!["x", "y", "z"]);
    let b = Value::from_set(vec!["z", "x", "y"]);
    assert!(is_same(&a, &b));
}

#[test]
fn bags_track_duplicates_individually() {
    let a = Value::from_bag(vec![1i64, 1, 2]);
    let b = Value::from_bag(vec![2i64, 1, 1]);
    let c = Value::from_bag(vec![1i64, 2, 2]);
    assert!(is_same(&a, &b));
    assert!(!is_same(&a, &c));
}

#[test]
fn maps_normalize_before_comparing() {
    let a = Value::Map(vec![
        (Value::Text("b".into()), Value::Int(2)),
        (Value::Text("a".into()), Value::Int(1)),
    ]);
    let b = Value::Map(vec![
        (Value::Text("a".into()), Value::Int(1)),
        (Value::Text("b".into()), Value::Int(2)),
    ]);
    assert!(is_same(&a, &b));
}

#[test]
fn from_map_keeps_last_duplicate_key() {
    let map = Value::from_map(vec![("k", 1i64), ("k", 2i64)]);
    let entries = map.as_map_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1, Value::Int(2));
}

#[test]
fn canonical_cmp_orders_by_tag_first() {
    assert_eq!(
        canonical_cmp(&Value::Bool(true), &Value::Int(-100)),
        Ordering::Less
    );
    assert_eq!(
        canonical_cmp(&Value::Null, &Value::Bool(false)),
        Ordering::Less
    );
}

#[test]
fn canonical_cmp_is_total_over_floats() {
    assert_eq!(
        canonical_cmp(&Value::Float(f64::NAN), &Value::Float(f64::NAN)),
        Ordering::Equal
    );
    assert_eq!(
        canonical_cmp(&Value::Float(-0.0), &Value::Float(0.0)),
        Ordering::Less
    );
}

#[test]
fn tag_round_trips_through_wire_byte() {
    for byte in 0..=18u8 {
        let tag = ValueTag::from_u8(byte).unwrap();
        assert_eq!(tag.to_u8(), byte);
    }
    assert_eq!(ValueTag::from_u8(19), None);
}

#[test]
fn empty_like_covers_null_and_empty_collections() {
    assert!(Value::Null.is_empty_like());
    assert!(Value::List(Vec::new()).is_empty_like());
    assert!(Value::Map(Vec::new()).is_empty_like());
    assert!(!Value::Int(0).is_empty_like());
    assert!(!Value::from_list(vec![1i64]).is_empty_like());
}

#[test]
fn date_values_compare_structurally() {
    let a = Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    let b = Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    let c = Value::Date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    assert!(is_same(&a, &b));
    assert_eq!(canonical_cmp(&a, &c), Ordering::Less);
}
