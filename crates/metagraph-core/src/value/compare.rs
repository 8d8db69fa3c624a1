//! Schema-level equality and the canonical total order.
//!
//! `is_same` is THE equality definition used by the delta engine and the
//! sparse-default rule in every codec: a property whose two values are
//! `is_same` must never produce a delta, and vice versa.

use crate::value::Value;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Truncate a timestamp to whole seconds. Sub-second precision is never
/// stored, so equality and the wire formats both go through this.
#[must_use]
pub fn truncate_seconds(value: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(value.timestamp(), 0).unwrap_or(value)
}

/// Schema-level equality for two runtime values.
///
/// Differs from structural `PartialEq` where the storage format does:
/// timestamps compare at second precision, sets and bags compare without
/// order, maps compare in normalized key order. Cross-variant comparisons
/// are always unequal.
#[must_use]
pub fn is_same(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Timestamp(a), Value::Timestamp(b)) => a.timestamp() == b.timestamp(),
        (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),

        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_same(x, y))
        }

        (Value::Set(a), Value::Set(b)) | (Value::Bag(a), Value::Bag(b)) => multiset_same(a, b),

        (Value::Map(a), Value::Map(b)) => {
            let a = Value::normalize_map_entries(a.clone());
            let b = Value::normalize_map_entries(b.clone());
            a.len() == b.len()
                && a.iter()
                    .zip(&b)
                    .all(|((ak, av), (bk, bv))| is_same(ak, bk) && is_same(av, bv))
        }

        (Value::Object(a), Value::Object(b)) => {
            a.class_id() == b.class_id()
                && a.slots().len() == b.slots().len()
                && a.slots().iter().zip(b.slots()).all(|(x, y)| is_same(x, y))
        }

        _ => left == right,
    }
}

// Unordered equality with duplicates tracked individually: every element
// on the left consumes exactly one matching element on the right.
fn multiset_same(left: &[Value], right: &[Value]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    let mut matched = vec![false; right.len()];
    for item in left {
        let Some(slot) = right
            .iter()
            .enumerate()
            .position(|(i, candidate)| !matched[i] && is_same(item, candidate))
        else {
            return false;
        };
        matched[slot] = true;
    }

    true
}

/// Total canonical comparator.
///
/// Ordering rules:
/// 1. Canonical variant tag
/// 2. Variant-specific comparison for same-tagged values
///
/// Used wherever deterministic output is required independent of input
/// order: map normalization and set/bag delta ordering.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.tag().to_u8().cmp(&right.tag().to_u8());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_tag(left, right)
}

fn canonical_cmp_same_tag(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Uint(a), Value::Uint(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::Guid(a), Value::Guid(b)) => a.cmp(b),
        (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
        (Value::FloatArray(a), Value::FloatArray(b)) => cmp_floats(a, b),
        (Value::FloatGrid(a), Value::FloatGrid(b)) => a
            .rows()
            .cmp(&b.rows())
            .then_with(|| a.cols().cmp(&b.cols()))
            .then_with(|| cmp_floats(a.data(), b.data())),
        (Value::Id(a), Value::Id(b)) => a.cmp(b),
        (Value::Object(a), Value::Object(b)) => a
            .class_id()
            .cmp(&b.class_id())
            .then_with(|| cmp_values(a.slots(), b.slots())),
        (Value::List(a), Value::List(b))
        | (Value::Set(a), Value::Set(b))
        | (Value::Bag(a), Value::Bag(b)) => cmp_values(a, b),
        (Value::Map(a), Value::Map(b)) => cmp_entries(a, b),

        // Tags matched above; mixed pairs cannot reach here.
        _ => Ordering::Equal,
    }
}

fn cmp_floats(left: &[f64], right: &[f64]) -> Ordering {
    for (a, b) in left.iter().zip(right) {
        let cmp = a.total_cmp(b);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    left.len().cmp(&right.len())
}

fn cmp_values(left: &[Value], right: &[Value]) -> Ordering {
    for (a, b) in left.iter().zip(right) {
        let cmp = canonical_cmp(a, b);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    left.len().cmp(&right.len())
}

fn cmp_entries(left: &[(Value, Value)], right: &[(Value, Value)]) -> Ordering {
    for ((ak, av), (bk, bv)) in left.iter().zip(right) {
        let cmp = canonical_cmp(ak, bk).then_with(|| canonical_cmp(av, bv));
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    left.len().cmp(&right.len())
}
