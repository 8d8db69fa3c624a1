//! Strict delta application.
//!
//! Every edit verifies the recorded old value against the current state
//! before touching it. A mismatch aborts with the slot untouched from the
//! caller's perspective only per-edit; callers wanting all-or-nothing
//! apply against a clone.

use crate::{
    delta::{BagItemDelta, Delta, ListItemDelta, MapItemDelta, ObjectDelta, SetItemDelta},
    error::MetadataError,
    instance::Instance,
    registry::Registry,
    value::{is_same, Value},
};

/// Apply a delta produced by `create_delta` onto an instance.
pub fn apply_delta(
    registry: &Registry,
    instance: &mut Instance,
    delta: &Delta,
) -> Result<(), MetadataError> {
    match delta {
        Delta::Object(object) => apply_object(registry, instance, object),
        _ => Err(MetadataError::delta_mismatch(
            "an instance delta must be an object delta",
        )),
    }
}

fn apply_object(
    registry: &Registry,
    instance: &mut Instance,
    delta: &ObjectDelta,
) -> Result<(), MetadataError> {
    let meta_name = registry.class(instance.class_id()).name.clone();
    for (index, entry) in &delta.entries {
        let slot = instance.get_mut(*index).ok_or_else(|| {
            MetadataError::delta_mismatch(format!(
                "property index {index} out of range for '{meta_name}'"
            ))
        })?;
        apply_value(registry, slot, entry)?;
    }

    Ok(())
}

fn apply_value(
    registry: &Registry,
    value: &mut Value,
    delta: &Delta,
) -> Result<(), MetadataError> {
    match delta {
        Delta::Scalar(scalar) => {
            if !is_same(value, &scalar.old) {
                return Err(stale("scalar"));
            }
            *value = scalar.new.clone();
            Ok(())
        }
        Delta::Object(object) => match value {
            Value::Object(instance) => apply_object(registry, instance, object),
            _ => Err(MetadataError::delta_mismatch(
                "object delta against a non-object value",
            )),
        },
        Delta::List(items) => apply_list(registry, value, items),
        Delta::Set(items) => apply_set(value, items),
        Delta::Map(items) => apply_map(registry, value, items),
        Delta::Bag(items) => apply_bag(value, items),
    }
}

// Removals by old index descending, additions by new index ascending,
// content changes at new indices last.
fn apply_list(
    registry: &Registry,
    value: &mut Value,
    items: &[ListItemDelta],
) -> Result<(), MetadataError> {
    let elements = match value {
        Value::List(elements) => elements,
        Value::Null => {
            *value = Value::List(Vec::new());
            let Value::List(elements) = value else {
                unreachable!("just assigned a list");
            };
            elements
        }
        _ => {
            return Err(MetadataError::delta_mismatch(
                "list delta against a non-list value",
            ));
        }
    };

    let mut removals: Vec<(usize, &Value)> = items
        .iter()
        .filter_map(|item| match item {
            ListItemDelta::Removed { index, value } => Some((*index, value)),
            _ => None,
        })
        .collect();
    removals.sort_by(|a, b| b.0.cmp(&a.0));
    for (index, old) in removals {
        let current = elements.get(index).ok_or_else(|| stale("list removal"))?;
        if !is_same(current, old) {
            return Err(stale("list removal"));
        }
        elements.remove(index);
    }

    let mut additions: Vec<(usize, &Value)> = items
        .iter()
        .filter_map(|item| match item {
            ListItemDelta::Added { index, value } => Some((*index, value)),
            _ => None,
        })
        .collect();
    additions.sort_by_key(|(index, _)| *index);
    for (index, new) in additions {
        if index > elements.len() {
            return Err(stale("list insertion"));
        }
        elements.insert(index, new.clone());
    }

    for item in items {
        if let ListItemDelta::Changed { index, delta } = item {
            let slot = elements
                .get_mut(*index)
                .ok_or_else(|| stale("list change"))?;
            apply_value(registry, slot, delta)?;
        }
    }

    Ok(())
}

fn apply_set(value: &mut Value, items: &[SetItemDelta]) -> Result<(), MetadataError> {
    if value.is_null() {
        *value = Value::Set(Vec::new());
    }
    let Value::Set(elements) = value else {
        return Err(MetadataError::delta_mismatch(
            "set delta against a non-set value",
        ));
    };

    for item in items {
        match item {
            SetItemDelta::Removed(target) => {
                let position = elements
                    .iter()
                    .position(|candidate| is_same(candidate, target))
                    .ok_or_else(|| stale("set removal"))?;
                elements.remove(position);
            }
            SetItemDelta::Added(target) => {
                if elements.iter().any(|candidate| is_same(candidate, target)) {
                    return Err(stale("set insertion"));
                }
                elements.push(target.clone());
            }
        }
    }

    Ok(())
}

fn apply_bag(value: &mut Value, items: &[BagItemDelta]) -> Result<(), MetadataError> {
    if value.is_null() {
        *value = Value::Bag(Vec::new());
    }
    let Value::Bag(elements) = value else {
        return Err(MetadataError::delta_mismatch(
            "bag delta against a non-bag value",
        ));
    };

    for item in items {
        match item {
            BagItemDelta::Removed(target) => {
                let position = elements
                    .iter()
                    .position(|candidate| is_same(candidate, target))
                    .ok_or_else(|| stale("bag removal"))?;
                elements.remove(position);
            }
            BagItemDelta::Added(target) => elements.push(target.clone()),
        }
    }

    Ok(())
}

fn apply_map(
    registry: &Registry,
    value: &mut Value,
    items: &[MapItemDelta],
) -> Result<(), MetadataError> {
    if value.is_null() {
        *value = Value::Map(Vec::new());
    }
    let Value::Map(entries) = value else {
        return Err(MetadataError::delta_mismatch(
            "map delta against a non-map value",
        ));
    };

    for item in items {
        match item {
            MapItemDelta::Removed { key, value: old } => {
                let position = entries
                    .iter()
                    .position(|(k, _)| is_same(k, key))
                    .ok_or_else(|| stale("map removal"))?;
                if !is_same(&entries[position].1, old) {
                    return Err(stale("map removal"));
                }
                entries.remove(position);
            }
            MapItemDelta::Added { key, value: new } => {
                if entries.iter().any(|(k, _)| is_same(k, key)) {
                    return Err(stale("map insertion"));
                }
                entries.push((key.clone(), new.clone()));
            }
            MapItemDelta::Changed { key, delta } => {
                let entry = entries
                    .iter_mut()
                    .find(|(k, _)| is_same(k, key))
                    .ok_or_else(|| stale("map change"))?;
                apply_value(registry, &mut entry.1, delta)?;
            }
        }
    }

    *entries = Value::normalize_map_entries(std::mem::take(entries));

    Ok(())
}

fn stale(edit: &str) -> MetadataError {
    MetadataError::delta_mismatch(format!(
        "{edit} does not match the current state; delta is stale"
    ))
}
