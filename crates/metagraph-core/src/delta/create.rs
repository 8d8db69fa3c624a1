//! Delta construction.

use crate::{
    delta::{
        key::{is_keyed, ObjectKey},
        lcs::{align, Align},
        BagItemDelta, Delta, ListItemDelta, MapItemDelta, ObjectDelta, ScalarDelta, SetItemDelta,
    },
    error::MetadataError,
    instance::Instance,
    registry::{PropertyKind, Registry},
    value::{canonical_cmp, is_same, Value},
};

/// Diff two instances of the same class. Returns `None` when nothing
/// differs at schema-level equality.
pub fn create_delta(
    registry: &Registry,
    old: &Instance,
    new: &Instance,
) -> Result<Option<Delta>, MetadataError> {
    Ok(instance_delta(registry, old, new)?.map(Delta::Object))
}

fn instance_delta(
    registry: &Registry,
    old: &Instance,
    new: &Instance,
) -> Result<Option<ObjectDelta>, MetadataError> {
    if old.class_id() != new.class_id() {
        let old_name = &registry.class(old.class_id()).name;
        let new_name = &registry.class(new.class_id()).name;
        return Err(MetadataError::delta_mismatch(format!(
            "cannot diff '{old_name}' against '{new_name}'"
        )));
    }

    let meta = registry.class(old.class_id());
    let mut entries = Vec::new();
    for property in &meta.properties {
        let old_value = old.get(property.index).ok_or_else(|| {
            MetadataError::delta_mismatch(format!("'{}' slot table too short", meta.name))
        })?;
        let new_value = new.get(property.index).ok_or_else(|| {
            MetadataError::delta_mismatch(format!("'{}' slot table too short", meta.name))
        })?;

        if let Some(delta) = property_delta(registry, &property.kind, old_value, new_value)? {
            entries.push((property.index, delta));
        }
    }

    Ok(if entries.is_empty() {
        None
    } else {
        Some(ObjectDelta { entries })
    })
}

fn property_delta(
    registry: &Registry,
    kind: &PropertyKind,
    old: &Value,
    new: &Value,
) -> Result<Option<Delta>, MetadataError> {
    match kind {
        PropertyKind::Component(_) => element_delta(registry, old, new),
        PropertyKind::ComponentList(_) => list_delta(registry, elements(old), elements(new)),
        PropertyKind::Relation { relation, .. } => {
            if relation.is_many() {
                list_delta(registry, elements(old), elements(new))
            } else {
                element_delta(registry, old, new)
            }
        }
        PropertyKind::List(_) => list_delta(registry, elements(old), elements(new)),
        PropertyKind::Set(_) => Ok(set_delta(elements(old), elements(new))),
        PropertyKind::Bag(_) => Ok(bag_delta(elements(old), elements(new))),
        PropertyKind::Map(..) => Ok(map_delta(map_entries(old), map_entries(new))),
        _ => {
            if registry.same(old, new)? {
                Ok(None)
            } else {
                Ok(Some(scalar(old, new)))
            }
        }
    }
}

/// Diff one value pair outside any property context: inline objects of
/// the same class diff structurally, everything else by replacement.
pub(crate) fn element_delta(
    registry: &Registry,
    old: &Value,
    new: &Value,
) -> Result<Option<Delta>, MetadataError> {
    if let (Value::Object(old_obj), Value::Object(new_obj)) = (old, new)
        && old_obj.class_id() == new_obj.class_id()
    {
        return Ok(instance_delta(registry, old_obj, new_obj)?.map(Delta::Object));
    }

    if is_same(old, new) {
        Ok(None)
    } else {
        Ok(Some(scalar(old, new)))
    }
}

fn list_delta(
    registry: &Registry,
    old: &[Value],
    new: &[Value],
) -> Result<Option<Delta>, MetadataError> {
    // Keyed alignment when every element carries an identity or child
    // key; positional alignment otherwise.
    let has_elements = !old.is_empty() || !new.is_empty();
    let all_keyed = has_elements && old.iter().chain(new).all(is_keyed);

    let mut items = Vec::new();
    if all_keyed {
        let old_keys = keys_of(registry, old)?;
        let new_keys = keys_of(registry, new)?;
        let steps = align(&old_keys, &new_keys, ObjectKey::matches);

        for step in steps {
            match step {
                Align::Match { old: i, new: j } => {
                    if let Some(delta) = element_delta(registry, &old[i], &new[j])? {
                        items.push(ListItemDelta::Changed { index: j, delta });
                    }
                }
                Align::Insert { new: j } => items.push(ListItemDelta::Added {
                    index: j,
                    value: new[j].clone(),
                }),
                Align::Remove { old: i } => items.push(ListItemDelta::Removed {
                    index: i,
                    value: old[i].clone(),
                }),
            }
        }
    } else {
        for step in align(old, new, is_same) {
            match step {
                Align::Match { .. } => {}
                Align::Insert { new: j } => items.push(ListItemDelta::Added {
                    index: j,
                    value: new[j].clone(),
                }),
                Align::Remove { old: i } => items.push(ListItemDelta::Removed {
                    index: i,
                    value: old[i].clone(),
                }),
            }
        }
    }

    Ok(if items.is_empty() {
        None
    } else {
        Some(Delta::List(items))
    })
}

// Membership diff in canonical order so equal inputs in any order yield
// the same delta.
fn set_delta(old: &[Value], new: &[Value]) -> Option<Delta> {
    let (removed, added) = unmatched(old, new);

    let mut removed: Vec<&Value> = removed;
    let mut added: Vec<&Value> = added;
    removed.sort_by(|a, b| canonical_cmp(a, b));
    added.sort_by(|a, b| canonical_cmp(a, b));

    let items: Vec<SetItemDelta> = removed
        .into_iter()
        .map(|value| SetItemDelta::Removed(value.clone()))
        .chain(added.into_iter().map(|value| SetItemDelta::Added(value.clone())))
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(Delta::Set(items))
    }
}

// Bags keep encounter order: duplicates pair up first-come first-served.
fn bag_delta(old: &[Value], new: &[Value]) -> Option<Delta> {
    let (removed, added) = unmatched(old, new);

    let items: Vec<BagItemDelta> = removed
        .into_iter()
        .map(|value| BagItemDelta::Removed(value.clone()))
        .chain(added.into_iter().map(|value| BagItemDelta::Added(value.clone())))
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(Delta::Bag(items))
    }
}

// Greedy first-unmatched pairing. Each old element consumes at most one
// matching new element; the leftovers on either side are the edits.
fn unmatched<'v>(old: &'v [Value], new: &'v [Value]) -> (Vec<&'v Value>, Vec<&'v Value>) {
    let mut taken = vec![false; new.len()];
    let mut removed = Vec::new();

    for item in old {
        let slot = new
            .iter()
            .enumerate()
            .position(|(i, candidate)| !taken[i] && is_same(item, candidate));
        match slot {
            Some(i) => taken[i] = true,
            None => removed.push(item),
        }
    }

    let added = new
        .iter()
        .enumerate()
        .filter(|(i, _)| !taken[*i])
        .map(|(_, value)| value)
        .collect();

    (removed, added)
}

fn map_delta(old: &[(Value, Value)], new: &[(Value, Value)]) -> Option<Delta> {
    let old = Value::normalize_map_entries(old.to_vec());
    let new = Value::normalize_map_entries(new.to_vec());

    let mut items = Vec::new();
    for (key, old_value) in &old {
        match new.iter().find(|(k, _)| is_same(k, key)) {
            None => items.push(MapItemDelta::Removed {
                key: key.clone(),
                value: old_value.clone(),
            }),
            Some((_, new_value)) if !is_same(old_value, new_value) => {
                items.push(MapItemDelta::Changed {
                    key: key.clone(),
                    delta: Box::new(scalar(old_value, new_value)),
                });
            }
            Some(_) => {}
        }
    }
    for (key, new_value) in &new {
        if !old.iter().any(|(k, _)| is_same(k, key)) {
            items.push(MapItemDelta::Added {
                key: key.clone(),
                value: new_value.clone(),
            });
        }
    }

    if items.is_empty() {
        None
    } else {
        Some(Delta::Map(items))
    }
}

fn keys_of(registry: &Registry, values: &[Value]) -> Result<Vec<ObjectKey>, MetadataError> {
    values
        .iter()
        .map(|value| ObjectKey::of(registry, value))
        .collect()
}

fn elements(value: &Value) -> &[Value] {
    value.as_elements().map_or(&[], Vec::as_slice)
}

fn map_entries(value: &Value) -> &[(Value, Value)] {
    value.as_map_entries().map_or(&[], Vec::as_slice)
}

fn scalar(old: &Value, new: &Value) -> Delta {
    Delta::Scalar(ScalarDelta {
        old: old.clone(),
        new: new.clone(),
    })
}
