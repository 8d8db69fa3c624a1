//! Graph-level validation.
//!
//! A validation pass reports every problem it finds; the batch becomes an
//! error only at the boundary that requires all-or-nothing acceptance.
//! Paths are dotted and indexed from the root instance, e.g.
//! `Orders[0].Lines[1].Sku`.

use crate::{
    error::{ErrorClass, ErrorOrigin, MetadataError},
    instance::Instance,
    registry::{ClassMeta, PropertyKind, PropertyMeta, Registry},
    value::{is_same, Value},
};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

///
/// ValidationIssue
///

#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

///
/// ValidationIssues
///
/// Flat batch of problems found in one pass, in visit order.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationIssues {
    issues: Vec<ValidationIssue>,
}

impl ValidationIssues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter()
    }

    /// Collapse into `Ok(())` when empty, `Err(self)` otherwise.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                writeln!(f)?;
            }
            if issue.path.is_empty() {
                write!(f, "{}", issue.message)?;
            } else {
                write!(f, "{}: {}", issue.path, issue.message)?;
            }
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationIssues {}

impl From<ValidationIssues> for MetadataError {
    fn from(issues: ValidationIssues) -> Self {
        Self::new(ErrorClass::Validation, ErrorOrigin::Walker, issues.to_string())
    }
}

/// Validate an instance and every inline object reachable over cascade
/// edges. Returns the full batch of problems, never just the first.
pub fn validate_graph(registry: &Registry, root: &Instance) -> Result<(), ValidationIssues> {
    let mut issues = ValidationIssues::new();
    let mut seen = HashSet::new();
    validate_instance(registry, root, "", &mut issues, &mut seen);

    issues.result()
}

fn validate_instance(
    registry: &Registry,
    instance: &Instance,
    path: &str,
    issues: &mut ValidationIssues,
    seen: &mut HashSet<u64>,
) {
    if !seen.insert(visit_key(registry, instance)) {
        return;
    }

    let meta = registry.class(instance.class_id());
    for property in &meta.properties {
        let Some(value) = instance.get(property.index) else {
            issues.add(path, format!("'{}' slot table too short", meta.name));
            continue;
        };
        let slot = join(path, &property.name);

        validate_slot(property, value, &slot, issues);

        match &property.kind {
            PropertyKind::Component(_) => {
                if let Value::Object(child) = value {
                    validate_instance(registry, child, &slot, issues, seen);
                }
            }
            PropertyKind::ComponentList(target) => {
                if let Value::List(items) = value {
                    validate_children(registry, items, &slot, issues, seen);
                    check_child_keys(registry.class(*target), items, &slot, issues);
                }
            }
            PropertyKind::Relation { .. } if property.is_cascade_edge() => match value {
                Value::Object(child) => validate_instance(registry, child, &slot, issues, seen),
                Value::List(items) => validate_children(registry, items, &slot, issues, seen),
                _ => {}
            },
            _ => {}
        }
    }
}

fn validate_children(
    registry: &Registry,
    items: &[Value],
    slot: &str,
    issues: &mut ValidationIssues,
    seen: &mut HashSet<u64>,
) {
    for (i, item) in items.iter().enumerate() {
        if let Value::Object(child) = item {
            validate_instance(registry, child, &format!("{slot}[{i}]"), issues, seen);
        }
    }
}

fn validate_slot(
    property: &PropertyMeta,
    value: &Value,
    slot: &str,
    issues: &mut ValidationIssues,
) {
    if value.is_null() {
        // Identity slots are filled when the graph is identified, not by
        // the caller; collections treat null as empty.
        let exempt = matches!(property.kind, PropertyKind::Identity)
            || property.kind.is_collection();
        if !property.nullable && !exempt {
            issues.add(slot, "required property is null");
        }
        return;
    }

    if let Some(max_len) = property.max_len {
        let len = match value {
            Value::Text(text) => Some(text.chars().count()),
            Value::Blob(bytes) => Some(bytes.len()),
            _ => None,
        };
        if let Some(len) = len
            && len > max_len
        {
            issues.add(slot, format!("length {len} exceeds maximum {max_len}"));
        }
    }

    if let PropertyKind::Enum(meta) = &property.kind
        && let Value::Enum(ordinal) = value
        && meta.name_of(*ordinal).is_none()
    {
        issues.add(
            slot,
            format!(
                "ordinal {ordinal} out of range for {} variants",
                meta.variants.len()
            ),
        );
    }
}

// Child keys identify component list elements; two elements with the same
// key would be indistinguishable to keyed diffing and to readers.
fn check_child_keys(
    target: &ClassMeta,
    items: &[Value],
    slot: &str,
    issues: &mut ValidationIssues,
) {
    if target.child_key.is_empty() {
        return;
    }

    let keys: Vec<Option<Vec<&Value>>> = items
        .iter()
        .map(|item| {
            let instance = item.as_object()?;
            target
                .child_key
                .iter()
                .map(|index| {
                    instance
                        .get(*index)
                        .filter(|value| !value.is_null())
                })
                .collect()
        })
        .collect();

    for (i, key) in keys.iter().enumerate() {
        let Some(key) = key else {
            issues.add(format!("{slot}[{i}]"), "null or missing child key");
            continue;
        };
        let duplicate = keys[..i].iter().flatten().any(|earlier| {
            earlier
                .iter()
                .zip(key)
                .all(|(&a, &b)| is_same(a, b))
        });
        if duplicate {
            issues.add(format!("{slot}[{i}]"), "duplicate child key");
        }
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

// Same dedup rule as the walker: stripped identity when present, address
// otherwise.
fn visit_key(registry: &Registry, instance: &Instance) -> u64 {
    let meta = registry.class(instance.class_id());
    match instance.pk(meta) {
        Some(id) if !id.is_zero() => id.strip_transient().raw(),
        _ => std::ptr::from_ref(instance) as u64,
    }
}
