//! Alignment keys for object-valued list elements.

use crate::{
    error::MetadataError,
    instance::Instance,
    registry::Registry,
    value::{is_same, Value},
};

///
/// ObjectKey
///
/// The matching key of one list element. Entities match by stripped
/// identity; components match by their declared child key values.
///

#[derive(Clone, Debug)]
pub(crate) enum ObjectKey {
    Entity(u64),
    Component(Vec<Value>),
    /// An identity reference rather than an inline object.
    Reference(u64),
}

impl ObjectKey {
    pub(crate) fn of(registry: &Registry, value: &Value) -> Result<Self, MetadataError> {
        match value {
            Value::Id(id) => Ok(Self::Reference(id.strip_transient().raw())),
            Value::Object(instance) => Self::of_instance(registry, instance),
            other => Err(MetadataError::delta_key(format!(
                "value kind '{}' has no alignment key",
                other.tag().label()
            ))),
        }
    }

    fn of_instance(registry: &Registry, instance: &Instance) -> Result<Self, MetadataError> {
        let meta = registry.class(instance.class_id());

        if meta.is_entity() {
            let id = instance.pk(meta).filter(|id| !id.is_zero()).ok_or_else(|| {
                MetadataError::delta_key(format!(
                    "unidentified '{}' instance cannot be aligned",
                    meta.name
                ))
            })?;
            return Ok(Self::Entity(id.strip_transient().raw()));
        }

        let mut parts = Vec::with_capacity(meta.child_key.len());
        for index in &meta.child_key {
            let value = instance.get(*index).ok_or_else(|| {
                MetadataError::delta_key(format!("'{}' slot table too short", meta.name))
            })?;
            if value.is_null() {
                let name = meta
                    .property(*index)
                    .map_or("?", |property| property.name.as_str());
                return Err(MetadataError::delta_key(format!(
                    "null child key '{}.{name}'",
                    meta.name
                )));
            }
            parts.push(value.clone());
        }
        if parts.is_empty() {
            return Err(MetadataError::delta_key(format!(
                "'{}' declares no child key",
                meta.name
            )));
        }

        Ok(Self::Component(parts))
    }

    pub(crate) fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Entity(a), Self::Entity(b))
            | (Self::Reference(a), Self::Reference(b))
            | (Self::Entity(a), Self::Reference(b))
            | (Self::Reference(a), Self::Entity(b)) => a == b,
            (Self::Component(a), Self::Component(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_same(x, y))
            }
            _ => false,
        }
    }
}

/// Whether a list element participates in keyed alignment.
pub(crate) fn is_keyed(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Id(_))
}
