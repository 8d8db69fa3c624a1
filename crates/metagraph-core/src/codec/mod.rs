//! The three interchangeable record codecs.
//!
//! All three share the same record semantics over different carriers:
//! sparse properties (a slot equal to its declared default is omitted and
//! reset on read), references written as identities and never chased, and
//! components inlined by value. Scalar leaf handling is routed through
//! the registry's dispatch tables; the record walk itself lives here.

pub mod binary;
pub mod json;
pub mod xml;

use crate::{
    error::MetadataError,
    identity::Oid,
    instance::Instance,
    registry::{ClassMeta, PropertyMeta, Registry},
    value::Value,
};
use std::collections::HashMap;

///
/// Resolver
///
/// Supplies the base instance a decoded entity record is applied onto.
/// A store-backed implementation returns the persisted instance so the
/// sparse record acts as an overlay; `FreshResolver` starts from blank.
///

pub trait Resolver {
    fn resolve(&mut self, id: Oid, meta: &ClassMeta) -> Result<Instance, MetadataError>;
}

///
/// FreshResolver
///
/// Resolves every id to a blank instance of the class with the primary
/// key pre-assigned. The right choice when decoding into empty state.
///

pub struct FreshResolver<'a> {
    registry: &'a Registry,
}

impl<'a> FreshResolver<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }
}

impl Resolver for FreshResolver<'_> {
    fn resolve(&mut self, id: Oid, meta: &ClassMeta) -> Result<Instance, MetadataError> {
        let mut instance = self.registry.create(meta.id);
        instance.set_pk(meta, id)?;

        Ok(instance)
    }
}

///
/// ObjectGraph
///
/// The decoded result of a multi-record stream: entity instances in
/// stream order, addressable by identity. Ids are keyed with the
/// transient flag stripped so a transient reference written before the
/// persisted form still resolves.
///

#[derive(Debug, Default)]
pub struct ObjectGraph {
    instances: Vec<Instance>,
    by_id: HashMap<u64, usize>,
}

impl ObjectGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, registry: &Registry, instance: Instance) {
        if let Some(id) = instance.pk(registry.class(instance.class_id())) {
            self.by_id
                .insert(id.strip_transient().raw(), self.instances.len());
        }
        self.instances.push(instance);
    }

    #[must_use]
    pub fn get(&self, id: Oid) -> Option<&Instance> {
        self.by_id
            .get(&id.strip_transient().raw())
            .map(|i| &self.instances[*i])
    }

    #[must_use]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    #[must_use]
    pub fn into_instances(self) -> Vec<Instance> {
        self.instances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The first decoded instance, by convention the graph root.
    #[must_use]
    pub fn root(&self) -> Option<&Instance> {
        self.instances.first()
    }
}

/// The assigned primary key of an entity instance. A zero id means the
/// instance was never identified; writing one is fatal.
pub(crate) fn assigned_pk(meta: &ClassMeta, instance: &Instance) -> Result<Oid, MetadataError> {
    instance.pk(meta).filter(|id| !id.is_zero()).ok_or_else(|| {
        MetadataError::codec_encoding(format!(
            "unidentified '{}' instance cannot be serialized",
            meta.name
        ))
    })
}

/// The identity a reference slot serializes as. Inline cascade-owned
/// objects are reduced to their primary key; the object body travels as
/// its own record.
pub(crate) fn reference_id(
    registry: &Registry,
    property: &PropertyMeta,
    value: &Value,
) -> Result<Oid, MetadataError> {
    match value {
        Value::Id(id) => Ok(*id),
        Value::Object(instance) => {
            let meta = registry.class(instance.class_id());
            instance.pk(meta).filter(|id| !id.is_zero()).ok_or_else(|| {
                MetadataError::codec_encoding(format!(
                    "unidentified '{}' object in reference slot '{}'",
                    meta.name, property.name
                ))
            })
        }
        other => Err(MetadataError::codec_encoding(format!(
            "value kind '{}' in reference slot '{}'",
            other.tag().label(),
            property.name
        ))),
    }
}

/// Collect the serialized form of a to-many reference slot: one identity
/// per element, inline objects reduced to their keys.
pub(crate) fn reference_ids(
    registry: &Registry,
    property: &PropertyMeta,
    value: &Value,
) -> Result<Vec<Oid>, MetadataError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(items) => items
            .iter()
            .map(|item| reference_id(registry, property, item))
            .collect(),
        other => Err(MetadataError::codec_encoding(format!(
            "value kind '{}' in to-many reference slot '{}'",
            other.tag().label(),
            property.name
        ))),
    }
}

/// Whether a slot is omitted from a sparse record.
pub(crate) fn is_default(registry: &Registry, property: &PropertyMeta, value: &Value) -> bool {
    registry
        .same(value, &property.default)
        .unwrap_or(false)
}

/// Reset every property the record did not mention back to its default.
/// Sparse records are total: absence means default, not "unchanged".
pub(crate) fn reset_unseen(meta: &ClassMeta, instance: &mut Instance, seen: &[bool]) {
    for property in &meta.properties {
        if !seen[property.index as usize] && meta.primary_key != Some(property.index) {
            instance.set_raw(property.index, property.default.clone());
        }
    }
}
