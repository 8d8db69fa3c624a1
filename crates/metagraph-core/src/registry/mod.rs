mod build;
mod class;
mod property;

#[cfg(test)]
mod tests;

use crate::{
    dispatch::CodecDispatch,
    error::MetadataError,
    identity::{IdAllocator, Oid},
    instance::Instance,
    value::Value,
};
use metagraph_schema::def::SchemaDef;
use std::collections::HashMap;

// re-exports
pub use class::{ClassId, ClassMeta};
pub use property::{EnumMeta, PropertyKind, PropertyMeta};

pub(crate) use property::{scalar_accepts, scalar_element_tag};

///
/// Registry
///
/// The compiled, immutable metadata universe: every class, every property
/// table, one identity allocator per entity type, and the codec dispatch
/// tables. Built once from a validated `SchemaDef`; all runtime layers
/// (codecs, delta engine, walker, validation) borrow it read-only.
///

#[derive(Debug)]
pub struct Registry {
    classes: Vec<ClassMeta>,
    by_name: HashMap<String, ClassId>,
    by_entity_id: HashMap<u16, ClassId>,
    id_sources: Vec<Option<IdAllocator>>,
    dispatch: CodecDispatch,
}

impl Registry {
    /// Compile a schema into a registry. Fails with the full batched
    /// validation report when the schema is inconsistent.
    pub fn build(def: &SchemaDef) -> Result<Self, MetadataError> {
        let classes = build::build_classes(def)?;

        let mut by_name = HashMap::with_capacity(classes.len());
        let mut by_entity_id = HashMap::new();
        let mut id_sources = Vec::with_capacity(classes.len());

        for class in &classes {
            by_name.insert(class.name.clone(), class.id);
            if class.is_entity() {
                by_entity_id.insert(class.entity_id, class.id);
                id_sources.push(Some(IdAllocator::new(class.entity_id)));
            } else {
                id_sources.push(None);
            }
        }

        log::debug!(
            "registry built: {} classes, {} entity types",
            classes.len(),
            by_entity_id.len()
        );

        Ok(Self {
            classes,
            by_name,
            by_entity_id,
            id_sources,
            dispatch: CodecDispatch::new(),
        })
    }

    ///
    /// LOOKUP
    ///

    /// Metadata for a class id issued by this registry.
    #[must_use]
    pub fn class(&self, id: ClassId) -> &ClassMeta {
        &self.classes[id.index()]
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ClassMeta> {
        self.by_name.get(name).map(|id| self.class(*id))
    }

    pub fn expect(&self, name: &str) -> Result<&ClassMeta, MetadataError> {
        self.find(name)
            .ok_or_else(|| MetadataError::registry_config(format!("unknown type '{name}'")))
    }

    #[must_use]
    pub fn find_by_entity_id(&self, entity_id: u16) -> Option<&ClassMeta> {
        self.by_entity_id.get(&entity_id).map(|id| self.class(*id))
    }

    pub fn expect_entity_id(&self, entity_id: u16) -> Result<&ClassMeta, MetadataError> {
        self.find_by_entity_id(entity_id).ok_or_else(|| {
            MetadataError::registry_config(format!("unknown entity id {entity_id}"))
        })
    }

    /// All registered classes, in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassMeta> {
        self.classes.iter()
    }

    /// The codec dispatch tables.
    #[must_use]
    pub const fn dispatch(&self) -> &CodecDispatch {
        &self.dispatch
    }

    ///
    /// INSTANCES
    ///

    /// Create a blank instance of a class: every slot holds its declared
    /// default, the primary key is unassigned.
    #[must_use]
    pub fn create(&self, id: ClassId) -> Instance {
        let meta = self.class(id);
        let slots = meta.properties.iter().map(|p| p.default.clone()).collect();

        Instance::new(id, slots)
    }

    /// Create a blank instance by type name.
    pub fn create_named(&self, name: &str) -> Result<Instance, MetadataError> {
        Ok(self.create(self.expect(name)?.id))
    }

    /// Read a slot by property name.
    pub fn get_value<'a>(
        &self,
        instance: &'a Instance,
        name: &str,
    ) -> Result<&'a Value, MetadataError> {
        let meta = self.class(instance.class_id());
        let property = meta.property_by_name(name).ok_or_else(|| {
            MetadataError::registry_config(format!("'{}' has no property '{name}'", meta.name))
        })?;

        instance.get(property.index).ok_or_else(|| {
            MetadataError::registry_config(format!("'{}' slot table too short", meta.name))
        })
    }

    /// Write a slot by property name, after a value shape check.
    pub fn set_value(
        &self,
        instance: &mut Instance,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), MetadataError> {
        let meta = self.class(instance.class_id());
        let property = meta.property_by_name(name).ok_or_else(|| {
            MetadataError::registry_config(format!("'{}' has no property '{name}'", meta.name))
        })?;

        let value = value.into();
        if !property.kind.accepts(&value) {
            return Err(MetadataError::registry_config(format!(
                "value kind '{}' not accepted by '{}.{}'",
                value.tag().label(),
                meta.name,
                property.name
            )));
        }

        instance.set_raw(property.index, value);

        Ok(())
    }

    ///
    /// IDENTITY
    ///

    /// The identity allocator for an entity class.
    pub fn allocator(&self, id: ClassId) -> Result<&IdAllocator, MetadataError> {
        self.id_sources[id.index()].as_ref().ok_or_else(|| {
            MetadataError::identity(format!(
                "component type '{}' has no identity source",
                self.class(id).name
            ))
        })
    }

    /// Mint one transient id for an entity class.
    pub fn mint(&self, id: ClassId) -> Result<Oid, MetadataError> {
        self.allocator(id)?.mint()
    }

    ///
    /// COMPARISON
    ///

    /// Schema-level equality routed through the compare dispatch table
    /// for scalar values. Structural values fall back to the canonical
    /// walk, which itself treats nested scalars canonically.
    pub fn same(&self, left: &Value, right: &Value) -> Result<bool, MetadataError> {
        let tag = left.tag();
        if tag == right.tag() && tag.is_scalar() {
            let ops = self.dispatch.compare.resolve(tag)?;
            return Ok((ops.same)(left, right));
        }

        Ok(crate::value::is_same(left, right))
    }
}
