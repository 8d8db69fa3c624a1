use crate::registry::PropertyMeta;
use metagraph_schema::types::TypeKind;
use serde::Serialize;
use std::fmt;

///
/// ClassId
///
/// Opaque handle to a registered class. Dense, assigned in registration
/// order, valid only against the registry that issued it.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

///
/// ClassMeta
///
/// Immutable metadata for one registered class: identity layout, type
/// kind, and the dense property table. Property indexes are the wire
/// positions used by every codec.
///

#[derive(Clone, Debug)]
pub struct ClassMeta {
    pub id: ClassId,
    pub name: String,
    /// Entity id baked into minted identities. Zero for components.
    pub entity_id: u16,
    pub kind: TypeKind,
    pub properties: Vec<PropertyMeta>,
    /// Property index of the primary key, for entities.
    pub primary_key: Option<u32>,
    /// Property indexes of the business key, in declaration order.
    pub business_key: Vec<u32>,
    /// Property indexes of the child key, for components matched inside
    /// component lists.
    pub child_key: Vec<u32>,
}

impl ClassMeta {
    #[must_use]
    pub fn property(&self, index: u32) -> Option<&PropertyMeta> {
        self.properties.get(index as usize)
    }

    #[must_use]
    pub fn property_by_name(&self, name: &str) -> Option<&PropertyMeta> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub const fn is_entity(&self) -> bool {
        self.kind.is_entity()
    }

    #[must_use]
    pub const fn is_component(&self) -> bool {
        self.kind.is_component()
    }

    /// Properties that are followable graph edges, in index order.
    pub fn cascade_properties(&self) -> impl Iterator<Item = &PropertyMeta> {
        self.properties.iter().filter(|p| p.is_cascade_edge())
    }
}
