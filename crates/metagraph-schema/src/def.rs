use crate::types::{Cascade, KeyRole, Relation, ScalarType, TypeKind};
use serde::{Deserialize, Serialize};

///
/// SchemaDef
///
/// The full declarative description handed to a registry build. Order of
/// entity defs is not significant; order of fields within a def is: a
/// field's position becomes its wire-format property index and may only
/// ever be appended to.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SchemaDef {
    pub entities: Vec<EntityDef>,
}

impl SchemaDef {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, def: EntityDef) -> Self {
        self.entities.push(def);
        self
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|def| def.name == name)
    }
}

///
/// EntityDef
///
/// Declarative description of one entity or component type.
/// `entity_id` is 0 for components and a stable nonzero value for
/// entities; it participates in the identity bit layout and the binary
/// wire format, so it must never be renumbered.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EntityDef {
    pub name: String,
    pub entity_id: u16,
    pub kind: TypeKind,
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    #[must_use]
    pub fn root_entity(name: impl Into<String>, entity_id: u16) -> Self {
        Self {
            name: name.into(),
            entity_id,
            kind: TypeKind::RootEntity,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn child_entity(name: impl Into<String>, entity_id: u16) -> Self {
        Self {
            name: name.into(),
            entity_id,
            kind: TypeKind::ChildEntity,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn component(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_id: 0,
            kind: TypeKind::Component,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The declared primary key field, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|field| field.role == KeyRole::Primary)
    }

    /// Declared child-key fields, in field order.
    pub fn child_key(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields
            .iter()
            .filter(|field| field.role == KeyRole::Child)
    }
}

///
/// FieldDef
///
/// One declared property: value type, nullability, key role, cascade
/// strength, and an optional length bound for text/blob validation.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
    pub nullable: bool,
    pub unique: bool,
    pub role: KeyRole,
    pub cascade: Cascade,
    pub max_len: Option<usize>,
}

impl FieldDef {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            unique: false,
            role: KeyRole::None,
            cascade: Cascade::None,
            max_len: None,
        }
    }

    /// The conventional primary key field: a non-null identity slot.
    #[must_use]
    pub fn primary_key(name: impl Into<String>) -> Self {
        let mut field = Self::new(name, FieldType::Identity);
        field.role = KeyRole::Primary;
        field
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn role(mut self, role: KeyRole) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub const fn cascade(mut self, cascade: Cascade) -> Self {
        self.cascade = cascade;
        self
    }

    #[must_use]
    pub const fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

///
/// FieldType
///
/// Declared value type of a field. Component and relation targets are
/// named here and resolved to concrete metadata during the registry's
/// cross-type pass.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FieldType {
    // Scalar primitives
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Blob,
    Timestamp,
    Date,
    Guid,
    /// The entity's own 64-bit identity. Only valid as a primary key.
    Identity,

    // Fixed-shape numeric payloads
    FloatArray,
    FloatGrid,

    /// Closed set of named variants; the wire form is the ordinal.
    Enum(Vec<String>),

    // Object-valued
    Component(String),
    ComponentList(String),
    Relation { relation: Relation, target: String },

    // Scalar collections
    List(ScalarType),
    Set(ScalarType),
    Map(ScalarType, ScalarType),
    Bag(ScalarType),
}

impl FieldType {
    /// Whether the declared type carries another declared type by name.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Component(target)
            | Self::ComponentList(target)
            | Self::Relation { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Whether values of this type are collections.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::ComponentList(_)
                | Self::List(_)
                | Self::Set(_)
                | Self::Map(..)
                | Self::Bag(_)
        ) || matches!(
            self,
            Self::Relation { relation, .. } if relation.is_many()
        )
    }
}
