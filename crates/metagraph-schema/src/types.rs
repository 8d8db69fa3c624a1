use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// TypeKind
///
/// The persistence role a declared type plays. Entities carry their own
/// 64-bit identity; components are owned value objects identified only
/// relative to their owner.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum TypeKind {
    RootEntity,
    ChildEntity,
    Component,
}

impl TypeKind {
    #[must_use]
    pub const fn is_entity(self) -> bool {
        matches!(self, Self::RootEntity | Self::ChildEntity)
    }

    #[must_use]
    pub const fn is_component(self) -> bool {
        matches!(self, Self::Component)
    }
}

///
/// Relation
///
/// Declared shape of a reference edge between two entity types.
/// One-to-many and many-to-many edges hold a collection of targets.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum Relation {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Relation {
    /// Whether the edge carries a collection of targets rather than one.
    #[must_use]
    pub const fn is_many(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

///
/// Cascade
///
/// Ownership/relation strength for a declared edge. Governs which related
/// objects the graph walker follows during save, delete, and identity
/// assignment.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum Cascade {
    #[default]
    None,
    SaveUpdate,
    All,
    AllDeleteOrphan,
}

impl Cascade {
    /// Whether the edge denotes strict ownership of the target subtree.
    #[must_use]
    pub const fn is_owned(self) -> bool {
        matches!(self, Self::All | Self::AllDeleteOrphan)
    }

    /// Whether the walker follows this edge at all.
    #[must_use]
    pub const fn is_followed(self) -> bool {
        !matches!(self, Self::None)
    }
}

///
/// KeyRole
///
/// Key participation of a declared field. `Child` keys identify a
/// component relative to its owner across graph snapshots.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum KeyRole {
    #[default]
    None,
    Primary,
    Business,
    Child,
}

///
/// ScalarType
///
/// Element type for value collections (list/set/map/bag). Collections of
/// components or references are declared through their own field types,
/// never through a scalar element.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ScalarType {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Timestamp,
    Date,
    Guid,
}
