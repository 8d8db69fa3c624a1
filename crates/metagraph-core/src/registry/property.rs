use crate::{
    registry::ClassId,
    value::{FloatGrid, Value, ValueTag},
};
use chrono::{DateTime, NaiveDate};
use metagraph_schema::types::{Cascade, KeyRole, Relation, ScalarType};
use uuid::Uuid;

///
/// PropertyMeta
///
/// Descriptor for one declared property. Built once during registration
/// and immutable thereafter. `index` is the wire-format position: dense,
/// stable for the process lifetime, append-only.
///

#[derive(Clone, Debug)]
pub struct PropertyMeta {
    pub name: String,
    pub index: u32,
    pub kind: PropertyKind,
    pub nullable: bool,
    pub unique: bool,
    pub role: KeyRole,
    pub cascade: Cascade,
    pub max_len: Option<usize>,
    /// The declared default; a slot equal to this is omitted from
    /// serialized records.
    pub default: Value,
}

impl PropertyMeta {
    /// Whether this property is an edge the graph walker can follow.
    /// Component properties are owned by definition; relations only when
    /// a cascade is declared.
    #[must_use]
    pub const fn is_cascade_edge(&self) -> bool {
        match self.kind {
            PropertyKind::Component(_) | PropertyKind::ComponentList(_) => true,
            PropertyKind::Relation { .. } => self.cascade.is_followed(),
            _ => false,
        }
    }

    /// Whether the edge strictly owns its target subtree.
    #[must_use]
    pub const fn is_owned_edge(&self) -> bool {
        match self.kind {
            PropertyKind::Component(_) | PropertyKind::ComponentList(_) => true,
            PropertyKind::Relation { .. } => self.cascade.is_owned(),
            _ => false,
        }
    }
}

///
/// PropertyKind
///
/// Closed descriptor of a property's value shape. Each variant supports
/// the same four operation families (get/set, compare, delta, and codec
/// read/write): the first through slot typing, the rest through dispatch
/// on the scalar tag plus structural walks in the codecs and the delta
/// engine. Adding a kind means adding one variant here plus its dispatch
/// entries; codec record logic stays untouched.
///

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyKind {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Blob,
    Timestamp,
    Date,
    Guid,
    /// The record's own 64-bit identity; only valid as the primary key.
    Identity,
    FloatArray,
    FloatGrid,
    Enum(EnumMeta),
    Component(ClassId),
    ComponentList(ClassId),
    Relation {
        relation: Relation,
        target: ClassId,
    },
    List(ScalarType),
    Set(ScalarType),
    Map(ScalarType, ScalarType),
    Bag(ScalarType),
}

impl PropertyKind {
    /// The dispatch tag for the property's underlying scalar element, if
    /// it has one. Structural kinds (components, relations, collections)
    /// return `None` and are walked by the codecs directly.
    #[must_use]
    pub const fn scalar_tag(&self) -> Option<ValueTag> {
        Some(match self {
            Self::Bool => ValueTag::Bool,
            Self::Int => ValueTag::Int,
            Self::Uint => ValueTag::Uint,
            Self::Float => ValueTag::Float,
            Self::Text => ValueTag::Text,
            Self::Blob => ValueTag::Blob,
            Self::Timestamp => ValueTag::Timestamp,
            Self::Date => ValueTag::Date,
            Self::Guid => ValueTag::Guid,
            Self::Identity => ValueTag::Id,
            Self::FloatArray => ValueTag::FloatArray,
            Self::FloatGrid => ValueTag::FloatGrid,
            Self::Enum(_) => ValueTag::Enum,
            _ => return None,
        })
    }

    /// The resolved target class for object-valued kinds.
    #[must_use]
    pub const fn target(&self) -> Option<ClassId> {
        match self {
            Self::Component(target)
            | Self::ComponentList(target)
            | Self::Relation { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Whether values of this kind are collections.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        match self {
            Self::ComponentList(_)
            | Self::List(_)
            | Self::Set(_)
            | Self::Map(..)
            | Self::Bag(_) => true,
            Self::Relation { relation, .. } => relation.is_many(),
            _ => false,
        }
    }

    /// The declared default for a slot of this kind. Collections default
    /// to their empty form, nullable scalars to `Null`, everything else
    /// to its zero value.
    #[must_use]
    pub fn default_value(&self, nullable: bool) -> Value {
        if self.is_collection() {
            return match self {
                Self::Map(..) => Value::Map(Vec::new()),
                Self::Set(_) => Value::Set(Vec::new()),
                Self::Bag(_) => Value::Bag(Vec::new()),
                _ => Value::List(Vec::new()),
            };
        }
        if nullable {
            return Value::Null;
        }

        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Uint => Value::Uint(0),
            Self::Float => Value::Float(0.0),
            Self::Text => Value::Text(String::new()),
            Self::Blob => Value::Blob(Vec::new()),
            Self::Timestamp => Value::Timestamp(DateTime::UNIX_EPOCH),
            Self::Date => Value::Date(NaiveDate::default()),
            Self::Guid => Value::Guid(Uuid::nil()),
            Self::Identity => Value::Id(crate::identity::Oid::ZERO),
            Self::FloatArray => Value::FloatArray(Vec::new()),
            Self::FloatGrid => Value::FloatGrid(FloatGrid::default()),
            Self::Enum(_) => Value::Enum(0),
            // Single-valued object kinds default to "not set".
            Self::Component(_) | Self::Relation { .. } => Value::Null,
            // Collections handled above.
            _ => Value::Null,
        }
    }

    /// Whether a runtime value is shape-compatible with this kind.
    /// `Null` is accepted here regardless of nullability; the nullability
    /// rule is enforced by validation, not by slot typing.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }

        match self {
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::Int => matches!(value, Value::Int(_)),
            Self::Uint => matches!(value, Value::Uint(_)),
            Self::Float => matches!(value, Value::Float(_)),
            Self::Text => matches!(value, Value::Text(_)),
            Self::Blob => matches!(value, Value::Blob(_)),
            Self::Timestamp => matches!(value, Value::Timestamp(_)),
            Self::Date => matches!(value, Value::Date(_)),
            Self::Guid => matches!(value, Value::Guid(_)),
            Self::Identity => matches!(value, Value::Id(_)),
            Self::FloatArray => matches!(value, Value::FloatArray(_)),
            Self::FloatGrid => matches!(value, Value::FloatGrid(_)),
            Self::Enum(meta) => match value {
                Value::Enum(ordinal) => (*ordinal as usize) < meta.variants.len(),
                _ => false,
            },
            Self::Component(_) => matches!(value, Value::Object(_)),
            Self::ComponentList(_) => matches!(value, Value::List(_)),
            Self::Relation { relation, .. } => {
                if relation.is_many() {
                    matches!(value, Value::List(_))
                } else {
                    matches!(value, Value::Id(_) | Value::Object(_))
                }
            }
            Self::List(scalar) | Self::Bag(scalar) | Self::Set(scalar) => match value {
                Value::List(items) | Value::Bag(items) | Value::Set(items) => items
                    .iter()
                    .all(|item| item.is_null() || scalar_accepts(*scalar, item)),
                _ => false,
            },
            Self::Map(key, val) => match value {
                Value::Map(entries) => entries.iter().all(|(k, v)| {
                    scalar_accepts(*key, k) && (v.is_null() || scalar_accepts(*val, v))
                }),
                _ => false,
            },
        }
    }
}

/// Shape check for scalar collection elements.
#[must_use]
pub(crate) const fn scalar_accepts(scalar: ScalarType, value: &Value) -> bool {
    matches!(
        (scalar, value),
        (ScalarType::Bool, Value::Bool(_))
            | (ScalarType::Int, Value::Int(_))
            | (ScalarType::Uint, Value::Uint(_))
            | (ScalarType::Float, Value::Float(_))
            | (ScalarType::Text, Value::Text(_))
            | (ScalarType::Timestamp, Value::Timestamp(_))
            | (ScalarType::Date, Value::Date(_))
            | (ScalarType::Guid, Value::Guid(_))
    )
}

/// The dispatch tag for a scalar collection element type.
#[must_use]
pub(crate) const fn scalar_element_tag(scalar: ScalarType) -> ValueTag {
    match scalar {
        ScalarType::Bool => ValueTag::Bool,
        ScalarType::Int => ValueTag::Int,
        ScalarType::Uint => ValueTag::Uint,
        ScalarType::Float => ValueTag::Float,
        ScalarType::Text => ValueTag::Text,
        ScalarType::Timestamp => ValueTag::Timestamp,
        ScalarType::Date => ValueTag::Date,
        ScalarType::Guid => ValueTag::Guid,
    }
}

///
/// EnumMeta
///
/// Declared variant list for an enum property. The wire form is the
/// ordinal; names exist for the readable formats.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumMeta {
    pub variants: Vec<String>,
}

impl EnumMeta {
    #[must_use]
    pub fn name_of(&self, ordinal: u32) -> Option<&str> {
        self.variants.get(ordinal as usize).map(String::as_str)
    }

    #[must_use]
    pub fn ordinal_of(&self, name: &str) -> Option<u32> {
        self.variants
            .iter()
            .position(|variant| variant == name)
            .and_then(|i| u32::try_from(i).ok())
    }
}
