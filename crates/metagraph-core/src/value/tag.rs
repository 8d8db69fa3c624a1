use crate::value::Value;

///
/// ValueTag
///
/// Stable canonical value-variant tag. Used as the dispatch-table key for
/// every codec and as the wire tag for self-describing delta payloads.
///
/// IMPORTANT:
/// Tag values are part of stable wire behavior and must remain fixed.
///
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueTag {
    Null = 0,
    Bool = 1,
    Int = 2,
    Uint = 3,
    Float = 4,
    Text = 5,
    Blob = 6,
    Timestamp = 7,
    Date = 8,
    Guid = 9,
    Enum = 10,
    FloatArray = 11,
    FloatGrid = 12,
    Id = 13,
    Object = 14,
    List = 15,
    Set = 16,
    Map = 17,
    Bag = 18,
}

impl ValueTag {
    /// Stable wire byte for this variant.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Null,
            1 => Self::Bool,
            2 => Self::Int,
            3 => Self::Uint,
            4 => Self::Float,
            5 => Self::Text,
            6 => Self::Blob,
            7 => Self::Timestamp,
            8 => Self::Date,
            9 => Self::Guid,
            10 => Self::Enum,
            11 => Self::FloatArray,
            12 => Self::FloatGrid,
            13 => Self::Id,
            14 => Self::Object,
            15 => Self::List,
            16 => Self::Set,
            17 => Self::Map,
            18 => Self::Bag,
            _ => return None,
        })
    }

    /// Whether a scalar dispatch entry can exist for this tag. Structural
    /// variants (objects and collections) are walked by the codecs
    /// themselves.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(
            self,
            Self::Null | Self::Object | Self::List | Self::Set | Self::Map | Self::Bag
        )
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Uint => "Uint",
            Self::Float => "Float",
            Self::Text => "Text",
            Self::Blob => "Blob",
            Self::Timestamp => "Timestamp",
            Self::Date => "Date",
            Self::Guid => "Guid",
            Self::Enum => "Enum",
            Self::FloatArray => "FloatArray",
            Self::FloatGrid => "FloatGrid",
            Self::Id => "Id",
            Self::Object => "Object",
            Self::List => "List",
            Self::Set => "Set",
            Self::Map => "Map",
            Self::Bag => "Bag",
        }
    }
}

/// Stable canonical variant tag for a runtime value.
#[must_use]
pub(crate) const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Null => ValueTag::Null,
        Value::Bool(_) => ValueTag::Bool,
        Value::Int(_) => ValueTag::Int,
        Value::Uint(_) => ValueTag::Uint,
        Value::Float(_) => ValueTag::Float,
        Value::Text(_) => ValueTag::Text,
        Value::Blob(_) => ValueTag::Blob,
        Value::Timestamp(_) => ValueTag::Timestamp,
        Value::Date(_) => ValueTag::Date,
        Value::Guid(_) => ValueTag::Guid,
        Value::Enum(_) => ValueTag::Enum,
        Value::FloatArray(_) => ValueTag::FloatArray,
        Value::FloatGrid(_) => ValueTag::FloatGrid,
        Value::Id(_) => ValueTag::Id,
        Value::Object(_) => ValueTag::Object,
        Value::List(_) => ValueTag::List,
        Value::Set(_) => ValueTag::Set,
        Value::Map(_) => ValueTag::Map,
        Value::Bag(_) => ValueTag::Bag,
    }
}
