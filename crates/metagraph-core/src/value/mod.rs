mod compare;
mod tag;

#[cfg(test)]
mod tests;

use crate::{identity::Oid, instance::Instance};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use uuid::Uuid;

// re-exports
pub use compare::{canonical_cmp, is_same, truncate_seconds};
pub use tag::ValueTag;

///
/// Value
///
/// Runtime value of one property slot. The variant set is closed; the
/// per-codec behavior for each variant is open, routed through the
/// dispatch tables so new scalar handlers can be registered without
/// touching codec logic.
///
/// Null      → the slot has no value (a nullable scalar, an unset
///             component, or a collection the schema treats as empty).
/// Id        → a reference to an entity by identity; codecs never chase
///             these themselves.
/// Object    → an owned component or an inline cascade-owned entity.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Guid(Uuid),
    /// Ordinal into the property's declared variant list.
    Enum(u32),
    FloatArray(Vec<f64>),
    FloatGrid(FloatGrid),
    Id(Oid),
    Object(Box<Instance>),
    /// Ordered, positionally significant.
    List(Vec<Self>),
    /// Unordered, value-unique. Stored as a plain vector; equality and
    /// diffing ignore order.
    Set(Vec<Self>),
    /// Key-matched entries; keys are scalar and unique.
    Map(Vec<(Self, Self)>),
    /// Unordered with duplicates tracked individually.
    Bag(Vec<Self>),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a `Value::Set` from owned items.
    pub fn from_set<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build a `Value::Bag` from owned items.
    pub fn from_bag<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::Bag(items.into_iter().map(Into::into).collect())
    }

    /// Build a `Value::Map` from owned entries, normalized into canonical
    /// key order. Duplicate keys keep the last entry.
    pub fn from_map<K, V>(entries: Vec<(K, V)>) -> Self
    where
        K: Into<Self>,
        V: Into<Self>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::Map(Self::normalize_map_entries(entries))
    }

    /// Sort map entries by canonical key order, keeping the last entry
    /// for a duplicated key.
    #[must_use]
    pub fn normalize_map_entries(mut entries: Vec<(Self, Self)>) -> Vec<(Self, Self)> {
        entries.sort_by(|(a, _), (b, _)| canonical_cmp(a, b));
        entries.dedup_by(|later, earlier| {
            // Vec::dedup_by keeps the FIRST of a run; swap so the later
            // entry survives.
            if canonical_cmp(&later.0, &earlier.0) == Ordering::Equal {
                std::mem::swap(later, earlier);
                true
            } else {
                false
            }
        });
        entries
    }

    ///
    /// TYPES
    ///

    /// Stable canonical variant tag.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        tag::canonical_tag(self)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::List(_) | Self::Set(_) | Self::Map(_) | Self::Bag(_)
        )
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(v) = self { Some(*v) } else { None }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_id(&self) -> Option<Oid> {
        if let Self::Id(id) = self { Some(*id) } else { None }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&Instance> {
        if let Self::Object(instance) = self {
            Some(instance)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_object_mut(&mut self) -> Option<&mut Instance> {
        if let Self::Object(instance) = self {
            Some(instance)
        } else {
            None
        }
    }

    /// Borrow the elements of any collection variant.
    #[must_use]
    pub const fn as_elements(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(items) | Self::Set(items) | Self::Bag(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map_entries(&self) -> Option<&Vec<(Self, Self)>> {
        if let Self::Map(entries) = self {
            Some(entries)
        } else {
            None
        }
    }

    ///
    /// EMPTY
    ///

    /// Whether the value reads as "nothing there": null, or an empty
    /// collection. The schema treats the two as the same default.
    #[must_use]
    pub fn is_empty_like(&self) -> bool {
        match self {
            Self::Null => true,
            Self::List(items) | Self::Set(items) | Self::Bag(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

#[macro_export]
macro_rules! impl_value_from {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from! {
    bool            => Bool,
    i8              => Int,
    i16             => Int,
    i32             => Int,
    i64             => Int,
    u8              => Uint,
    u16             => Uint,
    u32             => Uint,
    u64             => Uint,
    f64             => Float,
    &str            => Text,
    String          => Text,
    Vec<u8>         => Blob,
    DateTime<Utc>   => Timestamp,
    NaiveDate       => Date,
    Uuid            => Guid,
    Oid             => Id,
    FloatGrid       => FloatGrid,
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Self::Object(Box::new(instance))
    }
}

///
/// FloatGrid
///
/// Fixed-shape 2D double payload, stored row-major.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FloatGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FloatGrid {
    /// Build a grid from row-major data. Returns `None` when the data
    /// length does not match `rows * cols`.
    #[must_use]
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if rows * cols == data.len() {
            Some(Self { rows, cols, data })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}
