//! Structural diffing and patching.
//!
//! A delta is a tree mirroring the shape of the data it describes:
//! object nodes hold per-property entries, collection nodes hold item
//! edits, scalar leaves hold the old and new value. Old values are kept
//! everywhere so a delta can be audited and applied strictly: applying
//! against state that no longer matches the recorded old values is an
//! error, not a silent overwrite.
//!
//! Lists diff positionally through a longest-common-subsequence
//! alignment; lists of keyed objects align by identity or child key so a
//! moved element with changed content becomes one `Changed` entry instead
//! of a remove/add pair. Sets and bags diff as unordered memberships,
//! maps by key.

mod apply;
mod create;
mod key;
mod lcs;
pub mod wire;


use crate::{error::MetadataError, value::Value};
use serde::Serialize;

pub use apply::apply_delta;
pub use create::create_delta;

///
/// Delta
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Delta {
    /// Whole-value replacement of one slot.
    Scalar(ScalarDelta),
    /// Per-property edits of an object or record.
    Object(ObjectDelta),
    List(Vec<ListItemDelta>),
    Set(Vec<SetItemDelta>),
    Map(Vec<MapItemDelta>),
    Bag(Vec<BagItemDelta>),
}

impl Delta {
    /// Whether the delta carries no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(_) => false,
            Self::Object(delta) => delta.entries.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Set(items) => items.is_empty(),
            Self::Map(items) => items.is_empty(),
            Self::Bag(items) => items.is_empty(),
        }
    }

    /// Render the delta as JSON for inspection and audit logs.
    pub fn to_json(&self) -> Result<serde_json::Value, MetadataError> {
        serde_json::to_value(self)
            .map_err(|err| MetadataError::codec_encoding(err.to_string()))
    }
}

///
/// ScalarDelta
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScalarDelta {
    pub old: Value,
    pub new: Value,
}

///
/// ObjectDelta
///
/// Entries are (property index, delta), ascending by index.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectDelta {
    pub entries: Vec<(u32, Delta)>,
}

///
/// ListItemDelta
///
/// Removal indices refer to the old list, addition and change indices to
/// the new list. Application order is removals descending, additions
/// ascending, changes last.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ListItemDelta {
    Added { index: usize, value: Value },
    Removed { index: usize, value: Value },
    Changed { index: usize, delta: Delta },
}

///
/// SetItemDelta
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SetItemDelta {
    Added(Value),
    Removed(Value),
}

///
/// MapItemDelta
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum MapItemDelta {
    Added { key: Value, value: Value },
    Removed { key: Value, value: Value },
    Changed { key: Value, delta: Box<Delta> },
}

///
/// BagItemDelta
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum BagItemDelta {
    Added(Value),
    Removed(Value),
}
