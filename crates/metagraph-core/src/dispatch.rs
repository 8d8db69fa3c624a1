//! Per-value-kind handler tables.
//!
//! The value variant set is closed but the behavior for each variant is
//! open: every codec and the comparison layer look up their scalar
//! handlers here by canonical tag. Builtins bind lazily on first use and
//! callers may register replacements or extensions before that.

use crate::{
    codec::binary::wire::ByteReader,
    error::MetadataError,
    value::{Value, ValueTag},
};
use std::{cmp::Ordering, collections::HashMap, sync::RwLock};

///
/// DispatchTable
///
/// Tag-keyed handler table with lazy builtin binding. `Ops` is a bundle
/// of plain fn pointers so resolved entries are returned by value.
///

#[derive(Debug)]
pub struct DispatchTable<Ops: Copy> {
    label: &'static str,
    builtin: fn(ValueTag) -> Option<Ops>,
    bound: RwLock<HashMap<ValueTag, Ops>>,
}

impl<Ops: Copy> DispatchTable<Ops> {
    pub(crate) fn new(label: &'static str, builtin: fn(ValueTag) -> Option<Ops>) -> Self {
        Self {
            label,
            builtin,
            bound: RwLock::new(HashMap::new()),
        }
    }

    /// Register or replace the handler bundle for a tag.
    pub fn register(&self, tag: ValueTag, ops: Ops) {
        if let Ok(mut bound) = self.bound.write() {
            bound.insert(tag, ops);
        }
    }

    /// Resolve the handler bundle for a tag, binding the builtin on first
    /// use. Fails when the tag has no builtin and nothing was registered.
    pub fn resolve(&self, tag: ValueTag) -> Result<Ops, MetadataError> {
        if let Ok(bound) = self.bound.read()
            && let Some(ops) = bound.get(&tag)
        {
            return Ok(*ops);
        }

        let Some(ops) = (self.builtin)(tag) else {
            return Err(MetadataError::registry_config(format!(
                "no {} handler bound for value kind '{}'",
                self.label,
                tag.label()
            )));
        };

        // Binding is idempotent; a racing register() wins.
        if let Ok(mut bound) = self.bound.write() {
            bound.entry(tag).or_insert(ops);
        }

        Ok(ops)
    }
}

///
/// BinaryOps
///
/// Scalar read/write pair for the compact binary format.
///

#[derive(Clone, Copy, Debug)]
pub struct BinaryOps {
    pub write: fn(&mut Vec<u8>, &Value) -> Result<(), MetadataError>,
    pub read: fn(&mut ByteReader<'_>) -> Result<Value, MetadataError>,
}

///
/// TextOps
///
/// Scalar text form pair shared by the XML codec: values render to and
/// parse from their canonical text representation.
///

#[derive(Clone, Copy, Debug)]
pub struct TextOps {
    pub write: fn(&Value) -> Result<String, MetadataError>,
    pub read: fn(&str) -> Result<Value, MetadataError>,
}

///
/// JsonOps
///
/// Scalar JSON form pair.
///

#[derive(Clone, Copy, Debug)]
pub struct JsonOps {
    pub write: fn(&Value) -> serde_json::Value,
    pub read: fn(&serde_json::Value) -> Result<Value, MetadataError>,
}

///
/// CompareOps
///
/// Scalar equality and canonical ordering pair used by the delta engine.
///

#[derive(Clone, Copy, Debug)]
pub struct CompareOps {
    pub same: fn(&Value, &Value) -> bool,
    pub cmp: fn(&Value, &Value) -> Ordering,
}

///
/// CodecDispatch
///
/// The four handler tables carried by a registry. One instance per
/// registry; codecs borrow the table they need.
///

#[derive(Debug)]
pub struct CodecDispatch {
    pub binary: DispatchTable<BinaryOps>,
    pub xml: DispatchTable<TextOps>,
    pub json: DispatchTable<JsonOps>,
    pub compare: DispatchTable<CompareOps>,
}

impl CodecDispatch {
    pub(crate) fn new() -> Self {
        Self {
            binary: DispatchTable::new("binary", crate::codec::binary::builtin_scalar_ops),
            xml: DispatchTable::new("xml", crate::codec::xml::builtin_scalar_ops),
            json: DispatchTable::new("json", crate::codec::json::builtin_scalar_ops),
            compare: DispatchTable::new("compare", builtin_compare_ops),
        }
    }
}

fn builtin_compare_ops(tag: ValueTag) -> Option<CompareOps> {
    if !tag.is_scalar() {
        return None;
    }

    Some(CompareOps {
        same: crate::value::is_same,
        cmp: crate::value::canonical_cmp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_builtin(_: ValueTag) -> Option<CompareOps> {
        None
    }

    #[test]
    fn resolve_binds_builtin_lazily() {
        let table = DispatchTable::new("compare", builtin_compare_ops);
        let ops = table.resolve(ValueTag::Int).unwrap();
        assert!((ops.same)(&Value::Int(3), &Value::Int(3)));
    }

    #[test]
    fn unbound_tag_is_a_config_error() {
        let table: DispatchTable<CompareOps> = DispatchTable::new("compare", no_builtin);
        let err = table.resolve(ValueTag::Text).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn registered_ops_shadow_builtins() {
        fn always_same(_: &Value, _: &Value) -> bool {
            true
        }
        fn always_equal(_: &Value, _: &Value) -> Ordering {
            Ordering::Equal
        }

        let table = DispatchTable::new("compare", builtin_compare_ops);
        table.register(
            ValueTag::Int,
            CompareOps {
                same: always_same,
                cmp: always_equal,
            },
        );
        let ops = table.resolve(ValueTag::Int).unwrap();
        assert!((ops.same)(&Value::Int(1), &Value::Int(2)));
    }
}
