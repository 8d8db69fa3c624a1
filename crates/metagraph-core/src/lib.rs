//! Core runtime for metagraph: the schema registry, the value model, the
//! three entity codecs (binary / XML / JSON), the structural delta engine,
//! the cascade graph walker, and the 64-bit object identity scheme.
#![warn(unreachable_pub)]

pub mod codec;
pub mod delta;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod instance;
pub mod registry;
pub mod validate;
pub mod value;
pub mod walker;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary only. No codecs, dispatch tables, or helpers are
/// re-exported here.
///

pub mod prelude {
    pub use crate::{
        identity::Oid,
        instance::Instance,
        registry::{ClassId, ClassMeta, PropertyKind, PropertyMeta, Registry},
        value::Value,
    };
    pub use metagraph_schema::types::{Cascade, KeyRole, Relation, ScalarType, TypeKind};
}
