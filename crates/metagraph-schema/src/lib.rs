//! Declarative schema layer for metagraph: per-type descriptors consumed
//! exactly once when a runtime registry is built, plus the structural
//! validation that runs before any metadata is trusted.
//!
//! This crate defines *what exists*; `metagraph-core` defines *what runs*.

pub mod def;
pub mod error;
pub mod types;
pub mod validate;

use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Maximum length for entity schema identifiers.
pub const MAX_ENTITY_NAME_LEN: usize = 64;

/// Maximum length for field schema identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 64;

/// Entity ids occupy the top 16 bits of an object identity, minus the
/// transient flag bit. Ids at or above this bound cannot be represented.
pub const MAX_ENTITY_ID: u16 = 0x7FFF;

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("schema validation failed: {0}")]
    Validation(error::ErrorTree),
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        def::{EntityDef, FieldDef, FieldType, SchemaDef},
        error::ErrorTree,
        types::{Cascade, KeyRole, Relation, ScalarType, TypeKind},
    };
}
