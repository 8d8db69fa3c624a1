#[cfg(test)]
mod tests;

use crate::error::MetadataError;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};
use thiserror::Error as ThisError;

///
/// Oid
///
/// Bit-packed 64-bit object identity.
///
/// Layout (do not change without a data migration):
/// - bit 63: transient flag, set while an id is locally minted and not
///   yet confirmed by the backing store
/// - bits 48..63: entity id (validated to stay below 0x8000, so the
///   transient flag never collides with it)
/// - bits 0..48: per-type counter; counter 0 is reserved, so a raw value
///   of 0 always reads as "unassigned"
///
/// Transient and persisted ids therefore occupy disjoint numeric ranges
/// and a reader can classify an id without extra state.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Oid(u64);

impl Oid {
    pub const ZERO: Self = Self(0);

    pub(crate) const TRANSIENT_BIT: u64 = 1 << 63;
    pub(crate) const ENTITY_SHIFT: u32 = 48;
    pub(crate) const COUNTER_MASK: u64 = (1 << Self::ENTITY_SHIFT) - 1;

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Compose an id from its parts. Callers guarantee the entity id is
    /// within range and the counter fits 48 bits; the registry validates
    /// both at build time.
    #[must_use]
    pub(crate) const fn compose(entity_id: u16, counter: u64) -> Self {
        Self(((entity_id as u64) << Self::ENTITY_SHIFT) | (counter & Self::COUNTER_MASK))
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_transient(self) -> bool {
        self.0 & Self::TRANSIENT_BIT != 0
    }

    /// The same identity with the transient flag cleared.
    #[must_use]
    pub const fn strip_transient(self) -> Self {
        Self(self.0 & !Self::TRANSIENT_BIT)
    }

    /// The same identity with the transient flag set.
    #[must_use]
    pub const fn with_transient(self) -> Self {
        Self(self.0 | Self::TRANSIENT_BIT)
    }

    /// The entity id segment, independent of the transient flag.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn entity_id(self) -> u16 {
        (self.strip_transient().0 >> Self::ENTITY_SHIFT) as u16
    }

    /// The per-type counter segment.
    #[must_use]
    pub const fn counter(self) -> u64 {
        self.0 & Self::COUNTER_MASK
    }
}

// Transport form shared by the XML and JSON codecs: `T`-prefixed decimal
// for transient ids, plain decimal otherwise.
impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_transient() {
            write!(f, "T{}", self.strip_transient().0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

///
/// OidParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum OidParseError {
    #[error("invalid object id '{0}'")]
    Invalid(String),

    #[error("transient id 'T{0}' already carries the transient bit")]
    TransientBitSet(u64),
}

impl FromStr for Oid {
    type Err = OidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix('T') {
            let raw: u64 = rest
                .parse()
                .map_err(|_| OidParseError::Invalid(s.to_string()))?;
            if raw & Self::TRANSIENT_BIT != 0 {
                return Err(OidParseError::TransientBitSet(raw));
            }
            Ok(Self(raw).with_transient())
        } else {
            let raw: u64 = s
                .parse()
                .map_err(|_| OidParseError::Invalid(s.to_string()))?;
            Ok(Self(raw))
        }
    }
}

///
/// CONSTANTS
///

/// Counters are handed out in blocks of this size so concurrent minting
/// only contends on the block boundary, not on every call.
pub const ID_BLOCK: u64 = 256;

///
/// IdAllocator
///
/// Per-entity-type counter source. A single atomic head hands out
/// disjoint counter blocks; every generator drawing from the same
/// allocator is therefore collision-free, across threads included.
///

#[derive(Debug)]
pub struct IdAllocator {
    entity_id: u16,
    head: AtomicU64,
    shared: Mutex<IdBlock>,
}

#[derive(Clone, Copy, Debug)]
struct IdBlock {
    next: u64,
    limit: u64,
}

impl IdBlock {
    const EMPTY: Self = Self { next: 0, limit: 0 };
}

impl IdAllocator {
    #[must_use]
    pub(crate) const fn new(entity_id: u16) -> Self {
        Self {
            entity_id,
            // Counter 0 is reserved for "unassigned".
            head: AtomicU64::new(1),
            shared: Mutex::new(IdBlock::EMPTY),
        }
    }

    fn allocate_block(&self) -> Result<IdBlock, MetadataError> {
        let next = self.head.fetch_add(ID_BLOCK, Ordering::Relaxed);
        let limit = next + ID_BLOCK;
        if limit > Oid::COUNTER_MASK {
            return Err(MetadataError::identity(format!(
                "counter space exhausted for entity id {}",
                self.entity_id
            )));
        }
        Ok(IdBlock { next, limit })
    }

    /// Mint one transient id from the allocator's shared block.
    pub fn mint(&self) -> Result<Oid, MetadataError> {
        let mut block = self
            .shared
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if block.next == block.limit {
            *block = self.allocate_block()?;
        }

        let counter = block.next;
        block.next += 1;

        Ok(Oid::compose(self.entity_id, counter).with_transient())
    }

    /// Open a generator holding its own pre-fetched block. Useful when a
    /// caller is about to identify a whole subtree and wants to avoid the
    /// shared lock on every mint.
    #[must_use]
    pub fn generator(&self) -> IdGenerator<'_> {
        IdGenerator {
            allocator: self,
            block: IdBlock::EMPTY,
        }
    }
}

///
/// IdGenerator
///
/// A handle with a private counter block. Two live generators on the same
/// allocator never overlap because blocks are carved out of one atomic
/// head.
///

#[derive(Debug)]
pub struct IdGenerator<'a> {
    allocator: &'a IdAllocator,
    block: IdBlock,
}

impl IdGenerator<'_> {
    /// Mint one transient id, refilling the private block at its boundary.
    pub fn mint(&mut self) -> Result<Oid, MetadataError> {
        if self.block.next == self.block.limit {
            self.block = self.allocator.allocate_block()?;
        }

        let counter = self.block.next;
        self.block.next += 1;

        Ok(Oid::compose(self.allocator.entity_id, counter).with_transient())
    }
}
