use crate::{
    error::MetadataError,
    identity::Oid,
    registry::{ClassId, ClassMeta},
    value::Value,
};
use serde::Serialize;

///
/// Instance
///
/// The dynamic runtime record for one entity or component: a class handle
/// plus one value slot per declared property, positioned by property
/// index. Slot access replaces the reflection accessors of older
/// business-object stacks; the layout is resolved once at registration
/// and every read/write after that is an index.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Instance {
    class: ClassId,
    slots: Vec<Value>,
}

impl Instance {
    pub(crate) const fn new(class: ClassId, slots: Vec<Value>) -> Self {
        Self { class, slots }
    }

    #[must_use]
    pub const fn class_id(&self) -> ClassId {
        self.class
    }

    #[must_use]
    pub fn slots(&self) -> &[Value] {
        &self.slots
    }

    #[must_use]
    pub fn get(&self, index: u32) -> Option<&Value> {
        self.slots.get(index as usize)
    }

    #[must_use]
    pub fn get_mut(&mut self, index: u32) -> Option<&mut Value> {
        self.slots.get_mut(index as usize)
    }

    /// Overwrite a slot without metadata checks. Internal codec/delta
    /// paths use this after the value shape has already been verified.
    pub(crate) fn set_raw(&mut self, index: u32, value: Value) {
        self.slots[index as usize] = value;
    }

    /// The primary key identity, when the class declares one and the
    /// slot holds an id.
    #[must_use]
    pub fn pk(&self, meta: &ClassMeta) -> Option<Oid> {
        let index = meta.primary_key?;
        self.get(index).and_then(Value::as_id)
    }

    /// Assign the primary key identity.
    pub fn set_pk(&mut self, meta: &ClassMeta, id: Oid) -> Result<(), MetadataError> {
        let index = meta.primary_key.ok_or_else(|| {
            MetadataError::identity(format!("type '{}' has no primary key", meta.name))
        })?;
        self.set_raw(index, Value::Id(id));

        Ok(())
    }
}
