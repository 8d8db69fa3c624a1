//! The compact binary record format.
//!
//! Record layouts:
//!
//! - entity record: `varint entity_id`, `varint pk_index`, raw 8-byte LE
//!   identity, then ascending `(varint index, value)` pairs for every
//!   non-default property, closed by a `varint -1` terminator.
//! - component record: `varint name_len + name`, then the same pair run.
//! - graph stream: entity records back to back until end of buffer.
//!
//! Scalar payloads go through the registry's binary dispatch table; the
//! reader is schema-driven and knows the expected kind from the property
//! index, so scalars are not self-describing. Delta payloads need
//! self-describing values and use the tagged form instead.

pub mod wire;


use crate::{
    codec::{assigned_pk, is_default, reference_id, reference_ids, reset_unseen, Resolver},
    dispatch::BinaryOps,
    error::MetadataError,
    identity::Oid,
    instance::Instance,
    registry::{scalar_element_tag, ClassMeta, PropertyKind, PropertyMeta, Registry},
    value::{Value, ValueTag},
};
use chrono::{DateTime, Datelike, NaiveDate};
use uuid::Uuid;
use wire::{write_varint, write_varint_i64, ByteReader};

/// Record terminator: the index pair run ends at varint -1.
const END_OF_RECORD: i64 = -1;

///
/// BinaryWriter
///
/// Streams records into an owned buffer.
///

pub struct BinaryWriter<'a> {
    registry: &'a Registry,
    buf: Vec<u8>,
}

impl<'a> BinaryWriter<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            buf: Vec::new(),
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub(crate) fn push_varint(&mut self, value: u64) {
        write_varint(&mut self.buf, value);
    }

    /// Write one entity record. The instance must carry an assigned
    /// primary key.
    pub fn write_entity(&mut self, instance: &Instance) -> Result<(), MetadataError> {
        let meta = self.registry.class(instance.class_id());
        if !meta.is_entity() {
            return Err(MetadataError::codec_encoding(format!(
                "'{}' is a component; use a component record",
                meta.name
            )));
        }
        let (pk_index, id) = entity_key(meta, instance)?;

        write_varint(&mut self.buf, u64::from(meta.entity_id));
        write_varint(&mut self.buf, u64::from(pk_index));
        self.buf.extend_from_slice(&id.raw().to_le_bytes());
        self.write_pairs(meta, instance, Some(pk_index))
    }

    /// Write one standalone component record, keyed by type name since
    /// components have no entity id.
    pub fn write_component(&mut self, instance: &Instance) -> Result<(), MetadataError> {
        let meta = self.registry.class(instance.class_id());
        if !meta.is_component() {
            return Err(MetadataError::codec_encoding(format!(
                "'{}' is an entity; use an entity record",
                meta.name
            )));
        }

        write_varint(&mut self.buf, meta.name.len() as u64);
        self.buf.extend_from_slice(meta.name.as_bytes());
        self.write_pairs(meta, instance, None)
    }

    /// Write the owned closure of a root as a stream of entity records,
    /// root first. References between records stay identities.
    pub fn write_graph(&mut self, root: &Instance) -> Result<(), MetadataError> {
        let owned = crate::walker::collect_owned(self.registry, root)?;
        for instance in owned {
            let meta = self.registry.class(instance.class_id());
            if meta.is_entity() {
                self.write_entity(instance)?;
            }
        }

        Ok(())
    }

    fn write_pairs(
        &mut self,
        meta: &ClassMeta,
        instance: &Instance,
        skip: Option<u32>,
    ) -> Result<(), MetadataError> {
        for property in &meta.properties {
            if skip == Some(property.index) {
                continue;
            }
            let value = instance.get(property.index).ok_or_else(|| {
                MetadataError::codec_encoding(format!("'{}' slot table too short", meta.name))
            })?;
            if is_default(self.registry, property, value) {
                continue;
            }

            write_varint(&mut self.buf, u64::from(property.index));
            self.write_property(property, value)?;
        }
        write_varint_i64(&mut self.buf, END_OF_RECORD);

        Ok(())
    }

    fn write_property(
        &mut self,
        property: &PropertyMeta,
        value: &Value,
    ) -> Result<(), MetadataError> {
        match &property.kind {
            PropertyKind::Component(_) => {
                let instance = value.as_object().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "component slot '{}' holds '{}'",
                        property.name,
                        value.tag().label()
                    ))
                })?;
                self.write_body(instance)
            }
            PropertyKind::ComponentList(_) => {
                let items = value.as_elements().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "component list slot '{}' holds '{}'",
                        property.name,
                        value.tag().label()
                    ))
                })?;
                write_varint(&mut self.buf, items.len() as u64);
                for item in items {
                    let instance = item.as_object().ok_or_else(|| {
                        MetadataError::codec_encoding(format!(
                            "non-object element in component list '{}'",
                            property.name
                        ))
                    })?;
                    self.write_body(instance)?;
                }
                Ok(())
            }
            PropertyKind::Relation { relation, .. } if relation.is_many() => {
                let ids = reference_ids(self.registry, property, value)?;
                write_varint(&mut self.buf, ids.len() as u64);
                for id in ids {
                    self.buf.extend_from_slice(&id.raw().to_le_bytes());
                }
                Ok(())
            }
            PropertyKind::Relation { .. } => {
                let id = reference_id(self.registry, property, value)?;
                self.buf.extend_from_slice(&id.raw().to_le_bytes());
                Ok(())
            }
            PropertyKind::List(scalar) | PropertyKind::Set(scalar) | PropertyKind::Bag(scalar) => {
                let items = value.as_elements().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "collection slot '{}' holds '{}'",
                        property.name,
                        value.tag().label()
                    ))
                })?;
                let ops = self.registry.dispatch().binary.resolve(scalar_element_tag(*scalar))?;
                write_varint(&mut self.buf, items.len() as u64);
                for item in items {
                    self.write_flagged(ops, item)?;
                }
                Ok(())
            }
            PropertyKind::Map(key, val) => {
                let entries = value.as_map_entries().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "map slot '{}' holds '{}'",
                        property.name,
                        value.tag().label()
                    ))
                })?;
                let entries = Value::normalize_map_entries(entries.clone());
                let key_ops = self.registry.dispatch().binary.resolve(scalar_element_tag(*key))?;
                let val_ops = self.registry.dispatch().binary.resolve(scalar_element_tag(*val))?;
                write_varint(&mut self.buf, entries.len() as u64);
                for (k, v) in &entries {
                    (key_ops.write)(&mut self.buf, k)?;
                    self.write_flagged(val_ops, v)?;
                }
                Ok(())
            }
            kind => {
                // Scalar kinds. Nullable slots carry a presence byte.
                let tag = kind.scalar_tag().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "unhandled property kind on '{}'",
                        property.name
                    ))
                })?;
                let ops = self.registry.dispatch().binary.resolve(tag)?;
                if property.nullable {
                    return self.write_flagged(ops, value);
                }
                (ops.write)(&mut self.buf, value)
            }
        }
    }

    // Presence byte then payload; Null is presence 0 with no payload.
    fn write_flagged(&mut self, ops: BinaryOps, value: &Value) -> Result<(), MetadataError> {
        if value.is_null() {
            self.buf.push(0);
            return Ok(());
        }
        self.buf.push(1);
        (ops.write)(&mut self.buf, value)
    }

    // Inline component body: the same pair run as a record, no key.
    fn write_body(&mut self, instance: &Instance) -> Result<(), MetadataError> {
        let meta = self.registry.class(instance.class_id());
        self.write_pairs(meta, instance, None)
    }

    ///
    /// TAGGED VALUES
    ///
    /// Self-describing form used by delta payloads: a tag byte followed
    /// by the scalar payload, with structural variants walked inline.
    ///

    pub(crate) fn write_tagged(&mut self, value: &Value) -> Result<(), MetadataError> {
        let tag = value.tag();
        self.buf.push(tag.to_u8());

        match value {
            Value::Null => Ok(()),
            Value::Object(instance) => {
                let meta = self.registry.class(instance.class_id());
                write_varint(&mut self.buf, meta.name.len() as u64);
                self.buf.extend_from_slice(meta.name.as_bytes());
                self.write_body(instance)
            }
            Value::List(items) | Value::Set(items) | Value::Bag(items) => {
                write_varint(&mut self.buf, items.len() as u64);
                for item in items {
                    self.write_tagged(item)?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                write_varint(&mut self.buf, entries.len() as u64);
                for (k, v) in entries {
                    self.write_tagged(k)?;
                    self.write_tagged(v)?;
                }
                Ok(())
            }
            scalar => {
                let ops = self.registry.dispatch().binary.resolve(tag)?;
                (ops.write)(&mut self.buf, scalar)
            }
        }
    }
}

///
/// BinaryReader
///
/// Schema-driven decoder over one buffer. Decoding failures poison the
/// stream; callers drop the reader on the first error.
///

pub struct BinaryReader<'a> {
    registry: &'a Registry,
    cursor: ByteReader<'a>,
}

impl<'a> BinaryReader<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry, data: &'a [u8]) -> Self {
        Self {
            registry,
            cursor: ByteReader::new(data),
        }
    }

    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.cursor.at_end()
    }

    pub(crate) fn pull_byte(&mut self) -> Result<u8, MetadataError> {
        self.cursor.u8()
    }

    pub(crate) fn pull_varint(&mut self) -> Result<u64, MetadataError> {
        self.cursor.varint()
    }

    pub(crate) fn pull_len(&mut self) -> Result<usize, MetadataError> {
        self.cursor.varint_len()
    }

    /// Decode one entity record onto the instance the resolver supplies.
    /// Properties the record does not mention reset to their defaults.
    pub fn read_entity(&mut self, resolver: &mut dyn Resolver) -> Result<Instance, MetadataError> {
        let entity_id = self.cursor.varint()?;
        let entity_id = u16::try_from(entity_id).map_err(|_| {
            MetadataError::codec_corruption(format!("entity id {entity_id} out of range"))
        })?;
        let meta = self.registry.expect_entity_id(entity_id)?;

        let pk_index = u32::try_from(self.cursor.varint()?)
            .map_err(|_| MetadataError::codec_corruption("primary key index out of range"))?;
        if meta.primary_key != Some(pk_index) {
            return Err(MetadataError::codec_corruption(format!(
                "record primary key index {pk_index} does not match '{}'",
                meta.name
            )));
        }
        let id = Oid::from_raw(self.cursor.u64_le()?);

        let mut instance = resolver.resolve(id, meta)?;
        instance.set_pk(meta, id)?;

        let mut seen = vec![false; meta.properties.len()];
        seen[pk_index as usize] = true;
        self.read_pairs(meta, &mut instance, &mut seen)?;
        reset_unseen(meta, &mut instance, &seen);

        Ok(instance)
    }

    /// Decode one standalone component record.
    pub fn read_component(&mut self) -> Result<Instance, MetadataError> {
        let name = self.read_name()?;
        let meta = self.registry.expect(&name)?;
        if !meta.is_component() {
            return Err(MetadataError::codec_corruption(format!(
                "component record names entity '{name}'"
            )));
        }

        self.read_body(meta)
    }

    /// Decode a stream of entity records until the buffer ends.
    pub fn read_graph(
        &mut self,
        resolver: &mut dyn Resolver,
    ) -> Result<crate::codec::ObjectGraph, MetadataError> {
        let mut graph = crate::codec::ObjectGraph::new();
        while !self.at_end() {
            let instance = self.read_entity(resolver)?;
            graph.insert(self.registry, instance);
        }

        Ok(graph)
    }

    fn read_name(&mut self) -> Result<String, MetadataError> {
        let len = self.cursor.varint_len()?;
        let bytes = self.cursor.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| MetadataError::codec_corruption("type name is not valid UTF-8"))
    }

    fn read_pairs(
        &mut self,
        meta: &ClassMeta,
        instance: &mut Instance,
        seen: &mut [bool],
    ) -> Result<(), MetadataError> {
        loop {
            let index = self.cursor.varint_i64()?;
            if index == END_OF_RECORD {
                return Ok(());
            }
            let index = u32::try_from(index).map_err(|_| {
                MetadataError::codec_corruption(format!("negative property index {index}"))
            })?;
            let property = meta.property(index).ok_or_else(|| {
                MetadataError::codec_corruption(format!(
                    "property index {index} out of range for '{}'",
                    meta.name
                ))
            })?;

            let value = self.read_property(property)?;
            instance.set_raw(index, value);
            seen[index as usize] = true;
        }
    }

    fn read_property(&mut self, property: &PropertyMeta) -> Result<Value, MetadataError> {
        match &property.kind {
            PropertyKind::Component(target) => {
                let meta = self.registry.class(*target);
                Ok(self.read_body(meta)?.into())
            }
            PropertyKind::ComponentList(target) => {
                let meta = self.registry.class(*target);
                let count = self.cursor.varint_len()?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read_body(meta)?.into());
                }
                Ok(Value::List(items))
            }
            PropertyKind::Relation { relation, .. } if relation.is_many() => {
                let count = self.cursor.varint_len()?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(Value::Id(Oid::from_raw(self.cursor.u64_le()?)));
                }
                Ok(Value::List(items))
            }
            PropertyKind::Relation { .. } => Ok(Value::Id(Oid::from_raw(self.cursor.u64_le()?))),
            PropertyKind::List(scalar) | PropertyKind::Set(scalar) | PropertyKind::Bag(scalar) => {
                let ops = self.registry.dispatch().binary.resolve(scalar_element_tag(*scalar))?;
                let count = self.cursor.varint_len()?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read_flagged(ops)?);
                }
                Ok(match property.kind {
                    PropertyKind::Set(_) => Value::Set(items),
                    PropertyKind::Bag(_) => Value::Bag(items),
                    _ => Value::List(items),
                })
            }
            PropertyKind::Map(key, val) => {
                let key_ops = self.registry.dispatch().binary.resolve(scalar_element_tag(*key))?;
                let val_ops = self.registry.dispatch().binary.resolve(scalar_element_tag(*val))?;
                let count = self.cursor.varint_len()?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let k = (key_ops.read)(&mut self.cursor)?;
                    let v = self.read_flagged(val_ops)?;
                    entries.push((k, v));
                }
                Ok(Value::Map(Value::normalize_map_entries(entries)))
            }
            kind => {
                let tag = kind.scalar_tag().ok_or_else(|| {
                    MetadataError::codec_corruption(format!(
                        "unhandled property kind on '{}'",
                        property.name
                    ))
                })?;
                let ops = self.registry.dispatch().binary.resolve(tag)?;
                if property.nullable {
                    return self.read_flagged(ops);
                }
                (ops.read)(&mut self.cursor)
            }
        }
    }

    fn read_flagged(&mut self, ops: BinaryOps) -> Result<Value, MetadataError> {
        match self.cursor.u8()? {
            0 => Ok(Value::Null),
            1 => (ops.read)(&mut self.cursor),
            flag => Err(MetadataError::codec_corruption(format!(
                "invalid presence byte {flag}"
            ))),
        }
    }

    fn read_body(&mut self, meta: &ClassMeta) -> Result<Instance, MetadataError> {
        let mut instance = self.registry.create(meta.id);
        let mut seen = vec![false; meta.properties.len()];
        self.read_pairs(meta, &mut instance, &mut seen)?;

        Ok(instance)
    }

    ///
    /// TAGGED VALUES
    ///

    pub(crate) fn read_tagged(&mut self) -> Result<Value, MetadataError> {
        let byte = self.cursor.u8()?;
        let tag = ValueTag::from_u8(byte).ok_or_else(|| {
            MetadataError::codec_corruption(format!("unknown value tag {byte}"))
        })?;

        match tag {
            ValueTag::Null => Ok(Value::Null),
            ValueTag::Object => {
                let name = self.read_name()?;
                let meta = self.registry.expect(&name)?;
                Ok(self.read_body(meta)?.into())
            }
            ValueTag::List | ValueTag::Set | ValueTag::Bag => {
                let count = self.cursor.varint_len()?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read_tagged()?);
                }
                Ok(match tag {
                    ValueTag::Set => Value::Set(items),
                    ValueTag::Bag => Value::Bag(items),
                    _ => Value::List(items),
                })
            }
            ValueTag::Map => {
                let count = self.cursor.varint_len()?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let k = self.read_tagged()?;
                    let v = self.read_tagged()?;
                    entries.push((k, v));
                }
                Ok(Value::Map(entries))
            }
            scalar => {
                let ops = self.registry.dispatch().binary.resolve(scalar)?;
                (ops.read)(&mut self.cursor)
            }
        }
    }
}

fn entity_key(meta: &ClassMeta, instance: &Instance) -> Result<(u32, Oid), MetadataError> {
    let pk_index = meta.primary_key.ok_or_else(|| {
        MetadataError::codec_encoding(format!("entity '{}' has no primary key", meta.name))
    })?;
    let id = assigned_pk(meta, instance)?;

    Ok((pk_index, id))
}

///
/// BUILTIN SCALARS
///

pub(crate) fn builtin_scalar_ops(tag: ValueTag) -> Option<BinaryOps> {
    Some(match tag {
        ValueTag::Bool => BinaryOps { write: write_bool, read: read_bool },
        ValueTag::Int => BinaryOps { write: write_int, read: read_int },
        ValueTag::Uint => BinaryOps { write: write_uint, read: read_uint },
        ValueTag::Float => BinaryOps { write: write_float, read: read_float },
        ValueTag::Text => BinaryOps { write: write_text, read: read_text },
        ValueTag::Blob => BinaryOps { write: write_blob, read: read_blob },
        ValueTag::Timestamp => BinaryOps { write: write_timestamp, read: read_timestamp },
        ValueTag::Date => BinaryOps { write: write_date, read: read_date },
        ValueTag::Guid => BinaryOps { write: write_guid, read: read_guid },
        ValueTag::Enum => BinaryOps { write: write_enum, read: read_enum },
        ValueTag::Id => BinaryOps { write: write_id, read: read_id },
        ValueTag::FloatArray => BinaryOps { write: write_float_array, read: read_float_array },
        ValueTag::FloatGrid => BinaryOps { write: write_float_grid, read: read_float_grid },
        _ => return None,
    })
}

fn mismatch(expected: &str, value: &Value) -> MetadataError {
    MetadataError::codec_encoding(format!(
        "expected {expected} value, found '{}'",
        value.tag().label()
    ))
}

fn write_bool(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Bool(v) => {
            buf.push(u8::from(*v));
            Ok(())
        }
        other => Err(mismatch("Bool", other)),
    }
}

fn read_bool(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    match cursor.u8()? {
        0 => Ok(Value::Bool(false)),
        1 => Ok(Value::Bool(true)),
        byte => Err(MetadataError::codec_corruption(format!(
            "invalid bool byte {byte}"
        ))),
    }
}

fn write_int(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Int(v) => {
            write_varint_i64(buf, *v);
            Ok(())
        }
        other => Err(mismatch("Int", other)),
    }
}

fn read_int(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    Ok(Value::Int(cursor.varint_i64()?))
}

fn write_uint(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Uint(v) => {
            write_varint(buf, *v);
            Ok(())
        }
        other => Err(mismatch("Uint", other)),
    }
}

fn read_uint(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    Ok(Value::Uint(cursor.varint()?))
}

fn write_float(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Float(v) => {
            buf.extend_from_slice(&v.to_bits().to_le_bytes());
            Ok(())
        }
        other => Err(mismatch("Float", other)),
    }
}

fn read_float(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    Ok(Value::Float(cursor.f64_le()?))
}

fn write_text(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Text(v) => {
            write_varint(buf, v.len() as u64);
            buf.extend_from_slice(v.as_bytes());
            Ok(())
        }
        other => Err(mismatch("Text", other)),
    }
}

fn read_text(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    let len = cursor.varint_len()?;
    let bytes = cursor.take(len)?;
    String::from_utf8(bytes.to_vec())
        .map(Value::Text)
        .map_err(|_| MetadataError::codec_corruption("text payload is not valid UTF-8"))
}

fn write_blob(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Blob(v) => {
            write_varint(buf, v.len() as u64);
            buf.extend_from_slice(v);
            Ok(())
        }
        other => Err(mismatch("Blob", other)),
    }
}

fn read_blob(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    let len = cursor.varint_len()?;
    Ok(Value::Blob(cursor.take(len)?.to_vec()))
}

// Whole seconds, fixed 8 bytes. Sub-second precision is dropped on write,
// matching schema-level equality.
fn write_timestamp(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Timestamp(v) => {
            buf.extend_from_slice(&v.timestamp().to_le_bytes());
            Ok(())
        }
        other => Err(mismatch("Timestamp", other)),
    }
}

fn read_timestamp(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    let secs = cursor.u64_le()? as i64;
    let ts = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| MetadataError::codec_corruption(format!("timestamp {secs} out of range")))?;
    Ok(Value::Timestamp(ts))
}

// Dates pack as year * 10000 + month * 100 + day in one signed varint.
fn write_date(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Date(v) => {
            let packed =
                i64::from(v.year()) * 10_000 + i64::from(v.month()) * 100 + i64::from(v.day());
            write_varint_i64(buf, packed);
            Ok(())
        }
        other => Err(mismatch("Date", other)),
    }
}

fn read_date(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    let packed = cursor.varint_i64()?;
    let day = (packed.rem_euclid(100)) as u32;
    let month = (packed.div_euclid(100).rem_euclid(100)) as u32;
    let year = i32::try_from(packed.div_euclid(10_000))
        .map_err(|_| MetadataError::codec_corruption(format!("packed date {packed} out of range")))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Value::Date)
        .ok_or_else(|| MetadataError::codec_corruption(format!("invalid packed date {packed}")))
}

fn write_guid(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Guid(v) => {
            buf.extend_from_slice(v.as_bytes());
            Ok(())
        }
        other => Err(mismatch("Guid", other)),
    }
}

fn read_guid(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    let bytes = cursor.take(16)?;
    let mut raw = [0u8; 16];
    raw.copy_from_slice(bytes);
    Ok(Value::Guid(Uuid::from_bytes(raw)))
}

fn write_enum(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Enum(v) => {
            write_varint(buf, u64::from(*v));
            Ok(())
        }
        other => Err(mismatch("Enum", other)),
    }
}

fn read_enum(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    let ordinal = cursor.varint()?;
    u32::try_from(ordinal)
        .map(Value::Enum)
        .map_err(|_| MetadataError::codec_corruption(format!("enum ordinal {ordinal} out of range")))
}

fn write_id(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::Id(v) => {
            buf.extend_from_slice(&v.raw().to_le_bytes());
            Ok(())
        }
        other => Err(mismatch("Id", other)),
    }
}

fn read_id(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    Ok(Value::Id(Oid::from_raw(cursor.u64_le()?)))
}

fn write_float_array(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::FloatArray(v) => {
            write_varint(buf, v.len() as u64);
            for item in v {
                buf.extend_from_slice(&item.to_bits().to_le_bytes());
            }
            Ok(())
        }
        other => Err(mismatch("FloatArray", other)),
    }
}

fn read_float_array(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    let len = cursor.varint_len()?;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(cursor.f64_le()?);
    }
    Ok(Value::FloatArray(items))
}

fn write_float_grid(buf: &mut Vec<u8>, value: &Value) -> Result<(), MetadataError> {
    match value {
        Value::FloatGrid(v) => {
            write_varint(buf, v.rows() as u64);
            write_varint(buf, v.cols() as u64);
            for item in v.data() {
                buf.extend_from_slice(&item.to_bits().to_le_bytes());
            }
            Ok(())
        }
        other => Err(mismatch("FloatGrid", other)),
    }
}

fn read_float_grid(cursor: &mut ByteReader<'_>) -> Result<Value, MetadataError> {
    let rows = cursor.varint_len()?;
    let cols = cursor.varint_len()?;
    let len = rows
        .checked_mul(cols)
        .ok_or_else(|| MetadataError::codec_corruption("grid shape overflows"))?;
    let mut data = Vec::with_capacity(len);
    for _ in 0..len {
        data.push(cursor.f64_le()?);
    }

    crate::value::FloatGrid::new(rows, cols, data)
        .map(Value::FloatGrid)
        .ok_or_else(|| MetadataError::codec_corruption("grid shape mismatch"))
}
