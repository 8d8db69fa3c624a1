//! The JSON record format.
//!
//! One object per record: `"$type"` names the class, `"$id"` carries the
//! identity in its transport form (`T`-prefixed when transient), and every
//! non-default property appears under its declared name. Identities are
//! always strings; raw 64-bit values do not survive JSON number
//! precision. Maps travel as `[key, value]` pair arrays to keep non-text
//! keys exact. Graph streams are arrays of entity records, root first.
//!
//! The export rendition is writer-only and meant for external consumers:
//! enum slots carry variant names and cascade-owned children held inline
//! are nested in place instead of reduced to references.

#[cfg(test)]
mod tests;

use crate::{
    codec::{assigned_pk, is_default, reference_id, reference_ids, reset_unseen, ObjectGraph, Resolver},
    dispatch::JsonOps,
    error::MetadataError,
    identity::Oid,
    instance::Instance,
    registry::{scalar_element_tag, ClassMeta, PropertyKind, PropertyMeta, Registry},
    value::{Value, ValueTag},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Map};
use std::str::FromStr;
use uuid::Uuid;

const TYPE_KEY: &str = "$type";
const ID_KEY: &str = "$id";

///
/// JsonEncoder
///

pub struct JsonEncoder<'a> {
    registry: &'a Registry,
    export: bool,
}

impl<'a> JsonEncoder<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            export: false,
        }
    }

    /// The export rendition: variant names for enums, inline children
    /// nested in place.
    #[must_use]
    pub const fn export(registry: &'a Registry) -> Self {
        Self {
            registry,
            export: true,
        }
    }

    pub fn entity_value(&self, instance: &Instance) -> Result<serde_json::Value, MetadataError> {
        let meta = self.registry.class(instance.class_id());
        if !meta.is_entity() {
            return Err(MetadataError::codec_encoding(format!(
                "'{}' is a component; use a component value",
                meta.name
            )));
        }
        let id = assigned_pk(meta, instance)?;

        let mut object = Map::new();
        object.insert(TYPE_KEY.to_string(), json!(meta.name));
        object.insert(ID_KEY.to_string(), json!(id.to_string()));
        self.write_properties(meta, instance, meta.primary_key, &mut object)?;

        Ok(serde_json::Value::Object(object))
    }

    pub fn component_value(&self, instance: &Instance) -> Result<serde_json::Value, MetadataError> {
        let meta = self.registry.class(instance.class_id());
        if !meta.is_component() {
            return Err(MetadataError::codec_encoding(format!(
                "'{}' is an entity; use an entity value",
                meta.name
            )));
        }

        let mut object = Map::new();
        object.insert(TYPE_KEY.to_string(), json!(meta.name));
        self.write_properties(meta, instance, None, &mut object)?;

        Ok(serde_json::Value::Object(object))
    }

    /// The owned closure of a root as an array of entity records, root
    /// first. In export mode children are nested instead and the result
    /// is the root object alone.
    pub fn graph_value(&self, root: &Instance) -> Result<serde_json::Value, MetadataError> {
        if self.export {
            return self.entity_value(root);
        }

        let owned = crate::walker::collect_owned(self.registry, root)?;
        let mut records = Vec::new();
        for instance in owned {
            if self.registry.class(instance.class_id()).is_entity() {
                records.push(self.entity_value(instance)?);
            }
        }

        Ok(serde_json::Value::Array(records))
    }

    fn write_properties(
        &self,
        meta: &ClassMeta,
        instance: &Instance,
        skip: Option<u32>,
        object: &mut Map<String, serde_json::Value>,
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

            object.insert(property.name.clone(), self.property_value(property, value)?);
        }

        Ok(())
    }

    fn property_value(
        &self,
        property: &PropertyMeta,
        value: &Value,
    ) -> Result<serde_json::Value, MetadataError> {
        match &property.kind {
            PropertyKind::Component(_) => {
                let instance = value.as_object().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "component slot '{}' holds '{}'",
                        property.name,
                        value.tag().label()
                    ))
                })?;
                self.body_value(instance)
            }
            PropertyKind::ComponentList(_) => {
                let items = value.as_elements().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "component list slot '{}' holds '{}'",
                        property.name,
                        value.tag().label()
                    ))
                })?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let instance = item.as_object().ok_or_else(|| {
                        MetadataError::codec_encoding(format!(
                            "non-object element in component list '{}'",
                            property.name
                        ))
                    })?;
                    out.push(self.body_value(instance)?);
                }
                Ok(serde_json::Value::Array(out))
            }
            PropertyKind::Relation { relation, .. } if relation.is_many() => {
                if self.export && property.is_owned_edge() {
                    return self.nested_children(property, value);
                }
                let ids = reference_ids(self.registry, property, value)?;
                Ok(serde_json::Value::Array(
                    ids.iter().map(|id| json!(id.to_string())).collect(),
                ))
            }
            PropertyKind::Relation { .. } => {
                if self.export
                    && property.is_owned_edge()
                    && let Some(child) = value.as_object()
                {
                    return self.entity_value(child);
                }
                let id = reference_id(self.registry, property, value)?;
                Ok(json!(id.to_string()))
            }
            PropertyKind::List(scalar) | PropertyKind::Set(scalar) | PropertyKind::Bag(scalar) => {
                let items = value.as_elements().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "collection slot '{}' holds '{}'",
                        property.name,
                        value.tag().label()
                    ))
                })?;
                let ops = self
                    .registry
                    .dispatch()
                    .json
                    .resolve(scalar_element_tag(*scalar))?;
                Ok(serde_json::Value::Array(
                    items.iter().map(|item| self.item_value(ops, item)).collect(),
                ))
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
                let key_ops = self
                    .registry
                    .dispatch()
                    .json
                    .resolve(scalar_element_tag(*key))?;
                let val_ops = self
                    .registry
                    .dispatch()
                    .json
                    .resolve(scalar_element_tag(*val))?;
                Ok(serde_json::Value::Array(
                    entries
                        .iter()
                        .map(|(k, v)| {
                            serde_json::Value::Array(vec![
                                (key_ops.write)(k),
                                self.item_value(val_ops, v),
                            ])
                        })
                        .collect(),
                ))
            }
            kind => {
                if self.export
                    && let (PropertyKind::Enum(meta), Value::Enum(ordinal)) = (kind, value)
                {
                    let name = meta.name_of(*ordinal).ok_or_else(|| {
                        MetadataError::codec_encoding(format!(
                            "enum ordinal {ordinal} out of range for '{}'",
                            property.name
                        ))
                    })?;
                    return Ok(json!(name));
                }

                let tag = kind.scalar_tag().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "unhandled property kind on '{}'",
                        property.name
                    ))
                })?;
                let ops = self.registry.dispatch().json.resolve(tag)?;
                Ok((ops.write)(value))
            }
        }
    }

    fn item_value(&self, ops: JsonOps, value: &Value) -> serde_json::Value {
        if value.is_null() {
            return serde_json::Value::Null;
        }
        (ops.write)(value)
    }

    fn nested_children(
        &self,
        property: &PropertyMeta,
        value: &Value,
    ) -> Result<serde_json::Value, MetadataError> {
        let items = value.as_elements().ok_or_else(|| {
            MetadataError::codec_encoding(format!(
                "to-many slot '{}' holds '{}'",
                property.name,
                value.tag().label()
            ))
        })?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item.as_object() {
                Some(child) => out.push(self.entity_value(child)?),
                None => {
                    let id = reference_id(self.registry, property, item)?;
                    out.push(json!(id.to_string()));
                }
            }
        }

        Ok(serde_json::Value::Array(out))
    }

    fn body_value(&self, instance: &Instance) -> Result<serde_json::Value, MetadataError> {
        let meta = self.registry.class(instance.class_id());
        let mut object = Map::new();
        self.write_properties(meta, instance, None, &mut object)?;

        Ok(serde_json::Value::Object(object))
    }
}

///
/// JsonDecoder
///
/// Reads the reference rendition only; export output is one-way.
///

pub struct JsonDecoder<'a> {
    registry: &'a Registry,
}

impl<'a> JsonDecoder<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn read_entity(
        &self,
        json: &serde_json::Value,
        resolver: &mut dyn Resolver,
    ) -> Result<Instance, MetadataError> {
        let object = as_object(json)?;
        let name = required_str(object, TYPE_KEY)?;
        let meta = self.registry.expect(name)?;
        if !meta.is_entity() {
            return Err(MetadataError::codec_corruption(format!(
                "entity record names component '{name}'"
            )));
        }
        let id = Oid::from_str(required_str(object, ID_KEY)?)
            .map_err(|err| MetadataError::codec_corruption(err.to_string()))?;

        let mut instance = resolver.resolve(id, meta)?;
        instance.set_pk(meta, id)?;

        let mut seen = vec![false; meta.properties.len()];
        if let Some(pk) = meta.primary_key {
            seen[pk as usize] = true;
        }
        self.read_properties(meta, object, &mut instance, &mut seen)?;
        reset_unseen(meta, &mut instance, &seen);

        Ok(instance)
    }

    pub fn read_component(&self, json: &serde_json::Value) -> Result<Instance, MetadataError> {
        let object = as_object(json)?;
        let name = required_str(object, TYPE_KEY)?;
        let meta = self.registry.expect(name)?;
        if !meta.is_component() {
            return Err(MetadataError::codec_corruption(format!(
                "component record names entity '{name}'"
            )));
        }

        let mut instance = self.registry.create(meta.id);
        let mut seen = vec![false; meta.properties.len()];
        self.read_properties(meta, object, &mut instance, &mut seen)?;

        Ok(instance)
    }

    pub fn read_graph(
        &self,
        json: &serde_json::Value,
        resolver: &mut dyn Resolver,
    ) -> Result<ObjectGraph, MetadataError> {
        let serde_json::Value::Array(records) = json else {
            return Err(MetadataError::codec_corruption(
                "graph stream must be an array of entity records",
            ));
        };

        let mut graph = ObjectGraph::new();
        for record in records {
            let instance = self.read_entity(record, resolver)?;
            graph.insert(self.registry, instance);
        }

        Ok(graph)
    }

    fn read_properties(
        &self,
        meta: &ClassMeta,
        object: &Map<String, serde_json::Value>,
        instance: &mut Instance,
        seen: &mut [bool],
    ) -> Result<(), MetadataError> {
        for (name, raw) in object {
            if name == TYPE_KEY || name == ID_KEY {
                continue;
            }
            let property = meta.property_by_name(name).ok_or_else(|| {
                MetadataError::codec_corruption(format!(
                    "'{}' has no property '{name}'",
                    meta.name
                ))
            })?;

            let value = self.read_property(property, raw)?;
            instance.set_raw(property.index, value);
            seen[property.index as usize] = true;
        }

        Ok(())
    }

    fn read_property(
        &self,
        property: &PropertyMeta,
        raw: &serde_json::Value,
    ) -> Result<Value, MetadataError> {
        if raw.is_null() {
            return Ok(Value::Null);
        }

        match &property.kind {
            PropertyKind::Component(target) => {
                let meta = self.registry.class(*target);
                Ok(self.read_body(meta, raw)?.into())
            }
            PropertyKind::ComponentList(target) => {
                let meta = self.registry.class(*target);
                let items = as_array(raw, property)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.read_body(meta, item)?.into());
                }
                Ok(Value::List(out))
            }
            PropertyKind::Relation { relation, .. } if relation.is_many() => {
                let items = as_array(raw, property)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(Value::Id(parse_ref(item, property)?));
                }
                Ok(Value::List(out))
            }
            PropertyKind::Relation { .. } => Ok(Value::Id(parse_ref(raw, property)?)),
            PropertyKind::List(scalar) | PropertyKind::Set(scalar) | PropertyKind::Bag(scalar) => {
                let ops = self
                    .registry
                    .dispatch()
                    .json
                    .resolve(scalar_element_tag(*scalar))?;
                let items = as_array(raw, property)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if item.is_null() {
                        out.push(Value::Null);
                    } else {
                        out.push((ops.read)(item)?);
                    }
                }
                Ok(match property.kind {
                    PropertyKind::Set(_) => Value::Set(out),
                    PropertyKind::Bag(_) => Value::Bag(out),
                    _ => Value::List(out),
                })
            }
            PropertyKind::Map(key, val) => {
                let key_ops = self
                    .registry
                    .dispatch()
                    .json
                    .resolve(scalar_element_tag(*key))?;
                let val_ops = self
                    .registry
                    .dispatch()
                    .json
                    .resolve(scalar_element_tag(*val))?;
                let pairs = as_array(raw, property)?;
                let mut entries = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    let serde_json::Value::Array(pair) = pair else {
                        return Err(MetadataError::codec_corruption(format!(
                            "map entry in '{}' must be a [key, value] pair",
                            property.name
                        )));
                    };
                    let [k, v] = pair.as_slice() else {
                        return Err(MetadataError::codec_corruption(format!(
                            "map entry in '{}' must be a [key, value] pair",
                            property.name
                        )));
                    };
                    let k = (key_ops.read)(k)?;
                    let v = if v.is_null() { Value::Null } else { (val_ops.read)(v)? };
                    entries.push((k, v));
                }
                Ok(Value::Map(Value::normalize_map_entries(entries)))
            }
            kind => {
                // Enum slots accept both the ordinal and the variant name.
                if let PropertyKind::Enum(meta) = kind
                    && let Some(name) = raw.as_str()
                {
                    return meta.ordinal_of(name).map(Value::Enum).ok_or_else(|| {
                        MetadataError::codec_corruption(format!(
                            "unknown variant '{name}' for '{}'",
                            property.name
                        ))
                    });
                }

                let tag = kind.scalar_tag().ok_or_else(|| {
                    MetadataError::codec_corruption(format!(
                        "unhandled property kind on '{}'",
                        property.name
                    ))
                })?;
                let ops = self.registry.dispatch().json.resolve(tag)?;
                (ops.read)(raw)
            }
        }
    }

    fn read_body(
        &self,
        meta: &ClassMeta,
        raw: &serde_json::Value,
    ) -> Result<Instance, MetadataError> {
        let object = as_object(raw)?;
        let mut instance = self.registry.create(meta.id);
        let mut seen = vec![false; meta.properties.len()];
        self.read_properties(meta, object, &mut instance, &mut seen)?;

        Ok(instance)
    }
}

fn as_object(raw: &serde_json::Value) -> Result<&Map<String, serde_json::Value>, MetadataError> {
    raw.as_object().ok_or_else(|| {
        MetadataError::codec_corruption("expected a JSON object record")
    })
}

fn as_array<'j>(
    raw: &'j serde_json::Value,
    property: &PropertyMeta,
) -> Result<&'j Vec<serde_json::Value>, MetadataError> {
    match raw {
        serde_json::Value::Array(items) => Ok(items),
        _ => Err(MetadataError::codec_corruption(format!(
            "'{}' must be a JSON array",
            property.name
        ))),
    }
}

fn required_str<'j>(
    object: &'j Map<String, serde_json::Value>,
    key: &str,
) -> Result<&'j str, MetadataError> {
    object
        .get(key)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            MetadataError::codec_corruption(format!("record is missing its '{key}' field"))
        })
}

fn parse_ref(raw: &serde_json::Value, property: &PropertyMeta) -> Result<Oid, MetadataError> {
    let text = raw.as_str().ok_or_else(|| {
        MetadataError::codec_corruption(format!(
            "reference in '{}' must be an id string",
            property.name
        ))
    })?;

    Oid::from_str(text).map_err(|err| MetadataError::codec_corruption(err.to_string()))
}

///
/// BUILTIN SCALARS
///

pub(crate) fn builtin_scalar_ops(tag: ValueTag) -> Option<JsonOps> {
    Some(match tag {
        ValueTag::Bool => JsonOps { write: json_of_bool, read: bool_of_json },
        ValueTag::Int => JsonOps { write: json_of_int, read: int_of_json },
        ValueTag::Uint => JsonOps { write: json_of_uint, read: uint_of_json },
        ValueTag::Float => JsonOps { write: json_of_float, read: float_of_json },
        ValueTag::Text => JsonOps { write: json_of_text, read: text_of_json },
        ValueTag::Blob => JsonOps { write: json_of_blob, read: blob_of_json },
        ValueTag::Timestamp => JsonOps { write: json_of_timestamp, read: timestamp_of_json },
        ValueTag::Date => JsonOps { write: json_of_date, read: date_of_json },
        ValueTag::Guid => JsonOps { write: json_of_guid, read: guid_of_json },
        ValueTag::Enum => JsonOps { write: json_of_enum, read: enum_of_json },
        ValueTag::Id => JsonOps { write: json_of_id, read: id_of_json },
        ValueTag::FloatArray => JsonOps { write: json_of_float_array, read: float_array_of_json },
        ValueTag::FloatGrid => JsonOps { write: json_of_float_grid, read: float_grid_of_json },
        _ => return None,
    })
}

fn shape_error(expected: &str, raw: &serde_json::Value) -> MetadataError {
    MetadataError::codec_corruption(format!("expected {expected}, found {raw}"))
}

// Non-finite doubles have no JSON number form and travel as strings.
fn json_of_f64(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map_or_else(|| json!(value.to_string()), serde_json::Value::Number)
}

fn f64_of_json(raw: &serde_json::Value) -> Result<f64, MetadataError> {
    if let Some(value) = raw.as_f64() {
        return Ok(value);
    }
    raw.as_str()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| shape_error("a float", raw))
}

fn json_of_bool(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => json!(v),
        _ => serde_json::Value::Null,
    }
}

fn bool_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    raw.as_bool()
        .map(Value::Bool)
        .ok_or_else(|| shape_error("a bool", raw))
}

fn json_of_int(value: &Value) -> serde_json::Value {
    match value {
        Value::Int(v) => json!(v),
        _ => serde_json::Value::Null,
    }
}

fn int_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    raw.as_i64()
        .map(Value::Int)
        .ok_or_else(|| shape_error("an integer", raw))
}

fn json_of_uint(value: &Value) -> serde_json::Value {
    match value {
        Value::Uint(v) => json!(v),
        _ => serde_json::Value::Null,
    }
}

fn uint_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    raw.as_u64()
        .map(Value::Uint)
        .ok_or_else(|| shape_error("an unsigned integer", raw))
}

fn json_of_float(value: &Value) -> serde_json::Value {
    match value {
        Value::Float(v) => json_of_f64(*v),
        _ => serde_json::Value::Null,
    }
}

fn float_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    f64_of_json(raw).map(Value::Float)
}

fn json_of_text(value: &Value) -> serde_json::Value {
    match value {
        Value::Text(v) => json!(v),
        _ => serde_json::Value::Null,
    }
}

fn text_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    raw.as_str()
        .map(|text| Value::Text(text.to_string()))
        .ok_or_else(|| shape_error("a string", raw))
}

fn json_of_blob(value: &Value) -> serde_json::Value {
    match value {
        Value::Blob(v) => {
            let mut out = String::with_capacity(v.len() * 2);
            for byte in v {
                out.push_str(&format!("{byte:02x}"));
            }
            json!(out)
        }
        _ => serde_json::Value::Null,
    }
}

fn blob_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    let text = raw.as_str().ok_or_else(|| shape_error("a hex string", raw))?;
    if text.len() % 2 != 0 {
        return Err(shape_error("a hex string", raw));
    }
    let mut bytes = Vec::with_capacity(text.len() / 2);
    for chunk in text.as_bytes().chunks_exact(2) {
        let pair =
            std::str::from_utf8(chunk).map_err(|_| shape_error("a hex string", raw))?;
        bytes.push(u8::from_str_radix(pair, 16).map_err(|_| shape_error("a hex string", raw))?);
    }
    Ok(Value::Blob(bytes))
}

fn json_of_timestamp(value: &Value) -> serde_json::Value {
    match value {
        Value::Timestamp(v) => json!(v.to_rfc3339_opts(SecondsFormat::Secs, true)),
        _ => serde_json::Value::Null,
    }
}

fn timestamp_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    let text = raw
        .as_str()
        .ok_or_else(|| shape_error("an RFC 3339 timestamp", raw))?;
    DateTime::parse_from_rfc3339(text)
        .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
        .map_err(|_| shape_error("an RFC 3339 timestamp", raw))
}

fn json_of_date(value: &Value) -> serde_json::Value {
    match value {
        Value::Date(v) => json!(v.to_string()),
        _ => serde_json::Value::Null,
    }
}

fn date_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    let text = raw.as_str().ok_or_else(|| shape_error("a date string", raw))?;
    NaiveDate::from_str(text)
        .map(Value::Date)
        .map_err(|_| shape_error("a date string", raw))
}

fn json_of_guid(value: &Value) -> serde_json::Value {
    match value {
        Value::Guid(v) => json!(v.to_string()),
        _ => serde_json::Value::Null,
    }
}

fn guid_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    let text = raw.as_str().ok_or_else(|| shape_error("a guid string", raw))?;
    Uuid::from_str(text)
        .map(Value::Guid)
        .map_err(|_| shape_error("a guid string", raw))
}

fn json_of_enum(value: &Value) -> serde_json::Value {
    match value {
        Value::Enum(v) => json!(v),
        _ => serde_json::Value::Null,
    }
}

fn enum_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    raw.as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .map(Value::Enum)
        .ok_or_else(|| shape_error("an enum ordinal", raw))
}

fn json_of_id(value: &Value) -> serde_json::Value {
    match value {
        Value::Id(v) => json!(v.to_string()),
        _ => serde_json::Value::Null,
    }
}

fn id_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    let text = raw.as_str().ok_or_else(|| shape_error("an id string", raw))?;
    Oid::from_str(text)
        .map(Value::Id)
        .map_err(|_| shape_error("an id string", raw))
}

fn json_of_float_array(value: &Value) -> serde_json::Value {
    match value {
        Value::FloatArray(v) => {
            serde_json::Value::Array(v.iter().map(|item| json_of_f64(*item)).collect())
        }
        _ => serde_json::Value::Null,
    }
}

fn float_array_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    let serde_json::Value::Array(items) = raw else {
        return Err(shape_error("a float array", raw));
    };
    items
        .iter()
        .map(f64_of_json)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::FloatArray)
}

fn json_of_float_grid(value: &Value) -> serde_json::Value {
    match value {
        Value::FloatGrid(v) => json!({
            "rows": v.rows(),
            "cols": v.cols(),
            "data": v.data().iter().map(|item| json_of_f64(*item)).collect::<Vec<_>>(),
        }),
        _ => serde_json::Value::Null,
    }
}

fn float_grid_of_json(raw: &serde_json::Value) -> Result<Value, MetadataError> {
    let object = raw.as_object().ok_or_else(|| shape_error("a grid object", raw))?;
    let rows = object
        .get("rows")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| shape_error("a grid object", raw))?;
    let cols = object
        .get("cols")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| shape_error("a grid object", raw))?;
    let data = match object.get("data") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(f64_of_json)
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(shape_error("a grid object", raw)),
    };

    crate::value::FloatGrid::new(rows as usize, cols as usize, data)
        .map(Value::FloatGrid)
        .ok_or_else(|| shape_error("a grid object", raw))
}
