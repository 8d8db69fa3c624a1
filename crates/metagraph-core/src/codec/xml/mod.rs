//! The XML record format.
//!
//! One element per record, named by type: `<Customer id="T5">...</Customer>`.
//! Non-default properties become child elements named by property, scalar
//! content as canonical text, collections as `<Item>` runs, references as
//! self-closing elements with a `ref` attribute. Enum slots render their
//! variant name. Graph streams wrap entity records in a `<Graph>` element.

pub mod markup;

#[cfg(test)]
mod tests;

use crate::{
    codec::{assigned_pk, is_default, reference_id, reference_ids, reset_unseen, ObjectGraph, Resolver},
    dispatch::TextOps,
    error::MetadataError,
    identity::Oid,
    instance::Instance,
    registry::{scalar_element_tag, ClassMeta, PropertyKind, PropertyMeta, Registry},
    value::{Value, ValueTag},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use markup::{XmlParser, XmlToken, XmlWriter};
use std::str::FromStr;
use uuid::Uuid;

const GRAPH_ELEMENT: &str = "Graph";
const ITEM_ELEMENT: &str = "Item";

///
/// XmlEncoder
///

pub struct XmlEncoder<'a> {
    registry: &'a Registry,
    writer: XmlWriter,
}

impl<'a> XmlEncoder<'a> {
    #[must_use]
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            writer: XmlWriter::new(),
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.writer.into_string()
    }

    pub fn write_entity(&mut self, instance: &Instance) -> Result<(), MetadataError> {
        let meta = self.registry.class(instance.class_id());
        if !meta.is_entity() {
            return Err(MetadataError::codec_encoding(format!(
                "'{}' is a component; use a component element",
                meta.name
            )));
        }
        let id = assigned_pk(meta, instance)?.to_string();
        self.writer.open(&meta.name, &[("id", &id)]);
        self.write_properties(meta, instance, meta.primary_key)?;
        self.writer.close(&meta.name);

        Ok(())
    }

    pub fn write_component(&mut self, instance: &Instance) -> Result<(), MetadataError> {
        let meta = self.registry.class(instance.class_id());
        if !meta.is_component() {
            return Err(MetadataError::codec_encoding(format!(
                "'{}' is an entity; use an entity element",
                meta.name
            )));
        }

        self.writer.open(&meta.name, &[]);
        self.write_properties(meta, instance, None)?;
        self.writer.close(&meta.name);

        Ok(())
    }

    /// Write the owned closure of a root as entity records inside one
    /// `<Graph>` element, root first.
    pub fn write_graph(&mut self, root: &Instance) -> Result<(), MetadataError> {
        self.writer.open(GRAPH_ELEMENT, &[]);
        let owned = crate::walker::collect_owned(self.registry, root)?;
        for instance in owned {
            if self.registry.class(instance.class_id()).is_entity() {
                self.write_entity(instance)?;
            }
        }
        self.writer.close(GRAPH_ELEMENT);

        Ok(())
    }

    fn write_properties(
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

            self.write_property(property, value)?;
        }

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
                self.writer.open(&property.name, &[]);
                self.write_body(instance)?;
                self.writer.close(&property.name);
            }
            PropertyKind::ComponentList(_) => {
                let items = value.as_elements().ok_or_else(|| {
                    MetadataError::codec_encoding(format!(
                        "component list slot '{}' holds '{}'",
                        property.name,
                        value.tag().label()
                    ))
                })?;
                self.writer.open(&property.name, &[]);
                for item in items {
                    let instance = item.as_object().ok_or_else(|| {
                        MetadataError::codec_encoding(format!(
                            "non-object element in component list '{}'",
                            property.name
                        ))
                    })?;
                    self.writer.open(ITEM_ELEMENT, &[]);
                    self.write_body(instance)?;
                    self.writer.close(ITEM_ELEMENT);
                }
                self.writer.close(&property.name);
            }
            PropertyKind::Relation { relation, .. } if relation.is_many() => {
                let ids = reference_ids(self.registry, property, value)?;
                self.writer.open(&property.name, &[]);
                for id in ids {
                    self.writer
                        .self_closing(ITEM_ELEMENT, &[("ref", &id.to_string())]);
                }
                self.writer.close(&property.name);
            }
            PropertyKind::Relation { .. } => {
                let id = reference_id(self.registry, property, value)?;
                self.writer
                    .self_closing(&property.name, &[("ref", &id.to_string())]);
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
                    .xml
                    .resolve(scalar_element_tag(*scalar))?;
                self.writer.open(&property.name, &[]);
                for item in items {
                    self.write_item(ops, item, None)?;
                }
                self.writer.close(&property.name);
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
                    .xml
                    .resolve(scalar_element_tag(*key))?;
                let val_ops = self
                    .registry
                    .dispatch()
                    .xml
                    .resolve(scalar_element_tag(*val))?;
                self.writer.open(&property.name, &[]);
                for (k, v) in &entries {
                    let key_text = (key_ops.write)(k)?;
                    self.write_item(val_ops, v, Some(&key_text))?;
                }
                self.writer.close(&property.name);
            }
            kind => {
                let text = scalar_text(self.registry, kind, property, value)?;
                self.writer.open(&property.name, &[]);
                self.writer.text(&text);
                self.writer.close(&property.name);
            }
        }

        Ok(())
    }

    fn write_item(
        &mut self,
        ops: TextOps,
        value: &Value,
        key: Option<&str>,
    ) -> Result<(), MetadataError> {
        let mut attrs: Vec<(&str, &str)> = Vec::new();
        if let Some(key) = key {
            attrs.push(("key", key));
        }

        if value.is_null() {
            attrs.push(("null", "true"));
            self.writer.self_closing(ITEM_ELEMENT, &attrs);
            return Ok(());
        }

        self.writer.open(ITEM_ELEMENT, &attrs);
        self.writer.text(&(ops.write)(value)?);
        self.writer.close(ITEM_ELEMENT);

        Ok(())
    }

    fn write_body(&mut self, instance: &Instance) -> Result<(), MetadataError> {
        let meta = self.registry.class(instance.class_id());
        self.write_properties(meta, instance, None)
    }
}

///
/// XmlDecoder
///

pub struct XmlDecoder<'a> {
    registry: &'a Registry,
    parser: XmlParser<'a>,
}

impl<'a> XmlDecoder<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry, input: &'a str) -> Self {
        Self {
            registry,
            parser: XmlParser::new(input),
        }
    }

    pub fn read_entity(&mut self, resolver: &mut dyn Resolver) -> Result<Instance, MetadataError> {
        let token = self.parser.expect_open()?;
        self.read_entity_from(&token, resolver)
    }

    pub fn read_component(&mut self) -> Result<Instance, MetadataError> {
        let token = self.parser.expect_open()?;
        let XmlToken::Open { name, .. } = &token else {
            unreachable!("expect_open returns open tokens");
        };
        let meta = self.registry.expect(name)?;
        if !meta.is_component() {
            return Err(MetadataError::codec_corruption(format!(
                "component element names entity '{name}'"
            )));
        }

        self.read_body(meta, name)
    }

    pub fn read_graph(&mut self, resolver: &mut dyn Resolver) -> Result<ObjectGraph, MetadataError> {
        let token = self.parser.expect_open()?;
        let XmlToken::Open { name, .. } = &token else {
            unreachable!("expect_open returns open tokens");
        };
        if name != GRAPH_ELEMENT {
            return Err(MetadataError::codec_corruption(format!(
                "expected <{GRAPH_ELEMENT}>, found <{name}>"
            )));
        }

        let mut graph = ObjectGraph::new();
        loop {
            match self.parser.peek()? {
                Some(XmlToken::Close(close)) if close == GRAPH_ELEMENT => {
                    self.parser.next()?;
                    return Ok(graph);
                }
                _ => {
                    let token = self.parser.expect_open()?;
                    let instance = self.read_entity_from(&token, resolver)?;
                    graph.insert(self.registry, instance);
                }
            }
        }
    }

    fn read_entity_from(
        &mut self,
        token: &XmlToken,
        resolver: &mut dyn Resolver,
    ) -> Result<Instance, MetadataError> {
        let XmlToken::Open { name, .. } = token else {
            unreachable!("callers pass open tokens");
        };
        let meta = self.registry.expect(name)?;
        if !meta.is_entity() {
            return Err(MetadataError::codec_corruption(format!(
                "entity element names component '{name}'"
            )));
        }
        let id = token
            .attr("id")
            .ok_or_else(|| {
                MetadataError::codec_corruption(format!("<{name}> is missing its id attribute"))
            })
            .and_then(|raw| {
                Oid::from_str(raw)
                    .map_err(|err| MetadataError::codec_corruption(err.to_string()))
            })?;

        let mut instance = resolver.resolve(id, meta)?;
        instance.set_pk(meta, id)?;

        let mut seen = vec![false; meta.properties.len()];
        if let Some(pk) = meta.primary_key {
            seen[pk as usize] = true;
        }
        self.read_properties(meta, name, &mut instance, &mut seen)?;
        reset_unseen(meta, &mut instance, &seen);

        Ok(instance)
    }

    fn read_body(&mut self, meta: &ClassMeta, close: &str) -> Result<Instance, MetadataError> {
        let mut instance = self.registry.create(meta.id);
        let mut seen = vec![false; meta.properties.len()];
        self.read_properties(meta, close, &mut instance, &mut seen)?;

        Ok(instance)
    }

    fn read_properties(
        &mut self,
        meta: &ClassMeta,
        close: &str,
        instance: &mut Instance,
        seen: &mut [bool],
    ) -> Result<(), MetadataError> {
        loop {
            match self.parser.peek()? {
                Some(XmlToken::Close(name)) if name == close => {
                    self.parser.next()?;
                    return Ok(());
                }
                _ => {
                    let token = self.parser.expect_open()?;
                    let XmlToken::Open { name, .. } = &token else {
                        unreachable!("expect_open returns open tokens");
                    };
                    let property = meta.property_by_name(name).ok_or_else(|| {
                        MetadataError::codec_corruption(format!(
                            "'{}' has no property '{name}'",
                            meta.name
                        ))
                    })?;

                    let value = self.read_property(property, &token)?;
                    instance.set_raw(property.index, value);
                    seen[property.index as usize] = true;
                }
            }
        }
    }

    fn read_property(
        &mut self,
        property: &PropertyMeta,
        token: &XmlToken,
    ) -> Result<Value, MetadataError> {
        match &property.kind {
            PropertyKind::Component(target) => {
                let meta = self.registry.class(*target);
                Ok(self.read_body(meta, &property.name)?.into())
            }
            PropertyKind::ComponentList(target) => {
                let meta = self.registry.class(*target);
                let mut items = Vec::new();
                loop {
                    match self.parser.peek()? {
                        Some(XmlToken::Close(name)) if name == &property.name => {
                            self.parser.next()?;
                            return Ok(Value::List(items));
                        }
                        _ => {
                            let item = self.parser.expect_open()?;
                            self.expect_item(&item, property)?;
                            items.push(self.read_body(meta, ITEM_ELEMENT)?.into());
                        }
                    }
                }
            }
            PropertyKind::Relation { relation, .. } if relation.is_many() => {
                let mut items = Vec::new();
                loop {
                    match self.parser.peek()? {
                        Some(XmlToken::Close(name)) if name == &property.name => {
                            self.parser.next()?;
                            return Ok(Value::List(items));
                        }
                        _ => {
                            let item = self.parser.expect_open()?;
                            self.expect_item(&item, property)?;
                            items.push(Value::Id(self.read_ref(&item, property, ITEM_ELEMENT)?));
                        }
                    }
                }
            }
            PropertyKind::Relation { .. } => {
                Ok(Value::Id(self.read_ref(token, property, &property.name)?))
            }
            PropertyKind::List(scalar) | PropertyKind::Set(scalar) | PropertyKind::Bag(scalar) => {
                let ops = self
                    .registry
                    .dispatch()
                    .xml
                    .resolve(scalar_element_tag(*scalar))?;
                let mut items = Vec::new();
                loop {
                    match self.parser.peek()? {
                        Some(XmlToken::Close(name)) if name == &property.name => {
                            self.parser.next()?;
                            break;
                        }
                        _ => {
                            let item = self.parser.expect_open()?;
                            self.expect_item(&item, property)?;
                            items.push(self.read_item(ops, &item)?);
                        }
                    }
                }
                Ok(match property.kind {
                    PropertyKind::Set(_) => Value::Set(items),
                    PropertyKind::Bag(_) => Value::Bag(items),
                    _ => Value::List(items),
                })
            }
            PropertyKind::Map(key, val) => {
                let key_ops = self
                    .registry
                    .dispatch()
                    .xml
                    .resolve(scalar_element_tag(*key))?;
                let val_ops = self
                    .registry
                    .dispatch()
                    .xml
                    .resolve(scalar_element_tag(*val))?;
                let mut entries = Vec::new();
                loop {
                    match self.parser.peek()? {
                        Some(XmlToken::Close(name)) if name == &property.name => {
                            self.parser.next()?;
                            return Ok(Value::Map(Value::normalize_map_entries(entries)));
                        }
                        _ => {
                            let item = self.parser.expect_open()?;
                            self.expect_item(&item, property)?;
                            let key_text = item.attr("key").ok_or_else(|| {
                                MetadataError::codec_corruption(format!(
                                    "map entry in '{}' is missing its key attribute",
                                    property.name
                                ))
                            })?;
                            let k = (key_ops.read)(key_text)?;
                            let v = self.read_item(val_ops, &item)?;
                            entries.push((k, v));
                        }
                    }
                }
            }
            kind => {
                let text = self.parser.take_text()?;
                self.parser.expect_close(&property.name)?;
                scalar_from_text(self.registry, kind, property, &text)
            }
        }
    }

    fn read_item(&mut self, ops: TextOps, item: &XmlToken) -> Result<Value, MetadataError> {
        if item.attr("null") == Some("true") {
            return Ok(Value::Null);
        }
        let self_closing = matches!(item, XmlToken::Open { self_closing: true, .. });
        if self_closing {
            return (ops.read)("");
        }

        let text = self.parser.take_text()?;
        self.parser.expect_close(ITEM_ELEMENT)?;
        (ops.read)(&text)
    }

    fn read_ref(
        &mut self,
        token: &XmlToken,
        property: &PropertyMeta,
        close: &str,
    ) -> Result<Oid, MetadataError> {
        let raw = token.attr("ref").ok_or_else(|| {
            MetadataError::codec_corruption(format!(
                "reference element '{}' is missing its ref attribute",
                property.name
            ))
        })?;
        let id = Oid::from_str(raw)
            .map_err(|err| MetadataError::codec_corruption(err.to_string()))?;

        if !matches!(token, XmlToken::Open { self_closing: true, .. }) {
            self.parser.expect_close(close)?;
        }

        Ok(id)
    }

    fn expect_item(&self, token: &XmlToken, property: &PropertyMeta) -> Result<(), MetadataError> {
        match token {
            XmlToken::Open { name, .. } if name == ITEM_ELEMENT => Ok(()),
            other => Err(MetadataError::codec_corruption(format!(
                "expected <{ITEM_ELEMENT}> inside '{}', found {other:?}",
                property.name
            ))),
        }
    }
}

// Enum slots render variant names; everything else goes through dispatch.
fn scalar_text(
    registry: &Registry,
    kind: &PropertyKind,
    property: &PropertyMeta,
    value: &Value,
) -> Result<String, MetadataError> {
    if let (PropertyKind::Enum(meta), Value::Enum(ordinal)) = (kind, value) {
        return meta.name_of(*ordinal).map(str::to_string).ok_or_else(|| {
            MetadataError::codec_encoding(format!(
                "enum ordinal {ordinal} out of range for '{}'",
                property.name
            ))
        });
    }

    let tag = kind.scalar_tag().ok_or_else(|| {
        MetadataError::codec_encoding(format!("unhandled property kind on '{}'", property.name))
    })?;
    let ops = registry.dispatch().xml.resolve(tag)?;
    (ops.write)(value)
}

fn scalar_from_text(
    registry: &Registry,
    kind: &PropertyKind,
    property: &PropertyMeta,
    text: &str,
) -> Result<Value, MetadataError> {
    if let PropertyKind::Enum(meta) = kind {
        return meta.ordinal_of(text).map(Value::Enum).ok_or_else(|| {
            MetadataError::codec_corruption(format!(
                "unknown variant '{text}' for '{}'",
                property.name
            ))
        });
    }

    let tag = kind.scalar_tag().ok_or_else(|| {
        MetadataError::codec_corruption(format!("unhandled property kind on '{}'", property.name))
    })?;
    let ops = registry.dispatch().xml.resolve(tag)?;
    (ops.read)(text)
}

///
/// BUILTIN SCALARS
///
/// Canonical text forms shared by attribute and element content.
///

pub(crate) fn builtin_scalar_ops(tag: ValueTag) -> Option<TextOps> {
    Some(match tag {
        ValueTag::Bool => TextOps { write: text_of_bool, read: bool_of_text },
        ValueTag::Int => TextOps { write: text_of_int, read: int_of_text },
        ValueTag::Uint => TextOps { write: text_of_uint, read: uint_of_text },
        ValueTag::Float => TextOps { write: text_of_float, read: float_of_text },
        ValueTag::Text => TextOps { write: text_of_text, read: text_of_input },
        ValueTag::Blob => TextOps { write: text_of_blob, read: blob_of_text },
        ValueTag::Timestamp => TextOps { write: text_of_timestamp, read: timestamp_of_text },
        ValueTag::Date => TextOps { write: text_of_date, read: date_of_text },
        ValueTag::Guid => TextOps { write: text_of_guid, read: guid_of_text },
        ValueTag::Enum => TextOps { write: text_of_enum, read: enum_of_text },
        ValueTag::Id => TextOps { write: text_of_id, read: id_of_text },
        ValueTag::FloatArray => TextOps { write: text_of_float_array, read: float_array_of_text },
        ValueTag::FloatGrid => TextOps { write: text_of_float_grid, read: float_grid_of_text },
        _ => return None,
    })
}

fn text_mismatch(expected: &str, value: &Value) -> MetadataError {
    MetadataError::codec_encoding(format!(
        "expected {expected} value, found '{}'",
        value.tag().label()
    ))
}

fn unparsable(what: &str, text: &str) -> MetadataError {
    MetadataError::codec_corruption(format!("cannot parse {what} from '{text}'"))
}

fn text_of_bool(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Bool(v) => Ok(v.to_string()),
        other => Err(text_mismatch("Bool", other)),
    }
}

fn bool_of_text(text: &str) -> Result<Value, MetadataError> {
    match text {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(unparsable("Bool", text)),
    }
}

fn text_of_int(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Int(v) => Ok(v.to_string()),
        other => Err(text_mismatch("Int", other)),
    }
}

fn int_of_text(text: &str) -> Result<Value, MetadataError> {
    text.parse().map(Value::Int).map_err(|_| unparsable("Int", text))
}

fn text_of_uint(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Uint(v) => Ok(v.to_string()),
        other => Err(text_mismatch("Uint", other)),
    }
}

fn uint_of_text(text: &str) -> Result<Value, MetadataError> {
    text.parse().map(Value::Uint).map_err(|_| unparsable("Uint", text))
}

fn text_of_float(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Float(v) => Ok(v.to_string()),
        other => Err(text_mismatch("Float", other)),
    }
}

fn float_of_text(text: &str) -> Result<Value, MetadataError> {
    text.parse().map(Value::Float).map_err(|_| unparsable("Float", text))
}

fn text_of_text(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Text(v) => Ok(v.clone()),
        other => Err(text_mismatch("Text", other)),
    }
}

fn text_of_input(text: &str) -> Result<Value, MetadataError> {
    Ok(Value::Text(text.to_string()))
}

fn text_of_blob(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Blob(v) => {
            let mut out = String::with_capacity(v.len() * 2);
            for byte in v {
                out.push_str(&format!("{byte:02x}"));
            }
            Ok(out)
        }
        other => Err(text_mismatch("Blob", other)),
    }
}

fn blob_of_text(text: &str) -> Result<Value, MetadataError> {
    if text.len() % 2 != 0 {
        return Err(unparsable("Blob", text));
    }
    let mut bytes = Vec::with_capacity(text.len() / 2);
    for chunk in text.as_bytes().chunks_exact(2) {
        let pair = std::str::from_utf8(chunk).map_err(|_| unparsable("Blob", text))?;
        bytes.push(u8::from_str_radix(pair, 16).map_err(|_| unparsable("Blob", text))?);
    }
    Ok(Value::Blob(bytes))
}

fn text_of_timestamp(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Timestamp(v) => Ok(v.to_rfc3339_opts(SecondsFormat::Secs, true)),
        other => Err(text_mismatch("Timestamp", other)),
    }
}

fn timestamp_of_text(text: &str) -> Result<Value, MetadataError> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
        .map_err(|_| unparsable("Timestamp", text))
}

fn text_of_date(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Date(v) => Ok(v.to_string()),
        other => Err(text_mismatch("Date", other)),
    }
}

fn date_of_text(text: &str) -> Result<Value, MetadataError> {
    NaiveDate::from_str(text)
        .map(Value::Date)
        .map_err(|_| unparsable("Date", text))
}

fn text_of_guid(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Guid(v) => Ok(v.to_string()),
        other => Err(text_mismatch("Guid", other)),
    }
}

fn guid_of_text(text: &str) -> Result<Value, MetadataError> {
    Uuid::from_str(text)
        .map(Value::Guid)
        .map_err(|_| unparsable("Guid", text))
}

// Context-free fallback: ordinal form. Enum properties override this with
// variant names because the codec has the property metadata in hand.
fn text_of_enum(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Enum(v) => Ok(v.to_string()),
        other => Err(text_mismatch("Enum", other)),
    }
}

fn enum_of_text(text: &str) -> Result<Value, MetadataError> {
    text.parse().map(Value::Enum).map_err(|_| unparsable("Enum", text))
}

fn text_of_id(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Id(v) => Ok(v.to_string()),
        other => Err(text_mismatch("Id", other)),
    }
}

fn id_of_text(text: &str) -> Result<Value, MetadataError> {
    Oid::from_str(text)
        .map(Value::Id)
        .map_err(|_| unparsable("Id", text))
}

fn text_of_float_array(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::FloatArray(v) => Ok(v
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")),
        other => Err(text_mismatch("FloatArray", other)),
    }
}

fn float_array_of_text(text: &str) -> Result<Value, MetadataError> {
    if text.is_empty() {
        return Ok(Value::FloatArray(Vec::new()));
    }
    text.split(' ')
        .map(|item| item.parse().map_err(|_| unparsable("FloatArray", text)))
        .collect::<Result<Vec<f64>, _>>()
        .map(Value::FloatArray)
}

// Shape prefix then row-major data, space separated.
fn text_of_float_grid(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::FloatGrid(v) => {
            let mut out = format!("{} {}", v.rows(), v.cols());
            for item in v.data() {
                out.push(' ');
                out.push_str(&item.to_string());
            }
            Ok(out)
        }
        other => Err(text_mismatch("FloatGrid", other)),
    }
}

fn float_grid_of_text(text: &str) -> Result<Value, MetadataError> {
    let mut parts = text.split(' ');
    let rows: usize = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| unparsable("FloatGrid", text))?;
    let cols: usize = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| unparsable("FloatGrid", text))?;
    let data = parts
        .map(|item| item.parse().map_err(|_| unparsable("FloatGrid", text)))
        .collect::<Result<Vec<f64>, _>>()?;

    crate::value::FloatGrid::new(rows, cols, data)
        .map(Value::FloatGrid)
        .ok_or_else(|| unparsable("FloatGrid", text))
}
