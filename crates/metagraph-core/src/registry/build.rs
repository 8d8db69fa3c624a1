//! Schema-to-metadata compilation.
//!
//! Runs in three passes over a validated `SchemaDef`: allocate class ids
//! by name, compile field defs into property tables, then enforce the
//! cross-type rules that only hold once every target is resolved.

use crate::{
    error::MetadataError,
    registry::{ClassId, ClassMeta, EnumMeta, PropertyKind, PropertyMeta},
};
use metagraph_schema::{
    def::{EntityDef, FieldDef, FieldType, SchemaDef},
    types::KeyRole,
    validate::validate_schema,
};
use std::collections::HashMap;

pub(crate) fn build_classes(def: &SchemaDef) -> Result<Vec<ClassMeta>, MetadataError> {
    validate_schema(def).map_err(|err| MetadataError::schema_config(err.to_string()))?;

    // Pass 1: allocate dense class ids in declaration order.
    let mut by_name = HashMap::new();
    for (i, entity) in def.entities.iter().enumerate() {
        let id = u32::try_from(i)
            .map_err(|_| MetadataError::schema_config("too many declared types"))?;
        by_name.insert(entity.name.as_str(), ClassId(id));
    }

    // Pass 2: compile property tables, resolving targets by name.
    let mut classes = Vec::with_capacity(def.entities.len());
    for entity in &def.entities {
        classes.push(build_class(entity, by_name[entity.name.as_str()], &by_name)?);
    }

    // Pass 3: cross-type rules that need resolved targets.
    check_targets(def, &classes)?;

    Ok(classes)
}

fn build_class(
    entity: &EntityDef,
    id: ClassId,
    by_name: &HashMap<&str, ClassId>,
) -> Result<ClassMeta, MetadataError> {
    let mut properties = Vec::with_capacity(entity.fields.len());
    let mut primary_key = None;
    let mut business_key = Vec::new();
    let mut child_key = Vec::new();

    for (i, field) in entity.fields.iter().enumerate() {
        let index = u32::try_from(i).map_err(|_| {
            MetadataError::schema_config(format!("too many fields on '{}'", entity.name))
        })?;

        match field.role {
            KeyRole::Primary => primary_key = Some(index),
            KeyRole::Business => business_key.push(index),
            KeyRole::Child => child_key.push(index),
            KeyRole::None => {}
        }

        properties.push(build_property(entity, field, index, by_name)?);
    }

    Ok(ClassMeta {
        id,
        name: entity.name.clone(),
        entity_id: entity.entity_id,
        kind: entity.kind,
        properties,
        primary_key,
        business_key,
        child_key,
    })
}

fn build_property(
    entity: &EntityDef,
    field: &FieldDef,
    index: u32,
    by_name: &HashMap<&str, ClassId>,
) -> Result<PropertyMeta, MetadataError> {
    let kind = compile_kind(entity, field, by_name)?;
    let default = kind.default_value(field.nullable);

    Ok(PropertyMeta {
        name: field.name.clone(),
        index,
        kind,
        nullable: field.nullable,
        unique: field.unique,
        role: field.role,
        cascade: field.cascade,
        max_len: field.max_len,
        default,
    })
}

fn compile_kind(
    entity: &EntityDef,
    field: &FieldDef,
    by_name: &HashMap<&str, ClassId>,
) -> Result<PropertyKind, MetadataError> {
    let resolve = |target: &str| {
        by_name.get(target).copied().ok_or_else(|| {
            MetadataError::schema_config(format!(
                "'{}.{}' targets undeclared type '{target}'",
                entity.name, field.name
            ))
        })
    };

    Ok(match &field.ty {
        FieldType::Bool => PropertyKind::Bool,
        FieldType::Int => PropertyKind::Int,
        FieldType::Uint => PropertyKind::Uint,
        FieldType::Float => PropertyKind::Float,
        FieldType::Text => PropertyKind::Text,
        FieldType::Blob => PropertyKind::Blob,
        FieldType::Timestamp => PropertyKind::Timestamp,
        FieldType::Date => PropertyKind::Date,
        FieldType::Guid => PropertyKind::Guid,
        FieldType::Identity => PropertyKind::Identity,
        FieldType::FloatArray => PropertyKind::FloatArray,
        FieldType::FloatGrid => PropertyKind::FloatGrid,
        FieldType::Enum(variants) => PropertyKind::Enum(EnumMeta {
            variants: variants.clone(),
        }),
        FieldType::Component(target) => PropertyKind::Component(resolve(target)?),
        FieldType::ComponentList(target) => PropertyKind::ComponentList(resolve(target)?),
        FieldType::Relation { relation, target } => PropertyKind::Relation {
            relation: *relation,
            target: resolve(target)?,
        },
        FieldType::List(scalar) => PropertyKind::List(*scalar),
        FieldType::Set(scalar) => PropertyKind::Set(*scalar),
        FieldType::Map(key, value) => PropertyKind::Map(*key, *value),
        FieldType::Bag(scalar) => PropertyKind::Bag(*scalar),
    })
}

fn check_targets(def: &SchemaDef, classes: &[ClassMeta]) -> Result<(), MetadataError> {
    for (entity, class) in def.entities.iter().zip(classes) {
        for property in &class.properties {
            let Some(target) = property.kind.target() else {
                continue;
            };
            let target = &classes[target.index()];

            match &property.kind {
                PropertyKind::Relation { .. } => {
                    if !target.is_entity() {
                        return Err(MetadataError::schema_config(format!(
                            "relation '{}.{}' targets component '{}'",
                            entity.name, property.name, target.name
                        )));
                    }
                }
                PropertyKind::Component(_) | PropertyKind::ComponentList(_) => {
                    if !target.is_component() {
                        return Err(MetadataError::schema_config(format!(
                            "component field '{}.{}' targets entity '{}'",
                            entity.name, property.name, target.name
                        )));
                    }
                    // Lists need a child key for positional-independent
                    // matching; single components must not declare one.
                    let is_list = matches!(property.kind, PropertyKind::ComponentList(_));
                    if is_list && target.child_key.is_empty() {
                        return Err(MetadataError::schema_config(format!(
                            "component list '{}.{}' requires a child key on '{}'",
                            entity.name, property.name, target.name
                        )));
                    }
                    if !is_list && !target.child_key.is_empty() {
                        return Err(MetadataError::schema_config(format!(
                            "component '{}' declares a child key but '{}.{}' embeds it singly",
                            target.name, entity.name, property.name
                        )));
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}
