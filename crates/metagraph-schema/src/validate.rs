//! Local structural validation for schema defs.
//!
//! Everything here can be checked one def at a time; cross-type invariants
//! (target resolution, component key rules) run inside the registry build
//! where the full metadata view exists. Problems are collected into an
//! [`ErrorTree`] so one pass reports everything at once.

use crate::{
    MAX_ENTITY_ID, MAX_ENTITY_NAME_LEN, MAX_FIELD_NAME_LEN,
    def::{EntityDef, FieldDef, FieldType, SchemaDef},
    error::ErrorTree,
    types::{Cascade, KeyRole},
};
use std::collections::HashMap;

/// Run full local validation over a schema def in a staged, deterministic
/// order.
pub fn validate_schema(schema: &SchemaDef) -> Result<(), ErrorTree> {
    let mut errors = ErrorTree::new();

    for def in &schema.entities {
        let mut local = ErrorTree::new();
        validate_entity(def, &mut local);
        errors.merge(&def.name, local);
    }

    validate_global(schema, &mut errors);

    errors.result()
}

// Schema-wide invariants: unique names and unique entity ids.
fn validate_global(schema: &SchemaDef, errors: &mut ErrorTree) {
    let mut names: HashMap<&str, usize> = HashMap::new();
    let mut ids: HashMap<u16, &str> = HashMap::new();

    for def in &schema.entities {
        *names.entry(def.name.as_str()).or_default() += 1;

        if def.kind.is_entity()
            && let Some(previous) = ids.insert(def.entity_id, def.name.as_str())
        {
            errors.add_at(
                &def.name,
                format!(
                    "entity id {} is already declared by '{previous}'",
                    def.entity_id
                ),
            );
        }
    }

    for (name, count) in names {
        if count > 1 {
            errors.add_at(name, format!("type name declared {count} times"));
        }
    }
}

fn validate_entity(def: &EntityDef, errors: &mut ErrorTree) {
    if let Err(message) = validate_name(&def.name, MAX_ENTITY_NAME_LEN) {
        errors.add(format!("entity name: {message}"));
    }

    if def.kind.is_entity() {
        if def.entity_id == 0 {
            errors.add("entities must declare a nonzero entity id");
        } else if def.entity_id > MAX_ENTITY_ID {
            errors.add(format!(
                "entity id {} exceeds maximum {MAX_ENTITY_ID}",
                def.entity_id
            ));
        }

        match def.fields.iter().filter(|f| f.role == KeyRole::Primary).count() {
            1 => {}
            0 => errors.add("entities must declare exactly one primary key field"),
            n => errors.add(format!("entities must declare exactly one primary key field, found {n}")),
        }
    } else {
        if def.entity_id != 0 {
            errors.add("components must declare entity id 0");
        }
        if def.primary_key().is_some() {
            errors.add("components cannot declare a primary key");
        }
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for field in &def.fields {
        *seen.entry(field.name.as_str()).or_default() += 1;

        let mut local = ErrorTree::new();
        validate_field(field, &mut local);
        errors.merge(&field.name, local);
    }

    for (name, count) in seen {
        if count > 1 {
            errors.add_at(name, format!("field name declared {count} times"));
        }
    }
}

fn validate_field(field: &FieldDef, errors: &mut ErrorTree) {
    if let Err(message) = validate_name(&field.name, MAX_FIELD_NAME_LEN) {
        errors.add(format!("field name: {message}"));
    }

    match (&field.ty, field.role) {
        (FieldType::Identity, KeyRole::Primary) => {}
        (FieldType::Identity, _) => {
            errors.add("identity-typed fields are only valid as the primary key");
        }
        (_, KeyRole::Primary) => {
            errors.add("primary key fields must be identity-typed");
        }
        _ => {}
    }

    if field.role == KeyRole::Primary && field.nullable {
        errors.add("primary key fields cannot be nullable");
    }

    if field.role == KeyRole::Child && field.ty.is_collection() {
        errors.add("child key fields must be single-valued");
    }

    if field.cascade != Cascade::None && field.ty.target().is_none() {
        errors.add("cascade is only meaningful on component or relation fields");
    }

    if field.max_len.is_some()
        && !matches!(field.ty, FieldType::Text | FieldType::Blob)
    {
        errors.add("max_len is only meaningful on text or blob fields");
    }

    if let FieldType::Enum(variants) = &field.ty {
        if variants.is_empty() {
            errors.add("enum fields must declare at least one variant");
        }
        for (i, variant) in variants.iter().enumerate() {
            if variants[..i].contains(variant) {
                errors.add(format!("duplicate enum variant '{variant}'"));
            }
        }
    }
}

/// Ensure an identifier is non-empty, ASCII, and within the length bound.
fn validate_name(name: &str, max_len: usize) -> Result<(), String> {
    if name.is_empty() {
        return Err("is empty".to_string());
    }
    if name.len() > max_len {
        return Err(format!("'{name}' exceeds max length {max_len}"));
    }
    if !name.is_ascii() {
        return Err(format!("'{name}' must be ASCII"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarType;

    fn customer() -> EntityDef {
        EntityDef::root_entity("Customer", 1)
            .field(FieldDef::primary_key("Id"))
            .field(FieldDef::new("Name", FieldType::Text).max_len(120))
    }

    #[test]
    fn accepts_minimal_entity() {
        let schema = SchemaDef::new().with(customer());
        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn rejects_missing_primary_key() {
        let schema = SchemaDef::new().with(
            EntityDef::root_entity("Customer", 1).field(FieldDef::new("Name", FieldType::Text)),
        );

        let tree = validate_schema(&schema).unwrap_err();
        assert!(tree.to_string().contains("exactly one primary key"));
    }

    #[test]
    fn rejects_component_with_entity_id() {
        let mut def = EntityDef::component("Address");
        def.entity_id = 9;
        let tree = validate_schema(&SchemaDef::new().with(def)).unwrap_err();
        assert!(tree.to_string().contains("entity id 0"));
    }

    #[test]
    fn rejects_duplicate_entity_ids_and_names() {
        let schema = SchemaDef::new()
            .with(customer())
            .with(
                EntityDef::root_entity("Order", 1).field(FieldDef::primary_key("Id")),
            );

        let tree = validate_schema(&schema).unwrap_err();
        assert!(tree.to_string().contains("already declared"));
    }

    #[test]
    fn collects_multiple_field_problems_in_one_pass() {
        let def = EntityDef::root_entity("Customer", 1)
            .field(FieldDef::primary_key("Id"))
            .field(FieldDef::new("", FieldType::Text))
            .field(FieldDef::new("Tags", FieldType::List(ScalarType::Text)).max_len(4));

        let tree = validate_schema(&SchemaDef::new().with(def)).unwrap_err();
        assert!(tree.len() >= 2, "expected batched problems, got: {tree}");
    }

    #[test]
    fn rejects_cascade_on_scalar_field() {
        let def = EntityDef::root_entity("Customer", 1)
            .field(FieldDef::primary_key("Id"))
            .field(FieldDef::new("Name", FieldType::Text).cascade(Cascade::All));

        let tree = validate_schema(&SchemaDef::new().with(def)).unwrap_err();
        assert!(tree.to_string().contains("cascade"));
    }

    #[test]
    fn rejects_entity_id_above_identity_range() {
        let def = EntityDef::root_entity("Huge", 0x8000).field(FieldDef::primary_key("Id"));
        let tree = validate_schema(&SchemaDef::new().with(def)).unwrap_err();
        assert!(tree.to_string().contains("exceeds maximum"));
    }
}
