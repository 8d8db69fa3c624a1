use crate::{
    registry::{PropertyKind, Registry},
    test_support::fixtures,
    value::Value,
};
use metagraph_schema::{
    def::{EntityDef, FieldDef, FieldType, SchemaDef},
    types::{KeyRole, Relation},
};

#[test]
fn builds_fixture_schema() {
    let registry = fixtures::registry();
    assert_eq!(registry.classes().count(), 4);

    let customer = registry.expect("Customer").unwrap();
    assert!(customer.is_entity());
    assert_eq!(customer.entity_id, fixtures::CUSTOMER_ENTITY_ID);
    assert_eq!(customer.primary_key, Some(0));
    assert_eq!(customer.business_key, vec![2]);

    let line = registry.expect("OrderLine").unwrap();
    assert!(line.is_component());
    assert_eq!(line.child_key, vec![0]);
}

#[test]
fn property_indexes_follow_declaration_order() {
    let registry = fixtures::registry();
    let customer = registry.expect("Customer").unwrap();

    for (i, property) in customer.properties.iter().enumerate() {
        assert_eq!(property.index as usize, i);
    }
    assert_eq!(customer.property_by_name("Name").unwrap().index, 1);
}

#[test]
fn resolves_cross_type_targets() {
    let registry = fixtures::registry();
    let customer = registry.expect("Customer").unwrap();
    let order = registry.expect("Order").unwrap();
    let address = registry.expect("Address").unwrap();

    let orders = customer.property_by_name("Orders").unwrap();
    assert_eq!(orders.kind.target(), Some(order.id));
    assert!(orders.is_owned_edge());

    let addr = customer.property_by_name("Address").unwrap();
    assert_eq!(addr.kind.target(), Some(address.id));

    let referrer = customer.property_by_name("Referrer").unwrap();
    assert_eq!(referrer.kind.target(), Some(customer.id));
    assert!(!referrer.is_cascade_edge());
}

#[test]
fn create_fills_declared_defaults() {
    let registry = fixtures::registry();
    let customer = registry.create(registry.expect("Customer").unwrap().id);

    assert_eq!(
        registry.get_value(&customer, "Name").unwrap(),
        &Value::Text(String::new())
    );
    assert_eq!(registry.get_value(&customer, "Email").unwrap(), &Value::Null);
    assert_eq!(
        registry.get_value(&customer, "Tags").unwrap(),
        &Value::Set(Vec::new())
    );
    assert_eq!(
        registry.get_value(&customer, "Status").unwrap(),
        &Value::Enum(0)
    );
}

#[test]
fn set_value_rejects_wrong_shape() {
    let registry = fixtures::registry();
    let mut customer = registry.create(registry.expect("Customer").unwrap().id);

    let err = registry
        .set_value(&mut customer, "Name", Value::Int(3))
        .unwrap_err();
    assert!(err.is_config());

    let err = registry
        .set_value(&mut customer, "Status", Value::Enum(9))
        .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn set_value_accepts_null_anywhere() {
    // Nullability is a validation concern, not a slot typing concern.
    let registry = fixtures::registry();
    let mut customer = registry.create(registry.expect("Customer").unwrap().id);
    registry
        .set_value(&mut customer, "Name", Value::Null)
        .unwrap();
}

#[test]
fn minted_ids_carry_the_entity_id() {
    let registry = fixtures::registry();
    let customer = registry.expect("Customer").unwrap();

    let id = registry.mint(customer.id).unwrap();
    assert!(id.is_transient());
    assert_eq!(id.entity_id(), fixtures::CUSTOMER_ENTITY_ID);
}

#[test]
fn components_have_no_identity_source() {
    let registry = fixtures::registry();
    let address = registry.expect("Address").unwrap();
    assert!(registry.mint(address.id).is_err());
}

#[test]
fn relation_to_component_is_rejected() {
    let schema = SchemaDef::new()
        .with(
            EntityDef::root_entity("Thing", 1)
                .field(FieldDef::primary_key("Id"))
                .field(FieldDef::new(
                    "Bad",
                    FieldType::Relation {
                        relation: Relation::ManyToOne,
                        target: "Part".to_string(),
                    },
                )),
        )
        .with(EntityDef::component("Part").field(FieldDef::new("Name", FieldType::Text)));

    let err = Registry::build(&schema).unwrap_err();
    assert!(err.is_config());
    assert!(err.message.contains("targets component"));
}

#[test]
fn component_list_requires_child_key() {
    let schema = SchemaDef::new()
        .with(
            EntityDef::root_entity("Thing", 1)
                .field(FieldDef::primary_key("Id"))
                .field(FieldDef::new(
                    "Parts",
                    FieldType::ComponentList("Part".to_string()),
                )),
        )
        .with(EntityDef::component("Part").field(FieldDef::new("Name", FieldType::Text)));

    let err = Registry::build(&schema).unwrap_err();
    assert!(err.message.contains("child key"));
}

#[test]
fn undeclared_target_is_rejected() {
    let schema = SchemaDef::new().with(
        EntityDef::root_entity("Thing", 1)
            .field(FieldDef::primary_key("Id"))
            .field(FieldDef::new(
                "Ghost",
                FieldType::Component("Missing".to_string()),
            )),
    );

    let err = Registry::build(&schema).unwrap_err();
    assert!(err.message.contains("undeclared"));
}

#[test]
fn enum_metadata_maps_names_and_ordinals() {
    let registry = fixtures::registry();
    let customer = registry.expect("Customer").unwrap();
    let status = customer.property_by_name("Status").unwrap();

    let PropertyKind::Enum(meta) = &status.kind else {
        panic!("Status should be an enum");
    };
    assert_eq!(meta.name_of(1), Some("Dormant"));
    assert_eq!(meta.ordinal_of("Closed"), Some(2));
    assert_eq!(meta.name_of(3), None);
}

#[test]
fn child_key_role_survives_compilation() {
    let registry = fixtures::registry();
    let line = registry.expect("OrderLine").unwrap();
    let sku = line.property_by_name("Sku").unwrap();
    assert_eq!(sku.role, KeyRole::Child);
}
