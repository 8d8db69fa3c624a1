//! Shared test schema: a small commerce graph exercising every property
//! kind, both cascade strengths, and both component embeddings.

use crate::{instance::Instance, registry::Registry, value::Value};
use chrono::DateTime;
use metagraph_schema::{
    def::{EntityDef, FieldDef, FieldType, SchemaDef},
    types::{Cascade, KeyRole, Relation, ScalarType, TypeKind},
};

pub(crate) const CUSTOMER_ENTITY_ID: u16 = 1;
pub(crate) const ORDER_ENTITY_ID: u16 = 2;

pub(crate) fn schema() -> SchemaDef {
    SchemaDef::new()
        .with(
            EntityDef::root_entity("Customer", CUSTOMER_ENTITY_ID)
                .field(FieldDef::primary_key("Id"))
                .field(FieldDef::new("Name", FieldType::Text).max_len(64))
                .field(
                    FieldDef::new("Email", FieldType::Text)
                        .nullable()
                        .unique()
                        .role(KeyRole::Business),
                )
                .field(FieldDef::new(
                    "Status",
                    FieldType::Enum(vec![
                        "Active".to_string(),
                        "Dormant".to_string(),
                        "Closed".to_string(),
                    ]),
                ))
                .field(FieldDef::new("Joined", FieldType::Date).nullable())
                .field(FieldDef::new("LastSeen", FieldType::Timestamp).nullable())
                .field(FieldDef::new("Tags", FieldType::Set(ScalarType::Text)))
                .field(FieldDef::new("Labels", FieldType::List(ScalarType::Text)))
                .field(FieldDef::new(
                    "Attrs",
                    FieldType::Map(ScalarType::Text, ScalarType::Text),
                ))
                .field(FieldDef::new("Ratings", FieldType::Bag(ScalarType::Int)))
                .field(FieldDef::new("Readings", FieldType::FloatArray))
                .field(FieldDef::new("Matrix", FieldType::FloatGrid).nullable())
                .field(FieldDef::new("Address", FieldType::Component("Address".to_string())).nullable())
                .field(
                    FieldDef::new(
                        "Orders",
                        FieldType::Relation {
                            relation: Relation::OneToMany,
                            target: "Order".to_string(),
                        },
                    )
                    .cascade(Cascade::AllDeleteOrphan),
                )
                .field(
                    FieldDef::new(
                        "Referrer",
                        FieldType::Relation {
                            relation: Relation::ManyToOne,
                            target: "Customer".to_string(),
                        },
                    )
                    .nullable(),
                ),
        )
        .with(
            EntityDef::child_entity("Order", ORDER_ENTITY_ID)
                .field(FieldDef::primary_key("Id"))
                .field(
                    FieldDef::new("Number", FieldType::Text)
                        .unique()
                        .role(KeyRole::Business)
                        .max_len(32),
                )
                .field(FieldDef::new("Placed", FieldType::Timestamp))
                .field(FieldDef::new("Total", FieldType::Float))
                .field(FieldDef::new(
                    "Lines",
                    FieldType::ComponentList("OrderLine".to_string()),
                )),
        )
        .with(
            EntityDef::component("Address")
                .field(FieldDef::new("Street", FieldType::Text).max_len(128))
                .field(FieldDef::new("City", FieldType::Text))
                .field(FieldDef::new("Zip", FieldType::Text).nullable()),
        )
        .with(
            EntityDef::component("OrderLine")
                .field(FieldDef::new("Sku", FieldType::Text).role(KeyRole::Child))
                .field(FieldDef::new("Qty", FieldType::Uint))
                .field(FieldDef::new("Price", FieldType::Float)),
        )
}

pub(crate) fn registry() -> Registry {
    Registry::build(&schema()).expect("fixture schema builds")
}

/// A customer with scalars and collections populated, no orders yet.
pub(crate) fn customer(registry: &Registry) -> Instance {
    let meta = registry.expect("Customer").expect("Customer registered");
    let mut customer = registry.create(meta.id);

    registry.set_value(&mut customer, "Name", "Ada").unwrap();
    registry
        .set_value(&mut customer, "Email", "ada@example.com")
        .unwrap();
    registry
        .set_value(&mut customer, "Status", Value::Enum(0))
        .unwrap();
    registry
        .set_value(
            &mut customer,
            "LastSeen",
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        )
        .unwrap();
    registry
        .set_value(&mut customer, "Tags", Value::from_set(vec!["vip", "beta"]))
        .unwrap();
    registry
        .set_value(
            &mut customer,
            "Labels",
            Value::from_list(vec!["first", "second"]),
        )
        .unwrap();
    registry
        .set_value(
            &mut customer,
            "Attrs",
            Value::from_map(vec![("tier", "gold"), ("region", "eu")]),
        )
        .unwrap();
    registry
        .set_value(&mut customer, "Ratings", Value::from_bag(vec![5i64, 5, 3]))
        .unwrap();
    registry
        .set_value(
            &mut customer,
            "Readings",
            Value::FloatArray(vec![0.5, 1.5, 2.5]),
        )
        .unwrap();

    customer
}

/// An order with two lines, not yet linked to a customer.
pub(crate) fn order(registry: &Registry, number: &str) -> Instance {
    let meta = registry.expect("Order").expect("Order registered");
    let mut order = registry.create(meta.id);

    registry.set_value(&mut order, "Number", number).unwrap();
    registry
        .set_value(
            &mut order,
            "Placed",
            DateTime::from_timestamp(1_700_100_000, 0).unwrap(),
        )
        .unwrap();
    registry.set_value(&mut order, "Total", 42.5).unwrap();

    let lines = Value::List(vec![
        line(registry, "SKU-1", 2, 10.0).into(),
        line(registry, "SKU-2", 1, 22.5).into(),
    ]);
    registry.set_value(&mut order, "Lines", lines).unwrap();

    order
}

pub(crate) fn line(registry: &Registry, sku: &str, qty: u64, price: f64) -> Instance {
    let meta = registry.expect("OrderLine").expect("OrderLine registered");
    let mut line = registry.create(meta.id);

    registry.set_value(&mut line, "Sku", sku).unwrap();
    registry.set_value(&mut line, "Qty", qty).unwrap();
    registry.set_value(&mut line, "Price", price).unwrap();

    line
}
