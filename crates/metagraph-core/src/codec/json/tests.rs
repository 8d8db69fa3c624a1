use crate::{
    codec::{json::{JsonDecoder, JsonEncoder}, FreshResolver},
    error::ErrorClass,
    test_support::fixtures,
    value::Value,
};
use serde_json::json;

#[test]
fn entity_record_round_trips() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = fixtures::customer(&registry);
    let id = registry.mint(meta.id).unwrap();
    customer.set_pk(meta, id).unwrap();

    let record = JsonEncoder::new(&registry).entity_value(&customer).unwrap();
    assert_eq!(record["$type"], json!("Customer"));
    assert_eq!(record["$id"], json!(id.to_string()));
    assert_eq!(record["Name"], json!("Ada"));

    let mut resolver = FreshResolver::new(&registry);
    let decoded = JsonDecoder::new(&registry)
        .read_entity(&record, &mut resolver)
        .unwrap();

    assert_eq!(decoded.pk(meta), Some(id));
    assert!(crate::value::is_same(
        registry.get_value(&decoded, "Ratings").unwrap(),
        registry.get_value(&customer, "Ratings").unwrap(),
    ));
}

#[test]
fn default_slots_are_omitted() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut blank = registry.create(meta.id);
    let id = registry.mint(meta.id).unwrap();
    blank.set_pk(meta, id).unwrap();

    let record = JsonEncoder::new(&registry).entity_value(&blank).unwrap();
    let object = record.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert!(object.contains_key("$type"));
    assert!(object.contains_key("$id"));
}

#[test]
fn ids_are_strings() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = registry.create(meta.id);
    let id = registry.mint(meta.id).unwrap();
    customer.set_pk(meta, id).unwrap();
    let referrer = registry.mint(meta.id).unwrap();
    registry
        .set_value(&mut customer, "Referrer", Value::Id(referrer))
        .unwrap();

    let record = JsonEncoder::new(&registry).entity_value(&customer).unwrap();
    assert!(record["$id"].is_string());
    assert_eq!(record["Referrer"], json!(referrer.to_string()));
}

#[test]
fn maps_travel_as_pair_arrays() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = registry.create(meta.id);
    let id = registry.mint(meta.id).unwrap();
    customer.set_pk(meta, id).unwrap();
    registry
        .set_value(
            &mut customer,
            "Attrs",
            Value::from_map(vec![("b", "2"), ("a", "1")]),
        )
        .unwrap();

    let record = JsonEncoder::new(&registry).entity_value(&customer).unwrap();
    // Normalized key order is deterministic regardless of insertion order.
    assert_eq!(record["Attrs"], json!([["a", "1"], ["b", "2"]]));
}

#[test]
fn enum_reads_accept_names_and_ordinals() {
    let registry = fixtures::registry();

    for status in [json!("Dormant"), json!(1)] {
        let record = json!({
            "$type": "Customer",
            "$id": "5",
            "Status": status,
        });
        let mut resolver = FreshResolver::new(&registry);
        let decoded = JsonDecoder::new(&registry)
            .read_entity(&record, &mut resolver)
            .unwrap();
        assert_eq!(
            registry.get_value(&decoded, "Status").unwrap(),
            &Value::Enum(1)
        );
    }
}

#[test]
fn export_mode_nests_owned_children_and_names_enums() {
    let registry = fixtures::registry();
    let customer_meta = registry.expect("Customer").unwrap();
    let order_meta = registry.expect("Order").unwrap();

    let mut order = fixtures::order(&registry, "ORD-9");
    let order_id = registry.mint(order_meta.id).unwrap();
    order.set_pk(order_meta, order_id).unwrap();

    let mut customer = fixtures::customer(&registry);
    let id = registry.mint(customer_meta.id).unwrap();
    customer.set_pk(customer_meta, id).unwrap();
    registry
        .set_value(&mut customer, "Orders", Value::List(vec![order.into()]))
        .unwrap();

    let export = JsonEncoder::export(&registry).entity_value(&customer).unwrap();
    assert_eq!(export["Status"], json!("Active"));
    assert_eq!(export["Orders"][0]["$type"], json!("Order"));
    assert_eq!(export["Orders"][0]["Number"], json!("ORD-9"));

    // The reference rendition reduces the same child to its id.
    let record = JsonEncoder::new(&registry).entity_value(&customer).unwrap();
    assert_eq!(record["Orders"], json!([order_id.to_string()]));
}

#[test]
fn graph_value_emits_one_record_per_entity() {
    let registry = fixtures::registry();
    let customer_meta = registry.expect("Customer").unwrap();
    let order_meta = registry.expect("Order").unwrap();

    let mut order = fixtures::order(&registry, "ORD-3");
    let order_id = registry.mint(order_meta.id).unwrap();
    order.set_pk(order_meta, order_id).unwrap();

    let mut customer = fixtures::customer(&registry);
    let id = registry.mint(customer_meta.id).unwrap();
    customer.set_pk(customer_meta, id).unwrap();
    registry
        .set_value(&mut customer, "Orders", Value::List(vec![order.into()]))
        .unwrap();

    let graph = JsonEncoder::new(&registry).graph_value(&customer).unwrap();
    let records = graph.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["$type"], json!("Customer"));
    assert_eq!(records[1]["$type"], json!("Order"));

    let mut resolver = FreshResolver::new(&registry);
    let decoded = JsonDecoder::new(&registry)
        .read_graph(&graph, &mut resolver)
        .unwrap();
    assert_eq!(decoded.len(), 2);
    assert!(decoded.get(order_id).is_some());
}

#[test]
fn non_finite_floats_survive_as_strings() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = registry.create(meta.id);
    let id = registry.mint(meta.id).unwrap();
    customer.set_pk(meta, id).unwrap();
    registry
        .set_value(
            &mut customer,
            "Readings",
            Value::FloatArray(vec![1.0, f64::NAN, f64::INFINITY]),
        )
        .unwrap();

    let record = JsonEncoder::new(&registry).entity_value(&customer).unwrap();
    let mut resolver = FreshResolver::new(&registry);
    let decoded = JsonDecoder::new(&registry)
        .read_entity(&record, &mut resolver)
        .unwrap();

    let Value::FloatArray(readings) = registry.get_value(&decoded, "Readings").unwrap() else {
        panic!("Readings should decode as a float array");
    };
    assert_eq!(readings[0], 1.0);
    assert!(readings[1].is_nan());
    assert_eq!(readings[2], f64::INFINITY);
}

#[test]
fn missing_type_field_is_corruption() {
    let registry = fixtures::registry();
    let record = json!({ "$id": "5" });

    let mut resolver = FreshResolver::new(&registry);
    let err = JsonDecoder::new(&registry)
        .read_entity(&record, &mut resolver)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn wrong_scalar_shape_is_corruption() {
    let registry = fixtures::registry();
    let record = json!({
        "$type": "Customer",
        "$id": "5",
        "Name": 42,
    });

    let mut resolver = FreshResolver::new(&registry);
    let err = JsonDecoder::new(&registry)
        .read_entity(&record, &mut resolver)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn zero_primary_key_is_an_encoding_error() {
    let registry = fixtures::registry();
    let customer = fixtures::customer(&registry);

    let err = JsonEncoder::new(&registry).entity_value(&customer).unwrap_err();
    assert_eq!(err.class, ErrorClass::Encoding);
}
