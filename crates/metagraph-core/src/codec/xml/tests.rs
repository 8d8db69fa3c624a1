use crate::{
    codec::{xml::{XmlDecoder, XmlEncoder}, FreshResolver},
    error::ErrorClass,
    test_support::fixtures,
    value::Value,
};

#[test]
fn entity_element_round_trips() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = fixtures::customer(&registry);
    let id = registry.mint(meta.id).unwrap();
    customer.set_pk(meta, id).unwrap();

    let mut encoder = XmlEncoder::new(&registry);
    encoder.write_entity(&customer).unwrap();
    let doc = encoder.into_string();

    assert!(doc.starts_with(&format!("<Customer id=\"{id}\">")));
    assert!(doc.contains("<Name>Ada</Name>"));
    assert!(doc.contains("<Status>Active</Status>"));

    let mut resolver = FreshResolver::new(&registry);
    let decoded = XmlDecoder::new(&registry, &doc)
        .read_entity(&mut resolver)
        .unwrap();

    assert_eq!(decoded.pk(meta), Some(id));
    assert_eq!(
        registry.get_value(&decoded, "Status").unwrap(),
        &Value::Enum(0)
    );
    assert!(crate::value::is_same(
        registry.get_value(&decoded, "Attrs").unwrap(),
        registry.get_value(&customer, "Attrs").unwrap(),
    ));
}

#[test]
fn enum_slots_render_variant_names() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = registry.create(meta.id);
    let id = registry.mint(meta.id).unwrap();
    customer.set_pk(meta, id).unwrap();
    registry
        .set_value(&mut customer, "Status", Value::Enum(2))
        .unwrap();

    let mut encoder = XmlEncoder::new(&registry);
    encoder.write_entity(&customer).unwrap();
    let doc = encoder.into_string();
    assert!(doc.contains("<Status>Closed</Status>"));
}

#[test]
fn unknown_variant_name_is_corruption() {
    let registry = fixtures::registry();
    let doc = "<Customer id=\"5\"><Status>Bogus</Status></Customer>";

    let mut resolver = FreshResolver::new(&registry);
    let err = XmlDecoder::new(&registry, doc)
        .read_entity(&mut resolver)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn references_render_as_ref_attributes() {
    let registry = fixtures::registry();
    let customer_meta = registry.expect("Customer").unwrap();
    let order_meta = registry.expect("Order").unwrap();

    let order_id = registry.mint(order_meta.id).unwrap();
    let referrer_id = registry.mint(customer_meta.id).unwrap();

    let mut customer = registry.create(customer_meta.id);
    let id = registry.mint(customer_meta.id).unwrap();
    customer.set_pk(customer_meta, id).unwrap();
    registry
        .set_value(&mut customer, "Orders", Value::List(vec![Value::Id(order_id)]))
        .unwrap();
    registry
        .set_value(&mut customer, "Referrer", Value::Id(referrer_id))
        .unwrap();

    let mut encoder = XmlEncoder::new(&registry);
    encoder.write_entity(&customer).unwrap();
    let doc = encoder.into_string();

    assert!(doc.contains(&format!("<Orders><Item ref=\"{order_id}\"/></Orders>")));
    assert!(doc.contains(&format!("<Referrer ref=\"{referrer_id}\"/>")));

    let mut resolver = FreshResolver::new(&registry);
    let decoded = XmlDecoder::new(&registry, &doc)
        .read_entity(&mut resolver)
        .unwrap();
    assert_eq!(
        registry.get_value(&decoded, "Referrer").unwrap(),
        &Value::Id(referrer_id)
    );
}

#[test]
fn component_lists_nest_items() {
    let registry = fixtures::registry();
    let meta = registry.expect("Order").unwrap();

    let mut order = fixtures::order(&registry, "ORD-2");
    let id = registry.mint(meta.id).unwrap();
    order.set_pk(meta, id).unwrap();

    let mut encoder = XmlEncoder::new(&registry);
    encoder.write_entity(&order).unwrap();
    let doc = encoder.into_string();

    let mut resolver = FreshResolver::new(&registry);
    let decoded = XmlDecoder::new(&registry, &doc)
        .read_entity(&mut resolver)
        .unwrap();

    let lines = registry.get_value(&decoded, "Lines").unwrap();
    assert_eq!(lines.as_elements().unwrap().len(), 2);
    assert!(crate::value::is_same(
        lines,
        registry.get_value(&order, "Lines").unwrap(),
    ));
}

#[test]
fn null_collection_elements_round_trip() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = registry.create(meta.id);
    let id = registry.mint(meta.id).unwrap();
    customer.set_pk(meta, id).unwrap();
    registry
        .set_value(
            &mut customer,
            "Labels",
            Value::List(vec![Value::Text("a".to_string()), Value::Null]),
        )
        .unwrap();

    let mut encoder = XmlEncoder::new(&registry);
    encoder.write_entity(&customer).unwrap();
    let doc = encoder.into_string();
    assert!(doc.contains("<Item null=\"true\"/>"));

    let mut resolver = FreshResolver::new(&registry);
    let decoded = XmlDecoder::new(&registry, &doc)
        .read_entity(&mut resolver)
        .unwrap();
    assert_eq!(
        registry.get_value(&decoded, "Labels").unwrap(),
        &Value::List(vec![Value::Text("a".to_string()), Value::Null])
    );
}

#[test]
fn escaped_text_survives() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = registry.create(meta.id);
    let id = registry.mint(meta.id).unwrap();
    customer.set_pk(meta, id).unwrap();
    registry
        .set_value(&mut customer, "Name", "a < b & \"c\"")
        .unwrap();

    let mut encoder = XmlEncoder::new(&registry);
    encoder.write_entity(&customer).unwrap();
    let doc = encoder.into_string();

    let mut resolver = FreshResolver::new(&registry);
    let decoded = XmlDecoder::new(&registry, &doc)
        .read_entity(&mut resolver)
        .unwrap();
    assert_eq!(
        registry.get_value(&decoded, "Name").unwrap(),
        &Value::Text("a < b & \"c\"".to_string())
    );
}

#[test]
fn standalone_component_round_trips() {
    let registry = fixtures::registry();
    let line = fixtures::line(&registry, "SKU-3", 4, 1.25);

    let mut encoder = XmlEncoder::new(&registry);
    encoder.write_component(&line).unwrap();
    let doc = encoder.into_string();
    assert!(doc.starts_with("<OrderLine>"));

    let decoded = XmlDecoder::new(&registry, &doc).read_component().unwrap();
    assert_eq!(
        registry.get_value(&decoded, "Qty").unwrap(),
        &Value::Uint(4)
    );
}

#[test]
fn missing_id_attribute_is_corruption() {
    let registry = fixtures::registry();
    let doc = "<Customer><Name>X</Name></Customer>";

    let mut resolver = FreshResolver::new(&registry);
    let err = XmlDecoder::new(&registry, doc)
        .read_entity(&mut resolver)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn unknown_property_element_is_corruption() {
    let registry = fixtures::registry();
    let doc = "<Customer id=\"5\"><Bogus>1</Bogus></Customer>";

    let mut resolver = FreshResolver::new(&registry);
    let err = XmlDecoder::new(&registry, doc)
        .read_entity(&mut resolver)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn transient_ids_keep_their_prefix() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = registry.create(meta.id);
    let id = registry.mint(meta.id).unwrap();
    assert!(id.is_transient());
    customer.set_pk(meta, id).unwrap();

    let mut encoder = XmlEncoder::new(&registry);
    encoder.write_entity(&customer).unwrap();
    let doc = encoder.into_string();
    assert!(doc.contains("id=\"T"));

    let mut resolver = FreshResolver::new(&registry);
    let decoded = XmlDecoder::new(&registry, &doc)
        .read_entity(&mut resolver)
        .unwrap();
    assert_eq!(decoded.pk(meta), Some(id));
}

#[test]
fn zero_primary_key_is_an_encoding_error() {
    let registry = fixtures::registry();
    let customer = fixtures::customer(&registry);

    let mut encoder = XmlEncoder::new(&registry);
    let err = encoder.write_entity(&customer).unwrap_err();
    assert_eq!(err.class, ErrorClass::Encoding);
}

#[test]
fn whitespace_only_text_round_trips() {
    let registry = fixtures::registry();
    let meta = registry.expect("Customer").unwrap();

    let mut customer = fixtures::customer(&registry);
    let id = registry.mint(meta.id).unwrap();
    customer.set_pk(meta, id).unwrap();
    registry.set_value(&mut customer, "Name", "   ").unwrap();

    let mut encoder = XmlEncoder::new(&registry);
    encoder.write_entity(&customer).unwrap();
    let doc = encoder.into_string();

    let mut resolver = FreshResolver::new(&registry);
    let decoded = XmlDecoder::new(&registry, &doc)
        .read_entity(&mut resolver)
        .unwrap();
    assert_eq!(
        registry.get_value(&decoded, "Name").unwrap(),
        &Value::Text("   ".to_string())
    );
}
