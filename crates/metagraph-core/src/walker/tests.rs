use crate::{
    test_support::fixtures,
    value::Value,
    walker::{collect_owned, filters, identify_graph, walk},
};

#[test]
fn walk_visits_root_first_in_pre_order() {
    let registry = fixtures::registry();
    let customer_meta = registry.expect("Customer").unwrap();

    let mut customer = fixtures::customer(&registry);
    registry
        .set_value(
            &mut customer,
            "Orders",
            Value::List(vec![
                fixtures::order(&registry, "ORD-1").into(),
                fixtures::order(&registry, "ORD-2").into(),
            ]),
        )
        .unwrap();

    let mut names = Vec::new();
    walk(&registry, &customer, filters::owned_only, &mut |instance| {
        names.push(registry.class(instance.class_id()).name.clone());
        Ok(true)
    })
    .unwrap();

    assert_eq!(names[0], "Customer");
    // Each order is followed by its inline lines before the next order.
    assert_eq!(
        names[1..],
        ["Order", "OrderLine", "OrderLine", "Order", "OrderLine", "OrderLine"]
    );
    assert_eq!(customer_meta.name, "Customer");
}

#[test]
fn action_false_prunes_the_subtree() {
    let registry = fixtures::registry();

    let mut customer = fixtures::customer(&registry);
    registry
        .set_value(
            &mut customer,
            "Orders",
            Value::List(vec![fixtures::order(&registry, "ORD-1").into()]),
        )
        .unwrap();

    let mut count = 0usize;
    walk(&registry, &customer, filters::owned_only, &mut |instance| {
        count += 1;
        // Stop below orders; their lines must not be visited.
        Ok(registry.class(instance.class_id()).name != "Order")
    })
    .unwrap();

    assert_eq!(count, 2);
}

#[test]
fn shared_subgraphs_are_visited_once() {
    let registry = fixtures::registry();
    let order_meta = registry.expect("Order").unwrap();

    let mut order = fixtures::order(&registry, "ORD-1");
    let id = registry.mint(order_meta.id).unwrap();
    order.set_pk(order_meta, id).unwrap();

    let mut customer = fixtures::customer(&registry);
    registry
        .set_value(
            &mut customer,
            "Orders",
            Value::List(vec![order.clone().into(), order.into()]),
        )
        .unwrap();

    let mut orders = 0usize;
    walk(&registry, &customer, filters::owned_only, &mut |instance| {
        if registry.class(instance.class_id()).name == "Order" {
            orders += 1;
        }
        Ok(true)
    })
    .unwrap();

    assert_eq!(orders, 1);
}

#[test]
fn identity_references_are_not_chased() {
    let registry = fixtures::registry();
    let order_meta = registry.expect("Order").unwrap();

    let mut customer = fixtures::customer(&registry);
    let order_id = registry.mint(order_meta.id).unwrap();
    registry
        .set_value(&mut customer, "Orders", Value::List(vec![Value::Id(order_id)]))
        .unwrap();

    let collected = collect_owned(&registry, &customer).unwrap();
    assert_eq!(collected.len(), 1);
}

#[test]
fn identify_graph_mints_transient_ids_everywhere() {
    let registry = fixtures::registry();
    let customer_meta = registry.expect("Customer").unwrap();
    let order_meta = registry.expect("Order").unwrap();

    let mut customer = fixtures::customer(&registry);
    registry
        .set_value(
            &mut customer,
            "Orders",
            Value::List(vec![
                fixtures::order(&registry, "ORD-1").into(),
                fixtures::order(&registry, "ORD-2").into(),
            ]),
        )
        .unwrap();

    // One customer, two orders; order lines are components.
    let minted = identify_graph(&registry, &mut customer).unwrap();
    assert_eq!(minted, 3);

    let root_id = customer.pk(customer_meta).unwrap();
    assert!(root_id.is_transient());
    assert_eq!(root_id.entity_id(), fixtures::CUSTOMER_ENTITY_ID);

    let orders = registry.get_value(&customer, "Orders").unwrap();
    for item in orders.as_elements().unwrap() {
        let order = item.as_object().unwrap();
        let id = order.pk(order_meta).unwrap();
        assert!(id.is_transient());
        assert_eq!(id.entity_id(), fixtures::ORDER_ENTITY_ID);
    }

    // A second pass mints nothing.
    assert_eq!(identify_graph(&registry, &mut customer).unwrap(), 0);
}

#[test]
fn owned_or_related_follows_cascade_relations_only() {
    let registry = fixtures::registry();
    let customer_meta = registry.expect("Customer").unwrap();

    let orders = customer_meta.property_by_name("Orders").unwrap();
    let referrer = customer_meta.property_by_name("Referrer").unwrap();

    assert!(filters::owned_or_related(&crate::walker::CascadeEdge {
        class: customer_meta,
        property: orders,
    }));
    assert!(!referrer.is_cascade_edge());
}
