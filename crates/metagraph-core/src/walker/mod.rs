//! Cascade graph traversal.
//!
//! Depth-first, pre-order, over the inline object graph: component slots
//! and cascade-owned children held by value. Identity references are
//! never chased; a resolver-backed caller can do that itself. Visits are
//! deduplicated by stripped identity so a shared or cyclic subgraph is
//! entered once.

#[cfg(test)]
mod tests;

use crate::{
    error::MetadataError,
    instance::Instance,
    registry::{ClassMeta, PropertyMeta, Registry},
    value::Value,
};
use std::collections::HashSet;

///
/// CascadeEdge
///
/// One followable edge during a walk: the owning class and the property
/// being crossed.
///

pub struct CascadeEdge<'a> {
    pub class: &'a ClassMeta,
    pub property: &'a PropertyMeta,
}

/// Edge filters for the common traversals.
pub mod filters {
    use super::CascadeEdge;

    /// Follow component edges and every cascade-flagged relation.
    #[must_use]
    pub fn owned_or_related(edge: &CascadeEdge<'_>) -> bool {
        edge.property.is_cascade_edge()
    }

    /// Follow only edges that strictly own their target subtree.
    #[must_use]
    pub fn owned_only(edge: &CascadeEdge<'_>) -> bool {
        edge.property.is_owned_edge()
    }
}

/// Walk the graph from a root. The action runs on every newly visited
/// instance, the root included, and returns `false` to prune the subtree
/// below it.
pub fn walk<'a, F, A>(
    registry: &Registry,
    root: &'a Instance,
    filter: F,
    action: &mut A,
) -> Result<(), MetadataError>
where
    F: Fn(&CascadeEdge<'_>) -> bool,
    A: FnMut(&'a Instance) -> Result<bool, MetadataError>,
{
    let mut seen = HashSet::new();
    visit(registry, root, &filter, action, &mut seen)
}

fn visit<'a, F, A>(
    registry: &Registry,
    instance: &'a Instance,
    filter: &F,
    action: &mut A,
    seen: &mut HashSet<u64>,
) -> Result<(), MetadataError>
where
    F: Fn(&CascadeEdge<'_>) -> bool,
    A: FnMut(&'a Instance) -> Result<bool, MetadataError>,
{
    if !seen.insert(visit_key(registry, instance)) {
        return Ok(());
    }
    if !action(instance)? {
        return Ok(());
    }

    let meta = registry.class(instance.class_id());
    for property in meta.cascade_properties() {
        let edge = CascadeEdge {
            class: meta,
            property,
        };
        if !filter(&edge) {
            continue;
        }
        let Some(value) = instance.get(property.index) else {
            continue;
        };

        match value {
            Value::Object(child) => visit(registry, child, filter, action, seen)?,
            Value::List(items) => {
                for item in items {
                    if let Value::Object(child) = item {
                        visit(registry, child, filter, action, seen)?;
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}

// Identified entities dedupe by stripped identity; components and
// unidentified instances fall back to their address, which is stable for
// the duration of one walk.
fn visit_key(registry: &Registry, instance: &Instance) -> u64 {
    let meta = registry.class(instance.class_id());
    match instance.pk(meta) {
        Some(id) if !id.is_zero() => id.strip_transient().raw(),
        _ => std::ptr::from_ref(instance) as u64,
    }
}

/// Mutable pre-order walk over owned edges. The inline graph below a root
/// is a tree by ownership, so no visited set is needed.
pub fn walk_mut<F, A>(
    registry: &Registry,
    root: &mut Instance,
    filter: F,
    action: &mut A,
) -> Result<(), MetadataError>
where
    F: Fn(&CascadeEdge<'_>) -> bool,
    A: FnMut(&mut Instance) -> Result<bool, MetadataError>,
{
    visit_mut(registry, root, &filter, action)
}

fn visit_mut<F, A>(
    registry: &Registry,
    instance: &mut Instance,
    filter: &F,
    action: &mut A,
) -> Result<(), MetadataError>
where
    F: Fn(&CascadeEdge<'_>) -> bool,
    A: FnMut(&mut Instance) -> Result<bool, MetadataError>,
{
    if !action(instance)? {
        return Ok(());
    }

    let class_id = instance.class_id();
    let followed: Vec<u32> = {
        let meta = registry.class(class_id);
        meta.cascade_properties()
            .filter(|property| {
                filter(&CascadeEdge {
                    class: meta,
                    property,
                })
            })
            .map(|property| property.index)
            .collect()
    };

    for index in followed {
        let Some(value) = instance.get_mut(index) else {
            continue;
        };
        match value {
            Value::Object(child) => visit_mut(registry, child, filter, action)?,
            Value::List(items) => {
                for item in items {
                    if let Value::Object(child) = item {
                        visit_mut(registry, child, filter, action)?;
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Collect the owned closure of a root in visit order, root first.
/// Components are included; callers writing entity streams filter them.
pub fn collect_owned<'a>(
    registry: &Registry,
    root: &'a Instance,
) -> Result<Vec<&'a Instance>, MetadataError> {
    let mut collected = Vec::new();
    walk(registry, root, filters::owned_only, &mut |instance| {
        collected.push(instance);
        Ok(true)
    })?;

    Ok(collected)
}

/// Assign a transient identity to every owned entity below (and
/// including) the root that does not carry one yet. Returns the number of
/// identities minted.
pub fn identify_graph(registry: &Registry, root: &mut Instance) -> Result<usize, MetadataError> {
    let mut minted = 0usize;
    walk_mut(registry, root, filters::owned_only, &mut |instance| {
        let meta = registry.class(instance.class_id());
        if meta.is_entity() && instance.pk(meta).is_none_or(crate::identity::Oid::is_zero) {
            let id = registry.mint(meta.id)?;
            instance.set_pk(meta, id)?;
            minted += 1;
        }
        Ok(true)
    })?;

    Ok(minted)
}
