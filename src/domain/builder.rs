//! Tree builder: validates descriptors and bulk-loads a `ServiceTree`.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::arena::ServiceArena;
use crate::domain::entities::{NodeId, Price, ServiceDescriptor, ServiceNode};
use crate::domain::error::ValidationError;
use crate::domain::tree::ServiceTree;

/// Result type for tree construction.
pub type BuildResult<T> = Result<T, ValidationError>;

/// Constructs a `ServiceTree` from an ordered sequence of descriptors.
///
/// Descriptors without an id get one past the highest id assigned so far.
/// Parents may be declared after their children.
#[derive(Debug, Default)]
pub struct ServiceTreeBuilder {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(mut self, descriptor: ServiceDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn services(mut self, descriptors: impl IntoIterator<Item = ServiceDescriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// Validate everything, then build. Nothing is produced on failure.
    #[instrument(level = "debug", skip(self), fields(count = self.descriptors.len()))]
    pub fn build(self) -> BuildResult<ServiceTree> {
        let nodes = assign_ids(self.descriptors)?;
        check_prices(&nodes)?;

        let known: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
        for node in &nodes {
            if let Some(parent) = node.parent_id {
                if parent == node.id {
                    return Err(ValidationError::SelfParent(node.id));
                }
                if !known.contains(&parent) {
                    return Err(ValidationError::UnknownParent {
                        id: node.id,
                        parent,
                    });
                }
            }
        }

        let mut arena = ServiceArena::with_capacity(nodes.len());
        for node in nodes {
            arena.insert_node(node);
        }
        arena.index_relations();
        detect_cycles(&arena)?;

        debug!("built service tree with {} nodes", arena.len());
        Ok(ServiceTree::from_arena(arena))
    }
}

fn assign_ids(descriptors: Vec<ServiceDescriptor>) -> BuildResult<Vec<ServiceNode>> {
    let mut seen = HashSet::with_capacity(descriptors.len());
    let mut highest: Option<NodeId> = None;
    let mut nodes = Vec::with_capacity(descriptors.len());

    for (pos, desc) in descriptors.into_iter().enumerate() {
        if desc.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle(pos));
        }
        let id = match (desc.id, highest) {
            (Some(id), _) => id,
            (None, None) => NodeId(0),
            (None, Some(h)) => h
                .0
                .checked_add(1)
                .map(NodeId)
                .ok_or(ValidationError::IdExhausted(h))?,
        };
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId(id));
        }
        highest = Some(highest.map_or(id, |h| h.max(id)));

        nodes.push(ServiceNode {
            id,
            title: desc.title,
            price: desc.price,
            parent_id: desc.parent_id,
            checked: false,
        });
    }
    Ok(nodes)
}

/// The grand total must fit, so no later sum can overflow.
fn check_prices(nodes: &[ServiceNode]) -> BuildResult<()> {
    nodes
        .iter()
        .try_fold(Price::ZERO, |acc, n| acc.checked_add(n.price))
        .map(|_| ())
        .ok_or(ValidationError::PriceOverflow)
}

/// Every node must reach a root within `len` steps.
fn detect_cycles(arena: &ServiceArena) -> BuildResult<()> {
    let limit = arena.len();
    for (idx, node) in arena.iter() {
        let mut current = idx;
        let mut steps = 0;
        while let Some(parent) = arena.parent_index(current) {
            steps += 1;
            if parent == idx || steps > limit {
                return Err(ValidationError::Cycle(node.id));
            }
            current = parent;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(units: u64) -> Price {
        Price::from_units(units).unwrap()
    }

    #[test]
    fn test_auto_ids_follow_highest_assigned() {
        let tree = ServiceTreeBuilder::new()
            .service(ServiceDescriptor::new("a", price(1)).with_id(5))
            .service(ServiceDescriptor::new("b", price(1)))
            .service(ServiceDescriptor::new("c", price(1)).with_id(2))
            .service(ServiceDescriptor::new("d", price(1)))
            .build()
            .unwrap();

        let ids: Vec<u32> = tree.iter().map(|n| n.id().0).collect();
        assert_eq!(ids, vec![5, 6, 2, 7]);
    }

    #[test]
    fn test_first_auto_id_is_zero() {
        let tree = ServiceTreeBuilder::new()
            .service(ServiceDescriptor::new("a", price(1)))
            .build()
            .unwrap();
        assert!(tree.get(NodeId(0)).is_some());
    }

    #[test]
    fn test_two_node_cycle_is_rejected() {
        let result = ServiceTreeBuilder::new()
            .service(ServiceDescriptor::new("a", price(1)).with_id(1).with_parent(2))
            .service(ServiceDescriptor::new("b", price(1)).with_id(2).with_parent(1))
            .build();
        assert_eq!(result.unwrap_err(), ValidationError::Cycle(NodeId(1)));
    }

    #[test]
    fn test_price_overflow_is_rejected() {
        let result = ServiceTreeBuilder::new()
            .service(ServiceDescriptor::new("a", Price::from_minor(u64::MAX)))
            .service(ServiceDescriptor::new("b", Price::from_minor(1)))
            .build();
        assert_eq!(result.unwrap_err(), ValidationError::PriceOverflow);
    }

    #[test]
    fn test_id_exhaustion_is_rejected() {
        let result = ServiceTreeBuilder::new()
            .service(ServiceDescriptor::new("a", price(1)).with_id(u32::MAX))
            .service(ServiceDescriptor::new("b", price(1)))
            .build();
        assert_eq!(
            result.unwrap_err(),
            ValidationError::IdExhausted(NodeId(u32::MAX))
        );
    }
}
