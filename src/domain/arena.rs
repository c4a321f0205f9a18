//! Arena storage for service nodes.
//!
//! Nodes never hold pointers to each other. Parents are found through the
//! `id -> Index` lookup and children through a derived index that is built
//! once all nodes are inserted.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{NodeId, ServiceNode};

/// Arena-based forest of service nodes.
#[derive(Debug, Default)]
pub struct ServiceArena {
    arena: Arena<ServiceNode>,
    /// Insertion order
    order: Vec<Index>,
    by_id: HashMap<NodeId, Index>,
    /// Derived: parent id -> children in insertion order
    children: HashMap<NodeId, Vec<Index>>,
    roots: Vec<Index>,
}

impl ServiceArena {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            order: Vec::with_capacity(n),
            by_id: HashMap::with_capacity(n),
            children: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Caller guarantees the id is not present yet.
    #[instrument(level = "trace", skip(self, node), fields(id = %node.id))]
    pub(crate) fn insert_node(&mut self, node: ServiceNode) -> Index {
        let id = node.id;
        let idx = self.arena.insert(node);
        self.by_id.insert(id, idx);
        self.order.push(idx);
        idx
    }

    /// Rebuild the parent -> children index and the root list.
    ///
    /// Must run after the last `insert_node`. A parent id without a node
    /// makes its child a root.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn index_relations(&mut self) {
        self.children.clear();
        self.roots.clear();
        for &idx in &self.order {
            let node = &self.arena[idx];
            match node.parent_id {
                Some(parent) if self.by_id.contains_key(&parent) => {
                    self.children.entry(parent).or_default().push(idx);
                }
                _ => self.roots.push(idx),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn index_of(&self, id: NodeId) -> Option<Index> {
        self.by_id.get(&id).copied()
    }

    pub fn get(&self, idx: Index) -> Option<&ServiceNode> {
        self.arena.get(idx)
    }

    pub(crate) fn get_mut(&mut self, idx: Index) -> Option<&mut ServiceNode> {
        self.arena.get_mut(idx)
    }

    pub fn node(&self, id: NodeId) -> Option<&ServiceNode> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    pub fn parent_index(&self, idx: Index) -> Option<Index> {
        self.arena
            .get(idx)
            .and_then(|node| node.parent_id)
            .and_then(|parent| self.index_of(parent))
    }

    pub fn children_of(&self, idx: Index) -> &[Index] {
        self.arena
            .get(idx)
            .and_then(|node| self.children.get(&node.id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &ServiceNode)> + '_ {
        self.order.iter().map(move |&idx| (idx, &self.arena[idx]))
    }

    /// Depth-first preorder over the whole forest, yielding the depth of
    /// each node (roots are depth 0).
    pub fn iter_preorder(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, self.roots.iter().copied())
    }

    /// Preorder over the subtree below `idx`, excluding `idx` itself.
    pub fn iter_descendants(&self, idx: Index) -> PreOrderIterator<'_> {
        let mut iter = PreOrderIterator::new(self, std::iter::empty());
        for &child in self.children_of(idx).iter().rev() {
            iter.stack.push((child, 1));
        }
        iter
    }

    /// Number of levels in the deepest branch, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter_preorder()
            .map(|(depth, _, _)| depth + 1)
            .max()
            .unwrap_or(0)
    }
}

pub struct PreOrderIterator<'a> {
    arena: &'a ServiceArena,
    stack: Vec<(Index, usize)>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(arena: &'a ServiceArena, roots: impl DoubleEndedIterator<Item = Index>) -> Self {
        let stack = roots.rev().map(|idx| (idx, 0)).collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (usize, Index, &'a ServiceNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, depth)) = self.stack.pop() {
            if let Some(node) = self.arena.get(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in self.arena.children_of(current).iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some((depth, current, node));
            }
        }
        None
    }
}
