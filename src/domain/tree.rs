//! The service tree and its checked-state propagation.
//!
//! Checking a node checks its unchecked ancestors. Unchecking a node
//! unchecks its checked descendants. Both walks stop early: upward at the
//! first checked ancestor, downward at any unchecked child (whose subtree
//! is not visited).

use std::collections::HashSet;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::arena::ServiceArena;
use crate::domain::builder::ServiceTreeBuilder;
use crate::domain::entities::{ChangeSet, NodeId, ServiceDescriptor, ServiceNode};
use crate::domain::error::{DomainError, ValidationError};

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Owns all service nodes. Built once, only checked flags change afterwards.
#[derive(Debug)]
pub struct ServiceTree {
    arena: ServiceArena,
}

/// Bookkeeping for one top-level mutation.
struct Propagation {
    changes: ChangeSet,
    flipped: HashSet<Index>,
    limit: usize,
}

impl Propagation {
    fn new(limit: usize) -> Self {
        Self {
            changes: ChangeSet::new(),
            flipped: HashSet::new(),
            limit,
        }
    }

    fn exhausted(&self) -> bool {
        self.flipped.len() >= self.limit
    }
}

impl ServiceTree {
    pub(crate) fn from_arena(arena: ServiceArena) -> Self {
        Self { arena }
    }

    /// Validate and bulk-load descriptors.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ServiceDescriptor>,
    ) -> Result<Self, ValidationError> {
        ServiceTreeBuilder::new().services(descriptors).build()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.index_of(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&ServiceNode> {
        self.arena.node(id)
    }

    /// All nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceNode> + '_ {
        self.arena.iter().map(|(_, node)| node)
    }

    /// Preorder over the forest with each node's depth (roots at 0).
    pub fn walk(&self) -> impl Iterator<Item = (usize, &ServiceNode)> + '_ {
        self.arena
            .iter_preorder()
            .map(|(depth, _, node)| (depth, node))
    }

    pub fn depth(&self) -> usize {
        self.arena.depth()
    }

    pub fn root_services(&self) -> Vec<&ServiceNode> {
        self.nodes_at(self.arena.roots())
    }

    /// Direct children; empty for leaves and unknown ids.
    pub fn child_services(&self, id: NodeId) -> Vec<&ServiceNode> {
        match self.arena.index_of(id) {
            Some(idx) => self.nodes_at(self.arena.children_of(idx)),
            None => Vec::new(),
        }
    }

    /// `None` for roots and unknown ids.
    pub fn parent(&self, id: NodeId) -> Option<&ServiceNode> {
        self.arena
            .index_of(id)
            .and_then(|idx| self.arena.parent_index(idx))
            .and_then(|idx| self.arena.get(idx))
    }

    pub fn checked(&self) -> Vec<&ServiceNode> {
        self.iter().filter(|n| n.checked).collect()
    }

    /// Ancestors nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<&ServiceNode> {
        let mut result = Vec::new();
        let mut current = self.arena.index_of(id);
        while let Some(idx) = current.and_then(|i| self.arena.parent_index(i)) {
            if result.len() >= self.len() {
                break;
            }
            if let Some(node) = self.arena.get(idx) {
                result.push(node);
            }
            current = Some(idx);
        }
        result
    }

    /// All nodes below `id` in preorder.
    pub fn descendants(&self, id: NodeId) -> Vec<&ServiceNode> {
        match self.arena.index_of(id) {
            Some(idx) => self
                .arena
                .iter_descendants(idx)
                .map(|(_, _, node)| node)
                .collect(),
            None => Vec::new(),
        }
    }

    /// First node whose title matches, ignoring ASCII case.
    pub fn find_by_title(&self, title: &str) -> Option<&ServiceNode> {
        let title = title.trim();
        self.iter().find(|n| n.title.eq_ignore_ascii_case(title))
    }

    /// True when every checked node with a parent has a checked parent.
    pub fn is_consistent(&self) -> bool {
        self.iter()
            .filter(|n| n.checked)
            .all(|n| self.parent(n.id).map_or(true, |p| p.checked))
    }

    /// Flip `id` and propagate. Changes come back in flip order.
    ///
    /// Unknown ids fail before anything is mutated.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, id: NodeId) -> DomainResult<ChangeSet> {
        let idx = self.arena.index_of(id).ok_or(DomainError::NotFound(id))?;
        let changes = self.toggle_at(idx);
        debug!("toggle {} flipped {} node(s)", id, changes.len());
        Ok(changes)
    }

    /// Toggle only if the current state differs from `checked`.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> DomainResult<ChangeSet> {
        let node = self.get(id).ok_or(DomainError::NotFound(id))?;
        if node.checked == checked {
            return Ok(ChangeSet::new());
        }
        self.toggle(id)
    }

    /// Uncheck everything by unchecking each checked root.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) -> ChangeSet {
        let roots: Vec<Index> = self
            .arena
            .roots()
            .iter()
            .copied()
            .filter(|&i| self.arena.get(i).is_some_and(|n| n.checked))
            .collect();

        let mut all = ChangeSet::new();
        for idx in roots {
            all.extend(self.toggle_at(idx));
        }
        all
    }

    fn toggle_at(&mut self, idx: Index) -> ChangeSet {
        let mut run = Propagation::new(self.len());
        if self.flip(idx, &mut run) {
            self.bubble_up(idx, &mut run);
        } else {
            self.bubble_down(idx, &mut run);
        }
        debug_assert!(self.is_consistent());
        run.changes
    }

    fn nodes_at(&self, indices: &[Index]) -> Vec<&ServiceNode> {
        indices.iter().filter_map(|&i| self.arena.get(i)).collect()
    }

    /// Returns the new state.
    fn flip(&mut self, idx: Index, run: &mut Propagation) -> bool {
        match self.arena.get_mut(idx) {
            Some(node) => {
                node.checked = !node.checked;
                trace!("flip {} -> {}", node.id, node.checked);
                run.changes.push(node.id, node.checked);
                run.flipped.insert(idx);
                node.checked
            }
            None => false,
        }
    }

    fn bubble_up(&mut self, start: Index, run: &mut Propagation) {
        let mut current = start;
        while let Some(parent) = self.arena.parent_index(current) {
            let already_checked = self.arena.get(parent).map_or(true, |p| p.checked);
            if already_checked || run.flipped.contains(&parent) || run.exhausted() {
                break;
            }
            self.flip(parent, run);
            current = parent;
        }
    }

    fn bubble_down(&mut self, start: Index, run: &mut Propagation) {
        let mut stack: Vec<Index> =
            self.arena.children_of(start).iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            if run.exhausted() {
                break;
            }
            let checked = self.arena.get(idx).is_some_and(|n| n.checked);
            if !checked || run.flipped.contains(&idx) {
                continue;
            }
            self.flip(idx, run);
            stack.extend(self.arena.children_of(idx).iter().rev().copied());
        }
    }
}
