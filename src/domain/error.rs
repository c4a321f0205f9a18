//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid service tree: {0}")]
    Validation(#[from] ValidationError),

    #[error("service not found: {0}")]
    NotFound(NodeId),
}

/// Rejections raised while bulk-loading a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate service id: {0}")]
    DuplicateId(NodeId),

    #[error("service {0} declares itself as parent")]
    SelfParent(NodeId),

    #[error("service {id} references unknown parent {parent}")]
    UnknownParent { id: NodeId, parent: NodeId },

    #[error("cycle detected in hierarchy at service {0}")]
    Cycle(NodeId),

    #[error("service at position {0} has an empty title")]
    EmptyTitle(usize),

    #[error("sum of all prices overflows")]
    PriceOverflow,

    #[error("no id left to assign after {0}")]
    IdExhausted(NodeId),
}
