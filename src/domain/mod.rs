//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregator;
pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod tree;

pub use aggregator::Aggregator;
pub use arena::ServiceArena;
pub use builder::ServiceTreeBuilder;
pub use entities::*;
pub use error::{DomainError, ValidationError};
pub use tree::{DomainResult, ServiceTree};
