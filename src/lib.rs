//! Hierarchical service picker.
//!
//! A [`ServiceTree`](domain::ServiceTree) holds priced services in a
//! parent/child forest. Checking a service checks its ancestors, unchecking
//! one unchecks its descendants, and [`Aggregator`](domain::Aggregator) sums
//! the prices of everything checked.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
