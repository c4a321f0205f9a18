//! Application services

pub mod catalog;
pub mod selection;

pub use catalog::CatalogService;
pub use selection::{ChangeListener, SelectionService, SubscriptionId};
