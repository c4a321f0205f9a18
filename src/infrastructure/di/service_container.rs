//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CatalogService, SelectionService};
use crate::config::Settings;
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::traits::{FileSystem, Prompt, RealFileSystem, StdinPrompt};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Interactive input
    pub prompt: Arc<dyn Prompt>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(StdinPrompt))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, prompt: Arc<dyn Prompt>) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            prompt,
        }
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(Arc::clone(&self.fs))
    }

    /// Fresh selection over the configured catalog (sample when unset).
    pub fn selection_service(&self) -> InfraResult<SelectionService> {
        let tree = self
            .catalog_service()
            .load_tree(self.settings.catalog.as_deref())?;
        Ok(SelectionService::new(tree))
    }
}
