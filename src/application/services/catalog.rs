//! Service catalog loading
//!
//! A catalog is a TOML file with one `[[service]]` table per node:
//!
//! ```toml
//! [[service]]
//! id = 3
//! title = "coffee drinking"
//! price = 10
//!
//! [[service]]
//! title = "Sugar"
//! price = "1.00"
//! parent_id = 3
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Price, ServiceDescriptor, ServiceTree};
use crate::infrastructure::traits::FileSystem;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "service")]
    services: Vec<ServiceDescriptor>,
}

/// Loads service descriptors and builds trees from them.
pub struct CatalogService {
    fs: Arc<dyn FileSystem>,
}

impl CatalogService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// The built-in catalog used when none is configured.
    pub fn sample() -> Vec<ServiceDescriptor> {
        let units = |u: u64| Price::from_minor(u * 100);
        vec![
            ServiceDescriptor::new("web development", units(200)).with_id(0),
            ServiceDescriptor::new("web design", units(250)).with_id(1),
            ServiceDescriptor::new("photography", units(100)).with_id(2),
            ServiceDescriptor::new("coffee drinking", units(10)).with_id(3),
            ServiceDescriptor::new("SEO", units(50)).with_parent(0),
            ServiceDescriptor::new("Analytics", units(25)).with_parent(0),
            ServiceDescriptor::new("Sugar", units(1)).with_parent(3),
            ServiceDescriptor::new("Cream", units(1)).with_parent(3),
            ServiceDescriptor::new("Decaf", units(2)).with_parent(3),
            ServiceDescriptor::new("Custom Branding", units(100)).with_parent(1),
        ]
    }

    /// Parse catalog TOML. `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Vec<ServiceDescriptor>> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| ApplicationError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if file.services.is_empty() {
            return Err(ApplicationError::Catalog {
                path: path.to_path_buf(),
                message: "no [[service]] entries".to_string(),
            });
        }
        Ok(file.services)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Vec<ServiceDescriptor>> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::Catalog {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read catalog", path)?;
        let services = Self::parse(&content, path)?;
        debug!("loaded {} services from {}", services.len(), path.display());
        Ok(services)
    }

    /// Build a tree from `path`, or from the sample catalog when `None`.
    pub fn load_tree(&self, path: Option<&Path>) -> ApplicationResult<ServiceTree> {
        let descriptors = match path {
            Some(p) => self.load(p)?,
            None => Self::sample(),
        };
        Ok(ServiceTree::from_descriptors(descriptors)?)
    }
}
