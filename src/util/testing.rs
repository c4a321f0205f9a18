//! Shared helpers for unit and integration tests.

use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::services::CatalogService;
use crate::domain::{NodeId, ServiceTree};

static TEST_SETUP: Once = Once::new();

/// Install a global tracing subscriber once per test binary.
///
/// `RUST_LOG` wins; otherwise svcpick logs at trace level.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("svcpick=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// The built-in sample catalog as a fresh tree.
pub fn sample_tree() -> ServiceTree {
    ServiceTree::from_descriptors(CatalogService::sample())
        .unwrap_or_else(|e| panic!("sample catalog is invalid: {e}"))
}

/// Look up a sample service id by title.
pub fn id_of(tree: &ServiceTree, title: &str) -> NodeId {
    tree.find_by_title(title)
        .map(|n| n.id())
        .unwrap_or_else(|| panic!("no service titled {title}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup_is_idempotent() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn test_sample_tree_has_ten_services() {
        let tree = sample_tree();
        assert_eq!(tree.len(), 10);
        assert_eq!(id_of(&tree, "coffee drinking"), NodeId(3));
    }
}
