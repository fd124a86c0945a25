//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

use std::sync::Arc;

use forgekit::{ClassCatalog, CommandClass, Container, MemoryHost, PluginApplication};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
#[allow(dead_code)]
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Host with `steve` and `alex` online.
#[allow(dead_code)]
pub fn host_with_players() -> Arc<MemoryHost> {
    let host = Arc::new(MemoryHost::default());
    host.join("steve");
    host.join("alex");
    host
}

/// Application over `classes` registering into `host`, with beans added by
/// `beans`.
#[allow(dead_code)]
pub fn application(
    host: &Arc<MemoryHost>,
    classes: impl IntoIterator<Item = CommandClass>,
    beans: impl FnOnce(&Container),
) -> PluginApplication {
    let app = PluginApplication::builder(host.clone())
        .catalog(ClassCatalog::from_classes(classes))
        .build();
    beans(app.container().as_ref());
    app
}
