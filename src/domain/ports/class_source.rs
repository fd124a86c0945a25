//! Class discovery port.
//!
//! Stands in for a class loader: it knows every declared class and can list
//! the ones visible under a package.

use std::sync::Arc;

use crate::domain::models::declaration::CommandClass;

/// Source of class declarations for the command scanner.
pub trait ClassSource: Send + Sync {
    /// Classes whose module path is `base_package` or nested below it.
    /// An empty package selects every class.
    fn classes_under(&self, base_package: &str) -> Vec<Arc<CommandClass>>;
}
