//! Dependency injection port.

use crate::domain::errors::ContainerError;
use crate::domain::models::declaration::BeanRef;
use crate::domain::models::value::TypeKey;

/// Produces fully constructed instances with their own dependencies
/// resolved. The command subsystem treats it as a black box.
pub trait BeanFactory: Send + Sync {
    /// Instance of the type identified by `key`.
    fn create_bean(&self, key: TypeKey) -> Result<BeanRef, ContainerError>;
}
