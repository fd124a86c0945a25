//! Domain layer for forgekit
//!
//! This module contains the command metadata model, error types and the
//! ports through which the framework talks to the host, the class source and
//! the dependency injection collaborator.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{
    ContainerError, FrameworkError, FrameworkResult, HostError, InvocationError,
    RegistrationError, ResolverError, ValidationError,
};
