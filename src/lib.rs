//! Forgekit - declarative commands for plugin hosts
//!
//! Forgekit turns plain command classes into host-native commands. A class
//! declares a name, an optional permission and aliases, and one `execute`
//! method whose parameters are marked either as end-user arguments or as
//! context supplied by the host. At startup the framework scans a class
//! source, validates every declaration, creates the command beans through a
//! dependency injection container and registers one adapter per command
//! with the host.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Command metadata model, errors and the
//!   host, class source and bean factory ports
//! - **Service Layer** (`services`): Resolver registry, scanner, registrar
//!   and the bean container
//! - **Adapters** (`adapters`): Class catalog, the four command adapters
//!   and an in-memory host
//! - **Application Layer** (`application`): Plugin bootstrap
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface over a sample plugin
//!
//! # Example
//!
//! ```ignore
//! use forgekit::application::PluginApplication;
//!
//! let app = PluginApplication::builder(host.clone())
//!     .config(ConfigLoader::load()?)
//!     .catalog(catalog)
//!     .build();
//! app.container().register_default::<PingCommand>()?;
//! let report = app.start()?;
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::catalog::ClassCatalog;
pub use adapters::memory_host::{MemoryHost, Sender};
pub use application::{PluginApplication, StartupReport};
pub use domain::errors::{FrameworkError, FrameworkResult};
pub use domain::models::{
    CommandCategory, CommandClass, CommandDefinition, CommandMeta, Config, MethodDecl, ParamDecl,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Container, ResolverRegistry};
