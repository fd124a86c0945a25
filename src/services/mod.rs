//! Core services: resolver registry, scanner, registrar and the bean
//! container.

pub mod builtin_resolvers;
pub mod command_registrar;
pub mod command_scanner;
pub mod container;
pub mod resolver_registry;

pub use command_registrar::{CommandRegistrar, RegisteredCommand, RegistrationReport};
pub use command_scanner::CommandScanner;
pub use container::{Container, Injector, Scope};
pub use resolver_registry::{ArgumentResolver, ResolverRegistry};
