//! Error types for the command framework.
//!
//! Failures fall into two tiers. Startup failures (`ValidationError`,
//! `ResolverError`, `ContainerError`, `RegistrationError`) are fatal and
//! surface before anything is wired into the host. Invocation failures
//! (`InvocationError` and whatever a handler returns) are caught by the
//! command adapters and never reach the host's dispatch loop.

use thiserror::Error;

/// Structural misconfiguration found while scanning command declarations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Class {class} does not carry the command marker")]
    MissingCommandMarker { class: String },

    #[error("Command class {class} declares an empty command name")]
    EmptyCommandName { class: String },

    #[error("Command class {class} has no '{method}' method")]
    MissingHandler { class: String, method: String },

    #[error("Command class {class} declares {count} '{method}' methods; exactly one is required")]
    AmbiguousHandler {
        class: String,
        method: String,
        count: usize,
    },

    #[error("Method '{method}' declared on {class} has receiver {receiver}")]
    ReceiverMismatch {
        class: String,
        method: String,
        receiver: String,
    },

    #[error("Parameter '{parameter}' of command '{command}' must be marked as an argument or a context parameter")]
    MissingParameterMarker { command: String, parameter: String },

    #[error("Parameter '{parameter}' of command '{command}' carries {count} markers; exactly one of argument or context is allowed")]
    ConflictingParameterMarkers {
        command: String,
        parameter: String,
        count: usize,
    },

    #[error("Required argument '{parameter}' of command '{command}' is declared after optional argument '{optional}'; optional arguments must come last")]
    RequiredAfterOptional {
        command: String,
        parameter: String,
        optional: String,
    },

    #[error("No argument resolver registered for type {type_name} (parameter '{parameter}' of command '{command}'). Register a resolver for this type before scanning")]
    MissingResolver {
        command: String,
        parameter: String,
        type_name: String,
    },

    #[error("Context parameter '{parameter}' of command '{command}' has type {type_name}, which is not available to {category} commands. Allowed types: {allowed}")]
    UnsupportedContextType {
        command: String,
        parameter: String,
        type_name: String,
        category: String,
        allowed: String,
    },

    #[error("Duplicate command name '{name}' declared by {first} and {second}")]
    DuplicateCommandName {
        name: String,
        first: String,
        second: String,
    },
}

/// Errors raised by the argument resolver registry and its resolvers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("An argument resolver is already registered for type {type_name}")]
    AlreadyRegistered { type_name: String },

    #[error("Default value {value:?} is not a valid {expected}")]
    InvalidDefault { value: String, expected: String },
}

/// Errors raised by the dependency injection container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("No bean definition registered for {type_name}")]
    NoBeanDefinition { type_name: String },

    #[error("A bean definition is already registered for {type_name}")]
    DuplicateBean { type_name: String },

    #[error("Circular dependency detected: {path}")]
    CircularDependency { path: String },

    #[error("Bean {type_name} could not be created: {source}")]
    CreationFailed {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Bean registered for {expected} produced a value of a different type")]
    TypeMismatch { expected: String },
}

/// Rejection reported by the host's command table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Command '{0}' is already registered with the host")]
    DuplicateCommand(String),

    #[error("Host rejected command '{name}': {reason}")]
    Rejected { name: String, reason: String },
}

/// Failures while instantiating, adapting or submitting commands.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Failed to create instance for command '{command}': {source}")]
    BeanCreation {
        command: String,
        #[source]
        source: ContainerError,
    },

    #[error("No argument resolver registered for type {type_name} (command '{command}')")]
    MissingResolver { command: String, type_name: String },

    #[error("Invalid default for argument '{argument}' of command '{command}': {source}")]
    InvalidDefault {
        command: String,
        argument: String,
        #[source]
        source: ResolverError,
    },

    #[error("Context parameter '{parameter}' of command '{command}' cannot be bound for {category} commands")]
    UnboundContext {
        command: String,
        parameter: String,
        category: String,
    },

    #[error("Failed to register command '{command}' with the host: {source}")]
    Host {
        command: String,
        #[source]
        source: HostError,
    },
}

/// Faults while assembling or reading handler parameters at invocation time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Command '{command}' has no runtime value for context kind {kind}")]
    UnmappedContext { command: String, kind: String },

    #[error("No parameter at position {0}")]
    NoSuchParameter(usize),

    #[error("Parameter {position} is a {actual} parameter, not a {expected} parameter")]
    KindMismatch {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Parameter {position} holds {actual}, not {expected}")]
    TypeMismatch {
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("Required argument at position {0} has no value")]
    MissingValue(usize),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

/// Umbrella error for application startup.
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Config(#[from] anyhow::Error),
}

/// Result alias for startup paths.
pub type FrameworkResult<T> = Result<T, FrameworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_message_names_both_classes() {
        let err = ValidationError::DuplicateCommandName {
            name: "heal".to_string(),
            first: "plugin::HealA".to_string(),
            second: "plugin::HealB".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("plugin::HealA"));
        assert!(msg.contains("plugin::HealB"));
    }

    #[test]
    fn test_missing_resolver_message_instructs_registration() {
        let err = ValidationError::MissingResolver {
            command: "warp".to_string(),
            parameter: "target".to_string(),
            type_name: "plugin::Location".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("plugin::Location"));
        assert!(msg.contains("Register a resolver"));
    }
}
