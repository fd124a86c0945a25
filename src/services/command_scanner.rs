//! Command Scanner & Validator
//!
//! Discovers command classes from a [`ClassSource`] and turns them into
//! validated [`CommandDefinition`]s. Validation is fail-fast and complete
//! before anything is instantiated: the first structural problem aborts the
//! whole scan, so a misconfigured command never reaches the host.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::domain::errors::ValidationError;
use crate::domain::models::command::{CommandDefinition, ContextKind, ParameterKind, ParameterSpec};
use crate::domain::models::declaration::{CommandClass, CommandMeta, MethodDecl, HANDLER_METHOD};
use crate::domain::ports::ClassSource;
use crate::services::resolver_registry::ResolverRegistry;

/// Scans class sources for command classes and validates them.
pub struct CommandScanner {
    resolvers: Arc<ResolverRegistry>,
}

impl CommandScanner {
    /// Create a scanner checking argument types against `resolvers`.
    pub fn new(resolvers: Arc<ResolverRegistry>) -> Self {
        Self { resolvers }
    }

    /// Discover and validate every command class under `base_package`.
    ///
    /// Only concrete classes carrying the command marker are considered.
    /// Any validation failure aborts the scan.
    #[instrument(skip(self, source))]
    pub fn scan(
        &self,
        source: &dyn ClassSource,
        base_package: &str,
    ) -> Result<Vec<CommandDefinition>, ValidationError> {
        let classes: Vec<Arc<CommandClass>> = source
            .classes_under(base_package)
            .into_iter()
            .filter(|class| class.is_concrete() && class.command_meta().is_some())
            .collect();

        debug!(count = classes.len(), "discovered command classes");

        let definitions = classes
            .iter()
            .map(|class| self.build_definition(class))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| warn!(error = %e, "command validation failed"))?;

        validate_unique_names(&definitions).inspect_err(|e| warn!(error = %e, "command validation failed"))?;

        info!(commands = definitions.len(), "command scan complete");
        Ok(definitions)
    }

    /// Validate one class and build its definition.
    pub fn build_definition(&self, class: &CommandClass) -> Result<CommandDefinition, ValidationError> {
        let meta = class
            .command_meta()
            .cloned()
            .ok_or_else(|| ValidationError::MissingCommandMarker {
                class: class.name().to_string(),
            })?;
        if meta.name.trim().is_empty() {
            return Err(ValidationError::EmptyCommandName {
                class: class.name().to_string(),
            });
        }

        let handler = find_handler(class)?;
        let parameters = build_parameters(&meta.name, handler)?;

        validate_argument_order(&meta.name, &parameters)?;
        self.validate_resolvers(&meta.name, &parameters)?;
        validate_context_types(&meta, &parameters)?;

        debug!(
            command = %meta.name,
            class = class.name(),
            category = %meta.category,
            parameters = parameters.len(),
            "validated command"
        );

        Ok(CommandDefinition::new(
            meta.name,
            meta.description,
            meta.permission,
            meta.aliases,
            meta.category,
            class.name(),
            class.type_key(),
            Arc::clone(handler.handler()),
            parameters,
        ))
    }

    fn validate_resolvers(&self, command: &str, parameters: &[ParameterSpec]) -> Result<(), ValidationError> {
        for param in parameters.iter().filter(|p| !p.is_context()) {
            if !self.resolvers.has_resolver(param.declared_type()) {
                return Err(ValidationError::MissingResolver {
                    command: command.to_string(),
                    parameter: param.name().to_string(),
                    type_name: param.declared_type().name().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Exactly one handler method, declared on the class itself.
fn find_handler(class: &CommandClass) -> Result<&MethodDecl, ValidationError> {
    let candidates: Vec<&MethodDecl> = class
        .methods()
        .iter()
        .filter(|m| m.name() == HANDLER_METHOD)
        .collect();

    let handler = match candidates.as_slice() {
        [] => {
            return Err(ValidationError::MissingHandler {
                class: class.name().to_string(),
                method: HANDLER_METHOD.to_string(),
            })
        }
        [handler] => *handler,
        many => {
            return Err(ValidationError::AmbiguousHandler {
                class: class.name().to_string(),
                method: HANDLER_METHOD.to_string(),
                count: many.len(),
            })
        }
    };

    if handler.receiver() != class.type_key() {
        return Err(ValidationError::ReceiverMismatch {
            class: class.name().to_string(),
            method: handler.name().to_string(),
            receiver: handler.receiver().name().to_string(),
        });
    }

    Ok(handler)
}

fn build_parameters(command: &str, handler: &MethodDecl) -> Result<Vec<ParameterSpec>, ValidationError> {
    handler
        .params()
        .iter()
        .enumerate()
        .map(|(position, param)| {
            ParameterSpec::from_markers(
                command,
                param.name(),
                param.declared_type(),
                position,
                param.markers(),
            )
        })
        .collect()
}

/// Required arguments precede optional ones; context parameters are ignored.
fn validate_argument_order(command: &str, parameters: &[ParameterSpec]) -> Result<(), ValidationError> {
    let mut first_optional: Option<&ParameterSpec> = None;
    for param in parameters.iter().filter(|p| !p.is_context()) {
        match (param.is_optional(), first_optional) {
            (true, None) => first_optional = Some(param),
            (false, Some(optional)) => {
                return Err(ValidationError::RequiredAfterOptional {
                    command: command.to_string(),
                    parameter: param.name().to_string(),
                    optional: optional.name().to_string(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_context_types(meta: &CommandMeta, parameters: &[ParameterSpec]) -> Result<(), ValidationError> {
    for param in parameters {
        if !matches!(param.kind(), ParameterKind::Context) {
            continue;
        }
        let allowed = ContextKind::from_type(param.declared_type())
            .is_some_and(|kind| meta.category.allows(kind));
        if !allowed {
            return Err(ValidationError::UnsupportedContextType {
                command: meta.name.clone(),
                parameter: param.name().to_string(),
                type_name: param.declared_type().name().to_string(),
                category: meta.category.to_string(),
                allowed: meta.category.allowed_type_names(),
            });
        }
    }
    Ok(())
}

/// Command names are unique across one scan.
fn validate_unique_names(definitions: &[CommandDefinition]) -> Result<(), ValidationError> {
    let mut seen: HashMap<&str, &CommandDefinition> = HashMap::new();
    for definition in definitions {
        if let Some(first) = seen.insert(definition.name(), definition) {
            return Err(ValidationError::DuplicateCommandName {
                name: definition.name().to_string(),
                first: first.class_name().to_string(),
                second: definition.class_name().to_string(),
            });
        }
    }
    Ok(())
}
