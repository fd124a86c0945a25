//! Command Registrar
//!
//! Wires validated definitions into the host: one bean per command from the
//! bean factory, one adapter per bean, one submission per adapter. Beans and
//! adapters for the whole batch are built before the first submission, so a
//! construction failure leaves the host untouched.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::adapters::command::{build_adapter, AdapterOptions};
use crate::domain::errors::RegistrationError;
use crate::domain::models::command::{CommandCategory, CommandDefinition};
use crate::domain::ports::{BeanFactory, HostCommand, HostCommandTable};
use crate::services::resolver_registry::ResolverRegistry;

/// One command that reached the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredCommand {
    /// Primary command name.
    pub name: String,
    /// Host callback shape the command was registered under.
    pub category: CommandCategory,
    /// Type name of the declaring class.
    pub class_name: String,
    /// Alternative names, in declaration order.
    pub aliases: Vec<String>,
}

/// Outcome of a successful registration run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationReport {
    /// Registered commands in submission order.
    pub commands: Vec<RegisteredCommand>,
}

impl RegistrationReport {
    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered command names in submission order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Builds adapters for validated definitions and submits them to the host.
pub struct CommandRegistrar {
    resolvers: Arc<ResolverRegistry>,
    options: AdapterOptions,
}

impl CommandRegistrar {
    /// Registrar resolving arguments through `resolvers`.
    pub fn new(resolvers: Arc<ResolverRegistry>, options: AdapterOptions) -> Self {
        Self { resolvers, options }
    }

    /// Register every definition, all or nothing.
    ///
    /// The first bean or adapter failure aborts the run before anything is
    /// submitted. The host rejecting a submission also aborts the run, but
    /// commands submitted before it stay registered: the host table is
    /// write-only and offers no way to take them back.
    #[instrument(skip_all, fields(commands = definitions.len()))]
    pub fn register_all(
        &self,
        definitions: Vec<CommandDefinition>,
        beans: &dyn BeanFactory,
        host: &dyn HostCommandTable,
    ) -> Result<RegistrationReport, RegistrationError> {
        let prepared = definitions
            .into_iter()
            .map(|definition| self.prepare(definition, beans))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| warn!(error = %e, "command registration aborted"))?;

        let mut report = RegistrationReport::default();
        for (entry, command) in prepared {
            host.register(command)
                .map_err(|source| RegistrationError::Host {
                    command: entry.name.clone(),
                    source,
                })
                .inspect_err(|e| warn!(error = %e, "host rejected command"))?;
            info!(command = %entry.name, category = %entry.category, "registered command");
            report.commands.push(entry);
        }

        info!(count = report.len(), "command registration complete");
        Ok(report)
    }

    fn prepare(
        &self,
        definition: CommandDefinition,
        beans: &dyn BeanFactory,
    ) -> Result<(RegisteredCommand, HostCommand), RegistrationError> {
        let bean = beans
            .create_bean(definition.bean_type())
            .map_err(|source| RegistrationError::BeanCreation {
                command: definition.name().to_string(),
                source,
            })?;

        let entry = RegisteredCommand {
            name: definition.name().to_string(),
            category: definition.category(),
            class_name: definition.class_name().to_string(),
            aliases: definition.aliases().to_vec(),
        };
        let command = build_adapter(Arc::new(definition), bean, &self.resolvers, &self.options)?;
        Ok((entry, command))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::adapters::catalog::ClassCatalog;
    use crate::adapters::command::TaskBridge;
    use crate::domain::errors::{ContainerError, HostError};
    use crate::domain::models::declaration::{CommandClass, CommandMeta, MethodDecl};
    use crate::services::command_scanner::CommandScanner;
    use crate::services::container::Container;

    #[derive(Default)]
    struct RecordingTable {
        names: Mutex<Vec<String>>,
        reject: Option<&'static str>,
    }

    impl HostCommandTable for RecordingTable {
        fn register(&self, command: HostCommand) -> Result<(), HostError> {
            if self.reject == Some(command.name()) {
                return Err(HostError::Rejected {
                    name: command.name().to_string(),
                    reason: "reserved".to_string(),
                });
            }
            self.names.lock().unwrap().push(command.name().to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Alpha;
    #[derive(Default)]
    struct Beta;

    fn definitions() -> Vec<CommandDefinition> {
        let catalog = ClassCatalog::from_classes([
            CommandClass::of::<Alpha>()
                .command(CommandMeta::new("alpha"))
                .method(MethodDecl::new_sync("execute", |_: &Alpha, _| Ok(()))),
            CommandClass::of::<Beta>()
                .command(CommandMeta::new("beta").alias("b"))
                .method(MethodDecl::new_sync("execute", |_: &Beta, _| Ok(()))),
        ]);
        let mut definitions = CommandScanner::new(Arc::new(ResolverRegistry::with_builtins()))
            .scan(&catalog, "")
            .unwrap();
        definitions.sort_by(|a, b| a.name().cmp(b.name()));
        definitions
    }

    fn registrar() -> CommandRegistrar {
        CommandRegistrar::new(
            Arc::new(ResolverRegistry::with_builtins()),
            AdapterOptions::default().with_bridge(TaskBridge::new()),
        )
    }

    #[test]
    fn test_registers_every_command() {
        let container = Container::new();
        container.register_default::<Alpha>().unwrap();
        container.register_default::<Beta>().unwrap();
        let table = RecordingTable::default();

        let report = registrar()
            .register_all(definitions(), &container, &table)
            .unwrap();

        assert_eq!(report.names(), vec!["alpha", "beta"]);
        assert_eq!(report.commands[1].aliases, vec!["b".to_string()]);
        assert_eq!(*table.names.lock().unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_bean_failure_submits_nothing() {
        let container = Container::new();
        container.register_default::<Alpha>().unwrap();
        let table = RecordingTable::default();

        let err = registrar()
            .register_all(definitions(), &container, &table)
            .unwrap_err();

        match err {
            RegistrationError::BeanCreation { command, source } => {
                assert_eq!(command, "beta");
                assert!(matches!(source, ContainerError::NoBeanDefinition { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(table.names.lock().unwrap().is_empty());
    }

    #[test]
    fn test_host_rejection_names_command() {
        let container = Container::new();
        container.register_default::<Alpha>().unwrap();
        container.register_default::<Beta>().unwrap();
        let table = RecordingTable {
            reject: Some("beta"),
            ..RecordingTable::default()
        };

        let err = registrar()
            .register_all(definitions(), &container, &table)
            .unwrap_err();

        assert!(matches!(err, RegistrationError::Host { ref command, .. } if command == "beta"));
    }
}
