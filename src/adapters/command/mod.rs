//! Command adapters
//!
//! One adapter per command category turns a validated [`CommandDefinition`]
//! plus its instance into the host callback shape for that category. All four
//! share a [`CommandBinding`]: the argument handles obtained from the host
//! shell, the context kind of every context parameter, and the invocation
//! path that assembles handler values, runs the handler and reports failures.

mod background;
pub mod bridge;
mod player;
mod target_entity;
mod target_player;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::domain::errors::{InvocationError, RegistrationError};
use crate::domain::models::command::{
    CommandCategory, CommandDefinition, ContextKind, ContextValue, ParameterKind,
};
use crate::domain::models::config::CommandsConfig;
use crate::domain::models::declaration::BeanRef;
use crate::domain::models::invocation::{HandlerArgs, HandlerValue};
use crate::domain::ports::host::{ArgumentHandle, CommandContext, CommandShell, HostCommand};
use crate::services::resolver_registry::ResolverRegistry;

pub use background::BackgroundCommandAdapter;
pub use bridge::TaskBridge;
pub use player::PlayerCommandAdapter;
pub use target_entity::TargetEntityCommandAdapter;
pub use target_player::TargetPlayerCommandAdapter;

/// Settings shared by every adapter.
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Sent to the invoker when a handler fails.
    pub failure_message: String,
    /// Drives handler futures to completion.
    pub bridge: TaskBridge,
    /// World-thread handlers exceeding this are logged as warnings.
    pub slow_handler_threshold: Duration,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self::from_config(&CommandsConfig::default())
    }
}

impl AdapterOptions {
    /// Options from configuration, with a bridge bound to the current
    /// runtime if there is one.
    pub fn from_config(config: &CommandsConfig) -> Self {
        Self {
            failure_message: config.failure_message.clone(),
            bridge: TaskBridge::current(),
            slow_handler_threshold: Duration::from_millis(config.slow_handler_warn_ms),
        }
    }

    /// Replace the task bridge.
    pub fn with_bridge(mut self, bridge: TaskBridge) -> Self {
        self.bridge = bridge;
        self
    }
}

/// Build the host command for `definition`, dispatching on its category.
pub fn build_adapter(
    definition: Arc<CommandDefinition>,
    bean: BeanRef,
    resolvers: &ResolverRegistry,
    options: &AdapterOptions,
) -> Result<HostCommand, RegistrationError> {
    let command = match definition.category() {
        CommandCategory::Background => HostCommand::Background(Arc::new(
            BackgroundCommandAdapter::new(definition, bean, resolvers, options.clone())?,
        )),
        CommandCategory::Player => HostCommand::Player(Arc::new(PlayerCommandAdapter::new(
            definition,
            bean,
            resolvers,
            options.clone(),
        )?)),
        CommandCategory::TargetPlayer => HostCommand::TargetPlayer(Arc::new(
            TargetPlayerCommandAdapter::new(definition, bean, resolvers, options.clone())?,
        )),
        CommandCategory::TargetEntity => HostCommand::TargetEntity(Arc::new(
            TargetEntityCommandAdapter::new(definition, bean, resolvers, options.clone())?,
        )),
    };
    Ok(command)
}

/// Supplies category-specific context values for one invocation.
///
/// The command context itself is always available and handled by
/// [`CommandBinding`]; providers only answer for the remaining kinds.
pub(crate) trait ContextProvider {
    fn value(&self, kind: ContextKind) -> Option<ContextValue>;
}

/// Provider for categories without world access.
pub(crate) struct NoWorld;

impl ContextProvider for NoWorld {
    fn value(&self, _kind: ContextKind) -> Option<ContextValue> {
        None
    }
}

/// How one handler parameter is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Argument(ArgumentHandle),
    Context(ContextKind),
}

/// Construction-time binding between a definition and a host shell.
pub(crate) struct CommandBinding {
    definition: Arc<CommandDefinition>,
    bean: BeanRef,
    slots: Vec<Slot>,
    options: AdapterOptions,
}

impl CommandBinding {
    /// Declare every argument on a fresh shell and record the slot of
    /// every parameter.
    ///
    /// A parameter with a non-empty default is bound as a defaulted
    /// optional argument even when flagged required.
    pub(crate) fn bind(
        definition: Arc<CommandDefinition>,
        bean: BeanRef,
        resolvers: &ResolverRegistry,
        options: AdapterOptions,
    ) -> Result<(Self, CommandShell), RegistrationError> {
        let mut shell = CommandShell::new(definition.name(), definition.description());
        let mut slots = Vec::with_capacity(definition.parameters().len());

        for parameter in definition.parameters() {
            let slot = match parameter.kind() {
                ParameterKind::Argument(spec) => {
                    let resolver = resolvers.get(parameter.declared_type()).ok_or_else(|| {
                        RegistrationError::MissingResolver {
                            command: definition.name().to_string(),
                            type_name: parameter.declared_type().name().to_string(),
                        }
                    })?;
                    let handle = match (&spec.default_value, spec.required) {
                        (Some(default), _) => resolver
                            .with_default(&mut shell, &spec.name, &spec.description, default)
                            .map_err(|source| RegistrationError::InvalidDefault {
                                command: definition.name().to_string(),
                                argument: spec.name.clone(),
                                source,
                            })?,
                        (None, true) => resolver.required(&mut shell, &spec.name, &spec.description),
                        (None, false) => resolver.optional(&mut shell, &spec.name, &spec.description),
                    };
                    Slot::Argument(handle)
                }
                ParameterKind::Context => {
                    let kind = ContextKind::from_type(parameter.declared_type())
                        .filter(|kind| definition.category().allows(*kind))
                        .ok_or_else(|| RegistrationError::UnboundContext {
                            command: definition.name().to_string(),
                            parameter: parameter.name().to_string(),
                            category: definition.category().to_string(),
                        })?;
                    Slot::Context(kind)
                }
            };
            slots.push(slot);
        }

        if !definition.permission().is_empty() {
            shell.require_permission(definition.permission());
        }
        shell.add_aliases(definition.aliases());

        debug!(
            command = definition.name(),
            category = %definition.category(),
            arguments = shell.arguments().len(),
            "bound command adapter"
        );

        Ok((
            Self {
                definition,
                bean,
                slots,
                options,
            },
            shell,
        ))
    }

    /// Definition this binding serves.
    pub(crate) fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    /// Run the handler for one invocation.
    ///
    /// Never panics and never returns an error: any failure is logged and
    /// answered with the configured failure message.
    pub(crate) fn invoke(&self, context: &Arc<dyn CommandContext>, provider: &dyn ContextProvider) {
        let name = self.definition.name();
        let started = Instant::now();

        let outcome = self.assemble(context, provider).map_err(anyhow::Error::from).and_then(|args| {
            let future = (self.definition.handler())(Arc::clone(&self.bean), args);
            self.options.bridge.run_to_completion(future)
        });

        let elapsed = started.elapsed();
        if self.definition.category().runs_on_world_thread()
            && elapsed > self.options.slow_handler_threshold
        {
            warn!(
                command = name,
                elapsed_ms = elapsed.as_millis() as u64,
                "handler blocked the world thread"
            );
        }

        match outcome {
            Ok(()) => debug!(command = name, sender = context.sender_name(), "command completed"),
            Err(e) => {
                error!(
                    command = name,
                    sender = context.sender_name(),
                    error = %format!("{e:#}"),
                    "command handler failed"
                );
                context.send_message(&self.options.failure_message);
            }
        }
    }

    fn assemble(
        &self,
        context: &Arc<dyn CommandContext>,
        provider: &dyn ContextProvider,
    ) -> Result<HandlerArgs, InvocationError> {
        let values = self
            .slots
            .iter()
            .map(|slot| match *slot {
                Slot::Argument(handle) => Ok(HandlerValue::Argument(context.argument(handle))),
                Slot::Context(ContextKind::CommandContext) => Ok(HandlerValue::Context(
                    ContextValue::CommandContext(Arc::clone(context)),
                )),
                Slot::Context(kind) => provider.value(kind).map(HandlerValue::Context).ok_or_else(
                    || InvocationError::UnmappedContext {
                        command: self.definition.name().to_string(),
                        kind: kind.to_string(),
                    },
                ),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HandlerArgs::new(values))
    }
}
