//! Adapter for target-entity commands.
//!
//! The callback shape of this category was not confirmed against a host
//! build. It is assumed to deliver (context, targeted entities, world,
//! store), with the entity list produced by the host's line-of-sight
//! targeting.

use std::sync::Arc;

use super::{AdapterOptions, CommandBinding, ContextProvider};
use crate::domain::errors::RegistrationError;
use crate::domain::models::command::{CommandDefinition, ContextKind, ContextValue};
use crate::domain::models::declaration::BeanRef;
use crate::domain::ports::host::{
    CommandContext, CommandShell, EntityRef, EntityStore, TargetEntityCommand, World,
};
use crate::services::resolver_registry::ResolverRegistry;

/// Runs a handler on the world thread against targeted entities.
pub struct TargetEntityCommandAdapter {
    shell: CommandShell,
    binding: CommandBinding,
}

impl TargetEntityCommandAdapter {
    /// Bind a validated target-entity definition to its command instance.
    pub fn new(
        definition: Arc<CommandDefinition>,
        bean: BeanRef,
        resolvers: &ResolverRegistry,
        options: AdapterOptions,
    ) -> Result<Self, RegistrationError> {
        let (binding, shell) = CommandBinding::bind(definition, bean, resolvers, options)?;
        Ok(Self { shell, binding })
    }
}

struct EntityScope<'a> {
    targets: &'a [EntityRef],
    world: &'a Arc<dyn World>,
    store: &'a Arc<dyn EntityStore>,
}

impl ContextProvider for EntityScope<'_> {
    fn value(&self, kind: ContextKind) -> Option<ContextValue> {
        match kind {
            ContextKind::World => Some(ContextValue::World(Arc::clone(self.world))),
            ContextKind::EntityStore => Some(ContextValue::EntityStore(Arc::clone(self.store))),
            ContextKind::TargetedEntities => {
                Some(ContextValue::TargetedEntities(self.targets.to_vec()))
            }
            ContextKind::CommandContext
            | ContextKind::PlayerIdentity
            | ContextKind::PlayerEntity => None,
        }
    }
}

impl TargetEntityCommand for TargetEntityCommandAdapter {
    fn shell(&self) -> &CommandShell {
        &self.shell
    }

    fn execute(
        &self,
        context: &Arc<dyn CommandContext>,
        targets: &[EntityRef],
        world: &Arc<dyn World>,
        store: &Arc<dyn EntityStore>,
    ) {
        let scope = EntityScope {
            targets,
            world,
            store,
        };
        self.binding.invoke(context, &scope);
    }
}

impl std::fmt::Debug for TargetEntityCommandAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetEntityCommandAdapter")
            .field("command", &self.binding.definition().name())
            .finish()
    }
}
