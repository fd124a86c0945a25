//! Adapter for target-player commands.
//!
//! The callback shape of this category was not confirmed against a host
//! build. It is assumed to deliver (context, invoker entity or none, target
//! entity, target identity, target world, target store). Player identity and
//! player entity parameters are bound to the target, not the invoker.

use std::sync::Arc;

use super::{AdapterOptions, CommandBinding, ContextProvider};
use crate::domain::errors::RegistrationError;
use crate::domain::models::command::{CommandDefinition, ContextKind, ContextValue};
use crate::domain::models::declaration::BeanRef;
use crate::domain::ports::host::{
    CommandContext, CommandShell, EntityRef, EntityStore, PlayerRef, TargetPlayerCommand, World,
};
use crate::services::resolver_registry::ResolverRegistry;

/// Runs a handler on the target's world thread.
pub struct TargetPlayerCommandAdapter {
    shell: CommandShell,
    binding: CommandBinding,
}

impl TargetPlayerCommandAdapter {
    /// Bind a validated target-player definition to its command instance.
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

struct TargetScope<'a> {
    target: EntityRef,
    target_player: &'a PlayerRef,
    world: &'a Arc<dyn World>,
    store: &'a Arc<dyn EntityStore>,
}

impl ContextProvider for TargetScope<'_> {
    fn value(&self, kind: ContextKind) -> Option<ContextValue> {
        match kind {
            ContextKind::World => Some(ContextValue::World(Arc::clone(self.world))),
            ContextKind::EntityStore => Some(ContextValue::EntityStore(Arc::clone(self.store))),
            ContextKind::PlayerIdentity => {
                Some(ContextValue::PlayerIdentity(self.target_player.clone()))
            }
            ContextKind::PlayerEntity => Some(ContextValue::PlayerEntity(self.target)),
            ContextKind::CommandContext | ContextKind::TargetedEntities => None,
        }
    }
}

impl TargetPlayerCommand for TargetPlayerCommandAdapter {
    fn shell(&self) -> &CommandShell {
        &self.shell
    }

    fn execute(
        &self,
        context: &Arc<dyn CommandContext>,
        _source: Option<EntityRef>,
        target: EntityRef,
        target_player: &PlayerRef,
        world: &Arc<dyn World>,
        store: &Arc<dyn EntityStore>,
    ) {
        let scope = TargetScope {
            target,
            target_player,
            world,
            store,
        };
        self.binding.invoke(context, &scope);
    }
}

impl std::fmt::Debug for TargetPlayerCommandAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetPlayerCommandAdapter")
            .field("command", &self.binding.definition().name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use uuid::Uuid;

    use super::*;
    use crate::adapters::command::test_support::{self, RecordingContext};
    use crate::adapters::command::TaskBridge;
    use crate::domain::models::command::CommandCategory;
    use crate::domain::models::declaration::{CommandClass, CommandMeta, MethodDecl, ParamDecl};
    use crate::services::command_scanner::CommandScanner;

    #[derive(Default)]
    struct Heal {
        healed: Mutex<Vec<(String, EntityRef)>>,
    }

    #[test]
    fn test_player_parameters_bind_to_target() {
        let class = CommandClass::of::<Heal>()
            .command(CommandMeta::new("heal").category(CommandCategory::TargetPlayer))
            .method(
                MethodDecl::new_sync("execute", |heal: &Heal, args| {
                    let target = args.player(0)?.username.clone();
                    let entity = args.player_entity(1)?;
                    heal.healed.lock().unwrap().push((target, entity));
                    Ok(())
                })
                .param(ParamDecl::context::<PlayerRef>("target"))
                .param(ParamDecl::context::<EntityRef>("entity")),
            );
        let resolvers = Arc::new(ResolverRegistry::with_builtins());
        let definition = CommandScanner::new(Arc::clone(&resolvers))
            .build_definition(&class)
            .unwrap();
        let bean = Arc::new(Heal::default());
        let adapter = TargetPlayerCommandAdapter::new(
            Arc::new(definition),
            bean.clone(),
            &resolvers,
            AdapterOptions::default().with_bridge(TaskBridge::new()),
        )
        .unwrap();

        let ctx = RecordingContext::new(Vec::new());
        let dyn_ctx: Arc<dyn CommandContext> = ctx.clone();
        let alex = PlayerRef::new(Uuid::new_v4(), "alex");
        adapter.execute(
            &dyn_ctx,
            None,
            EntityRef(42),
            &alex,
            &test_support::world(),
            &test_support::store(),
        );

        assert_eq!(
            *bean.healed.lock().unwrap(),
            vec![("alex".to_string(), EntityRef(42))]
        );
    }
}
