//! Adapter for player-scoped commands.

use std::sync::Arc;

use super::{AdapterOptions, CommandBinding, ContextProvider};
use crate::domain::errors::RegistrationError;
use crate::domain::models::command::{CommandDefinition, ContextKind, ContextValue};
use crate::domain::models::declaration::BeanRef;
use crate::domain::ports::host::{
    CommandContext, CommandShell, EntityRef, EntityStore, PlayerCommand, PlayerRef, World,
};
use crate::services::resolver_registry::ResolverRegistry;

/// Runs a handler on the world thread for the invoking player.
pub struct PlayerCommandAdapter {
    shell: CommandShell,
    binding: CommandBinding,
}

impl PlayerCommandAdapter {
    /// Bind a validated player definition to its command instance.
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

struct PlayerScope<'a> {
    store: &'a Arc<dyn EntityStore>,
    entity: EntityRef,
    player: &'a PlayerRef,
    world: &'a Arc<dyn World>,
}

impl ContextProvider for PlayerScope<'_> {
    fn value(&self, kind: ContextKind) -> Option<ContextValue> {
        match kind {
            ContextKind::World => Some(ContextValue::World(Arc::clone(self.world))),
            ContextKind::EntityStore => Some(ContextValue::EntityStore(Arc::clone(self.store))),
            ContextKind::PlayerIdentity => Some(ContextValue::PlayerIdentity(self.player.clone())),
            ContextKind::PlayerEntity => Some(ContextValue::PlayerEntity(self.entity)),
            ContextKind::CommandContext | ContextKind::TargetedEntities => None,
        }
    }
}

impl PlayerCommand for PlayerCommandAdapter {
    fn shell(&self) -> &CommandShell {
        &self.shell
    }

    fn execute(
        &self,
        context: &Arc<dyn CommandContext>,
        store: &Arc<dyn EntityStore>,
        entity: EntityRef,
        player: &PlayerRef,
        world: &Arc<dyn World>,
    ) {
        let scope = PlayerScope {
            store,
            entity,
            player,
            world,
        };
        self.binding.invoke(context, &scope);
    }
}

impl std::fmt::Debug for PlayerCommandAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerCommandAdapter")
            .field("command", &self.binding.definition().name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::adapters::command::test_support::{self, RecordingContext};
    use crate::adapters::command::TaskBridge;
    use crate::domain::models::command::CommandCategory;
    use crate::domain::models::declaration::{CommandClass, CommandMeta, MethodDecl, ParamDecl};
    use crate::services::command_scanner::CommandScanner;

    #[derive(Default)]
    struct Whoami {
        seen: Mutex<Option<(String, EntityRef, String)>>,
    }

    #[test]
    fn test_context_values_follow_declaration_order() {
        let class = CommandClass::of::<Whoami>()
            .command(CommandMeta::new("whoami").category(CommandCategory::Player))
            .method(
                MethodDecl::new_sync("execute", |me: &Whoami, args| {
                    let player = args.player(0)?.username.clone();
                    let entity = args.player_entity(1)?;
                    let world = args.world(2)?.name().to_string();
                    *me.seen.lock().unwrap() = Some((player, entity, world));
                    Ok(())
                })
                .param(ParamDecl::context::<PlayerRef>("player"))
                .param(ParamDecl::context::<EntityRef>("entity"))
                .param(ParamDecl::context::<Arc<dyn World>>("world")),
            );
        let resolvers = Arc::new(ResolverRegistry::with_builtins());
        let definition = CommandScanner::new(Arc::clone(&resolvers))
            .build_definition(&class)
            .unwrap();
        let bean = Arc::new(Whoami::default());
        let adapter = PlayerCommandAdapter::new(
            Arc::new(definition),
            bean.clone(),
            &resolvers,
            AdapterOptions::default().with_bridge(TaskBridge::new()),
        )
        .unwrap();

        let ctx = RecordingContext::new(Vec::new());
        let dyn_ctx: Arc<dyn CommandContext> = ctx.clone();
        adapter.execute(
            &dyn_ctx,
            &test_support::store(),
            EntityRef(7),
            &test_support::steve(),
            &test_support::world(),
        );

        assert!(ctx.messages().is_empty());
        assert_eq!(
            bean.seen.lock().unwrap().clone(),
            Some(("steve".to_string(), EntityRef(7), "overworld".to_string()))
        );
    }
}
