//! Adapter for background commands.

use std::sync::Arc;

use futures::future;

use super::{AdapterOptions, CommandBinding, NoWorld};
use crate::domain::errors::RegistrationError;
use crate::domain::models::command::CommandDefinition;
use crate::domain::models::declaration::BeanRef;
use crate::domain::ports::host::{BackgroundCommand, CommandContext, CommandFuture, CommandShell};
use crate::services::resolver_registry::ResolverRegistry;

/// Runs a handler on one of the host's background threads.
///
/// The handler completes before `execute_async` returns; the returned future
/// is already resolved.
pub struct BackgroundCommandAdapter {
    shell: CommandShell,
    binding: CommandBinding,
}

impl BackgroundCommandAdapter {
    /// Bind a validated background definition to its command instance.
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

impl BackgroundCommand for BackgroundCommandAdapter {
    fn shell(&self) -> &CommandShell {
        &self.shell
    }

    fn execute_async(&self, context: Arc<dyn CommandContext>) -> CommandFuture {
        self.binding.invoke(&context, &NoWorld);
        Box::pin(future::ready(()))
    }
}

impl std::fmt::Debug for BackgroundCommandAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundCommandAdapter")
            .field("command", &self.binding.definition().name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::command::test_support::RecordingContext;
    use crate::adapters::command::TaskBridge;
    use crate::domain::models::declaration::{CommandClass, CommandMeta, MethodDecl, ParamDecl};
    use crate::services::command_scanner::CommandScanner;

    struct Ping;

    #[test]
    fn test_execute_async_replies_through_context() {
        let class = CommandClass::of::<Ping>()
            .command(CommandMeta::new("ping"))
            .method(
                MethodDecl::new("execute", |_: Arc<Ping>, args| async move {
                    args.command_context(0)?.send_message("pong");
                    Ok::<_, anyhow::Error>(())
                })
                .param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx")),
            );
        let resolvers = Arc::new(ResolverRegistry::with_builtins());
        let definition = CommandScanner::new(Arc::clone(&resolvers))
            .build_definition(&class)
            .unwrap();
        let adapter = BackgroundCommandAdapter::new(
            Arc::new(definition),
            Arc::new(Ping),
            &resolvers,
            AdapterOptions::default().with_bridge(TaskBridge::new()),
        )
        .unwrap();

        let ctx = RecordingContext::new(Vec::new());
        tokio_test::block_on(adapter.execute_async(ctx.clone()));

        assert_eq!(ctx.messages(), vec!["pong".to_string()]);
    }
}
