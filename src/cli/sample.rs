//! Sample plugin bundled with the CLI.
//!
//! One command per category, sharing a small health ledger bean so that
//! world-thread commands have some state to act on.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::adapters::catalog::ClassCatalog;
use crate::adapters::memory_host::MemoryHost;
use crate::application::{PluginApplication, StartupReport};
use crate::domain::errors::ContainerError;
use crate::domain::models::command::CommandCategory;
use crate::domain::models::config::Config;
use crate::domain::models::declaration::{CommandClass, CommandMeta, MethodDecl, ParamDecl};
use crate::domain::ports::{CommandContext, EntityRef, EntityStore, PlayerRef, World};
use crate::services::container::Container;

/// Module path the sample classes are declared in.
pub const SAMPLE_PACKAGE: &str = "forgekit::sample";

/// Players online in the sample world.
pub const SAMPLE_PLAYERS: [&str; 2] = ["steve", "alex"];

/// Settings for the greet command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingSettings {
    /// Word the greeting starts with.
    pub greeting: String,
}

impl Default for GreetingSettings {
    fn default() -> Self {
        Self {
            greeting: "Hello".to_string(),
        }
    }
}

/// Health points per entity.
#[derive(Debug, Default)]
pub struct HealthLedger {
    health: Mutex<HashMap<EntityRef, i32>>,
}

impl HealthLedger {
    /// Health cap applied by [`HealthLedger::heal`].
    pub const MAX_HEALTH: i32 = 100;
    /// Health of an entity the ledger has not seen yet.
    pub const START_HEALTH: i32 = 50;

    /// Current health of `entity`.
    pub fn health(&self, entity: EntityRef) -> i32 {
        self.health
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity)
            .copied()
            .unwrap_or(Self::START_HEALTH)
    }

    /// Add `amount`, capped at the maximum; returns the new health.
    pub fn heal(&self, entity: EntityRef, amount: i32) -> i32 {
        let mut health = self.health.lock().unwrap_or_else(PoisonError::into_inner);
        let current = health.entry(entity).or_insert(Self::START_HEALTH);
        *current = current.saturating_add(amount).min(Self::MAX_HEALTH);
        *current
    }
}

/// `ping`: background command without arguments.
pub struct PingCommand;

/// `greet <name> [--times=1] [--shout]`: background command with arguments.
pub struct GreetCommand {
    settings: Arc<GreetingSettings>,
}

/// `whois`: player command describing the invoker.
pub struct WhoisCommand;

/// `heal [--amount=20] [--player <name>]`: target-player command.
pub struct HealCommand {
    ledger: Arc<HealthLedger>,
}

/// `inspect`: target-entity command over the invoker's line of sight.
pub struct InspectCommand {
    ledger: Arc<HealthLedger>,
}

fn ping() -> CommandClass {
    CommandClass::of::<PingCommand>()
        .in_module(SAMPLE_PACKAGE)
        .command(CommandMeta::new("ping").description("Check that commands run"))
        .method(
            MethodDecl::new("execute", |_: Arc<PingCommand>, args| async move {
                args.command_context(0)?.send_message("Pong!");
                Ok::<_, anyhow::Error>(())
            })
            .param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx")),
        )
}

fn greet() -> CommandClass {
    CommandClass::of::<GreetCommand>()
        .in_module(SAMPLE_PACKAGE)
        .command(
            CommandMeta::new("greet")
                .description("Greet someone")
                .alias("hi"),
        )
        .method(
            MethodDecl::new_sync("execute", |cmd: &GreetCommand, args| {
                let name = args.get::<String>(0)?;
                let times = *args.get::<i32>(1)?;
                let shout = args.get_opt::<bool>(2)?.copied().unwrap_or(false);
                let ctx = args.command_context(3)?;

                anyhow::ensure!((1..=5).contains(&times), "times must be between 1 and 5, got {times}");
                let mut line = format!("{}, {name}!", cmd.settings.greeting);
                if shout {
                    line = line.to_uppercase();
                }
                for _ in 0..times {
                    ctx.send_message(&line);
                }
                Ok(())
            })
            .param(ParamDecl::argument::<String>("name").description("Who to greet"))
            .param(
                ParamDecl::argument::<i32>("times")
                    .description("How many times")
                    .default_value("1"),
            )
            .param(ParamDecl::argument::<bool>("shout").optional())
            .param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx")),
        )
}

fn whois() -> CommandClass {
    CommandClass::of::<WhoisCommand>()
        .in_module(SAMPLE_PACKAGE)
        .command(
            CommandMeta::new("whois")
                .description("Describe yourself")
                .category(CommandCategory::Player),
        )
        .method(
            MethodDecl::new_sync("execute", |_: &WhoisCommand, args| {
                let ctx = args.command_context(0)?;
                let player = args.player(1)?;
                let entity = args.player_entity(2)?;
                let world = args.world(3)?;
                ctx.send_message(&format!(
                    "{} ({}) is {entity} in {}",
                    player.username,
                    player.uuid,
                    world.name()
                ));
                Ok(())
            })
            .param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx"))
            .param(ParamDecl::context::<PlayerRef>("player"))
            .param(ParamDecl::context::<EntityRef>("entity"))
            .param(ParamDecl::context::<Arc<dyn World>>("world")),
        )
}

fn heal() -> CommandClass {
    CommandClass::of::<HealCommand>()
        .in_module(SAMPLE_PACKAGE)
        .command(
            CommandMeta::new("heal")
                .description("Heal a player")
                .permission("forgekit.heal")
                .category(CommandCategory::TargetPlayer),
        )
        .method(
            MethodDecl::new_sync("execute", |cmd: &HealCommand, args| {
                let amount = *args.get::<i32>(0)?;
                let target = args.player(1)?;
                let entity = args.player_entity(2)?;
                let ctx = args.command_context(3)?;

                anyhow::ensure!(amount > 0, "heal amount must be positive, got {amount}");
                let health = cmd.ledger.heal(entity, amount);
                ctx.send_message(&format!(
                    "Healed {} by {amount} ({health}/{})",
                    target.username,
                    HealthLedger::MAX_HEALTH
                ));
                Ok(())
            })
            .param(
                ParamDecl::argument::<i32>("amount")
                    .description("Health to restore")
                    .default_value("20"),
            )
            .param(ParamDecl::context::<PlayerRef>("target"))
            .param(ParamDecl::context::<EntityRef>("entity"))
            .param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx")),
        )
}

fn inspect() -> CommandClass {
    CommandClass::of::<InspectCommand>()
        .in_module(SAMPLE_PACKAGE)
        .command(
            CommandMeta::new("inspect")
                .description("Show health of the entities you are looking at")
                .category(CommandCategory::TargetEntity),
        )
        .method(
            MethodDecl::new_sync("execute", |cmd: &InspectCommand, args| {
                let ctx = args.command_context(0)?;
                let targets = args.targeted_entities(1)?;
                let store = args.entity_store(2)?;

                if targets.is_empty() {
                    ctx.send_message("You are not looking at anything.");
                }
                for &entity in targets {
                    if store.contains(entity) {
                        ctx.send_message(&format!(
                            "{entity}: {}/{} hp",
                            cmd.ledger.health(entity),
                            HealthLedger::MAX_HEALTH
                        ));
                    } else {
                        ctx.send_message(&format!("{entity}: no longer exists"));
                    }
                }
                Ok(())
            })
            .param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx"))
            .param(ParamDecl::context::<Vec<EntityRef>>("targets"))
            .param(ParamDecl::context::<Arc<dyn EntityStore>>("store")),
        )
}

/// Every sample command class.
pub fn catalog() -> ClassCatalog {
    ClassCatalog::from_classes([ping(), greet(), whois(), heal(), inspect()])
}

/// Register the beans the sample commands need.
pub fn register_beans(container: &Container) -> Result<(), ContainerError> {
    container.register_default::<GreetingSettings>()?;
    container.register_default::<HealthLedger>()?;
    container.register_singleton(|_| Ok(PingCommand))?;
    container.register_singleton(|_| Ok(WhoisCommand))?;
    container.register_singleton(|injector| {
        Ok(GreetCommand {
            settings: injector.get::<GreetingSettings>()?,
        })
    })?;
    container.register_singleton(|injector| {
        Ok(HealCommand {
            ledger: injector.get::<HealthLedger>()?,
        })
    })?;
    container.register_singleton(|injector| {
        Ok(InspectCommand {
            ledger: injector.get::<HealthLedger>()?,
        })
    })?;
    Ok(())
}

/// Start the sample plugin on a fresh in-memory host with the sample
/// players online.
pub fn boot(config: &Config) -> Result<(Arc<MemoryHost>, StartupReport)> {
    let host = Arc::new(MemoryHost::new("overworld"));
    for player in SAMPLE_PLAYERS {
        host.join(player);
    }

    let app = PluginApplication::builder(host.clone())
        .config(config.clone())
        .catalog(catalog())
        .build();
    register_beans(app.container())?;
    let report = app.start()?;
    Ok((host, report))
}
