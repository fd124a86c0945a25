//! In-memory host
//!
//! A self-contained implementation of the host port used by the CLI and the
//! integration tests. It keeps a command table, one world, a roster of
//! online players and a tiny command-line dispatcher:
//!
//! - required arguments are positional, in binding order
//! - optional and defaulted arguments are flags: `--name value` or
//!   `--name=value`
//! - `--player <name>` selects the target of target-player commands
//! - double quotes group words into one token
//!
//! World-thread commands run one at a time under a world lock; background
//! commands run on a scoped thread of their own.

mod context;
mod world;

pub use context::{MemoryCommandContext, Sender};
pub use world::MemoryWorld;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::errors::HostError;
use crate::domain::models::value::ArgValue;
use crate::domain::ports::host::{
    ArgumentMode, CommandContext, CommandShell, EntityRef, EntityStore, HostCommand,
    HostCommandTable, PlayerRef, World,
};

/// Flag naming the target player of target-player commands.
pub const TARGET_PLAYER_FLAG: &str = "player";

/// Reasons the host refuses a command line before any handler runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Blank input.
    #[error("Empty command line")]
    Empty,

    /// No command or alias with that name.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// Sender or target player is offline.
    #[error("Player '{0}' is not online")]
    UnknownPlayer(String),

    #[error("You do not have permission {permission} required by '{command}'")]
    /// Sender lacks the command's permission.
    PermissionDenied {
        /// Command that was refused.
        command: String,
        /// Permission the sender is missing.
        permission: String,
    },

    #[error("'{command}' can only be run by a player")]
    /// Console invoked a world-thread command.
    PlayerOnly {
        /// Command that was refused.
        command: String,
    },

    #[error("{reason}. Usage: {usage}")]
    /// Arguments did not match the command's usage.
    Usage {
        /// What was wrong with the arguments.
        reason: String,
        /// Usage line of the command.
        usage: String,
    },

    /// Input ends inside a quoted token.
    #[error("Unterminated quote in command line")]
    UnterminatedQuote,

    /// The background thread running the command panicked.
    #[error("Command '{0}' crashed its worker thread")]
    Crashed(String),
}

/// Summary of a registered command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandInfo {
    /// Primary command name.
    pub name: String,
    /// Callback shape the command was registered with.
    pub kind: &'static str,
    /// One-line description.
    pub description: String,
    /// Usage line built from the argument specs.
    pub usage: String,
    /// Permission required to run it, if any.
    pub permission: Option<String>,
    /// Alternative names.
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone)]
struct OnlinePlayer {
    identity: PlayerRef,
    entity: EntityRef,
    permissions: HashSet<String>,
    looking_at: Vec<EntityRef>,
}

/// In-memory host: command table, world, players and dispatcher.
pub struct MemoryHost {
    commands: RwLock<BTreeMap<String, HostCommand>>,
    aliases: RwLock<HashMap<String, String>>,
    players: RwLock<HashMap<String, OnlinePlayer>>,
    world: Arc<MemoryWorld>,
    world_thread: Mutex<()>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new("world")
    }
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("world", &self.world.name())
            .field("commands", &self.command_names())
            .finish_non_exhaustive()
    }
}

impl MemoryHost {
    /// Host with one empty world named `world_name`.
    pub fn new(world_name: impl Into<String>) -> Self {
        Self {
            commands: RwLock::new(BTreeMap::new()),
            aliases: RwLock::new(HashMap::new()),
            players: RwLock::new(HashMap::new()),
            world: Arc::new(MemoryWorld::new(world_name)),
            world_thread: Mutex::new(()),
        }
    }

    /// The host's only world.
    pub fn world(&self) -> &Arc<MemoryWorld> {
        &self.world
    }

    /// Bring a player online with a fresh entity.
    pub fn join(&self, username: &str) -> PlayerRef {
        let identity = PlayerRef::new(Uuid::new_v4(), username);
        let entity = self.world.spawn_entity();
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                username.to_string(),
                OnlinePlayer {
                    identity: identity.clone(),
                    entity,
                    permissions: HashSet::new(),
                    looking_at: Vec::new(),
                },
            );
        debug!(player = username, %entity, "player joined");
        identity
    }

    /// Entity of an online player.
    pub fn player_entity(&self, username: &str) -> Option<EntityRef> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .map(|p| p.entity)
    }

    /// Grant a permission to an online player.
    pub fn grant(&self, username: &str, permission: &str) -> Result<(), DispatchError> {
        self.with_player(username, |p| {
            p.permissions.insert(permission.to_string());
        })
    }

    /// Set the entities the player's line of sight resolves to.
    pub fn set_looking_at(&self, username: &str, entities: Vec<EntityRef>) -> Result<(), DispatchError> {
        self.with_player(username, |p| p.looking_at = entities)
    }

    fn with_player(&self, username: &str, f: impl FnOnce(&mut OnlinePlayer)) -> Result<(), DispatchError> {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        let player = players
            .get_mut(username)
            .ok_or_else(|| DispatchError::UnknownPlayer(username.to_string()))?;
        f(player);
        Ok(())
    }

    fn online(&self, username: &str) -> Result<OnlinePlayer, DispatchError> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownPlayer(username.to_string()))
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<String> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Registered commands, sorted by name.
    pub fn commands(&self) -> Vec<CommandInfo> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|command| {
                let shell = command.shell();
                CommandInfo {
                    name: shell.name().to_string(),
                    kind: kind_of(command),
                    description: shell.description().to_string(),
                    usage: shell.usage(),
                    permission: shell.permission().map(str::to_string),
                    aliases: shell.aliases().to_vec(),
                }
            })
            .collect()
    }

    /// Look up a command by name or alias.
    pub fn command(&self, name: &str) -> Option<HostCommand> {
        let commands = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(command) = commands.get(name) {
            return Some(command.clone());
        }
        let aliases = self.aliases.read().unwrap_or_else(PoisonError::into_inner);
        aliases.get(name).and_then(|target| commands.get(target)).cloned()
    }

    /// Parse and run one command line for `sender`.
    ///
    /// Returns the messages the command sent back to the sender. Handler
    /// failures are not errors here: the adapters answer them with a
    /// message.
    pub fn dispatch(&self, sender: &Sender, line: &str) -> Result<Vec<String>, DispatchError> {
        let tokens = tokenize(line.trim().trim_start_matches('/'))?;
        let (label, rest) = tokens.split_first().ok_or(DispatchError::Empty)?;
        let command = self
            .command(label)
            .ok_or_else(|| DispatchError::UnknownCommand(label.clone()))?;
        let shell = command.shell();

        let invoker = match sender {
            Sender::Console => None,
            Sender::Player(name) => Some(self.online(name)?),
        };
        if let (Some(permission), Some(player)) = (shell.permission(), &invoker) {
            if !player.permissions.contains(permission) {
                return Err(DispatchError::PermissionDenied {
                    command: shell.name().to_string(),
                    permission: permission.to_string(),
                });
            }
        }

        let accepts_target = matches!(command, HostCommand::TargetPlayer(_));
        let parsed = parse_arguments(shell, rest, accepts_target)?;
        let context = Arc::new(MemoryCommandContext::new(sender.clone(), line, parsed.values));
        let dyn_context: Arc<dyn CommandContext> = context.clone();
        let world: Arc<dyn World> = self.world.clone();
        let store: Arc<dyn EntityStore> = self.world.clone();

        info!(command = shell.name(), sender = sender.name(), "dispatching command");

        match &command {
            HostCommand::Background(cmd) => {
                std::thread::scope(|scope| {
                    scope
                        .spawn(|| futures::executor::block_on(cmd.execute_async(dyn_context)))
                        .join()
                })
                .map_err(|_| DispatchError::Crashed(shell.name().to_string()))?;
            }
            HostCommand::Player(cmd) => {
                let player = invoker.ok_or_else(|| DispatchError::PlayerOnly {
                    command: shell.name().to_string(),
                })?;
                let _world_thread = self.world_thread.lock().unwrap_or_else(PoisonError::into_inner);
                cmd.execute(&dyn_context, &store, player.entity, &player.identity, &world);
            }
            HostCommand::TargetPlayer(cmd) => {
                let target = match (&parsed.target, &invoker) {
                    (Some(name), _) => self.online(name)?,
                    (None, Some(player)) => player.clone(),
                    (None, None) => {
                        return Err(DispatchError::Usage {
                            reason: "A target player is required".to_string(),
                            usage: format!("{} --{TARGET_PLAYER_FLAG} <name>", shell.usage()),
                        })
                    }
                };
                let source = invoker.as_ref().map(|p| p.entity);
                let _world_thread = self.world_thread.lock().unwrap_or_else(PoisonError::into_inner);
                cmd.execute(&dyn_context, source, target.entity, &target.identity, &world, &store);
            }
            HostCommand::TargetEntity(cmd) => {
                let player = invoker.ok_or_else(|| DispatchError::PlayerOnly {
                    command: shell.name().to_string(),
                })?;
                let _world_thread = self.world_thread.lock().unwrap_or_else(PoisonError::into_inner);
                cmd.execute(&dyn_context, &player.looking_at, &world, &store);
            }
        }

        Ok(context.messages())
    }
}

impl HostCommandTable for MemoryHost {
    fn register(&self, command: HostCommand) -> Result<(), HostError> {
        let name = command.name().to_string();
        let mut commands = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        let mut aliases = self.aliases.write().unwrap_or_else(PoisonError::into_inner);

        let taken = |label: &str| commands.contains_key(label) || aliases.contains_key(label);
        if taken(&name) {
            return Err(HostError::DuplicateCommand(name));
        }
        if let Some(alias) = command.shell().aliases().iter().find(|a| taken(a) || **a == name) {
            return Err(HostError::Rejected {
                name,
                reason: format!("alias '{alias}' is already in use"),
            });
        }

        for alias in command.shell().aliases() {
            aliases.insert(alias.clone(), name.clone());
        }
        debug!(command = %name, kind = kind_of(&command), "host registered command");
        commands.insert(name, command);
        Ok(())
    }
}

fn kind_of(command: &HostCommand) -> &'static str {
    match command {
        HostCommand::Background(_) => "background",
        HostCommand::Player(_) => "player",
        HostCommand::TargetPlayer(_) => "target_player",
        HostCommand::TargetEntity(_) => "target_entity",
    }
}

#[derive(Debug, Default)]
struct ParsedLine {
    values: Vec<Option<ArgValue>>,
    target: Option<String>,
}

fn parse_arguments(
    shell: &CommandShell,
    tokens: &[String],
    accepts_target: bool,
) -> Result<ParsedLine, DispatchError> {
    let usage_error = |reason: String| DispatchError::Usage {
        reason,
        usage: shell.usage(),
    };

    let mut positionals = Vec::new();
    let mut flags: HashMap<String, String> = HashMap::new();
    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        match token.strip_prefix("--") {
            Some(flag) => {
                let (name, value) = match flag.split_once('=') {
                    Some((name, value)) => (name.to_string(), value.to_string()),
                    None => {
                        let value = iter
                            .next()
                            .ok_or_else(|| usage_error(format!("Flag --{flag} needs a value")))?;
                        (flag.to_string(), value.clone())
                    }
                };
                flags.insert(name, value);
            }
            None => positionals.push(token.as_str()),
        }
    }

    let mut parsed = ParsedLine::default();
    if accepts_target {
        parsed.target = flags.remove(TARGET_PLAYER_FLAG);
    }

    let mut positionals = positionals.into_iter();
    for slot in shell.arguments() {
        let parse = |raw: &str| {
            slot.arg_type
                .parse(raw)
                .map_err(|e| usage_error(format!("Invalid {}: {e}", slot.name)))
        };
        let value = match &slot.mode {
            ArgumentMode::Required => {
                let raw = positionals
                    .next()
                    .ok_or_else(|| usage_error(format!("Missing argument <{}>", slot.name)))?;
                Some(parse(raw)?)
            }
            ArgumentMode::Optional => flags.remove(&slot.name).map(|raw| parse(&raw)).transpose()?,
            ArgumentMode::Defaulted { value, .. } => match flags.remove(&slot.name) {
                Some(raw) => Some(parse(&raw)?),
                None => Some(value.clone()),
            },
        };
        parsed.values.push(value);
    }

    if let Some(extra) = positionals.next() {
        return Err(usage_error(format!("Unexpected argument '{extra}'")));
    }
    if let Some(flag) = flags.keys().min() {
        return Err(usage_error(format!("Unknown flag --{flag}")));
    }
    Ok(parsed)
}

fn tokenize(line: &str) -> Result<Vec<String>, DispatchError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err(DispatchError::UnterminatedQuote);
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}
