//! Host API port.
//!
//! These types describe the third-party plugin host as far as the command
//! subsystem needs it: the values the host hands to command callbacks, the
//! host-native command object that arguments are bound to, the four callback
//! shapes the host invokes, and the write-only command table.
//!
//! The callback shapes are dictated by the host. The target-player and
//! target-entity shapes were recovered from compiled host code rather than
//! documentation; their parameter order and nullability must be verified
//! against the host binary an embedding targets.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::domain::errors::HostError;
use crate::domain::models::value::ArgValue;

/// Opaque handle to an entity inside a world's entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef(pub u64);

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Identity of a connected player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerRef {
    /// Stable account id.
    pub uuid: Uuid,
    /// Display name.
    pub username: String,
}

impl PlayerRef {
    /// Create a player identity.
    pub fn new(uuid: Uuid, username: impl Into<String>) -> Self {
        Self {
            uuid,
            username: username.into(),
        }
    }
}

/// A game world. All mutation of world state happens on the world's thread.
pub trait World: Send + Sync {
    /// World name.
    fn name(&self) -> &str;
}

/// Entity storage of a world.
pub trait EntityStore: Send + Sync {
    /// Name of the world owning this store.
    fn world_name(&self) -> &str;

    /// Whether `entity` is alive in this store.
    fn contains(&self, entity: EntityRef) -> bool;

    /// Number of live entities.
    fn entity_count(&self) -> usize;
}

/// Per-invocation context handed to every command callback.
pub trait CommandContext: Send + Sync {
    /// Name of the invoking party (player name or console).
    fn sender_name(&self) -> &str;

    /// Whether the invoking party is a player.
    fn is_player(&self) -> bool;

    /// Deliver a chat/console message to the invoking party.
    fn send_message(&self, message: &str);

    /// Raw input line as typed by the sender.
    fn input(&self) -> &str;

    /// Value the host parsed for an argument slot, `None` when an optional
    /// argument without default was omitted.
    fn argument(&self, handle: ArgumentHandle) -> Option<ArgValue>;
}

/// Host-native argument type: a name and a parser from raw input.
#[derive(Clone, Copy)]
pub struct ArgType {
    name: &'static str,
    parser: fn(&str) -> Result<ArgValue, String>,
}

impl ArgType {
    /// Define an argument type.
    pub const fn new(name: &'static str, parser: fn(&str) -> Result<ArgValue, String>) -> Self {
        Self { name, parser }
    }

    /// Type name as shown in usage text.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Parse raw input into a value of this type.
    pub fn parse(&self, raw: &str) -> Result<ArgValue, String> {
        (self.parser)(raw)
    }
}

impl fmt::Debug for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArgType({})", self.name)
    }
}

/// Argument types the host ships with.
pub mod arg_types {
    use super::{ArgType, ArgValue};

    /// Free text.
    pub const STRING: ArgType = ArgType::new("string", parse_string);
    /// 32-bit signed integer.
    pub const INTEGER: ArgType = ArgType::new("integer", parse_integer);
    /// Double-precision float.
    pub const DOUBLE: ArgType = ArgType::new("double", parse_double);
    /// Single-precision float.
    pub const FLOAT: ArgType = ArgType::new("float", parse_float);
    /// `true` / `false`, case-insensitive.
    pub const BOOLEAN: ArgType = ArgType::new("boolean", parse_boolean);

    fn parse_string(raw: &str) -> Result<ArgValue, String> {
        Ok(ArgValue::new(raw.to_string()))
    }

    fn parse_integer(raw: &str) -> Result<ArgValue, String> {
        raw.trim()
            .parse::<i32>()
            .map(ArgValue::new)
            .map_err(|_| format!("'{raw}' is not a valid integer"))
    }

    fn parse_double(raw: &str) -> Result<ArgValue, String> {
        raw.trim()
            .parse::<f64>()
            .map(ArgValue::new)
            .map_err(|_| format!("'{raw}' is not a valid double"))
    }

    fn parse_float(raw: &str) -> Result<ArgValue, String> {
        raw.trim()
            .parse::<f32>()
            .map(ArgValue::new)
            .map_err(|_| format!("'{raw}' is not a valid float"))
    }

    fn parse_boolean(raw: &str) -> Result<ArgValue, String> {
        match raw.trim().to_lowercase().as_str() {
            "true" => Ok(ArgValue::new(true)),
            "false" => Ok(ArgValue::new(false)),
            _ => Err(format!("'{raw}' is not a valid boolean")),
        }
    }
}

/// Handle returned when an argument is bound to a [`CommandShell`]; used to
/// pull the parsed value back out of a [`CommandContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgumentHandle(pub usize);

/// How the host treats an argument slot when the sender omits it.
#[derive(Debug, Clone)]
pub enum ArgumentMode {
    /// Must be supplied.
    Required,
    /// May be omitted; extraction yields `None`.
    Optional,
    /// May be omitted; extraction yields `value`.
    Defaulted {
        /// Parsed default.
        value: ArgValue,
        /// Default as written, for usage text.
        description: String,
    },
}

/// One argument slot of a host command.
#[derive(Debug, Clone)]
pub struct ArgumentSlot {
    /// Handle of this slot.
    pub handle: ArgumentHandle,
    /// Name shown to users.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Host argument type.
    pub arg_type: ArgType,
    /// Omission behaviour.
    pub mode: ArgumentMode,
}

/// Host-native command object under construction.
#[derive(Debug, Clone)]
pub struct CommandShell {
    name: String,
    description: String,
    arguments: Vec<ArgumentSlot>,
    permission: Option<String>,
    aliases: Vec<String>,
}

impl CommandShell {
    /// Start a command with no arguments, public, without aliases.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            arguments: Vec::new(),
            permission: None,
            aliases: Vec::new(),
        }
    }

    fn push(&mut self, name: &str, description: &str, arg_type: ArgType, mode: ArgumentMode) -> ArgumentHandle {
        let handle = ArgumentHandle(self.arguments.len());
        self.arguments.push(ArgumentSlot {
            handle,
            name: name.to_string(),
            description: description.to_string(),
            arg_type,
            mode,
        });
        handle
    }

    /// Bind a required argument.
    pub fn with_required_arg(&mut self, name: &str, description: &str, arg_type: ArgType) -> ArgumentHandle {
        self.push(name, description, arg_type, ArgumentMode::Required)
    }

    /// Bind an optional argument.
    pub fn with_optional_arg(&mut self, name: &str, description: &str, arg_type: ArgType) -> ArgumentHandle {
        self.push(name, description, arg_type, ArgumentMode::Optional)
    }

    /// Bind an optional argument that falls back to `default`.
    pub fn with_default_arg(
        &mut self,
        name: &str,
        description: &str,
        arg_type: ArgType,
        default: ArgValue,
        default_description: &str,
    ) -> ArgumentHandle {
        self.push(
            name,
            description,
            arg_type,
            ArgumentMode::Defaulted {
                value: default,
                description: default_description.to_string(),
            },
        )
    }

    /// Restrict the command to senders holding `permission`.
    pub fn require_permission(&mut self, permission: &str) {
        self.permission = Some(permission.to_string());
    }

    /// Add alternative names.
    pub fn add_aliases(&mut self, aliases: &[String]) {
        self.aliases.extend(aliases.iter().cloned());
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Argument slots in binding order.
    pub fn arguments(&self) -> &[ArgumentSlot] {
        &self.arguments
    }

    /// Required permission, if any.
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Alternative names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// One-line usage text, e.g. `give <name:string> [--amount=20]`.
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        for slot in &self.arguments {
            usage.push(' ');
            match &slot.mode {
                ArgumentMode::Required => {
                    usage.push_str(&format!("<{}:{}>", slot.name, slot.arg_type.name()));
                }
                ArgumentMode::Optional => {
                    usage.push_str(&format!("[--{}:{}]", slot.name, slot.arg_type.name()));
                }
                ArgumentMode::Defaulted { description, .. } => {
                    usage.push_str(&format!("[--{}={}]", slot.name, description));
                }
            }
        }
        usage
    }
}

/// Completion future returned by background commands.
pub type CommandFuture = BoxFuture<'static, ()>;

/// Command run off the world thread. Only the command context is available.
pub trait BackgroundCommand: Send + Sync {
    /// Host-native command object.
    fn shell(&self) -> &CommandShell;

    /// Invoked by the host on one of its background threads.
    fn execute_async(&self, context: Arc<dyn CommandContext>) -> CommandFuture;
}

/// Command run on the world thread on behalf of the invoking player.
pub trait PlayerCommand: Send + Sync {
    /// Host-native command object.
    fn shell(&self) -> &CommandShell;

    /// Invoked by the host on the world thread.
    fn execute(
        &self,
        context: &Arc<dyn CommandContext>,
        store: &Arc<dyn EntityStore>,
        entity: EntityRef,
        player: &PlayerRef,
        world: &Arc<dyn World>,
    );
}

/// Command run on the world thread against a target player.
///
/// `source` is `None` when the invoker is not a player.
pub trait TargetPlayerCommand: Send + Sync {
    /// Host-native command object.
    fn shell(&self) -> &CommandShell;

    /// Invoked by the host on the target's world thread.
    fn execute(
        &self,
        context: &Arc<dyn CommandContext>,
        source: Option<EntityRef>,
        target: EntityRef,
        target_player: &PlayerRef,
        world: &Arc<dyn World>,
        store: &Arc<dyn EntityStore>,
    );
}

/// Command run on the world thread against entities found by the host's
/// line-of-sight targeting.
pub trait TargetEntityCommand: Send + Sync {
    /// Host-native command object.
    fn shell(&self) -> &CommandShell;

    /// Invoked by the host on the world thread.
    fn execute(
        &self,
        context: &Arc<dyn CommandContext>,
        targets: &[EntityRef],
        world: &Arc<dyn World>,
        store: &Arc<dyn EntityStore>,
    );
}

/// A fully constructed command ready for the host's command table.
#[derive(Clone)]
pub enum HostCommand {
    /// Off-world-thread command.
    Background(Arc<dyn BackgroundCommand>),
    /// Invoker-player command.
    Player(Arc<dyn PlayerCommand>),
    /// Target-player command.
    TargetPlayer(Arc<dyn TargetPlayerCommand>),
    /// Target-entity command.
    TargetEntity(Arc<dyn TargetEntityCommand>),
}

impl HostCommand {
    /// Host-native command object of whichever variant this is.
    pub fn shell(&self) -> &CommandShell {
        match self {
            Self::Background(c) => c.shell(),
            Self::Player(c) => c.shell(),
            Self::TargetPlayer(c) => c.shell(),
            Self::TargetEntity(c) => c.shell(),
        }
    }

    /// Command name.
    pub fn name(&self) -> &str {
        self.shell().name()
    }
}

impl fmt::Debug for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Background(_) => "Background",
            Self::Player(_) => "Player",
            Self::TargetPlayer(_) => "TargetPlayer",
            Self::TargetEntity(_) => "TargetEntity",
        };
        f.debug_tuple(variant).field(&self.name()).finish()
    }
}

/// The host's command table. Registration only; nothing is read back.
pub trait HostCommandTable: Send + Sync {
    /// Add a command to the host.
    fn register(&self, command: HostCommand) -> Result<(), HostError>;
}
