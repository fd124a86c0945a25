//! Validated command metadata.
//!
//! A [`CommandDefinition`] is produced once per discovered command class by
//! the scanner and is immutable afterwards. It owns its ordered list of
//! [`ParameterSpec`]s, each tagged as exactly one of argument or context.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;
use crate::domain::models::declaration::{HandlerFn, ParamMarker};
use crate::domain::models::value::TypeKey;
use crate::domain::ports::host::{CommandContext, EntityRef, EntityStore, PlayerRef, World};

/// The four command shapes the host knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    /// Runs on a host background thread; no world access.
    Background,
    /// Runs on the world thread for the invoking player.
    Player,
    /// Runs on the world thread against a target player.
    TargetPlayer,
    /// Runs on the world thread against entities in the invoker's sight.
    TargetEntity,
}

impl CommandCategory {
    /// All categories.
    pub const ALL: [Self; 4] = [
        Self::Background,
        Self::Player,
        Self::TargetPlayer,
        Self::TargetEntity,
    ];

    /// Returns the string representation of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Player => "player",
            Self::TargetPlayer => "target_player",
            Self::TargetEntity => "target_entity",
        }
    }

    /// Context kinds a handler of this category may declare.
    pub fn allowed_context_kinds(&self) -> &'static [ContextKind] {
        match self {
            Self::Background => &[ContextKind::CommandContext],
            Self::Player | Self::TargetPlayer => &[
                ContextKind::CommandContext,
                ContextKind::World,
                ContextKind::EntityStore,
                ContextKind::PlayerIdentity,
                ContextKind::PlayerEntity,
            ],
            Self::TargetEntity => &[
                ContextKind::CommandContext,
                ContextKind::World,
                ContextKind::EntityStore,
                ContextKind::TargetedEntities,
            ],
        }
    }

    /// Whether `kind` may be declared by handlers of this category.
    pub fn allows(&self, kind: ContextKind) -> bool {
        self.allowed_context_kinds().contains(&kind)
    }

    /// Whether the host runs this category on the serialized world thread.
    pub fn runs_on_world_thread(&self) -> bool {
        !matches!(self, Self::Background)
    }

    /// Comma-separated type names of the allowed context kinds.
    pub fn allowed_type_names(&self) -> String {
        self.allowed_context_kinds()
            .iter()
            .map(|k| k.type_key().name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strongly typed identity of an injectable runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// `Arc<dyn CommandContext>`
    CommandContext,
    /// `Arc<dyn World>`
    World,
    /// `Arc<dyn EntityStore>`
    EntityStore,
    /// `PlayerRef`
    PlayerIdentity,
    /// `EntityRef` of the player the command acts for.
    PlayerEntity,
    /// `Vec<EntityRef>` found by the host's targeting.
    TargetedEntities,
}

impl ContextKind {
    /// All kinds.
    pub const ALL: [Self; 6] = [
        Self::CommandContext,
        Self::World,
        Self::EntityStore,
        Self::PlayerIdentity,
        Self::PlayerEntity,
        Self::TargetedEntities,
    ];

    /// The Rust type a handler parameter must declare for this kind.
    pub fn type_key(&self) -> TypeKey {
        match self {
            Self::CommandContext => TypeKey::of::<Arc<dyn CommandContext>>(),
            Self::World => TypeKey::of::<Arc<dyn World>>(),
            Self::EntityStore => TypeKey::of::<Arc<dyn EntityStore>>(),
            Self::PlayerIdentity => TypeKey::of::<PlayerRef>(),
            Self::PlayerEntity => TypeKey::of::<EntityRef>(),
            Self::TargetedEntities => TypeKey::of::<Vec<EntityRef>>(),
        }
    }

    /// Map a declared parameter type onto a context kind.
    pub fn from_type(key: TypeKey) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_key() == key)
    }

    /// Returns the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommandContext => "command_context",
            Self::World => "world",
            Self::EntityStore => "entity_store",
            Self::PlayerIdentity => "player_identity",
            Self::PlayerEntity => "player_entity",
            Self::TargetedEntities => "targeted_entities",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runtime value supplied by the host for a context parameter.
#[derive(Clone)]
pub enum ContextValue {
    /// The invocation context.
    CommandContext(Arc<dyn CommandContext>),
    /// The world the command runs in.
    World(Arc<dyn World>),
    /// The world's entity store.
    EntityStore(Arc<dyn EntityStore>),
    /// The player the command acts for.
    PlayerIdentity(PlayerRef),
    /// Entity handle of the player the command acts for.
    PlayerEntity(EntityRef),
    /// Entities found by the host's targeting.
    TargetedEntities(Vec<EntityRef>),
}

impl ContextValue {
    /// Kind tag of this value.
    pub fn kind(&self) -> ContextKind {
        match self {
            Self::CommandContext(_) => ContextKind::CommandContext,
            Self::World(_) => ContextKind::World,
            Self::EntityStore(_) => ContextKind::EntityStore,
            Self::PlayerIdentity(_) => ContextKind::PlayerIdentity,
            Self::PlayerEntity(_) => ContextKind::PlayerEntity,
            Self::TargetedEntities(_) => ContextKind::TargetedEntities,
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandContext(c) => write!(f, "CommandContext({})", c.sender_name()),
            Self::World(w) => write!(f, "World({})", w.name()),
            Self::EntityStore(s) => write!(f, "EntityStore({})", s.world_name()),
            Self::PlayerIdentity(p) => write!(f, "PlayerIdentity({})", p.username),
            Self::PlayerEntity(e) => write!(f, "PlayerEntity({e})"),
            Self::TargetedEntities(es) => write!(f, "TargetedEntities({})", es.len()),
        }
    }
}

/// User-facing argument metadata of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    /// Name shown to users.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Whether the sender must supply it.
    pub required: bool,
    /// Default as written, parsed by the resolver owning the type.
    pub default_value: Option<String>,
}

impl ArgumentSpec {
    /// Whether the argument may be omitted.
    pub fn is_optional(&self) -> bool {
        !self.required || self.default_value.is_some()
    }
}

/// What fills a parameter at invocation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// Supplied by the end user.
    Argument(ArgumentSpec),
    /// Supplied by the host, chosen by declared type and category.
    Context,
}

/// One formal parameter of a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    name: String,
    declared_type: TypeKey,
    position: usize,
    kind: ParameterKind,
}

impl ParameterSpec {
    /// Build a spec from a parameter's markers.
    ///
    /// Exactly one marker must be present.
    pub fn from_markers(
        command: &str,
        name: &str,
        declared_type: TypeKey,
        position: usize,
        markers: &[ParamMarker],
    ) -> Result<Self, ValidationError> {
        let marker = match markers {
            [] => {
                return Err(ValidationError::MissingParameterMarker {
                    command: command.to_string(),
                    parameter: name.to_string(),
                })
            }
            [marker] => marker,
            _ => {
                return Err(ValidationError::ConflictingParameterMarkers {
                    command: command.to_string(),
                    parameter: name.to_string(),
                    count: markers.len(),
                })
            }
        };

        let kind = match marker {
            ParamMarker::Argument(attr) => ParameterKind::Argument(ArgumentSpec {
                name: if attr.name.is_empty() {
                    name.to_string()
                } else {
                    attr.name.clone()
                },
                description: attr.description.clone(),
                required: attr.required,
                default_value: Some(attr.default_value.clone()).filter(|d| !d.is_empty()),
            }),
            ParamMarker::Context => ParameterKind::Context,
        };

        Ok(Self {
            name: name.to_string(),
            declared_type,
            position,
            kind,
        })
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared Rust type.
    pub fn declared_type(&self) -> TypeKey {
        self.declared_type
    }

    /// Zero-based position in the handler's parameter list.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Argument or context.
    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    /// Argument metadata, if this is an argument parameter.
    pub fn argument(&self) -> Option<&ArgumentSpec> {
        match &self.kind {
            ParameterKind::Argument(spec) => Some(spec),
            ParameterKind::Context => None,
        }
    }

    /// Whether this is a context parameter.
    pub fn is_context(&self) -> bool {
        matches!(self.kind, ParameterKind::Context)
    }

    /// Whether this is an argument the sender may omit.
    pub fn is_optional(&self) -> bool {
        self.argument().is_some_and(ArgumentSpec::is_optional)
    }
}

/// Validated, immutable description of one command.
#[derive(Clone)]
pub struct CommandDefinition {
    name: String,
    description: String,
    permission: String,
    aliases: Vec<String>,
    category: CommandCategory,
    class_name: &'static str,
    bean_type: TypeKey,
    handler: HandlerFn,
    parameters: Vec<ParameterSpec>,
}

impl CommandDefinition {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        description: String,
        permission: String,
        aliases: Vec<String>,
        category: CommandCategory,
        class_name: &'static str,
        bean_type: TypeKey,
        handler: HandlerFn,
        parameters: Vec<ParameterSpec>,
    ) -> Self {
        Self {
            name,
            description,
            permission,
            aliases,
            category,
            class_name,
            bean_type,
            handler,
            parameters,
        }
    }

    /// Unique command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Required permission; empty means public.
    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Alternative names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Command shape.
    pub fn category(&self) -> CommandCategory {
        self.category
    }

    /// Declaring class name.
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    /// Type the bean factory must produce for this command.
    pub fn bean_type(&self) -> TypeKey {
        self.bean_type
    }

    /// The handler entrypoint.
    pub fn handler(&self) -> &HandlerFn {
        &self.handler
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Argument parameters in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = (&ParameterSpec, &ArgumentSpec)> {
        self.parameters
            .iter()
            .filter_map(|p| p.argument().map(|a| (p, a)))
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("class_name", &self.class_name)
            .field("permission", &self.permission)
            .field("aliases", &self.aliases)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
