//! Parameter values handed to a command handler.

use std::any::Any;
use std::sync::Arc;

use crate::domain::errors::InvocationError;
use crate::domain::models::command::ContextValue;
use crate::domain::models::value::ArgValue;
use crate::domain::ports::host::{CommandContext, EntityRef, EntityStore, PlayerRef, World};

/// The value bound to one handler parameter.
#[derive(Debug, Clone)]
pub enum HandlerValue {
    /// User-supplied argument; `None` when an optional argument was omitted.
    Argument(Option<ArgValue>),
    /// Host-supplied context value.
    Context(ContextValue),
}

impl HandlerValue {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Argument(_) => "argument",
            Self::Context(_) => "context",
        }
    }
}

/// Handler parameters in declaration order.
#[derive(Debug, Clone, Default)]
pub struct HandlerArgs {
    values: Vec<HandlerValue>,
}

impl HandlerArgs {
    /// Wrap assembled values.
    pub fn new(values: Vec<HandlerValue>) -> Self {
        Self { values }
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the handler takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values.
    pub fn values(&self) -> &[HandlerValue] {
        &self.values
    }

    fn value(&self, position: usize) -> Result<&HandlerValue, InvocationError> {
        self.values
            .get(position)
            .ok_or(InvocationError::NoSuchParameter(position))
    }

    /// Argument at `position`, `None` if it was omitted.
    pub fn get_opt<T: Any>(&self, position: usize) -> Result<Option<&T>, InvocationError> {
        match self.value(position)? {
            HandlerValue::Argument(None) => Ok(None),
            HandlerValue::Argument(Some(value)) => {
                value
                    .downcast_ref::<T>()
                    .map(Some)
                    .ok_or_else(|| InvocationError::TypeMismatch {
                        position,
                        expected: std::any::type_name::<T>().to_string(),
                        actual: value.type_key().name().to_string(),
                    })
            }
            other => Err(InvocationError::KindMismatch {
                position,
                expected: "argument",
                actual: other.kind_name(),
            }),
        }
    }

    /// Argument at `position`, which must have a value.
    pub fn get<T: Any>(&self, position: usize) -> Result<&T, InvocationError> {
        self.get_opt::<T>(position)?
            .ok_or(InvocationError::MissingValue(position))
    }

    /// Context value at `position`.
    pub fn context(&self, position: usize) -> Result<&ContextValue, InvocationError> {
        match self.value(position)? {
            HandlerValue::Context(value) => Ok(value),
            other => Err(InvocationError::KindMismatch {
                position,
                expected: "context",
                actual: other.kind_name(),
            }),
        }
    }

    fn context_mismatch(position: usize, expected: &str, value: &ContextValue) -> InvocationError {
        InvocationError::TypeMismatch {
            position,
            expected: expected.to_string(),
            actual: value.kind().to_string(),
        }
    }

    /// Command context at `position`.
    pub fn command_context(&self, position: usize) -> Result<&Arc<dyn CommandContext>, InvocationError> {
        match self.context(position)? {
            ContextValue::CommandContext(c) => Ok(c),
            other => Err(Self::context_mismatch(position, "command_context", other)),
        }
    }

    /// World at `position`.
    pub fn world(&self, position: usize) -> Result<&Arc<dyn World>, InvocationError> {
        match self.context(position)? {
            ContextValue::World(w) => Ok(w),
            other => Err(Self::context_mismatch(position, "world", other)),
        }
    }

    /// Entity store at `position`.
    pub fn entity_store(&self, position: usize) -> Result<&Arc<dyn EntityStore>, InvocationError> {
        match self.context(position)? {
            ContextValue::EntityStore(s) => Ok(s),
            other => Err(Self::context_mismatch(position, "entity_store", other)),
        }
    }

    /// Player identity at `position`.
    pub fn player(&self, position: usize) -> Result<&PlayerRef, InvocationError> {
        match self.context(position)? {
            ContextValue::PlayerIdentity(p) => Ok(p),
            other => Err(Self::context_mismatch(position, "player_identity", other)),
        }
    }

    /// Player entity handle at `position`.
    pub fn player_entity(&self, position: usize) -> Result<EntityRef, InvocationError> {
        match self.context(position)? {
            ContextValue::PlayerEntity(e) => Ok(*e),
            other => Err(Self::context_mismatch(position, "player_entity", other)),
        }
    }

    /// Targeted entities at `position`.
    pub fn targeted_entities(&self, position: usize) -> Result<&[EntityRef], InvocationError> {
        match self.context(position)? {
            ContextValue::TargetedEntities(es) => Ok(es),
            other => Err(Self::context_mismatch(position, "targeted_entities", other)),
        }
    }
}
