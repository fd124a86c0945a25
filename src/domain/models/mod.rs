pub mod command;
pub mod config;
pub mod declaration;
pub mod invocation;
pub mod value;

pub use command::{
    ArgumentSpec, CommandCategory, CommandDefinition, ContextKind, ContextValue, ParameterKind,
    ParameterSpec,
};
pub use config::{CommandsConfig, Config};
pub use declaration::{
    ArgumentAttr, BeanRef, ClassKind, CommandClass, CommandMeta, HandlerFn, HandlerFuture,
    MethodDecl, ParamDecl, ParamMarker, HANDLER_METHOD,
};
pub use invocation::{HandlerArgs, HandlerValue};
pub use value::{ArgValue, TypeKey};
