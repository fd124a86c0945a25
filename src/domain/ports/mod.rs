//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the command framework depends on:
//! - Host API: command context, world, entity store, command shell, the four
//!   callback shapes and the command table
//! - BeanFactory: dependency injection collaborator
//! - ClassSource: class discovery
//!
//! These traits keep the scanner, adapters and registrar independent of any
//! particular host binding.

pub mod bean_factory;
pub mod class_source;
pub mod host;

pub use bean_factory::BeanFactory;
pub use class_source::ClassSource;
pub use host::{
    arg_types, ArgType, ArgumentHandle, ArgumentMode, ArgumentSlot, BackgroundCommand,
    CommandContext, CommandFuture, CommandShell, EntityRef, EntityStore, HostCommand,
    HostCommandTable, PlayerCommand, PlayerRef, TargetEntityCommand, TargetPlayerCommand, World,
};
