//! Application layer: plugin bootstrap.

pub mod plugin;

pub use plugin::{PluginApplication, PluginApplicationBuilder, StartupReport};
