//! Plugin bootstrap.
//!
//! [`PluginApplication`] is the composition root: it owns the resolver
//! registry, the bean container and the class source, and wires scanned
//! commands into a host command table on [`start`](PluginApplication::start).
//!
//! ```ignore
//! let app = PluginApplication::builder(host.clone())
//!     .config(ConfigLoader::load()?)
//!     .catalog(catalog)
//!     .build();
//! app.register_resolver::<Location>(LocationResolver)?;
//! app.container().register_default::<WarpCommand>()?;
//! let report = app.start()?;
//! ```

use std::any::Any;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, instrument};

use crate::adapters::catalog::ClassCatalog;
use crate::adapters::command::{AdapterOptions, TaskBridge};
use crate::domain::errors::{FrameworkResult, ResolverError};
use crate::domain::models::command::CommandCategory;
use crate::domain::models::config::Config;
use crate::domain::ports::{ClassSource, HostCommandTable};
use crate::infrastructure::config::YamlConfigStore;
use crate::services::command_registrar::{CommandRegistrar, RegisteredCommand, RegistrationReport};
use crate::services::command_scanner::CommandScanner;
use crate::services::container::Container;
use crate::services::resolver_registry::{ArgumentResolver, ResolverRegistry};

/// What a successful start registered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StartupReport {
    /// Package the scan was restricted to.
    pub base_package: String,
    /// Registered commands in submission order.
    pub commands: Vec<RegisteredCommand>,
}

impl StartupReport {
    fn new(base_package: &str, registration: RegistrationReport) -> Self {
        Self {
            base_package: base_package.to_string(),
            commands: registration.commands,
        }
    }

    /// Number of registered commands.
    pub fn total(&self) -> usize {
        self.commands.len()
    }

    /// Names of the registered commands of `category`.
    pub fn by_category(&self, category: CommandCategory) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|c| c.category == category)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Builder for [`PluginApplication`].
pub struct PluginApplicationBuilder {
    host: Arc<dyn HostCommandTable>,
    config: Config,
    resolvers: Option<Arc<ResolverRegistry>>,
    container: Option<Arc<Container>>,
    classes: Option<Arc<dyn ClassSource>>,
    bridge: Option<TaskBridge>,
}

impl PluginApplicationBuilder {
    /// Framework configuration; defaults to `Config::default()`.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Share an existing resolver registry.
    pub fn resolvers(mut self, resolvers: Arc<ResolverRegistry>) -> Self {
        self.resolvers = Some(resolvers);
        self
    }

    /// Share an existing bean container.
    pub fn container(mut self, container: Arc<Container>) -> Self {
        self.container = Some(container);
        self
    }

    /// Discover command classes from `source`.
    pub fn class_source(mut self, source: Arc<dyn ClassSource>) -> Self {
        self.classes = Some(source);
        self
    }

    /// Discover command classes from a catalog.
    pub fn catalog(self, catalog: ClassCatalog) -> Self {
        self.class_source(Arc::new(catalog))
    }

    /// Bridge used to drive handler futures; defaults to the current tokio
    /// runtime when it is multi-threaded, else the shared handler runtime.
    pub fn bridge(mut self, bridge: TaskBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Finish wiring; unset collaborators get their defaults.
    pub fn build(self) -> PluginApplication {
        PluginApplication {
            host: self.host,
            config: self.config,
            resolvers: self
                .resolvers
                .unwrap_or_else(|| Arc::new(ResolverRegistry::with_builtins())),
            container: self.container.unwrap_or_default(),
            classes: self
                .classes
                .unwrap_or_else(|| Arc::new(ClassCatalog::new())),
            bridge: self.bridge,
        }
    }
}

/// Composition root of a plugin.
pub struct PluginApplication {
    host: Arc<dyn HostCommandTable>,
    config: Config,
    resolvers: Arc<ResolverRegistry>,
    container: Arc<Container>,
    classes: Arc<dyn ClassSource>,
    bridge: Option<TaskBridge>,
}

impl std::fmt::Debug for PluginApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginApplication")
            .field("config", &self.config)
            .field("resolvers", &self.resolvers)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl PluginApplication {
    /// Start building an application that registers into `host`.
    pub fn builder(host: Arc<dyn HostCommandTable>) -> PluginApplicationBuilder {
        PluginApplicationBuilder {
            host,
            config: Config::default(),
            resolvers: None,
            container: None,
            classes: None,
            bridge: None,
        }
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolver registry shared with the scanner and adapters.
    pub fn resolvers(&self) -> &Arc<ResolverRegistry> {
        &self.resolvers
    }

    /// Bean container command instances are drawn from.
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Add a resolver for a custom argument type. Must happen before
    /// [`start`](Self::start).
    pub fn register_resolver<T: ?Sized + 'static>(
        &self,
        resolver: impl ArgumentResolver + 'static,
    ) -> Result<(), ResolverError> {
        self.resolvers.register::<T>(resolver)
    }

    /// Load a typed YAML file from `store` and make it injectable.
    pub fn with_yaml_config<T>(&self, store: &YamlConfigStore, file: &str) -> FrameworkResult<Arc<T>>
    where
        T: Serialize + DeserializeOwned + Default + Any + Send + Sync,
    {
        let value: T = store.load_or_create(file)?;
        self.container.register_instance(value)?;
        Ok(self.container.get::<T>()?)
    }

    /// Scan, validate and register every command under the configured base
    /// package.
    #[instrument(skip(self), fields(base_package = %self.config.commands.base_package))]
    pub fn start(&self) -> FrameworkResult<StartupReport> {
        let base_package = &self.config.commands.base_package;
        let scanner = CommandScanner::new(Arc::clone(&self.resolvers));
        let definitions = scanner.scan(self.classes.as_ref(), base_package)?;

        let mut options = AdapterOptions::from_config(&self.config.commands);
        if let Some(bridge) = &self.bridge {
            options = options.with_bridge(bridge.clone());
        }
        let registrar = CommandRegistrar::new(Arc::clone(&self.resolvers), options);
        let registration =
            registrar.register_all(definitions, self.container.as_ref(), self.host.as_ref())?;

        let report = StartupReport::new(base_package, registration);
        info!(commands = report.total(), "plugin started");
        Ok(report)
    }
}
