//! Argument resolver registry.
//!
//! Maps a declared parameter type to the strategy that binds host-native
//! argument slots for it. The registry is insert-once: registering a second
//! resolver for a type is rejected at the call site. It is shared across
//! threads behind an `RwLock`; lookups take the read lock only.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::domain::errors::ResolverError;
use crate::domain::models::value::{ArgValue, TypeKey};
use crate::domain::ports::host::{ArgType, ArgumentHandle, CommandShell};
use crate::services::builtin_resolvers;

/// Strategy for one argument type.
///
/// Implementations are stateless. The provided methods bind a slot of
/// [`arg_type`](Self::arg_type) on a command shell; only
/// [`parse_default`](Self::parse_default) needs type-specific logic.
pub trait ArgumentResolver: Send + Sync {
    /// Host argument type produced by this resolver.
    fn arg_type(&self) -> ArgType;

    /// Parse a declared default into the native type.
    fn parse_default(&self, raw: &str) -> Result<ArgValue, ResolverError>;

    /// Bind a required argument.
    fn required(&self, shell: &mut CommandShell, name: &str, description: &str) -> ArgumentHandle {
        shell.with_required_arg(name, description, self.arg_type())
    }

    /// Bind an optional argument without default.
    fn optional(&self, shell: &mut CommandShell, name: &str, description: &str) -> ArgumentHandle {
        shell.with_optional_arg(name, description, self.arg_type())
    }

    /// Bind an optional argument that falls back to `default`.
    fn with_default(
        &self,
        shell: &mut CommandShell,
        name: &str,
        description: &str,
        default: &str,
    ) -> Result<ArgumentHandle, ResolverError> {
        let value = self.parse_default(default)?;
        Ok(shell.with_default_arg(name, description, self.arg_type(), value, default))
    }
}

/// Registry of argument resolvers keyed by declared type.
pub struct ResolverRegistry {
    resolvers: RwLock<HashMap<TypeKey, Arc<dyn ArgumentResolver>>>,
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

impl Default for ResolverRegistry {
    /// Returns a registry holding the built-in resolvers.
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ResolverRegistry {
    /// Registry without any resolver.
    pub fn empty() -> Self {
        Self {
            resolvers: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with resolvers for `String`, `i32`, `f64`, `f32` and `bool`.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        {
            let mut resolvers = registry
                .resolvers
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for (key, resolver) in builtin_resolvers::all() {
                resolvers.insert(key, resolver);
            }
        }
        registry
    }

    /// Register a resolver for `T`.
    pub fn register<T: ?Sized + 'static>(
        &self,
        resolver: impl ArgumentResolver + 'static,
    ) -> Result<(), ResolverError> {
        self.register_type(TypeKey::of::<T>(), Arc::new(resolver))
    }

    /// Register a resolver for the type identified by `key`.
    pub fn register_type(
        &self,
        key: TypeKey,
        resolver: Arc<dyn ArgumentResolver>,
    ) -> Result<(), ResolverError> {
        let mut resolvers = self
            .resolvers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if resolvers.contains_key(&key) {
            return Err(ResolverError::AlreadyRegistered {
                type_name: key.name().to_string(),
            });
        }
        debug!(type_name = key.name(), "registered argument resolver");
        resolvers.insert(key, resolver);
        Ok(())
    }

    /// Resolver for `key`, if registered.
    pub fn get(&self, key: TypeKey) -> Option<Arc<dyn ArgumentResolver>> {
        self.resolvers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Whether a resolver exists for `key`.
    pub fn has_resolver(&self, key: TypeKey) -> bool {
        self.resolvers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    /// Names of all registered types, sorted.
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .resolvers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .map(TypeKey::name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Remove every resolver. Intended for test teardown.
    pub fn clear(&self) {
        self.resolvers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::host::arg_types;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
    struct Location(i32, i32);

    struct LocationResolver;

    impl ArgumentResolver for LocationResolver {
        fn arg_type(&self) -> ArgType {
            ArgType::new("location", |raw| {
                let (x, y) = raw
                    .split_once(',')
                    .ok_or_else(|| format!("'{raw}' is not a valid location"))?;
                let x = x.trim().parse().map_err(|_| format!("'{raw}' is not a valid location"))?;
                let y = y.trim().parse().map_err(|_| format!("'{raw}' is not a valid location"))?;
                Ok(ArgValue::new(Location(x, y)))
            })
        }

        fn parse_default(&self, raw: &str) -> Result<ArgValue, ResolverError> {
            self.arg_type()
                .parse(raw)
                .map_err(|_| ResolverError::InvalidDefault {
                    value: raw.to_string(),
                    expected: "location".to_string(),
                })
        }
    }

    struct OtherLocationResolver;

    impl ArgumentResolver for OtherLocationResolver {
        fn arg_type(&self) -> ArgType {
            arg_types::STRING
        }

        fn parse_default(&self, raw: &str) -> Result<ArgValue, ResolverError> {
            Ok(ArgValue::new(raw.to_string()))
        }
    }

    #[test]
    fn test_builtins_present() {
        let registry = ResolverRegistry::with_builtins();
        assert!(registry.has_resolver(TypeKey::of::<String>()));
        assert!(registry.has_resolver(TypeKey::of::<i32>()));
        assert!(registry.has_resolver(TypeKey::of::<f64>()));
        assert!(registry.has_resolver(TypeKey::of::<f32>()));
        assert!(registry.has_resolver(TypeKey::of::<bool>()));
        assert!(!registry.has_resolver(TypeKey::of::<Location>()));
        assert_eq!(registry.registered_types().len(), 5);
    }

    #[test]
    fn test_register_once_then_reject() {
        let registry = ResolverRegistry::empty();
        registry.register::<Location>(LocationResolver).unwrap();

        let err = registry
            .register::<Location>(OtherLocationResolver)
            .unwrap_err();
        assert!(matches!(err, ResolverError::AlreadyRegistered { .. }));
        assert!(err.to_string().contains("Location"));

        // First registration stays in place
        let resolver = registry.get(TypeKey::of::<Location>()).unwrap();
        assert_eq!(resolver.arg_type().name(), "location");
    }

    #[test]
    fn test_builtin_type_cannot_be_shadowed() {
        let registry = ResolverRegistry::with_builtins();
        assert!(registry.register::<String>(OtherLocationResolver).is_err());
    }

    #[test]
    fn test_custom_resolver_binds_default() {
        let registry = ResolverRegistry::empty();
        registry.register::<Location>(LocationResolver).unwrap();
        let resolver = registry.get(TypeKey::of::<Location>()).unwrap();

        let mut shell = CommandShell::new("warp", "");
        let handle = resolver
            .with_default(&mut shell, "to", "Destination", "3, 4")
            .unwrap();
        assert_eq!(handle, ArgumentHandle(0));

        let err = resolver
            .with_default(&mut shell, "from", "Origin", "nowhere")
            .unwrap_err();
        assert!(matches!(err, ResolverError::InvalidDefault { .. }));
        assert_eq!(shell.arguments().len(), 1);
    }

    #[test]
    fn test_concurrent_lookup_and_registration() {
        let registry = Arc::new(ResolverRegistry::with_builtins());

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        assert!(registry.has_resolver(TypeKey::of::<i32>()));
                    }
                })
            })
            .collect();

        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.register::<Location>(LocationResolver))
        };

        for reader in readers {
            reader.join().unwrap();
        }
        writer.join().unwrap().unwrap();
        assert!(registry.has_resolver(TypeKey::of::<Location>()));
    }

    #[test]
    fn test_clear() {
        let registry = ResolverRegistry::with_builtins();
        registry.clear();
        assert!(registry.registered_types().is_empty());
    }
}
