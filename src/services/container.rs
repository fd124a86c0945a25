//! Dependency injection container.
//!
//! Beans are registered per type with a factory and a [`Scope`]. Factories
//! receive an [`Injector`] through which they resolve their own
//! dependencies; the injector carries the resolution path so a cycle is
//! reported instead of recursing forever.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::errors::ContainerError;
use crate::domain::models::declaration::BeanRef;
use crate::domain::models::value::TypeKey;
use crate::domain::ports::BeanFactory;

/// Lifetime of beans produced by a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Created on first request, shared afterwards.
    Singleton,
    /// Created anew on every request.
    Prototype,
}

type Factory = Arc<dyn Fn(&Injector<'_>) -> anyhow::Result<BeanRef> + Send + Sync>;

#[derive(Clone)]
struct BeanDefinition {
    scope: Scope,
    factory: Factory,
}

/// Type-keyed bean container.
#[derive(Default)]
pub struct Container {
    definitions: RwLock<HashMap<TypeKey, BeanDefinition>>,
    singletons: RwLock<HashMap<TypeKey, BeanRef>>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&'static str> = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .map(TypeKey::name)
            .collect();
        types.sort_unstable();
        f.debug_struct("Container").field("types", &types).finish()
    }
}

impl Container {
    /// Empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready-made singleton.
    pub fn register_instance<T: Any + Send + Sync>(&self, instance: T) -> Result<(), ContainerError> {
        let bean: BeanRef = Arc::new(instance);
        let factory: Factory = Arc::new(|_: &Injector<'_>| -> anyhow::Result<BeanRef> {
            Err(anyhow::anyhow!("instance beans are never rebuilt"))
        });
        self.define(TypeKey::of::<T>(), Scope::Singleton, factory, Some(bean))
    }

    /// Register a singleton built lazily by `factory`.
    pub fn register_singleton<T, F>(&self, factory: F) -> Result<(), ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&Injector<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.register_with_scope(Scope::Singleton, factory)
    }

    /// Register a prototype built by `factory` on every request.
    pub fn register_prototype<T, F>(&self, factory: F) -> Result<(), ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&Injector<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.register_with_scope(Scope::Prototype, factory)
    }

    /// Register a singleton created with `T::default()`.
    pub fn register_default<T: Any + Send + Sync + Default>(&self) -> Result<(), ContainerError> {
        self.register_singleton(|_| Ok(T::default()))
    }

    /// Register `factory` under `scope`.
    pub fn register_with_scope<T, F>(&self, scope: Scope, factory: F) -> Result<(), ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&Injector<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |injector: &Injector<'_>| {
            factory(injector).map(|bean| Arc::new(bean) as BeanRef)
        });
        self.define(TypeKey::of::<T>(), scope, factory, None)
    }

    fn define(
        &self,
        key: TypeKey,
        scope: Scope,
        factory: Factory,
        instance: Option<BeanRef>,
    ) -> Result<(), ContainerError> {
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if definitions.contains_key(&key) {
            return Err(ContainerError::DuplicateBean {
                type_name: key.name().to_string(),
            });
        }
        debug!(type_name = key.name(), ?scope, "registered bean definition");
        if let Some(bean) = instance {
            self.singletons
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key, bean);
        }
        definitions.insert(key, BeanDefinition { scope, factory });
        Ok(())
    }

    /// Whether a definition exists for `T`.
    pub fn contains<T: Any>(&self) -> bool {
        self.contains_type(TypeKey::of::<T>())
    }

    /// Whether a definition exists for `key`.
    pub fn contains_type(&self, key: TypeKey) -> bool {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    /// Resolve a bean of type `T`.
    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ContainerError> {
        Injector::root(self).get::<T>()
    }

    fn resolve(&self, key: TypeKey, path: &[TypeKey]) -> Result<BeanRef, ContainerError> {
        if path.contains(&key) {
            let cycle = path
                .iter()
                .skip_while(|k| **k != key)
                .chain(std::iter::once(&key))
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ContainerError::CircularDependency { path: cycle });
        }

        if let Some(bean) = self
            .singletons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(bean));
        }

        let definition = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .ok_or_else(|| ContainerError::NoBeanDefinition {
                type_name: key.name().to_string(),
            })?;

        let mut child_path = path.to_vec();
        child_path.push(key);
        let injector = Injector {
            container: self,
            path: child_path,
        };

        trace!(type_name = key.name(), "creating bean");
        let bean = (definition.factory)(&injector).map_err(|source| creation_error(key, source))?;

        match definition.scope {
            Scope::Prototype => Ok(bean),
            // First completed construction wins if two threads race.
            Scope::Singleton => Ok(Arc::clone(
                self.singletons
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(key)
                    .or_insert(bean),
            )),
        }
    }
}

fn creation_error(key: TypeKey, source: anyhow::Error) -> ContainerError {
    match source.downcast::<ContainerError>() {
        Ok(cycle @ ContainerError::CircularDependency { .. }) => cycle,
        Ok(other) => ContainerError::CreationFailed {
            type_name: key.name().to_string(),
            source: other.into(),
        },
        Err(source) => ContainerError::CreationFailed {
            type_name: key.name().to_string(),
            source,
        },
    }
}

impl BeanFactory for Container {
    fn create_bean(&self, key: TypeKey) -> Result<BeanRef, ContainerError> {
        self.resolve(key, &[])
    }
}

/// Resolution handle passed to bean factories.
pub struct Injector<'a> {
    container: &'a Container,
    path: Vec<TypeKey>,
}

impl<'a> Injector<'a> {
    fn root(container: &'a Container) -> Self {
        Self {
            container,
            path: Vec::new(),
        }
    }

    /// Resolve a dependency of type `T`.
    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ContainerError> {
        let key = TypeKey::of::<T>();
        self.container
            .resolve(key, &self.path)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                expected: key.name().to_string(),
            })
    }
}
