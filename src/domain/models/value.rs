//! Type keys and type-erased argument values.
//!
//! Rust has no runtime reflection over parameter types, so every declared
//! type is carried as a [`TypeKey`]: the `TypeId` used for identity plus the
//! type name used in diagnostics.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a declared `'static` type.
///
/// Two keys are equal when their `TypeId`s are equal; the name is only
/// carried for messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this key identifies `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A parsed argument value handed out by the host.
///
/// Cloning is cheap; the payload is shared.
#[derive(Clone)]
pub struct ArgValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_key: TypeKey,
}

impl ArgValue {
    /// Wrap a concrete value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_key: TypeKey::of::<T>(),
        }
    }

    /// Borrow the payload as `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Whether the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Key of the payload's concrete type.
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.downcast_ref::<String>() {
            return write!(f, "ArgValue({s:?})");
        }
        if let Some(n) = self.downcast_ref::<i32>() {
            return write!(f, "ArgValue({n})");
        }
        if let Some(n) = self.downcast_ref::<f64>() {
            return write!(f, "ArgValue({n})");
        }
        if let Some(n) = self.downcast_ref::<f32>() {
            return write!(f, "ArgValue({n})");
        }
        if let Some(b) = self.downcast_ref::<bool>() {
            return write!(f, "ArgValue({b})");
        }
        write!(f, "ArgValue(<{}>)", self.type_key.name())
    }
}
