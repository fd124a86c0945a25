//! Declarative command classes.
//!
//! A [`CommandClass`] is the static stand-in for an annotated class: it names
//! a Rust type, the module it lives in, an optional command marker and the
//! methods it exposes. The scanner turns these into validated
//! [`CommandDefinition`](super::command::CommandDefinition)s.
//!
//! ```ignore
//! CommandClass::of::<GiveCommand>()
//!     .command(CommandMeta::new("give").category(CommandCategory::Player))
//!     .method(
//!         MethodDecl::new("execute", |cmd: Arc<GiveCommand>, args: HandlerArgs| async move {
//!             cmd.give(args.get::<String>(0)?, *args.get::<i32>(1)?)
//!         })
//!         .param(ParamDecl::argument::<String>("name"))
//!         .param(ParamDecl::argument::<i32>("amount").default_value("20")),
//!     )
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::domain::models::command::CommandCategory;
use crate::domain::models::invocation::HandlerArgs;
use crate::domain::models::value::TypeKey;

/// Name of the method the scanner treats as a command's handler.
pub const HANDLER_METHOD: &str = "execute";

/// A bean produced by the dependency injection collaborator.
pub type BeanRef = Arc<dyn Any + Send + Sync>;

/// Future returned by a handler invocation.
pub type HandlerFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Type-erased handler entrypoint.
pub type HandlerFn = Arc<dyn Fn(BeanRef, HandlerArgs) -> HandlerFuture + Send + Sync>;

/// What kind of type a class declaration stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Instantiable.
    Concrete,
    /// Shared base that is never instantiated itself.
    Abstract,
    /// Interface-like declaration.
    Trait,
}

/// The command marker: metadata attached to a command class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMeta {
    /// Unique command name.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Required permission; empty means public.
    pub permission: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Command shape.
    pub category: CommandCategory,
}

impl CommandMeta {
    /// Background command named `name`, public, without aliases.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            permission: String::new(),
            aliases: Vec::new(),
            category: CommandCategory::Background,
        }
    }

    /// Set the help text.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Require a permission.
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = permission.into();
        self
    }

    /// Add an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the category.
    pub fn category(mut self, category: CommandCategory) -> Self {
        self.category = category;
        self
    }
}

/// The argument marker: user-facing metadata of an argument parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentAttr {
    /// Name shown to users; empty means the parameter name.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Whether the sender must supply the value.
    pub required: bool,
    /// Default as written; empty means none.
    pub default_value: String,
}

impl Default for ArgumentAttr {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            required: true,
            default_value: String::new(),
        }
    }
}

/// A parameter-kind marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamMarker {
    /// Filled from end-user input.
    Argument(ArgumentAttr),
    /// Filled by the framework from the invocation environment.
    Context,
}

/// A formal parameter of a declared method.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    name: String,
    declared_type: TypeKey,
    markers: Vec<ParamMarker>,
}

impl ParamDecl {
    /// Parameter of type `T` without any marker.
    pub fn new<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: TypeKey::of::<T>(),
            markers: Vec::new(),
        }
    }

    /// Required argument parameter of type `T`.
    pub fn argument<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new::<T>(name).marker(ParamMarker::Argument(ArgumentAttr::default()))
    }

    /// Context parameter of type `T`.
    pub fn context<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new::<T>(name).marker(ParamMarker::Context)
    }

    /// Attach a marker.
    pub fn marker(mut self, marker: ParamMarker) -> Self {
        self.markers.push(marker);
        self
    }

    fn with_argument(mut self, f: impl FnOnce(&mut ArgumentAttr)) -> Self {
        if let Some(ParamMarker::Argument(attr)) = self
            .markers
            .iter_mut()
            .find(|m| matches!(m, ParamMarker::Argument(_)))
        {
            f(attr);
        }
        self
    }

    /// Set the user-facing argument name. Ignored without an argument marker.
    pub fn display_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with_argument(|attr| attr.name = name)
    }

    /// Set the argument help text. Ignored without an argument marker.
    pub fn description(self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.with_argument(|attr| attr.description = description)
    }

    /// Mark the argument as not required. Ignored without an argument marker.
    pub fn optional(self) -> Self {
        self.with_argument(|attr| attr.required = false)
    }

    /// Set the argument default. Ignored without an argument marker.
    pub fn default_value(self, default: impl Into<String>) -> Self {
        let default = default.into();
        self.with_argument(|attr| attr.default_value = default)
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn declared_type(&self) -> TypeKey {
        self.declared_type
    }

    /// Attached markers.
    pub fn markers(&self) -> &[ParamMarker] {
        &self.markers
    }
}

/// A method declared on a command class.
#[derive(Clone)]
pub struct MethodDecl {
    name: String,
    receiver: TypeKey,
    params: Vec<ParamDecl>,
    handler: HandlerFn,
}

impl MethodDecl {
    /// Method backed by an asynchronous closure over the receiver `C`.
    pub fn new<C, F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        C: Any + Send + Sync,
        F: Fn(Arc<C>, HandlerArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: HandlerFn = Arc::new(move |bean: BeanRef, args: HandlerArgs| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let receiver = downcast_receiver::<C>(bean)?;
                handler(receiver, args).await
            }) as HandlerFuture
        });
        Self::erased(name, TypeKey::of::<C>(), erased)
    }

    /// Method backed by a synchronous closure over the receiver `C`.
    pub fn new_sync<C, F>(name: impl Into<String>, handler: F) -> Self
    where
        C: Any + Send + Sync,
        F: Fn(&C, HandlerArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        let erased: HandlerFn = Arc::new(move |bean: BeanRef, args: HandlerArgs| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let receiver = downcast_receiver::<C>(bean)?;
                handler(&receiver, args)
            }) as HandlerFuture
        });
        Self::erased(name, TypeKey::of::<C>(), erased)
    }

    /// Method with an already type-erased handler.
    pub fn erased(name: impl Into<String>, receiver: TypeKey, handler: HandlerFn) -> Self {
        Self {
            name: name.into(),
            receiver,
            params: Vec::new(),
            handler,
        }
    }

    /// Append a formal parameter.
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receiver type.
    pub fn receiver(&self) -> TypeKey {
        self.receiver
    }

    /// Formal parameters, receiver excluded, in declaration order.
    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    /// Type-erased handler.
    pub fn handler(&self) -> &HandlerFn {
        &self.handler
    }
}

impl fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDecl")
            .field("name", &self.name)
            .field("receiver", &self.receiver)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn downcast_receiver<C: Any + Send + Sync>(bean: BeanRef) -> anyhow::Result<Arc<C>> {
    bean.downcast::<C>()
        .map_err(|_| anyhow::anyhow!("bean is not a {}", std::any::type_name::<C>()))
}

/// Static declaration of a class that may carry the command marker.
#[derive(Debug, Clone)]
pub struct CommandClass {
    type_key: TypeKey,
    module_path: String,
    kind: ClassKind,
    command: Option<CommandMeta>,
    methods: Vec<MethodDecl>,
}

impl CommandClass {
    /// Concrete class for `C`, in the module its type name points at.
    pub fn of<C: Any + Send + Sync>() -> Self {
        let type_key = TypeKey::of::<C>();
        Self {
            type_key,
            module_path: module_of(type_key.name()).to_string(),
            kind: ClassKind::Concrete,
            command: None,
            methods: Vec::new(),
        }
    }

    /// Override the module path used for package scanning.
    pub fn in_module(mut self, module_path: impl Into<String>) -> Self {
        self.module_path = module_path.into();
        self
    }

    /// Set the class kind.
    pub fn kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Attach the command marker.
    pub fn command(mut self, meta: CommandMeta) -> Self {
        self.command = Some(meta);
        self
    }

    /// Declare a method.
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// Fully qualified class name.
    pub fn name(&self) -> &'static str {
        self.type_key.name()
    }

    /// Key of the class type.
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Module path used for package scanning.
    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// Class kind.
    pub fn class_kind(&self) -> ClassKind {
        self.kind
    }

    /// Whether the class can be instantiated.
    pub fn is_concrete(&self) -> bool {
        self.kind == ClassKind::Concrete
    }

    /// Command marker, if present.
    pub fn command_meta(&self) -> Option<&CommandMeta> {
        self.command.as_ref()
    }

    /// Declared methods.
    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    /// Whether the class lives in `package` or below it.
    pub fn is_in_package(&self, package: &str) -> bool {
        package.is_empty()
            || self.module_path == package
            || self
                .module_path
                .strip_prefix(package)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

/// Module part of a fully qualified type name, ignoring generic arguments.
fn module_of(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rfind("::").map_or("", |idx| &base[..idx])
}
