//! Component type catalog.
//!
//! # Responsibilities
//! - Describe component types: name, controller marker, constructor, methods
//! - Arrange type names in a dot-separated namespace tree for scanning
//! - Resolve fully-qualified names back to their type description
//!
//! # Design Decisions
//! - Populated explicitly at startup; no runtime type-name lookup
//! - Handlers are type-erased closures that downcast the receiver
//! - Registering a name twice replaces the earlier description

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::scanner::{NamespaceEntry, NamespaceSource};
use crate::dispatch::{Arguments, HandlerError};

/// A live component object.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Constructor for a component type.
pub type Factory = Arc<dyn Fn() -> Result<Instance, ConstructError> + Send + Sync>;

/// Type-erased handler method: receiver plus bound arguments.
pub type HandlerFn =
    Arc<dyn Fn(&(dyn Any + Send + Sync), &mut Arguments<'_>) -> Result<(), HandlerError> + Send + Sync>;

/// Error raised while constructing a component.
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    #[error("type declares no constructor")]
    NoConstructor,
    #[error("constructor failed: {0}")]
    Failed(String),
}

impl ConstructError {
    pub fn failed(reason: impl fmt::Display) -> Self {
        ConstructError::Failed(reason.to_string())
    }
}

/// Declared type of a formal parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// The transport's request abstraction.
    Request,
    /// The transport's response abstraction.
    Response,
    /// Any other value; bound only through a named-value marker.
    Text,
}

/// Declaration of one formal parameter of a handler method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    ty: ParamType,
    named: Option<String>,
}

impl ParamDecl {
    pub fn request() -> Self {
        Self { ty: ParamType::Request, named: None }
    }

    pub fn response() -> Self {
        Self { ty: ParamType::Response, named: None }
    }

    /// A text parameter with no named-value marker.
    pub fn text() -> Self {
        Self { ty: ParamType::Text, named: None }
    }

    /// A text parameter bound to request parameter `key`.
    pub fn named(key: impl Into<String>) -> Self {
        Self::text().with_name(key)
    }

    /// Attach a named-value marker.
    pub fn with_name(mut self, key: impl Into<String>) -> Self {
        self.named = Some(key.into());
        self
    }

    pub fn ty(&self) -> ParamType {
        self.ty
    }

    /// Key declared by the named-value marker, if any.
    pub fn name(&self) -> Option<&str> {
        self.named.as_deref()
    }
}

/// A method declared on a component type.
#[derive(Clone)]
pub struct MethodDecl {
    name: String,
    route: Option<String>,
    params: Vec<ParamDecl>,
    handler: HandlerFn,
}

impl MethodDecl {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sub-path from the route marker; `None` for unrouted methods.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    pub fn handler(&self) -> &HandlerFn {
        &self.handler
    }
}

impl fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDecl")
            .field("name", &self.name)
            .field("route", &self.route)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Description of a component type.
pub struct ComponentType {
    name: String,
    base_path: Option<String>,
    factory: Option<Factory>,
    methods: Vec<MethodDecl>,
}

impl ComponentType {
    /// Start describing the Rust type `T` under the fully-qualified `name`.
    pub fn builder<T: Send + Sync + 'static>(name: impl Into<String>) -> ComponentBuilder<T> {
        ComponentBuilder {
            name: name.into(),
            base_path: None,
            factory: None,
            methods: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Fully-qualified name (e.g. `app.controller.BaseController`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace.
    pub fn simple_name(&self) -> &str {
        split_name(&self.name).1
    }

    /// Base path from the controller marker.
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    pub fn is_controller(&self) -> bool {
        self.base_path.is_some()
    }

    pub fn has_constructor(&self) -> bool {
        self.factory.is_some()
    }

    /// Declared methods in declaration order.
    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    /// Run the constructor.
    pub fn instantiate(&self) -> Result<Instance, ConstructError> {
        match &self.factory {
            Some(factory) => factory(),
            None => Err(ConstructError::NoConstructor),
        }
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("base_path", &self.base_path)
            .field("has_constructor", &self.factory.is_some())
            .field("methods", &self.methods)
            .finish()
    }
}

/// Typed builder for [`ComponentType`].
pub struct ComponentBuilder<T> {
    name: String,
    base_path: Option<String>,
    factory: Option<Factory>,
    methods: Vec<MethodDecl>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ComponentBuilder<T> {
    /// Mark the type as a controller mounted at `base_path`.
    pub fn controller(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> Result<T, ConstructError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(move || {
            constructor().map(|component| Arc::new(component) as Instance)
        }));
        self
    }

    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(|| Ok(T::default()))
    }

    /// Declare a method carrying a route marker with sub-path `path`.
    pub fn route<F>(
        self,
        method: impl Into<String>,
        path: impl Into<String>,
        params: impl IntoIterator<Item = ParamDecl>,
        handler: F,
    ) -> Self
    where
        F: Fn(&T, &mut Arguments<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.declare(method.into(), Some(path.into()), params, handler)
    }

    /// Declare a method without a route marker.
    pub fn method<F>(
        self,
        method: impl Into<String>,
        params: impl IntoIterator<Item = ParamDecl>,
        handler: F,
    ) -> Self
    where
        F: Fn(&T, &mut Arguments<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.declare(method.into(), None, params, handler)
    }

    fn declare<F>(
        mut self,
        name: String,
        route: Option<String>,
        params: impl IntoIterator<Item = ParamDecl>,
        handler: F,
    ) -> Self
    where
        F: Fn(&T, &mut Arguments<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let handler: HandlerFn = Arc::new(
            move |receiver: &(dyn Any + Send + Sync), args: &mut Arguments<'_>| {
                let this = receiver
                    .downcast_ref::<T>()
                    .ok_or(HandlerError::Receiver {
                        expected: std::any::type_name::<T>(),
                    })?;
                handler(this, args)
            },
        );
        self.methods.push(MethodDecl {
            name,
            route,
            params: params.into_iter().collect(),
            handler,
        });
        self
    }

    pub fn build(self) -> ComponentType {
        ComponentType {
            name: self.name,
            base_path: self.base_path,
            factory: self.factory,
            methods: self.methods,
        }
    }
}

#[derive(Debug, Default)]
struct NamespaceNode {
    children: BTreeSet<String>,
    types: BTreeSet<String>,
}

/// All component types known to the process.
#[derive(Debug, Default)]
pub struct Catalog {
    types: HashMap<String, Arc<ComponentType>>,
    namespaces: BTreeMap<String, NamespaceNode>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component type, replacing any earlier type with the same name.
    pub fn register(&mut self, component: ComponentType) -> &mut Self {
        let name = component.name().to_string();
        let (namespace, _) = split_name(&name);
        let namespace = namespace.to_string();

        self.ensure_namespace(&namespace);
        if let Some(node) = self.namespaces.get_mut(&namespace) {
            node.types.insert(name.clone());
        }
        self.types.insert(name, Arc::new(component));
        self
    }

    /// Builder-style [`Catalog::register`].
    pub fn with(mut self, component: ComponentType) -> Self {
        self.register(component);
        self
    }

    /// Make a namespace resolvable even if it holds no types.
    pub fn declare_namespace(&mut self, namespace: &str) -> &mut Self {
        self.ensure_namespace(namespace);
        self
    }

    /// Look up a type by fully-qualified name.
    pub fn resolve(&self, name: &str) -> Option<Arc<ComponentType>> {
        self.types.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn ensure_namespace(&mut self, namespace: &str) {
        if self.namespaces.contains_key(namespace) {
            return;
        }
        self.namespaces
            .insert(namespace.to_string(), NamespaceNode::default());

        if !namespace.is_empty() {
            let (parent, _) = split_name(namespace);
            let parent = parent.to_string();
            self.ensure_namespace(&parent);
            if let Some(node) = self.namespaces.get_mut(&parent) {
                node.children.insert(namespace.to_string());
            }
        }
    }
}

impl NamespaceSource for Catalog {
    fn list(&self, namespace: &str) -> Option<Vec<NamespaceEntry>> {
        let node = self.namespaces.get(namespace)?;
        let children = node
            .children
            .iter()
            .cloned()
            .map(NamespaceEntry::Namespace);
        let types = node.types.iter().cloned().map(NamespaceEntry::Type);
        Some(children.chain(types).collect())
    }
}

/// Split `a.b.C` into (`a.b`, `C`); names without a dot live in the root.
pub(crate) fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => (&name[..idx], &name[idx + 1..]),
        None => ("", name),
    }
}
