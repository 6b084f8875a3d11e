//! Object model: types, instances, and the reflection surface
//!
//! The composition engine never touches concrete structs directly; it works
//! against two traits:
//!
//! - [`ObjectProtocol`]: per-object dispatch hooks (property read/write,
//!   membership test, own-key enumeration, descriptor lookup, constructing
//!   type, identity).
//! - [`TypeProtocol`]: per-type hooks (declared dependency tokens,
//!   construction, static property and descriptor lookup).
//!
//! [`TypeDef`] / [`Instance`] are the plain implementations; the composition
//! engine layers its merged views over the same traits.

use crate::builtins;
use crate::error::CallError;
use crate::method::Callable;
use crate::token::Token;
use crate::value::Value;
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Well-known property name exposing the constructing type on every object
pub const CONSTRUCTOR_KEY: &str = "constructor";

/// Well-known static property name exposing a type's dependency tokens
pub const DEPENDENCIES_KEY: &str = "dependencies";

/// Global counter for generating unique object IDs
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique object ID
fn generate_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Insertion-ordered property map
type PropMap = IndexMap<Arc<str>, Value, FxBuildHasher>;

/// Insertion-ordered method table
pub(crate) type MethodTable = IndexMap<Arc<str>, Callable, FxBuildHasher>;

/// Property descriptor (data properties only; accessors are out of scope)
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Property value
    pub value: Value,
    /// Whether the value may be replaced
    pub writable: bool,
    /// Whether the property shows up in key enumeration
    pub enumerable: bool,
    /// Whether the descriptor itself may be redefined
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// Ordinary data property: writable, enumerable, configurable
    pub fn data(value: Value) -> Self {
        PropertyDescriptor {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Read-only but enumerable and configurable property
    pub fn read_only(value: Value) -> Self {
        PropertyDescriptor {
            value,
            writable: false,
            enumerable: true,
            configurable: true,
        }
    }
}

/// Per-object dispatch hooks: the explicit stand-in for the interception
/// layer a dynamic runtime provides implicitly.
pub trait ObjectProtocol: Send + Sync {
    /// Read a property. `None` means absent on every lookup path.
    fn get(&self, name: &str) -> Option<Value>;

    /// Write an own property
    fn set(&self, name: &str, value: Value);

    /// Membership test: own or inherited
    fn has(&self, name: &str) -> bool;

    /// Own keys in insertion order
    fn own_keys(&self) -> Vec<Arc<str>>;

    /// Own property descriptor
    fn own_descriptor(&self, name: &str) -> Option<PropertyDescriptor>;

    /// The type that constructed this object
    fn type_of(&self) -> TypeRef;

    /// Identity used for equality and membership of the object itself
    fn object_id(&self) -> u64;
}

/// Shared handle to an object (plain or composed)
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn ObjectProtocol>);

impl ObjectRef {
    /// Wrap an [`ObjectProtocol`] implementation
    pub fn new<O: ObjectProtocol + 'static>(object: O) -> Self {
        ObjectRef(Arc::new(object))
    }

    /// Read a property
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.get(name)
    }

    /// Read a property, mapping absence to [`Value::Null`]
    pub fn get_or_null(&self, name: &str) -> Value {
        self.0.get(name).unwrap_or(Value::Null)
    }

    /// Write an own property
    pub fn set(&self, name: &str, value: Value) {
        self.0.set(name, value)
    }

    /// Membership test: own or inherited
    pub fn has(&self, name: &str) -> bool {
        self.0.has(name)
    }

    /// Own keys in insertion order
    pub fn own_keys(&self) -> Vec<Arc<str>> {
        self.0.own_keys()
    }

    /// Own property descriptor
    pub fn own_descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        self.0.own_descriptor(name)
    }

    /// The type that constructed this object
    pub fn type_of(&self) -> TypeRef {
        self.0.type_of()
    }

    /// Identity of this object
    pub fn object_id(&self) -> u64 {
        self.0.object_id()
    }

    /// Read property `name` and invoke it with `args`
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        match self.0.get(name) {
            Some(Value::Method(method)) => method.call(args),
            Some(_) => Err(CallError::NotCallable {
                name: name.to_string(),
            }),
            None => Err(CallError::NoSuchMethod {
                name: name.to_string(),
            }),
        }
    }
}

impl<O: ObjectProtocol + 'static> From<Arc<O>> for ObjectRef {
    fn from(object: Arc<O>) -> Self {
        ObjectRef(object)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.object_id() == other.object_id()
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_of().name(), self.object_id())
    }
}

/// Per-type hooks: dependency declaration, construction, statics.
///
/// `construct` takes an `Arc` receiver so an implementation can hand itself
/// to the instances it creates as their constructing type.
pub trait TypeProtocol: Send + Sync {
    /// Type name (for diagnostics and the default string conversion)
    fn name(&self) -> &str;

    /// Declared dependency tokens, in positional-argument order
    fn dependencies(&self) -> &[Token];

    /// Construct an instance from resolved dependency values
    fn construct(self: Arc<Self>, args: &[Value]) -> Result<ObjectRef, CallError>;

    /// Read a static property
    fn static_property(&self, name: &str) -> Option<Value>;

    /// Descriptor for a static property
    fn static_descriptor(&self, name: &str) -> Option<PropertyDescriptor>;
}

/// Shared handle to a constructible type (plain or composed)
#[derive(Clone)]
pub struct TypeRef(Arc<dyn TypeProtocol>);

impl TypeRef {
    /// Wrap a [`TypeProtocol`] implementation
    pub fn new<T: TypeProtocol + 'static>(ty: T) -> Self {
        TypeRef(Arc::new(ty))
    }

    /// Type name
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Declared dependency tokens
    pub fn dependencies(&self) -> &[Token] {
        self.0.dependencies()
    }

    /// Construct an instance from resolved dependency values
    pub fn construct(&self, args: &[Value]) -> Result<ObjectRef, CallError> {
        Arc::clone(&self.0).construct(args)
    }

    /// Read a static property
    pub fn static_property(&self, name: &str) -> Option<Value> {
        self.0.static_property(name)
    }

    /// Descriptor for a static property
    pub fn static_descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        self.0.static_descriptor(name)
    }
}

impl<T: TypeProtocol + 'static> From<Arc<T>> for TypeRef {
    fn from(ty: Arc<T>) -> Self {
        TypeRef(ty)
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type {}", self.name())
    }
}

/// Constructor body: receives the fresh instance and the resolved
/// dependency values, positionally aligned to the declared token list.
pub type ConstructorFn = Arc<dyn Fn(&ObjectRef, &[Value]) -> Result<(), CallError> + Send + Sync>;

/// A plain constructible type: declared dependencies, a constructor body, a
/// method table, and static properties.
pub struct TypeDef {
    name: Arc<str>,
    dependencies: Vec<Token>,
    constructor: Option<ConstructorFn>,
    methods: MethodTable,
    statics: IndexMap<Arc<str>, Value, FxBuildHasher>,
}

impl TypeDef {
    /// Start building a type definition
    pub fn builder(name: impl Into<Arc<str>>) -> TypeDefBuilder {
        TypeDefBuilder {
            name: name.into(),
            dependencies: Vec::new(),
            constructor: None,
            methods: MethodTable::default(),
            statics: IndexMap::default(),
        }
    }

    /// Look up a method in the method table
    pub fn find_method(&self, name: &str) -> Option<&Callable> {
        self.methods.get(name)
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("methods", &self.methods.len())
            .finish()
    }
}

impl TypeProtocol for TypeDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[Token] {
        &self.dependencies
    }

    fn construct(self: Arc<Self>, args: &[Value]) -> Result<ObjectRef, CallError> {
        let object = Instance::create(Arc::clone(&self));
        if let Some(constructor) = &self.constructor {
            (constructor.as_ref())(&object, args)
                .map_err(|e| CallError::construction(&self.name, e))?;
        }
        Ok(object)
    }

    fn static_property(&self, name: &str) -> Option<Value> {
        if name == DEPENDENCIES_KEY {
            // The declared token list wins over a same-named static.
            return Some(Value::list(
                self.dependencies.iter().cloned().map(Value::from).collect(),
            ));
        }
        self.statics.get(name).cloned()
    }

    fn static_descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        if name == DEPENDENCIES_KEY {
            return self.static_property(name).map(PropertyDescriptor::read_only);
        }
        self.statics.get(name).cloned().map(PropertyDescriptor::data)
    }
}

/// Builder for [`TypeDef`]
pub struct TypeDefBuilder {
    name: Arc<str>,
    dependencies: Vec<Token>,
    constructor: Option<ConstructorFn>,
    methods: MethodTable,
    statics: IndexMap<Arc<str>, Value, FxBuildHasher>,
}

impl TypeDefBuilder {
    /// Declare the dependency tokens injected into the constructor.
    ///
    /// Tokens must not repeat within one declared list.
    pub fn dependencies(mut self, tokens: impl IntoIterator<Item = Token>) -> Self {
        let tokens: Vec<Token> = tokens.into_iter().collect();
        debug_assert!(
            tokens
                .iter()
                .enumerate()
                .all(|(i, t)| !tokens[..i].contains(t)),
            "dependency tokens must not repeat within one declared list"
        );
        self.dependencies = tokens;
        self
    }

    /// Set the constructor body
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> Result<(), CallError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    /// Add a user method
    pub fn method<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        let callable = Callable::new(name, crate::method::MethodKind::User, handler);
        self.methods.insert(Arc::from(name), callable);
        self
    }

    /// Add a static property
    pub fn static_property(mut self, name: &str, value: Value) -> Self {
        self.statics.insert(Arc::from(name), value);
        self
    }

    /// Finish the definition, installing protocol builtins for every
    /// protocol name the type did not define itself.
    pub fn build(mut self) -> Arc<TypeDef> {
        builtins::install(&mut self.methods, &self.name);
        Arc::new(TypeDef {
            name: self.name,
            dependencies: self.dependencies,
            constructor: self.constructor,
            methods: self.methods,
            statics: self.statics,
        })
    }
}

/// A plain object: unique identity, its constructing type, and an
/// insertion-ordered property map.
pub struct Instance {
    id: u64,
    ty: Arc<TypeDef>,
    properties: RwLock<PropMap>,
    self_ref: Weak<Instance>,
}

impl Instance {
    /// Create an empty instance of `ty`
    pub(crate) fn create(ty: Arc<TypeDef>) -> ObjectRef {
        let instance = Arc::new_cyclic(|weak: &Weak<Instance>| Instance {
            id: generate_object_id(),
            ty,
            properties: RwLock::new(PropMap::default()),
            self_ref: weak.clone(),
        });
        ObjectRef::from(instance)
    }

    fn self_handle(&self) -> ObjectRef {
        // The weak reference always upgrades while a property access is in
        // flight: the caller holds a strong reference.
        ObjectRef::from(
            self.self_ref
                .upgrade()
                .expect("instance accessed after drop"),
        )
    }
}

impl ObjectProtocol for Instance {
    fn get(&self, name: &str) -> Option<Value> {
        if name == CONSTRUCTOR_KEY {
            return Some(Value::Type(TypeRef::from(Arc::clone(&self.ty))));
        }
        if let Some(value) = self.properties.read().get(name) {
            return Some(value.clone());
        }
        self.ty
            .find_method(name)
            .map(|callable| Value::Method(callable.bind(self.self_handle())))
    }

    fn set(&self, name: &str, value: Value) {
        self.properties.write().insert(Arc::from(name), value);
    }

    fn has(&self, name: &str) -> bool {
        name == CONSTRUCTOR_KEY
            || self.properties.read().contains_key(name)
            || self.ty.find_method(name).is_some()
    }

    fn own_keys(&self) -> Vec<Arc<str>> {
        self.properties.read().keys().cloned().collect()
    }

    fn own_descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        self.properties
            .read()
            .get(name)
            .cloned()
            .map(PropertyDescriptor::data)
    }

    fn type_of(&self) -> TypeRef {
        TypeRef::from(Arc::clone(&self.ty))
    }

    fn object_id(&self) -> u64 {
        self.id
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("type", &self.ty.name)
            .finish()
    }
}
