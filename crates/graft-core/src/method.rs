//! Callables and bound methods
//!
//! A [`Callable`] is an unbound method as stored in a type's method table:
//! its handler receives the receiver explicitly. A [`Method`] is what a
//! property read produces: a callable already bound to its receiver (or an
//! arbitrary closure, which is how the composition engine builds composed
//! dispatch).

use crate::error::CallError;
use crate::object::ObjectRef;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// How a method came to exist. Consumed by the native-call guard: methods
/// installed from the protocol builtin set are never intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Authored by a user type
    User,
    /// Installed from the protocol builtin set
    Builtin,
}

/// Handler signature for unbound methods
pub type MethodFn = dyn Fn(&ObjectRef, &[Value]) -> Result<Value, CallError> + Send + Sync;

/// An unbound method as stored in a type's method table
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    kind: MethodKind,
    handler: Arc<MethodFn>,
}

impl Callable {
    /// Create a callable from a handler taking an explicit receiver
    pub fn new<F>(name: impl Into<Arc<str>>, kind: MethodKind, handler: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Callable {
            name: name.into(),
            kind,
            handler: Arc::new(handler),
        }
    }

    /// Get the method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the method kind
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    /// Bind a receiver, producing an invocable method
    pub fn bind(&self, receiver: ObjectRef) -> Method {
        let handler = Arc::clone(&self.handler);
        Method::new(self.name.clone(), self.kind, move |args| {
            (handler.as_ref())(&receiver, args)
        })
    }

    /// Invoke directly with an explicit receiver
    pub fn invoke(&self, receiver: &ObjectRef, args: &[Value]) -> Result<Value, CallError> {
        (self.handler.as_ref())(receiver, args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

struct MethodInner {
    name: Arc<str>,
    kind: MethodKind,
    call: Box<dyn Fn(&[Value]) -> Result<Value, CallError> + Send + Sync>,
}

/// A bound method, the value a method-property read produces
#[derive(Clone)]
pub struct Method(Arc<MethodInner>);

impl Method {
    /// Create a bound method from a closure over its receiver(s)
    pub fn new<F>(name: impl Into<Arc<str>>, kind: MethodKind, call: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Method(Arc::new(MethodInner {
            name: name.into(),
            kind,
            call: Box::new(call),
        }))
    }

    /// Get the method name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Get the method kind
    pub fn kind(&self) -> MethodKind {
        self.0.kind
    }

    /// Invoke with positional arguments
    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        (self.0.call)(args)
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .finish()
    }
}
