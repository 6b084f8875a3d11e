//! Graft core object model
//!
//! This crate provides the dynamic substrate the composition engine
//! (`graft-compose`) works on:
//! - [`Value`]: dynamic value representation
//! - [`Token`]: dependency tokens (names and unique symbols)
//! - [`TypeDef`] / [`Instance`]: constructible types and their instances
//! - [`ObjectProtocol`] / [`TypeProtocol`]: the reflection surface composed
//!   views implement
//! - [`Deferred`]: promise-like asynchronous results
//! - protocol builtins (string conversion, own-property tests, ...)

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod builtins;
pub mod deferred;
pub mod error;
pub mod method;
pub mod object;
pub mod token;
pub mod value;

pub use deferred::{Deferred, DeferredState};
pub use error::CallError;
pub use method::{Callable, Method, MethodFn, MethodKind};
pub use object::{
    ConstructorFn, Instance, ObjectProtocol, ObjectRef, PropertyDescriptor, TypeDef,
    TypeDefBuilder, TypeProtocol, TypeRef, CONSTRUCTOR_KEY, DEPENDENCIES_KEY,
};
pub use token::{SymbolId, Token};
pub use value::Value;
