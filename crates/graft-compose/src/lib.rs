//! Graft composition engine
//!
//! Augments a base type with independent enhancement types at construction
//! time, without inheritance. Calls to shared method names dispatch through
//! every enhancement before reaching the base implementation; constructor
//! dependencies declared by both sides are merged into one deduplicated
//! argument list and re-split for each constructor.
//!
//! ```ignore
//! use graft_compose::compose_type;
//! use graft_core::{Token, TypeDef, TypeRef, Value};
//!
//! let base = TypeDef::builder("Doc")
//!     .dependencies([Token::name("db")])
//!     .method("save", |recv, _| { /* ... */ Ok(Value::Null) })
//!     .build();
//! let audited = TypeDef::builder("Audited")
//!     .dependencies([Token::name("db"), Token::name("log")])
//!     .method("save", |recv, _| { /* runs first */ Ok(Value::Null) })
//!     .build();
//!
//! let composed = compose_type(TypeRef::from(base), [TypeRef::from(audited)]);
//! // composed.dependencies() == [db, log]
//! let doc = composed.construct(&[Value::str("DB"), Value::str("LOG")]).unwrap();
//! doc.call("save", &[]).unwrap(); // Audited::save, then Doc::save
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod compose;
pub mod deps;
pub mod guard;
pub mod instance;

pub use compose::{compose, ComposedType};
pub use deps::{merge, MergedDependencies};
pub use guard::is_platform_builtin;
pub use instance::ComposedInstance;

use graft_core::TypeRef;

/// Compose a base type with enhancements, left to right.
///
/// Each application wraps the previous composed type as the new base, so for
/// a shared method name the last enhancement dispatches first and the
/// original base last.
pub fn compose_type(base: TypeRef, enhancements: impl IntoIterator<Item = TypeRef>) -> TypeRef {
    enhancements
        .into_iter()
        .fold(base, |acc, enhancement| TypeRef::from(compose(acc, enhancement)))
}

/// Decorator form of [`compose_type`]: capture the enhancements once and
/// return a transform to apply at the base type's declaration site.
pub fn enhance(enhancements: impl IntoIterator<Item = TypeRef>) -> impl Fn(TypeRef) -> TypeRef {
    let enhancements: Vec<TypeRef> = enhancements.into_iter().collect();
    move |base| compose_type(base, enhancements.iter().cloned())
}
