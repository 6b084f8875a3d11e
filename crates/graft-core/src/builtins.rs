//! Protocol builtin methods
//!
//! The closed enumeration of object-protocol methods every type carries:
//! string conversion, value conversion, own-property test, enumerability
//! test. The composition engine's native-call guard refuses to intercept
//! these (see `MethodKind::Builtin`). A type that defines its own method
//! under one of these names keeps it: the user method is installed with
//! `MethodKind::User` and participates in composition like any other.

use crate::method::{Callable, MethodKind};
use crate::object::MethodTable;
use crate::value::Value;
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Names of the protocol methods installed on every type
pub const PROTOCOL_METHODS: &[&str] = &[
    "toString",
    "valueOf",
    "hasOwnProperty",
    "propertyIsEnumerable",
];

static PROTOCOL_SET: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| PROTOCOL_METHODS.iter().copied().collect());

/// Check whether `name` belongs to the closed protocol enumeration
pub fn is_protocol_method(name: &str) -> bool {
    PROTOCOL_SET.contains(name)
}

/// Extract a property-name argument; non-string arguments test no property.
fn key_argument(args: &[Value]) -> Option<Arc<str>> {
    match args.first() {
        Some(Value::Str(name)) => Some(Arc::clone(name)),
        _ => None,
    }
}

/// Install the protocol methods on a method table, skipping names the type
/// already defines itself.
pub(crate) fn install(methods: &mut MethodTable, type_name: &Arc<str>) {
    if !methods.contains_key("toString") {
        let type_name = Arc::clone(type_name);
        methods.insert(
            Arc::from("toString"),
            Callable::new("toString", MethodKind::Builtin, move |_recv, _args| {
                Ok(Value::str(format!("[object {}]", type_name)))
            }),
        );
    }
    if !methods.contains_key("valueOf") {
        methods.insert(
            Arc::from("valueOf"),
            Callable::new("valueOf", MethodKind::Builtin, |recv, _args| {
                Ok(Value::Object(recv.clone()))
            }),
        );
    }
    if !methods.contains_key("hasOwnProperty") {
        methods.insert(
            Arc::from("hasOwnProperty"),
            Callable::new("hasOwnProperty", MethodKind::Builtin, |recv, args| {
                let present = key_argument(args)
                    .map(|name| recv.own_descriptor(&name).is_some())
                    .unwrap_or(false);
                Ok(Value::Bool(present))
            }),
        );
    }
    if !methods.contains_key("propertyIsEnumerable") {
        methods.insert(
            Arc::from("propertyIsEnumerable"),
            Callable::new(
                "propertyIsEnumerable",
                MethodKind::Builtin,
                |recv, args| {
                    let enumerable = key_argument(args)
                        .and_then(|name| recv.own_descriptor(&name))
                        .map(|descriptor| descriptor.enumerable)
                        .unwrap_or(false);
                    Ok(Value::Bool(enumerable))
                },
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{TypeDef, TypeRef};

    #[test]
    fn test_protocol_set() {
        assert!(is_protocol_method("toString"));
        assert!(is_protocol_method("valueOf"));
        assert!(!is_protocol_method("save"));
    }

    #[test]
    fn test_default_to_string() {
        let ty = TypeDef::builder("Doc").build();
        let obj = TypeRef::from(ty).construct(&[]).unwrap();
        assert_eq!(obj.call("toString", &[]), Ok(Value::str("[object Doc]")));
    }

    #[test]
    fn test_value_of_returns_receiver() {
        let ty = TypeDef::builder("Doc").build();
        let obj = TypeRef::from(ty).construct(&[]).unwrap();
        assert_eq!(obj.call("valueOf", &[]), Ok(Value::Object(obj.clone())));
    }

    #[test]
    fn test_has_own_property() {
        let ty = TypeDef::builder("Doc")
            .constructor(|obj, _| {
                obj.set("title", Value::str("x"));
                Ok(())
            })
            .build();
        let obj = TypeRef::from(ty).construct(&[]).unwrap();
        assert_eq!(
            obj.call("hasOwnProperty", &[Value::str("title")]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            obj.call("hasOwnProperty", &[Value::str("missing")]),
            Ok(Value::Bool(false))
        );
        // Methods live on the type, not on the instance.
        assert_eq!(
            obj.call("hasOwnProperty", &[Value::str("toString")]),
            Ok(Value::Bool(false))
        );
    }

    #[test]
    fn test_builtins_are_tagged() {
        let ty = TypeDef::builder("Doc").build();
        assert_eq!(
            ty.find_method("toString").map(|c| c.kind()),
            Some(MethodKind::Builtin)
        );
    }

    #[test]
    fn test_user_override_keeps_user_kind() {
        let ty = TypeDef::builder("Doc")
            .method("toString", |_recv, _args| Ok(Value::str("custom")))
            .build();
        assert_eq!(
            ty.find_method("toString").map(|c| c.kind()),
            Some(MethodKind::User)
        );
        let obj = TypeRef::from(ty).construct(&[]).unwrap();
        assert_eq!(obj.call("toString", &[]), Ok(Value::str("custom")));
    }
}
