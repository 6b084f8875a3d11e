//! Instance composition layer
//!
//! [`ComposedInstance`] merges a constructed base instance and a constructed
//! enhancement instance into one object. Property reads, membership tests,
//! key enumeration, and descriptor lookup consult both sides; a method name
//! present on the enhancement dispatches through the composed-method
//! algorithm:
//!
//! 1. the enhancement's method runs first with the caller's arguments;
//! 2. if it returned a deferred, everything after waits for its settlement
//!    (rejection becomes the composed result, skipping the rest);
//! 3. the base's `enhanced<Name>Return` hook, if defined, observes the
//!    enhancement's resolved value;
//! 4. if the base also defines the method, it runs with the original
//!    arguments and its result is what the caller sees; otherwise the
//!    enhancement's value is the result.

use crate::guard;
use graft_core::{
    Method, MethodKind, ObjectProtocol, ObjectRef, PropertyDescriptor, TypeRef, Value,
    CONSTRUCTOR_KEY,
};
use std::sync::Arc;
use tracing::warn;

/// Merged view over a base instance and an enhancement instance.
///
/// The view's identity is the base instance's identity; its constructing
/// type is the composed type that built the pair.
pub struct ComposedInstance {
    base: ObjectRef,
    enhancement: ObjectRef,
    ty: TypeRef,
}

impl ComposedInstance {
    /// Wrap a base/enhancement pair, reporting `ty` as the constructing type
    pub fn new(base: ObjectRef, enhancement: ObjectRef, ty: TypeRef) -> ObjectRef {
        ObjectRef::new(ComposedInstance {
            base,
            enhancement,
            ty,
        })
    }
}

impl ObjectProtocol for ComposedInstance {
    fn get(&self, name: &str) -> Option<Value> {
        if name == CONSTRUCTOR_KEY {
            return Some(Value::Type(self.ty.clone()));
        }

        let base_value = self.base.get(name);
        let base_method = match &base_value {
            Some(Value::Method(method)) => Some(method.clone()),
            _ => None,
        };

        // A protocol builtin on the base wins over everything.
        if let Some(method) = &base_method {
            if guard::is_platform_builtin(method) {
                return base_value;
            }
        }

        match self.enhancement.get(name) {
            Some(Value::Method(enh_method)) => Some(Value::Method(compose_method(
                self.base.clone(),
                self.enhancement.clone(),
                Arc::from(name),
                enh_method,
                base_method,
            ))),
            _ => base_value,
        }
    }

    fn set(&self, name: &str, value: Value) {
        // Writes land on the base: the view's storage identity is the base.
        self.base.set(name, value);
    }

    fn has(&self, name: &str) -> bool {
        self.base.has(name) || self.enhancement.has(name)
    }

    fn own_keys(&self) -> Vec<Arc<str>> {
        let mut keys = self.base.own_keys();
        for key in self.enhancement.own_keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    fn own_descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        self.enhancement
            .own_descriptor(name)
            .or_else(|| self.base.own_descriptor(name))
    }

    fn type_of(&self) -> TypeRef {
        self.ty.clone()
    }

    fn object_id(&self) -> u64 {
        self.base.object_id()
    }
}

/// Derive the result-hook name: only the first character is uppercased.
fn hook_name(method: &str) -> String {
    let mut chars = method.chars();
    match chars.next() {
        Some(first) => format!("enhanced{}{}Return", first.to_uppercase(), chars.as_str()),
        None => "enhancedReturn".to_string(),
    }
}

/// Invoke the base's result hook for `method`, if it defines one.
///
/// The hook is looked up by name at call time, never cached. Its return
/// value is discarded; a failure is reported and never replaces the
/// primary result.
fn notify_result(base: &ObjectRef, enhancement: &ObjectRef, method: &str, value: &Value) {
    let hook = hook_name(method);
    if let Some(Value::Method(handler)) = base.get(&hook) {
        if let Err(error) = handler.call(&[value.clone(), Value::Object(enhancement.clone())]) {
            warn!(method, hook = %hook, %error, "result hook failed");
        }
    }
}

/// Build the composed method for `name`, dispatching enhancement first and
/// treating the base as authoritative for the result when it participates.
fn compose_method(
    base: ObjectRef,
    enhancement: ObjectRef,
    name: Arc<str>,
    enh_method: Method,
    base_method: Option<Method>,
) -> Method {
    let method_name = Arc::clone(&name);
    Method::new(name, MethodKind::User, move |args| {
        // A synchronous failure propagates before the hook or base run.
        let result = enh_method.call(args)?;
        match result {
            Value::Deferred(deferred) => {
                let base = base.clone();
                let enhancement = enhancement.clone();
                let method_name = Arc::clone(&method_name);
                let base_method = base_method.clone();
                let args = args.to_vec();
                Ok(Value::Deferred(deferred.then(move |settled| {
                    // Rejection skips both the hook and the base call.
                    let value = settled?;
                    notify_result(&base, &enhancement, &method_name, &value);
                    match &base_method {
                        Some(method) => method.call(&args),
                        None => Ok(value),
                    }
                })))
            }
            value => {
                notify_result(&base, &enhancement, &method_name, &value);
                match &base_method {
                    Some(method) => method.call(args),
                    None => Ok(value),
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_name_uppercases_first_character_only() {
        assert_eq!(hook_name("attached"), "enhancedAttachedReturn");
        assert_eq!(hook_name("saveAll"), "enhancedSaveAllReturn");
        assert_eq!(hook_name("x"), "enhancedXReturn");
        assert_eq!(hook_name(""), "enhancedReturn");
    }
}
