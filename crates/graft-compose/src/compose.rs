//! Type composition layer
//!
//! [`ComposedType`] pairs a base type with an enhancement type into one
//! constructible unit. The merged dependency list is computed once, when the
//! composed type is created. Construction builds the base from its share of
//! the resolved values, then the enhancement (which always receives the base
//! instance ahead of its own dependencies), and wraps both in a
//! [`ComposedInstance`] view.
//!
//! A composed type is itself a valid base for further composition; layers
//! nest without flattening.

use crate::deps::{self, MergedDependencies};
use crate::instance::ComposedInstance;
use graft_core::{
    CallError, ObjectRef, PropertyDescriptor, Token, TypeProtocol, TypeRef, Value,
    DEPENDENCIES_KEY,
};
use std::sync::Arc;
use tracing::debug;

/// A constructible pairing of a base type and an enhancement type
pub struct ComposedType {
    base: TypeRef,
    enhancement: TypeRef,
    name: String,
    merged: MergedDependencies,
}

/// Compose one enhancement onto a base type.
///
/// The merged dependency list is computed here, not per construction.
pub fn compose(base: TypeRef, enhancement: TypeRef) -> Arc<ComposedType> {
    let merged = deps::merge(base.dependencies(), enhancement.dependencies());
    let name = format!("{}+{}", base.name(), enhancement.name());
    debug!(
        base = %base.name(),
        enhancement = %enhancement.name(),
        dependencies = merged.combined().len(),
        "composed type created"
    );
    Arc::new(ComposedType {
        base,
        enhancement,
        name,
        merged,
    })
}

impl ComposedType {
    /// The base side of this composition
    pub fn base(&self) -> &TypeRef {
        &self.base
    }

    /// The enhancement side of this composition
    pub fn enhancement(&self) -> &TypeRef {
        &self.enhancement
    }

    /// The merged dependency data computed at composition time
    pub fn merged(&self) -> &MergedDependencies {
        &self.merged
    }
}

impl TypeProtocol for ComposedType {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[Token] {
        self.merged.combined()
    }

    /// Construct base, then enhancement, then the composed view.
    ///
    /// `args` must be positionally aligned to the merged dependency list. A
    /// base-construction failure aborts before the enhancement is built; an
    /// enhancement-construction failure discards the base instance with it.
    fn construct(self: Arc<Self>, args: &[Value]) -> Result<ObjectRef, CallError> {
        let base_args = self.merged.split_for_base(args);
        let base_instance = self.base.construct(&base_args)?;

        let mut enh_args = Vec::with_capacity(self.merged.enh_len() + 1);
        enh_args.push(Value::Object(base_instance.clone()));
        enh_args.extend(self.merged.split_for_enh(args));
        let enh_instance = self.enhancement.construct(&enh_args)?;

        Ok(ComposedInstance::new(
            base_instance,
            enh_instance,
            TypeRef::from(self),
        ))
    }

    fn static_property(&self, name: &str) -> Option<Value> {
        if name == DEPENDENCIES_KEY {
            // The merged list shadows any same-named static on either side.
            return Some(Value::list(
                self.merged
                    .combined()
                    .iter()
                    .cloned()
                    .map(Value::from)
                    .collect(),
            ));
        }
        // Statics fall through to the base; the enhancement's are never
        // exposed.
        self.base.static_property(name)
    }

    fn static_descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        if name == DEPENDENCIES_KEY {
            return self.static_property(name).map(PropertyDescriptor::read_only);
        }
        self.base.static_descriptor(name)
    }
}

impl std::fmt::Debug for ComposedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedType")
            .field("name", &self.name)
            .field("dependencies", &self.merged.combined())
            .finish()
    }
}
