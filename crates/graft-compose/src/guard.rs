//! Native-call guard
//!
//! Decides whether a method found on the base belongs to the host object
//! protocol and must therefore never be intercepted by an enhancement, even
//! when the enhancement defines a method of the same name.
//!
//! The original runtime detected builtins by sniffing a function's source
//! representation for the platform's native-code marker. Here the check is
//! an explicit tag: protocol methods are installed with
//! [`MethodKind::Builtin`] from the closed enumeration in
//! `graft_core::builtins`, and everything a user type authors carries
//! [`MethodKind::User`]. The classification is best-effort by contract: it
//! answers "did the platform supply this callable", not "is this callable
//! safe to wrap".

use graft_core::{Method, MethodKind};

/// True when `method` was supplied by the object protocol rather than
/// authored by a user type.
pub fn is_platform_builtin(method: &Method) -> bool {
    method.kind() == MethodKind::Builtin
}
