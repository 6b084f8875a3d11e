//! Dependency tokens and symbols
//!
//! A type declares the dependencies it wants injected as an ordered list of
//! opaque tokens. Tokens are either names (plain strings) or symbols
//! (process-unique identifiers that never collide). Order within a declared
//! list is positional-argument order for the constructor.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global counter for generating unique symbol IDs
static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a symbol token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u64);

impl SymbolId {
    /// Allocate a new process-unique symbol ID
    pub fn new() -> Self {
        SymbolId(NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric ID value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Default for SymbolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol(#{})", self.0)
    }
}

/// An opaque dependency token declared by a type.
///
/// The same token may be requested by both a base and an enhancement (it then
/// resolves to the same injected value for both sides), but a token never
/// repeats within one declared list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Named token, compared by content
    Name(Arc<str>),
    /// Symbol token, unique per allocation
    Symbol(SymbolId),
}

impl Token {
    /// Create a named token
    pub fn name(name: impl Into<Arc<str>>) -> Self {
        Token::Name(name.into())
    }

    /// Allocate a fresh symbol token, distinct from every other token
    pub fn symbol() -> Self {
        Token::Symbol(SymbolId::new())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => write!(f, "{}", name),
            Token::Symbol(id) => write!(f, "{}", id),
        }
    }
}
