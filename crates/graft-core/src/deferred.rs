//! Deferred values
//!
//! A [`Deferred`] is a promise-like asynchronous result: pending until it
//! settles exactly once, either resolved with a [`Value`] or rejected with a
//! [`CallError`]. Continuations registered with [`Deferred::on_settle`] run
//! on the settling call's stack, in registration order; a continuation
//! registered after settlement runs immediately.
//!
//! Resolving with another deferred adopts that deferred's eventual
//! settlement (the `then`-chaining rule), so composed results flatten one
//! level. Cancellation is not modeled: a deferred that never settles simply
//! never runs its continuations.

use crate::error::CallError;
use crate::value::Value;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Continuation invoked once when a deferred settles
type Continuation = Box<dyn FnOnce(Result<Value, CallError>) + Send>;

/// Observable settlement state of a [`Deferred`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredState {
    /// Not yet settled
    Pending,
    /// Settled with a value
    Resolved(Value),
    /// Settled with a failure
    Rejected(CallError),
}

enum Inner {
    Pending(Vec<Continuation>),
    Resolved(Value),
    Rejected(CallError),
}

/// A promise-like asynchronous result
#[derive(Clone)]
pub struct Deferred(Arc<Mutex<Inner>>);

impl Deferred {
    /// Create an unsettled deferred
    pub fn pending() -> Self {
        Deferred(Arc::new(Mutex::new(Inner::Pending(Vec::new()))))
    }

    /// Create a deferred already resolved with `value`
    pub fn resolved(value: Value) -> Self {
        Deferred(Arc::new(Mutex::new(Inner::Resolved(value))))
    }

    /// Create a deferred already rejected with `error`
    pub fn rejected(error: CallError) -> Self {
        Deferred(Arc::new(Mutex::new(Inner::Rejected(error))))
    }

    /// Settle with a value. Settlement is first-wins: once settled, later
    /// calls are ignored. Resolving with a deferred adopts its settlement
    /// instead of resolving with the deferred itself.
    pub fn resolve(&self, value: Value) {
        if let Value::Deferred(inner) = value {
            let target = self.clone();
            inner.on_settle(move |settled| match settled {
                Ok(v) => target.resolve(v),
                Err(e) => target.reject(e),
            });
            return;
        }
        self.settle(Ok(value));
    }

    /// Settle with a failure. Ignored if already settled.
    pub fn reject(&self, error: CallError) {
        self.settle(Err(error));
    }

    /// Register a continuation to run when this deferred settles.
    ///
    /// Runs immediately if already settled. Continuations run outside the
    /// internal lock, on the stack of whichever call settles the deferred.
    pub fn on_settle<F>(&self, continuation: F)
    where
        F: FnOnce(Result<Value, CallError>) + Send + 'static,
    {
        let settled = {
            let mut guard = self.0.lock();
            match &mut *guard {
                Inner::Pending(continuations) => {
                    continuations.push(Box::new(continuation));
                    return;
                }
                Inner::Resolved(value) => Ok(value.clone()),
                Inner::Rejected(error) => Err(error.clone()),
            }
        };
        continuation(settled);
    }

    /// Chain a transformation: returns a new deferred that settles with
    /// `transform`'s result once this one settles. Returning a deferred
    /// value from `transform` is adopted (flattened) by the output.
    pub fn then<F>(&self, transform: F) -> Deferred
    where
        F: FnOnce(Result<Value, CallError>) -> Result<Value, CallError> + Send + 'static,
    {
        let out = Deferred::pending();
        let target = out.clone();
        self.on_settle(move |settled| match transform(settled) {
            Ok(value) => target.resolve(value),
            Err(error) => target.reject(error),
        });
        out
    }

    /// Current settlement state
    pub fn state(&self) -> DeferredState {
        match &*self.0.lock() {
            Inner::Pending(_) => DeferredState::Pending,
            Inner::Resolved(value) => DeferredState::Resolved(value.clone()),
            Inner::Rejected(error) => DeferredState::Rejected(error.clone()),
        }
    }

    /// Check whether this deferred has settled
    pub fn is_settled(&self) -> bool {
        !matches!(&*self.0.lock(), Inner::Pending(_))
    }

    fn settle(&self, result: Result<Value, CallError>) {
        let continuations = {
            let mut guard = self.0.lock();
            if !matches!(&*guard, Inner::Pending(_)) {
                return;
            }
            let next = match &result {
                Ok(value) => Inner::Resolved(value.clone()),
                Err(error) => Inner::Rejected(error.clone()),
            };
            match std::mem::replace(&mut *guard, next) {
                Inner::Pending(continuations) => continuations,
                _ => Vec::new(),
            }
        };
        for continuation in continuations {
            continuation(result.clone());
        }
    }
}

impl PartialEq for Deferred {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.0.lock() {
            Inner::Pending(_) => "pending",
            Inner::Resolved(_) => "resolved",
            Inner::Rejected(_) => "rejected",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}
