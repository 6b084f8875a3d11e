//! Call and construction errors

use thiserror::Error;

/// Errors raised while constructing instances or invoking methods
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CallError {
    /// Property was invoked as a method but does not exist on any lookup path
    #[error("no such method: {name}")]
    NoSuchMethod {
        /// Property name that was invoked
        name: String,
    },

    /// Property exists but does not hold a callable value
    #[error("property is not callable: {name}")]
    NotCallable {
        /// Property name that was invoked
        name: String,
    },

    /// Failure raised by user code (a method or constructor body)
    #[error("{message}")]
    Thrown {
        /// Failure message supplied by user code
        message: String,
    },

    /// A constructor failed
    #[error("construction of {type_name} failed: {source}")]
    Construction {
        /// Type whose constructor failed
        type_name: String,
        /// Underlying failure
        #[source]
        source: Box<CallError>,
    },
}

impl CallError {
    /// Raise a user-level failure from a method or constructor body
    pub fn thrown(message: impl Into<String>) -> Self {
        CallError::Thrown {
            message: message.into(),
        }
    }

    /// Wrap a failure that occurred while constructing `type_name`
    pub fn construction(type_name: &str, source: CallError) -> Self {
        CallError::Construction {
            type_name: type_name.to_string(),
            source: Box::new(source),
        }
    }
}
