use thiserror::Error;

use super::scope::Scope;
use super::value::Value;

/// Evaluation failure, tagged with the kind of fault.
///
/// Most variants carry the accumulated frame trace and the originating
/// source position; errors raised while resolving a bare name have
/// neither. Errors are not catchable from the language - they abort the
/// run.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("variable not declared: {name}")]
    Undeclared { name: String },

    #[error("tried to compare an uninitialized identifier: {name}")]
    UncomparableIdentifier { name: String },

    /// Operator/operand mismatch, wrong argument kind to a native
    #[error("\n{trace}\n{position}: {message}")]
    Type {
        trace: String,
        position: String,
        message: String,
    },

    /// Wrong number of arguments to a user function or native
    #[error("\n{trace}\n{position}: {message}")]
    Arity {
        trace: String,
        position: String,
        message: String,
    },

    /// Assignment to a name that was never declared
    #[error("\n{trace}\n{position}: {message}")]
    Name {
        trace: String,
        position: String,
        message: String,
    },

    /// Out-of-range list/string access, pop from an empty list
    #[error("\n{trace}\n{position}: {message}")]
    Index {
        trace: String,
        position: String,
        message: String,
    },

    /// Everything else, including failed assertions
    #[error("\n{trace}\n{position}: {message}")]
    Runtime {
        trace: String,
        position: String,
        message: String,
    },
}

impl RuntimeError {
    pub fn type_error(scope: &Scope, position: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Type {
            trace: scope.trace(),
            position: position.into(),
            message: message.into(),
        }
    }

    pub fn arity(scope: &Scope, position: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Arity {
            trace: scope.trace(),
            position: position.into(),
            message: message.into(),
        }
    }

    pub fn name(scope: &Scope, position: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Name {
            trace: scope.trace(),
            position: position.into(),
            message: message.into(),
        }
    }

    pub fn index(scope: &Scope, position: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Index {
            trace: scope.trace(),
            position: position.into(),
            message: message.into(),
        }
    }

    pub fn runtime(scope: &Scope, position: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Runtime {
            trace: scope.trace(),
            position: position.into(),
            message: message.into(),
        }
    }
}

/// Non-local exits ride the error channel out of `eval`.
///
/// `return`, `break`, and `continue` are not values - encoding them
/// in-band would collide with `undefined`. A function call catches
/// `Return`; the loop drivers catch `Break` and `Continue`; anything that
/// escapes to the program top level surfaces with the message below.
#[derive(Debug, Error)]
pub enum Interrupt {
    #[error(transparent)]
    Failure(#[from] RuntimeError),

    #[error("return statement used outside of a function, tried to return: {0}")]
    Return(Value),

    #[error("break statement used outside of a loop")]
    Break { position: String },

    #[error("continue statement used outside of a loop")]
    Continue { position: String },
}

/// Result type shared by every evaluation step.
pub type EvalResult<T = Value> = Result<T, Interrupt>;
