// langur-core - Error types for the Langur evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for tree-walking evaluation.

use std::fmt;

use crate::object::Object;

/// Result type for evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during evaluation.
#[derive(Debug, Clone)]
pub enum Error {
    /// Undefined identifier reference.
    UndefinedSymbol(String),
    /// Unsupported operand types for an infix operator.
    UnknownOperator {
        operator: String,
        left: &'static str,
        right: &'static str,
    },
    /// Unsupported operand type for a prefix operator.
    UnknownPrefixOperator {
        operator: String,
        operand: &'static str,
    },
    /// Attempted to call something that isn't callable.
    NotCallable(&'static str),
    /// Wrong number of arguments to a function.
    Arity { expected: usize, got: usize },
    /// Division by zero.
    DivisionByZero,
    /// Value used as a hash key is not hashable.
    NotHashable(&'static str),
    /// Value does not support the index operator.
    IndexNotSupported(&'static str),
    /// Return control flow (not a real error, used to unwind function
    /// bodies; callers outside a function body treat it as the result).
    Return(Object),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UndefinedSymbol(name) => {
                write!(f, "identifier not found: {}", name)
            }
            Error::UnknownOperator {
                operator,
                left,
                right,
            } => {
                write!(f, "unknown operator: {} {} {}", left, operator, right)
            }
            Error::UnknownPrefixOperator { operator, operand } => {
                write!(f, "unknown operator: {}{}", operator, operand)
            }
            Error::NotCallable(kind) => {
                write!(f, "not a function: {}", kind)
            }
            Error::Arity { expected, got } => {
                write!(
                    f,
                    "wrong number of arguments: want={}, got={}",
                    expected, got
                )
            }
            Error::DivisionByZero => {
                write!(f, "division by zero")
            }
            Error::NotHashable(kind) => {
                write!(f, "unusable as hash key: {}", kind)
            }
            Error::IndexNotSupported(kind) => {
                write!(f, "index operator not supported: {}", kind)
            }
            Error::Return(_) => {
                write!(f, "return used outside of a function body")
            }
        }
    }
}

impl std::error::Error for Error {}
