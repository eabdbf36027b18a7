// langur-core - Object system, built-ins and evaluator for the Langur programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Runtime core for Langur.
//!
//! Defines the [`object::Object`] value universe shared by both execution
//! backends, the built-in function registry, and the tree-walking
//! evaluator used by the REPL's interpreter mode.

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod object;

pub use builtins::BUILTINS;
pub use env::Env;
pub use error::{Error, Result};
pub use eval::{eval_expression, eval_program};
pub use object::{
    Builtin, BuiltinFn, Closure, CompiledFunction, Function, HashKey, HashPair, Object,
};
