// langur-core - Value types for Langur
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Core value type for Langur.
//!
//! `Object` is the central enum representing all runtime values. Both
//! execution backends (the tree-walking evaluator here and the bytecode VM
//! in `langur-vm`) operate on it.

use std::fmt;
use std::rc::Rc;

use im::{HashMap, Vector};

use langur_parser::ast::Block;

use crate::env::Env;

/// Signature of a host-implemented built-in function.
///
/// Built-ins report misuse by returning an [`Object::Error`] value; they
/// never abort execution.
pub type BuiltinFn = fn(&[Object]) -> Object;

/// A handle to a built-in function.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Builtin {}

/// A compiled function body: instruction bytes plus the frame shape the VM
/// needs to reserve for it. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledFunction {
    pub instructions: Vec<u8>,
    pub num_locals: usize,
    pub num_parameters: usize,
}

/// A runtime closure: a compiled function plus its captured free values.
///
/// A closure never stores a reference to itself; self-recursion goes
/// through the executing frame instead, which keeps the value graph
/// acyclic.
#[derive(Debug, Clone)]
pub struct Closure {
    pub func: Rc<CompiledFunction>,
    pub free: Vec<Object>,
}

/// A function value for the tree-walking evaluator: the literal's
/// parameters and body together with the environment it closed over.
#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Block,
    pub env: Env,
}

/// A key in a hash value. Only integers, booleans and strings are
/// hashable; everything else is rejected at the point of use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashKey {
    Int(i64),
    Bool(bool),
    Str(Rc<str>),
}

/// A hash entry. The original key object is kept alongside the value so
/// hashes display with the keys they were built from.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// A Langur runtime value.
#[derive(Debug, Clone)]
pub enum Object {
    Int(i64),
    Bool(bool),
    Str(Rc<str>),
    Null,
    Array(Vector<Object>),
    Hash(HashMap<HashKey, HashPair>),
    /// A first-class error value produced by built-ins on misuse.
    Error(String),
    CompiledFn(Rc<CompiledFunction>),
    Closure(Rc<Closure>),
    Builtin(Builtin),
    /// Evaluator-only closure over an [`Env`].
    Function(Rc<Function>),
}

impl Object {
    /// Build a string value.
    pub fn string(s: impl AsRef<str>) -> Object {
        Object::Str(Rc::from(s.as_ref()))
    }

    /// The uppercase type tag used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Int(_) => "INTEGER",
            Object::Bool(_) => "BOOLEAN",
            Object::Str(_) => "STRING",
            Object::Null => "NULL",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Error(_) => "ERROR",
            Object::CompiledFn(_) => "COMPILED_FUNCTION",
            Object::Closure(_) => "CLOSURE",
            Object::Builtin(_) => "BUILTIN",
            Object::Function(_) => "FUNCTION",
        }
    }

    /// The hash key for this value, if it is hashable.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Int(n) => Some(HashKey::Int(*n)),
            Object::Bool(b) => Some(HashKey::Bool(*b)),
            Object::Str(s) => Some(HashKey::Str(Rc::clone(s))),
            _ => None,
        }
    }

    /// Truthiness: only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Bool(false) | Object::Null)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Int(a), Object::Int(b)) => a == b,
            (Object::Bool(a), Object::Bool(b)) => a == b,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            (Object::CompiledFn(a), Object::CompiledFn(b)) => Rc::ptr_eq(a, b),
            (Object::Closure(a), Object::Closure(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKey::Int(n) => write!(f, "{}", n),
            HashKey::Bool(b) => write!(f, "{}", b),
            HashKey::Str(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Int(n) => write!(f, "{}", n),
            Object::Bool(b) => write!(f, "{}", b),
            Object::Str(s) => write!(f, "{}", s),
            Object::Null => write!(f, "null"),
            Object::Array(elements) => {
                let rendered: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Object::Hash(pairs) => {
                // Sort by key so hashes render deterministically.
                let mut entries: Vec<(&HashKey, &HashPair)> = pairs.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|(_, pair)| format!("{}: {}", pair.key, pair.value))
                    .collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Object::Error(message) => write!(f, "ERROR: {}", message),
            Object::CompiledFn(_) => write!(f, "#<compiled-fn>"),
            Object::Closure(_) => write!(f, "#<closure>"),
            Object::Builtin(b) => write!(f, "#<builtin {}>", b.name),
            Object::Function(_) => write!(f, "#<fn>"),
        }
    }
}
