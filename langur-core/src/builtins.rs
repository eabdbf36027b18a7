// langur-core - Built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Built-in functions for Langur.
//!
//! The registry order is part of the compiled-code contract: the compiler
//! resolves built-ins to their position in [`BUILTINS`] and the VM fetches
//! them back by that index. Appending is safe, reordering is not.

use crate::object::{Builtin, Object};

/// The built-in registry, in index order.
pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        func: builtin_len,
    },
    Builtin {
        name: "first",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        func: builtin_push,
    },
    Builtin {
        name: "puts",
        func: builtin_puts,
    },
];

/// Look up a built-in by name.
pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter().copied().find(|b| b.name == name)
}

fn wrong_arg_count(got: usize, want: usize) -> Object {
    Object::Error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    ))
}

fn builtin_len(args: &[Object]) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }
    match &args[0] {
        Object::Str(s) => Object::Int(s.len() as i64),
        Object::Array(elements) => Object::Int(elements.len() as i64),
        other => Object::Error(format!(
            "argument to `len` not supported, got {}",
            other.kind()
        )),
    }
}

fn builtin_first(args: &[Object]) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.front().cloned().unwrap_or(Object::Null),
        other => Object::Error(format!(
            "argument to `first` must be ARRAY, got {}",
            other.kind()
        )),
    }
}

fn builtin_last(args: &[Object]) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.back().cloned().unwrap_or(Object::Null),
        other => Object::Error(format!(
            "argument to `last` must be ARRAY, got {}",
            other.kind()
        )),
    }
}

fn builtin_rest(args: &[Object]) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => Object::Array(elements.iter().skip(1).cloned().collect()),
        other => Object::Error(format!(
            "argument to `rest` must be ARRAY, got {}",
            other.kind()
        )),
    }
}

fn builtin_push(args: &[Object]) -> Object {
    if args.len() != 2 {
        return wrong_arg_count(args.len(), 2);
    }
    match &args[0] {
        Object::Array(elements) => {
            // Structural sharing makes this cheap; the input is untouched.
            let mut out = elements.clone();
            out.push_back(args[1].clone());
            Object::Array(out)
        }
        other => Object::Error(format!(
            "argument to `push` must be ARRAY, got {}",
            other.kind()
        )),
    }
}

fn builtin_puts(args: &[Object]) -> Object {
    for arg in args {
        println!("{}", arg);
    }
    Object::Null
}
