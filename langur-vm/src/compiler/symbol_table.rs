// langur-vm - Symbol table for the Langur compiler
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexically nested symbol table with free-variable capture.
//!
//! Tables form a chain through `outer` references, one table per function
//! body plus the global table. Resolving a name that lives in an enclosing
//! function promotes it to a free symbol in every table between the
//! definition and the use, which is what lets nested closures capture
//! through intermediate functions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Where a symbol lives, which decides the instruction that loads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    /// Top-level binding, stored in the VM's globals array.
    Global,
    /// Binding inside a function body, stored in a frame-local slot.
    Local,
    /// Entry in the built-in registry; the index is fixed by registry order.
    Builtin,
    /// Captured from an enclosing function at closure-construction time.
    Free,
    /// The name of the function currently being compiled, for
    /// self-recursion via the current-closure instruction.
    Function,
}

/// A resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: usize,
}

/// Shared handle to a symbol table. The compiler and the REPL both hold
/// onto the global table across lines.
pub type SymbolTableRef = Rc<RefCell<SymbolTable>>;

/// One lexical scope's worth of symbols.
#[derive(Debug, Default)]
pub struct SymbolTable {
    store: HashMap<String, Symbol>,
    /// Number of globals/locals defined directly in this table.
    pub num_definitions: usize,
    /// Originals captured from enclosing scopes, in capture order. The
    /// position in this list is the free symbol's index.
    pub free_symbols: Vec<Symbol>,
    outer: Option<SymbolTableRef>,
}

impl SymbolTable {
    /// Create a new global (outermost) table.
    pub fn new() -> SymbolTableRef {
        Rc::new(RefCell::new(SymbolTable::default()))
    }

    /// Create a table enclosed by `outer`, for a function body.
    pub fn new_enclosed(outer: SymbolTableRef) -> SymbolTableRef {
        Rc::new(RefCell::new(SymbolTable {
            outer: Some(outer),
            ..SymbolTable::default()
        }))
    }

    /// Define a name in this table. The scope is Global for the outermost
    /// table and Local otherwise; indices are dense per table.
    pub fn define(&mut self, name: &str) -> Symbol {
        let scope = if self.outer.is_none() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };
        let symbol = Symbol {
            name: name.to_string(),
            scope,
            index: self.num_definitions,
        };
        self.store.insert(name.to_string(), symbol.clone());
        self.num_definitions += 1;
        symbol
    }

    /// Register a built-in under its fixed registry index.
    pub fn define_builtin(&mut self, index: usize, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Builtin,
            index,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Register the enclosing function's own name inside its body table.
    pub fn define_function_name(&mut self, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Function,
            index: 0,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    fn define_free(&mut self, original: Symbol) -> Symbol {
        let name = original.name.clone();
        self.free_symbols.push(original);
        let symbol = Symbol {
            name: name.clone(),
            scope: SymbolScope::Free,
            index: self.free_symbols.len() - 1,
        };
        self.store.insert(name, symbol.clone());
        symbol
    }

    /// Resolve a name, walking outward. A match found in an enclosing
    /// function (anything but Global or Builtin) is recorded as a free
    /// symbol in each intermediate table on the way back in, so the
    /// capture chain survives arbitrary nesting.
    pub fn resolve(table: &SymbolTableRef, name: &str) -> Option<Symbol> {
        let (found, outer) = {
            let this = table.borrow();
            (this.store.get(name).cloned(), this.outer.clone())
        };
        if let Some(symbol) = found {
            return Some(symbol);
        }

        let symbol = Self::resolve(&outer?, name)?;
        match symbol.scope {
            SymbolScope::Global | SymbolScope::Builtin => Some(symbol),
            _ => Some(table.borrow_mut().define_free(symbol)),
        }
    }
}
