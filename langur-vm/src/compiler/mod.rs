// langur-vm - Bytecode compiler for Langur
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Single-pass AST to bytecode compiler.
//!
//! The compiler walks the AST and emits instructions into a stack of
//! compilation scopes, one per function body being compiled. Leaving a
//! scope turns its instructions into a `CompiledFunction` constant. Two
//! peephole edits exist: stripping a trailing pop so an if-expression
//! leaves its value on the stack, and rewriting a trailing pop into a
//! return for implicit function results.

pub mod symbol_table;

use std::fmt;
use std::rc::Rc;

use langur_core::builtins;
use langur_core::object::{CompiledFunction, Object};
use langur_parser::ast::{Block, Expression, Program, Statement};

use crate::code::{self, Instructions, Op};

use self::symbol_table::{Symbol, SymbolScope, SymbolTable, SymbolTableRef};

/// Error during compilation. The first error aborts the compile and leaves
/// the compiler state undefined.
#[derive(Debug, Clone)]
pub enum CompileError {
    /// Reference to a name no table resolves.
    UndefinedVariable(String),
    /// Infix operator the instruction set cannot express.
    UnknownOperator(String),
    /// Prefix operator the instruction set cannot express.
    UnknownPrefixOperator(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UndefinedVariable(name) => {
                write!(f, "undefined variable {}", name)
            }
            CompileError::UnknownOperator(operator) => {
                write!(f, "unknown operator {}", operator)
            }
            CompileError::UnknownPrefixOperator(operator) => {
                write!(f, "unsupported prefix operator {}", operator)
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

/// The compiler's output: a flat main instruction stream plus the constant
/// pool it references. Constants are logically immutable once execution
/// starts.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Object>,
}

/// The opcode and start offset of an already-emitted instruction.
#[derive(Debug, Clone, Copy)]
struct EmittedInstruction {
    op: Op,
    position: usize,
}

/// Per-function emission state. `previous` exists because removing the
/// last instruction must restore the one before it as "last".
#[derive(Debug)]
struct CompilationScope {
    instructions: Instructions,
    symbols: SymbolTableRef,
    last: Option<EmittedInstruction>,
    previous: Option<EmittedInstruction>,
}

impl CompilationScope {
    fn new(symbols: SymbolTableRef) -> Self {
        CompilationScope {
            instructions: Instructions::default(),
            symbols,
            last: None,
            previous: None,
        }
    }
}

/// The Langur bytecode compiler.
pub struct Compiler {
    constants: Vec<Object>,
    scopes: Vec<CompilationScope>,
}

impl Compiler {
    /// Create a fresh compiler with the built-ins pre-registered in a new
    /// global symbol table.
    pub fn new() -> Self {
        let symbols = SymbolTable::new();
        {
            let mut table = symbols.borrow_mut();
            for (index, builtin) in builtins::BUILTINS.iter().enumerate() {
                table.define_builtin(index, builtin.name);
            }
        }
        Self::with_state(Vec::new(), symbols)
    }

    /// Resume compilation with an existing constant pool and global symbol
    /// table. The REPL uses this to carry state across lines.
    pub fn with_state(constants: Vec<Object>, symbols: SymbolTableRef) -> Self {
        Compiler {
            constants,
            scopes: vec![CompilationScope::new(symbols)],
        }
    }

    /// Compile a program, appending to the current state.
    pub fn compile(&mut self, program: &Program) -> Result<()> {
        for statement in &program.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    /// The compiled artifact for the VM.
    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.scope().instructions.clone(),
            constants: self.constants.clone(),
        }
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Expression(value) => {
                self.compile_expression(value)?;
                self.emit(Op::Pop, &[]);
            }
            Statement::Let { name, value } => {
                self.compile_expression(value)?;
                let symbol = self.symbols().borrow_mut().define(name);
                match symbol.scope {
                    SymbolScope::Global => self.emit(Op::SetGlobal, &[symbol.index]),
                    _ => self.emit(Op::SetLocal, &[symbol.index]),
                };
            }
            Statement::Return(value) => {
                self.compile_expression(value)?;
                self.emit(Op::ReturnValue, &[]);
            }
        }
        Ok(())
    }

    fn compile_block(&mut self, block: &Block) -> Result<()> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::Integer(n) => {
                let index = self.add_constant(Object::Int(*n));
                self.emit(Op::Constant, &[index]);
            }
            Expression::Str(s) => {
                let index = self.add_constant(Object::string(s));
                self.emit(Op::Constant, &[index]);
            }
            Expression::Boolean(true) => {
                self.emit(Op::True, &[]);
            }
            Expression::Boolean(false) => {
                self.emit(Op::False, &[]);
            }

            Expression::Identifier(name) => {
                let symbol = SymbolTable::resolve(&self.symbols(), name)
                    .ok_or_else(|| CompileError::UndefinedVariable(name.clone()))?;
                self.load_symbol(&symbol);
            }

            Expression::Prefix { operator, operand } => {
                self.compile_expression(operand)?;
                match operator.as_str() {
                    "-" => self.emit(Op::Minus, &[]),
                    "!" => self.emit(Op::Bang, &[]),
                    other => {
                        return Err(CompileError::UnknownPrefixOperator(other.to_string()));
                    }
                };
            }

            Expression::Infix {
                operator,
                left,
                right,
            } => self.compile_infix(operator, left, right)?,

            Expression::If {
                condition,
                consequence,
                alternative,
            } => self.compile_if(condition, consequence, alternative.as_ref())?,

            Expression::Array(elements) => {
                for element in elements {
                    self.compile_expression(element)?;
                }
                self.emit(Op::Array, &[elements.len()]);
            }

            Expression::Hash(pairs) => {
                // Source order keeps constant indices deterministic.
                for (key, value) in pairs {
                    self.compile_expression(key)?;
                    self.compile_expression(value)?;
                }
                self.emit(Op::Hash, &[pairs.len() * 2]);
            }

            Expression::Function {
                name,
                parameters,
                body,
            } => self.compile_function(name.as_deref(), parameters, body)?,

            Expression::Call {
                function,
                arguments,
            } => {
                self.compile_expression(function)?;
                for argument in arguments {
                    self.compile_expression(argument)?;
                }
                self.emit(Op::Call, &[arguments.len()]);
            }
        }
        Ok(())
    }

    /// Infix operators. `<` and `<=` have no opcode of their own: the
    /// operands are emitted in reverse and the greater-than family is
    /// reused.
    fn compile_infix(
        &mut self,
        operator: &str,
        left: &Expression,
        right: &Expression,
    ) -> Result<()> {
        if operator == "<" || operator == "<=" {
            self.compile_expression(right)?;
            self.compile_expression(left)?;
            let op = if operator == "<" {
                Op::GreaterThan
            } else {
                Op::GreaterEqual
            };
            self.emit(op, &[]);
            return Ok(());
        }

        self.compile_expression(left)?;
        self.compile_expression(right)?;
        match operator {
            "[" => self.emit(Op::Index, &[]),
            "+" => self.emit(Op::Add, &[]),
            "-" => self.emit(Op::Sub, &[]),
            "*" => self.emit(Op::Mul, &[]),
            "/" => self.emit(Op::Div, &[]),
            "==" => self.emit(Op::Equal, &[]),
            "!=" => self.emit(Op::NotEqual, &[]),
            ">" => self.emit(Op::GreaterThan, &[]),
            ">=" => self.emit(Op::GreaterEqual, &[]),
            other => return Err(CompileError::UnknownOperator(other.to_string())),
        };
        Ok(())
    }

    fn compile_if(
        &mut self,
        condition: &Expression,
        consequence: &Block,
        alternative: Option<&Block>,
    ) -> Result<()> {
        self.compile_expression(condition)?;

        // Placeholder targets; patched once the branch ends are known.
        let jump_not_truthy = self.emit(Op::JumpNotTruthy, &[9999]);

        self.compile_block(consequence)?;
        if self.last_instruction_is(Op::Pop) {
            self.remove_last_instruction();
        }

        let jump = self.emit(Op::Jump, &[9999]);
        let after_consequence = self.scope().instructions.len();
        self.change_operand(jump_not_truthy, after_consequence);

        match alternative {
            None => {
                self.emit(Op::Null, &[]);
            }
            Some(alternative) => {
                self.compile_block(alternative)?;
                if self.last_instruction_is(Op::Pop) {
                    self.remove_last_instruction();
                }
            }
        }

        let after_alternative = self.scope().instructions.len();
        self.change_operand(jump, after_alternative);
        Ok(())
    }

    fn compile_function(
        &mut self,
        name: Option<&str>,
        parameters: &[String],
        body: &Block,
    ) -> Result<()> {
        self.enter_scope();

        if let Some(name) = name {
            self.symbols().borrow_mut().define_function_name(name);
        }
        for parameter in parameters {
            self.symbols().borrow_mut().define(parameter);
        }

        self.compile_block(body)?;

        // Implicit return: the last expression statement's value is the
        // function's result.
        if self.last_instruction_is(Op::Pop) {
            self.replace_last_pop_with_return();
        }
        if !self.last_instruction_is(Op::ReturnValue) {
            self.emit(Op::Return, &[]);
        }

        let scope = self.leave_scope();
        let (free_symbols, num_locals) = {
            let table = scope.symbols.borrow();
            (table.free_symbols.clone(), table.num_definitions)
        };

        // Push the captured values in free_symbols order, then wrap the
        // function constant into a closure over them.
        for free in &free_symbols {
            self.load_symbol(free);
        }

        let func = CompiledFunction {
            instructions: scope.instructions.into_bytes(),
            num_locals,
            num_parameters: parameters.len(),
        };
        let index = self.add_constant(Object::CompiledFn(Rc::new(func)));
        self.emit(Op::Closure, &[index, free_symbols.len()]);
        Ok(())
    }

    fn load_symbol(&mut self, symbol: &Symbol) {
        match symbol.scope {
            SymbolScope::Global => self.emit(Op::GetGlobal, &[symbol.index]),
            SymbolScope::Local => self.emit(Op::GetLocal, &[symbol.index]),
            SymbolScope::Builtin => self.emit(Op::GetBuiltin, &[symbol.index]),
            SymbolScope::Free => self.emit(Op::GetFree, &[symbol.index]),
            SymbolScope::Function => self.emit(Op::CurrentClosure, &[]),
        };
    }

    fn add_constant(&mut self, value: Object) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Emit an instruction into the current scope, returning its start
    /// offset.
    fn emit(&mut self, op: Op, operands: &[usize]) -> usize {
        let encoded = code::make(op, operands);
        let scope = self.scope_mut();
        let position = scope.instructions.len();
        scope.instructions.push_all(encoded.as_bytes());
        scope.previous = scope.last;
        scope.last = Some(EmittedInstruction { op, position });
        position
    }

    fn last_instruction_is(&self, op: Op) -> bool {
        matches!(self.scope().last, Some(last) if last.op == op)
    }

    /// Remove the most recently emitted instruction.
    fn remove_last_instruction(&mut self) {
        let scope = self.scope_mut();
        if let Some(last) = scope.last {
            scope.instructions.truncate(last.position);
            scope.last = scope.previous.take();
        }
    }

    /// Rewrite the trailing pop into a return-value, in place. Both encode
    /// to a single byte, so the offsets stay valid.
    fn replace_last_pop_with_return(&mut self) {
        if let Some(last) = self.scope().last {
            let encoded = code::make(Op::ReturnValue, &[]);
            let scope = self.scope_mut();
            scope.instructions.replace_at(last.position, encoded.as_bytes());
            scope.last = Some(EmittedInstruction {
                op: Op::ReturnValue,
                position: last.position,
            });
        }
    }

    /// Re-encode the operand of the instruction starting at `position`
    /// (jump backpatching).
    fn change_operand(&mut self, position: usize, operand: usize) {
        let op = Op::try_from(self.scope().instructions.as_bytes()[position])
            .expect("patch position does not start an instruction");
        let encoded = code::make(op, &[operand]);
        self.scope_mut()
            .instructions
            .replace_at(position, encoded.as_bytes());
    }

    fn enter_scope(&mut self) {
        let symbols = SymbolTable::new_enclosed(self.symbols());
        self.scopes.push(CompilationScope::new(symbols));
    }

    fn leave_scope(&mut self) -> CompilationScope {
        self.scopes.pop().expect("compiler has no open scope")
    }

    fn scope(&self) -> &CompilationScope {
        self.scopes.last().expect("compiler has no open scope")
    }

    fn scope_mut(&mut self) -> &mut CompilationScope {
        self.scopes.last_mut().expect("compiler has no open scope")
    }

    fn symbols(&self) -> SymbolTableRef {
        Rc::clone(&self.scope().symbols)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
