// langur-parser - AST for Langur
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Abstract syntax tree produced by the parser.
//!
//! `Display` impls reconstruct a canonical source form, with every infix
//! expression parenthesised. The parser tests compare against these strings
//! to pin down precedence and associativity.

use std::fmt;

/// A complete parsed program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let <name> = <value>;`
    Let { name: String, value: Expression },
    /// `return <value>;`
    Return(Expression),
    /// A bare expression in statement position.
    Expression(Expression),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {} = {};", name, value),
            Statement::Return(value) => write!(f, "return {};", value),
            Statement::Expression(value) => write!(f, "{}", value),
        }
    }
}

/// A braced sequence of statements (function bodies, if branches).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer(i64),
    Boolean(bool),
    Str(String),
    Identifier(String),
    /// `-x` or `!x`.
    Prefix {
        operator: String,
        operand: Box<Expression>,
    },
    /// `left <op> right`; indexing uses the operator `"["`.
    Infix {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `if (<condition>) { ... } else { ... }`.
    If {
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
    /// `[a, b, c]`.
    Array(Vec<Expression>),
    /// `{k: v, ...}` with pairs in source order.
    Hash(Vec<(Expression, Expression)>),
    /// A function literal. `name` is set when the literal is bound directly
    /// by a `let` statement, enabling self-recursion.
    Function {
        name: Option<String>,
        parameters: Vec<String>,
        body: Block,
    },
    /// `callee(arg, ...)`.
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Integer(n) => write!(f, "{}", n),
            Expression::Boolean(b) => write!(f, "{}", b),
            Expression::Str(s) => write!(f, "\"{}\"", s),
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::Prefix { operator, operand } => {
                write!(f, "({}{})", operator, operand)
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                if operator == "[" {
                    write!(f, "({}[{}])", left, right)
                } else {
                    write!(f, "({} {} {})", left, operator, right)
                }
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Expression::Array(elements) => {
                write!(f, "[{}]", join(elements))
            }
            Expression::Hash(pairs) => {
                let rendered: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Expression::Function {
                name,
                parameters,
                body,
            } => {
                write!(f, "fn")?;
                if let Some(name) = name {
                    write!(f, "<{}>", name)?;
                }
                write!(f, "({}) {}", parameters.join(", "), body)
            }
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{}({})", function, join(arguments))
            }
        }
    }
}

fn join(expressions: &[Expression]) -> String {
    let rendered: Vec<String> = expressions.iter().map(|e| e.to_string()).collect();
    rendered.join(", ")
}
