// langur-core - Tree-walking evaluator for Langur
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tree-walking evaluator.
//!
//! Executes the AST directly against an [`Env`] chain. Semantics match the
//! bytecode VM exactly: same operator typing rules, same truthiness, same
//! built-in behaviour. Return statements unwind through [`Error::Return`].

use std::rc::Rc;

use im::{HashMap, Vector};

use langur_parser::ast::{Block, Expression, Program, Statement};

use crate::builtins;
use crate::env::Env;
use crate::error::{Error, Result};
use crate::object::{Function, HashPair, Object};

/// Evaluate a program. A top-level `return` yields its value.
pub fn eval_program(program: &Program, env: &Env) -> Result<Object> {
    let mut result = Object::Null;
    for statement in &program.statements {
        match eval_statement(statement, env) {
            Ok(value) => result = value,
            Err(Error::Return(value)) => return Ok(value),
            Err(err) => return Err(err),
        }
    }
    Ok(result)
}

fn eval_statement(statement: &Statement, env: &Env) -> Result<Object> {
    match statement {
        Statement::Let { name, value } => {
            let value = eval_expression(value, env)?;
            env.define(name.clone(), value);
            Ok(Object::Null)
        }
        Statement::Return(value) => {
            let value = eval_expression(value, env)?;
            Err(Error::Return(value))
        }
        Statement::Expression(value) => eval_expression(value, env),
    }
}

fn eval_block(block: &Block, env: &Env) -> Result<Object> {
    let mut result = Object::Null;
    for statement in &block.statements {
        result = eval_statement(statement, env)?;
    }
    Ok(result)
}

/// Evaluate a single expression.
pub fn eval_expression(expression: &Expression, env: &Env) -> Result<Object> {
    match expression {
        Expression::Integer(n) => Ok(Object::Int(*n)),
        Expression::Boolean(b) => Ok(Object::Bool(*b)),
        Expression::Str(s) => Ok(Object::string(s)),

        Expression::Identifier(name) => env
            .lookup(name)
            .or_else(|| builtins::lookup(name).map(Object::Builtin))
            .ok_or_else(|| Error::UndefinedSymbol(name.clone())),

        Expression::Prefix { operator, operand } => {
            let operand = eval_expression(operand, env)?;
            eval_prefix(operator, operand)
        }

        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left = eval_expression(left, env)?;
            let right = eval_expression(right, env)?;
            if operator == "[" {
                eval_index(left, right)
            } else {
                eval_infix(operator, left, right)
            }
        }

        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env)?;
            if condition.is_truthy() {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                Ok(Object::Null)
            }
        }

        Expression::Array(elements) => {
            let mut out = Vector::new();
            for element in elements {
                out.push_back(eval_expression(element, env)?);
            }
            Ok(Object::Array(out))
        }

        Expression::Hash(pairs) => {
            let mut out = HashMap::new();
            for (key_expr, value_expr) in pairs {
                let key = eval_expression(key_expr, env)?;
                let value = eval_expression(value_expr, env)?;
                let hash_key = key.hash_key().ok_or(Error::NotHashable(key.kind()))?;
                out.insert(hash_key, HashPair { key, value });
            }
            Ok(Object::Hash(out))
        }

        Expression::Function {
            parameters, body, ..
        } => Ok(Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: env.clone(),
        }))),

        Expression::Call {
            function,
            arguments,
        } => {
            let function = eval_expression(function, env)?;
            let mut args = Vec::with_capacity(arguments.len());
            for argument in arguments {
                args.push(eval_expression(argument, env)?);
            }
            apply(function, &args)
        }
    }
}

/// Call a function value with already-evaluated arguments.
pub fn apply(function: Object, args: &[Object]) -> Result<Object> {
    match function {
        Object::Function(func) => {
            if args.len() != func.parameters.len() {
                return Err(Error::Arity {
                    expected: func.parameters.len(),
                    got: args.len(),
                });
            }
            let scope = func.env.child();
            for (parameter, arg) in func.parameters.iter().zip(args) {
                scope.define(parameter.clone(), arg.clone());
            }
            match eval_block(&func.body, &scope) {
                Ok(value) => Ok(value),
                Err(Error::Return(value)) => Ok(value),
                Err(err) => Err(err),
            }
        }
        Object::Builtin(builtin) => Ok((builtin.func)(args)),
        other => Err(Error::NotCallable(other.kind())),
    }
}

fn eval_prefix(operator: &str, operand: Object) -> Result<Object> {
    match operator {
        "!" => Ok(Object::Bool(!operand.is_truthy())),
        "-" => match operand {
            Object::Int(n) => Ok(Object::Int(-n)),
            other => Err(Error::UnknownPrefixOperator {
                operator: operator.to_string(),
                operand: other.kind(),
            }),
        },
        _ => Err(Error::UnknownPrefixOperator {
            operator: operator.to_string(),
            operand: operand.kind(),
        }),
    }
}

fn eval_infix(operator: &str, left: Object, right: Object) -> Result<Object> {
    match (&left, &right) {
        (Object::Int(l), Object::Int(r)) => eval_integer_infix(operator, *l, *r),
        (Object::Str(l), Object::Str(r)) => match operator {
            "+" => {
                let mut out = String::with_capacity(l.len() + r.len());
                out.push_str(l);
                out.push_str(r);
                Ok(Object::string(out))
            }
            "==" => Ok(Object::Bool(l == r)),
            "!=" => Ok(Object::Bool(l != r)),
            _ => Err(unknown_operator(operator, &left, &right)),
        },
        (Object::Bool(l), Object::Bool(r)) => match operator {
            "==" => Ok(Object::Bool(l == r)),
            "!=" => Ok(Object::Bool(l != r)),
            _ => Err(unknown_operator(operator, &left, &right)),
        },
        _ => Err(unknown_operator(operator, &left, &right)),
    }
}

fn eval_integer_infix(operator: &str, left: i64, right: i64) -> Result<Object> {
    match operator {
        "+" => Ok(Object::Int(left + right)),
        "-" => Ok(Object::Int(left - right)),
        "*" => Ok(Object::Int(left * right)),
        "/" => {
            if right == 0 {
                Err(Error::DivisionByZero)
            } else {
                Ok(Object::Int(left / right))
            }
        }
        "==" => Ok(Object::Bool(left == right)),
        "!=" => Ok(Object::Bool(left != right)),
        "<" => Ok(Object::Bool(left < right)),
        "<=" => Ok(Object::Bool(left <= right)),
        ">" => Ok(Object::Bool(left > right)),
        ">=" => Ok(Object::Bool(left >= right)),
        _ => Err(Error::UnknownOperator {
            operator: operator.to_string(),
            left: "INTEGER",
            right: "INTEGER",
        }),
    }
}

fn eval_index(left: Object, index: Object) -> Result<Object> {
    match (&left, &index) {
        (Object::Array(elements), Object::Int(i)) => {
            if *i < 0 {
                return Ok(Object::Null);
            }
            Ok(elements.get(*i as usize).cloned().unwrap_or(Object::Null))
        }
        (Object::Array(_), other) => Err(Error::IndexNotSupported(other.kind())),
        (Object::Hash(pairs), key) => {
            let hash_key = key.hash_key().ok_or(Error::NotHashable(key.kind()))?;
            Ok(pairs
                .get(&hash_key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Object::Null))
        }
        _ => Err(Error::IndexNotSupported(left.kind())),
    }
}

fn unknown_operator(operator: &str, left: &Object, right: &Object) -> Error {
    Error::UnknownOperator {
        operator: operator.to_string(),
        left: left.kind(),
        right: right.kind(),
    }
}
