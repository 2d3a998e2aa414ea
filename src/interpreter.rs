use core::fmt;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

use itertools::Itertools;
use serde::{Serialize, Serializer};

use crate::{builtin::{Arity, BuiltinOp}, error::EvalError};

pub type EvalResult = Result<Value, EvalError>;


/// Executable form of a program, produced by lowering the parsed sexps.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    NumberLiteral(f64),
    BoolLiteral(bool),
    StringLiteral(Rc<str>),
    // An already evaluated value, such as a bound call argument
    Value(Value),
    Variable(Rc<str>),
    Define { name: Rc<str>, value: Rc<Expression> },
    If { test: Box<Expression>, then_branch: Box<Expression>, else_branch: Box<Expression> },
    Lambda(Rc<Lambda>),
    Call { callee: Box<Expression>, arguments: Vec<Expression> },
    Builtin { op: BuiltinOp, arguments: Vec<Expression> },
    List(Vec<Expression>),
    Map { procedure: Procedure, lists: Vec<Expression> },
}

/// The procedure position of a `map` form.
#[derive(Debug, Clone, PartialEq)]
pub enum Procedure {
    Builtin(BuiltinOp),
    Expression(Box<Expression>),
}

#[derive(Debug, PartialEq)]
pub struct Lambda {
    pub parameters: Vec<Rc<str>>,
    pub body: Expression,
}

#[derive(Clone)]
pub enum Value {
    Number(f64),
    Bool(bool),
    String(Rc<str>),
    Closure(Closure),
    List(Vec<Value>),
    Unspecified,
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::String(_) => "string",
            Self::Closure(_) => "closure",
            Self::List(_) => "list",
            Self::Unspecified => "unspecified value",
        }
    }

    /// A value is already fully evaluated.
    pub fn evaluate(&self, _environment: &Environment) -> EvalResult {
        Ok(self.clone())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Closure(a), Self::Closure(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Unspecified, Self::Unspecified) => true,
            _ => false
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{}", number),
            Self::Bool(true) => write!(f, "#t"),
            Self::Bool(false) => write!(f, "#f"),
            Self::String(string) => write!(f, "{}", string),
            Self::Closure(_) => write!(f, "#<lambda>"),
            Self::List(values) => write!(f, "({})", values.iter().join(" ")),
            Self::Unspecified => write!(f, "#<unspecified>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(string) => write!(f, "{:?}", string),
            Self::Closure(closure) => write!(f, "{:?}", closure),
            Self::List(values) => f.debug_list().entries(values).finish(),
            other => write!(f, "{}", other)
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(number) => serializer.serialize_f64(*number),
            Self::Bool(boolean) => serializer.serialize_bool(*boolean),
            Self::String(string) => serializer.serialize_str(string),
            Self::Closure(_) => serializer.serialize_str("#<lambda>"),
            Self::List(values) => serializer.collect_seq(values),
            Self::Unspecified => serializer.serialize_unit(),
        }
    }
}

/// A lambda paired with the scope it was evaluated in.
#[derive(Clone)]
pub struct Closure {
    lambda: Rc<Lambda>,
    environment: Environment,
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.lambda, &other.lambda) && self.environment == other.environment
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<lambda ({})>", self.lambda.parameters.iter().join(" "))
    }
}

impl Closure {
    /// Binds the arguments in a fresh scope chained to the captured one and
    /// evaluates the body there.
    pub fn apply(&self, arguments: Vec<Value>) -> EvalResult {
        let parameters = &self.lambda.parameters;
        if arguments.len() != parameters.len() {
            return Err(EvalError::ArityMismatch {
                callee: format!("(lambda ({}) ...)", parameters.iter().join(" ")),
                expected: Arity::Exact(parameters.len()),
                found: arguments.len(),
            });
        }

        tracing::trace!(parameters = %parameters.iter().join(" "), "applying closure");

        let frame = Environment::enclosed(&self.environment);
        for (parameter, argument) in parameters.iter().zip(arguments) {
            frame.define(parameter.clone(), Expression::Value(argument));
        }

        evaluate(&self.lambda.body, &frame)
    }
}

struct Scope {
    bindings: RefCell<HashMap<Rc<str>, Rc<Expression>>>,
    parent: Option<Environment>,
}

/// A chain of scopes mapping names to unevaluated expressions. Cloning an
/// environment shares the underlying scope.
#[derive(Clone)]
pub struct Environment(Rc<Scope>);

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.0.bindings.borrow().keys().sorted().collect_vec())
            .field("parent", &self.0.parent)
            .finish()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self(Rc::new(Scope { bindings: RefCell::new(HashMap::new()), parent: None }))
    }

    pub fn enclosed(parent: &Environment) -> Self {
        Self(Rc::new(Scope { bindings: RefCell::new(HashMap::new()), parent: Some(parent.clone()) }))
    }

    /// Binds `name` in this scope, replacing any previous binding.
    pub fn define(&self, name: impl Into<Rc<str>>, expression: impl Into<Rc<Expression>>) {
        self.0.bindings.borrow_mut().insert(name.into(), expression.into());
    }

    pub fn get(&self, name: &str) -> Option<Rc<Expression>> {
        self.resolve(name).map(|(expression, _)| expression)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    // Finds the binding along with the scope that owns it
    fn resolve(&self, name: &str) -> Option<(Rc<Expression>, Environment)> {
        if let Some(expression) = self.0.bindings.borrow().get(name) {
            return Some((expression.clone(), self.clone()))
        }
        self.0.parent.as_ref().and_then(|parent| parent.resolve(name))
    }
}

fn evaluate_variable(name: &str, environment: &Environment) -> EvalResult {
    // Bindings hold unevaluated expressions, so a variable is evaluated at
    // every lookup, in the scope that owns its binding
    match environment.resolve(name) {
        Some((expression, owner)) => evaluate(&expression, &owner),
        None => Err(EvalError::UnboundVariable(name.to_owned()))
    }
}

fn evaluate_define(name: &Rc<str>, value: &Rc<Expression>, environment: &Environment) -> EvalResult {
    tracing::debug!(%name, "binding");
    environment.define(name.clone(), value.clone());
    Ok(Value::Unspecified)
}

fn evaluate_if(test: &Expression, then_branch: &Expression, else_branch: &Expression, environment: &Environment) -> EvalResult {
    match evaluate(test, environment)? {
        Value::Bool(true) => evaluate(then_branch, environment),
        Value::Bool(false) => evaluate(else_branch, environment),
        other => Err(EvalError::TypeMismatch { context: "if".to_owned(), expected: "boolean", found: other.kind() })
    }
}

fn evaluate_list(elements: &[Expression], environment: &Environment) -> Result<Vec<Value>, EvalError> {
    elements.iter()
        .map(|element| evaluate(element, environment))
        .collect()
}

fn evaluate_call(callee: &Expression, arguments: &[Expression], environment: &Environment) -> EvalResult {
    let closure = match evaluate(callee, environment)? {
        Value::Closure(closure) => closure,
        other => return Err(EvalError::NotCallable(other.kind()))
    };

    closure.apply(evaluate_list(arguments, environment)?)
}

fn evaluate_map(procedure: &Procedure, lists: &[Expression], environment: &Environment) -> EvalResult {
    let lists = lists.iter()
        .map(|list| match evaluate(list, environment)? {
            Value::List(values) => Ok(values),
            other => Err(EvalError::TypeMismatch { context: "map".to_owned(), expected: "list", found: other.kind() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if !lists.iter().map(Vec::len).all_equal() {
        return Err(EvalError::LengthMismatch(lists.iter().map(Vec::len).collect()));
    }

    let apply: Box<dyn Fn(Vec<Value>) -> EvalResult> = match procedure {
        Procedure::Builtin(op) => {
            let op = *op;
            Box::new(move |arguments| op.apply(arguments))
        },
        Procedure::Expression(expression) => match evaluate(expression, environment)? {
            Value::Closure(closure) => Box::new(move |arguments| closure.apply(arguments)),
            other => return Err(EvalError::NotCallable(other.kind()))
        }
    };

    let length = lists.first().map_or(0, Vec::len);
    (0..length)
        .map(|index| apply(lists.iter().map(|list| list[index].clone()).collect()))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

pub fn evaluate(expression: &Expression, environment: &Environment) -> EvalResult {
    match expression {
        Expression::NumberLiteral(number) => Ok(Value::Number(*number)),
        Expression::BoolLiteral(boolean) => Ok(Value::Bool(*boolean)),
        Expression::StringLiteral(string) => Ok(Value::String(string.clone())),
        Expression::Value(value) => value.evaluate(environment),
        Expression::Variable(name) => evaluate_variable(name, environment),
        Expression::Define { name, value } => evaluate_define(name, value, environment),
        Expression::If { test, then_branch, else_branch } => evaluate_if(test, then_branch, else_branch, environment),
        Expression::Lambda(lambda) => Ok(Value::Closure(Closure { lambda: lambda.clone(), environment: environment.clone() })),
        Expression::Call { callee, arguments } => evaluate_call(callee, arguments, environment),
        Expression::Builtin { op, arguments } => op.evaluate(arguments, environment),
        Expression::List(elements) => evaluate_list(elements, environment).map(Value::List),
        Expression::Map { procedure, lists } => evaluate_map(procedure, lists, environment),
    }
}
