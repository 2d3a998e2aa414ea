mod builtin;
mod context;
mod error;
mod interpreter;
mod lexer;
mod parser;

#[cfg(test)]
mod test_utils;

pub use builtin::{Arity, BuiltinOp};
pub use context::EvaluationContext;
pub use error::{EvalError, LexError, ParseError, SevenError};
pub use interpreter::{evaluate, Closure, Environment, EvalResult, Expression, Lambda, Procedure, Value};
pub use lexer::{tokenize, Token, Tokens};
pub use parser::{parse, Expressions};

/// Evaluates `source` in a fresh session and returns the value of its last form.
pub fn run(source: &str) -> Result<Value, SevenError> {
    EvaluationContext::new().evaluate_str(source)
}
