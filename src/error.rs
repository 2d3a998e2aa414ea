use thiserror::Error;

use crate::builtin::Arity;


#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character {character:?} at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },

    #[error("malformed number `{text}` at offset {offset}")]
    MalformedNumber { text: String, offset: usize },

    #[error("malformed boolean `{text}` at offset {offset}, expected `#t` or `#f`")]
    MalformedBoolean { text: String, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no expressions to parse")]
    EmptyInput,

    #[error("unexpected `)`")]
    UnexpectedRightBracket,

    #[error("missing `)` before end of input")]
    UnterminatedList,

    #[error("cannot evaluate an empty form `()`")]
    EmptyForm,

    #[error("malformed `{form}`: expected {expected}")]
    MalformedForm { form: &'static str, expected: &'static str },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unbound variable `{0}`")]
    UnboundVariable(String),

    #[error("cannot call a {0}, only closures are callable")]
    NotCallable(&'static str),

    #[error("`{context}` expected a {expected}, found a {found}")]
    TypeMismatch { context: String, expected: &'static str, found: &'static str },

    #[error("`{callee}` takes {expected} argument(s), got {found}")]
    ArityMismatch { callee: String, expected: Arity, found: usize },

    #[error("`map` needs lists of equal length, got lengths {0:?}")]
    LengthMismatch(Vec<usize>),
}

/// Any failure of the lex → parse → evaluate pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SevenError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}
