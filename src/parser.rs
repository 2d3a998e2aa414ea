use std::{iter::Peekable, rc::Rc};

use crate::{builtin::BuiltinOp, error::ParseError, interpreter::{Expression, Lambda, Procedure}, lexer::Token};


// Sexps are the raw tree built from the tokens, before special forms are recognized
#[derive(Debug, PartialEq)]
pub enum Sexp<'a> {
    Atom(Token<'a>),
    List(Vec<Self>)
}

type ParseResult<O> = Result<O, ParseError>;

/// Keywords that introduce a form with fixed, non-evaluated structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialForm {
    Lambda,
    Define,
    If,
    List,
    Map,
}

impl SpecialForm {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "lambda" => Some(Self::Lambda),
            "define" => Some(Self::Define),
            "if" => Some(Self::If),
            "list" => Some(Self::List),
            "map" => Some(Self::Map),
            _ => None
        }
    }
}

/// What the head of a list form turns it into.
enum Head<'s, 'a> {
    Builtin(BuiltinOp),
    Form(SpecialForm),
    Call(&'s Sexp<'a>),
}

fn classify<'s, 'a>(head: &'s Sexp<'a>) -> Head<'s, 'a> {
    if let Sexp::Atom(Token::Identifier(name)) = head {
        if let Some(op) = BuiltinOp::from_name(name) { return Head::Builtin(op) }
        if let Some(form) = SpecialForm::from_name(name) { return Head::Form(form) }
    }
    Head::Call(head)
}

fn identifier<'a>(sexp: &Sexp<'a>) -> Option<&'a str> {
    match sexp {
        Sexp::Atom(Token::Identifier(name)) => Some(*name),
        _ => None
    }
}

fn lower_all<'a>(sexps: &[Sexp<'a>]) -> ParseResult<Vec<Expression>> {
    sexps.iter().map(lower).collect()
}

fn lower_atom(token: &Token<'_>) -> Expression {
    match token {
        Token::Number(number) => Expression::NumberLiteral(*number),
        Token::Boolean(boolean) => Expression::BoolLiteral(*boolean),
        Token::String(literal) => Expression::StringLiteral((*literal).into()),
        Token::Identifier(name) => Expression::Variable((*name).into()),
        other => Expression::Variable(other.to_string().into())
    }
}

fn lower_lambda<'a>(list: &[Sexp<'a>]) -> ParseResult<Expression> {
    // (lambda (parameters...) body)
    let malformed = ParseError::MalformedForm { form: "lambda", expected: "a parameter list of identifiers and one body expression" };

    let [Sexp::List(parameters), body] = list else { return Err(malformed) };
    let parameters = parameters.iter()
        .map(|parameter| identifier(parameter).map(Rc::from))
        .collect::<Option<Vec<_>>>()
        .ok_or(malformed)?;

    Ok(Expression::Lambda(Rc::new(Lambda { parameters, body: lower(body)? })))
}

fn lower_define<'a>(list: &[Sexp<'a>]) -> ParseResult<Expression> {
    // (define name value)
    let malformed = ParseError::MalformedForm { form: "define", expected: "an identifier and one value expression" };

    let [name, value] = list else { return Err(malformed) };
    let name = identifier(name).ok_or(malformed)?;

    Ok(Expression::Define { name: name.into(), value: Rc::new(lower(value)?) })
}

fn lower_if<'a>(list: &[Sexp<'a>]) -> ParseResult<Expression> {
    let [test, then_branch, else_branch] = list else {
        return Err(ParseError::MalformedForm { form: "if", expected: "a test, a consequent and an alternative" })
    };

    Ok(Expression::If {
        test: Box::new(lower(test)?),
        then_branch: Box::new(lower(then_branch)?),
        else_branch: Box::new(lower(else_branch)?),
    })
}

fn lower_map<'a>(list: &[Sexp<'a>]) -> ParseResult<Expression> {
    // (map procedure list...), where a built-in operator may stand in as the procedure
    let [procedure, lists @ ..] = list else {
        return Err(ParseError::MalformedForm { form: "map", expected: "a procedure and at least one list" })
    };
    if lists.is_empty() {
        return Err(ParseError::MalformedForm { form: "map", expected: "a procedure and at least one list" })
    }

    let procedure = match identifier(procedure).and_then(BuiltinOp::from_name) {
        Some(op) => Procedure::Builtin(op),
        None => Procedure::Expression(Box::new(lower(procedure)?))
    };

    Ok(Expression::Map { procedure, lists: lower_all(lists)? })
}

fn lower_form<'a>(form: SpecialForm, list: &[Sexp<'a>]) -> ParseResult<Expression> {
    match form {
        SpecialForm::Lambda => lower_lambda(list),
        SpecialForm::Define => lower_define(list),
        SpecialForm::If => lower_if(list),
        SpecialForm::List => Ok(Expression::List(lower_all(list)?)),
        SpecialForm::Map => lower_map(list),
    }
}

/// Turns a sexp into its executable expression, recognizing special forms
/// and built-in operators by the head of each list.
pub fn lower(sexp: &Sexp<'_>) -> ParseResult<Expression> {
    let list = match sexp {
        Sexp::Atom(token) => return Ok(lower_atom(token)),
        Sexp::List(list) => list
    };

    let [head, rest @ ..] = list.as_slice() else { return Err(ParseError::EmptyForm) };
    match classify(head) {
        Head::Builtin(op) => Ok(Expression::Builtin { op, arguments: lower_all(rest)? }),
        Head::Form(form) => lower_form(form, rest),
        Head::Call(callee) => Ok(Expression::Call { callee: Box::new(lower(callee)?), arguments: lower_all(rest)? }),
    }
}

/// Lazy sequence of top-level expressions. Comments and the end marker are
/// skipped; the sequence ends after the first error.
pub struct Expressions<I: Iterator> {
    tokens: Peekable<I>,
    started: bool,
    finished: bool,
}

impl<'a, I: Iterator<Item = Token<'a>>> Expressions<I> {
    fn skip_trivia(&mut self) {
        while self.tokens.next_if(Token::is_trivia).is_some() {}
    }

    fn parse_sexp(&mut self) -> ParseResult<Sexp<'a>> {
        match self.tokens.next() {
            None => Err(ParseError::UnterminatedList),
            Some(Token::RightBracket) => Err(ParseError::UnexpectedRightBracket),
            Some(Token::LeftBracket) => self.parse_list(),
            Some(token) => Ok(Sexp::Atom(token)),
        }
    }

    fn parse_list(&mut self) -> ParseResult<Sexp<'a>> {
        let mut children = vec![];

        loop {
            self.skip_trivia();
            match self.tokens.peek() {
                None => return Err(ParseError::UnterminatedList),
                Some(Token::RightBracket) => {
                    self.tokens.next();
                    return Ok(Sexp::List(children))
                },
                Some(_) => children.push(self.parse_sexp()?),
            }
        }
    }
}

impl<'a, I: Iterator<Item = Token<'a>>> Iterator for Expressions<I> {
    type Item = ParseResult<Expression>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished { return None; }

        self.skip_trivia();
        if self.tokens.peek().is_none() {
            self.finished = true;
            return (!self.started).then_some(Err(ParseError::EmptyInput));
        }
        self.started = true;

        let result = self.parse_sexp().and_then(|sexp| lower(&sexp));
        self.finished = result.is_err();
        Some(result)
    }
}

impl<'a, I: Iterator<Item = Token<'a>>> core::iter::FusedIterator for Expressions<I> {}

pub fn parse<'a, I: IntoIterator<Item = Token<'a>>>(tokens: I) -> Expressions<I::IntoIter> {
    Expressions { tokens: tokens.into_iter().peekable(), started: false, finished: false }
}
