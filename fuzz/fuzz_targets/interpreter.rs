#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Built-in operators, literals and loads from variables
#[derive(Arbitrary, Debug)]
enum SevenAtom {
    Add, Sub, Mul, Div,
    Less, Greater, Equal,
    GreaterEqual, LessEqual, NotEqual,
    And, Or, Not, Max, Min,
    True, False,

    Identifier(String),
    Text(String),
    Number(f64),
}

impl fmt::Display for SevenAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            SevenAtom::Add => "+",
            SevenAtom::Sub => "-",
            SevenAtom::Mul => "*",
            SevenAtom::Div => "/",
            SevenAtom::Less => "<",
            SevenAtom::Greater => ">",
            SevenAtom::Equal => "=",
            SevenAtom::GreaterEqual => ">=",
            SevenAtom::LessEqual => "<=",
            SevenAtom::NotEqual => "!=",
            SevenAtom::And => "and",
            SevenAtom::Or => "or",
            SevenAtom::Not => "not",
            SevenAtom::Max => "max",
            SevenAtom::Min => "min",
            SevenAtom::True => "#t",
            SevenAtom::False => "#f",
            SevenAtom::Identifier(identifier) => identifier,
            SevenAtom::Text(text) => return write!(f, "\"{}\"", text.replace('"', "")),
            SevenAtom::Number(value) => return write!(f, "{}", value.abs()),
        })
    }
}

#[derive(Arbitrary, Debug)]
enum SevenCommand {
    Lambda(Vec<SevenCommand>),
    Define(Vec<SevenCommand>),
    If(Vec<SevenCommand>),
    List(Vec<SevenCommand>),
    Map(Vec<SevenCommand>),
    Call(Vec<SevenCommand>),

    Atom(SevenAtom),
}

fn stringify_arguments(values: &[SevenCommand]) -> String {
    values.iter()
        .map(SevenCommand::to_string)
        .join(" ")
}

impl fmt::Display for SevenCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (head, args) = match self {
            SevenCommand::Atom(atom) => return write!(f, "{}", atom),
            SevenCommand::Call(args) => return write!(f, "({})", stringify_arguments(args)),
            SevenCommand::Lambda(args) => ("lambda", args),
            SevenCommand::Define(args) => ("define", args),
            SevenCommand::If(args) => ("if", args),
            SevenCommand::List(args) => ("list", args),
            SevenCommand::Map(args) => ("map", args),
        };

        write!(f, "({} {})", head, stringify_arguments(args))
    }
}

fuzz_target!(|commands: Vec<SevenCommand>| {
    let mut context = seven::EvaluationContext::new();

    for command in commands {
        let _ = context.evaluate_str(&command.to_string());
    }
});
