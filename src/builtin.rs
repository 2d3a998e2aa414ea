use core::fmt;

use crate::{error::EvalError, interpreter::{evaluate, Environment, EvalResult, Expression, Value}};


/// The fixed set of operators resolved structurally by the parser rather
/// than through the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOp {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Greater,
    Equal,
    GreaterEqual,
    LessEqual,
    NotEqual,
    And,
    Or,
    Not,
    Max,
    Min,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    // Uses the first n operands and ignores the rest
    Leading(usize),
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(&self, count: usize) -> bool {
        match self {
            Self::Leading(minimum) | Self::AtLeast(minimum) => count >= *minimum,
            Self::Exact(expected) => count == *expected,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leading(count) | Self::Exact(count) => write!(f, "{}", count),
            Self::AtLeast(count) => write!(f, "at least {}", count),
        }
    }
}

impl BuiltinOp {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "<" => Self::Less,
            ">" => Self::Greater,
            "=" => Self::Equal,
            ">=" => Self::GreaterEqual,
            "<=" => Self::LessEqual,
            "!=" => Self::NotEqual,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "max" => Self::Max,
            "min" => Self::Min,
            _ => return None
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Equal => "=",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::NotEqual => "!=",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    /// Binary and unary operators use only their leading operands; anything
    /// past those is ignored and never evaluated.
    pub fn arity(&self) -> Arity {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Max | Self::Min => Arity::AtLeast(1),
            Self::Not => Arity::Leading(1),
            _ => Arity::Leading(2),
        }
    }

    fn arity_error(&self, found: usize) -> EvalError {
        EvalError::ArityMismatch { callee: self.name().to_owned(), expected: self.arity(), found }
    }

    /// Evaluates the operands this operator uses, in order, in the caller's
    /// environment, then applies it.
    pub(crate) fn evaluate(&self, arguments: &[Expression], environment: &Environment) -> EvalResult {
        let used = match self.arity() {
            Arity::Leading(count) => arguments.get(..count).ok_or_else(|| self.arity_error(arguments.len()))?,
            Arity::Exact(_) | Arity::AtLeast(_) => arguments,
        };

        let values = used.iter()
            .map(|argument| evaluate(argument, environment))
            .collect::<Result<Vec<_>, _>>()?;

        self.apply(values)
    }

    pub(crate) fn apply(&self, values: Vec<Value>) -> EvalResult {
        if !self.arity().accepts(values.len()) { return Err(self.arity_error(values.len())); }

        match self {
            Self::Add => self.fold(values, |a, b| a + b),
            Self::Sub => self.fold(values, |a, b| a - b),
            Self::Mul => self.fold(values, |a, b| a * b),
            Self::Div => self.fold(values, |a, b| a / b),
            Self::Max => self.fold(values, f64::max),
            Self::Min => self.fold(values, f64::min),

            Self::Less => self.compare(&values, |a, b| a < b),
            Self::Greater => self.compare(&values, |a, b| a > b),
            Self::Equal => self.compare(&values, |a, b| a == b),
            Self::GreaterEqual => self.compare(&values, |a, b| a >= b),
            Self::LessEqual => self.compare(&values, |a, b| a <= b),
            Self::NotEqual => self.compare(&values, |a, b| a != b),

            Self::And => Ok(Value::Bool(self.boolean(&values[0])? & self.boolean(&values[1])?)),
            Self::Or => Ok(Value::Bool(self.boolean(&values[0])? | self.boolean(&values[1])?)),
            Self::Not => Ok(Value::Bool(!self.boolean(&values[0])?)),
        }
    }

    fn number(&self, value: &Value) -> Result<f64, EvalError> {
        match value {
            Value::Number(number) => Ok(*number),
            other => Err(self.type_error("number", other))
        }
    }

    fn boolean(&self, value: &Value) -> Result<bool, EvalError> {
        match value {
            Value::Bool(boolean) => Ok(*boolean),
            other => Err(self.type_error("boolean", other))
        }
    }

    fn type_error(&self, expected: &'static str, found: &Value) -> EvalError {
        EvalError::TypeMismatch { context: self.name().to_owned(), expected, found: found.kind() }
    }

    fn fold(&self, values: Vec<Value>, f: impl Fn(f64, f64) -> f64) -> EvalResult {
        let numbers = values.iter()
            .map(|value| self.number(value))
            .collect::<Result<Vec<_>, _>>()?;

        numbers.into_iter()
            .reduce(f)
            .map(Value::Number)
            .ok_or_else(|| self.arity_error(0))
    }

    fn compare(&self, values: &[Value], f: impl Fn(f64, f64) -> bool) -> EvalResult {
        Ok(Value::Bool(f(self.number(&values[0])?, self.number(&values[1])?)))
    }
}

impl fmt::Display for BuiltinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[f64]) -> Vec<Value> {
        values.iter().copied().map(Value::Number).collect()
    }

    #[test]
    fn names_round_trip() {
        for name in ["+", "-", "*", "/", "<", ">", "=", ">=", "<=", "!=", "and", "or", "not", "max", "min"] {
            assert_eq!(BuiltinOp::from_name(name).map(|op| op.name()), Some(name));
        }
        assert_eq!(BuiltinOp::from_name("list"), None);
        assert_eq!(BuiltinOp::from_name("define"), None);
    }

    #[test]
    fn arithmetic_folds_left_to_right() -> anyhow::Result<()> {
        assert_eq!(BuiltinOp::Sub.apply(numbers(&[10.0, 3.0, 2.0]))?, Value::Number(5.0));
        assert_eq!(BuiltinOp::Div.apply(numbers(&[8.0, 2.0, 2.0]))?, Value::Number(2.0));
        assert_eq!(BuiltinOp::Sub.apply(numbers(&[5.0]))?, Value::Number(5.0));
        assert_eq!(BuiltinOp::Max.apply(numbers(&[1.0, 7.0, 3.0]))?, Value::Number(7.0));
        assert_eq!(BuiltinOp::Min.apply(numbers(&[4.0, -2.0, 3.0]))?, Value::Number(-2.0));
        Ok(())
    }

    #[test]
    fn comparisons_ignore_extra_operands() -> anyhow::Result<()> {
        assert_eq!(BuiltinOp::Less.apply(numbers(&[1.0, 2.0, 0.0]))?, Value::Bool(true));
        assert_eq!(BuiltinOp::NotEqual.apply(numbers(&[1.0, 1.0]))?, Value::Bool(false));
        assert_eq!(BuiltinOp::Not.apply(vec![Value::Bool(false), Value::Number(1.0)])?, Value::Bool(true));
        Ok(())
    }

    #[test]
    fn leading_arity_tolerates_extra_operands() {
        assert!(Arity::Leading(2).accepts(3));
        assert!(!Arity::Leading(2).accepts(1));
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(3));
        assert_eq!(BuiltinOp::Greater.apply(numbers(&[2.0, 1.0, 5.0])), Ok(Value::Bool(true)));
    }

    #[test]
    fn missing_operands_are_arity_errors() {
        assert_eq!(
            BuiltinOp::Greater.apply(numbers(&[1.0])),
            Err(EvalError::ArityMismatch { callee: ">".to_owned(), expected: Arity::Leading(2), found: 1 })
        );
        assert!(matches!(BuiltinOp::Add.apply(vec![]), Err(EvalError::ArityMismatch { found: 0, .. })));
        assert!(matches!(BuiltinOp::Not.apply(vec![]), Err(EvalError::ArityMismatch { .. })));
    }

    #[test]
    fn wrong_operand_kind_is_a_type_error() {
        assert_eq!(
            BuiltinOp::Add.apply(vec![Value::Number(1.0), Value::Bool(true)]),
            Err(EvalError::TypeMismatch { context: "+".to_owned(), expected: "number", found: "boolean" })
        );
        assert!(matches!(
            BuiltinOp::And.apply(numbers(&[1.0, 0.0])),
            Err(EvalError::TypeMismatch { expected: "boolean", .. })
        ));
    }
}
