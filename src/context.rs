use crate::{error::{EvalError, SevenError}, interpreter::{evaluate, Environment, Expression, Value}, lexer::tokenize, parser::parse};


/// An evaluation session: one top-level environment that lives as long as
/// the context, shared by every source evaluated through it.
#[derive(Debug, Default)]
pub struct EvaluationContext {
    environment: Environment,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self { environment: Environment::new() }
    }

    /// Starts a session on top of bindings prepared by the host.
    pub fn with_environment(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn evaluate_expression(&self, expression: &Expression) -> Result<Value, EvalError> {
        evaluate(expression, &self.environment)
    }

    /// Lexes, parses and evaluates every top-level form of `source` in order,
    /// returning the value of the last one. Nothing is evaluated unless the
    /// whole source lexes and parses; after that, definitions made before an
    /// evaluation error stay in the environment.
    pub fn evaluate_str(&mut self, source: &str) -> Result<Value, SevenError> {
        tracing::debug!(bytes = source.len(), "evaluating source");

        let tokens = tokenize(source).collect::<Result<Vec<_>, _>>()?;
        let expressions = parse(tokens).collect::<Result<Vec<_>, _>>()?;

        let mut last = Value::Unspecified;
        for expression in &expressions {
            last = self.evaluate_expression(expression)?;
        }
        Ok(last)
    }
}
