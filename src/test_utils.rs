use std::path::{Path, PathBuf};

use anyhow::bail;
use itertools::Itertools;
use serde::Deserialize;

use crate::{error::SevenError, interpreter::Value};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TestOutput {
    Unspecified,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<TestOutput>)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ErrorKind {
    LexError,
    ParseError,
    EvalError,
}

impl ErrorKind {
    pub fn of(error: &SevenError) -> Self {
        match error {
            SevenError::Lex(_) => Self::LexError,
            SevenError::Parse(_) => Self::ParseError,
            SevenError::Eval(_) => Self::EvalError,
        }
    }
}

// One line of a fixture file is either `{"ok": true, "output": ...}` or
// `{"ok": false, "type": "EvalError"}`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEntry {
    ok: bool,
    #[serde(default)]
    output: Option<TestOutput>,
    #[serde(rename = "type")]
    kind: Option<ErrorKind>,
}

#[derive(Debug, Clone)]
pub struct TestEvaluationResult(Result<TestOutput, ErrorKind>);

impl From<TestEvaluationResult> for Result<TestOutput, ErrorKind> {
    fn from(value: TestEvaluationResult) -> Self {
        value.0
    }
}

impl TryFrom<RawEntry> for TestEvaluationResult {
    type Error = anyhow::Error;

    fn try_from(entry: RawEntry) -> anyhow::Result<Self> {
        match entry {
            RawEntry { ok: true, output, kind: None } => Ok(Self(Ok(output.unwrap_or(TestOutput::Unspecified)))),
            RawEntry { ok: false, output: None, kind: Some(kind) } => Ok(Self(Err(kind))),
            other => bail!("Inconsistent test entry {:?}", other)
        }
    }
}

/// Compares an evaluated value against its expected output. Closures are
/// expected as the text `#<lambda>`.
pub fn matches_output(value: &Value, expected: &TestOutput) -> bool {
    match (value, expected) {
        (Value::Unspecified, TestOutput::Unspecified) => true,
        (Value::Bool(a), TestOutput::Bool(b)) => a == b,
        (Value::Number(a), TestOutput::Number(b)) => (a - b).abs() < 1.0e-9,
        (Value::String(a), TestOutput::Text(b)) => &**a == b.as_str(),
        (Value::Closure(_), TestOutput::Text(b)) => b == "#<lambda>",
        (Value::List(a), TestOutput::List(b)) => a.len() == b.len() && a.iter().zip(b).all(|(a, b)| matches_output(a, b)),
        _ => false
    }
}

fn load_input_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let source = std::fs::read_to_string(path)?;
    Ok(source.lines().map(str::to_owned).collect())
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<TestEvaluationResult>> {
    let source = std::fs::read(path)?;
    let entries: Vec<RawEntry> = serde_json::from_slice(&source)?;
    entries.into_iter().map(TestEvaluationResult::try_from).collect()
}

pub fn load_test_pair(testcase: &str) -> anyhow::Result<Vec<(String, TestEvaluationResult)>> {
    let base_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let input = load_input_file(base_path.join("test_inputs").join(format!("{}.scm", testcase)))?;
    let output = load_output_file(base_path.join("test_outputs").join(format!("{}.json", testcase)))?;

    if input.len() != output.len() { bail!("Input and output of testcase {} do not match", testcase); }
    Ok(input.into_iter().zip(output).collect_vec())
}

pub fn all_testcases() -> impl Iterator<Item = &'static str> {
    [
        "arithmetic",
        "booleans",
        "definitions",
        "closures",
        "recursion",
        "lists",
        "map",
        "strings",
        "errors",
    ].into_iter()
}
