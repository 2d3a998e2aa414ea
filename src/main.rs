use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rustyline::{error::ReadlineError, DefaultEditor};
use seven::{tokenize, EvaluationContext, Token, Value};

const PROMPT: &str = "> ";

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Source file to evaluate; starts a REPL when neither this nor --eval is given
    path: Option<PathBuf>,

    /// Evaluate the given source instead of a file
    #[arg(short, long, conflicts_with = "path")]
    eval: Option<String>,

    /// Print the token stream instead of evaluating
    #[arg(long)]
    tokens: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn print(&self, value: &Value) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(value)?);
        } else if *value != Value::Unspecified {
            println!("{}", value);
        }
        Ok(())
    }

    fn print_tokens(&self, source: &str) -> anyhow::Result<()> {
        for token in tokenize(source) {
            match token? {
                Token::EndOfStream => println!("<EOF>"),
                token => println!("{:?}\t{}", token, token),
            }
        }
        Ok(())
    }

    fn execute(&self, source: &str) -> anyhow::Result<()> {
        if self.tokens { return self.print_tokens(source); }

        let value = EvaluationContext::new().evaluate_str(source)?;
        self.print(&value)
    }

    fn repl(&self) -> anyhow::Result<()> {
        let mut context = EvaluationContext::new();
        let mut editor = DefaultEditor::new()?;

        loop {
            let line = match editor.readline(PROMPT) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            };
            if line.trim().is_empty() { continue; }
            editor.add_history_entry(line.as_str())?;

            if self.tokens {
                if let Err(err) = self.print_tokens(&line) { println!("Error: {}", err); }
                continue;
            }

            match context.evaluate_str(&line) {
                Ok(value) => self.print(&value)?,
                Err(err) => println!("Error: {}", err),
            }
        }

        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match (&cli.eval, &cli.path) {
        (Some(source), _) => cli.execute(source),
        (None, Some(path)) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            cli.execute(&source)
        },
        (None, None) => cli.repl(),
    }
}
