use core::fmt;

use logos::Logos;

use crate::error::LexError;


// Failures raised from inside the logos callbacks. The default variant is what
// logos reports when no rule matches at all.
#[derive(Debug, Default, Clone, PartialEq)]
enum LexFailure {
    #[default]
    Unrecognized,
    MalformedNumber,
    MalformedBoolean,
}

fn boolean<'a>(lex: &mut logos::Lexer<'a, Lexeme<'a>>) -> Result<bool, LexFailure> {
    match lex.slice() {
        "#t" => Ok(true),
        "#f" => Ok(false),
        _ => Err(LexFailure::MalformedBoolean)
    }
}

fn string_contents<'a>(lex: &mut logos::Lexer<'a, Lexeme<'a>>) -> &'a str {
    // An unterminated string runs to the end of the input
    let contents = &lex.slice()[1..];
    contents.strip_suffix('"').unwrap_or(contents)
}

#[derive(Debug, Logos)]
#[logos(skip r"[ \r\n]+")]
#[logos(error = LexFailure)]
enum Lexeme<'a> {
    #[token("(")]
    LeftBracket,

    #[token(")")]
    RightBracket,

    #[regex(r"[0-9][0-9.]*", |lex| lex.slice().parse::<f64>().map_err(|_| LexFailure::MalformedNumber))]
    Number(f64),

    #[regex(r"#.?", boolean)]
    Boolean(bool),

    #[regex(r#""[^"]*"?"#, string_contents)]
    String(&'a str),

    #[regex(r";[^\r\n]*", |lex| &lex.slice()[1..])]
    Comment(&'a str),

    #[regex(r"[\p{L}+*/=!<>-][\p{L}\p{Nd}+*/=!<>-]*", |lex| lex.slice())]
    Identifier(&'a str),
}

/// A single lexical unit of source text. Textual payloads borrow from the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    LeftBracket,
    RightBracket,
    Identifier(&'a str),
    Number(f64),
    Boolean(bool),
    String(&'a str),
    Comment(&'a str),
    EndOfStream,
}

impl<'a> Token<'a> {
    /// Comments and the end marker carry no meaning for the parser.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment(_) | Self::EndOfStream)
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftBracket => write!(f, "("),
            Self::RightBracket => write!(f, ")"),
            Self::Identifier(identifier) => write!(f, "{}", identifier),
            Self::Number(number) => write!(f, "{}", number),
            Self::Boolean(true) => write!(f, "#t"),
            Self::Boolean(false) => write!(f, "#f"),
            Self::String(literal) => write!(f, "{}", literal),
            Self::Comment(comment) => write!(f, "{}", comment),
            Self::EndOfStream => write!(f, "<EOF>"),
        }
    }
}

impl<'a> From<Lexeme<'a>> for Token<'a> {
    fn from(lexeme: Lexeme<'a>) -> Self {
        match lexeme {
            Lexeme::LeftBracket => Self::LeftBracket,
            Lexeme::RightBracket => Self::RightBracket,
            Lexeme::Number(number) => Self::Number(number),
            Lexeme::Boolean(boolean) => Self::Boolean(boolean),
            Lexeme::String(literal) => Self::String(literal),
            Lexeme::Comment(comment) => Self::Comment(comment),
            Lexeme::Identifier(identifier) => Self::Identifier(identifier),
        }
    }
}

/// Lazy token stream over a source string, terminated by exactly one
/// [`Token::EndOfStream`]. The stream ends early after the first error.
pub struct Tokens<'a> {
    lexer: logos::Lexer<'a, Lexeme<'a>>,
    finished: bool,
}

impl<'a> Tokens<'a> {
    fn describe(&self, failure: LexFailure) -> LexError {
        let offset = self.lexer.span().start;
        let text = self.lexer.slice().to_owned();

        match failure {
            LexFailure::MalformedNumber => LexError::MalformedNumber { text, offset },
            LexFailure::MalformedBoolean => LexError::MalformedBoolean { text, offset },
            LexFailure::Unrecognized => LexError::UnexpectedCharacter {
                character: self.lexer.source()[offset..].chars().next().unwrap_or_default(),
                offset,
            },
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished { return None; }

        match self.lexer.next() {
            Some(Ok(lexeme)) => Some(Ok(lexeme.into())),
            Some(Err(failure)) => {
                self.finished = true;
                Some(Err(self.describe(failure)))
            },
            None => {
                self.finished = true;
                Some(Ok(Token::EndOfStream))
            }
        }
    }
}

impl<'a> core::iter::FusedIterator for Tokens<'a> {}

pub fn tokenize(input: &str) -> Tokens<'_> {
    Tokens { lexer: Lexeme::lexer(input), finished: false }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn texts(input: &str) -> Result<Vec<String>, LexError> {
        tokenize(input).map_ok(|token| token.to_string()).collect()
    }

    #[test]
    fn lexes_expression_with_trailing_comment() -> anyhow::Result<()> {
        assert_eq!(texts("(+ 1.1 2);comment")?, ["(", "+", "1.1", "2", ")", "comment", "<EOF>"]);
        assert_eq!(texts("(+ 1.1 2);this is a comment.")?.iter().rev().nth(1).map(String::as_str), Some("this is a comment."));
        Ok(())
    }

    #[test]
    fn single_tokens_ignore_surrounding_whitespace() -> anyhow::Result<()> {
        for (input, expected) in [
            ("(", "("), (" ( ", "("),
            (")", ")"), (" ) ", ")"),
            ("begin", "begin"), (" begin ", "begin"),
            ("\"wow\"", "wow"), (" \"wow\" ", "wow"),
            ("0.5", "0.5"), (" 0.5 ", "0.5"),
            ("\r\n#t\n", "#t"),
        ] {
            assert_eq!(texts(input)?, [expected, "<EOF>"], "input {:?}", input);
        }
        Ok(())
    }

    #[test]
    fn stream_always_ends_with_one_end_marker() -> anyhow::Result<()> {
        for input in ["", "   ", "(define x 1)", "; only a comment", "(a (b c)) (d)"] {
            let tokens: Vec<Token> = tokenize(input).collect::<Result<_, _>>()?;
            assert_eq!(tokens.iter().filter(|token| **token == Token::EndOfStream).count(), 1);
            assert_eq!(tokens.last(), Some(&Token::EndOfStream));
        }
        Ok(())
    }

    #[test]
    fn recognizes_each_token_kind() -> anyhow::Result<()> {
        let tokens: Vec<Token> = tokenize("(f #t #f \"a b\" 12 <= != x2);c\n)").collect::<Result<_, _>>()?;
        assert_eq!(tokens, [
            Token::LeftBracket,
            Token::Identifier("f"),
            Token::Boolean(true),
            Token::Boolean(false),
            Token::String("a b"),
            Token::Number(12.0),
            Token::Identifier("<="),
            Token::Identifier("!="),
            Token::Identifier("x2"),
            Token::RightBracket,
            Token::Comment("c"),
            Token::RightBracket,
            Token::EndOfStream,
        ]);
        Ok(())
    }

    #[test]
    fn digits_start_a_number_even_before_letters() -> anyhow::Result<()> {
        let tokens: Vec<Token> = tokenize("1abc").collect::<Result<_, _>>()?;
        assert_eq!(tokens, [Token::Number(1.0), Token::Identifier("abc"), Token::EndOfStream]);
        Ok(())
    }

    #[test]
    fn unterminated_string_runs_to_end_of_input() -> anyhow::Result<()> {
        let tokens: Vec<Token> = tokenize("(\"open ended)").collect::<Result<_, _>>()?;
        assert_eq!(tokens, [Token::LeftBracket, Token::String("open ended)"), Token::EndOfStream]);
        Ok(())
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            texts("(+ 1.2.3 4)"),
            Err(LexError::MalformedNumber { text: "1.2.3".to_owned(), offset: 3 })
        );
        assert_eq!(
            texts("#x"),
            Err(LexError::MalformedBoolean { text: "#x".to_owned(), offset: 0 })
        );
        assert!(matches!(texts("#"), Err(LexError::MalformedBoolean { .. })));
        assert_eq!(
            texts("(a\tb)"),
            Err(LexError::UnexpectedCharacter { character: '\t', offset: 2 })
        );
        assert!(matches!(texts("[1]"), Err(LexError::UnexpectedCharacter { character: '[', offset: 0 })));
    }

    #[test]
    fn stops_after_the_first_error() {
        let mut tokens = tokenize("a $ b");
        assert_eq!(tokens.next(), Some(Ok(Token::Identifier("a"))));
        assert!(matches!(tokens.next(), Some(Err(_))));
        assert_eq!(tokens.next(), None);
    }
}
