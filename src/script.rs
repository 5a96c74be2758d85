//! Scripted sessions
//!
//! A script replays a sequence of user choices against a [`Session`]. Steps are separated by
//! whitespace and `#` starts a comment running to the end of the line:
//!
//! ```text
//! 'if' NAME:x '==' NUMBER:1 ':' NEWLINE   # literal and lexeme choices
//! INDENT NAME:print '(' STRING:"hi" ')'    # bare categories use the default token
//! <  >                                     # move the cursor left / right
//! ```
//!
//! A quoted step picks the alternative with that literal text. `CATEGORY:value` picks the first
//! alternative of that lexical category and commits it with `value`; the value runs to the next
//! whitespace unless it is quoted, in which case the quotes are kept.

use crate::error::EngineError;
use crate::session::Session;
use logos::{Lexer, Logos};
use std::fmt;
use thiserror::Error;
use tracing::debug;

fn unquote(lex: &mut Lexer<ScriptToken>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}

fn split_lexeme(lex: &mut Lexer<ScriptToken>) -> Option<(String, String)> {
    let (category, value) = lex.slice().split_once(':')?;
    Some((category.to_string(), value.to_string()))
}

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum ScriptToken {
    #[regex(r"#[^\n]*", logos::skip)]
    Comment,

    #[regex(r"'[^']*'", unquote)]
    Literal(String),

    #[regex(r#"[A-Z][A-Z_0-9]*:("[^"]*"|'[^']*'|[^ \t\r\n\f]+)"#, split_lexeme)]
    Lexeme((String, String)),

    #[regex(r"[A-Z][A-Z_0-9]*", |lex| lex.slice().to_string())]
    Category(String),

    #[token("<")]
    Left,

    #[token(">")]
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Literal(String),
    Lexeme {
        category: String,
        value: Option<String>,
    },
    Left,
    Right,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Literal(text) => write!(f, "'{text}'"),
            Step::Lexeme {
                category,
                value: Some(value),
            } => write!(f, "{category}:{value}"),
            Step::Lexeme {
                category,
                value: None,
            } => write!(f, "{category}"),
            Step::Left => write!(f, "<"),
            Step::Right => write!(f, ">"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unrecognized input '{text}' at offset {offset}")]
    Lex { offset: usize, text: String },
    #[error("step {index} ({step}) failed: {source}")]
    Step {
        index: usize,
        step: String,
        #[source]
        source: EngineError,
    },
}

pub fn parse_script(source: &str) -> Result<Vec<Step>, ScriptError> {
    let mut lexer = ScriptToken::lexer(source);
    let mut steps = Vec::new();
    while let Some(token) = lexer.next() {
        let step = match token {
            Ok(ScriptToken::Literal(text)) => Step::Literal(text),
            Ok(ScriptToken::Lexeme((category, value))) => Step::Lexeme {
                category,
                value: Some(value),
            },
            Ok(ScriptToken::Category(category)) => Step::Lexeme {
                category,
                value: None,
            },
            Ok(ScriptToken::Left) => Step::Left,
            Ok(ScriptToken::Right) => Step::Right,
            Ok(ScriptToken::Comment) => continue,
            Err(()) => {
                return Err(ScriptError::Lex {
                    offset: lexer.span().start,
                    text: lexer.slice().to_string(),
                })
            }
        };
        steps.push(step);
    }
    Ok(steps)
}

impl Session {
    pub fn apply(&mut self, step: &Step) -> Result<(), EngineError> {
        match step {
            Step::Left => self.move_left(),
            Step::Right => self.move_right(),
            Step::Literal(text) => {
                let leaf = self.find_alternative(text)?;
                self.choose(leaf, None)?;
            }
            Step::Lexeme { category, value } => {
                let leaf = self.find_alternative(category)?;
                self.choose(leaf, value.as_deref())?;
            }
        }
        Ok(())
    }

    /// Stops at the first failing step; earlier steps stay applied
    pub fn run_script(&mut self, source: &str) -> Result<(), ScriptError> {
        let steps = parse_script(source)?;
        for (index, step) in steps.iter().enumerate() {
            debug!(index, step = %step, "applying step");
            self.apply(step).map_err(|source| ScriptError::Step {
                index,
                step: step.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{lit, optional, seq, token, GrammarBuilder};
    use crate::hooks::Hook;
    use std::sync::Arc;

    #[test]
    fn test_parse_steps() {
        let steps = parse_script("'if' NAME:x  # trailing comment\nNEWLINE < > STRING:\"a b\"").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Literal("if".into()),
                Step::Lexeme {
                    category: "NAME".into(),
                    value: Some("x".into())
                },
                Step::Lexeme {
                    category: "NEWLINE".into(),
                    value: None
                },
                Step::Left,
                Step::Right,
                Step::Lexeme {
                    category: "STRING".into(),
                    value: Some("\"a b\"".into())
                },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_input() {
        let err = parse_script("'a' lower").unwrap_err();
        assert!(matches!(err, ScriptError::Lex { offset: 4, .. }));
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::Literal("=".into()).to_string(), "'='");
        assert_eq!(
            Step::Lexeme {
                category: "NUMBER".into(),
                value: Some("1".into())
            }
            .to_string(),
            "NUMBER:1"
        );
    }

    fn session() -> Session {
        let grammar = GrammarBuilder::new()
            .rule(
                "assign",
                seq([token("NAME"), lit("="), token("NUMBER"), optional(seq([lit(";")]))]),
            )
            .bind("NAME", Hook::Name)
            .bind("NUMBER", Hook::Number)
            .build()
            .unwrap();
        Session::new(Arc::new(grammar)).unwrap()
    }

    #[test]
    fn test_run_script() {
        let mut session = session();
        session.run_script("NAME:x '=' NUMBER:42 ';'").unwrap();
        assert_eq!(session.render(), "x = 42 ;");
    }

    #[test]
    fn test_failing_step_reports_index() {
        let mut session = session();
        let err = session.run_script("NAME:x '=' NUMBER:4a").unwrap_err();
        match err {
            ScriptError::Step {
                index,
                step,
                source,
            } => {
                assert_eq!(index, 2);
                assert_eq!(step, "NUMBER:4a");
                assert!(source.is_recoverable());
            }
            other => panic!("expected step error, got {other:?}"),
        }
        assert_eq!(session.render(), "x =");
    }
}
