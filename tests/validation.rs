//! Lexeme validation on commit
//!
//! A rejected value is an input error: the leaf stays unrealized, nothing enters the chain and
//! the same alternative can be committed again with a better value.

use blanks::grammar::{alts, seq, token, GrammarBuilder};
use blanks::{EngineError, Grammar, Hook, Session};
use rstest::rstest;
use std::sync::Arc;

fn values_grammar() -> Grammar {
    GrammarBuilder::new()
        .rule(
            "value",
            alts([
                seq([token("NAME")]),
                seq([token("NUMBER")]),
                seq([token("STRING")]),
            ]),
        )
        .bind("NAME", Hook::Name)
        .bind("NUMBER", Hook::Number)
        .bind("STRING", Hook::Str)
        .build()
        .unwrap()
}

fn session() -> Session {
    Session::new(Arc::new(values_grammar())).unwrap()
}

#[rstest]
#[case("NUMBER", "12")]
#[case("NUMBER", "0")]
#[case("NAME", "x1")]
#[case("NAME", "_tmp")]
#[case("STRING", "\"hello world\"")]
#[case("STRING", "'single'")]
fn test_accepted(#[case] category: &str, #[case] value: &str) {
    let mut session = session();
    let leaf = session.find_alternative(category).unwrap();
    session.choose(leaf, Some(value)).unwrap();
    assert!(session.tree().is_realized(leaf));
    assert_eq!(session.tree().token(leaf), Some(value));
    assert_eq!(session.render(), value);
}

#[rstest]
#[case("NUMBER", "12a")]
#[case("NUMBER", "1.5")]
#[case("NAME", "9lives")]
#[case("NAME", "two words")]
#[case("STRING", "unquoted")]
#[case("STRING", "\"half")]
fn test_rejected_leaves_tree_untouched(#[case] category: &str, #[case] value: &str) {
    let mut session = session();
    let leaf = session.find_alternative(category).unwrap();

    let err = session.choose(leaf, Some(value)).unwrap_err();
    assert_eq!(
        err,
        EngineError::TokenRejected {
            category: category.to_string(),
            value: value.to_string(),
        }
    );
    assert!(err.is_recoverable());

    assert!(!session.tree().is_realized(leaf));
    assert_eq!(session.tree().token(leaf), None);
    assert!(session.chain().is_empty());
    assert_eq!(session.cursor(), None);
    assert_eq!(session.render(), "");
}

#[test]
fn test_retry_after_rejection() {
    let mut session = session();
    let leaf = session.find_alternative("NUMBER").unwrap();
    assert!(session.choose(leaf, Some("12a")).is_err());
    session.choose(leaf, Some("12")).unwrap();
    assert_eq!(session.render(), "12");
    assert_eq!(session.chain(), &[leaf]);
}

#[test]
fn test_lexeme_without_value() {
    let mut session = session();
    let leaf = session.find_alternative("NAME").unwrap();
    let err = session.choose(leaf, None).unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingToken {
            category: "NAME".into()
        }
    );
    assert!(!session.tree().is_realized(leaf));
}
