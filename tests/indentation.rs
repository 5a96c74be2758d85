//! Indentation through NEWLINE / INDENT / DEDENT hooks
//!
//! Blocks are opened by a newline followed by INDENT and closed by a DEDENT attached to the
//! last newline inside the block. The newline tokens carry the indentation of the line after
//! them, so these tests check the rendered text rather than individual tokens.

use blanks::config::{BlanksConfig, Loader};
use blanks::grammar::{alts, lit, rule, seq, token, GrammarBuilder};
use blanks::{Grammar, Hook, Session};
use std::sync::Arc;

fn block_grammar() -> Grammar {
    GrammarBuilder::new()
        .rule("program", seq([rule("stmt").plus()]))
        .rule(
            "stmt",
            alts([seq([rule("simple_stmt")]), seq([rule("compound_stmt")])]),
        )
        .rule("simple_stmt", seq([token("NAME"), token("NEWLINE")]))
        .rule(
            "compound_stmt",
            seq([
                lit("block"),
                token("NEWLINE"),
                token("INDENT"),
                rule("stmt").plus(),
                token("DEDENT"),
            ]),
        )
        .bind("NEWLINE", Hook::Newline)
        .bind("INDENT", Hook::Indent)
        .bind("DEDENT", Hook::Dedent)
        .bind("NAME", Hook::Name)
        .bind("stmt", Hook::Statement)
        .build()
        .unwrap()
}

fn session() -> Session {
    Session::new(Arc::new(block_grammar())).unwrap()
}

fn offered(session: &mut Session) -> Vec<String> {
    let alternatives = session.alternatives().unwrap();
    alternatives
        .iter()
        .map(|leaf| session.tree().display_text(*leaf))
        .collect()
}

#[test]
fn test_first_offers() {
    let mut session = session();
    assert_eq!(offered(&mut session), vec!["NAME", "block"]);
}

#[test]
fn test_block_body_is_indented() {
    let mut session = session();
    session
        .run_script("'block' NEWLINE INDENT NAME:a NEWLINE NAME:b NEWLINE")
        .unwrap();
    assert_eq!(session.render(), "block\n    a\n    b\n");
}

#[test]
fn test_dedent_is_offered_inside_block() {
    let mut session = session();
    session
        .run_script("'block' NEWLINE INDENT NAME:a NEWLINE")
        .unwrap();
    let offers = offered(&mut session);
    assert!(offers.contains(&"DEDENT".to_string()), "{offers:?}");
    assert!(offers.contains(&"NAME".to_string()), "{offers:?}");
}

#[test]
fn test_dedent_closes_block() {
    let mut session = session();
    session
        .run_script("'block' NEWLINE INDENT NAME:a NEWLINE DEDENT NAME:c NEWLINE")
        .unwrap();
    assert_eq!(session.render(), "block\n    a\nc\n");
}

#[test]
fn test_indentation_leaves_stay_out_of_chain() {
    let mut session = session();
    session.run_script("'block' NEWLINE INDENT").unwrap();

    assert_eq!(session.chain().len(), 2);
    let cursor = session.cursor().unwrap();
    assert_eq!(session.tree().hook(cursor), Some(Hook::Newline));

    // the search resumes after the INDENT attached to the newline
    let true_cursor = session.true_cursor().unwrap();
    assert_ne!(true_cursor, cursor);
    assert_eq!(session.tree().hook(true_cursor), Some(Hook::Indent));
    let state = session.tree().newline_state(cursor).unwrap();
    assert_eq!(state.indents, vec![true_cursor]);
}

#[test]
fn test_nested_blocks() {
    let mut session = session();
    session
        .run_script(
            "'block' NEWLINE INDENT
                'block' NEWLINE INDENT NAME:a NEWLINE DEDENT
             NAME:b NEWLINE DEDENT",
        )
        .unwrap();
    assert_eq!(session.render(), "block\n    block\n        a\n    b\n");
}

#[test]
fn test_indent_unit_from_config() {
    let config: BlanksConfig = Loader::new()
        .set_override("engine.indent_unit", "\t")
        .unwrap()
        .build()
        .unwrap();
    let mut session = Session::with_config(Arc::new(block_grammar()), config).unwrap();
    session
        .run_script("'block' NEWLINE INDENT NAME:a NEWLINE")
        .unwrap();
    assert_eq!(session.render(), "block\n\ta\n");
}
