//! A small Python subset with hooks and tags bound, used by the CLI and the demos
//!
//!     file_input:    stmt+
//!     stmt:          simple_stmt | compound_stmt
//!     simple_stmt:   small_stmt NEWLINE
//!     small_stmt:    expr_stmt | 'pass' | 'break' | 'continue' | return_stmt
//!     expr_stmt:     expr ['=' expr]
//!     return_stmt:   'return' [expr]
//!     compound_stmt: if_stmt | while_stmt | for_stmt | funcdef
//!     if_stmt:       'if' expr ':' suite ('elif' expr ':' suite)* ['else' ':' suite]
//!     while_stmt:    'while' expr ':' suite
//!     for_stmt:      'for' NAME 'in' expr ':' suite
//!     funcdef:       'def' NAME '(' [NAME (',' NAME)*] ')' ':' suite
//!     suite:         NEWLINE INDENT stmt+ DEDENT
//!     expr:          arith (comp_op arith)*
//!     comp_op:       '<' | '>' | '==' | '!=' | '<=' | '>='
//!     arith:         term (('+' | '-') term)*
//!     term:          factor (('*' | '/' | '%') factor)*
//!     factor:        ['-'] atom
//!     atom:          NAME [trailer] | NUMBER | STRING | '(' expr ')' | 'True' | 'False' | 'None'
//!     trailer:       '(' [arglist] ')'
//!     arglist:       expr (',' expr)*
//!
//! Assignments and calls share `expr_stmt`, so a statement starting with an identifier offers a
//! single NAME. No rule is left-recursive, so lazy expansion always terminates.

use super::builder::{alts, group, lit, optional, rule, seq, token, GrammarBuilder};
use super::{Grammar, GroupingTag};
use crate::error::GrammarError;
use crate::hooks::Hook;

const KEYWORDS: &[&str] = &[
    "if", "elif", "else", "while", "for", "in", "def", "return", "pass", "break", "continue",
    "True", "False", "None",
];
const OPERATORS: &[&str] = &[
    "=", "+", "-", "*", "/", "%", "<", ">", "==", "!=", "<=", ">=",
];
const PUNCTUATION: &[&str] = &["(", ")", ":", ","];

pub fn python_subset() -> Result<Grammar, GrammarError> {
    GrammarBuilder::new()
        .rule("file_input", seq([rule("stmt").plus()]))
        .rule(
            "stmt",
            alts([seq([rule("simple_stmt")]), seq([rule("compound_stmt")])]),
        )
        .rule(
            "simple_stmt",
            seq([rule("small_stmt"), token("NEWLINE")]),
        )
        .rule(
            "small_stmt",
            alts([
                seq([rule("expr_stmt")]),
                seq([lit("pass")]),
                seq([lit("break")]),
                seq([lit("continue")]),
                seq([rule("return_stmt")]),
            ]),
        )
        .rule(
            "expr_stmt",
            seq([rule("expr"), optional(seq([lit("="), rule("expr")]))]),
        )
        .rule("return_stmt", seq([lit("return"), optional(seq([rule("expr")]))]))
        .rule(
            "compound_stmt",
            alts([
                seq([rule("if_stmt")]),
                seq([rule("while_stmt")]),
                seq([rule("for_stmt")]),
                seq([rule("funcdef")]),
            ]),
        )
        .rule(
            "if_stmt",
            seq([
                lit("if"),
                rule("expr"),
                lit(":"),
                rule("suite"),
                group(seq([lit("elif"), rule("expr"), lit(":"), rule("suite")])).star(),
                optional(seq([lit("else"), lit(":"), rule("suite")])),
            ]),
        )
        .rule(
            "while_stmt",
            seq([lit("while"), rule("expr"), lit(":"), rule("suite")]),
        )
        .rule(
            "for_stmt",
            seq([
                lit("for"),
                token("NAME"),
                lit("in"),
                rule("expr"),
                lit(":"),
                rule("suite"),
            ]),
        )
        .rule(
            "funcdef",
            seq([
                lit("def"),
                token("NAME"),
                lit("("),
                optional(seq([
                    token("NAME"),
                    group(seq([lit(","), token("NAME")])).star(),
                ])),
                lit(")"),
                lit(":"),
                rule("suite"),
            ]),
        )
        .rule(
            "suite",
            seq([
                token("NEWLINE"),
                token("INDENT"),
                rule("stmt").plus(),
                token("DEDENT"),
            ]),
        )
        .rule(
            "expr",
            seq([
                rule("arith"),
                group(seq([rule("comp_op"), rule("arith")])).star(),
            ]),
        )
        .rule(
            "comp_op",
            alts(
                ["<", ">", "==", "!=", "<=", ">="]
                    .into_iter()
                    .map(|op| seq([lit(op)])),
            ),
        )
        .rule(
            "arith",
            seq([
                rule("term"),
                group(seq([
                    group(alts([seq([lit("+")]), seq([lit("-")])])),
                    rule("term"),
                ]))
                .star(),
            ]),
        )
        .rule(
            "term",
            seq([
                rule("factor"),
                group(seq([
                    group(alts([seq([lit("*")]), seq([lit("/")]), seq([lit("%")])])),
                    rule("factor"),
                ]))
                .star(),
            ]),
        )
        .rule("factor", seq([optional(seq([lit("-")])), rule("atom")]))
        .rule(
            "atom",
            alts([
                seq([token("NAME"), optional(seq([rule("trailer")]))]),
                seq([token("NUMBER")]),
                seq([token("STRING")]),
                seq([lit("("), rule("expr"), lit(")")]),
                seq([lit("True")]),
                seq([lit("False")]),
                seq([lit("None")]),
            ]),
        )
        .rule(
            "trailer",
            seq([lit("("), optional(seq([rule("arglist")])), lit(")")]),
        )
        .rule(
            "arglist",
            seq([rule("expr"), group(seq([lit(","), rule("expr")])).star()]),
        )
        .bind("NEWLINE", Hook::Newline)
        .bind("INDENT", Hook::Indent)
        .bind("DEDENT", Hook::Dedent)
        .bind("=", Hook::Assign)
        .bind("NAME", Hook::Name)
        .bind("NUMBER", Hook::Number)
        .bind("STRING", Hook::Str)
        .bind("stmt", Hook::Statement)
        .tag_all(
            &["NAME", "NUMBER", "STRING"],
            GroupingTag::new("value", 0xFF6A_8759, 1),
        )
        .tag_all(KEYWORDS, GroupingTag::new("keyword", 0xFFCC_7832, 3))
        .tag_all(OPERATORS, GroupingTag::new("operator", 0xFFA9_B7C6, 4))
        .tag_all(PUNCTUATION, GroupingTag::new("punctuation", 0xFF9E_9E9E, 5))
        .tag_all(
            &["NEWLINE", "INDENT", "DEDENT"],
            GroupingTag::new("layout", 0xFF80_8080, 6),
        )
        .build()
}
