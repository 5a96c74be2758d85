//! Source rendering
//!
//! Turns the committed leaves back into program text:
//!
//! - Literal leaves render their fixed text, lexeme leaves the value they were given.
//! - A NEWLINE leaf starts a new line; its token is the indentation of that line.
//! - INDENT / DEDENT leaves have empty tokens and render as nothing.
//! - Tokens are separated by one space, then `" ( "` and `" ) "` are collapsed so calls read
//!   `print(x)`.
//! - Trailing whitespace is trimmed on every line.

use crate::hooks::Hook;
use crate::tree::{ElementId, RuleTree};

#[derive(Debug, Default)]
struct Line {
    indent: String,
    text: String,
}

impl Line {
    fn finish(&self) -> String {
        let body = self.text.replace(" ( ", "(").replace(" ) ", ")");
        format!("{}{}", self.indent, body).trim_end().to_string()
    }
}

/// Text of one committed leaf, or `None` when it renders as nothing
pub fn leaf_source(tree: &RuleTree, leaf: ElementId) -> Option<&str> {
    tree.token(leaf).filter(|token| !token.is_empty())
}

pub fn render_source(tree: &RuleTree) -> String {
    let mut lines = vec![Line::default()];
    for leaf in tree.realized_leaves() {
        if tree.hook(leaf) == Some(Hook::Newline) {
            lines.push(Line {
                indent: tree.token(leaf).unwrap_or_default().to_string(),
                text: String::new(),
            });
            continue;
        }
        if let Some(token) = leaf_source(tree, leaf) {
            // `lines` starts non-empty and only grows
            if let Some(line) = lines.last_mut() {
                line.text.push_str(token);
                line.text.push(' ');
            }
        }
    }
    lines.iter().map(Line::finish).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{lit, rule, seq, token, GrammarBuilder};
    use std::sync::Arc;

    #[test]
    fn test_parentheses_collapse() {
        let grammar = GrammarBuilder::new()
            .rule("call", seq([token("NAME"), lit("("), rule("arg"), lit(")")]))
            .rule("arg", seq([token("NAME")]))
            .build()
            .unwrap();
        let mut tree = RuleTree::new(Arc::new(grammar)).unwrap();
        let mut cursor = None;
        for value in [Some("print"), None, Some("x"), None] {
            let leaf = tree.find_alternatives(cursor).unwrap()[0];
            tree.commit_with(leaf, value).unwrap();
            cursor = Some(leaf);
        }
        assert_eq!(render_source(&tree), "print(x)");
    }

    #[test]
    fn test_empty_tree_renders_empty() {
        let grammar = GrammarBuilder::new()
            .rule("r", seq([lit("a")]))
            .build()
            .unwrap();
        let tree = RuleTree::new(Arc::new(grammar)).unwrap();
        assert_eq!(render_source(&tree), "");
    }
}
